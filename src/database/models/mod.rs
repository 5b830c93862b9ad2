pub mod bookmark;
pub mod comment;
pub mod manhwa;
pub mod moderation;
pub mod team;
pub mod upload;

pub use bookmark::Bookmark;
pub use comment::{Comment, CommentThread, NewComment};
pub use manhwa::{
    ChapterRef, ChapterWithoutPages, Genre, ManhwaDetails, ManhwaHeader, ManhwaRef, ManhwaSummary, PageRef,
    RecentChapter, TopManhwa,
};
pub use moderation::{HistoryEntry, Submission, TranslatorRequest, TranslatorRequestListing};
pub use team::{NewTeam, Team, TeamMember, TeamSummary};
pub use upload::{ModerationStatus, NewUpload, UploadDetails, UploadListing, UserUpload};
