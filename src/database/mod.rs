pub mod bookmarks;
pub mod catalog;
pub mod chapters;
pub mod comments;
pub mod manager;
pub mod models;
pub mod moderation;
pub mod query_builder;
pub mod roles;
pub mod teams;
pub mod uploads;

pub use chapters::{ChapterStore, ChapterTx, MemoryChapterStore, PgChapterStore};
pub use manager::{DatabaseError, DatabaseManager};
