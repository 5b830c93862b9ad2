// handlers/public/mod.rs - Public handlers (no identity required)
//
// Read-only catalog and community endpoints plus the chapter upload
// pipeline. Nothing here looks at X-User-Id.

pub mod catalog; // GET /manhwa, /manhwa/:id, /genres
pub mod chapters; // POST /upload-chapter
pub mod comments; // GET /comments
pub mod system; // GET /, /health
pub mod teams; // GET /teams
pub mod uploads; // GET /uploads
