// handlers/protected/mod.rs - Protected handlers (X-User-Id required)
//
// Every handler here takes an `AuthUser`, so a missing header is rejected
// with 401 before the handler body runs. Ownership and site-role checks
// happen inside each handler.

pub mod bookmarks; // GET/POST/DELETE /bookmarks
pub mod comments; // POST/PUT/DELETE /comments
pub mod teams; // POST/PUT /teams
pub mod uploads; // POST/PUT /uploads
