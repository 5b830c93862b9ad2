// handlers/elevated/mod.rs - Elevated handlers (X-Admin-Key required)
//
// Mounted behind `admin_key_middleware`; a request only reaches these
// handlers with a matching admin key.

pub mod admin; // POST /admin
pub mod moderator; // POST /moderator
