pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{admin_key_middleware, AuthUser};
pub use extract::{JsonBody, PathParam, QueryParams};
pub use response::{ApiResponse, ApiResult};
