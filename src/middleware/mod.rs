pub mod auth;
pub mod response;

pub use auth::AuthHeader;
pub use response::{ApiResponse, ApiResult};
