// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and liveness only.
pub mod auth;
pub mod health;

pub use auth::login;
pub use health::health;
