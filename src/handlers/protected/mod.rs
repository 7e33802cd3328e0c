// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler passes the raw Authorization header to its service, which runs
// token validation, identity resolution and the role check before touching data.
pub mod notes;
pub mod tenants;
pub mod users;
