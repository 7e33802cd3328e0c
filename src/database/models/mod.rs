pub mod note;
pub mod tenant;
pub mod user;

pub use note::{NewNote, Note, NotePatch};
pub use tenant::{NewTenant, Tenant};
pub use user::{NewUser, User, UserUpdate};
