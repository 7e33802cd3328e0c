pub mod clock;
pub mod identity;
pub mod password;
pub mod policy;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use identity::{Identity, IdentityError, IdentityResolver};
pub use password::{PasswordError, PasswordService};
pub use policy::{authorize, check_note_quota, ensure_same_tenant, PolicyError, QuotaExceeded, QuotaPolicy, RoleSet};
pub use token::{Claims, TokenError, TokenService, TokenSubject};

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; an empty token counts as missing.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
