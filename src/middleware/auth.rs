use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;

/// Raw `Authorization` header of the request, if present and valid UTF-8.
///
/// Extraction never fails. Scheme parsing and token validation happen in the
/// request pipeline so every rejection goes through the same path.
#[derive(Clone, Default)]
pub struct AuthHeader(pub Option<String>);

impl AuthHeader {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(
            headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        )
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

// Never print the token itself.
impl std::fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.0.is_some() { "present" } else { "absent" };
        f.debug_tuple("AuthHeader").field(&state).finish()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthHeader
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_authorization_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(AuthHeader::from_headers(&headers).as_deref(), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(AuthHeader::from_headers(&headers).as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", AuthHeader(Some("Bearer secret.token.value".into())));
        assert!(!rendered.contains("secret"));
    }
}
