//! Rider credentials.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use super::routes::AppError;

/// The calling rider's bearer token, taken from the `Authorization` header.
///
/// Booking routes need it; the token is forwarded to the catalog so each
/// rider only ever sees their own bookings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiderToken(String);

impl RiderToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        let token = token.trim();
        (!token.is_empty()).then(|| Self(token.to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RiderToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).ok_or_else(|| AppError::Unauthorized {
            message: "Missing or malformed bearer token".to_string(),
        })
    }
}
