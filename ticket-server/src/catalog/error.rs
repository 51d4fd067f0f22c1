//! Catalog error types.

/// Errors from fetching marketplace records.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service's own ID token was rejected
    #[error("unauthorized: check TICKET_API_TOKEN")]
    Unauthorized,

    /// The rider's token was missing, malformed or rejected
    #[error("rider not authorized")]
    RiderUnauthorized,

    /// The record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// API returned an unexpected status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the JSON we expected
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Local fixture data could not be loaded
    #[error("fixture error: {message}")]
    Fixture { message: String },

    /// Record IDs are restricted to URL-safe characters
    #[error("invalid record id: {0:?}")]
    InvalidId(String),

    /// The configured ID token cannot be sent as a header
    #[error("invalid ID token format")]
    InvalidToken,
}

impl CatalogError {
    /// Whether this error came from the remote API rather than from the
    /// caller's input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CatalogError::Http(_)
                | CatalogError::Unauthorized
                | CatalogError::Api { .. }
                | CatalogError::Json { .. }
        )
    }
}

/// Returns true for IDs that are safe to splice into a URL path.
pub fn is_valid_record_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CatalogError::NotFound {
            kind: "ticket",
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "ticket not found: abc");

        let err = CatalogError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = CatalogError::Json {
            message: "expected string".into(),
            body: Some("{}".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("expected string"));
    }

    #[test]
    fn upstream_classification() {
        assert!(CatalogError::Unauthorized.is_upstream());
        assert!(
            CatalogError::Api {
                status: 503,
                message: String::new()
            }
            .is_upstream()
        );
        assert!(!CatalogError::InvalidId("x y".into()).is_upstream());
        assert!(!CatalogError::RiderUnauthorized.is_upstream());
        assert!(
            !CatalogError::NotFound {
                kind: "ticket",
                id: "1".into()
            }
            .is_upstream()
        );
    }

    #[test]
    fn record_ids() {
        assert!(is_valid_record_id("665f1c2ab3"));
        assert!(is_valid_record_id("ticket_01-a"));

        assert!(!is_valid_record_id(""));
        assert!(!is_valid_record_id("../admin"));
        assert!(!is_valid_record_id("a b"));
        assert!(!is_valid_record_id("id?x=1"));
        assert!(!is_valid_record_id(&"a".repeat(65)));
    }
}
