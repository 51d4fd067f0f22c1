//! Marketplace REST API client.
//!
//! Reads tickets and bookings from the marketplace backend. Requests carry
//! an identity provider ID token as a bearer token: the configured service
//! token for tickets, the calling rider's own token for bookings.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::{Booking, Ticket};

use super::error::{CatalogError, is_valid_record_id};

/// Default base URL for the marketplace API (local development backend).
const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// How much of an unparseable body to keep for diagnostics.
const BODY_SNIPPET_CHARS: usize = 500;

/// Configuration for the catalog client.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Service ID token sent as `Authorization: Bearer ...` on ticket reads
    pub id_token: Option<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CatalogConfig {
    /// Create a new config pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            id_token: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Attach an ID token.
    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Client for the marketplace REST API.
///
/// Ticket reads are public and carry the configured service token, if any.
/// Booking reads are scoped to a rider and carry that rider's token instead.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    service_auth: Option<HeaderValue>,
    semaphore: Arc<Semaphore>,
}

/// Whose credentials a request is sent with.
#[derive(Clone, Copy)]
enum Credentials<'a> {
    Service,
    Rider(&'a HeaderValue),
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let service_auth = config
            .id_token
            .as_deref()
            .map(|token| bearer(token).ok_or(CatalogError::InvalidToken))
            .transpose()?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_auth,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a single ticket.
    pub async fn ticket(&self, id: &str) -> Result<Ticket, CatalogError> {
        if !is_valid_record_id(id) {
            return Err(CatalogError::InvalidId(id.to_string()));
        }

        let url = format!("{}/tickets/{}", self.base_url, id);
        self.get_json(&url, &[], Credentials::Service)
            .await
            .map_err(|e| not_found_as(e, "ticket", id))
    }

    /// Fetch all bookings made by a rider, on behalf of that rider.
    pub async fn bookings_for(
        &self,
        email: &str,
        rider_token: &str,
    ) -> Result<Vec<Booking>, CatalogError> {
        let auth = bearer(rider_token).ok_or(CatalogError::RiderUnauthorized)?;
        let url = format!("{}/bookings", self.base_url);
        self.get_json(&url, &[("email", email)], Credentials::Rider(&auth))
            .await
    }

    /// Fetch one of the rider's bookings.
    pub async fn booking(&self, id: &str, rider_token: &str) -> Result<Booking, CatalogError> {
        if !is_valid_record_id(id) {
            return Err(CatalogError::InvalidId(id.to_string()));
        }

        let auth = bearer(rider_token).ok_or(CatalogError::RiderUnauthorized)?;
        let url = format!("{}/bookings/{}", self.base_url, id);
        self.get_json(&url, &[], Credentials::Rider(&auth))
            .await
            .map_err(|e| not_found_as(e, "booking", id))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        credentials: Credentials<'_>,
    ) -> Result<T, CatalogError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| CatalogError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let auth = match credentials {
            Credentials::Service => self.service_auth.as_ref(),
            Credentials::Rider(value) => Some(value),
        };

        let mut request = self.http.get(url).query(query);
        if let Some(value) = auth {
            request = request.header(AUTHORIZATION, value.clone());
        }

        debug!(url, "catalog request");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(match credentials {
                Credentials::Service => {
                    warn!(url, %status, "catalog rejected service credentials");
                    CatalogError::Unauthorized
                }
                Credentials::Rider(_) => CatalogError::RiderUnauthorized,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                kind: "record",
                id: url.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        decode_body(&body)
    }
}

/// Build an `Authorization: Bearer ...` value. `None` if the token cannot be
/// sent as a header.
fn bearer(token: &str) -> Option<HeaderValue> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).ok()?;
    value.set_sensitive(true);
    Some(value)
}

fn not_found_as(e: CatalogError, kind: &'static str, id: &str) -> CatalogError {
    match e {
        CatalogError::NotFound { .. } => CatalogError::NotFound {
            kind,
            id: id.to_string(),
        },
        other => other,
    }
}

/// Decode a JSON body, keeping a snippet of it on failure.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
    })
}
