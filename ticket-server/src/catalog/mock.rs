//! Fixture-backed catalog for development and tests.
//!
//! Loads tickets and bookings from JSON files and serves them as if they
//! came from the live API.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::{Booking, Ticket};

use super::error::CatalogError;

const TICKETS_FILE: &str = "tickets.json";
const BOOKINGS_FILE: &str = "bookings.json";
const RIDERS_FILE: &str = "riders.json";

/// Catalog that serves records from fixture files.
///
/// Expects a directory containing `tickets.json` (an array of tickets) and,
/// optionally, `bookings.json` (an array of bookings) and `riders.json` (an
/// object mapping rider tokens to email addresses). Bookings are only
/// visible to the rider whose token maps to the booking's email.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    tickets: HashMap<String, Ticket>,
    bookings: Vec<Booking>,
    riders: HashMap<String, String>,
}

impl MockCatalog {
    /// Load fixtures from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let data_dir = data_dir.as_ref();

        let tickets: Vec<Ticket> = read_json(&data_dir.join(TICKETS_FILE))?;
        let bookings: Vec<Booking> = read_optional_json(&data_dir.join(BOOKINGS_FILE))?;
        let riders: HashMap<String, String> = read_optional_json(&data_dir.join(RIDERS_FILE))?;

        let catalog = riders
            .into_iter()
            .fold(Self::from_records(tickets, bookings), |catalog, (token, email)| {
                catalog.with_rider(token, email)
            });
        Ok(catalog)
    }

    /// Build directly from records.
    pub fn from_records(tickets: Vec<Ticket>, bookings: Vec<Booking>) -> Self {
        Self {
            tickets: tickets.into_iter().map(|t| (t.id.clone(), t)).collect(),
            bookings,
            riders: HashMap::new(),
        }
    }

    /// Register a rider token.
    pub fn with_rider(mut self, token: impl Into<String>, email: impl Into<String>) -> Self {
        self.riders.insert(token.into(), email.into());
        self
    }

    /// Look up a ticket by ID.
    pub fn ticket(&self, id: &str) -> Result<Ticket, CatalogError> {
        self.tickets
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                kind: "ticket",
                id: id.to_string(),
            })
    }

    /// All bookings made by a rider, in file order.
    ///
    /// The token must belong to the rider whose bookings are requested.
    pub fn bookings_for(&self, email: &str, rider_token: &str) -> Result<Vec<Booking>, CatalogError> {
        let rider = self.rider(rider_token)?;
        if !rider.eq_ignore_ascii_case(email) {
            return Err(CatalogError::RiderUnauthorized);
        }

        Ok(self
            .bookings
            .iter()
            .filter(|b| b.user_email.eq_ignore_ascii_case(email))
            .cloned()
            .collect())
    }

    /// One booking, if it belongs to the token's rider.
    ///
    /// Another rider's booking is reported as not found.
    pub fn booking(&self, id: &str, rider_token: &str) -> Result<Booking, CatalogError> {
        let rider = self.rider(rider_token)?;

        self.bookings
            .iter()
            .find(|b| b.id == id && b.user_email.eq_ignore_ascii_case(rider))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                kind: "booking",
                id: id.to_string(),
            })
    }

    /// Number of tickets loaded.
    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    fn rider(&self, token: &str) -> Result<&str, CatalogError> {
        self.riders
            .get(token.trim())
            .map(String::as_str)
            .ok_or(CatalogError::RiderUnauthorized)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|e| CatalogError::Fixture {
        message: format!("failed to read {}: {}", path.display(), e),
    })?;

    serde_json::from_str(&json).map_err(|e| CatalogError::Fixture {
        message: format!("failed to parse {}: {}", path.display(), e),
    })
}

fn read_optional_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, CatalogError> {
    if path.is_file() {
        read_json(path)
    } else {
        Ok(T::default())
    }
}
