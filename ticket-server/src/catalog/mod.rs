//! Marketplace catalog access.
//!
//! Tickets and bookings live in the marketplace REST backend, which this
//! service treats as an external collaborator. [`Catalog`] fronts either the
//! live API or local fixture files behind the same interface.

mod client;
mod error;
mod mock;

pub use client::{CatalogClient, CatalogConfig};
pub use error::{CatalogError, is_valid_record_id};
pub use mock::MockCatalog;

use crate::domain::{Booking, Ticket};

/// Where ticket and booking records come from.
#[derive(Debug, Clone)]
pub enum Catalog {
    /// The live marketplace API
    Remote(CatalogClient),
    /// Fixture files loaded at startup
    Fixtures(MockCatalog),
}

impl Catalog {
    /// Fetch a single ticket.
    pub async fn ticket(&self, id: &str) -> Result<Ticket, CatalogError> {
        match self {
            Catalog::Remote(client) => client.ticket(id).await,
            Catalog::Fixtures(mock) => mock.ticket(id),
        }
    }

    /// Fetch all bookings made by a rider, authorized by that rider's token.
    pub async fn bookings_for(
        &self,
        email: &str,
        rider_token: &str,
    ) -> Result<Vec<Booking>, CatalogError> {
        match self {
            Catalog::Remote(client) => client.bookings_for(email, rider_token).await,
            Catalog::Fixtures(mock) => mock.bookings_for(email, rider_token),
        }
    }

    /// Fetch one booking, authorized by its rider's token.
    pub async fn booking(&self, id: &str, rider_token: &str) -> Result<Booking, CatalogError> {
        match self {
            Catalog::Remote(client) => client.booking(id, rider_token).await,
            Catalog::Fixtures(mock) => mock.booking(id, rider_token),
        }
    }
}
