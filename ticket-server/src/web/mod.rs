//! Web layer for the ticket server.
//!
//! Provides JSON countdown endpoints, live countdown event streams, and
//! HTML fragments for the ticket-detail and my-bookings views.

mod auth;
mod dto;
mod routes;
mod state;
pub mod templates;

pub use auth::RiderToken;
pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
