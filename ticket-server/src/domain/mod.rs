//! Domain types for the ticket marketplace.
//!
//! The heart of this module is departure-time evaluation: turning the
//! loosely formatted departure strings the marketplace API returns into
//! instants, and counting down to them. Everything here is pure; "now" is
//! always passed in by the caller.

mod countdown;
mod departure;
mod ticket;
mod transport;

pub use countdown::{Countdown, countdown};
pub use departure::{ResolvedInstant, resolve, resolve_opt};
pub use ticket::{Booking, BookingStatus, Ticket, evaluate};
pub use transport::{InvalidTransportMode, TransportMode};
