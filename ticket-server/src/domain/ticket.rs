//! Ticket and booking records from the marketplace API.
//!
//! Departure times are kept as the raw strings the API sent. They are only
//! resolved against a concrete "now" when a view needs a countdown.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::countdown::{Countdown, countdown};
use super::departure::{ResolvedInstant, resolve_opt};
use super::transport::TransportMode;

/// A ticket listing published by a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(alias = "_id")]
    pub id: String,

    pub title: String,

    /// Origin (free text, e.g. "Dhaka")
    pub from: String,

    /// Destination (free text)
    pub to: String,

    pub transport_type: TransportMode,

    /// Unit price
    pub price: f64,

    /// Seats still available
    pub quantity: u32,

    /// Raw departure time as sent by the API
    #[serde(default)]
    pub departure_time: Option<String>,

    #[serde(default)]
    pub vendor_email: Option<String>,
}

impl Ticket {
    /// Resolve this ticket's departure time against `now`.
    pub fn resolve_departure<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ResolvedInstant {
        resolve_opt(self.departure_time.as_deref(), now)
    }

    /// Whether a rider can still book this ticket.
    ///
    /// Requires seats left and a departure that has not passed. An
    /// unparseable departure counts as passed.
    pub fn is_bookable(&self, countdown: &Countdown) -> bool {
        self.quantity > 0 && !countdown.expired
    }
}

/// Lifecycle of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Waiting for the vendor
    Pending,
    /// Vendor accepted; the rider may pay
    Accepted,
    Rejected,
    Paid,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Paid => "paid",
        }
    }
}

/// A rider's booking of some quantity of a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: String,

    pub ticket_id: String,

    pub ticket_title: String,

    #[serde(default)]
    pub from: String,

    #[serde(default)]
    pub to: String,

    pub user_email: String,

    pub quantity: u32,

    pub total_price: f64,

    pub status: BookingStatus,

    /// Raw departure time of the booked leg
    #[serde(default)]
    pub departure_time: Option<String>,
}

impl Booking {
    /// Resolve the booked leg's departure time against `now`.
    pub fn resolve_departure<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ResolvedInstant {
        resolve_opt(self.departure_time.as_deref(), now)
    }

    /// Whether the rider can be sent to checkout for this booking.
    pub fn is_payable(&self, countdown: &Countdown) -> bool {
        self.status == BookingStatus::Accepted && !countdown.expired
    }
}

/// Evaluate a departure once: resolve against `now` and count down from it.
pub fn evaluate<Tz: TimeZone>(
    departure: Option<&str>,
    now: &DateTime<Tz>,
) -> (ResolvedInstant, Countdown) {
    let resolved = resolve_opt(departure, now);
    (resolved, countdown(resolved, now))
}
