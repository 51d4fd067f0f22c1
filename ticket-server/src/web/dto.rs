//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Booking, Countdown, ResolvedInstant, Ticket, TransportMode};

/// Query for evaluating a raw departure string.
#[derive(Debug, Deserialize)]
pub struct CountdownRequest {
    /// Departure time in any supported shape
    pub departure: Option<String>,
}

/// Query for a rider's bookings.
#[derive(Debug, Deserialize)]
pub struct BookingsRequest {
    pub email: String,
}

/// A departure evaluated against the current time.
#[derive(Debug, Serialize)]
pub struct CountdownResponse {
    /// The raw input, echoed back
    pub departure: Option<String>,

    /// Resolved instant (RFC 3339), or null when unparseable
    pub resolved: Option<String>,

    pub countdown: Countdown,
}

impl CountdownResponse {
    pub fn new(departure: Option<String>, resolved: ResolvedInstant, countdown: Countdown) -> Self {
        Self {
            departure,
            resolved: resolved.to_rfc3339(),
            countdown,
        }
    }
}

/// Countdown for a ticket's departure.
#[derive(Debug, Serialize)]
pub struct TicketCountdownResponse {
    pub ticket_id: String,

    pub title: String,

    pub transport_type: TransportMode,

    pub departure: Option<String>,

    pub resolved: Option<String>,

    pub countdown: Countdown,

    /// Whether the book action should be enabled
    pub bookable: bool,
}

impl TicketCountdownResponse {
    pub fn from_ticket(ticket: &Ticket, resolved: ResolvedInstant, countdown: Countdown) -> Self {
        Self {
            ticket_id: ticket.id.clone(),
            title: ticket.title.clone(),
            transport_type: ticket.transport_type,
            departure: ticket.departure_time.clone(),
            resolved: resolved.to_rfc3339(),
            countdown,
            bookable: ticket.is_bookable(&countdown),
        }
    }
}

/// A booking in the my-bookings list.
#[derive(Debug, Serialize)]
pub struct BookingResult {
    pub booking_id: String,

    pub ticket_id: String,

    pub ticket_title: String,

    pub from: String,

    pub to: String,

    pub quantity: u32,

    pub total_price: f64,

    pub status: String,

    pub departure: Option<String>,

    pub resolved: Option<String>,

    pub countdown: Countdown,

    /// Whether the pay action should be enabled
    pub payable: bool,
}

impl BookingResult {
    pub fn from_booking(booking: &Booking, resolved: ResolvedInstant, countdown: Countdown) -> Self {
        Self {
            booking_id: booking.id.clone(),
            ticket_id: booking.ticket_id.clone(),
            ticket_title: booking.ticket_title.clone(),
            from: booking.from.clone(),
            to: booking.to.clone(),
            quantity: booking.quantity,
            total_price: booking.total_price,
            status: booking.status.as_str().to_string(),
            departure: booking.departure_time.clone(),
            resolved: resolved.to_rfc3339(),
            countdown,
            payable: booking.is_payable(&countdown),
        }
    }
}

/// Response for the my-bookings list.
#[derive(Debug, Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<BookingResult>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
