//! Askama templates for the HTML fragments.

use askama::Template;

use crate::domain::{Booking, Countdown, Ticket};

// ============================================================================
// Fragment Templates
// ============================================================================

/// Ticket detail card with live countdown.
#[derive(Template)]
#[template(path = "ticket_detail.html")]
pub struct TicketDetailTemplate {
    pub ticket: TicketView,
}

/// My-bookings list.
#[derive(Template)]
#[template(path = "booking_list.html")]
pub struct BookingListTemplate {
    pub email: String,
    pub bookings: Vec<BookingView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Ticket view model for templates.
#[derive(Debug, Clone)]
pub struct TicketView {
    pub id: String,
    pub title: String,
    pub from: String,
    pub to: String,
    pub transport_type: String,
    pub price: String,
    pub quantity: u32,
    pub departure: String,
    pub countdown: String,
    pub expired: bool,
    pub bookable: bool,
}

impl TicketView {
    /// Create from a domain Ticket and its current countdown.
    pub fn from_ticket(ticket: &Ticket, countdown: &Countdown) -> Self {
        Self {
            id: ticket.id.clone(),
            title: ticket.title.clone(),
            from: ticket.from.clone(),
            to: ticket.to.clone(),
            transport_type: ticket.transport_type.to_string(),
            price: format_price(ticket.price),
            quantity: ticket.quantity,
            departure: departure_label(ticket.departure_time.as_deref()),
            countdown: countdown.to_string(),
            expired: countdown.expired,
            bookable: ticket.is_bookable(countdown),
        }
    }
}

/// Booking view model for templates.
#[derive(Debug, Clone)]
pub struct BookingView {
    pub id: String,
    pub ticket_id: String,
    pub ticket_title: String,
    pub route: String,
    pub quantity: u32,
    pub total_price: String,
    pub status: String,
    pub departure: String,
    pub countdown: String,
    pub expired: bool,
    pub payable: bool,
}

impl BookingView {
    /// Create from a domain Booking and its current countdown.
    pub fn from_booking(booking: &Booking, countdown: &Countdown) -> Self {
        let route = if booking.from.is_empty() || booking.to.is_empty() {
            String::new()
        } else {
            format!("{} → {}", booking.from, booking.to)
        };

        Self {
            id: booking.id.clone(),
            ticket_id: booking.ticket_id.clone(),
            ticket_title: booking.ticket_title.clone(),
            route,
            quantity: booking.quantity,
            total_price: format_price(booking.total_price),
            status: booking.status.as_str().to_string(),
            departure: departure_label(booking.departure_time.as_deref()),
            countdown: countdown.to_string(),
            expired: countdown.expired,
            payable: booking.is_payable(countdown),
        }
    }
}

fn departure_label(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "Not scheduled".to_string(),
    }
}

fn format_price(amount: f64) -> String {
    format!("{amount:.2}")
}
