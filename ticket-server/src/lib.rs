//! Ticket marketplace countdown server.
//!
//! Resolves loosely formatted departure times into instants and serves
//! live countdowns for tickets and bookings, so the booking and payment
//! actions can be switched off once a departure has passed.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod domain;
pub mod ticker;
pub mod web;
