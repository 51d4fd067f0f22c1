//! Application state for the web layer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::catalog::Catalog;
use crate::clock::Clock;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Ticket and booking records
    pub catalog: Arc<Catalog>,

    /// Source of "now"
    pub clock: Arc<dyn Clock>,

    /// Period of live countdown ticks
    pub tick: Duration,
}

impl AppState {
    /// Create a new app state.
    pub fn new(catalog: Catalog, clock: Arc<dyn Clock>, tick: Duration) -> Self {
        Self {
            catalog: Arc::new(catalog),
            clock,
            tick,
        }
    }

    /// Current instant in the server's local timezone.
    ///
    /// Offset-less departure strings are wall-clock times, read in this zone.
    pub fn local_now(&self) -> DateTime<Local> {
        self.clock.now().with_timezone(&Local)
    }
}
