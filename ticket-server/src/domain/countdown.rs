//! Countdown to a resolved departure.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use super::departure::ResolvedInstant;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Time remaining until a departure, split into days, hours, minutes and
/// seconds.
///
/// `expired` is true when the departure is at or before "now", or when the
/// departure time could not be parsed. An expired countdown is all zeros.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use ticket_server::domain::{countdown, resolve};
///
/// let now = Utc.with_ymd_and_hms(2025, 5, 30, 6, 58, 55).unwrap();
/// let departure = resolve("2025-06-01T08:00:00Z", &now);
///
/// let c = countdown(departure, &now);
/// assert!(!c.expired);
/// assert_eq!((c.days, c.hours, c.minutes, c.seconds), (2, 1, 1, 5));
/// assert_eq!(c.to_string(), "2d 01h 01m 05s");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Countdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub expired: bool,
}

impl Countdown {
    /// The countdown for a departure that has passed or cannot be parsed.
    pub const EXPIRED: Countdown = Countdown {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        expired: true,
    };

    /// Build a live (not expired) countdown from a number of whole seconds.
    pub fn from_total_seconds(total: u64) -> Self {
        Self {
            days: total / SECS_PER_DAY,
            hours: (total % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (total % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: total % SECS_PER_MINUTE,
            expired: false,
        }
    }

    /// Total whole seconds remaining. Zero when expired.
    pub fn total_seconds(&self) -> u64 {
        self.days * SECS_PER_DAY
            + self.hours * SECS_PER_HOUR
            + self.minutes * SECS_PER_MINUTE
            + self.seconds
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expired {
            return f.write_str("Expired");
        }
        if self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        write!(
            f,
            "{:02}h {:02}m {:02}s",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Compute the countdown from `now` to a resolved departure.
///
/// Equal instants count as expired. Sub-second remainders are dropped, so
/// a departure 500ms away shows as zero but not yet expired.
pub fn countdown<Tz: TimeZone>(resolved: ResolvedInstant, now: &DateTime<Tz>) -> Countdown {
    let Some(departure) = resolved.instant() else {
        return Countdown::EXPIRED;
    };

    let now = now.with_timezone(&Utc);
    if departure <= now {
        return Countdown::EXPIRED;
    }

    // Positive span: truncation toward zero is the floor
    let remaining = departure.signed_duration_since(now).num_seconds();
    Countdown::from_total_seconds(remaining.unsigned_abs())
}
