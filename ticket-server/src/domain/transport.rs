//! Transport mode of a ticketed leg.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown transport mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transport mode: {value:?}")]
pub struct InvalidTransportMode {
    value: String,
}

/// The kind of vehicle a ticket is for.
///
/// The marketplace API spells these in lowercase, but vendors have been
/// known to submit `"Bus"` or `"FLIGHT"`, so parsing ignores case.
///
/// # Examples
///
/// ```
/// use ticket_server::domain::TransportMode;
///
/// assert_eq!("ferry".parse::<TransportMode>().unwrap(), TransportMode::Ferry);
/// assert_eq!("Launch".parse::<TransportMode>().unwrap(), TransportMode::Launch);
/// assert!("rocket".parse::<TransportMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum TransportMode {
    Bus,
    Train,
    Flight,
    Launch,
    Ferry,
}

impl TransportMode {
    /// All modes, in display order.
    pub const ALL: [TransportMode; 5] = [
        TransportMode::Bus,
        TransportMode::Train,
        TransportMode::Flight,
        TransportMode::Launch,
        TransportMode::Ferry,
    ];

    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Flight => "flight",
            TransportMode::Launch => "launch",
            TransportMode::Ferry => "ferry",
        }
    }
}

impl FromStr for TransportMode {
    type Err = InvalidTransportMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        TransportMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InvalidTransportMode {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for TransportMode {
    type Error = InvalidTransportMode;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TransportMode> for &'static str {
    fn from(mode: TransportMode) -> Self {
        mode.as_str()
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
