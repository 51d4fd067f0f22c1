//! Departure time resolution.
//!
//! The marketplace API hands out departure times in three shapes: full ISO
//! date-times, `YYYY-MM-DD HH:MM[:SS]` wall-clock strings, and bare `HH:MM`
//! clock times. This module turns any of them into an absolute instant,
//! relative to an explicitly supplied "now".
//!
//! Offset-less inputs are read as wall-clock time in the timezone of `now`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

/// Date-time formats with an explicit numeric offset.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// Date-time formats without an offset, read as local wall-clock time.
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// The result of resolving a departure time string.
///
/// `Unparseable` is an ordinary outcome, not an error: callers render it the
/// same way as a departure that has already passed.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use ticket_server::domain::{ResolvedInstant, resolve};
///
/// let now = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
///
/// let at = resolve("2025-06-01T08:00:00Z", &now);
/// assert_eq!(at, ResolvedInstant::At(Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()));
///
/// assert_eq!(resolve("", &now), ResolvedInstant::Unparseable);
/// assert_eq!(resolve("next tuesday", &now), ResolvedInstant::Unparseable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedInstant {
    /// A concrete point in time.
    At(DateTime<Utc>),
    /// The input matched none of the recognised shapes, or held
    /// out-of-range components.
    Unparseable,
}

impl ResolvedInstant {
    /// Returns the instant, if the input was parseable.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            ResolvedInstant::At(at) => Some(*at),
            ResolvedInstant::Unparseable => None,
        }
    }

    /// Returns true if the input could not be parsed.
    pub fn is_unparseable(&self) -> bool {
        matches!(self, ResolvedInstant::Unparseable)
    }

    /// Formats the instant as RFC 3339, or `None` when unparseable.
    pub fn to_rfc3339(&self) -> Option<String> {
        self.instant().map(|at| at.to_rfc3339())
    }
}

impl From<Option<DateTime<Utc>>> for ResolvedInstant {
    fn from(at: Option<DateTime<Utc>>) -> Self {
        at.map_or(ResolvedInstant::Unparseable, ResolvedInstant::At)
    }
}

/// Resolve a departure time string against `now`.
///
/// Shapes are tried in priority order and the first match wins:
///
/// 1. Contains `T`: an ISO-8601-like date-time, with or without an offset.
/// 2. Contains a space and a hyphen: `YYYY-MM-DD HH:MM[:SS]` in local time.
/// 3. Contains a colon: `HH:MM`, placed on the next occurrence of that clock
///    time. If the minute has already been reached today, that is tomorrow.
/// 4. Anything else: a bare `YYYY-MM-DD` date, which is midnight UTC.
///
/// Inputs are not tried against later rules once a shape matches, so
/// RFC 2822 strings (which contain colons, and sometimes a `T`) are
/// unparseable.
///
/// Resolution is a pure function of `(input, now)`. A time-only input
/// resolved just before and just after its clock time lands on different
/// days.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use ticket_server::domain::resolve;
///
/// let now = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
///
/// // Already past 08:00 today, so it resolves to tomorrow.
/// let at = resolve("08:00", &now).instant().unwrap();
/// assert_eq!(at, Utc.with_ymd_and_hms(2025, 5, 2, 8, 0, 0).unwrap());
///
/// // Still ahead today.
/// let at = resolve("14:30", &now).instant().unwrap();
/// assert_eq!(at, Utc.with_ymd_and_hms(2025, 5, 1, 14, 30, 0).unwrap());
/// ```
pub fn resolve<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> ResolvedInstant {
    let input = input.trim();
    if input.is_empty() {
        return ResolvedInstant::Unparseable;
    }

    let tz = now.timezone();
    let resolved = if input.contains('T') {
        parse_absolute(input, &tz)
    } else if input.contains(' ') && input.contains('-') {
        parse_date_and_time(input, &tz)
    } else if input.contains(':') {
        parse_time_only(input, now)
    } else {
        parse_date_only(input)
    };

    resolved.into()
}

/// Resolve an optional departure field. A missing value is unparseable.
pub fn resolve_opt<Tz: TimeZone>(input: Option<&str>, now: &DateTime<Tz>) -> ResolvedInstant {
    input.map_or(ResolvedInstant::Unparseable, |s| resolve(s, now))
}

/// Parse an ISO date-time, zoned or local.
fn parse_absolute<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // RFC 3339 insists on seconds; accept "2025-06-01T08:00Z" as well
    if let Some(naive) = s.strip_suffix('Z').and_then(parse_naive_iso) {
        return Some(naive.and_utc());
    }

    parse_naive_iso(s).and_then(|naive| from_local(tz, naive))
}

fn parse_naive_iso(s: &str) -> Option<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// A bare `YYYY-MM-DD` is midnight UTC, not local midnight.
fn parse_date_only(s: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_time(NaiveTime::MIN).and_utc())
}

/// Parse `YYYY-MM-DD HH:MM[:SS]` as local wall-clock time.
fn parse_date_and_time<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let (date_part, time_part) = s.split_once(' ')?;

    let date_fields = split_components(date_part, '-')?;
    let [year, month, day] = date_fields[..] else {
        return None;
    };

    let time_fields = split_components(time_part.trim(), ':')?;
    let (hour, minute, second) = match time_fields[..] {
        [hour, minute] => (hour, minute, 0),
        [hour, minute, second] => (hour, minute, second),
        _ => return None,
    };

    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;

    from_local(tz, date.and_time(time))
}

/// Parse `HH:MM` as the next occurrence of that clock time.
fn parse_time_only<Tz: TimeZone>(s: &str, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let mut parts = s.split(':');

    let hour = parse_component(parts.next()?)?;
    let minute = match parts.next() {
        None | Some("") => 0,
        Some(m) => parse_component(m)?,
    };
    if parts.next().is_some() {
        return None;
    }

    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;

    let local_now = now.naive_local();
    let reached = (hour, minute) <= (local_now.hour(), local_now.minute());
    let date = if reached {
        local_now.date().succ_opt()?
    } else {
        local_now.date()
    };

    from_local(&now.timezone(), date.and_time(time))
}

/// Map a wall-clock time in `tz` to an instant.
///
/// Times inside a DST gap do not exist and yield `None`. Times inside an
/// overlap take the earlier of the two instants.
fn from_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn split_components(s: &str, sep: char) -> Option<Vec<u32>> {
    s.split(sep).map(parse_component).collect()
}

/// Parse a plain run of ASCII digits. Signs and whitespace are rejected.
fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use chrono_tz::Europe::London;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> ResolvedInstant {
        ResolvedInstant::At(utc(y, mo, d, h, mi, s))
    }

    #[test]
    fn iso_with_zulu_is_absolute() {
        let now = utc(2025, 5, 1, 0, 0, 0);
        assert_eq!(
            resolve("2025-06-01T08:00:00Z", &now),
            at(2025, 6, 1, 8, 0, 0)
        );
        assert_eq!(
            resolve("2025-03-01T08:00:00.000Z", &now),
            at(2025, 3, 1, 8, 0, 0)
        );
        assert_eq!(resolve("2025-06-01T08:00Z", &now), at(2025, 6, 1, 8, 0, 0));
    }

    #[test]
    fn iso_with_offset_converts_to_utc() {
        let now = utc(2025, 5, 1, 0, 0, 0);
        assert_eq!(
            resolve("2025-06-01T08:00:00+02:00", &now),
            at(2025, 6, 1, 6, 0, 0)
        );
        assert_eq!(
            resolve("2025-06-01T08:00:00+0530", &now),
            at(2025, 6, 1, 2, 30, 0)
        );
    }

    #[test]
    fn iso_without_offset_is_local_to_now() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = plus_two.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();

        assert_eq!(resolve("2025-06-01T08:00:00", &now), at(2025, 6, 1, 6, 0, 0));
        assert_eq!(resolve("2025-06-01T08:00", &now), at(2025, 6, 1, 6, 0, 0));
        assert_eq!(
            resolve("2025-06-01T08:00:00.250", &now).instant().unwrap(),
            utc(2025, 6, 1, 6, 0, 0) + Duration::milliseconds(250)
        );
    }

    #[test]
    fn iso_with_invalid_calendar_date_is_unparseable() {
        let now = utc(2025, 5, 1, 0, 0, 0);
        assert!(resolve("2025-02-30T08:00:00Z", &now).is_unparseable());
        assert!(resolve("2025-13-01T08:00:00Z", &now).is_unparseable());
        assert!(resolve("2025-06-01T25:00:00Z", &now).is_unparseable());
        assert!(resolve("Tomorrow", &now).is_unparseable());
    }

    #[test]
    fn space_separated_is_local_wall_clock() {
        let now = utc(2030, 1, 1, 0, 0, 0);
        assert_eq!(resolve("2025-06-01 08:00:00", &now), at(2025, 6, 1, 8, 0, 0));
        assert_eq!(resolve("2025-06-01 08:00", &now), at(2025, 6, 1, 8, 0, 0));

        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = minus_five.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(
            resolve("2025-06-01 08:00:00", &now),
            at(2025, 6, 1, 13, 0, 0)
        );
    }

    #[test]
    fn space_separated_rejects_out_of_range() {
        let now = utc(2025, 5, 1, 0, 0, 0);
        assert!(resolve("2025-13-01 08:00", &now).is_unparseable());
        assert!(resolve("2025-02-29 08:00", &now).is_unparseable());
        assert!(resolve("2025-06-01 25:00", &now).is_unparseable());
        assert!(resolve("2025-06-01 08:60", &now).is_unparseable());
        assert!(resolve("2025-06-01 08:00:61", &now).is_unparseable());
    }

    #[test]
    fn space_separated_rejects_malformed_components() {
        let now = utc(2025, 5, 1, 0, 0, 0);
        assert!(resolve("2025-06 08:00", &now).is_unparseable());
        assert!(resolve("2025-06-01-02 08:00", &now).is_unparseable());
        assert!(resolve("2025-06-01 08", &now).is_unparseable());
        assert!(resolve("2025-06-01 08:00:00:00", &now).is_unparseable());
        assert!(resolve("2025-0a-01 08:00", &now).is_unparseable());
        assert!(resolve("2025-06-01 +8:00", &now).is_unparseable());
    }

    #[test]
    fn leap_day_accepted_in_leap_year() {
        let now = utc(2024, 1, 1, 0, 0, 0);
        assert_eq!(resolve("2024-02-29 12:00", &now), at(2024, 2, 29, 12, 0, 0));
    }

    #[test]
    fn time_only_earlier_rolls_to_tomorrow() {
        let now = utc(2025, 5, 1, 10, 0, 0);
        assert_eq!(resolve("08:00", &now), at(2025, 5, 2, 8, 0, 0));
    }

    #[test]
    fn time_only_later_stays_today() {
        let now = utc(2025, 5, 1, 6, 0, 0);
        assert_eq!(resolve("08:00", &now), at(2025, 5, 1, 8, 0, 0));
    }

    #[test]
    fn time_only_same_minute_rolls_to_tomorrow() {
        let now = utc(2025, 5, 1, 8, 0, 30);
        assert_eq!(resolve("08:00", &now), at(2025, 5, 2, 8, 0, 0));

        let now = utc(2025, 5, 1, 8, 0, 0);
        assert_eq!(resolve("08:00", &now), at(2025, 5, 2, 8, 0, 0));
    }

    #[test]
    fn time_only_same_hour_later_minute_stays_today() {
        let now = utc(2025, 5, 1, 8, 15, 59);
        assert_eq!(resolve("08:16", &now), at(2025, 5, 1, 8, 16, 0));
        assert_eq!(resolve("08:15", &now), at(2025, 5, 2, 8, 15, 0));
    }

    #[test]
    fn time_only_crosses_month_and_year() {
        let now = utc(2025, 12, 31, 23, 30, 0);
        assert_eq!(resolve("07:45", &now), at(2026, 1, 1, 7, 45, 0));
    }

    #[test]
    fn time_only_uses_local_date_of_now() {
        // 23:00 UTC on the 1st is already 01:00 on the 2nd at +02:00
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = utc(2025, 5, 1, 23, 0, 0).with_timezone(&plus_two);

        // 06:00 local on the 2nd
        assert_eq!(resolve("06:00", &now), at(2025, 5, 2, 4, 0, 0));
        // 00:30 local has passed, so 00:30 on the 3rd
        assert_eq!(resolve("00:30", &now), at(2025, 5, 2, 22, 30, 0));
    }

    #[test]
    fn time_only_missing_minute_defaults_to_zero() {
        let now = utc(2025, 5, 1, 6, 0, 0);
        assert_eq!(resolve("09:", &now), at(2025, 5, 1, 9, 0, 0));
    }

    #[test]
    fn time_only_rejects_malformed() {
        let now = utc(2025, 5, 1, 6, 0, 0);
        assert!(resolve("24:00", &now).is_unparseable());
        assert!(resolve("12:60", &now).is_unparseable());
        assert!(resolve(":30", &now).is_unparseable());
        assert!(resolve("ab:cd", &now).is_unparseable());
        assert!(resolve("08:00:00", &now).is_unparseable());
    }

    #[test]
    fn empty_and_blank_are_unparseable() {
        let now = utc(2025, 5, 1, 6, 0, 0);
        assert!(resolve("", &now).is_unparseable());
        assert!(resolve("   ", &now).is_unparseable());
        assert!(resolve_opt(None, &now).is_unparseable());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let now = utc(2025, 5, 1, 0, 0, 0);
        assert_eq!(
            resolve("  2025-06-01T08:00:00Z\n", &now),
            at(2025, 6, 1, 8, 0, 0)
        );
    }

    #[test]
    fn generic_fallback_formats() {
        let now = utc(2025, 5, 1, 0, 0, 0);
        assert_eq!(resolve("2025-06-01", &now), at(2025, 6, 1, 0, 0, 0));
        assert!(resolve("2025-06-31", &now).is_unparseable());
        assert!(resolve("soon", &now).is_unparseable());
    }

    #[test]
    fn rfc2822_is_unparseable_whatever_the_weekday() {
        let now = utc(2025, 5, 1, 0, 0, 0);
        for input in [
            "Mon, 02 Jun 2025 08:00:00 +0000",
            "Tue, 03 Jun 2025 08:00:00 +0000",
            "Sun, 01 Jun 2025 08:00:00 GMT",
        ] {
            assert!(resolve(input, &now).is_unparseable(), "{input}");
        }
    }

    #[test]
    fn wall_clock_time_in_dst_gap_is_unparseable() {
        // London skipped 01:00-02:00 on 2025-03-30
        let now = London.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        assert!(resolve("2025-03-30 01:30", &now).is_unparseable());
        assert!(resolve("2025-03-30T01:30:00", &now).is_unparseable());

        // Either side of the gap is fine
        assert_eq!(resolve("2025-03-30 00:30", &now), at(2025, 3, 30, 0, 30, 0));
        assert_eq!(resolve("2025-03-30 02:30", &now), at(2025, 3, 30, 1, 30, 0));
    }

    #[test]
    fn wall_clock_time_in_dst_overlap_takes_earlier_instant() {
        // London repeated 01:00-02:00 on 2025-10-26, first in BST then in GMT
        let now = London.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();

        assert_eq!(resolve("2025-10-26 01:30", &now), at(2025, 10, 26, 0, 30, 0));
        assert_eq!(resolve("2025-10-26T01:30", &now), at(2025, 10, 26, 0, 30, 0));
        assert_eq!(resolve("2025-10-26 02:30", &now), at(2025, 10, 26, 2, 30, 0));
    }

    #[test]
    fn time_only_landing_in_dst_gap_is_unparseable() {
        let now = London.with_ymd_and_hms(2025, 3, 29, 12, 0, 0).unwrap();

        // Tomorrow's 01:30 does not exist
        assert!(resolve("01:30", &now).is_unparseable());
        assert_eq!(resolve("02:30", &now), at(2025, 3, 30, 1, 30, 0));
    }

    #[test]
    fn time_only_landing_in_dst_overlap_takes_earlier_instant() {
        let now = London.with_ymd_and_hms(2025, 10, 25, 12, 0, 0).unwrap();
        assert_eq!(resolve("01:30", &now), at(2025, 10, 26, 0, 30, 0));
    }

    #[test]
    fn resolved_instant_accessors() {
        let r = at(2025, 6, 1, 8, 0, 0);
        assert!(!r.is_unparseable());
        assert_eq!(r.instant(), Some(utc(2025, 6, 1, 8, 0, 0)));
        assert_eq!(r.to_rfc3339().as_deref(), Some("2025-06-01T08:00:00+00:00"));

        let u = ResolvedInstant::Unparseable;
        assert_eq!(u.instant(), None);
        assert_eq!(u.to_rfc3339(), None);
        assert_eq!(ResolvedInstant::from(None), u);
    }
}
