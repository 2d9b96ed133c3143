use crate::error::CestaError;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, UtcOffset};

/// Format a timestamp as RFC 3339 in UTC.
pub fn format_rfc3339(ts: OffsetDateTime) -> String {
    ts.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .expect("RFC3339 formatting should not fail")
}

pub fn now_rfc3339() -> String {
    format_rfc3339(OffsetDateTime::now_utc())
}

/// Parse a stored RFC 3339 timestamp. `None` when malformed.
pub fn parse_rfc3339(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339).ok()
}

/// Where calendar days begin and end for "same day" price de-duplication.
///
/// Days are cut at midnight in a fixed UTC offset taken from config rather than
/// the host's local clock, so two machines agree on which records collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    offset: UtcOffset,
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::UTC
    }
}

impl DayBoundary {
    pub const UTC: DayBoundary = DayBoundary {
        offset: UtcOffset::UTC,
    };

    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Parse `Z`, `UTC`, `+HH:MM`, `-HH:MM` or `±HH`.
    pub fn parse(s: &str) -> Result<Self, CestaError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Ok(Self::UTC);
        }
        let invalid = || CestaError::InvalidUtcOffset(s.to_string());
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1i8, &s[1..]),
            Some(b'-') => (-1i8, &s[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None => (rest, "0"),
        };
        let hours: i8 = hours.parse().map_err(|_| invalid())?;
        let minutes: i8 = minutes.parse().map_err(|_| invalid())?;
        if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
            return Err(invalid());
        }
        let offset =
            UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(|_| invalid())?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Calendar day of `ts` on this boundary.
    pub fn day_of(&self, ts: OffsetDateTime) -> Date {
        ts.to_offset(self.offset).date()
    }

    /// Whether a stored timestamp falls on the same calendar day as `ts`.
    /// Malformed stored timestamps never match.
    pub fn same_day(&self, stored: &str, ts: OffsetDateTime) -> bool {
        parse_rfc3339(stored).is_some_and(|t| self.day_of(t) == self.day_of(ts))
    }
}

impl std::fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.offset.is_negative() { '-' } else { '+' };
        write!(
            f,
            "{sign}{:02}:{:02}",
            self.offset.whole_hours().unsigned_abs(),
            self.offset.minutes_past_hour().unsigned_abs()
        )
    }
}
