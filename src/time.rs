//! Absolute and relative time values.
//!
//! An [`AbsTime`] is a point in time plus the UTC offset it should be shown
//! in. Timestamps that arrive with timezone information keep their offset;
//! naive timestamps are taken to be local time and are normalized to UTC by
//! subtracting the local offset in effect at that instant.
//!
//! ```
//! use chrono::{FixedOffset, NaiveDate};
//! use classad_lang::AbsTime;
//!
//! let naive = NaiveDate::from_ymd_opt(2024, 6, 1)
//!     .unwrap()
//!     .and_hms_opt(12, 0, 0)
//!     .unwrap();
//! let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
//! let t = AbsTime::from_naive_in(&naive, &plus_two);
//! assert_eq!(t.to_string(), "2024-06-01 10:00:00+00:00");
//! ```

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static ABS_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(\d{4})-(\d{2})-(\d{2})[T ](\d{2}):(\d{2})(?::(\d{2}))?\s*(Z|z|[+-]\d{2}(?::?\d{2})?)?\s*$",
    )
    .expect("absolute time pattern is valid")
});

static REL_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-)?(?:(\d+)\+)?(\d+):(\d{2}):(\d{2}(?:\.\d+)?)\s*$")
        .expect("relative time pattern is valid")
});

/// A point in time with the UTC offset it is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbsTime {
    secs: i64,
    offset: i32,
}

impl AbsTime {
    /// `secs` since the Unix epoch, shown at `offset` seconds east of UTC.
    ///
    /// The text form only carries whole minutes, so the offset is rounded to
    /// the nearest minute. The instant itself is unchanged.
    pub fn new(secs: i64, offset: i32) -> Self {
        AbsTime {
            secs,
            offset: whole_minutes(offset),
        }
    }

    pub fn secs(&self) -> i64 {
        self.secs
    }

    /// Seconds east of UTC.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Keep the offset of an aware timestamp, rounded to whole minutes.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        AbsTime::new(dt.timestamp(), dt.offset().fix().local_minus_utc())
    }

    /// Interpret a naive timestamp as local time and normalize it to UTC.
    pub fn from_naive_local(naive: &NaiveDateTime) -> Self {
        Self::from_naive_in(naive, &Local)
    }

    /// Interpret a naive timestamp as wall-clock time in `tz` and normalize
    /// it to UTC.
    ///
    /// During a backward DST transition the earlier reading wins; inside a
    /// forward gap the offset in effect at the same UTC instant is used.
    pub fn from_naive_in<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Self {
        let offset = match tz.offset_from_local_datetime(naive).earliest() {
            Some(offset) => offset.fix(),
            None => tz.offset_from_utc_datetime(naive).fix(),
        };
        AbsTime {
            secs: naive.and_utc().timestamp() - i64::from(offset.local_minus_utc()),
            offset: 0,
        }
    }

    /// The instant at its stored offset, if both are in chrono's range.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.offset)?;
        let utc = DateTime::<Utc>::from_timestamp(self.secs, 0)?;
        Some(utc.with_timezone(&offset))
    }

    /// Parse `YYYY-MM-DD HH:MM[:SS][offset]`, with `T` also accepted as the
    /// separator. Without an offset the time is local.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = ABS_TIME.captures(text)?;
        let field = |i: usize| caps.get(i).map_or("0", |m| m.as_str());
        let naive = chrono::NaiveDate::from_ymd_opt(
            field(1).parse().ok()?,
            field(2).parse().ok()?,
            field(3).parse().ok()?,
        )?
        .and_hms_opt(
            field(4).parse().ok()?,
            field(5).parse().ok()?,
            field(6).parse().ok()?,
        )?;

        match caps.get(7).map(|m| m.as_str()) {
            None => Some(Self::from_naive_local(&naive)),
            Some("Z" | "z") => Some(Self::from_datetime(&naive.and_utc())),
            Some(zone) => {
                let sign = if zone.starts_with('-') { -1 } else { 1 };
                let digits: String = zone[1..].chars().filter(|c| *c != ':').collect();
                let hours: i32 = digits.get(..2)?.parse().ok()?;
                let minutes: i32 = match digits.get(2..) {
                    Some("") | None => 0,
                    Some(m) => m.parse().ok()?,
                };
                let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
                let local = offset.from_local_datetime(&naive).single()?;
                Some(Self::from_datetime(&local))
            }
        }
    }
}

/// Nearest whole minute, kept inside the range chrono accepts.
fn whole_minutes(offset: i32) -> i32 {
    let minutes = (offset.abs() + 30) / 60 * offset.signum();
    (minutes * 60).clamp(-86_340, 86_340)
}

impl fmt::Display for AbsTime {
    /// `YYYY-MM-DD HH:MM:SS+HH:MM`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%:z")),
            None => write!(f, "{}", self.secs),
        }
    }
}

/// A duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RelTime(f64);

impl RelTime {
    pub fn from_seconds(seconds: f64) -> Self {
        RelTime(seconds)
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }

    /// Parse `[-][D+]HH:MM:SS[.frac]` or a plain number of seconds.
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(caps) = REL_TIME.captures(text) {
            let days: f64 = caps.get(2).map_or(Some(0.0), |m| m.as_str().parse().ok())?;
            let hours: f64 = caps[3].parse().ok()?;
            let minutes: f64 = caps[4].parse().ok()?;
            let seconds: f64 = caps[5].parse().ok()?;
            let whole = days * 86400.0 + hours * 3600.0 + minutes * 60.0;
            let total = whole + seconds;
            return Some(RelTime(if caps.get(1).is_some() { -total } else { total }));
        }
        text.trim().parse::<f64>().ok().filter(|s| s.is_finite()).map(RelTime)
    }
}

impl From<std::time::Duration> for RelTime {
    fn from(d: std::time::Duration) -> Self {
        RelTime(d.as_secs_f64())
    }
}

impl From<chrono::TimeDelta> for RelTime {
    fn from(d: chrono::TimeDelta) -> Self {
        let secs = d.num_seconds() as f64;
        let nanos = f64::from(d.subsec_nanos()) / 1e9;
        RelTime(secs + nanos)
    }
}

impl fmt::Display for RelTime {
    /// `[-][D+]HH:MM:SS[.frac]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.is_finite() {
            return write!(f, "{}", self.0);
        }
        let magnitude = self.0.abs();
        if magnitude >= u64::MAX as f64 {
            // too many days for the clock form; plain seconds parse back exactly
            return write!(f, "{:?}", self.0);
        }
        let sign = if self.0.is_sign_negative() { "-" } else { "" };
        let whole = magnitude.trunc();
        let fraction = magnitude - whole;

        let whole = whole as u64;
        let days = whole / 86400;
        let hours = (whole % 86400) / 3600;
        let minutes = (whole % 3600) / 60;
        let seconds = whole % 60;

        write!(f, "{}", sign)?;
        if days > 0 {
            write!(f, "{}+", days)?;
        }
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)?;
        if fraction > 0.0 {
            // "0.25" -> ".25"
            let digits = format!("{}", fraction);
            write!(f, "{}", digits.trim_start_matches('0'))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_aware_keeps_offset() {
        let t = AbsTime::parse("2024-06-01 12:00:00+05:00").unwrap();
        assert_eq!(t.offset(), 5 * 3600);
        assert_eq!(t.to_string(), "2024-06-01 12:00:00+05:00");
    }

    #[test]
    fn test_utc_designator() {
        let t = AbsTime::parse("2024-06-01T10:00:00Z").unwrap();
        assert_eq!(t.to_string(), "2024-06-01 10:00:00+00:00");
    }

    #[test]
    fn test_naive_in_zone() {
        let naive = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let zone = FixedOffset::east_opt(7200).unwrap();
        let t = AbsTime::from_naive_in(&naive, &zone);
        assert_eq!(t.offset(), 0);
        assert_eq!(t.to_string(), "2024-06-01 10:00:00+00:00");
    }

    #[test]
    fn test_rel_time_format() {
        assert_eq!(RelTime::from_seconds(93784.0).to_string(), "1+02:03:04");
        assert_eq!(RelTime::from_seconds(-61.0).to_string(), "-00:01:01");
        assert_eq!(RelTime::from_seconds(3.25).to_string(), "00:00:03.25");
    }

    #[test]
    fn test_rel_time_parse() {
        assert_eq!(RelTime::parse("1+02:03:04"), Some(RelTime::from_seconds(93784.0)));
        assert_eq!(RelTime::parse("-00:01:01"), Some(RelTime::from_seconds(-61.0)));
        assert_eq!(RelTime::parse("90"), Some(RelTime::from_seconds(90.0)));
        assert_eq!(RelTime::parse("soon"), None);
    }

    #[test]
    fn test_huge_rel_time_reads_back() {
        for seconds in [1e30, -1e30, u64::MAX as f64] {
            let t = RelTime::from_seconds(seconds);
            assert_eq!(RelTime::parse(&t.to_string()), Some(t));
        }
        assert_eq!(RelTime::from_seconds(1e30).to_string(), "1e30");
    }

    #[test]
    fn test_offset_rounded_to_minutes() {
        let t = AbsTime::new(0, 30);
        assert_eq!(t.offset(), 60);
        assert_eq!(t.to_string(), "1970-01-01 00:01:00+00:01");
        assert_eq!(AbsTime::parse(&t.to_string()), Some(t));

        assert_eq!(AbsTime::new(0, -29).offset(), 0);
        assert_eq!(AbsTime::new(0, -90).offset(), -120);
        assert_eq!(AbsTime::new(0, 86_399).offset(), 86_340);

        let odd = FixedOffset::east_opt(3600 + 45).unwrap();
        let dt = odd.timestamp_opt(1_000_000, 0).unwrap();
        let t = AbsTime::from_datetime(&dt);
        assert_eq!(t.offset(), 3660);
        assert_eq!(t.secs(), 1_000_000);
        assert_eq!(AbsTime::parse(&t.to_string()), Some(t));
    }
}
