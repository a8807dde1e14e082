//! ISO-8601 repeating-interval notation used by legacy schedules.
//!
//! A legacy schedule string is a `/`-separated list of up to three parts:
//! an optional start timestamp, a mandatory `P...` period and an optional
//! occurrence count. The count may be written as a bare integer
//! (`2013-10-01T13:00:00Z/P1D/5`) or in recurrence form (`R5/...`), and the
//! parts may appear in any order.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::timestamp::parse_datetime_str;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;
const SECS_PER_WEEK: u64 = 7 * SECS_PER_DAY;
// Calendar units have no fixed length; the scheduler only understands a
// fixed period, so months and years are flattened.
const SECS_PER_MONTH: u64 = 30 * SECS_PER_DAY;
const SECS_PER_YEAR: u64 = 365 * SECS_PER_DAY;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalParseError {
    #[error("schedule string is empty")]
    Empty,

    #[error("no period component (P...) found")]
    MissingPeriod,

    #[error("duplicate {0} component")]
    Duplicate(&'static str),

    #[error("invalid period '{0}'")]
    InvalidPeriod(String),

    #[error("period '{0}' has zero length")]
    ZeroPeriod(String),

    #[error("invalid occurrence count '{0}'")]
    InvalidCount(String),

    #[error("invalid start time: {0}")]
    InvalidStart(String),
}

/// An ISO-8601 duration (`PnYnMnWnDTnHnMnS`), integer components only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsoDuration {
    pub years: u64,
    pub months: u64,
    pub weeks: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl IsoDuration {
    pub const fn days(days: u64) -> Self {
        Self {
            years: 0,
            months: 0,
            weeks: 0,
            days,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    pub const fn hours(hours: u64) -> Self {
        Self {
            years: 0,
            months: 0,
            weeks: 0,
            days: 0,
            hours,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Total length in seconds, saturating on overflow.
    pub fn total_seconds(&self) -> u64 {
        [
            (self.years, SECS_PER_YEAR),
            (self.months, SECS_PER_MONTH),
            (self.weeks, SECS_PER_WEEK),
            (self.days, SECS_PER_DAY),
            (self.hours, SECS_PER_HOUR),
            (self.minutes, SECS_PER_MINUTE),
            (self.seconds, 1),
        ]
        .iter()
        .fold(0u64, |acc, (n, unit)| acc.saturating_add(n.saturating_mul(*unit)))
    }

    pub fn as_std(&self) -> Duration {
        Duration::from_secs(self.total_seconds())
    }
}

impl FromStr for IsoDuration {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IntervalParseError::InvalidPeriod(s.to_string());
        let body = s.strip_prefix('P').ok_or_else(invalid)?;
        if body.is_empty() {
            return Err(invalid());
        }

        let mut duration = Self::default();
        let mut in_time = false;
        let mut digits = String::new();
        let mut seen_any = false;
        let mut seen_time = false;

        for ch in body.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                'T' => {
                    if in_time || !digits.is_empty() {
                        return Err(invalid());
                    }
                    in_time = true;
                }
                unit => {
                    if digits.is_empty() {
                        return Err(invalid());
                    }
                    let n: u64 = digits.parse().map_err(|_| invalid())?;
                    digits.clear();
                    let slot = match (in_time, unit) {
                        (false, 'Y') => &mut duration.years,
                        (false, 'M') => &mut duration.months,
                        (false, 'W') => &mut duration.weeks,
                        (false, 'D') => &mut duration.days,
                        (true, 'H') => &mut duration.hours,
                        (true, 'M') => &mut duration.minutes,
                        (true, 'S') => &mut duration.seconds,
                        _ => return Err(invalid()),
                    };
                    *slot = n;
                    seen_any = true;
                    seen_time |= in_time;
                }
            }
        }

        if !digits.is_empty() || !seen_any || (in_time && !seen_time) {
            return Err(invalid());
        }
        if duration.total_seconds() == 0 {
            return Err(IntervalParseError::ZeroPeriod(s.to_string()));
        }
        Ok(duration)
    }
}

impl fmt::Display for IsoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P")?;
        for (n, unit) in [(self.years, 'Y'), (self.months, 'M'), (self.weeks, 'W'), (self.days, 'D')] {
            if n > 0 {
                write!(f, "{n}{unit}")?;
            }
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            for (n, unit) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if n > 0 {
                    write!(f, "{n}{unit}")?;
                }
            }
        }
        Ok(())
    }
}

/// A parsed repeating interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoInterval {
    pub period: IsoDuration,
    pub start: Option<DateTime<Utc>>,
    /// `None` means "repeat forever".
    pub occurrences: Option<u32>,
}

impl FromStr for IsoInterval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IntervalParseError::Empty);
        }

        let mut period = None;
        let mut start = None;
        let mut occurrences = None;
        let mut count_seen = false;

        for part in s.split('/') {
            if let Some(recurrence) = part.strip_prefix('R') {
                if count_seen {
                    return Err(IntervalParseError::Duplicate("occurrence count"));
                }
                count_seen = true;
                if !recurrence.is_empty() {
                    occurrences = Some(parse_count(recurrence)?);
                }
            } else if part.starts_with('P') {
                if period.is_some() {
                    return Err(IntervalParseError::Duplicate("period"));
                }
                period = Some(part.parse::<IsoDuration>()?);
            } else if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                if count_seen {
                    return Err(IntervalParseError::Duplicate("occurrence count"));
                }
                count_seen = true;
                occurrences = Some(parse_count(part)?);
            } else {
                if start.is_some() {
                    return Err(IntervalParseError::Duplicate("start time"));
                }
                start = Some(parse_datetime_str(part).map_err(IntervalParseError::InvalidStart)?);
            }
        }

        Ok(Self {
            period: period.ok_or(IntervalParseError::MissingPeriod)?,
            start,
            occurrences,
        })
    }
}

fn parse_count(s: &str) -> Result<u32, IntervalParseError> {
    s.parse::<u32>()
        .map_err(|_| IntervalParseError::InvalidCount(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_start_and_period() {
        let interval: IsoInterval = "2013-10-01T13:00:00Z/P1D".parse().unwrap();
        assert_eq!(interval.period, IsoDuration::days(1));
        assert_eq!(
            interval.start.map(|s| s.to_rfc3339()),
            Some("2013-10-01T13:00:00+00:00".to_string())
        );
        assert_eq!(interval.occurrences, None);
    }

    #[test]
    fn test_trailing_count_and_recurrence_prefix() {
        let trailing: IsoInterval = "2013-10-01T13:00:00Z/PT6H/5".parse().unwrap();
        assert_eq!(trailing.period, IsoDuration::hours(6));
        assert_eq!(trailing.occurrences, Some(5));

        let prefixed: IsoInterval = "R5/2013-10-01T13:00:00Z/PT6H".parse().unwrap();
        assert_eq!(prefixed, trailing);

        let unbounded: IsoInterval = "R/PT1H".parse().unwrap();
        assert_eq!(unbounded.occurrences, None);
        assert_eq!(unbounded.start, None);
    }

    #[test]
    fn test_period_only() {
        let interval: IsoInterval = "P1W".parse().unwrap();
        assert_eq!(interval.period.total_seconds(), 7 * 86_400);
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!("".parse::<IsoInterval>(), Err(IntervalParseError::Empty));
        assert_eq!(
            "2013-10-01T13:00:00Z".parse::<IsoInterval>(),
            Err(IntervalParseError::MissingPeriod)
        );
        assert!(matches!(
            "2013-10-01T13:00:00Z/P1D/P2D".parse::<IsoInterval>(),
            Err(IntervalParseError::Duplicate("period"))
        ));
        assert!(matches!(
            "not-a-date/P1D".parse::<IsoInterval>(),
            Err(IntervalParseError::InvalidStart(_))
        ));
        assert!(matches!(
            "R5/P1D/3".parse::<IsoInterval>(),
            Err(IntervalParseError::Duplicate("occurrence count"))
        ));
        assert!(matches!(
            "Rx/P1D".parse::<IsoInterval>(),
            Err(IntervalParseError::InvalidCount(_))
        ));
    }

    #[test]
    fn test_duration_grammar() {
        let d: IsoDuration = "P1Y2M3W4DT5H6M7S".parse().unwrap();
        assert_eq!(
            d,
            IsoDuration {
                years: 1,
                months: 2,
                weeks: 3,
                days: 4,
                hours: 5,
                minutes: 6,
                seconds: 7
            }
        );
        assert_eq!("PT90M".parse::<IsoDuration>().unwrap().as_std(), Duration::from_secs(5400));

        for bad in ["P", "PT", "1D", "P1H", "PT1D", "P1DT", "PD", "P1.5D", "P1D2"] {
            assert!(bad.parse::<IsoDuration>().is_err(), "{bad} should be rejected");
        }
        assert!(matches!(
            "PT0S".parse::<IsoDuration>(),
            Err(IntervalParseError::ZeroPeriod(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_duration_display_parses_back(
            days in 0u64..400,
            hours in 0u64..48,
            minutes in 0u64..120,
            seconds in 1u64..120,
        ) {
            let d = IsoDuration { days, hours, minutes, seconds, ..IsoDuration::default() };
            let reparsed: IsoDuration = d.to_string().parse().unwrap();
            prop_assert_eq!(reparsed.total_seconds(), d.total_seconds());
        }

        #[test]
        fn prop_interval_parser_never_panics(s in "\\PC{0,40}") {
            let _ = s.parse::<IsoInterval>();
        }
    }
}
