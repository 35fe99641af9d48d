/// Closed date intervals and partial-date parsing.
///
/// A partial date names the widest interval it could mean:
///
/// | Input        | Interval                                       |
/// |--------------|------------------------------------------------|
/// | `2025`       | `2025-01-01 00:00:00` ..= `2025-12-31 23:59:59` |
/// | `2025-02`    | `2025-02-01 00:00:00` ..= `2025-02-28 23:59:59` |
/// | `2025-02-14` | `2025-02-14 00:00:00` ..= `2025-02-14 00:00:00` |
///
/// Anything else (other separators, missing zero padding, impossible
/// months or days, years before 1900) is unparseable and yields `None`.
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Earliest year a partial date may name.
pub const MIN_YEAR: i32 = 1900;

static PARTIAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(?:-(\d{2})(?:-(\d{2}))?)?$").expect("partial date pattern is valid")
});

/// A closed, inclusive interval of calendar instants.
///
/// `start <= end` always holds; there is no way to build an inverted
/// interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DateInterval {
    /// Build an interval, or `None` if `start > end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// A degenerate interval covering a single instant.
    pub fn instant(at: NaiveDateTime) -> Self {
        Self { start: at, end: at }
    }

    /// Every instant of the given days, from the first midnight to the
    /// last second of `last`.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Option<Self> {
        Self::new(start_of_day(first), last.and_hms_opt(23, 59, 59)?)
    }

    /// First instant of the interval.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Last instant of the interval.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Whether the two closed intervals share at least one instant.
    ///
    /// Touching endpoints count as overlap. Symmetric and reflexive.
    pub fn overlaps(&self, other: &DateInterval) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}]",
            self.start.format("%Y-%m-%dT%H:%M:%S"),
            self.end.format("%Y-%m-%dT%H:%M:%S")
        )
    }
}

/// Whether two closed intervals intersect.
pub fn overlaps(a: &DateInterval, b: &DateInterval) -> bool {
    a.overlaps(b)
}

/// Parse `YYYY`, `YYYY-MM` or `YYYY-MM-DD` into the interval it denotes.
///
/// Returns `None` for any other shape, an impossible calendar date, or a
/// year before [`MIN_YEAR`].
pub fn parse_partial_date(input: &str) -> Option<DateInterval> {
    let caps = PARTIAL_DATE.captures(input)?;
    let year: i32 = caps[1].parse().ok()?;
    if year < MIN_YEAR {
        return None;
    }
    let month: Option<u32> = caps.get(2).map(|m| m.as_str().parse()).transpose().ok()?;
    let day: Option<u32> = caps.get(3).map(|d| d.as_str().parse()).transpose().ok()?;

    match (month, day) {
        (Some(month), Some(day)) => {
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            Some(DateInterval::instant(start_of_day(date)))
        }
        (Some(month), None) => {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            DateInterval::days(first, last_day_of_month(first)?)
        }
        _ => DateInterval::days(
            NaiveDate::from_ymd_opt(year, 1, 1)?,
            NaiveDate::from_ymd_opt(year, 12, 31)?,
        ),
    }
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Wire form of a [`DateInterval`]: two instants, validated on the way in.
#[derive(Deserialize)]
struct RawInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl<'de> Deserialize<'de> for DateInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawInterval::deserialize(deserializer)?;
        DateInterval::new(raw.start, raw.end).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "interval start {} is after end {}",
                raw.start, raw.end
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_year_only() {
        let interval = parse_partial_date("2025").unwrap();
        assert_eq!(interval.start(), at(2025, 1, 1, 0, 0, 0));
        assert_eq!(interval.end(), at(2025, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_year_month_uses_real_month_length() {
        let feb = parse_partial_date("2025-02").unwrap();
        assert_eq!(feb.start(), at(2025, 2, 1, 0, 0, 0));
        assert_eq!(feb.end(), at(2025, 2, 28, 23, 59, 59));

        let leap_feb = parse_partial_date("2024-02").unwrap();
        assert_eq!(leap_feb.end(), at(2024, 2, 29, 23, 59, 59));

        assert_eq!(
            parse_partial_date("2025-04").unwrap().end(),
            at(2025, 4, 30, 23, 59, 59)
        );
        assert_eq!(
            parse_partial_date("2025-12").unwrap().end(),
            at(2025, 12, 31, 23, 59, 59)
        );
    }

    #[test]
    fn test_full_date_is_single_instant() {
        let interval = parse_partial_date("2025-06-15").unwrap();
        assert_eq!(interval.start(), at(2025, 6, 15, 0, 0, 0));
        assert_eq!(interval.start(), interval.end());
    }

    #[test]
    fn test_unparseable() {
        for input in [
            "abc",
            "",
            "2025-13",
            "2025-00",
            "2025-02-30",
            "2025-2",
            "2025/02",
            "25",
            "1899",
            "2025-06-15T10:00",
            " 2025",
        ] {
            assert!(parse_partial_date(input).is_none(), "{input:?} should not parse");
        }
        assert!(parse_partial_date("1900").is_some());
        assert!(parse_partial_date("2024-02-29").is_some());
    }

    #[test]
    fn test_overlap_touching_endpoints() {
        let a = DateInterval::new(at(2025, 1, 1, 0, 0, 0), at(2025, 1, 5, 0, 0, 0)).unwrap();
        let b = DateInterval::new(at(2025, 1, 5, 0, 0, 0), at(2025, 1, 10, 0, 0, 0)).unwrap();
        let c = DateInterval::new(at(2025, 1, 6, 0, 0, 0), at(2025, 1, 10, 0, 0, 0)).unwrap();
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
        assert!(!overlaps(&a, &c));
        assert!(!overlaps(&c, &a));
        assert!(overlaps(&a, &a));
    }

    #[test]
    fn test_no_inverted_intervals() {
        assert!(DateInterval::new(at(2025, 2, 1, 0, 0, 0), at(2025, 1, 1, 0, 0, 0)).is_none());
        let parsed: Result<DateInterval, _> = serde_json::from_value(serde_json::json!({
            "start": "2025-02-01T00:00:00",
            "end": "2025-01-01T00:00:00"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_display() {
        let interval = parse_partial_date("2025-02").unwrap();
        assert_eq!(
            interval.to_string(),
            "[2025-02-01T00:00:00, 2025-02-28T23:59:59]"
        );
    }
}
