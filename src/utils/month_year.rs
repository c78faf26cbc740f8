use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])-(\d{4})$").expect("valid month/year regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month/year {0:?}, expected MM-YYYY")]
pub struct ParseMonthYearError(String);

/// A calendar month, written `MM-YYYY` on the wire and kept as the first day
/// of that month everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear(NaiveDate);

impl MonthYear {
    pub fn new(month: u32, year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Any day inside the month maps to that month.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl FromStr for MonthYear {
    type Err = ParseMonthYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = MONTH_YEAR_RE
            .captures(s)
            .ok_or_else(|| ParseMonthYearError(s.to_string()))?;
        let month: u32 = caps[1]
            .parse()
            .map_err(|_| ParseMonthYearError(s.to_string()))?;
        let year: i32 = caps[2]
            .parse()
            .map_err(|_| ParseMonthYearError(s.to_string()))?;
        MonthYear::new(month, year).ok_or_else(|| ParseMonthYearError(s.to_string()))
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl Serialize for MonthYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let m: MonthYear = "07-2023".parse().unwrap();
        assert_eq!(m.month(), 7);
        assert_eq!(m.year(), 2023);
        assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
        assert_eq!(m.to_string(), "07-2023");
    }

    #[test]
    fn test_parse_rejects_other_layouts() {
        for raw in ["2023-07", "7-2023", "13-2023", "00-2023", "07-23", " 07-2023", "07/2023", ""] {
            assert!(raw.parse::<MonthYear>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_ordering_is_chronological() {
        let dec: MonthYear = "12-2023".parse().unwrap();
        let jan: MonthYear = "01-2024".parse().unwrap();
        assert!(dec < jan);
    }

    #[test]
    fn test_from_date_truncates_to_month() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(MonthYear::from_date(date).to_string(), "02-2024");
    }

    #[test]
    fn test_serde_uses_wire_format() {
        let m: MonthYear = serde_json::from_str("\"03-2025\"").unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"03-2025\"");
        assert!(serde_json::from_str::<MonthYear>("\"2025-03\"").is_err());
    }
}
