use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval. The set is closed: intervals are never derived from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
}

impl Interval {
    /// Every supported interval, shortest first.
    pub const ALL: [Interval; 7] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::OneHour,
        Interval::FourHours,
        Interval::OneDay,
        Interval::OneWeek,
    ];

    /// Intervals tracked when no configuration overrides them.
    pub const DEFAULT_SET: [Interval; 4] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::OneHour,
        Interval::OneDay,
    ];

    /// Length of the interval in seconds.
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        match self {
            Interval::OneMinute => 60,
            Interval::FiveMinutes => 300,
            Interval::FifteenMinutes => 900,
            Interval::OneHour => 3_600,
            Interval::FourHours => 14_400,
            Interval::OneDay => 86_400,
            Interval::OneWeek => 604_800,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1w",
        }
    }

    /// Looks up the interval with the given length.
    #[must_use]
    pub fn from_secs(secs: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_secs() == secs)
    }
}

impl FromStr for Interval {
    type Err = DomainError;

    /// Accepts a label (`"1h"`) or a length in seconds (`"3600"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(interval) = Self::ALL.into_iter().find(|i| i.label() == s) {
            return Ok(interval);
        }
        s.parse::<u64>()
            .ok()
            .and_then(Self::from_secs)
            .ok_or_else(|| DomainError::UnknownInterval(s.to_string()))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_and_seconds() {
        assert_eq!("1h".parse::<Interval>().unwrap(), Interval::OneHour);
        assert_eq!("300".parse::<Interval>().unwrap(), Interval::FiveMinutes);
        assert!("7m".parse::<Interval>().is_err());
        assert!("61".parse::<Interval>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Interval::DEFAULT_SET).unwrap();
        assert_eq!(json, r#"["1m","5m","1h","1d"]"#);
        let back: Vec<Interval> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Interval::DEFAULT_SET.to_vec());
    }
}
