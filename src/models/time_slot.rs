use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockParseError {
    #[error("invalid time format: {0}")]
    Format(String),
    #[error("time out of range: {0}")]
    OutOfRange(String),
}

/// Wall-clock time on a 24-hour scale, stored as minutes since midnight.
///
/// `24:00` is accepted so that a slot or booking can end at the close of
/// the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(MINUTES_PER_DAY);

    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if minute > 59 {
            return None;
        }
        let total = u16::from(hour) * 60 + u16::from(minute);
        (total <= MINUTES_PER_DAY).then_some(ClockTime(total))
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.0
    }

    /// Parses `HH:MM`, or `HH:MM:SS` as sent by some backends. Seconds are
    /// validated and then dropped.
    pub fn parse(s: &str) -> Result<Self, ClockParseError> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(ClockParseError::Format(s.to_string()));
        }

        let field = |p: &str| -> Result<u8, ClockParseError> {
            if p.is_empty() || p.len() > 2 || !p.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ClockParseError::Format(s.to_string()));
            }
            p.parse().map_err(|_| ClockParseError::Format(s.to_string()))
        };

        let hour = field(parts[0])?;
        let minute = field(parts[1])?;
        let second = match parts.get(2) {
            Some(p) => field(p)?,
            None => 0,
        };
        if second > 59 || (hour == 24 && (minute != 0 || second != 0)) {
            return Err(ClockParseError::OutOfRange(s.to_string()));
        }

        ClockTime::from_hm(hour, minute).ok_or_else(|| ClockParseError::OutOfRange(s.to_string()))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ClockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClockTime::parse(s)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ClockTime::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A half-open `[start, end)` interval used to tile a day in the schedule grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeSlot {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end
            .minutes_since_midnight()
            .saturating_sub(self.start.minutes_since_midnight())
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
