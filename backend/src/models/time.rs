use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ProgrammeError;

/// Time of day with minute resolution, stored as minutes since midnight.
///
/// Feeds publish times as `H:MM` or `HH:MM` strings; comparing them as text only
/// works once they are zero-padded, so every time is parsed into this type at the
/// edge and compared numerically afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build a time from an hour (0-23) and a minute (0-59).
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, ProgrammeError> {
        if hour > 23 || minute > 59 {
            return Err(ProgrammeError::InvalidTime(format!(
                "{}:{:02} is out of range",
                hour, minute
            )));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Minutes elapsed since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }
}

impl FromStr for TimeOfDay {
    type Err = ProgrammeError;

    /// Parse `H:MM`, `HH:MM` or `HHhMM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ProgrammeError::InvalidTime(format!("'{}'", s));

        let (hour, minute) = trimmed
            .split_once(':')
            .or_else(|| trimmed.split_once('h'))
            .ok_or_else(invalid)?;

        if hour.is_empty()
            || hour.len() > 2
            || minute.len() != 2
            || !hour.bytes().all(|b| b.is_ascii_digit())
            || !minute.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let hour: u16 = hour.parse().map_err(|_| invalid())?;
        let minute: u16 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
