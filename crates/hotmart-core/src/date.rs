//! Calendar date to epoch-millisecond conversion.
//!
//! Hotmart date filters are millisecond timestamps. Dates are read as
//! `YYYY-MM-DD` and anchored at midnight in an explicit UTC offset so results
//! never depend on the host timezone.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts `YYYY-MM-DD` strings into epoch milliseconds at local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    offset: FixedOffset,
}

impl DateNormalizer {
    /// Normalizer anchored at UTC midnight.
    #[must_use]
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Normalizer for a fixed offset expressed in minutes east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the offset is outside ±24h.
    pub fn with_offset_minutes(minutes: i32) -> Result<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or_else(|| Error::ConfigError(format!("UTC offset out of range: {minutes} minutes")))
    }

    /// The offset midnight is anchored in.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parse a strict `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDateFormat`] for anything else, including
    /// unpadded fields (`2024-1-1`) and impossible dates (`2024-02-30`).
    pub fn parse_date(input: &str) -> Result<NaiveDate> {
        let bytes = input.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shaped {
            return Err(Error::InvalidDateFormat(input.to_string()));
        }

        NaiveDate::parse_from_str(input, DATE_FORMAT)
            .map_err(|_| Error::InvalidDateFormat(input.to_string()))
    }

    /// Milliseconds since the Unix epoch at midnight of `input` in this offset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDateFormat`] when `input` is not a valid `YYYY-MM-DD` date.
    pub fn to_millis(&self, input: &str) -> Result<i64> {
        let date = Self::parse_date(input)?;
        self.offset
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .single()
            .map(|datetime| datetime.timestamp_millis())
            .ok_or_else(|| Error::InvalidDateFormat(input.to_string()))
    }

    /// Render epoch milliseconds back as a date in this offset.
    #[must_use]
    pub fn format_millis(&self, millis: i64) -> Option<String> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(|datetime| {
            datetime
                .with_timezone(&self.offset)
                .format(DATE_FORMAT)
                .to_string()
        })
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::utc()
    }
}
