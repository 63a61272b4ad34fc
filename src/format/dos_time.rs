//! Packed DOS date/time stamps.
//!
//! Entry timestamps are stored as a 32-bit DOS date (high word) and time (low
//! word) in local time:
//!
//! - time: bits 0-4 seconds/2, bits 5-10 minutes, bits 11-15 hours
//! - date: bits 0-4 day, bits 5-8 month, bits 9-15 years since 1980
//!
//! Resolution is two seconds and the representable range is 1980-01-01
//! through 2107-12-31.

use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};

use crate::{Error, Result};

const DOS_EPOCH_YEAR: i32 = 1980;
const DOS_MAX_YEAR: i32 = DOS_EPOCH_YEAR + 127;

/// A packed local DOS date/time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DosDateTime(u32);

impl DosDateTime {
    /// Wraps a raw packed value as read from an entry header.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw packed value.
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// Returns the DOS date word.
    pub const fn date(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Returns the DOS time word.
    pub const fn time(self) -> u16 {
        self.0 as u16
    }

    /// Packs a local calendar time. Odd seconds round down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFormat`] for years outside 1980..=2107.
    pub fn from_naive(local: NaiveDateTime) -> Result<Self> {
        let year = local.year();
        if !(DOS_EPOCH_YEAR..=DOS_MAX_YEAR).contains(&year) {
            return Err(Error::UnknownFormat(format!(
                "year {} is outside the DOS date range",
                year
            )));
        }
        let date = local.day() | (local.month() << 5) | (((year - DOS_EPOCH_YEAR) as u32) << 9);
        let time = (local.second() / 2) | (local.minute() << 5) | (local.hour() << 11);
        Ok(Self((date << 16) | time))
    }

    /// Packs a filesystem time, converted to the local time zone.
    pub fn from_system_time(time: SystemTime) -> Result<Self> {
        let local: DateTime<Local> = time.into();
        Self::from_naive(local.naive_local())
    }

    /// Unpacks to a local calendar time.
    ///
    /// Returns `None` if the packed fields do not form a valid date.
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        let date = u32::from(self.date());
        let time = u32::from(self.time());
        let year = DOS_EPOCH_YEAR + (date >> 9) as i32;
        let month = (date >> 5) & 0x0F;
        let day = date & 0x1F;
        let hour = time >> 11;
        let minute = (time >> 5) & 0x3F;
        let second = (time & 0x1F) * 2;
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
    }

    /// Unpacks to a filesystem time, interpreting the fields as local time.
    ///
    /// Returns `None` for invalid fields or a local time that does not exist
    /// (skipped by a daylight saving transition).
    pub fn to_system_time(self) -> Option<SystemTime> {
        let naive = self.to_naive()?;
        let local = Local.from_local_datetime(&naive).earliest()?;
        Some(local.into())
    }
}

impl std::fmt::Display for DosDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_naive() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "-"),
        }
    }
}
