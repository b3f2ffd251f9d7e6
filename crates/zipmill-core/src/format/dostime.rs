//! MS-DOS date/time packing.
//!
//! ZIP headers store modification times as two 16-bit fields in local
//! time: `time = hour << 11 | minute << 5 | second / 2` and
//! `date = (year - 1980) << 9 | month << 5 | day`. Resolution is two
//! seconds; years before 1980 cannot be represented.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Timelike};
use std::time::SystemTime;

/// Packs a timestamp into DOS `(time, date)` fields, in local time.
///
/// Timestamps before 1980 clamp to the DOS epoch.
#[must_use]
pub fn to_dos(mtime: SystemTime) -> (u16, u16) {
    let local: DateTime<Local> = mtime.into();
    let year = local.year().max(1980);

    let time = (local.hour() << 11) | (local.minute() << 5) | (local.second() / 2);
    let date = (((year - 1980) as u32) << 9) | (local.month() << 5) | local.day();
    (time as u16, date as u16)
}

/// Unpacks DOS `(time, date)` fields into a timestamp.
///
/// An all-zero time/date pair decodes to the current wall-clock time, as
/// does any field combination that names an impossible calendar date.
/// Both substitutions are legacy behavior carried over from archives
/// produced by lenient writers.
#[must_use]
pub fn from_dos(time: u16, date: u16) -> SystemTime {
    if time == 0 && date == 0 {
        return SystemTime::now();
    }

    let hour = u32::from((time & 0xF800) >> 11);
    let minute = u32::from((time & 0x07E0) >> 5);
    let second = u32::from(time & 0x001F) * 2;

    let year = i32::from((date & 0xFE00) >> 9) + 1980;
    let month = u32::from((date & 0x01E0) >> 5);
    let day = u32::from(date & 0x001F);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .and_then(|naive| Local.from_local_datetime(&naive).single())
        .map_or_else(SystemTime::now, SystemTime::from)
}
