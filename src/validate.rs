//! Appointment field validation.
//!
//! Dates are accepted only as `YYYY-MM-DD`. Times are accepted either as
//! 24-hour `HH:MM` or as 12-hour `H:MM AM/PM`; the 24-hour form is always
//! tried first so that `12:30` is read as half past noon.

use chrono::{NaiveDate, NaiveTime};

use crate::error::{Field, ValidationError};

pub fn validate(patient: &str, date: &str, time: &str) -> Result<(), ValidationError> {
    require(patient, Field::Patient)?;
    require(date, Field::Date)?;
    require(time, Field::Time)?;
    check_slot(date, time)
}

/// Same checks as [`validate`] without the patient, used when rescheduling.
pub fn validate_slot(date: &str, time: &str) -> Result<(), ValidationError> {
    require(date, Field::Date)?;
    require(time, Field::Time)?;
    check_slot(date, time)
}

fn require(value: &str, field: Field) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn check_slot(date: &str, time: &str) -> Result<(), ValidationError> {
    if parse_date(date).is_none() {
        return Err(ValidationError::BadDateFormat);
    }
    if parse_time(time).is_none() {
        return Err(ValidationError::BadTimeFormat);
    }
    Ok(())
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let raw = value.trim().as_bytes();
    if raw.len() != 10 || raw[4] != b'-' || raw[7] != b'-' {
        return None;
    }
    let year = digits_value(&raw[0..4])?;
    let month = digits_value(&raw[5..7])?;
    let day = digits_value(&raw[8..10])?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let raw = value.trim();
    parse_24_hour(raw).or_else(|| parse_12_hour(raw))
}

fn parse_24_hour(raw: &str) -> Option<NaiveTime> {
    let bytes = raw.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let hours = digits_value(&bytes[0..2])?;
    let minutes = digits_value(&bytes[3..5])?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

fn parse_12_hour(raw: &str) -> Option<NaiveTime> {
    let upper = raw.to_ascii_uppercase();
    let (rest, afternoon) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest, false)
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest, true)
    } else {
        return None;
    };
    let clock = rest.trim_end();
    // The meridiem must be separated from the clock by whitespace.
    if clock.len() == rest.len() {
        return None;
    }
    let (hour_part, minute_part) = clock.split_once(':')?;
    if hour_part.is_empty() || hour_part.len() > 2 || minute_part.len() != 2 {
        return None;
    }
    let mut hours = digits_value(hour_part.as_bytes())?;
    let minutes = digits_value(minute_part.as_bytes())?;
    if !(1..=12).contains(&hours) || minutes > 59 {
        return None;
    }
    if afternoon {
        if hours != 12 {
            hours += 12;
        }
    } else if hours == 12 {
        hours = 0;
    }
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

fn digits_value(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(bytes.iter().fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0')))
}
