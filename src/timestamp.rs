//! Display timestamps in the fixed `DD-MM-YYYY-HH:MMAM/PM` layout.
//!
//! The hour is written on the 24-hour clock and the marker is derived from
//! it, so `14:05PM` and `09:30AM` are both canonical. On parse a `PM`
//! marker lifts hours below 12 and `AM` maps 12 to midnight.

use time::{Date, Month, PrimitiveDateTime, Time};

pub const TIMESTAMP_LAYOUT: &str = "DD-MM-YYYY-HH:MMAM/PM";

pub fn format(value: PrimitiveDateTime) -> String {
    let hour = value.hour();
    let marker = if hour >= 12 { "PM" } else { "AM" };
    format!(
        "{:02}-{:02}-{:04}-{:02}:{:02}{}",
        value.day(),
        u8::from(value.month()),
        value.year(),
        hour,
        value.minute(),
        marker
    )
}

/// Returns `None` for anything that does not follow the layout exactly.
pub fn parse(value: &str) -> Option<PrimitiveDateTime> {
    let (body, pm) = if let Some(body) = value.strip_suffix("PM") {
        (body, true)
    } else if let Some(body) = value.strip_suffix("AM") {
        (body, false)
    } else {
        return None;
    };

    let mut parts = body.splitn(4, '-');
    let day = digits(parts.next()?, 2)?;
    let month = digits(parts.next()?, 2)?;
    let year = digits(parts.next()?, 4)?;
    let (hour, minute) = parts.next()?.split_once(':')?;
    let mut hour = digits(hour, 2)?;
    let minute = digits(minute, 2)?;

    if pm && hour < 12 {
        hour += 12;
    } else if !pm && hour == 12 {
        hour = 0;
    }

    let month = Month::try_from(u8::try_from(month).ok()?).ok()?;
    let date = Date::from_calendar_date(i32::try_from(year).ok()?, month, u8::try_from(day).ok()?)
        .ok()?;
    let time = Time::from_hms(u8::try_from(hour).ok()?, u8::try_from(minute).ok()?, 0).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

fn digits(value: &str, width: usize) -> Option<u32> {
    if value.len() != width || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
