use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Get the current date and time in `canonical_timezone`, e.g. "Europe/Brussels".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone name is not a known,
/// canonical timezone.
pub fn now_in(canonical_timezone: &str) -> Result<OffsetDateTime, Error> {
    let offset = get_local_offset(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })?;

    Ok(OffsetDateTime::now_utc().to_offset(offset))
}

/// Get today's date in `canonical_timezone`.
pub fn today_in(canonical_timezone: &str) -> Result<Date, Error> {
    now_in(canonical_timezone).map(|now| now.date())
}
