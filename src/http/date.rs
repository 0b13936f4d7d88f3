//! HTTP date handling.
//!
//! Three historical formats are accepted on input, picked by the length of
//! the first whitespace-delimited token:
//!
//! ```text
//! "Sun,"      -> RFC 822/1123   Sun, 06 Nov 1994 08:49:37 GMT
//! "Sun"       -> ANSI C asctime Sun Nov  6 08:49:37 1994
//! "Sunday,"   -> RFC 850        Sunday, 06-Nov-94 08:49:37 GMT
//! ```
//!
//! Output is always RFC 1123.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};

const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";
const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";

/// Formats `date` as an RFC 1123 date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(date: &DateTime<Utc>) -> String {
    date.format(RFC1123_FORMAT).to_string()
}

/// Parses any of the three accepted date formats. Returns `None` for anything
/// else, including a weekday that does not match the date.
pub fn parse_http_date(input: &str) -> Option<DateTime<Utc>> {
    // asctime pads single-digit days with a space; collapse runs of whitespace
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let first = normalized.split(' ').next()?;

    let format = match first.len() {
        4 => RFC1123_FORMAT,
        3 => ASCTIME_FORMAT,
        _ => RFC850_FORMAT,
    };

    let naive = NaiveDateTime::parse_from_str(&normalized, format).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Signed difference `a - b` in whole seconds.
pub fn compare_dates(a: &DateTime<Utc>, b: &DateTime<Utc>) -> i64 {
    a.timestamp() - b.timestamp()
}

/// Last modification time of `path`, truncated to whole seconds since HTTP
/// dates carry no fractional part.
pub async fn file_mod_time(path: &Path) -> std::io::Result<DateTime<Utc>> {
    let metadata = tokio::fs::metadata(path).await?;
    Ok(truncate_to_seconds(metadata.modified()?.into()))
}

pub fn truncate_to_seconds(date: DateTime<Utc>) -> DateTime<Utc> {
    date.with_nanosecond(0).unwrap_or(date)
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
