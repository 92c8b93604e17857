//! Time utilities for docsign.
//!
//! Centralized timestamp handling: RFC 3339 formatting and parsing, the
//! time-derived identifier generator used for documents and recipient
//! links, and the human-readable renderings shown by the CLI.

use crate::error::DocsignError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Last identifier handed out by [`time_derived_id`], in epoch milliseconds.
static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Returns the current UTC timestamp in RFC 3339 format.
///
/// ```rust
/// use docsign::time_utils::now_rfc3339;
///
/// let timestamp = now_rfc3339();
/// assert!(timestamp.ends_with('Z'));
/// ```
#[inline]
#[must_use]
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Generates an identifier derived from the current time in epoch milliseconds.
///
/// Identifiers are strictly increasing within a process: two calls in the
/// same millisecond yield consecutive values, so separate link batches and
/// documents created in a tight loop never collide.
///
/// ```rust
/// use docsign::time_utils::time_derived_id;
///
/// let a: i64 = time_derived_id().parse().unwrap();
/// let b: i64 = time_derived_id().parse().unwrap();
/// assert!(b > a);
/// ```
pub fn time_derived_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ISSUED_MILLIS.load(Ordering::SeqCst);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_ISSUED_MILLIS.compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => return next.to_string(),
            Err(observed) => last = observed,
        }
    }
}

/// Parses an RFC 3339 timestamp string into a `DateTime<Utc>`.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, DocsignError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            DocsignError::ValidationError(format!("Invalid RFC 3339 timestamp '{}': {}", s, e))
        })
}

/// Formats a timestamp for display, e.g. `Jun 15, 2023, 10:30 AM`.
///
/// Unparseable input is returned unchanged.
pub fn format_display_date(s: &str) -> String {
    match parse_rfc3339(s) {
        Ok(dt) => dt.format("%b %-d, %Y, %-I:%M %p").to_string(),
        Err(_) => s.to_string(),
    }
}

/// Renders how long ago a timestamp was, relative to `now`.
///
/// Anything older than a week falls back to [`format_display_date`].
pub fn time_ago_from(s: &str, now: DateTime<Utc>) -> String {
    let then = match parse_rfc3339(s) {
        Ok(dt) => dt,
        Err(_) => return s.to_string(),
    };

    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = hours / 24;
    if days < 7 {
        return plural(days, "day");
    }
    format_display_date(s)
}

/// Renders how long ago a timestamp was, relative to the current time.
pub fn time_ago(s: &str) -> String {
    time_ago_from(s, Utc::now())
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
