//! Staleness policy shared by displays and data sources

use chrono::{DateTime, Duration, Utc};

/// Decide whether an entity must be recomputed.
///
/// * never computed (`last_update` is `None`) → stale
/// * no positive `max_age` → stale on every access
/// * otherwise stale once `max_age` has elapsed since `last_update`
pub fn needs_refresh(
    last_update: Option<DateTime<Utc>>,
    max_age: Option<Duration>,
    now: DateTime<Utc>,
) -> bool {
    let Some(last_update) = last_update else {
        return true;
    };
    match max_age {
        Some(max_age) if max_age > Duration::zero() => now - last_update >= max_age,
        _ => true,
    }
}

/// `max_age` from a configured number of seconds; `None` for 0, unset or
/// beyond the range of `Duration`
pub fn max_age_from_secs(secs: Option<i64>) -> Option<Duration> {
    secs.filter(|s| *s > 0).and_then(Duration::try_seconds)
}
