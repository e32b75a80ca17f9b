use chrono::{FixedOffset, Offset, Utc};

/// Business-day offset from UTC in whole hours (e.g. `9` for KST)
///
/// Out-of-range values (beyond ±23h) fall back to UTC.
pub fn utc_offset_hours(hours: i32) -> FixedOffset {
    hours.checked_mul(3600).and_then(FixedOffset::east_opt).unwrap_or_else(|| {
        tracing::warn!(hours, "Invalid UTC offset, falling back to UTC");
        Utc.fix()
    })
}
