use std::time::{SystemTime, UNIX_EPOCH};

/// A minimal wall-clock timestamp for progress lines (spec.md §6:
/// "Request sent at `<ts>`"). Timestamp formatting is named as an
/// external collaborator in spec.md §1, so this stays a plain epoch-second
/// stamp rather than pulling in a date/time formatting crate.
pub fn now_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
