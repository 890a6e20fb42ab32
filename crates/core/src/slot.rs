//! Slot validation rules and marketplace filter predicates.
//!
//! The browse endpoint pushes status/owner/date constraints into SQL and
//! applies the title and duration predicates here, in memory, after the
//! fetch. Keeping the predicates in one place means the db layer and the
//! tests agree on exactly one definition of "matches".

use crate::types::Timestamp;

/// How far a slot's duration may deviate from a requested duration and
/// still count as a match.
pub const DURATION_TOLERANCE_MINS: i64 = 5;

/// Validate a slot title: must contain at least one non-whitespace character.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Slot title must not be empty".to_string());
    }
    Ok(())
}

/// Validate that a slot's time range is well-formed (start strictly before end).
pub fn validate_time_range(start: Timestamp, end: Timestamp) -> Result<(), String> {
    if start >= end {
        return Err("Slot start time must be before its end time".to_string());
    }
    Ok(())
}

/// Case-insensitive substring match used by the title search filter.
pub fn title_matches(title: &str, search: &str) -> bool {
    title.to_lowercase().contains(&search.to_lowercase())
}

/// Whether a slot's duration is within [`DURATION_TOLERANCE_MINS`] of the
/// requested duration.
///
/// Compared at second precision so a slot that overshoots the tolerance by
/// less than a minute is not truncated back into range.
pub fn duration_within_tolerance(
    start: Timestamp,
    end: Timestamp,
    requested_mins: i64,
) -> bool {
    let duration_secs = (end - start).num_seconds();
    (duration_secs - requested_mins * 60).abs() <= DURATION_TOLERANCE_MINS * 60
}
