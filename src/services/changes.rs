//! Change detection for stored records.

use crate::models::RecordTimestamps;

/// Decides whether a record was edited after ingestion.
///
/// Timestamps are compared at whole-second precision.
pub fn was_edited(timestamps: &RecordTimestamps) -> bool {
    timestamps.modified_at.timestamp() != timestamps.created_at.timestamp()
}
