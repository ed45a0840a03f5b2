use crate::analysis_types::RankedEntry;

/// Sorts highest value first. The sort is stable, so equal values keep the
/// order they were inserted in.
pub fn rank(entries: &mut [RankedEntry]) {
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
}
