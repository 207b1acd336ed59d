//! Top-performer selection across the whole snapshot

use crate::{snapshot::Snapshot, types::SnapshotEntry};
use std::cmp::Ordering;

/// Returns up to `n` entries with the highest percent change
///
/// Ranks the full snapshot, not only the tracked subset. Entries without a
/// percent change (never refreshed, or zero baseline) sort after every
/// ranked entry. The sort is stable, so equal changes keep snapshot order.
pub fn top_performers(snapshot: &Snapshot, n: usize) -> Vec<&SnapshotEntry> {
    let mut ranked: Vec<&SnapshotEntry> = snapshot.entries().iter().collect();
    ranked.sort_by(|a, b| compare_change(a.percent_change, b.percent_change));
    ranked.truncate(n);
    ranked
}

/// Descending by change, absent values last
fn compare_change(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
