//! Overlap detection and greedy longest-first lane packing.
//!
//! At most two lanes exist: an entry that collides with a longer (or equally
//! long, earlier starting) entry is pushed into the upper half of the band.
//! Three or more mutually overlapping entries still share that half.

use std::cmp::Ordering;

use super::time::{Minute, MINUTES_PER_DAY};
use super::types::Entry;

pub const DEFAULT_OVERLAP_THRESHOLD: Minute = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Whole band height
    Full,
    /// Upper half of the band
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneAssignment {
    pub overlapped: bool,
    pub lane: Lane,
}

impl Default for LaneAssignment {
    fn default() -> Self {
        Self {
            overlapped: false,
            lane: Lane::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Minimum shared minutes before two entries count as colliding
    pub overlap_threshold: Minute,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

/// Lane packing result for one snapshot.
///
/// Indices refer to the snapshot that was packed; consumers skip indices
/// past the end of the slice they are given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaneLayout {
    /// Snapshot indices, longest entry first
    pub order: Vec<usize>,
    /// One assignment per snapshot entry, indexed like the snapshot
    pub assignments: Vec<LaneAssignment>,
}

impl LaneLayout {
    pub fn assignment(&self, index: usize) -> LaneAssignment {
        self.assignments.get(index).copied().unwrap_or_default()
    }
}

/// Minute range with the end moved past midnight for crossing entries
fn unrolled(entry: &Entry) -> (Minute, Minute) {
    if entry.crosses_midnight() {
        (entry.start, entry.end + MINUTES_PER_DAY)
    } else {
        (entry.start, entry.end)
    }
}

/// Whether two entries share at least `threshold` minutes
pub fn overlaps(a: &Entry, b: &Entry, threshold: Minute) -> bool {
    let (a_start, a_end) = unrolled(a);
    let (b_start, b_end) = unrolled(b);
    a_end.min(b_end) - a_start.max(b_start) >= threshold
}

/// Deterministic packing order: longest first, then earliest start, then snapshot order.
pub fn packing_order(entries: &[Entry]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| {
        let (ea, eb) = (&entries[a], &entries[b]);
        match eb.duration().cmp(&ea.duration()) {
            Ordering::Equal => ea.start.cmp(&eb.start),
            other => other,
        }
    });
    order
}

pub fn pack(entries: &[Entry], options: LayoutOptions) -> LaneLayout {
    let order = packing_order(entries);
    let mut assignments = vec![LaneAssignment::default(); entries.len()];

    for (position, &current) in order.iter().enumerate() {
        let collides = order[..position]
            .iter()
            .any(|&placed| overlaps(&entries[current], &entries[placed], options.overlap_threshold));
        if collides {
            assignments[current] = LaneAssignment {
                overlapped: true,
                lane: Lane::Top,
            };
        }
    }

    LaneLayout { order, assignments }
}

/// Identity of a snapshot as seen by the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotKey {
    pub profile: u64,
    pub revision: u64,
}

/// Remembers the last packing so redraws of an unchanged snapshot skip the O(n²) walk
#[derive(Debug, Default)]
pub struct LaneCache {
    key: Option<(SnapshotKey, LayoutOptions)>,
    layout: LaneLayout,
}

impl LaneCache {
    pub fn get_or_pack(
        &mut self,
        key: SnapshotKey,
        entries: &[Entry],
        options: LayoutOptions,
    ) -> &LaneLayout {
        if self.key != Some((key, options)) {
            log::debug!(
                "event=lane_pack profile={} revision={} entries={}",
                key.profile,
                key.revision,
                entries.len()
            );
            self.layout = pack(entries, options);
            self.key = Some((key, options));
        }
        &self.layout
    }
}
