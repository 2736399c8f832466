use super::time::{contains, Minute, MINUTES_PER_DAY};
use super::types::Entry;

/// Where "now" sits relative to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    pub active: bool,
    pub elapsed: Minute,
    pub remaining: Minute,
}

impl Status {
    /// Share of the entry already behind us, 0.0 for zero-length entries
    pub fn fraction(&self) -> f32 {
        let total = self.elapsed + self.remaining;
        if total > 0 {
            self.elapsed as f32 / total as f32
        } else {
            0.0
        }
    }
}

/// Elapsed and remaining minutes of `entry` at `now`. Inactive entries report zeros.
pub fn status(entry: &Entry, now: Minute) -> Status {
    if !contains(entry.start, entry.end, now) {
        return Status::default();
    }

    let (elapsed, remaining) = if !entry.crosses_midnight() {
        (now - entry.start, entry.end - now)
    } else if now >= entry.start {
        // Evening part, before midnight
        (now - entry.start, (MINUTES_PER_DAY - now) + entry.end)
    } else {
        (MINUTES_PER_DAY - entry.start + now, entry.end - now)
    };

    Status {
        active: true,
        elapsed,
        remaining,
    }
}
