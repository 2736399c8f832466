//! Timeline layout engine: circular minute math, axis geometry, lane packing,
//! draw plans, hit testing and progress. Pure functions over a snapshot; the
//! caller supplies "now".

mod geometry;
mod hit;
mod lanes;
mod progress;
mod render;
mod time;
mod types;

pub use geometry::to_minute;
pub use hit::entry_at;
pub use lanes::{LaneCache, LaneLayout, LayoutOptions, SnapshotKey};
pub use progress::status;
pub use render::{progress_text, DrawPlan, StatusStrip, BORDER_COLOR};
pub use time::{
    duration, format_clock, from_naive_time, normalize, parse_clock, step_by, Minute,
    MINUTES_PER_DAY,
};
pub use types::{
    AxisContext, BarMetrics, Entry, EntryId, LabelFormats, PixelRect, Rgb, PALETTE,
};
