use super::geometry::{block_rects, entry_band};
use super::lanes::LaneLayout;
use super::types::{AxisContext, BarMetrics, Entry};

/// Entry painted under the pointer, if any.
///
/// Candidates are visited in packing order, so when two blocks share a pixel
/// the longer entry wins.
pub fn entry_at<'a>(
    pointer: (i32, i32),
    ctx: AxisContext,
    metrics: &BarMetrics,
    entries: &'a [Entry],
    layout: &LaneLayout,
) -> Option<&'a Entry> {
    if ctx.is_empty() {
        return None;
    }
    let (x, y) = pointer;

    layout.order.iter().find_map(|&index| {
        let entry = entries.get(index)?;
        let band = entry_band(entry, ctx);
        let lane = layout.assignment(index).lane;
        block_rects(&band, lane, ctx, metrics)
            .iter()
            .any(|rect| rect.contains(x, y))
            .then_some(entry)
    })
}
