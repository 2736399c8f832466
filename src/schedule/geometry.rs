//! Mapping between minute-of-day and horizontal pixels on a rotated axis.
//!
//! `to_pixel` and `block_rects` are shared by the renderer and the hit tester;
//! a point the renderer paints for an entry always hit-tests to that entry.

use super::lanes::Lane;
use super::time::{normalize, Minute, MINUTES_PER_DAY};
use super::types::{AxisContext, BarMetrics, Entry, PixelRect};

/// Pixel column of `minute`, counted from the axis origin at `base_minute`.
/// Monotonically non-decreasing over one rotation starting at the origin.
pub fn to_pixel(ctx: AxisContext, minute: Minute) -> i32 {
    if ctx.is_empty() {
        return 0;
    }
    let offset = normalize(minute - ctx.base_minute) as i64;
    (offset * ctx.pixel_width as i64 / MINUTES_PER_DAY as i64) as i32
}

/// Floor-based inverse of [`to_pixel`]. Not exact at sub-pixel precision.
pub fn to_minute(ctx: AxisContext, pixel: i32) -> Minute {
    if ctx.is_empty() {
        return ctx.base_minute;
    }
    let offset = pixel as i64 * MINUTES_PER_DAY as i64 / ctx.pixel_width as i64;
    normalize(ctx.base_minute + offset as Minute)
}

/// Horizontal extent of an entry on the axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryBand {
    pub start_px: i32,
    pub end_px: i32,
    /// The band runs off the right edge and resumes at pixel 0
    pub wraps: bool,
}

impl EntryBand {
    /// Half-open column spans `[from, to)` covered by the band
    pub fn spans(&self, pixel_width: i32) -> Vec<(i32, i32)> {
        if pixel_width <= 0 {
            return Vec::new();
        }
        if self.wraps {
            let mut spans = vec![(self.start_px, pixel_width)];
            if self.end_px > 0 {
                spans.push((0, self.end_px));
            }
            spans
        } else if self.end_px > self.start_px {
            vec![(self.start_px, self.end_px)]
        } else {
            // Zero-width entries still get a one pixel mark
            let x = self.start_px.min(pixel_width - 1);
            vec![(x, x + 1)]
        }
    }
}

pub fn entry_band(entry: &Entry, ctx: AxisContext) -> EntryBand {
    // Decided on minutes, so a long entry whose ends share a pixel still wraps
    let start_offset = normalize(entry.start - ctx.base_minute);
    let end_offset = normalize(entry.end - ctx.base_minute);
    EntryBand {
        start_px: to_pixel(ctx, entry.start),
        end_px: to_pixel(ctx, entry.end),
        wraps: end_offset < start_offset,
    }
}

/// Vertical extent of a lane within the bar
pub fn lane_rows(lane: Lane, metrics: &BarMetrics) -> (i32, i32) {
    match lane {
        Lane::Full => (metrics.bar_top, metrics.bar_height),
        Lane::Top => (metrics.bar_top, metrics.bar_height / 2),
    }
}

/// Screen rectangles an entry occupies: one, or two when the band wraps.
pub fn block_rects(
    band: &EntryBand,
    lane: Lane,
    ctx: AxisContext,
    metrics: &BarMetrics,
) -> Vec<PixelRect> {
    let (y, h) = lane_rows(lane, metrics);
    band.spans(ctx.pixel_width)
        .into_iter()
        .map(|(from, to)| PixelRect::new(from, y, to - from, h))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::{EntryId, Rgb};

    fn entry(start: Minute, end: Minute) -> Entry {
        Entry {
            id: EntryId(1),
            label: "Work".to_string(),
            start,
            end,
            color: Rgb::default(),
        }
    }

    #[test]
    fn origin_maps_to_zero_and_last_minute_to_last_pixel() {
        let ctx = AxisContext::new(480, 1440);
        assert_eq!(to_pixel(ctx, 480), 0);
        assert_eq!(to_pixel(ctx, 479), 1439);

        let narrow = AxisContext::new(480, 720);
        assert_eq!(to_pixel(narrow, 480), 0);
        assert_eq!(to_pixel(narrow, 479), 719);
    }

    #[test]
    fn to_pixel_is_monotonic_over_one_rotation() {
        let ctx = AxisContext::new(1000, 913);
        let mut last = 0;
        for offset in 0..MINUTES_PER_DAY {
            let px = to_pixel(ctx, 1000 + offset);
            assert!(px >= last);
            assert!(px < ctx.pixel_width);
            last = px;
        }
    }

    #[test]
    fn to_minute_inverts_on_whole_minute_pixels() {
        let ctx = AxisContext::new(300, 1440);
        for m in (0..MINUTES_PER_DAY).step_by(13) {
            assert_eq!(to_minute(ctx, to_pixel(ctx, m)), m);
        }
        let wide = AxisContext::new(0, 2880);
        assert_eq!(to_minute(wide, 1), 0);
        assert_eq!(to_minute(wide, 3), 1);
    }

    #[test]
    fn band_for_plain_entry() {
        let ctx = AxisContext::new(480, 1440);
        let band = entry_band(&entry(480, 600), ctx);
        assert_eq!(
            band,
            EntryBand {
                start_px: 0,
                end_px: 120,
                wraps: false
            }
        );
        assert_eq!(band.spans(1440), vec![(0, 120)]);
    }

    #[test]
    fn rotation_can_split_a_non_crossing_entry() {
        // 06:00-09:00 viewed from an 08:00 origin
        let ctx = AxisContext::new(480, 1440);
        let band = entry_band(&entry(360, 540), ctx);
        assert!(band.wraps);
        assert_eq!(band.spans(1440), vec![(1320, 1440), (0, 60)]);
    }

    #[test]
    fn crossing_entry_ending_at_origin_has_one_span() {
        let ctx = AxisContext::new(0, 1440);
        let band = entry_band(&entry(1380, 0), ctx);
        assert!(band.wraps);
        assert_eq!(band.spans(1440), vec![(1380, 1440)]);
    }

    #[test]
    fn zero_duration_entry_is_a_point() {
        let ctx = AxisContext::new(0, 1440);
        let band = entry_band(&entry(1439, 1439), ctx);
        assert_eq!(band.spans(1440), vec![(1439, 1440)]);
    }

    #[test]
    fn near_full_day_entry_on_narrow_axis_fills_the_bar() {
        let ctx = AxisContext::new(0, 100);
        let band = entry_band(&entry(1380, 1379), ctx);
        assert_eq!(band.start_px, 95);
        assert_eq!(band.end_px, 95);
        assert!(band.wraps);
        let spans = band.spans(100);
        assert_eq!(spans, vec![(95, 100), (0, 95)]);
        assert_eq!(spans.iter().map(|(a, b)| b - a).sum::<i32>(), 100);

        // A short entry whose ends share a pixel stays a point
        let short = entry_band(&entry(610, 615), ctx);
        assert_eq!((short.start_px, short.end_px), (42, 42));
        assert!(!short.wraps);
        assert_eq!(short.spans(100), vec![(42, 43)]);
    }

    #[test]
    fn lanes_pick_rows() {
        let metrics = BarMetrics::default();
        let ctx = AxisContext::new(0, 1440);
        let band = entry_band(&entry(60, 120), ctx);
        assert_eq!(
            block_rects(&band, Lane::Full, ctx, &metrics),
            vec![PixelRect::new(60, 40, 60, 100)]
        );
        assert_eq!(
            block_rects(&band, Lane::Top, ctx, &metrics),
            vec![PixelRect::new(60, 40, 60, 50)]
        );
    }

    #[test]
    fn zero_width_axis_has_no_geometry() {
        let ctx = AxisContext::new(0, 0);
        let band = entry_band(&entry(60, 120), ctx);
        assert!(block_rects(&band, Lane::Full, ctx, &BarMetrics::default()).is_empty());
        assert_eq!(to_minute(ctx, 50), 0);
    }
}
