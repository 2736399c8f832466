//! Builds the draw plan for one redraw: axis ticks, background band, entry
//! blocks, the "now" marker and the status strip. Pure data, no painting.

use super::geometry::{block_rects, entry_band, to_pixel};
use super::lanes::LaneLayout;
use super::progress::{status, Status};
use super::time::{normalize, Minute, MINUTES_PER_DAY};
use super::types::{AxisContext, BarMetrics, Entry, EntryId, LabelFormats, PixelRect, Rgb};

pub const IDLE_MESSAGE: &str = "No schedule in progress";

/// Fill alpha for entries pushed into the upper lane
pub const OVERLAPPED_ALPHA: u8 = 200;

pub const BORDER_COLOR: Rgb = Rgb::new(0x66, 0x66, 0x66);

const TICK_STEP: Minute = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub x: i32,
    pub top: i32,
    pub bottom: i32,
    /// Present on full hours only
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Index into the snapshot
    pub entry: usize,
    pub id: EntryId,
    /// Area owned by the entry, also used for hit testing
    pub rect: PixelRect,
    pub fill: Rgb,
    pub alpha: u8,
    pub text_color: Rgb,
    pub overlapped: bool,
    pub lines: Vec<String>,
}

impl Block {
    /// Painted area, leaving a 1px gap for the border
    pub fn paint_rect(&self) -> PixelRect {
        self.rect.inset(1, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NowMarker {
    pub x: i32,
    pub top: i32,
    pub bottom: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusSlot {
    pub entry: usize,
    pub rect: PixelRect,
    pub text: String,
    pub bar: PixelRect,
    pub fill_width: i32,
    pub color: Rgb,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusStrip {
    Idle {
        rect: PixelRect,
        message: &'static str,
    },
    Active {
        rect: PixelRect,
        slots: Vec<StatusSlot>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawPlan {
    pub ticks: Vec<Tick>,
    pub background: Option<PixelRect>,
    pub blocks: Vec<Block>,
    pub now_marker: Option<NowMarker>,
    pub status: Option<StatusStrip>,
}

impl DrawPlan {
    pub fn build(
        ctx: AxisContext,
        metrics: &BarMetrics,
        entries: &[Entry],
        layout: &LaneLayout,
        now: Minute,
        formats: LabelFormats,
    ) -> Self {
        if ctx.is_empty() {
            return Self::default();
        }

        let now_x = to_pixel(ctx, now);
        Self {
            ticks: ticks(ctx, metrics, formats),
            background: Some(PixelRect::new(0, metrics.bar_top, ctx.pixel_width, metrics.bar_height)),
            blocks: blocks(ctx, metrics, entries, layout, now, formats),
            now_marker: Some(NowMarker {
                x: now_x,
                top: metrics.tick_top,
                bottom: metrics.bar_bottom(),
            }),
            status: Some(status_strip(ctx, metrics, entries, now, formats)),
        }
    }
}

/// Hour ticks with labels and unlabeled half-hour ticks, starting at the origin
fn ticks(ctx: AxisContext, metrics: &BarMetrics, formats: LabelFormats) -> Vec<Tick> {
    (0..=MINUTES_PER_DAY / TICK_STEP)
        .map(|i| {
            let offset = i * TICK_STEP;
            let x = (offset as i64 * ctx.pixel_width as i64 / MINUTES_PER_DAY as i64) as i32;
            let on_hour = offset % 60 == 0;
            Tick {
                x,
                top: if on_hour { metrics.tick_top } else { metrics.tick_top + 5 },
                bottom: metrics.bar_top,
                label: on_hour.then(|| formats.clock(normalize(ctx.base_minute + offset))),
            }
        })
        .collect()
}

fn blocks(
    ctx: AxisContext,
    metrics: &BarMetrics,
    entries: &[Entry],
    layout: &LaneLayout,
    now: Minute,
    formats: LabelFormats,
) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(entries.len());

    // Longest first, so the half-height blocks end up on top
    for &index in &layout.order {
        let Some(entry) = entries.get(index) else {
            continue;
        };
        let assignment = layout.assignment(index);
        let band = entry_band(entry, ctx);
        let entry_status = status(entry, now);

        for rect in block_rects(&band, assignment.lane, ctx, metrics) {
            let text_width = rect.inset(1, 1).w;
            blocks.push(Block {
                entry: index,
                id: entry.id,
                rect,
                fill: entry.color,
                alpha: if assignment.overlapped { OVERLAPPED_ALPHA } else { 255 },
                text_color: entry.color.contrast_text(),
                overlapped: assignment.overlapped,
                lines: label_lines(entry, text_width, assignment.overlapped, entry_status, formats),
            });
        }
    }

    blocks
}

/// Block text, shortened as the available width shrinks
pub fn label_lines(
    entry: &Entry,
    width: i32,
    overlapped: bool,
    entry_status: Status,
    formats: LabelFormats,
) -> Vec<String> {
    let mut lines = vec![entry.label.clone()];
    if width >= 150 {
        lines.push(formats.range(entry.start, entry.end));
        if entry_status.active && !overlapped {
            lines.push(progress_text(entry_status, formats));
        }
    } else if width >= 100 {
        lines.push(formats.range(entry.start, entry.end));
    } else if width >= 45 {
        lines.push(formats.clock(entry.start));
    }
    lines
}

pub fn progress_text(entry_status: Status, formats: LabelFormats) -> String {
    format!(
        "Elapsed: {} / Left: {}",
        formats.span(entry_status.elapsed),
        formats.span(entry_status.remaining)
    )
}

fn status_strip(
    ctx: AxisContext,
    metrics: &BarMetrics,
    entries: &[Entry],
    now: Minute,
    formats: LabelFormats,
) -> StatusStrip {
    let top = metrics.status_top();
    let rect = PixelRect::new(0, top, ctx.pixel_width, metrics.status_height);

    let active: Vec<(usize, Status)> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| (i, status(entry, now)))
        .filter(|(_, s)| s.active)
        .collect();

    if active.is_empty() {
        return StatusStrip::Idle {
            rect,
            message: IDLE_MESSAGE,
        };
    }

    let width = ctx.pixel_width as i64;
    let count = active.len() as i64;
    let slots = active
        .into_iter()
        .enumerate()
        .map(|(slot, (index, entry_status))| {
            let entry = &entries[index];
            // Integer slot edges so the slots tile the strip exactly
            let x0 = (slot as i64 * width / count) as i32;
            let x1 = ((slot as i64 + 1) * width / count) as i32;
            let slot_rect = PixelRect::new(x0, top, x1 - x0, metrics.status_height);
            let bar = PixelRect::new(x0 + 10, top + 30, (x1 - x0 - 20).max(0), 6);
            StatusSlot {
                entry: index,
                rect: slot_rect,
                text: format!(
                    "[ {} ]  {} elapsed  >  {} left",
                    entry.label,
                    formats.span(entry_status.elapsed),
                    formats.span(entry_status.remaining)
                ),
                bar,
                fill_width: (bar.w as f32 * entry_status.fraction()) as i32,
                color: entry.color,
                status: entry_status,
            }
        })
        .collect();

    StatusStrip::Active { rect, slots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::lanes::{pack, LayoutOptions};

    fn entry(id: u64, label: &str, start: Minute, end: Minute) -> Entry {
        Entry {
            id: EntryId(id),
            label: label.to_string(),
            start,
            end,
            color: Rgb::new(0x99, 0x99, 0xFF),
        }
    }

    fn plan(entries: &[Entry], base: Minute, width: i32, now: Minute) -> DrawPlan {
        let layout = pack(entries, LayoutOptions::default());
        DrawPlan::build(
            AxisContext::new(base, width),
            &BarMetrics::default(),
            entries,
            &layout,
            now,
            LabelFormats::default(),
        )
    }

    #[test]
    fn zero_width_renders_nothing() {
        let entries = vec![entry(1, "Work", 480, 600)];
        assert_eq!(plan(&entries, 480, 0, 500), DrawPlan::default());
    }

    #[test]
    fn layout_indices_past_the_snapshot_are_skipped() {
        let entries = vec![entry(1, "Short", 480, 500), entry(2, "Long", 600, 900)];
        let layout = pack(&entries, LayoutOptions::default());
        let p = DrawPlan::build(
            AxisContext::new(0, 1440),
            &BarMetrics::default(),
            &entries[..1],
            &layout,
            0,
            LabelFormats::default(),
        );
        assert_eq!(p.blocks.len(), 1);
        assert_eq!(p.blocks[0].entry, 0);
    }

    #[test]
    fn ticks_follow_rotated_origin() {
        let p = plan(&[], 480, 1440, 0);
        assert_eq!(p.ticks.len(), 49);
        assert_eq!(p.ticks[0].x, 0);
        assert_eq!(p.ticks[0].label.as_deref(), Some("08:00"));
        assert_eq!(p.ticks[1].label, None);
        assert_eq!(p.ticks[1].x, 30);
        assert_eq!(p.ticks[1].top, 35);
        assert_eq!(p.ticks[2].label.as_deref(), Some("09:00"));
        assert_eq!(p.ticks[48].x, 1440);
        assert_eq!(p.ticks[48].label.as_deref(), Some("08:00"));
        assert_eq!(p.ticks[34].label.as_deref(), Some("01:00"));
    }

    #[test]
    fn wrapping_entry_yields_two_blocks() {
        let entries = vec![entry(1, "Night", 1380, 60)];
        let p = plan(&entries, 0, 1440, 600);
        let rects: Vec<PixelRect> = p.blocks.iter().map(|b| b.rect).collect();
        assert_eq!(
            rects,
            vec![PixelRect::new(1380, 40, 60, 100), PixelRect::new(0, 40, 60, 100)]
        );
        assert!(p.blocks.iter().all(|b| b.entry == 0 && b.alpha == 255));
    }

    #[test]
    fn overlapped_block_is_half_height_and_translucent() {
        let entries = vec![entry(1, "Long", 600, 720), entry(2, "Short", 700, 730)];
        let p = plan(&entries, 0, 1440, 0);
        assert_eq!(p.blocks.len(), 2);
        assert_eq!(p.blocks[0].entry, 0);
        assert_eq!(p.blocks[1].entry, 1);
        assert_eq!(p.blocks[1].rect, PixelRect::new(700, 40, 30, 50));
        assert_eq!(p.blocks[1].alpha, OVERLAPPED_ALPHA);
        assert!(p.blocks[1].overlapped);
    }

    #[test]
    fn labels_degrade_with_width() {
        let e = entry(1, "Focus", 540, 660);
        let active = status(&e, 600);
        let f = LabelFormats::default();
        assert_eq!(
            label_lines(&e, 150, false, active, f),
            vec!["Focus", "09:00-11:00", "Elapsed: 1h / Left: 1h"]
        );
        assert_eq!(label_lines(&e, 150, true, active, f), vec!["Focus", "09:00-11:00"]);
        assert_eq!(
            label_lines(&e, 150, false, Status::default(), f),
            vec!["Focus", "09:00-11:00"]
        );
        assert_eq!(label_lines(&e, 149, false, active, f), vec!["Focus", "09:00-11:00"]);
        assert_eq!(label_lines(&e, 99, false, active, f), vec!["Focus", "09:00"]);
        assert_eq!(label_lines(&e, 44, false, active, f), vec!["Focus"]);
    }

    #[test]
    fn now_marker_uses_axis_mapping() {
        let p = plan(&[], 480, 1440, 420);
        assert_eq!(
            p.now_marker,
            Some(NowMarker {
                x: 1380,
                top: 30,
                bottom: 140
            })
        );
    }

    #[test]
    fn idle_status_strip_shows_placeholder() {
        let entries = vec![entry(1, "Work", 480, 600)];
        let p = plan(&entries, 0, 1000, 700);
        assert_eq!(
            p.status,
            Some(StatusStrip::Idle {
                rect: PixelRect::new(0, 150, 1000, 40),
                message: IDLE_MESSAGE
            })
        );
    }

    #[test]
    fn active_slots_tile_the_strip() {
        let entries = vec![
            entry(1, "Work", 480, 600),
            entry(2, "Idle", 700, 800),
            entry(3, "Call", 500, 560),
        ];
        let p = plan(&entries, 0, 1001, 510);
        let Some(StatusStrip::Active { slots, .. }) = p.status else {
            panic!("expected active strip");
        };
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].entry, 0);
        assert_eq!(slots[1].entry, 2);
        assert_eq!(slots.iter().map(|s| s.rect.w).sum::<i32>(), 1001);
        assert_eq!(slots[0].rect.right(), slots[1].rect.x);

        // 30 of 120 minutes elapsed
        assert_eq!(slots[0].bar.w, 480);
        assert_eq!(slots[0].fill_width, 120);
        assert_eq!(slots[0].text, "[ Work ]  30m elapsed  >  1h 30m left");
    }

    #[test]
    fn zero_duration_active_entry_has_empty_bar() {
        let entries = vec![entry(1, "Ping", 300, 300)];
        let p = plan(&entries, 0, 600, 300);
        let Some(StatusStrip::Active { slots, .. }) = p.status else {
            panic!("expected active strip");
        };
        assert_eq!(slots[0].fill_width, 0);
    }
}
