//! Paints a `DrawPlan` with egui and resolves hover/click through the hit tester.

use egui::{pos2, vec2, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke, Ui};

use crate::schedule::{
    entry_at, progress_text, status, to_minute, AxisContext, BarMetrics, DrawPlan, Entry, EntryId,
    LabelFormats, LaneLayout, Minute, PixelRect, StatusStrip, BORDER_COLOR,
};
use super::theme::{timeline_colors, to_color32};

#[derive(Default)]
pub struct TimelineResult {
    /// Entry the user clicked on, for the edit dialog
    pub clicked: Option<EntryId>,
    /// Minute under a double-click on empty space, for the add dialog
    pub add_at: Option<Minute>,
}

fn to_rect(origin: Pos2, r: PixelRect) -> Rect {
    Rect::from_min_size(
        origin + vec2(r.x as f32, r.y as f32),
        vec2(r.w as f32, r.h as f32),
    )
}

/// Pointer position in widget pixels, floored like the plan's integer grid
fn local_pixel(origin: Pos2, pos: Pos2) -> (i32, i32) {
    let local = pos - origin;
    (local.x.floor() as i32, local.y.floor() as i32)
}

pub fn render_timeline(
    ui: &mut Ui,
    entries: &[Entry],
    layout: &LaneLayout,
    base_minute: Minute,
    now: Minute,
    formats: LabelFormats,
) -> TimelineResult {
    let mut result = TimelineResult::default();
    let metrics = BarMetrics::default();
    let colors = timeline_colors();

    let width = ui.available_width().floor().max(0.0);
    let (rect, response) = ui.allocate_exact_size(
        vec2(width, metrics.total_height() as f32),
        Sense::click(),
    );
    let origin = rect.min;
    let ctx = AxisContext::new(base_minute, width as i32);
    let plan = DrawPlan::build(ctx, &metrics, entries, layout, now, formats);
    let painter = ui.painter_at(rect);

    // Axis ticks and hour labels
    for tick in &plan.ticks {
        let x = origin.x + tick.x as f32;
        painter.line_segment(
            [pos2(x, origin.y + tick.top as f32), pos2(x, origin.y + tick.bottom as f32)],
            Stroke::new(1.0, colors.tick),
        );
        if let Some(label) = &tick.label {
            painter.text(
                pos2(x, origin.y + metrics.label_baseline as f32),
                Align2::CENTER_BOTTOM,
                label,
                FontId::proportional(11.0),
                colors.tick_label,
            );
        }
    }

    if let Some(background) = plan.background {
        painter.rect(
            to_rect(origin, background),
            0.0,
            colors.band_fill,
            Stroke::new(1.0, colors.band_stroke),
        );
    }

    for block in &plan.blocks {
        let block_rect = to_rect(origin, block.paint_rect());
        painter.rect(
            block_rect,
            0.0,
            to_color32(block.fill, block.alpha),
            Stroke::new(1.0, to_color32(BORDER_COLOR, 255)),
        );
        painter.with_clip_rect(block_rect.shrink(2.0)).text(
            block_rect.center(),
            Align2::CENTER_CENTER,
            block.lines.join("\n"),
            FontId::proportional(12.0),
            to_color32(block.text_color, 255),
        );
    }

    if let Some(marker) = plan.now_marker {
        let x = origin.x + marker.x as f32;
        painter.line_segment(
            [pos2(x, origin.y + marker.top as f32), pos2(x, origin.y + marker.bottom as f32)],
            Stroke::new(3.0, colors.now_marker),
        );
    }

    match &plan.status {
        Some(StatusStrip::Idle { rect: strip, message }) => {
            let strip = to_rect(origin, *strip);
            painter.rect(strip, 0.0, colors.status_fill, Stroke::new(1.0, colors.band_stroke));
            painter.text(
                strip.center(),
                Align2::CENTER_CENTER,
                *message,
                FontId::proportional(13.0),
                colors.idle_text,
            );
        }
        Some(StatusStrip::Active { rect: strip, slots }) => {
            painter.rect(
                to_rect(origin, *strip),
                0.0,
                colors.status_fill,
                Stroke::new(1.0, colors.band_stroke),
            );
            for slot in slots {
                let text_rect = to_rect(origin, PixelRect::new(slot.rect.x + 5, slot.rect.y + 5, slot.rect.w - 10, 20));
                painter.with_clip_rect(text_rect).text(
                    text_rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{} {}", egui_phosphor::regular::TIMER, slot.text),
                    FontId::proportional(13.0),
                    colors.status_text,
                );

                let bar = to_rect(origin, slot.bar);
                painter.rect(bar, 0.0, colors.bar_track, Stroke::new(1.0, colors.band_stroke));
                if slot.fill_width > 0 {
                    let fill = to_rect(origin, PixelRect { w: slot.fill_width, ..slot.bar });
                    painter.rect_filled(fill, 0.0, to_color32(slot.color, 255));
                }
            }
        }
        None => {}
    }

    // Tooltip and click resolve through the same rectangles the plan painted
    let pointer_entry = |pos: Pos2| {
        entry_at(local_pixel(origin, pos), ctx, &metrics, entries, layout)
    };

    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            if pointer_entry(pos).is_none() {
                result.add_at = Some(to_minute(ctx, local_pixel(origin, pos).0));
            }
        }
    } else if response.clicked() {
        result.clicked = response
            .interact_pointer_pos()
            .and_then(pointer_entry)
            .map(|entry| entry.id);
    }

    if let Some(entry) = response.hover_pos().and_then(pointer_entry) {
        response.on_hover_ui_at_pointer(|ui| {
            entry_tooltip(ui, entry, now, formats);
        });
    }

    result
}

fn entry_tooltip(ui: &mut Ui, entry: &Entry, now: Minute, formats: LabelFormats) {
    let swatch = to_color32(entry.color, 255);
    ui.horizontal(|ui| {
        ui.label(RichText::new(egui_phosphor::regular::CIRCLE).color(swatch));
        ui.label(RichText::new(&entry.label).strong());
    });
    ui.label(formats.range(entry.start, entry.end));
    ui.label(
        RichText::new(format!("Duration {}", formats.span(entry.duration())))
            .color(Color32::from_rgb(176, 176, 168)),
    );

    let entry_status = status(entry, now);
    if entry_status.active {
        ui.label(progress_text(entry_status, formats));
    }
}
