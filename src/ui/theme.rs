use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

use crate::schedule::Rgb;

pub fn setup_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    // Phosphor icons as fallback in the Proportional family
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    ctx.set_fonts(fonts);
}

pub fn setup_theme(ctx: &egui::Context) {
    let mut style = Style::default();

    // Dark visuals with blue accents
    let mut visuals = Visuals::dark();

    let bg = Color32::from_rgb(12, 12, 11);
    visuals.panel_fill = bg;
    visuals.window_fill = bg;
    visuals.faint_bg_color = Color32::from_rgb(20, 20, 18);
    visuals.extreme_bg_color = Color32::BLACK;

    // Widget colors - warm grays (R=G > B for warmth)
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(40, 40, 38);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(176, 176, 168));

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(56, 56, 52);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(200, 200, 192));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(80, 80, 74);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::from_rgb(255, 255, 255));

    let accent = accent_color();
    visuals.widgets.active.bg_fill = accent;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.selection.bg_fill = accent;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.hyperlink_color = accent;

    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);
    visuals.widgets.inactive.rounding = Rounding::same(6.0);
    visuals.widgets.hovered.rounding = Rounding::same(6.0);
    visuals.widgets.active.rounding = Rounding::same(6.0);
    visuals.window_rounding = Rounding::same(8.0);

    style.visuals = visuals;

    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(16.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(16.0);

    ctx.set_style(style);
}

pub fn accent_color() -> Color32 {
    Color32::from_rgb(19, 152, 244)
}

pub fn to_color32(rgb: Rgb, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(rgb.r, rgb.g, rgb.b, alpha)
}

pub struct TimelineColors {
    pub band_fill: Color32,
    pub band_stroke: Color32,
    pub tick: Color32,
    pub tick_label: Color32,
    pub now_marker: Color32,
    pub status_fill: Color32,
    pub status_text: Color32,
    pub idle_text: Color32,
    pub bar_track: Color32,
}

pub fn timeline_colors() -> TimelineColors {
    TimelineColors {
        band_fill: Color32::from_rgb(28, 28, 26),
        band_stroke: Color32::from_rgb(80, 80, 74),
        tick: Color32::from_rgb(112, 112, 104),
        tick_label: Color32::from_rgb(176, 176, 168),
        now_marker: Color32::from_rgb(0xFF, 0x30, 0x30),
        status_fill: Color32::from_rgb(20, 20, 18),
        status_text: Color32::WHITE,
        idle_text: Color32::from_rgb(112, 112, 104),
        bar_track: Color32::from_rgb(56, 56, 52),
    }
}

/// Returns (content_bg, frame_color, frame_text) for dialogs
pub fn dialog_colors() -> (Color32, Color32, Color32) {
    (
        Color32::BLACK,                      // content bg
        Color32::from_rgb(40, 40, 38),       // frame/border - warm gray
        Color32::from_rgb(176, 176, 168),    // frame text - warm gray
    )
}

pub fn dialog_frame() -> egui::Frame {
    let (content_bg, frame_color, _) = dialog_colors();
    egui::Frame::none()
        .fill(content_bg)
        .stroke(Stroke::new(2.0, frame_color))
        .rounding(Rounding::same(8.0))
        .inner_margin(egui::Margin::same(20.0))
}

/// Flat dialog button with hover effect, returns true when clicked
pub fn dialog_button(ui: &mut egui::Ui, text: &str, text_color: Color32) -> bool {
    let btn_bg = Color32::from_rgb(0x28, 0x28, 0x26);
    let btn_hover = Color32::from_rgb(0x50, 0x50, 0x4a);
    let font_id = FontId::proportional(16.0);
    let padding = egui::vec2(18.0, 8.0);

    let size = ui.fonts(|f| f.layout_no_wrap(text.to_string(), font_id.clone(), text_color).size());
    let (rect, response) = ui.allocate_exact_size(size + padding * 2.0, egui::Sense::click());
    let bg = if response.hovered() { btn_hover } else { btn_bg };
    ui.painter().rect_filled(rect, Rounding::same(6.0), bg);
    ui.painter().text(rect.center(), egui::Align2::CENTER_CENTER, text, font_id, text_color);
    response.clicked()
}

pub fn button_text_color() -> Color32 {
    Color32::from_rgb(180, 180, 190)
}

pub fn danger_color() -> Color32 {
    Color32::from_rgb(224, 108, 117)
}
