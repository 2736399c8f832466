use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::{format_clock, format_clock_12h, Minute};
use crate::config::{ClockFormat, TimeFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque RGB color, stored and exchanged as "#RRGGBB"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Swatches offered by the entry dialog, first one is the default
pub const PALETTE: [Rgb; 8] = [
    Rgb::new(0xFF, 0x99, 0x99),
    Rgb::new(0x99, 0xFF, 0x99),
    Rgb::new(0x99, 0x99, 0xFF),
    Rgb::new(0xFF, 0xFF, 0x99),
    Rgb::new(0xFF, 0x99, 0xFF),
    Rgb::new(0x99, 0xFF, 0xFF),
    Rgb::new(0xFF, 0xB3, 0x66),
    Rgb::new(0xB3, 0x66, 0xFF),
];

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse "#RRGGBB" (the leading '#' is optional)
    pub fn from_hex(input: &str) -> Option<Self> {
        let hex = input.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Text color readable on top of this fill: black on bright colors, white on dark ones
    pub fn contrast_text(self) -> Rgb {
        let brightness =
            (self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114) / 1000;
        if brightness > 128 {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        PALETTE[0]
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or_else(|| format!("invalid color `{}`", value))
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

/// A labeled interval on the day circle. `end < start` means the entry runs through midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub label: String,
    pub start: Minute,
    pub end: Minute,
    pub color: Rgb,
}

impl Entry {
    pub fn duration(&self) -> Minute {
        super::time::duration(self.start, self.end)
    }

    pub fn crosses_midnight(&self) -> bool {
        super::time::crosses_midnight(self.start, self.end)
    }
}

/// Rotation origin and pixel width of the horizontal axis for one redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisContext {
    pub base_minute: Minute,
    pub pixel_width: i32,
}

impl AxisContext {
    pub fn new(base_minute: Minute, pixel_width: i32) -> Self {
        Self {
            base_minute: super::time::normalize(base_minute),
            pixel_width,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_width <= 0
    }
}

/// Vertical layout of the timeline widget, in pixels from the widget's top edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarMetrics {
    pub label_baseline: i32,
    pub tick_top: i32,
    pub bar_top: i32,
    pub bar_height: i32,
    pub status_gap: i32,
    pub status_height: i32,
}

impl Default for BarMetrics {
    fn default() -> Self {
        Self {
            label_baseline: 25,
            tick_top: 30,
            bar_top: 40,
            bar_height: 100,
            status_gap: 10,
            status_height: 40,
        }
    }
}

impl BarMetrics {
    pub fn bar_bottom(&self) -> i32 {
        self.bar_top + self.bar_height
    }

    pub fn status_top(&self) -> i32 {
        self.bar_bottom() + self.status_gap
    }

    /// Total height the widget needs
    pub fn total_height(&self) -> i32 {
        self.status_top() + self.status_height
    }
}

/// Axis-aligned rectangle, half-open on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by `dx`/`dy` on each side, never below zero size
    pub fn inset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            w: (self.w - 2 * dx).max(0),
            h: (self.h - 2 * dy).max(0),
        }
    }
}

/// User-facing formatting choices for clock times and spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelFormats {
    pub clock: ClockFormat,
    pub span: TimeFormat,
}

impl LabelFormats {
    pub fn clock(&self, minute: Minute) -> String {
        match self.clock {
            ClockFormat::Hour24 => format_clock(minute),
            ClockFormat::Hour12 => format_clock_12h(minute),
        }
    }

    pub fn range(&self, start: Minute, end: Minute) -> String {
        format!("{}-{}", self.clock(start), self.clock(end))
    }

    pub fn span(&self, minutes: Minute) -> String {
        format_span_with_format(minutes, self.span)
    }
}

/// Format minutes as "Xh Ym"
pub fn format_span(minutes: Minute) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours > 0 && mins > 0 {
        format!("{}h {}m", hours, mins)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", mins)
    }
}

/// Format minutes based on user's preferred time format
pub fn format_span_with_format(minutes: Minute, time_format: TimeFormat) -> String {
    match time_format {
        TimeFormat::HoursMinutes => format_span(minutes),
        TimeFormat::Decimal => {
            let hours = minutes as f32 / 60.0;
            if hours == 0.0 {
                "0h".to_string()
            } else if hours == hours.floor() {
                format!("{}h", hours as i32)
            } else {
                // Format with 2 decimals, then trim trailing zeros
                let s = format!("{:.2}", hours);
                let trimmed = s.trim_end_matches('0').trim_end_matches('.');
                format!("{}h", trimmed)
            }
        }
    }
}
