mod app;
mod theme;
mod timeline;

pub use app::DaylineApp;
pub use theme::{setup_fonts, setup_theme};
