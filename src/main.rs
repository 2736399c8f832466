#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;
mod export;
mod logging;
mod schedule;
mod store;
mod ui;

use eframe::egui;
use log::{info, warn};

use config::Config;
use store::ScheduleStore;

fn main() -> eframe::Result<()> {
    let mut startup_error = None;

    let config = Config::load().unwrap_or_else(|err| {
        startup_error = Some(format!("Failed to load settings: {}", err));
        Config::default()
    });

    let data_dir = match Config::data_dir() {
        Ok(dir) => Some(dir),
        Err(err) => {
            eprintln!("dayline: {:#}", err);
            None
        }
    };

    if let Some(dir) = &data_dir {
        if let Err(err) = logging::init_logging(&config.log_level, &dir.join("logs")) {
            eprintln!("dayline: logging disabled: {:#}", err);
        }
    }
    if let Some(msg) = &startup_error {
        warn!("event=config_load status=error error={}", msg);
    }

    let store = match &data_dir {
        Some(dir) => ScheduleStore::open(dir).unwrap_or_else(|err| {
            warn!("event=store_open status=error error={} fallback=memory", err);
            startup_error = Some(format!("Schedule not loaded, changes will not be saved: {}", err));
            ScheduleStore::in_memory()
        }),
        None => ScheduleStore::in_memory(),
    };
    info!(
        "event=store_open profiles={} revision={}",
        store.profiles().len(),
        store.revision()
    );

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([1200.0, 420.0])
        .with_min_inner_size([640.0, 360.0])
        .with_title("Dayline");
    if let Some([x, y]) = config.window_position {
        viewport = viewport.with_position([x, y]);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Dayline",
        options,
        Box::new(move |cc| Ok(Box::new(ui::DaylineApp::new(cc, config, store, data_dir, startup_error)))),
    )
}
