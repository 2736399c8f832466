use chrono::{Local, Timelike};
use eframe::egui;
use egui::{Color32, RichText};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{clamp_font_scale, ClockFormat, Config, TimeFormat, MAX_FONT_SCALE, MIN_FONT_SCALE};
use crate::export;
use crate::schedule::{
    format_clock, from_naive_time, parse_clock, step_by, Entry, EntryId, LabelFormats, LaneCache,
    Minute, Rgb, PALETTE,
};
use crate::store::{EntryDraft, ProfileId, ScheduleStore, StoreError, DEFAULT_PROFILE_ID};
use super::theme::{
    accent_color, button_text_color, danger_color, dialog_button, dialog_colors, dialog_frame,
    to_color32,
};
use super::timeline::render_timeline;

/// Step used by the time editors, in minutes
const TIME_STEP: Minute = 30;

/// How long the window must stay put before its position is written out
const POSITION_SETTLE: Duration = Duration::from_millis(750);

/// Debounces window moves so a drag is saved once, after it ends
#[derive(Debug, Default)]
struct PositionTracker {
    saved: Option<[f32; 2]>,
    pending: Option<([f32; 2], Instant)>,
}

impl PositionTracker {
    fn new(saved: Option<[f32; 2]>) -> Self {
        Self { saved, pending: None }
    }

    /// Record the current position; restarts the settle timer when it moved
    fn observe(&mut self, position: [f32; 2], now: Instant) {
        let last = self.pending.map(|(p, _)| p).or(self.saved);
        if last != Some(position) {
            self.pending = Some((position, now));
        }
    }

    /// Position to persist once it has been stable for `POSITION_SETTLE`
    fn settled(&mut self, now: Instant) -> Option<[f32; 2]> {
        let (_, since) = self.pending?;
        if now.duration_since(since) < POSITION_SETTLE {
            return None;
        }
        self.flush()
    }

    /// Unsaved position regardless of timing, for shutdown
    fn flush(&mut self) -> Option<[f32; 2]> {
        let (position, _) = self.pending.take()?;
        if self.saved == Some(position) {
            return None;
        }
        self.saved = Some(position);
        Some(position)
    }
}

pub struct DaylineApp {
    config: Config,
    store: ScheduleStore,
    data_dir: Option<PathBuf>,

    // Current view
    profile: ProfileId,
    base_input: String,
    lane_cache: LaneCache,

    // Dialog for add/edit
    entry_dialog: Option<EntryDialog>,

    // Delete confirmation
    pending_delete: Option<(EntryId, String)>,
    pending_clear: bool,

    // Profile manager
    show_profiles: bool,
    new_profile_name: String,
    renaming: Option<(ProfileId, String)>,
    pending_profile_delete: Option<ProfileId>,

    show_data_viewer: bool,

    // Settings dialog
    show_settings: bool,
    settings_clock_format: ClockFormat,
    settings_time_format: TimeFormat,
    settings_font_scale: f32,
    settings_overlap_threshold: Minute,

    // Status
    status_message: Option<(String, bool)>, // (message, is_error)

    window_position: PositionTracker,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DialogMode {
    Add,
    Edit(EntryId),
}

struct EntryDialog {
    mode: DialogMode,
    label: String,
    start_input: String,
    end_input: String,
    color: [u8; 3],
    profile_id: ProfileId,
    error: Option<String>,
}

impl EntryDialog {
    fn add(profile_id: ProfileId, start: Minute) -> Self {
        let start = step_by(start, 0, TIME_STEP);
        Self {
            mode: DialogMode::Add,
            label: String::new(),
            start_input: format_clock(start),
            end_input: format_clock(step_by(start, 2, TIME_STEP)),
            color: rgb_array(PALETTE[0]),
            profile_id,
            error: None,
        }
    }

    fn edit(profile_id: ProfileId, entry: &Entry) -> Self {
        Self {
            mode: DialogMode::Edit(entry.id),
            label: entry.label.clone(),
            start_input: format_clock(entry.start),
            end_input: format_clock(entry.end),
            color: rgb_array(entry.color),
            profile_id,
            error: None,
        }
    }

    fn draft(&self) -> Result<EntryDraft, String> {
        let start = parse_clock(&self.start_input)
            .ok_or_else(|| format!("Invalid start time `{}`", self.start_input.trim()))?;
        let end = parse_clock(&self.end_input)
            .ok_or_else(|| format!("Invalid end time `{}`", self.end_input.trim()))?;
        let [r, g, b] = self.color;
        Ok(EntryDraft {
            profile_id: self.profile_id,
            label: self.label.trim().to_string(),
            start,
            end,
            color: Rgb::new(r, g, b),
        })
    }
}

fn rgb_array(color: Rgb) -> [u8; 3] {
    [color.r, color.g, color.b]
}

enum DialogAction {
    None,
    Save,
    Delete,
    Close,
}

impl DaylineApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        store: ScheduleStore,
        data_dir: Option<PathBuf>,
        startup_error: Option<String>,
    ) -> Self {
        super::setup_fonts(&cc.egui_ctx);
        super::setup_theme(&cc.egui_ctx);

        let profile = store.last_profile();
        let config_position = config.window_position;
        Self {
            base_input: format_clock(config.base_minute),
            settings_clock_format: config.clock_format,
            settings_time_format: config.time_format,
            settings_font_scale: config.font_scale,
            settings_overlap_threshold: config.overlap_threshold,
            config,
            store,
            data_dir,
            profile,
            lane_cache: LaneCache::default(),
            entry_dialog: None,
            pending_delete: None,
            pending_clear: false,
            show_profiles: false,
            new_profile_name: String::new(),
            renaming: None,
            pending_profile_delete: None,
            show_data_viewer: false,
            show_settings: false,
            status_message: startup_error.map(|msg| (msg, true)),
            window_position: PositionTracker::new(config_position),
        }
    }

    fn formats(&self) -> LabelFormats {
        LabelFormats {
            clock: self.config.clock_format,
            span: self.config.time_format,
        }
    }

    fn set_status(&mut self, message: impl Into<String>, is_error: bool) {
        let message = message.into();
        if is_error {
            warn!("event=ui_status status=error message={}", crate::logging::single_line(&message, 200));
        }
        self.status_message = Some((message, is_error));
    }

    fn report_store_error(&mut self, err: StoreError) {
        error!("event=store_op status=error error={}", err);
        self.set_status(err.to_string(), true);
    }

    fn report_store(&mut self, result: Result<(), StoreError>, success: &str) {
        match result {
            Ok(()) => self.set_status(success, false),
            Err(err) => self.report_store_error(err),
        }
    }

    fn save_config(&mut self) {
        if let Err(err) = self.config.save() {
            error!("event=config_save status=error error={:#}", err);
            self.set_status(format!("Failed to save settings: {}", err), true);
        }
    }

    fn select_profile(&mut self, profile: ProfileId) {
        if profile == self.profile {
            return;
        }
        self.profile = profile;
        info!("event=profile_select profile={}", profile.0);
        if let Err(err) = self.store.set_last_profile(profile) {
            self.report_store_error(err);
        }
    }

    fn apply_base_time(&mut self) {
        match parse_clock(&self.base_input) {
            Some(minute) => {
                self.base_input = format_clock(minute);
                if minute != self.config.base_minute {
                    self.config.base_minute = minute;
                    self.save_config();
                }
            }
            None => {
                self.set_status(format!("Invalid start time `{}`", self.base_input.trim()), true);
                self.base_input = format_clock(self.config.base_minute);
            }
        }
    }

    fn step_base_time(&mut self, steps: i32) {
        self.config.base_minute = step_by(self.config.base_minute, steps, TIME_STEP);
        self.base_input = format_clock(self.config.base_minute);
        self.save_config();
    }

    fn open_edit_dialog(&mut self, id: EntryId) {
        if let Some((profile_id, entry)) = self.store.entry(id) {
            self.entry_dialog = Some(EntryDialog::edit(profile_id, &entry));
        }
    }

    fn export_current_profile(&mut self) {
        let Some(dir) = self.data_dir.clone() else {
            self.set_status("Export is unavailable without a data directory", true);
            return;
        };
        let Some(profile) = self.store.profile(self.profile).cloned() else {
            return;
        };
        let snapshot = self.store.snapshot(self.profile);
        match export::export_profile(&dir, &profile, &snapshot.entries) {
            Ok(path) => self.set_status(format!("Exported to {}", path.display()), false),
            Err(err) => {
                error!("event=export status=error error={:#}", err);
                self.set_status(format!("Export failed: {}", err), true);
            }
        }
    }

    fn save_settings(&mut self) {
        self.config.clock_format = self.settings_clock_format;
        self.config.time_format = self.settings_time_format;
        self.config.font_scale = clamp_font_scale(self.settings_font_scale);
        self.config.overlap_threshold = self.settings_overlap_threshold.max(0);
        self.base_input = format_clock(self.config.base_minute);
        self.save_config();
        self.show_settings = false;
    }

    /// Save the window position once a move has settled, or right away when closing
    fn track_window_position(&mut self, ctx: &egui::Context, closing: bool) {
        let now = Instant::now();
        if let Some(rect) = ctx.input(|i| i.viewport().outer_rect) {
            self.window_position.observe([rect.min.x, rect.min.y], now);
        }
        let position = if closing {
            self.window_position.flush()
        } else {
            self.window_position.settled(now)
        };
        if let Some(position) = position {
            debug!("event=window_position x={} y={}", position[0], position[1]);
            self.config.window_position = Some(position);
            self.save_config();
        }
    }

    fn render_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let profiles = self.store.profiles().to_vec();
            let mut selected = self.profile;
            let selected_name = profiles
                .iter()
                .find(|p| p.id == selected)
                .map(|p| p.name.clone())
                .unwrap_or_default();

            ui.label("Profile");
            egui::ComboBox::from_label("")
                .selected_text(selected_name)
                .show_ui(ui, |ui| {
                    for profile in &profiles {
                        ui.selectable_value(&mut selected, profile.id, &profile.name);
                    }
                });
            self.select_profile(selected);

            if ui.button(format!("{} Profiles", egui_phosphor::regular::USERS)).clicked() {
                self.show_profiles = true;
            }
            if ui.button(format!("{} Data", egui_phosphor::regular::DATABASE)).clicked() {
                self.show_data_viewer = true;
            }
            if ui.button(format!("{} Export", egui_phosphor::regular::EXPORT)).clicked() {
                self.export_current_profile();
            }
            if ui.button(format!("{} Settings", egui_phosphor::regular::GEAR)).clicked() {
                self.settings_clock_format = self.config.clock_format;
                self.settings_time_format = self.config.time_format;
                self.settings_font_scale = self.config.font_scale;
                self.settings_overlap_threshold = self.config.overlap_threshold;
                self.show_settings = true;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let now = Local::now();
                ui.label(
                    RichText::new(format!("{:02}", now.second()))
                        .size(11.0)
                        .color(Color32::from_rgb(176, 176, 168)),
                );
                ui.label(RichText::new(now.format("%Y/%m/%d (%a) %H:%M").to_string()).size(15.0));
            });
        });
    }

    fn render_base_time_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("{} Start time", egui_phosphor::regular::CLOCK));
            if ui.small_button(egui_phosphor::regular::CARET_LEFT).clicked() {
                self.step_base_time(-1);
            }
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.base_input)
                    .desired_width(64.0)
                    .hint_text("HH:MM"),
            );
            if ui.small_button(egui_phosphor::regular::CARET_RIGHT).clicked() {
                self.step_base_time(1);
            }
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Apply").clicked() || submitted {
                self.apply_base_time();
            }
        });
    }

    fn render_entry_list(&mut self, ui: &mut egui::Ui, entries: &[Entry]) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Entries").strong());
            if ui.button(format!("{} Add", egui_phosphor::regular::PLUS)).clicked() {
                let now = from_naive_time(Local::now().time());
                self.entry_dialog = Some(EntryDialog::add(self.profile, now));
            }
            if !entries.is_empty() && ui.button(format!("{} Clear", egui_phosphor::regular::ERASER)).clicked() {
                self.pending_clear = true;
            }
        });

        if entries.is_empty() {
            ui.label(RichText::new("No entries in this profile yet").color(Color32::from_rgb(112, 112, 104)));
            return;
        }

        let formats = self.formats();
        let mut sorted: Vec<&Entry> = entries.iter().collect();
        sorted.sort_by_key(|e| (e.start, e.end));

        egui::ScrollArea::vertical().show(ui, |ui| {
            for entry in sorted {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(egui_phosphor::regular::CIRCLE).color(to_color32(entry.color, 255)));
                    ui.label(format!(
                        "{} ({})",
                        entry.label,
                        formats.range(entry.start, entry.end)
                    ));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(egui_phosphor::regular::TRASH).on_hover_text("Delete").clicked() {
                            self.pending_delete = Some((entry.id, entry.label.clone()));
                        }
                        if ui.small_button(egui_phosphor::regular::PENCIL_SIMPLE).on_hover_text("Edit").clicked() {
                            self.entry_dialog = Some(EntryDialog::edit(self.profile, entry));
                        }
                    });
                });
            }
        });
    }

    fn render_entry_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.entry_dialog.as_mut() else {
            return;
        };
        let title = match dialog.mode {
            DialogMode::Add => "Add entry",
            DialogMode::Edit(_) => "Edit entry",
        };
        let profiles = self.store.profiles().to_vec();
        let mut action = DialogAction::None;

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .default_width(420.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame())
            .show(ctx, |ui| {
                egui::Grid::new("entry_dialog_grid")
                    .num_columns(2)
                    .spacing([20.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Profile");
                        let selected_name = profiles
                            .iter()
                            .find(|p| p.id == dialog.profile_id)
                            .map(|p| p.name.clone())
                            .unwrap_or_default();
                        egui::ComboBox::from_id_salt("entry_profile")
                            .selected_text(selected_name)
                            .show_ui(ui, |ui| {
                                for profile in &profiles {
                                    ui.selectable_value(&mut dialog.profile_id, profile.id, &profile.name);
                                }
                            });
                        ui.end_row();

                        ui.label("Name");
                        ui.add(egui::TextEdit::singleline(&mut dialog.label).desired_width(240.0));
                        ui.end_row();

                        for (label, input) in [("Start", &mut dialog.start_input), ("End", &mut dialog.end_input)] {
                            ui.label(label);
                            time_stepper(ui, input);
                            ui.end_row();
                        }

                        ui.label("Color");
                        ui.horizontal(|ui| {
                            for swatch in PALETTE {
                                let (rect, response) = ui.allocate_exact_size(egui::vec2(20.0, 20.0), egui::Sense::click());
                                let selected = rgb_array(swatch) == dialog.color;
                                let stroke = if selected {
                                    egui::Stroke::new(2.0, Color32::WHITE)
                                } else {
                                    egui::Stroke::new(1.0, Color32::from_rgb(80, 80, 74))
                                };
                                ui.painter().rect(rect, 3.0, to_color32(swatch, 255), stroke);
                                if response.clicked() {
                                    dialog.color = rgb_array(swatch);
                                }
                            }
                            ui.color_edit_button_srgb(&mut dialog.color);
                        });
                        ui.end_row();
                    });

                if let Some(err) = &dialog.error {
                    ui.add_space(6.0);
                    ui.label(RichText::new(err).color(danger_color()));
                }

                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    if dialog_button(ui, "Save", accent_color()) {
                        action = DialogAction::Save;
                    }
                    if matches!(dialog.mode, DialogMode::Edit(_)) && dialog_button(ui, "Delete", danger_color()) {
                        action = DialogAction::Delete;
                    }
                    if dialog_button(ui, "Cancel", button_text_color()) {
                        action = DialogAction::Close;
                    }
                });
            });

        match action {
            DialogAction::None => {}
            DialogAction::Close => self.entry_dialog = None,
            DialogAction::Delete => {
                if let Some(EntryDialog { mode: DialogMode::Edit(id), label, .. }) = self.entry_dialog.take() {
                    self.pending_delete = Some((id, label));
                }
            }
            DialogAction::Save => self.save_entry_dialog(),
        }
    }

    fn save_entry_dialog(&mut self) {
        let Some(dialog) = self.entry_dialog.as_mut() else {
            return;
        };
        let draft = match dialog.draft() {
            Ok(draft) => draft,
            Err(msg) => {
                dialog.error = Some(msg);
                return;
            }
        };
        let mode = dialog.mode;

        let result = match mode {
            DialogMode::Add => self.store.add_entry(draft).map(|id| {
                info!("event=entry_add id={}", id);
            }),
            DialogMode::Edit(id) => self.store.update_entry(id, draft).map(|()| {
                info!("event=entry_update id={}", id);
            }),
        };

        match result {
            Ok(()) => {
                self.entry_dialog = None;
                self.set_status("Saved", false);
            }
            Err(err) => {
                error!("event=entry_save status=error error={}", err);
                if let Some(dialog) = self.entry_dialog.as_mut() {
                    dialog.error = Some(err.to_string());
                }
            }
        }
    }

    fn render_delete_confirm(&mut self, ctx: &egui::Context) {
        let Some((id, label)) = self.pending_delete.clone() else {
            return;
        };
        let mut do_delete = false;
        let mut cancel_delete = false;

        egui::Window::new("Confirm Delete")
            .collapsible(false)
            .resizable(false)
            .default_width(360.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame())
            .show(ctx, |ui| {
                ui.label(format!("Delete \"{}\"?", label));
                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    do_delete = dialog_button(ui, "Delete", danger_color());
                    cancel_delete = dialog_button(ui, "Cancel", button_text_color());
                });
            });

        if do_delete {
            self.pending_delete = None;
            let result = self.store.delete_entry(id);
            info!("event=entry_delete id={} ok={}", id, result.is_ok());
            self.report_store(result, "Deleted");
        } else if cancel_delete {
            self.pending_delete = None;
        }
    }

    fn render_clear_confirm(&mut self, ctx: &egui::Context) {
        if !self.pending_clear {
            return;
        }
        let name = self
            .store
            .profile(self.profile)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let mut do_clear = false;
        let mut cancel_clear = false;

        egui::Window::new("Clear entries")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame())
            .show(ctx, |ui| {
                ui.label(format!("Remove every entry from \"{}\"?", name));
                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    do_clear = dialog_button(ui, "Clear", danger_color());
                    cancel_clear = dialog_button(ui, "Cancel", button_text_color());
                });
            });

        if do_clear {
            self.pending_clear = false;
            match self.store.clear_profile(self.profile) {
                Ok(removed) => {
                    info!("event=profile_clear id={} removed={}", self.profile.0, removed);
                    self.set_status(format!("Removed {} entries", removed), false);
                }
                Err(err) => self.report_store_error(err),
            }
        } else if cancel_clear {
            self.pending_clear = false;
        }
    }

    fn render_profiles_window(&mut self, ctx: &egui::Context) {
        if !self.show_profiles {
            return;
        }
        let (_, _, frame_text) = dialog_colors();
        let profiles = self.store.profiles().to_vec();
        let mut add_clicked = false;
        let mut delete_request = None;
        let mut rename_request = None;
        let mut rename_commit = false;
        let mut close = false;

        egui::Window::new("Profiles")
            .collapsible(false)
            .resizable(false)
            .default_width(360.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame())
            .show(ctx, |ui| {
                for profile in &profiles {
                    ui.horizontal(|ui| {
                        match self.renaming.as_mut() {
                            Some((id, name)) if *id == profile.id => {
                                let response = ui.add(egui::TextEdit::singleline(name).desired_width(200.0));
                                let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                                if ui.small_button(egui_phosphor::regular::CHECK).clicked() || submitted {
                                    rename_commit = true;
                                }
                            }
                            _ => {
                                let text = if profile.id == self.profile {
                                    RichText::new(&profile.name).strong()
                                } else {
                                    RichText::new(&profile.name).color(frame_text)
                                };
                                ui.label(text);
                            }
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if profile.id != DEFAULT_PROFILE_ID
                                && ui.small_button(egui_phosphor::regular::TRASH).clicked()
                            {
                                delete_request = Some(profile.id);
                            }
                            if ui.small_button(egui_phosphor::regular::PENCIL_SIMPLE).clicked() {
                                rename_request = Some((profile.id, profile.name.clone()));
                            }
                        });
                    });
                }

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.new_profile_name)
                            .hint_text("New profile")
                            .desired_width(200.0),
                    );
                    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button(egui_phosphor::regular::PLUS).clicked() || submitted {
                        add_clicked = true;
                    }
                });

                ui.add_space(16.0);
                if dialog_button(ui, "Close", button_text_color()) {
                    close = true;
                }
            });

        if add_clicked {
            match self.store.add_profile(&self.new_profile_name) {
                Ok(id) => {
                    info!("event=profile_add id={}", id.0);
                    self.new_profile_name.clear();
                }
                Err(err) => self.report_store_error(err),
            }
        }
        if rename_request.is_some() {
            self.renaming = rename_request;
        }
        if rename_commit {
            if let Some((id, name)) = self.renaming.take() {
                let result = self.store.rename_profile(id, &name);
                if result.is_ok() {
                    info!("event=profile_rename id={}", id.0);
                }
                self.report_store(result, "Profile renamed");
            }
        }
        if delete_request.is_some() {
            self.pending_profile_delete = delete_request;
        }
        if close {
            self.show_profiles = false;
            self.renaming = None;
        }
    }

    fn render_profile_delete_confirm(&mut self, ctx: &egui::Context) {
        let Some(id) = self.pending_profile_delete else {
            return;
        };
        let name = self
            .store
            .profile(id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let mut do_delete = false;
        let mut cancel_delete = false;

        egui::Window::new("Delete profile")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame())
            .show(ctx, |ui| {
                ui.label(format!("Delete profile \"{}\" and all of its entries?", name));
                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    do_delete = dialog_button(ui, "Delete", danger_color());
                    cancel_delete = dialog_button(ui, "Cancel", button_text_color());
                });
            });

        if do_delete {
            self.pending_profile_delete = None;
            let result = self.store.delete_profile(id);
            if result.is_ok() {
                info!("event=profile_delete id={}", id.0);
                if self.profile == id {
                    self.profile = self.store.last_profile();
                }
            }
            self.report_store(result, "Profile deleted");
        } else if cancel_delete {
            self.pending_profile_delete = None;
        }
    }

    fn render_data_viewer(&mut self, ctx: &egui::Context) {
        let formats = self.formats();
        let all = self.store.all_entries();
        let mut open = self.show_data_viewer;

        egui::Window::new("Stored data")
            .open(&mut open)
            .collapsible(false)
            .default_width(560.0)
            .default_height(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui::Grid::new("data_viewer_grid")
                        .num_columns(6)
                        .striped(true)
                        .spacing([16.0, 6.0])
                        .show(ui, |ui| {
                            for header in ["Profile", "ID", "Name", "Start", "End", "Color"] {
                                ui.label(RichText::new(header).strong());
                            }
                            ui.end_row();

                            for (profile, entries) in &all {
                                for entry in entries {
                                    ui.label(&profile.name);
                                    ui.label(entry.id.to_string());
                                    ui.label(&entry.label);
                                    ui.label(formats.clock(entry.start));
                                    ui.label(formats.clock(entry.end));
                                    ui.label(
                                        RichText::new(entry.color.to_hex())
                                            .color(to_color32(entry.color, 255)),
                                    );
                                    ui.end_row();
                                }
                            }
                        });
                });
            });

        self.show_data_viewer = open;
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }
        let (_, _, frame_text) = dialog_colors();

        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .default_width(480.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame())
            .show(ctx, |ui| {
                ui.label(RichText::new("Display").color(frame_text).strong());
                ui.add_space(8.0);

                egui::Grid::new("display_grid")
                    .num_columns(2)
                    .spacing([20.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Font scale");
                        ui.horizontal(|ui| {
                            ui.add(egui::Slider::new(&mut self.settings_font_scale, MIN_FONT_SCALE..=MAX_FONT_SCALE).show_value(false));
                            ui.label(format!("{:.0}%", self.settings_font_scale * 100.0));
                        });
                        ui.end_row();

                        ui.label("Duration format");
                        ui.horizontal(|ui| {
                            ui.radio_value(&mut self.settings_time_format, TimeFormat::HoursMinutes, "3h 15m");
                            ui.radio_value(&mut self.settings_time_format, TimeFormat::Decimal, "3.25h");
                        });
                        ui.end_row();

                        ui.label("Clock format");
                        ui.horizontal(|ui| {
                            ui.radio_value(&mut self.settings_clock_format, ClockFormat::Hour24, "14:30");
                            ui.radio_value(&mut self.settings_clock_format, ClockFormat::Hour12, "2:30pm");
                        });
                        ui.end_row();

                        ui.label("Overlap threshold");
                        ui.horizontal(|ui| {
                            ui.add(egui::DragValue::new(&mut self.settings_overlap_threshold).range(0..=120));
                            ui.label("minutes");
                        });
                        ui.end_row();
                    });

                ui.add_space(24.0);
                ui.horizontal(|ui| {
                    if dialog_button(ui, "Save", button_text_color()) {
                        self.save_settings();
                    }
                    if dialog_button(ui, "Cancel", button_text_color()) {
                        self.show_settings = false;
                    }
                });
            });
    }
}

/// "HH:MM" text field flanked by half-hour step buttons
fn time_stepper(ui: &mut egui::Ui, input: &mut String) {
    ui.horizontal(|ui| {
        let current = parse_clock(input);
        if ui.small_button(egui_phosphor::regular::CARET_LEFT).clicked() {
            if let Some(minute) = current {
                *input = format_clock(step_by(minute, -1, TIME_STEP));
            }
        }
        ui.add(egui::TextEdit::singleline(input).desired_width(64.0).hint_text("HH:MM"));
        if ui.small_button(egui_phosphor::regular::CARET_RIGHT).clicked() {
            if let Some(minute) = current {
                *input = format_clock(step_by(minute, 1, TIME_STEP));
            }
        }
    });
}

impl eframe::App for DaylineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Pinch-to-zoom (trackpad pinch or Ctrl+scroll)
        let zoom_delta = ctx.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            self.config.font_scale = clamp_font_scale(self.config.font_scale * zoom_delta);
            if (zoom_delta - 1.0).abs() > 0.01 {
                self.save_config();
            }
        }
        ctx.set_pixels_per_point(self.config.font_scale);

        let closing = ctx.input(|i| i.viewport().close_requested());
        self.track_window_position(ctx, closing);

        // The clock and progress bars tick once per second
        ctx.request_repaint_after(Duration::from_secs(1));
        let now = from_naive_time(Local::now().time());

        let snapshot = self.store.snapshot(self.profile);
        let layout = self
            .lane_cache
            .get_or_pack(snapshot.key(), &snapshot.entries, self.config.layout_options())
            .clone();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_top_bar(ui);
            self.render_base_time_row(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            if let Some((message, is_error)) = &self.status_message {
                let color = if *is_error { danger_color() } else { Color32::from_rgb(176, 176, 168) };
                ui.label(RichText::new(message).color(color));
            } else {
                ui.label(
                    RichText::new(format!("{} entries", snapshot.entries.len()))
                        .color(Color32::from_rgb(112, 112, 104)),
                );
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {

            let formats = self.formats();
            let timeline = render_timeline(
                ui,
                &snapshot.entries,
                &layout,
                self.config.base_minute,
                now,
                formats,
            );
            if let Some(id) = timeline.clicked {
                self.open_edit_dialog(id);
            } else if let Some(minute) = timeline.add_at {
                self.entry_dialog = Some(EntryDialog::add(self.profile, minute));
            }

            ui.add_space(12.0);
            self.render_entry_list(ui, &snapshot.entries);
        });

        self.render_entry_dialog(ctx);
        self.render_delete_confirm(ctx);
        self.render_clear_confirm(ctx);
        self.render_profiles_window(ctx);
        self.render_profile_delete_confirm(ctx);
        if self.show_data_viewer {
            self.render_data_viewer(ctx);
        }
        self.render_settings(ctx);

        if closing {
            info!("event=app_close profile={}", self.profile.0);
        }
    }
}
