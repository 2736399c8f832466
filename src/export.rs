use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schedule::{duration, format_clock, Entry};
use crate::store::Profile;

#[derive(Serialize)]
pub struct ScheduleExport {
    pub profile: String,
    pub exported_at: String,
    pub total_minutes: i32,
    pub entries: Vec<ExportEntry>,
}

#[derive(Serialize)]
pub struct ExportEntry {
    pub id: u64,
    pub label: String,
    pub start: String,
    pub end: String,
    pub minutes: i32,
    pub crosses_midnight: bool,
    pub color: String,
}

impl From<&Entry> for ExportEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.0,
            label: entry.label.clone(),
            start: format_clock(entry.start),
            end: format_clock(entry.end),
            minutes: duration(entry.start, entry.end),
            crosses_midnight: entry.crosses_midnight(),
            color: entry.color.to_hex(),
        }
    }
}

/// File name for a profile export: profile name sanitized, plus the date
pub fn export_file_name(profile_name: &str, date: NaiveDate) -> String {
    // Sanitize name for filename (replace spaces with dashes, lowercase)
    let safe_name: String = profile_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{}-{}.json", safe_name, date.format("%Y-%m-%d"))
}

/// Export one profile's schedule to `<dir>/exports/` as JSON.
/// Entries are written in start-time order. Returns the path of the created file.
pub fn export_profile(dir: &Path, profile: &Profile, entries: &[Entry]) -> Result<PathBuf> {
    let exports_dir = dir.join("exports");
    fs::create_dir_all(&exports_dir)
        .context("Failed to create exports directory")?;

    let now = Local::now();
    let file_path = exports_dir.join(export_file_name(&profile.name, now.date_naive()));

    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by_key(|e| (e.start, e.end));

    let export = ScheduleExport {
        profile: profile.name.clone(),
        exported_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        total_minutes: entries.iter().map(Entry::duration).sum(),
        entries: sorted.into_iter().map(ExportEntry::from).collect(),
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize export")?;
    fs::write(&file_path, json)
        .with_context(|| format!("Failed to write {}", file_path.display()))?;

    log::info!("event=export status=ok path={}", file_path.display());
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{EntryId, Rgb};
    use crate::store::ProfileId;

    #[test]
    fn file_name_is_sanitized() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(export_file_name("Work Days", date), "work-days-2026-03-09.json");
    }

    #[test]
    fn writes_sorted_entries_with_totals() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile {
            id: ProfileId(1),
            name: "Default".to_string(),
        };
        let entries = vec![
            Entry {
                id: EntryId(2),
                label: "Sleep".to_string(),
                start: 1380,
                end: 420,
                color: Rgb::new(0x99, 0x99, 0xFF),
            },
            Entry {
                id: EntryId(1),
                label: "Work".to_string(),
                start: 540,
                end: 1020,
                color: Rgb::default(),
            },
        ];

        let path = export_profile(dir.path(), &profile, &entries).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(json["profile"], "Default");
        assert_eq!(json["total_minutes"], 480 + 480);
        assert_eq!(json["entries"][0]["label"], "Work");
        assert_eq!(json["entries"][1]["start"], "23:00");
        assert_eq!(json["entries"][1]["crosses_midnight"], true);
        assert_eq!(json["entries"][1]["color"], "#9999FF");
    }
}
