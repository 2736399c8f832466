//! Profiles and schedule entries, persisted as one JSON document.
//!
//! Every mutation bumps `revision` and is written through to disk, so a
//! snapshot handed to the timeline is never observed half-updated.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schedule::{Entry, EntryId, Minute, Rgb, SnapshotKey, MINUTES_PER_DAY};

pub const DEFAULT_PROFILE_ID: ProfileId = ProfileId(1);
const DEFAULT_PROFILE_NAME: &str = "Default";
const STORE_FILE_NAME: &str = "schedule.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredEntry {
    id: EntryId,
    profile_id: ProfileId,
    label: String,
    start: Minute,
    end: Minute,
    color: Rgb,
}

impl StoredEntry {
    fn to_entry(&self) -> Entry {
        Entry {
            id: self.id,
            label: self.label.clone(),
            start: self.start,
            end: self.end,
            color: self.color,
        }
    }
}

/// Add/edit submission from the entry dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub profile_id: ProfileId,
    pub label: String,
    pub start: Minute,
    pub end: Minute,
    pub color: Rgb,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile {0:?} does not exist")]
    ProfileNotFound(ProfileId),
    #[error("entry {0} does not exist")]
    EntryNotFound(EntryId),
    #[error("the default profile cannot be deleted")]
    DefaultProfile,
    #[error("a profile named `{0}` already exists")]
    DuplicateProfile(String),
    #[error("profile name cannot be empty")]
    EmptyProfileName,
    #[error("{field} minute {value} is outside 00:00-23:59")]
    MinuteOutOfRange { field: &'static str, value: Minute },
    #[error("failed to access schedule file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse schedule file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    profiles: Vec<Profile>,
    entries: Vec<StoredEntry>,
    #[serde(default = "default_profile_id")]
    last_profile_id: ProfileId,
    next_profile_id: u64,
    next_entry_id: u64,
}

fn default_profile_id() -> ProfileId {
    DEFAULT_PROFILE_ID
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            profiles: vec![Profile {
                id: DEFAULT_PROFILE_ID,
                name: DEFAULT_PROFILE_NAME.to_string(),
            }],
            entries: Vec::new(),
            last_profile_id: DEFAULT_PROFILE_ID,
            next_profile_id: DEFAULT_PROFILE_ID.0 + 1,
            next_entry_id: 1,
        }
    }
}

/// Read-only view of one profile's entries for a redraw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub profile: ProfileId,
    pub revision: u64,
    pub entries: Vec<Entry>,
}

impl Snapshot {
    pub fn key(&self) -> SnapshotKey {
        SnapshotKey {
            profile: self.profile.0,
            revision: self.revision,
        }
    }
}

#[derive(Debug)]
pub struct ScheduleStore {
    path: Option<PathBuf>,
    data: StoreData,
    revision: u64,
}

impl ScheduleStore {
    /// Store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: StoreData::default(),
            revision: 0,
        }
    }

    /// Open the store in `dir`, creating an empty one if the file is missing
    pub fn open(dir: &Path) -> StoreResult<Self> {
        let path = dir.join(STORE_FILE_NAME);
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str::<StoreData>(&contents)?
        } else {
            StoreData::default()
        };
        ensure_default_profile(&mut data);
        let dropped = drop_invalid_entries(&mut data);

        info!(
            "event=store_open path={} profiles={} entries={} dropped={}",
            path.display(),
            data.profiles.len(),
            data.entries.len(),
            dropped
        );

        Ok(Self {
            path: Some(path),
            data,
            revision: 0,
        })
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.data.profiles
    }

    pub fn profile(&self, id: ProfileId) -> Option<&Profile> {
        self.data.profiles.iter().find(|p| p.id == id)
    }

    pub fn add_profile(&mut self, name: &str) -> StoreResult<ProfileId> {
        let name = self.validate_profile_name(name, None)?;
        let id = ProfileId(self.data.next_profile_id);
        self.data.next_profile_id += 1;
        self.data.profiles.push(Profile { id, name });
        self.commit("add_profile")?;
        Ok(id)
    }

    pub fn rename_profile(&mut self, id: ProfileId, name: &str) -> StoreResult<()> {
        let name = self.validate_profile_name(name, Some(id))?;
        let profile = self
            .data
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::ProfileNotFound(id))?;
        profile.name = name;
        self.commit("rename_profile")
    }

    /// Delete a profile together with its entries
    pub fn delete_profile(&mut self, id: ProfileId) -> StoreResult<()> {
        if id == DEFAULT_PROFILE_ID {
            return Err(StoreError::DefaultProfile);
        }
        self.require_profile(id)?;
        self.data.profiles.retain(|p| p.id != id);
        self.data.entries.retain(|e| e.profile_id != id);
        if self.data.last_profile_id == id {
            self.data.last_profile_id = DEFAULT_PROFILE_ID;
        }
        self.commit("delete_profile")
    }

    /// Last selected profile, or the default one if it no longer exists
    pub fn last_profile(&self) -> ProfileId {
        let id = self.data.last_profile_id;
        if self.profile(id).is_some() {
            id
        } else {
            DEFAULT_PROFILE_ID
        }
    }

    pub fn set_last_profile(&mut self, id: ProfileId) -> StoreResult<()> {
        self.require_profile(id)?;
        if self.data.last_profile_id != id {
            self.data.last_profile_id = id;
            self.commit("set_last_profile")?;
        }
        Ok(())
    }

    pub fn snapshot(&self, profile: ProfileId) -> Snapshot {
        Snapshot {
            profile,
            revision: self.revision,
            entries: self
                .data
                .entries
                .iter()
                .filter(|e| e.profile_id == profile)
                .map(StoredEntry::to_entry)
                .collect(),
        }
    }

    pub fn entry(&self, id: EntryId) -> Option<(ProfileId, Entry)> {
        self.data
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| (e.profile_id, e.to_entry()))
    }

    pub fn add_entry(&mut self, draft: EntryDraft) -> StoreResult<EntryId> {
        self.validate_draft(&draft)?;
        let id = EntryId(self.data.next_entry_id);
        self.data.next_entry_id += 1;
        self.data.entries.push(StoredEntry {
            id,
            profile_id: draft.profile_id,
            label: draft.label,
            start: draft.start,
            end: draft.end,
            color: draft.color,
        });
        self.commit("add_entry")?;
        Ok(id)
    }

    /// Replace an entry's fields; the entry may move to another profile
    pub fn update_entry(&mut self, id: EntryId, draft: EntryDraft) -> StoreResult<()> {
        self.validate_draft(&draft)?;
        let stored = self
            .data
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::EntryNotFound(id))?;
        stored.profile_id = draft.profile_id;
        stored.label = draft.label;
        stored.start = draft.start;
        stored.end = draft.end;
        stored.color = draft.color;
        self.commit("update_entry")
    }

    pub fn delete_entry(&mut self, id: EntryId) -> StoreResult<()> {
        let before = self.data.entries.len();
        self.data.entries.retain(|e| e.id != id);
        if self.data.entries.len() == before {
            return Err(StoreError::EntryNotFound(id));
        }
        self.commit("delete_entry")
    }

    /// Remove every entry of one profile, returning how many were removed
    pub fn clear_profile(&mut self, profile: ProfileId) -> StoreResult<usize> {
        self.require_profile(profile)?;
        let before = self.data.entries.len();
        self.data.entries.retain(|e| e.profile_id != profile);
        let removed = before - self.data.entries.len();
        self.commit("clear_profile")?;
        Ok(removed)
    }

    fn require_profile(&self, id: ProfileId) -> StoreResult<()> {
        self.profile(id)
            .map(|_| ())
            .ok_or(StoreError::ProfileNotFound(id))
    }

    fn validate_profile_name(&self, name: &str, renaming: Option<ProfileId>) -> StoreResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyProfileName);
        }
        let taken = self
            .data
            .profiles
            .iter()
            .any(|p| p.name == name && Some(p.id) != renaming);
        if taken {
            return Err(StoreError::DuplicateProfile(name.to_string()));
        }
        Ok(name.to_string())
    }

    fn validate_draft(&self, draft: &EntryDraft) -> StoreResult<()> {
        check_minutes(draft.start, draft.end)?;
        self.require_profile(draft.profile_id)
    }

    fn commit(&mut self, operation: &str) -> StoreResult<()> {
        self.revision += 1;
        debug!("event=store_{} revision={}", operation, self.revision);

        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, contents).map_err(|err| {
            warn!("event=store_write status=error path={} error={}", path.display(), err);
            StoreError::from(err)
        })
    }

    /// Every profile with its entries, for the data viewer and exports
    pub fn all_entries(&self) -> Vec<(Profile, Vec<Entry>)> {
        self.data
            .profiles
            .iter()
            .map(|p| (p.clone(), self.snapshot(p.id).entries))
            .collect()
    }
}

fn check_minutes(start: Minute, end: Minute) -> StoreResult<()> {
    for (field, value) in [("start", start), ("end", end)] {
        if !(0..MINUTES_PER_DAY).contains(&value) {
            return Err(StoreError::MinuteOutOfRange { field, value });
        }
    }
    Ok(())
}

/// Drop loaded entries that would not pass admission; returns how many were dropped
fn drop_invalid_entries(data: &mut StoreData) -> usize {
    let before = data.entries.len();
    let profiles: Vec<ProfileId> = data.profiles.iter().map(|p| p.id).collect();
    data.entries.retain(|entry| {
        let verdict = check_minutes(entry.start, entry.end).and_then(|()| {
            if profiles.contains(&entry.profile_id) {
                Ok(())
            } else {
                Err(StoreError::ProfileNotFound(entry.profile_id))
            }
        });
        match verdict {
            Ok(()) => true,
            Err(err) => {
                warn!("event=store_load_entry status=dropped id={} error={}", entry.id, err);
                false
            }
        }
    });
    before - data.entries.len()
}

fn ensure_default_profile(data: &mut StoreData) {
    if !data.profiles.iter().any(|p| p.id == DEFAULT_PROFILE_ID) {
        data.profiles.insert(
            0,
            Profile {
                id: DEFAULT_PROFILE_ID,
                name: DEFAULT_PROFILE_NAME.to_string(),
            },
        );
    }
    let max_profile = data.profiles.iter().map(|p| p.id.0).max().unwrap_or(0);
    data.next_profile_id = data.next_profile_id.max(max_profile + 1);
    let max_entry = data.entries.iter().map(|e| e.id.0).max().unwrap_or(0);
    data.next_entry_id = data.next_entry_id.max(max_entry + 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(profile_id: ProfileId, label: &str, start: Minute, end: Minute) -> EntryDraft {
        EntryDraft {
            profile_id,
            label: label.to_string(),
            start,
            end,
            color: Rgb::default(),
        }
    }

    #[test]
    fn fresh_store_has_default_profile() {
        let store = ScheduleStore::in_memory();
        assert_eq!(store.profiles().len(), 1);
        assert_eq!(store.profiles()[0].id, DEFAULT_PROFILE_ID);
        assert_eq!(store.last_profile(), DEFAULT_PROFILE_ID);
        assert!(store.snapshot(DEFAULT_PROFILE_ID).entries.is_empty());
    }

    #[test]
    fn entries_are_scoped_by_profile() {
        let mut store = ScheduleStore::in_memory();
        let work = store.add_profile("Workday").unwrap();
        store.add_entry(draft(DEFAULT_PROFILE_ID, "Sleep", 1380, 420)).unwrap();
        let focus = store.add_entry(draft(work, "Focus", 540, 660)).unwrap();

        let snapshot = store.snapshot(work);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].id, focus);
        assert_eq!(snapshot.entries[0].label, "Focus");
        assert_eq!(store.snapshot(DEFAULT_PROFILE_ID).entries.len(), 1);
    }

    #[test]
    fn every_mutation_bumps_revision() {
        let mut store = ScheduleStore::in_memory();
        let r0 = store.revision();
        let id = store.add_entry(draft(DEFAULT_PROFILE_ID, "A", 60, 120)).unwrap();
        let r1 = store.revision();
        store.update_entry(id, draft(DEFAULT_PROFILE_ID, "B", 60, 180)).unwrap();
        let r2 = store.revision();
        store.delete_entry(id).unwrap();
        assert!(r0 < r1 && r1 < r2 && r2 < store.revision());
        assert_ne!(store.snapshot(DEFAULT_PROFILE_ID).key().revision, r0);
    }

    #[test]
    fn update_can_move_entry_between_profiles() {
        let mut store = ScheduleStore::in_memory();
        let other = store.add_profile("Weekend").unwrap();
        let id = store.add_entry(draft(DEFAULT_PROFILE_ID, "Run", 420, 480)).unwrap();
        store.update_entry(id, draft(other, "Run", 480, 540)).unwrap();

        assert!(store.snapshot(DEFAULT_PROFILE_ID).entries.is_empty());
        let (profile, entry) = store.entry(id).unwrap();
        assert_eq!(profile, other);
        assert_eq!((entry.start, entry.end), (480, 540));
    }

    #[test]
    fn out_of_range_minutes_are_rejected() {
        let mut store = ScheduleStore::in_memory();
        let err = store
            .add_entry(draft(DEFAULT_PROFILE_ID, "Bad", 1440, 60))
            .unwrap_err();
        assert!(matches!(err, StoreError::MinuteOutOfRange { field: "start", value: 1440 }));
        assert!(store.add_entry(draft(DEFAULT_PROFILE_ID, "Bad", 0, -1)).is_err());
        assert!(store.add_entry(draft(ProfileId(99), "Lost", 0, 60)).is_err());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn profile_rules() {
        let mut store = ScheduleStore::in_memory();
        assert!(matches!(store.add_profile("  "), Err(StoreError::EmptyProfileName)));
        let gym = store.add_profile(" Gym ").unwrap();
        assert_eq!(store.profile(gym).unwrap().name, "Gym");
        assert!(matches!(store.add_profile("Gym"), Err(StoreError::DuplicateProfile(_))));
        assert!(matches!(
            store.delete_profile(DEFAULT_PROFILE_ID),
            Err(StoreError::DefaultProfile)
        ));
        store.rename_profile(gym, "Gym days").unwrap();
        assert_eq!(store.profile(gym).unwrap().name, "Gym days");
        store.rename_profile(gym, "Gym days").unwrap();
    }

    #[test]
    fn deleting_profile_drops_entries_and_resets_selection() {
        let mut store = ScheduleStore::in_memory();
        let trip = store.add_profile("Trip").unwrap();
        store.add_entry(draft(trip, "Flight", 600, 900)).unwrap();
        store.set_last_profile(trip).unwrap();
        assert_eq!(store.last_profile(), trip);

        store.delete_profile(trip).unwrap();
        assert_eq!(store.last_profile(), DEFAULT_PROFILE_ID);
        assert!(store.all_entries().iter().all(|(_, entries)| entries.is_empty()));
        assert!(matches!(store.delete_profile(trip), Err(StoreError::ProfileNotFound(_))));
    }

    #[test]
    fn clear_profile_only_touches_that_profile() {
        let mut store = ScheduleStore::in_memory();
        let other = store.add_profile("Other").unwrap();
        store.add_entry(draft(DEFAULT_PROFILE_ID, "A", 0, 60)).unwrap();
        store.add_entry(draft(DEFAULT_PROFILE_ID, "B", 60, 120)).unwrap();
        store.add_entry(draft(other, "C", 0, 60)).unwrap();
        assert_eq!(store.clear_profile(DEFAULT_PROFILE_ID).unwrap(), 2);
        assert_eq!(store.snapshot(other).entries.len(), 1);
    }

    #[test]
    fn persists_to_disk_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let (work, id) = {
            let mut store = ScheduleStore::open(dir.path()).unwrap();
            let work = store.add_profile("Work").unwrap();
            let id = store
                .add_entry(EntryDraft {
                    color: Rgb::new(0x12, 0x34, 0x56),
                    ..draft(work, "Standup", 570, 585)
                })
                .unwrap();
            store.set_last_profile(work).unwrap();
            (work, id)
        };

        let mut store = ScheduleStore::open(dir.path()).unwrap();
        assert_eq!(store.last_profile(), work);
        let entries = store.snapshot(work).entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].color.to_hex(), "#123456");

        // Ids keep counting after a reopen
        let next = store.add_entry(draft(work, "Lunch", 720, 780)).unwrap();
        assert!(next > id);
    }

    #[test]
    fn out_of_range_or_orphaned_entries_are_dropped_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let json = r##"{
            "profiles": [{ "id": 1, "name": "Default" }],
            "entries": [
                { "id": 1, "profile_id": 1, "label": "Ok", "start": 540, "end": 600, "color": "#FF9999" },
                { "id": 2, "profile_id": 1, "label": "Late", "start": 2000, "end": -30, "color": "#FF9999" },
                { "id": 3, "profile_id": 1, "label": "Edge", "start": 0, "end": 1440, "color": "#FF9999" },
                { "id": 4, "profile_id": 9, "label": "Orphan", "start": 60, "end": 120, "color": "#FF9999" }
            ],
            "last_profile_id": 1,
            "next_profile_id": 2,
            "next_entry_id": 5
        }"##;
        fs::write(dir.path().join(STORE_FILE_NAME), json).unwrap();

        let store = ScheduleStore::open(dir.path()).unwrap();
        let entries = store.snapshot(DEFAULT_PROFILE_ID).entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "Ok");
        assert!(store.entry(EntryId(4)).is_none());
        assert_eq!(store.all_entries().iter().map(|(_, e)| e.len()).sum::<usize>(), 1);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE_NAME), "[1, 2").unwrap();
        assert!(matches!(ScheduleStore::open(dir.path()), Err(StoreError::Json(_))));
    }
}
