//! Persisted slot holding the ordered script list.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::domain::model::ScriptList;

/// Default key naming the persisted slot.
pub const DEFAULT_SLOT: &str = "user_scripts_list";

/// Reads and writes the full script list as one JSON document.
///
/// The store is the only writer of persisted state. Callers load the full list, mutate their
/// copy, and hand the complete result back to [`ScriptStore::save`].
#[derive(Debug, Clone)]
pub struct ScriptStore {
    root: PathBuf,
    path: PathBuf,
}

impl ScriptStore {
    /// Create a store whose slot lives under `root` as `<slot>.json`.
    pub fn new(root: impl Into<PathBuf>, slot: &str) -> Self {
        let root = root.into();
        let path = root.join(format!("{slot}.json"));
        Self { root, path }
    }

    /// Location of the persisted slot.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted list. Absent or malformed content yields an empty list.
    pub fn load(&self) -> ScriptList {
        match self.read_slot() {
            Slot::Loaded(list) => list,
            Slot::Absent => {
                debug!(path = %self.path.display(), "no persisted scripts");
                ScriptList::new()
            }
            Slot::Corrupt(reason) => {
                warn!(
                    path = %self.path.display(),
                    error = %reason,
                    "persisted scripts are corrupt; starting from an empty list"
                );
                ScriptList::new()
            }
        }
    }

    fn read_slot(&self) -> Slot {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Slot::Absent,
            Err(err) => return Slot::Corrupt(err.to_string()),
        };

        match serde_json::from_str::<ScriptList>(&data) {
            Ok(list) => Slot::Loaded(list),
            Err(err) => Slot::Corrupt(err.to_string()),
        }
    }

    /// Replace the persisted slot with `list`.
    pub fn save(&self, list: &ScriptList) -> Result<()> {
        let dir = self.path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;

        let data = serde_json::to_string(list).context("failed to serialize script list")?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write scripts to {}", self.path.display()))?;
        debug!(path = %self.path.display(), count = list.len(), "saved scripts");
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Slot {
    Absent,
    Corrupt(String),
    Loaded(ScriptList),
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::model::ScriptRecord;

    fn store() -> (tempfile::TempDir, ScriptStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ScriptStore::new(dir.path(), DEFAULT_SLOT);
        (dir, store)
    }

    #[test]
    fn save_then_load_round_trips() -> Result<()> {
        let (_dir, store) = store();
        let list = ScriptList::from(vec![
            ScriptRecord::new("greet", "says hi", "echo hi", true),
            ScriptRecord::new("greet", "", "echo again\nexit 0", false),
            ScriptRecord::new("", "unicode ✓", "printf '→'", true),
        ]);

        store.save(&list)?;
        assert_eq!(store.load(), list);
        Ok(())
    }

    #[test]
    fn load_returns_empty_when_slot_is_absent() {
        let (_dir, store) = store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn unreadable_slot_is_corrupt_not_absent() -> Result<()> {
        let (_dir, store) = store();
        assert_eq!(store.read_slot(), Slot::Absent);

        fs::write(store.path(), [0xff, 0xfe, b'[', b']'])?;
        assert!(matches!(store.read_slot(), Slot::Corrupt(_)));
        assert!(store.load().is_empty());
        Ok(())
    }

    #[test]
    fn load_returns_empty_on_malformed_json() -> Result<()> {
        let (_dir, store) = store();
        fs::write(store.path(), "{not json")?;
        assert!(store.load().is_empty());
        Ok(())
    }

    #[test]
    fn load_returns_empty_on_wrong_shape() -> Result<()> {
        let (_dir, store) = store();
        fs::write(store.path(), r#"{"name":"a","code":"","enabled":true}"#)?;
        assert!(store.load().is_empty());

        fs::write(store.path(), r#"[{"name":"a","code":"","enabled":"yes"}]"#)?;
        assert!(store.load().is_empty());

        fs::write(store.path(), r#"[1, 2, 3]"#)?;
        assert!(store.load().is_empty());
        Ok(())
    }

    #[test]
    fn save_creates_missing_directories_and_overwrites() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ScriptStore::new(dir.path().join("nested/data"), "slot");

        let first = ScriptList::from(vec![ScriptRecord::new("a", "", "true", true)]);
        store.save(&first)?;
        store.save(&ScriptList::new())?;

        assert!(store.path().ends_with("nested/data/slot.json"));
        assert!(store.load().is_empty());
        Ok(())
    }
}
