//! Domain models for script records and the ordered script list.

use serde::{Deserialize, Serialize};

/// Label used when a record is saved or displayed without a name.
pub const UNTITLED: &str = "Untitled";

/// One persisted script entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    pub enabled: bool,
}

impl ScriptRecord {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        code: impl Into<String>,
        enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            code: code.into(),
            enabled,
        }
    }

    /// Name shown in lists and prompts; blank names render as [`UNTITLED`].
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNTITLED
        } else {
            &self.name
        }
    }
}

/// Ordered sequence of records. Position is the only identity a record has.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptList {
    records: Vec<ScriptRecord>,
}

impl ScriptList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ScriptRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ScriptRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ScriptRecord> {
        self.records.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScriptRecord> {
        self.records.iter()
    }

    pub fn push(&mut self, record: ScriptRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ScriptRecord>) {
        self.records.extend(records);
    }

    /// Remove and return the record at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<ScriptRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// Overwrite the record at `index`, or append when `index` is out of range.
    ///
    /// Returns the position the record ended up at.
    pub fn put(&mut self, index: Option<usize>, record: ScriptRecord) -> usize {
        match index.and_then(|idx| self.records.get_mut(idx).map(|slot| (idx, slot))) {
            Some((idx, slot)) => {
                *slot = record;
                idx
            }
            None => {
                self.records.push(record);
                self.records.len() - 1
            }
        }
    }

    /// Move the record at `src` to position `dst`, shifting everything in between.
    ///
    /// Returns `false` without touching the list when either index is out of range.
    pub fn move_record(&mut self, src: usize, dst: usize) -> bool {
        let len = self.records.len();
        if src >= len || dst >= len {
            return false;
        }
        if src != dst {
            let moved = self.records.remove(src);
            self.records.insert(dst, moved);
        }
        true
    }

    pub fn enabled_count(&self) -> usize {
        self.records.iter().filter(|record| record.enabled).count()
    }

    /// One-line summary shown above the list after every mutation.
    pub fn summary_hint(&self) -> String {
        format!("{} script(s) — {} enabled", self.len(), self.enabled_count())
    }
}

impl From<Vec<ScriptRecord>> for ScriptList {
    fn from(records: Vec<ScriptRecord>) -> Self {
        Self { records }
    }
}

impl From<ScriptList> for Vec<ScriptRecord> {
    fn from(list: ScriptList) -> Self {
        list.records
    }
}

impl IntoIterator for ScriptList {
    type Item = ScriptRecord;
    type IntoIter = std::vec::IntoIter<ScriptRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScriptList {
    type Item = &'a ScriptRecord;
    type IntoIter = std::slice::Iter<'a, ScriptRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScriptList {
        ScriptList::from(vec![
            ScriptRecord::new("a", "", "echo a", true),
            ScriptRecord::new("b", "", "echo b", false),
            ScriptRecord::new("c", "", "echo c", true),
        ])
    }

    #[test]
    fn summary_hint_counts_enabled_records() {
        assert_eq!(sample().summary_hint(), "3 script(s) — 2 enabled");
        assert_eq!(ScriptList::new().summary_hint(), "0 script(s) — 0 enabled");
    }

    #[test]
    fn move_record_shifts_intermediate_records() {
        let mut list = sample();
        assert!(list.move_record(0, 2));
        let names: Vec<_> = list.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);

        assert!(list.move_record(2, 0));
        let names: Vec<_> = list.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn move_record_rejects_out_of_range() {
        let mut list = sample();
        assert!(!list.move_record(0, 3));
        assert!(!list.move_record(7, 0));
        assert_eq!(list, sample());
    }

    #[test]
    fn put_appends_when_index_is_stale() {
        let mut list = sample();
        let record = ScriptRecord::new("d", "", "echo d", true);
        assert_eq!(list.put(Some(10), record.clone()), 3);
        assert_eq!(list.put(Some(1), record.clone()), 1);
        assert_eq!(list.get(1), Some(&record));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn missing_description_deserializes_as_empty() {
        let list: ScriptList =
            serde_json::from_str(r#"[{"name":"x","code":"true","enabled":false}]"#).unwrap();
        assert_eq!(list.get(0).unwrap().description, "");
    }

    #[test]
    fn blank_name_displays_as_untitled() {
        let record = ScriptRecord::new("", "", "", true);
        assert_eq!(record.display_name(), UNTITLED);
    }
}
