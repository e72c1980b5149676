//! Import and export of the script list as a portable JSON file.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::errors::ImportError;
use crate::domain::model::{ScriptList, ScriptRecord};

/// Default file name offered for exports.
pub const DEFAULT_EXPORT_FILE: &str = "user-scripts.json";

/// Where an export is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    Stdout,
    File(PathBuf),
}

impl ExportTarget {
    /// `-` selects stdout; anything else is a file path.
    pub fn parse(value: &str) -> Self {
        if value == "-" {
            ExportTarget::Stdout
        } else {
            ExportTarget::File(PathBuf::from(value))
        }
    }
}

/// Pretty-printed JSON for the full list.
pub fn render_export(list: &ScriptList) -> Result<String> {
    let mut rendered =
        serde_json::to_string_pretty(list).context("failed to serialize scripts for export")?;
    rendered.push('\n');
    Ok(rendered)
}

/// Write the full list to `target`. No filtering and no confirmation.
pub fn export(list: &ScriptList, target: &ExportTarget) -> Result<()> {
    let rendered = render_export(list)?;
    match target {
        ExportTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("failed to write export to stdout")?;
        }
        ExportTarget::File(path) => {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(dir).with_context(|| {
                    format!("failed to create export directory {}", dir.display())
                })?;
            }
            fs::write(path, rendered)
                .with_context(|| format!("failed to write export to {}", path.display()))?;
        }
    }
    Ok(())
}

/// Parsed import waiting to be merged into an existing list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    records: Vec<ScriptRecord>,
    duplicates: Vec<String>,
}

impl ImportPlan {
    /// Parse `contents` and flag every imported record whose name is already in `existing`.
    pub fn prepare(contents: &str, existing: &ScriptList) -> Result<Self, ImportError> {
        let records = parse_import(contents)?;
        let existing_names: HashSet<&str> =
            existing.iter().map(|record| record.name.as_str()).collect();
        let duplicates = records
            .iter()
            .filter(|record| existing_names.contains(record.name.as_str()))
            .map(|record| record.name.clone())
            .collect();
        Ok(Self {
            records,
            duplicates,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Confirmation text listing every colliding name.
    pub fn duplicate_prompt(&self) -> String {
        let names = self
            .duplicates
            .iter()
            .map(|name| format!("• {name}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "The following imported scripts have the same name as existing ones:\n\n{names}\n\n\
             They will be added anyway as duplicates. Continue?"
        )
    }

    /// Append every imported record to `list`, duplicates included.
    pub fn apply(self, list: &mut ScriptList) -> usize {
        let count = self.records.len();
        list.extend(self.records);
        count
    }
}

/// Read an import file from disk.
pub fn read_import(path: &Path) -> Result<String, ImportError> {
    fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn parse_import(contents: &str) -> Result<Vec<ScriptRecord>, ImportError> {
    let value: Value = serde_json::from_str(contents)?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|err| ImportError::InvalidRecord {
                index,
                reason: err.to_string(),
            })
        })
        .collect()
}
