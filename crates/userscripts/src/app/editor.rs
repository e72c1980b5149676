//! In-memory editor session: the open draft and which record it targets.

use crate::domain::model::{ScriptRecord, UNTITLED};

/// Which record the open editor writes to on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(usize),
}

impl EditTarget {
    pub fn index(self) -> Option<usize> {
        match self {
            EditTarget::New => None,
            EditTarget::Existing(index) => Some(index),
        }
    }
}

/// Raw editor fields, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDraft {
    pub name: String,
    pub description: String,
    pub code: String,
    pub enabled: bool,
}

impl Default for ScriptDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            code: String::new(),
            enabled: true,
        }
    }
}

impl From<&ScriptRecord> for ScriptDraft {
    fn from(record: &ScriptRecord) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            code: record.code.clone(),
            enabled: record.enabled,
        }
    }
}

impl ScriptDraft {
    /// Normalize the fields into a record the way Save does.
    pub fn to_record(&self) -> ScriptRecord {
        let name = match self.name.trim() {
            "" => UNTITLED.to_string(),
            trimmed => trimmed.to_string(),
        };
        ScriptRecord {
            name,
            description: self.description.trim().to_string(),
            code: self.code.clone(),
            enabled: self.enabled,
        }
    }
}

/// Inline status shown after running the editor's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    Err(String),
}

impl RunStatus {
    pub fn label(&self) -> String {
        match self {
            RunStatus::Ok => "✓ Ran OK".to_string(),
            RunStatus::Err(message) => format!("✗ {message}"),
        }
    }
}

/// An open editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    target: EditTarget,
    pub draft: ScriptDraft,
    run_status: Option<RunStatus>,
}

impl EditorSession {
    pub fn new_script() -> Self {
        Self {
            target: EditTarget::New,
            draft: ScriptDraft::default(),
            run_status: None,
        }
    }

    pub fn for_record(index: usize, record: &ScriptRecord) -> Self {
        Self {
            target: EditTarget::Existing(index),
            draft: ScriptDraft::from(record),
            run_status: None,
        }
    }

    pub fn target(&self) -> EditTarget {
        self.target
    }

    pub fn run_status(&self) -> Option<&RunStatus> {
        self.run_status.as_ref()
    }

    pub fn set_run_status(&mut self, status: RunStatus) {
        self.run_status = Some(status);
    }

    pub fn clear_run_status(&mut self) {
        self.run_status = None;
    }

    /// Keep the pointer on the same logical record after `src` moved to `dst`.
    pub fn follow_move(&mut self, src: usize, dst: usize) {
        if let EditTarget::Existing(pointer) = self.target {
            self.target = EditTarget::Existing(adjust_for_move(pointer, src, dst));
        }
    }

    /// Adjust the pointer after `removed` was deleted.
    ///
    /// Returns `false` when the edited record itself was removed and the editor should close.
    pub fn follow_removal(&mut self, removed: usize) -> bool {
        match self.target {
            EditTarget::Existing(pointer) if pointer == removed => false,
            EditTarget::Existing(pointer) if pointer > removed => {
                self.target = EditTarget::Existing(pointer - 1);
                true
            }
            _ => true,
        }
    }
}

/// Where a pointer at `pointer` ends up after moving the record at `src` to `dst`.
pub fn adjust_for_move(pointer: usize, src: usize, dst: usize) -> usize {
    if pointer == src {
        dst
    } else if src < pointer && dst >= pointer {
        pointer - 1
    } else if src > pointer && dst <= pointer {
        pointer + 1
    } else {
        pointer
    }
}
