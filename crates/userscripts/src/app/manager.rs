//! Command dispatch for every list and editor action.
//!
//! Each user action maps to one [`Command`]. The manager re-reads the list from the store for
//! every command, mutates a copy, and saves the complete result, so it never holds list state
//! across commands. Only the editor session lives here.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::app::editor::{EditTarget, EditorSession, RunStatus};
use crate::app::runner::{RunReport, RunOutcome, Runner, ScriptHost};
use crate::app::store::ScriptStore;
use crate::app::transfer::{self, ExportTarget, ImportPlan};
use crate::domain::errors::CommandError;
use crate::domain::model::ScriptList;

/// Answers yes/no questions raised by destructive or surprising actions.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Accepts every prompt, e.g. for `--yes` on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }
}

/// Declines every prompt while remembering the first question asked.
///
/// Used by interactive front ends to discover whether a command needs confirmation: the
/// command runs once against `Deferred` (a clean no-op when a prompt is raised), the question
/// is shown, and the command is dispatched again with [`AssumeYes`] if the user agrees.
#[derive(Debug, Default, Clone)]
pub struct Deferred {
    pub question: Option<String>,
}

impl Confirm for Deferred {
    fn confirm(&mut self, message: &str) -> bool {
        if self.question.is_none() {
            self.question = Some(message.to_string());
        }
        false
    }
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// One named user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a blank editor targeting a new record.
    Add,
    /// Open the editor on the record at this position.
    Edit(usize),
    /// Persist the editor's draft and close it.
    Save,
    /// Run the editor's current contents without saving.
    RunDraft,
    /// Close the editor without saving.
    Cancel,
    /// Run the persisted record at this position, ignoring its enabled flag.
    RunOne(usize),
    Toggle(usize),
    Delete(usize),
    Reorder { src: usize, dst: usize },
    Export(ExportTarget),
    Import(PathBuf),
}

/// What a dispatched command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    EditorOpened(EditTarget),
    EditorClosed,
    Saved { index: usize, name: String },
    DraftRan(RunStatus),
    Ran(RunReport),
    Toggled { index: usize, enabled: bool },
    Deleted { index: usize, name: String },
    Moved { src: usize, dst: usize },
    Exported { count: usize, target: ExportTarget },
    Imported { count: usize },
    /// The user declined a confirmation; nothing changed.
    Declined,
    Unchanged,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::EditorOpened(EditTarget::New) => write!(f, "Editing new script"),
            Outcome::EditorOpened(EditTarget::Existing(index)) => {
                write!(f, "Editing script #{index}")
            }
            Outcome::EditorClosed => write!(f, "Editor closed"),
            Outcome::Saved { name, .. } => write!(f, "Saved \"{name}\""),
            Outcome::DraftRan(status) => write!(f, "{}", status.label()),
            Outcome::Ran(report) => write!(f, "{report}"),
            Outcome::Toggled { index, enabled } => write!(
                f,
                "Script #{index} {}",
                if *enabled { "enabled" } else { "disabled" }
            ),
            Outcome::Deleted { name, .. } => write!(f, "Deleted \"{name}\""),
            Outcome::Moved { src, dst } => write!(f, "Moved script #{src} to #{dst}"),
            Outcome::Exported { count, target } => match target {
                ExportTarget::Stdout => write!(f, "Exported {count} script(s)"),
                ExportTarget::File(path) => {
                    write!(f, "Exported {count} script(s) to {}", path.display())
                }
            },
            Outcome::Imported { count } => write!(f, "Imported {count} script(s)."),
            Outcome::Declined => write!(f, "Cancelled"),
            Outcome::Unchanged => write!(f, "Nothing to do"),
        }
    }
}

/// Owns the store, the runner, and the single open editor.
#[derive(Debug)]
pub struct ScriptManager<H> {
    store: ScriptStore,
    runner: Runner<H>,
    editor: Option<EditorSession>,
}

impl<H: ScriptHost> ScriptManager<H> {
    pub fn new(store: ScriptStore, runner: Runner<H>) -> Self {
        Self {
            store,
            runner,
            editor: None,
        }
    }

    pub fn store(&self) -> &ScriptStore {
        &self.store
    }

    pub fn runner(&self) -> &Runner<H> {
        &self.runner
    }

    /// Fresh copy of the persisted list.
    pub fn scripts(&self) -> ScriptList {
        self.store.load()
    }

    pub fn summary_hint(&self) -> String {
        self.scripts().summary_hint()
    }

    pub fn editor(&self) -> Option<&EditorSession> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditorSession> {
        self.editor.as_mut()
    }

    /// Execute one command, asking `confirm` before destructive or surprising changes.
    pub fn dispatch(&mut self, command: Command, confirm: &mut dyn Confirm) -> Result<Outcome> {
        match command {
            Command::Add => Ok(self.open_editor(None)?),
            Command::Edit(index) => Ok(self.open_editor(Some(index))?),
            Command::Save => self.save_editor(),
            Command::RunDraft => Ok(self.run_draft()?),
            Command::Cancel => Ok(self.close_editor()),
            Command::RunOne(index) => Ok(self.run_one(index)?),
            Command::Toggle(index) => self.toggle(index),
            Command::Delete(index) => self.delete(index, confirm),
            Command::Reorder { src, dst } => self.reorder(src, dst),
            Command::Export(target) => self.export(target),
            Command::Import(path) => {
                let contents = transfer::read_import(&path)
                    .map_err(|err| anyhow!("Import failed: {err}"))?;
                self.import_contents(&contents, confirm)
            }
        }
    }

    fn open_editor(&mut self, index: Option<usize>) -> Result<Outcome, CommandError> {
        let session = match index {
            None => EditorSession::new_script(),
            Some(index) => {
                let list = self.scripts();
                let record = list.get(index).ok_or(CommandError::IndexOutOfRange {
                    index,
                    len: list.len(),
                })?;
                EditorSession::for_record(index, record)
            }
        };
        let target = session.target();
        self.editor = Some(session);
        Ok(Outcome::EditorOpened(target))
    }

    fn close_editor(&mut self) -> Outcome {
        match self.editor.take() {
            Some(_) => Outcome::EditorClosed,
            None => Outcome::Unchanged,
        }
    }

    fn save_editor(&mut self) -> Result<Outcome> {
        let session = self.editor.as_ref().ok_or(CommandError::NoOpenEditor)?;
        let record = session.draft.to_record();
        let name = record.name.clone();

        let mut list = self.scripts();
        let index = list.put(session.target().index(), record);
        self.store.save(&list)?;
        self.editor = None;

        info!(index, name = %name, "saved script");
        Ok(Outcome::Saved { index, name })
    }

    fn run_draft(&mut self) -> Result<Outcome, CommandError> {
        let session = self.editor.as_mut().ok_or(CommandError::NoOpenEditor)?;
        let name = session.draft.to_record().name;
        let report = self.runner.run_source(&name, &session.draft.code);
        let status = match report.outcome {
            RunOutcome::Failed(message) => RunStatus::Err(message),
            _ => RunStatus::Ok,
        };
        session.set_run_status(status.clone());
        Ok(Outcome::DraftRan(status))
    }

    fn run_one(&self, index: usize) -> Result<Outcome, CommandError> {
        let list = self.scripts();
        let record = list.get(index).ok_or(CommandError::IndexOutOfRange {
            index,
            len: list.len(),
        })?;
        Ok(Outcome::Ran(self.runner.run_now(record)))
    }

    fn toggle(&mut self, index: usize) -> Result<Outcome> {
        let mut list = self.scripts();
        let len = list.len();
        let record = list
            .get_mut(index)
            .ok_or(CommandError::IndexOutOfRange { index, len })?;
        record.enabled = !record.enabled;
        let enabled = record.enabled;
        self.store.save(&list)?;
        Ok(Outcome::Toggled { index, enabled })
    }

    fn delete(&mut self, index: usize, confirm: &mut dyn Confirm) -> Result<Outcome> {
        let mut list = self.scripts();
        let name = list
            .get(index)
            .map(|record| record.name.clone())
            .ok_or(CommandError::IndexOutOfRange {
                index,
                len: list.len(),
            })?;
        let label = if name.is_empty() {
            "this script"
        } else {
            name.as_str()
        };
        if !confirm.confirm(&format!("Delete \"{label}\"?")) {
            return Ok(Outcome::Declined);
        }

        list.remove(index);
        self.store.save(&list)?;

        let keep_editor = self
            .editor
            .as_mut()
            .map(|session| session.follow_removal(index))
            .unwrap_or(true);
        if !keep_editor {
            self.editor = None;
        }

        info!(index, name = %name, "deleted script");
        Ok(Outcome::Deleted { index, name })
    }

    fn reorder(&mut self, src: usize, dst: usize) -> Result<Outcome> {
        let mut list = self.scripts();
        let len = list.len();
        if !list.move_record(src, dst) {
            let index = if src >= len { src } else { dst };
            return Err(CommandError::IndexOutOfRange { index, len }.into());
        }
        if src == dst {
            return Ok(Outcome::Unchanged);
        }
        self.store.save(&list)?;

        if let Some(session) = self.editor.as_mut() {
            session.follow_move(src, dst);
        }
        Ok(Outcome::Moved { src, dst })
    }

    fn export(&self, target: ExportTarget) -> Result<Outcome> {
        let list = self.scripts();
        transfer::export(&list, &target)?;
        Ok(Outcome::Exported {
            count: list.len(),
            target,
        })
    }

    /// Merge a JSON export into the list, confirming first when names collide.
    pub fn import_contents(
        &mut self,
        contents: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<Outcome> {
        let mut list = self.scripts();
        let plan = ImportPlan::prepare(contents, &list)
            .map_err(|err| anyhow!("Import failed: {err}"))?;

        if plan.has_duplicates() {
            warn!(duplicates = ?plan.duplicates(), "imported scripts collide with existing names");
            if !confirm.confirm(&plan.duplicate_prompt()) {
                return Ok(Outcome::Declined);
            }
        }

        let count = plan.apply(&mut list);
        self.store.save(&list)?;
        info!(count, "imported scripts");
        Ok(Outcome::Imported { count })
    }
}
