//! Script execution against the host environment.
//!
//! Scripts run synchronously on the caller's thread with the full ambient environment of the
//! process. There is no isolation, timeout, or cancellation: a script that never exits blocks
//! its caller.

use std::fmt;
use std::process::Command;

use tracing::{debug, error, info, instrument};

use crate::domain::errors::HostError;
use crate::domain::model::ScriptRecord;
use crate::infra::config::RunnerSettings;

const LOG_PREFIX: &str = "[User Scripts]";

/// The single capability of executing source text in the host environment.
pub trait ScriptHost {
    /// Execute `source` verbatim, blocking until it finishes.
    fn execute(&self, source: &str) -> Result<(), HostError>;
}

impl<T: ScriptHost + ?Sized> ScriptHost for &T {
    fn execute(&self, source: &str) -> Result<(), HostError> {
        (**self).execute(source)
    }
}

impl<T: ScriptHost + ?Sized> ScriptHost for Box<T> {
    fn execute(&self, source: &str) -> Result<(), HostError> {
        (**self).execute(source)
    }
}

/// Runs source through an interpreter such as `sh -c`, inheriting env and working directory.
#[derive(Debug, Clone)]
pub struct ShellHost {
    program: String,
    args: Vec<String>,
}

impl ShellHost {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_settings(settings: &RunnerSettings) -> Self {
        Self::new(settings.shell.clone(), settings.args.clone())
    }
}

impl Default for ShellHost {
    fn default() -> Self {
        Self::from_settings(&RunnerSettings::default())
    }
}

impl ScriptHost for ShellHost {
    fn execute(&self, source: &str) -> Result<(), HostError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(source)
            .output()
            .map_err(|source| HostError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(target: "userscripts::script_output", "{}", stdout.trim_end());
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(HostError::ExitStatus {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// What happened when a record was handed to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The record is disabled and the gated entry point was used.
    Skipped,
    Succeeded,
    Failed(String),
}

/// Result of one run, labelled with the script's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub name: String,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Succeeded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, RunOutcome::Failed(_))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            RunOutcome::Skipped => write!(f, "\"{}\" is disabled", self.name),
            RunOutcome::Succeeded => write!(f, "✓ \"{}\" ran successfully", self.name),
            RunOutcome::Failed(message) => {
                write!(f, "✗ \"{}\" threw an error: {message}", self.name)
            }
        }
    }
}

/// Executes records through a [`ScriptHost`], isolating each failure to its own report.
#[derive(Debug, Clone, Default)]
pub struct Runner<H> {
    host: H,
}

impl<H: ScriptHost> Runner<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Run `record` when it is enabled; disabled records are skipped without side effects.
    pub fn run(&self, record: &ScriptRecord) -> RunReport {
        if !record.enabled {
            debug!(name = %record.display_name(), "skipping disabled script");
            return RunReport {
                name: record.display_name().to_string(),
                outcome: RunOutcome::Skipped,
            };
        }
        self.run_now(record)
    }

    /// Run `record` regardless of its enabled flag.
    pub fn run_now(&self, record: &ScriptRecord) -> RunReport {
        self.run_source(record.display_name(), &record.code)
    }

    /// Run unsaved source under `name`, e.g. the editor's current contents.
    #[instrument(skip(self, code), fields(name = %name))]
    pub fn run_source(&self, name: &str, code: &str) -> RunReport {
        let outcome = match self.host.execute(code) {
            Ok(()) => {
                info!("{LOG_PREFIX} ✓ \"{name}\" ran successfully");
                RunOutcome::Succeeded
            }
            Err(err) => {
                error!("{LOG_PREFIX} ✗ \"{name}\" threw an error: {err}");
                RunOutcome::Failed(err.to_string())
            }
        };
        RunReport {
            name: name.to_string(),
            outcome,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Host that records every source it is asked to execute. Sources containing `fail` raise.
    #[derive(Debug, Default)]
    pub struct RecordingHost {
        pub executed: RefCell<Vec<String>>,
    }

    impl RecordingHost {
        pub fn executed(&self) -> Vec<String> {
            self.executed.borrow().clone()
        }
    }

    impl ScriptHost for RecordingHost {
        fn execute(&self, source: &str) -> Result<(), HostError> {
            self.executed.borrow_mut().push(source.to_string());
            if source.contains("fail") {
                Err(HostError::Raised("boom".into()))
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingHost;
    use super::*;

    #[test]
    fn disabled_record_is_skipped_by_gated_run() {
        let runner = Runner::new(RecordingHost::default());
        let record = ScriptRecord::new("off", "", "echo off", false);

        let report = runner.run(&record);

        assert_eq!(report.outcome, RunOutcome::Skipped);
        assert!(runner.host().executed().is_empty());
    }

    #[test]
    fn run_now_ignores_enabled_flag() {
        let runner = Runner::new(RecordingHost::default());
        let record = ScriptRecord::new("off", "", "echo off", false);

        let report = runner.run_now(&record);

        assert!(report.is_success());
        assert_eq!(runner.host().executed(), ["echo off"]);
    }

    #[test]
    fn failure_is_labelled_with_script_name() {
        let runner = Runner::new(RecordingHost::default());
        let record = ScriptRecord::new("broken", "", "fail", true);

        let report = runner.run(&record);

        assert_eq!(report.name, "broken");
        assert_eq!(report.outcome, RunOutcome::Failed("boom".into()));
        assert_eq!(report.to_string(), "✗ \"broken\" threw an error: boom");
        assert!(record.enabled);
    }

    #[cfg(unix)]
    #[test]
    fn shell_host_reports_exit_status_and_stderr() {
        let host = ShellHost::new("sh", vec!["-c".into()]);
        assert!(host.execute("true").is_ok());

        let err = host.execute("echo nope >&2; exit 3").unwrap_err();
        match err {
            HostError::ExitStatus { stderr, .. } => assert_eq!(stderr, "nope"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn shell_host_inherits_environment() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let host = ShellHost::new("sh", vec!["-c".into()]);

        host.execute(&format!("touch '{}'", marker.display())).unwrap();
        assert!(marker.exists());
    }

    #[test]
    fn missing_interpreter_is_a_spawn_error() {
        let host = ShellHost::new("userscripts-no-such-shell", vec![]);
        assert!(matches!(host.execute("true"), Err(HostError::Spawn { .. })));
    }
}
