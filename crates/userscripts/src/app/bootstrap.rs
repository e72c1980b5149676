//! Startup sequence: run every enabled script once, then mount the panel.

use anyhow::Result;
use tracing::{info, instrument};

use crate::app::runner::{RunReport, Runner, ScriptHost};
use crate::app::store::ScriptStore;

/// Region the settings panel attaches to.
pub trait MountPoint {
    /// Whether the region exists in this host.
    fn is_available(&self) -> bool;

    /// Attach the panel, handing it the results of the startup pass. Called at most once per
    /// bootstrap; may block for as long as the panel is open.
    fn mount(&mut self, report: &BootstrapReport) -> Result<()>;
}

/// Summary of one bootstrap pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub runs: Vec<RunReport>,
    pub mounted: bool,
}

impl BootstrapReport {
    pub fn failures(&self) -> impl Iterator<Item = &RunReport> {
        self.runs.iter().filter(|report| report.is_failure())
    }

    pub fn executed(&self) -> usize {
        self.runs
            .iter()
            .filter(|report| report.is_success() || report.is_failure())
            .count()
    }
}

/// Load the list, run each record in order through the gated runner, then mount the panel
/// when the region is available.
///
/// Script failures are isolated per record. A missing region is not an error; mount failures
/// from an available region are returned after all scripts have run.
#[instrument(skip_all, fields(slot = %store.path().display()))]
pub fn bootstrap<H: ScriptHost>(
    store: &ScriptStore,
    runner: &Runner<H>,
    mount_point: &mut dyn MountPoint,
) -> Result<BootstrapReport> {
    let list = store.load();
    let runs: Vec<RunReport> = list.iter().map(|record| runner.run(record)).collect();

    let mut report = BootstrapReport {
        runs,
        mounted: false,
    };
    info!(
        total = list.len(),
        executed = report.executed(),
        failed = report.failures().count(),
        "startup scripts finished"
    );

    info!("[User Scripts] Loaded.");

    if mount_point.is_available() {
        mount_point.mount(&report)?;
        report.mounted = true;
    } else {
        info!("no extension region available; skipping panel");
    }

    Ok(report)
}

/// Mount point for hosts without any UI region.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl MountPoint for Headless {
    fn is_available(&self) -> bool {
        false
    }

    fn mount(&mut self, _report: &BootstrapReport) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::app::runner::RunOutcome;
    use crate::app::runner::testing::RecordingHost;
    use crate::app::store::DEFAULT_SLOT;
    use crate::domain::model::{ScriptList, ScriptRecord};

    #[derive(Default)]
    struct FakeRegion {
        available: bool,
        mounts: usize,
        failures_seen: usize,
    }

    impl MountPoint for FakeRegion {
        fn is_available(&self) -> bool {
            self.available
        }

        fn mount(&mut self, report: &BootstrapReport) -> Result<()> {
            self.mounts += 1;
            self.failures_seen = report.failures().count();
            Ok(())
        }
    }

    fn store_with(records: Vec<ScriptRecord>) -> (tempfile::TempDir, ScriptStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ScriptStore::new(dir.path(), DEFAULT_SLOT);
        store.save(&ScriptList::from(records)).unwrap();
        (dir, store)
    }

    #[test]
    fn failing_script_does_not_block_later_scripts() -> Result<()> {
        let (_dir, store) = store_with(vec![
            ScriptRecord::new("first", "", "echo 1", true),
            ScriptRecord::new("thrower", "", "fail boom", true),
            ScriptRecord::new("last", "", "echo 3", true),
        ]);
        let runner = Runner::new(RecordingHost::default());

        let report = bootstrap(&store, &runner, &mut Headless)?;

        assert_eq!(
            runner.host().executed(),
            ["echo 1", "fail boom", "echo 3"]
        );
        assert_eq!(report.failures().count(), 1);
        assert!(report.runs[2].is_success());
        Ok(())
    }

    #[test]
    fn disabled_scripts_have_no_side_effect() -> Result<()> {
        let (_dir, store) = store_with(vec![
            ScriptRecord::new("off", "", "echo off", false),
            ScriptRecord::new("on", "", "echo on", true),
        ]);
        let runner = Runner::new(RecordingHost::default());

        let report = bootstrap(&store, &runner, &mut Headless)?;

        assert_eq!(runner.host().executed(), ["echo on"]);
        assert_eq!(report.runs[0].outcome, RunOutcome::Skipped);
        assert_eq!(report.executed(), 1);
        Ok(())
    }

    #[test]
    fn mounts_only_when_region_is_available() -> Result<()> {
        let (_dir, store) = store_with(vec![ScriptRecord::new("on", "", "echo on", true)]);
        let runner = Runner::new(RecordingHost::default());

        let mut missing = FakeRegion::default();
        let report = bootstrap(&store, &runner, &mut missing)?;
        assert!(!report.mounted);
        assert_eq!(missing.mounts, 0);

        let mut present = FakeRegion {
            available: true,
            ..FakeRegion::default()
        };
        let report = bootstrap(&store, &runner, &mut present)?;
        assert!(report.mounted);
        assert_eq!(present.mounts, 1);
        assert_eq!(runner.host().executed().len(), 2);
        Ok(())
    }

    #[test]
    fn region_receives_startup_failures() -> Result<()> {
        let (_dir, store) = store_with(vec![
            ScriptRecord::new("ok", "", "echo ok", true),
            ScriptRecord::new("bad", "", "fail", true),
        ]);
        let runner = Runner::new(RecordingHost::default());
        let mut region = FakeRegion {
            available: true,
            ..FakeRegion::default()
        };

        bootstrap(&store, &runner, &mut region)?;

        assert_eq!(region.failures_seen, 1);
        Ok(())
    }

    #[test]
    fn corrupt_store_runs_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ScriptStore::new(dir.path(), DEFAULT_SLOT);
        std::fs::write(store.path(), "garbage")?;
        let runner = Runner::new(RecordingHost::default());

        let report = bootstrap(&store, &runner, &mut Headless)?;

        assert!(report.runs.is_empty());
        assert!(runner.host().executed().is_empty());
        Ok(())
    }
}
