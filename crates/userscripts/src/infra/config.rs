//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::{config_dir, data_dir};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::store::DEFAULT_SLOT;
use crate::app::transfer::DEFAULT_EXPORT_FILE;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
const APP_DIR: &str = "userscripts";

/// Layered configuration loaded from defaults, user config, an explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Config {
    pub storage: StorageSettings,
    pub runner: RunnerSettings,
    pub export: ExportSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageSettings {
    /// Directory holding the persisted slot; platform data dir when unset.
    pub data_dir: Option<PathBuf>,
    pub slot: String,
}

impl StorageSettings {
    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| data_dir().map(|base| base.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".userscripts"))
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            slot: DEFAULT_SLOT.into(),
        }
    }
}

/// Interpreter used to execute script source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunnerSettings {
    pub shell: String,
    pub args: Vec<String>,
}

impl RunnerSettings {
    #[cfg(windows)]
    fn default_shell() -> String {
        "cmd".into()
    }

    #[cfg(not(windows))]
    fn default_shell() -> String {
        "sh".into()
    }

    #[cfg(windows)]
    fn default_args() -> Vec<String> {
        vec!["/C".into()]
    }

    #[cfg(not(windows))]
    fn default_args() -> Vec<String> {
        vec!["-c".into()]
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            shell: Self::default_shell(),
            args: Self::default_args(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSettings {
    pub file_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_EXPORT_FILE.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiSettings {
    /// Whether the panel should be mounted after startup scripts run.
    pub mount: bool,
    pub theme: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            mount: true,
            theme: "base16-ocean.dark".into(),
        }
    }
}

/// One config file as written: every key is optional so a later layer can set any value,
/// including one equal to the built-in default.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    storage: StorageLayer,
    runner: RunnerLayer,
    export: ExportLayer,
    ui: UiLayer,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct StorageLayer {
    data_dir: Option<PathBuf>,
    slot: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct RunnerLayer {
    shell: Option<String>,
    args: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct ExportLayer {
    file_name: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct UiLayer {
    mount: Option<bool>,
    theme: Option<String>,
}

impl ConfigLayer {
    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::parse(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse TOML config")
    }

    /// Keys set in `overlay` win; unset keys fall through to `self`.
    fn merge(self, overlay: Self) -> Self {
        Self {
            storage: StorageLayer {
                data_dir: overlay.storage.data_dir.or(self.storage.data_dir),
                slot: overlay.storage.slot.or(self.storage.slot),
            },
            runner: RunnerLayer {
                shell: overlay.runner.shell.or(self.runner.shell),
                args: overlay.runner.args.or(self.runner.args),
            },
            export: ExportLayer {
                file_name: overlay.export.file_name.or(self.export.file_name),
            },
            ui: UiLayer {
                mount: overlay.ui.mount.or(self.ui.mount),
                theme: overlay.ui.theme.or(self.ui.theme),
            },
        }
    }

    fn resolve(self) -> Config {
        let defaults = Config::default();
        Config {
            storage: StorageSettings {
                data_dir: self.storage.data_dir,
                slot: self.storage.slot.unwrap_or(defaults.storage.slot),
            },
            runner: RunnerSettings {
                shell: self.runner.shell.unwrap_or(defaults.runner.shell),
                args: self.runner.args.unwrap_or(defaults.runner.args),
            },
            export: ExportSettings {
                file_name: self.export.file_name.unwrap_or(defaults.export.file_name),
            },
            ui: UiSettings {
                mount: self.ui.mount.unwrap_or(defaults.ui.mount),
                theme: self.ui.theme.unwrap_or(defaults.ui.theme),
            },
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    data_dir: Option<PathBuf>,
    shell: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            data_dir: env::var_os("USERSCRIPTS_DATA_DIR").map(PathBuf::from),
            shell: env::var("USERSCRIPTS_SHELL").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(data_dir: &str, shell: &str) -> Self {
        Self {
            data_dir: Some(PathBuf::from(data_dir)),
            shell: Some(shell.to_owned()),
        }
    }
}

impl Config {
    /// Load defaults, the user config, an optional explicit file, and env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        Self::load_with_layers(global_config_path(), explicit.map(Path::to_path_buf), env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        explicit: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut merged = ConfigLayer::parse(&DEFAULT_CONFIG)?;

        if let Some(global_path) = global.filter(|path| path.exists()) {
            merged = merged.merge(ConfigLayer::from_file(&global_path)?);
        }

        // An explicitly requested file must exist.
        if let Some(explicit_path) = explicit {
            merged = merged.merge(ConfigLayer::from_file(&explicit_path)?);
        }

        Ok(apply_env_overrides(merged.resolve(), env_overrides))
    }

    /// Slot directory after all layers, with a command-line override applied last.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.storage.data_dir = Some(dir);
        }
        self
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join(APP_DIR).join("config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(data_dir) = env.data_dir {
        config.storage.data_dir = Some(data_dir);
    }
    if let Some(shell) = env.shell {
        config.runner.shell = shell;
    }
    config
}
