//! Command-line entry point.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::debug;

use crate::app::bootstrap::{self, BootstrapReport, Headless, MountPoint};
use crate::app::manager::{AssumeYes, Command, Confirm, Outcome, ScriptManager};
use crate::app::runner::{Runner, ShellHost};
use crate::app::store::ScriptStore;
use crate::app::transfer::ExportTarget;
use crate::infra::config::Config;
use crate::infra::logging::{self, LogTarget};
use crate::ui::app::{TerminalRegion, UiApp};

const LOG_FILE: &str = "userscripts.log";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Author, persist and run user scripts at startup",
    long_about = None
)]
pub struct Cli {
    /// Extra config file layered over the user config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory holding the persisted script list.
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run enabled scripts in order, then open the panel
    Start {
        /// Skip the panel after the scripts have run
        #[arg(long)]
        no_ui: bool,
    },
    /// Open the panel without running any scripts
    Ui,
    /// Print every script with its index
    List,
    /// Save a new script at the end of the list
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        source: SourceArgs,
        /// Save the script disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Overwrite fields of the script at INDEX
    Edit {
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        source: OptionalSourceArgs,
        #[arg(long)]
        enabled: Option<bool>,
    },
    /// Run the script at INDEX regardless of its enabled flag
    Run { index: usize },
    /// Flip the enabled flag of the script at INDEX
    Toggle { index: usize },
    /// Remove the script at INDEX
    Delete {
        index: usize,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Move the script at SRC to position DST
    Move { src: usize, dst: usize },
    /// Write every script to a JSON file (`-` for stdout)
    Export {
        #[arg(short, long, value_name = "PATH")]
        output: Option<String>,
    },
    /// Append scripts from a JSON export
    Import {
        path: PathBuf,
        /// Import even when names collide
        #[arg(long)]
        yes: bool,
    },
    /// Print shell completions
    Completions { shell: Shell },
}

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Script source
    #[arg(long)]
    code: Option<String>,
    /// Read the script source from a file
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
#[group(required = false, multiple = false)]
struct OptionalSourceArgs {
    #[arg(long)]
    code: Option<String>,
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

/// Parse arguments and execute the requested command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?.with_data_dir(cli.data_dir.clone());
    let command = cli.command.unwrap_or(Commands::Start { no_ui: false });

    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "userscripts", &mut io::stdout());
        return Ok(());
    }

    let data_dir = config.storage.data_dir();
    let mounts_panel = match command {
        Commands::Start { no_ui } => !no_ui && config.ui.mount && io::stdout().is_terminal(),
        Commands::Ui => io::stdout().is_terminal(),
        _ => false,
    };
    let log_target = if mounts_panel {
        LogTarget::File(data_dir.join(LOG_FILE))
    } else {
        LogTarget::Stderr
    };
    logging::init(log_target)?;
    debug!(data_dir = %data_dir.display(), slot = %config.storage.slot, "configuration loaded");

    let store = ScriptStore::new(&data_dir, &config.storage.slot);
    let mut manager = ScriptManager::new(
        store.clone(),
        Runner::new(ShellHost::from_settings(&config.runner)),
    );

    match command {
        Commands::Start { no_ui } => {
            let runner = Runner::new(ShellHost::from_settings(&config.runner));
            let mut region: Box<dyn MountPoint> = if no_ui || !config.ui.mount {
                Box::new(Headless)
            } else {
                Box::new(TerminalRegion::new(UiApp::new(manager, &config)))
            };
            let report = bootstrap::bootstrap(&store, &runner, region.as_mut())?;
            if !report.mounted {
                for run in &report.runs {
                    if run.is_success() || run.is_failure() {
                        eprintln!("{run}");
                    }
                }
            }
            Ok(())
        }
        Commands::Ui => {
            let mut region = TerminalRegion::new(UiApp::new(manager, &config));
            if !region.is_available() {
                return Err(anyhow!("the panel needs an interactive terminal"));
            }
            region.mount(&BootstrapReport::default())
        }
        Commands::List => {
            let scripts = manager.scripts();
            for (index, record) in scripts.iter().enumerate() {
                let mark = if record.enabled { "[x]" } else { "[ ]" };
                if record.description.is_empty() {
                    println!("{index:>3}  {mark} {}", record.display_name());
                } else {
                    println!(
                        "{index:>3}  {mark} {}  {}",
                        record.display_name(),
                        record.description
                    );
                }
            }
            println!("{}", scripts.summary_hint());
            Ok(())
        }
        Commands::Add {
            name,
            description,
            source,
            disabled,
        } => {
            let code = read_source(source.code, source.file.as_deref())?;
            manager.dispatch(Command::Add, &mut AssumeYes)?;
            if let Some(session) = manager.editor_mut() {
                session.draft.name = name;
                session.draft.description = description;
                session.draft.code = code;
                session.draft.enabled = !disabled;
            }
            report(manager.dispatch(Command::Save, &mut AssumeYes)?)
        }
        Commands::Edit {
            index,
            name,
            description,
            source,
            enabled,
        } => {
            let code = match (source.code, source.file) {
                (None, None) => None,
                (code, file) => Some(read_source(code, file.as_deref())?),
            };
            manager.dispatch(Command::Edit(index), &mut AssumeYes)?;
            if let Some(session) = manager.editor_mut() {
                let draft = &mut session.draft;
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if let Some(code) = code {
                    draft.code = code;
                }
                if let Some(enabled) = enabled {
                    draft.enabled = enabled;
                }
            }
            report(manager.dispatch(Command::Save, &mut AssumeYes)?)
        }
        Commands::Run { index } => {
            match manager.dispatch(Command::RunOne(index), &mut AssumeYes)? {
                Outcome::Ran(run) if run.is_failure() => Err(anyhow!("{run}")),
                outcome => report(outcome),
            }
        }
        Commands::Toggle { index } => {
            report(manager.dispatch(Command::Toggle(index), &mut AssumeYes)?)
        }
        Commands::Delete { index, yes } => {
            report(manager.dispatch(Command::Delete(index), confirmer(yes).as_mut())?)
        }
        Commands::Move { src, dst } => {
            report(manager.dispatch(Command::Reorder { src, dst }, &mut AssumeYes)?)
        }
        Commands::Export { output } => {
            let target = ExportTarget::parse(output.as_deref().unwrap_or(&config.export.file_name));
            let outcome = manager.dispatch(Command::Export(target.clone()), &mut AssumeYes)?;
            if target == ExportTarget::Stdout {
                eprintln!("{outcome}");
                Ok(())
            } else {
                report(outcome)
            }
        }
        Commands::Import { path, yes } => {
            report(manager.dispatch(Command::Import(path), confirmer(yes).as_mut())?)
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn report(outcome: Outcome) -> Result<()> {
    println!("{outcome}");
    Ok(())
}

fn read_source(code: Option<String>, file: Option<&Path>) -> Result<String> {
    match (code, file) {
        (Some(code), _) => Ok(code),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read script source {}", path.display())),
        (None, None) => Err(anyhow!("either --code or --file is required")),
    }
}

fn confirmer(assume_yes: bool) -> Box<dyn Confirm> {
    if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    }
}

/// Asks on stderr and reads the answer from stdin; only `y`/`yes` accept.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "{message} [y/N] ");
        let _ = stderr.flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
