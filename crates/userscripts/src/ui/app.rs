//! Application loop for the TUI settings panel.

use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::Command as Process;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::{debug, warn};

use crate::app::bootstrap::{BootstrapReport, MountPoint};
use crate::app::editor::EditTarget;
use crate::app::manager::{AssumeYes, Command, Deferred, Outcome, ScriptManager};
use crate::app::runner::{RunOutcome, ScriptHost};
use crate::app::transfer::ExportTarget;
use crate::infra::config::Config;
use crate::infra::highlight::{Highlighter, syntax_token_for_shell};
use crate::ui::components::dialog::{Dialog, DialogState, InputPurpose};
use crate::ui::components::editor::{self, EditorField, EditorPane};
use crate::ui::components::script_list::{ScriptListState, ScriptListView};
use crate::ui::components::summary::Summary;

const TICK_RATE: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);
const STARTUP_STATUS_TTL: Duration = Duration::from_secs(15);

type CrosstermTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Interactive list-and-editor panel.
pub struct UiApp<H> {
    manager: ScriptManager<H>,
    list: ScriptListState,
    field: EditorField,
    dialog: DialogState,
    focus: FocusTarget,
    highlighter: Highlighter,
    theme: String,
    syntax_token: &'static str,
    export_file: String,
    status: Option<StatusMessage>,
    pending: Option<PendingAction>,
    should_quit: bool,
}

impl<H: ScriptHost> UiApp<H> {
    pub fn new(manager: ScriptManager<H>, config: &Config) -> Self {
        Self {
            manager,
            list: ScriptListState::default(),
            field: EditorField::default(),
            dialog: DialogState::default(),
            focus: FocusTarget::List,
            highlighter: Highlighter::new(),
            theme: config.ui.theme.clone(),
            syntax_token: syntax_token_for_shell(&config.runner.shell),
            export_file: config.export.file_name.clone(),
            status: None,
            pending: None,
            should_quit: false,
        }
    }

    pub fn manager(&self) -> &ScriptManager<H> {
        &self.manager
    }

    /// Seed the status line with the outcome of the startup pass.
    pub fn show_startup(&mut self, report: &BootstrapReport) {
        if report.runs.is_empty() {
            return;
        }
        let failures: Vec<String> = report.failures().map(ToString::to_string).collect();
        let message = match failures.as_slice() {
            [] => StatusMessage::new(
                StatusLevel::Info,
                format!("Ran {} startup script(s)", report.executed()),
            ),
            [only] => StatusMessage::lasting(StatusLevel::Error, only.clone(), STARTUP_STATUS_TTL),
            [first, rest @ ..] => StatusMessage::lasting(
                StatusLevel::Error,
                format!("{first} (+{} more, see log)", rest.len()),
                STARTUP_STATUS_TTL,
            ),
        };
        self.status = Some(message);
    }

    /// Launch the terminal UI and enter the event loop.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(
            terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        );
        let _ = terminal.show_cursor();

        event_loop_result
    }

    fn event_loop(&mut self, terminal: &mut CrosstermTerminal) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;
            self.tick();

            if let Some(action) = self.pending.take() {
                self.perform_pending(terminal, action)?;
            }

            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE)? {
                let ev = event::read()?;
                self.handle_event(ev);
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        // Always draw from the persisted list.
        let scripts = self.manager.scripts();
        self.list.clamp(scripts.len());

        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(size);

        Summary.render(frame, layout[0], &scripts, self.list.grabbed().is_some());

        let editing = self
            .manager
            .editor()
            .and_then(|session| session.target().index());
        match self.manager.editor() {
            Some(session) => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .split(layout[1]);
                ScriptListView.render(
                    frame,
                    columns[0],
                    &scripts,
                    &self.list,
                    self.focus == FocusTarget::List,
                    editing,
                );
                let code = self.highlighter.highlight(
                    &session.draft.code,
                    self.syntax_token,
                    &self.theme,
                );
                EditorPane.render(
                    frame,
                    columns[1],
                    session,
                    self.field,
                    self.focus == FocusTarget::Editor,
                    &code,
                );
            }
            None => {
                ScriptListView.render(frame, layout[1], &scripts, &self.list, true, None);
            }
        }

        self.render_status(frame, layout[2]);
        Dialog.render(frame, size, &self.dialog);
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let line = match &self.status {
            Some(status) => {
                let style = match status.level {
                    StatusLevel::Info => Style::default().fg(Color::Gray),
                    StatusLevel::Success => Style::default().fg(Color::Green),
                    StatusLevel::Error => Style::default().fg(Color::Red),
                };
                Line::styled(status.text.clone(), style)
            }
            None => Line::styled(
                "Ready · press n to add a script",
                Style::default().fg(Color::DarkGray),
            ),
        };

        let block = Block::default().borders(Borders::TOP);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key_event(key),
            Event::Paste(text) => self.handle_paste(&text),
            _ => {}
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.dialog.is_open() {
            self.handle_dialog_key(key);
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && key.code == KeyCode::Char('w')
            && self.manager.editor().is_some()
        {
            self.focus = match self.focus {
                FocusTarget::List => FocusTarget::Editor,
                FocusTarget::Editor => FocusTarget::List,
            };
            return;
        }

        match self.focus {
            FocusTarget::List => self.handle_list_key(key),
            FocusTarget::Editor => self.handle_editor_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let len = self.manager.scripts().len();
        let selected = self.list.selected();

        if self.list.grabbed().is_some() {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => self.list.select_next(len),
                KeyCode::Char('k') | KeyCode::Up => self.list.select_previous(),
                KeyCode::Enter | KeyCode::Char('g') => {
                    if let Some((src, dst)) = self.list.drop_grabbed() {
                        self.dispatch(Command::Reorder { src, dst });
                    }
                }
                KeyCode::Esc => {
                    self.list.cancel_grab();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.list.select_next(len),
            KeyCode::Char('k') | KeyCode::Up => self.list.select_previous(),
            KeyCode::Char('n') => self.dispatch(Command::Add),
            KeyCode::Char('e') | KeyCode::Enter if len > 0 => {
                self.dispatch(Command::Edit(selected))
            }
            KeyCode::Char(' ') if len > 0 => self.dispatch(Command::Toggle(selected)),
            KeyCode::Char('r') if len > 0 => self.dispatch(Command::RunOne(selected)),
            KeyCode::Char('d') | KeyCode::Delete if len > 0 => {
                self.dispatch(Command::Delete(selected))
            }
            KeyCode::Char('J') if selected + 1 < len => self.dispatch(Command::Reorder {
                src: selected,
                dst: selected + 1,
            }),
            KeyCode::Char('K') if selected > 0 => self.dispatch(Command::Reorder {
                src: selected,
                dst: selected - 1,
            }),
            KeyCode::Char('g') if len > 0 => self.list.grab(),
            KeyCode::Char('x') => {
                self.dialog
                    .input("Export to", self.export_file.clone(), InputPurpose::ExportPath)
            }
            KeyCode::Char('i') => {
                self.dialog
                    .input("Import from", self.export_file.clone(), InputPurpose::ImportPath)
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.dispatch(Command::Save),
                KeyCode::Char('r') => self.dispatch(Command::RunDraft),
                KeyCode::Char('e') => self.pending = Some(PendingAction::ExternalEdit),
                _ => {}
            }
            return;
        }

        let field = self.field;
        match key.code {
            KeyCode::Esc => self.dispatch(Command::Cancel),
            // Tabs are code; leave the code field with shift+tab.
            KeyCode::Tab if field == EditorField::Code => self.edit_draft(|draft| {
                editor::insert_char(draft, field, '\t');
            }),
            KeyCode::Tab => self.field = field.next(),
            KeyCode::BackTab => self.field = field.previous(),
            KeyCode::Enter if field == EditorField::Code => self.edit_draft(|draft| {
                editor::insert_char(draft, field, '\n');
            }),
            KeyCode::Enter => self.field = field.next(),
            KeyCode::Backspace => self.edit_draft(|draft| editor::backspace(draft, field)),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => {
                self.edit_draft(|draft| {
                    editor::insert_char(draft, field, ch);
                })
            }
            _ => {}
        }
    }

    fn handle_paste(&mut self, text: &str) {
        if self.focus != FocusTarget::Editor || self.dialog.is_open() {
            return;
        }
        let field = self.field;
        self.edit_draft(|draft| {
            for ch in text.chars().filter(|ch| *ch != '\r') {
                editor::insert_char(draft, field, ch);
            }
        });
    }

    fn edit_draft(&mut self, edit: impl FnOnce(&mut crate::app::editor::ScriptDraft)) {
        if let Some(session) = self.manager.editor_mut() {
            edit(&mut session.draft);
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        if matches!(self.dialog, DialogState::Confirm { .. }) {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    if let DialogState::Confirm { command, .. } = self.dialog.take() {
                        self.dispatch_confirmed(command);
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.dialog.take();
                    self.set_status(StatusLevel::Info, "Cancelled");
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.dialog.take();
            }
            KeyCode::Enter => {
                if let DialogState::Input { value, purpose, .. } = self.dialog.take() {
                    self.submit_input(value.trim(), purpose);
                }
            }
            KeyCode::Backspace => self.dialog.pop_char(),
            KeyCode::Char(ch) => self.dialog.push_char(ch),
            _ => {}
        }
    }

    fn submit_input(&mut self, value: &str, purpose: InputPurpose) {
        if value.is_empty() {
            return;
        }
        let command = match purpose {
            InputPurpose::ExportPath => Command::Export(ExportTarget::File(PathBuf::from(value))),
            InputPurpose::ImportPath => Command::Import(PathBuf::from(value)),
        };
        self.dispatch(command);
    }

    /// Run a command; if it needs confirmation, open the dialog instead of applying it.
    fn dispatch(&mut self, command: Command) {
        let mut deferred = Deferred::default();
        match self.manager.dispatch(command.clone(), &mut deferred) {
            Ok(Outcome::Declined) => match deferred.question {
                Some(question) => self.dialog.confirm(question, command),
                None => self.set_status(StatusLevel::Info, "Cancelled"),
            },
            Ok(outcome) => self.apply_outcome(outcome),
            Err(err) => self.set_status(StatusLevel::Error, err.to_string()),
        }
    }

    fn dispatch_confirmed(&mut self, command: Command) {
        match self.manager.dispatch(command, &mut AssumeYes) {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(err) => self.set_status(StatusLevel::Error, err.to_string()),
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        let level = match &outcome {
            Outcome::EditorOpened(target) => {
                self.focus = FocusTarget::Editor;
                self.field = EditorField::default();
                if let EditTarget::Existing(index) = target {
                    self.list.select(*index);
                }
                StatusLevel::Info
            }
            Outcome::EditorClosed => {
                self.focus = FocusTarget::List;
                StatusLevel::Info
            }
            Outcome::Saved { index, .. } => {
                self.focus = FocusTarget::List;
                self.list.select(*index);
                StatusLevel::Success
            }
            Outcome::Moved { dst, .. } => {
                self.list.select(*dst);
                StatusLevel::Success
            }
            Outcome::Deleted { .. } => {
                if self.manager.editor().is_none() {
                    self.focus = FocusTarget::List;
                }
                StatusLevel::Success
            }
            Outcome::Ran(report) => match report.outcome {
                RunOutcome::Failed(_) => StatusLevel::Error,
                _ => StatusLevel::Success,
            },
            Outcome::DraftRan(_) => {
                // Shown inline in the editor footer.
                return;
            }
            Outcome::Declined | Outcome::Unchanged => StatusLevel::Info,
            _ => StatusLevel::Success,
        };
        self.set_status(level, outcome.to_string());
    }

    fn perform_pending(
        &mut self,
        terminal: &mut CrosstermTerminal,
        action: PendingAction,
    ) -> Result<()> {
        match action {
            PendingAction::ExternalEdit => {
                let Some(code) = self
                    .manager
                    .editor()
                    .map(|session| session.draft.code.clone())
                else {
                    return Ok(());
                };

                disable_raw_mode().ok();
                let _ = execute!(
                    terminal.backend_mut(),
                    DisableBracketedPaste,
                    LeaveAlternateScreen
                );
                let edited = edit_externally(&code);
                enable_raw_mode().context("failed to enable raw mode")?;
                execute!(
                    terminal.backend_mut(),
                    EnterAlternateScreen,
                    EnableBracketedPaste
                )
                .context("failed to enter alternate screen")?;
                terminal.clear()?;

                match edited {
                    Ok(updated) => {
                        self.edit_draft(|draft| draft.code = updated);
                        self.set_status(StatusLevel::Info, "Code updated from editor");
                    }
                    Err(err) => {
                        warn!(error = %err, "external editor failed");
                        self.set_status(StatusLevel::Error, err.to_string());
                    }
                }
            }
        }
        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

/// Open `$VISUAL`/`$EDITOR` on a temporary copy of `code` and read the result back.
fn edit_externally(code: &str) -> Result<String> {
    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());
    let file = tempfile::Builder::new()
        .prefix("userscript-")
        .suffix(".sh")
        .tempfile()
        .context("failed to create temporary script file")?;
    fs::write(file.path(), code).context("failed to write temporary script file")?;

    let mut parts = editor.split_whitespace();
    let program = parts.next().ok_or_else(|| anyhow!("editor command is empty"))?;
    debug!(editor = %editor, path = %file.path().display(), "launching external editor");
    let status = Process::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("failed to launch editor `{editor}`"))?;
    if !status.success() {
        return Err(anyhow!("editor exited with {status}"));
    }
    fs::read_to_string(file.path()).context("failed to read edited script")
}

/// The interactive terminal as the panel's mount point.
pub struct TerminalRegion<H> {
    app: Option<UiApp<H>>,
}

impl<H: ScriptHost> TerminalRegion<H> {
    pub fn new(app: UiApp<H>) -> Self {
        Self { app: Some(app) }
    }
}

impl<H: ScriptHost> MountPoint for TerminalRegion<H> {
    /// Available once, and only when stdout is a terminal.
    fn is_available(&self) -> bool {
        self.app.is_some() && io::stdout().is_terminal()
    }

    fn mount(&mut self, report: &BootstrapReport) -> Result<()> {
        match self.app.take() {
            Some(mut app) => {
                app.show_startup(report);
                app.run()
            }
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    List,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    ExternalEdit,
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self::lasting(level, text, STATUS_TTL)
    }

    fn lasting(level: StatusLevel, text: String, ttl: Duration) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::backend::TestBackend;

    use crate::app::runner::Runner;
    use crate::app::runner::testing::RecordingHost;
    use crate::app::store::{DEFAULT_SLOT, ScriptStore};
    use crate::domain::model::{ScriptList, ScriptRecord};

    fn app_with(records: Vec<ScriptRecord>) -> (tempfile::TempDir, UiApp<RecordingHost>) {
        let dir = tempfile::tempdir().unwrap();
        let store = ScriptStore::new(dir.path(), DEFAULT_SLOT);
        store.save(&ScriptList::from(records)).unwrap();
        let manager = ScriptManager::new(store, Runner::new(RecordingHost::default()));
        (dir, UiApp::new(manager, &Config::default()))
    }

    fn press(app: &mut UiApp<RecordingHost>, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut UiApp<RecordingHost>, ch: char) {
        app.handle_key_event(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut UiApp<RecordingHost>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn names(app: &UiApp<RecordingHost>) -> Vec<String> {
        app.manager().scripts().iter().map(|r| r.name.clone()).collect()
    }

    fn sample() -> Vec<ScriptRecord> {
        vec![
            ScriptRecord::new("a", "", "echo a", true),
            ScriptRecord::new("b", "", "echo b", false),
            ScriptRecord::new("c", "", "echo c", true),
        ]
    }

    #[test]
    fn add_type_and_save_creates_record() {
        let (_dir, mut app) = app_with(Vec::new());

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "hello");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "echo hi");
        ctrl(&mut app, 's');

        let scripts = app.manager().scripts();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts.get(0).unwrap().name, "hello");
        assert_eq!(scripts.get(0).unwrap().code, "echo hi");
        assert!(app.manager().editor().is_none());
    }

    #[test]
    fn delete_waits_for_dialog_confirmation() {
        let (_dir, mut app) = app_with(sample());

        press(&mut app, KeyCode::Char('d'));
        assert!(app.dialog.is_open());
        assert_eq!(names(&app), ["a", "b", "c"]);

        press(&mut app, KeyCode::Char('n'));
        assert!(!app.dialog.is_open());
        assert_eq!(names(&app), ["a", "b", "c"]);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(names(&app), ["b", "c"]);
    }

    #[test]
    fn grab_and_drop_reorders() {
        let (_dir, mut app) = app_with(sample());

        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(names(&app), ["b", "c", "a"]);
        assert_eq!(app.list.selected(), 2);
    }

    #[test]
    fn reorder_while_editing_keeps_editor_on_record() {
        let (_dir, mut app) = app_with(sample());

        press(&mut app, KeyCode::Enter);
        ctrl(&mut app, 'w');
        app.handle_key_event(KeyEvent::new(KeyCode::Char('J'), KeyModifiers::SHIFT));

        assert_eq!(names(&app), ["b", "a", "c"]);
        let target = app.manager().editor().unwrap().target();
        assert_eq!(target, EditTarget::Existing(1));
    }

    #[test]
    fn run_one_and_toggle_from_list() {
        let (_dir, mut app) = app_with(sample());

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char(' '));

        assert_eq!(app.manager().runner().host().executed(), ["echo b"]);
        assert!(app.manager().scripts().get(1).unwrap().enabled);
    }

    #[test]
    fn renders_list_and_editor() {
        let (_dir, mut app) = app_with(sample());
        press(&mut app, KeyCode::Enter);

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("3 script(s) — 2 enabled"));
        assert!(text.contains("Edit script #0"));
    }

    fn replace_dialog_value(app: &mut UiApp<RecordingHost>, value: &str) {
        if let DialogState::Input { value: current, .. } = &app.dialog {
            for _ in 0..current.chars().count() {
                press(app, KeyCode::Backspace);
            }
        }
        type_text(app, value);
    }

    fn status_text(app: &UiApp<RecordingHost>) -> String {
        app.status
            .as_ref()
            .map(|status| status.text.clone())
            .unwrap_or_default()
    }

    fn write_import(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("incoming.json");
        std::fs::write(
            &path,
            r#"[{"name":"a","description":"","code":"1;","enabled":true}]"#,
        )
        .unwrap();
        path.display().to_string()
    }

    #[test]
    fn import_with_collision_can_be_declined() {
        let (dir, mut app) = app_with(sample());
        let path = write_import(&dir);

        press(&mut app, KeyCode::Char('i'));
        replace_dialog_value(&mut app, &path);
        press(&mut app, KeyCode::Enter);

        match &app.dialog {
            DialogState::Confirm { question, .. } => assert!(question.contains("• a")),
            other => panic!("expected duplicate prompt, got {other:?}"),
        }
        assert_eq!(names(&app), ["a", "b", "c"]);

        press(&mut app, KeyCode::Char('n'));
        assert!(!app.dialog.is_open());
        assert_eq!(names(&app), ["a", "b", "c"]);
        assert_eq!(status_text(&app), "Cancelled");
    }

    #[test]
    fn import_with_collision_appends_after_confirmation() {
        let (dir, mut app) = app_with(sample());
        let path = write_import(&dir);

        press(&mut app, KeyCode::Char('i'));
        replace_dialog_value(&mut app, &path);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(names(&app), ["a", "b", "c", "a"]);
        assert_eq!(app.manager().scripts().get(3).unwrap().code, "1;");
        assert_eq!(status_text(&app), "Imported 1 script(s).");
    }

    #[test]
    fn import_failure_is_reported_on_status_line() {
        let (dir, mut app) = app_with(sample());
        let path = dir.path().join("object.json");
        std::fs::write(&path, r#"{"name":"a"}"#).unwrap();

        press(&mut app, KeyCode::Char('i'));
        replace_dialog_value(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);

        assert!(!app.dialog.is_open());
        assert!(status_text(&app).starts_with("Import failed:"));
        assert_eq!(names(&app), ["a", "b", "c"]);
    }

    #[test]
    fn export_writes_prompted_path() {
        let (dir, mut app) = app_with(sample());
        let path = dir.path().join("out").join("scripts.json");

        press(&mut app, KeyCode::Char('x'));
        replace_dialog_value(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);

        let written = std::fs::read_to_string(&path).unwrap();
        let exported: ScriptList = serde_json::from_str(&written).unwrap();
        assert_eq!(exported, ScriptList::from(sample()));
        assert!(status_text(&app).starts_with("Exported 3 script(s)"));
    }

    #[test]
    fn escape_in_editor_discards_draft() {
        let (_dir, mut app) = app_with(sample());

        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "zzz");
        assert_eq!(app.manager().editor().unwrap().draft.name, "azzz");
        press(&mut app, KeyCode::Esc);

        assert!(app.manager().editor().is_none());
        assert_eq!(app.focus, FocusTarget::List);
        assert_eq!(names(&app), ["a", "b", "c"]);
    }

    #[test]
    fn tab_in_code_field_is_indentation() {
        let (_dir, mut app) = app_with(Vec::new());

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "cond");
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        type_text(&mut app, "if true; then");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "echo hi");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "fi");

        let draft = &app.manager().editor().unwrap().draft;
        assert_eq!(draft.name, "cond");
        assert_eq!(draft.code, "if true; then\n\techo hi\nfi");
        assert_eq!(app.field, EditorField::Code);

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.field, EditorField::Enabled);
    }

    #[test]
    fn pasted_text_lands_in_focused_field() {
        let (_dir, mut app) = app_with(Vec::new());

        press(&mut app, KeyCode::Char('n'));
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        app.handle_event(Event::Paste("for f in *; do\r\n\techo $f\r\ndone".into()));

        let draft = &app.manager().editor().unwrap().draft;
        assert_eq!(draft.code, "for f in *; do\n\techo $f\ndone");
        assert!(draft.name.is_empty());
    }

    #[test]
    fn startup_failures_are_shown_on_status_line() {
        use crate::app::runner::{RunOutcome, RunReport};

        let (_dir, mut app) = app_with(sample());
        let report = BootstrapReport {
            runs: vec![
                RunReport {
                    name: "a".into(),
                    outcome: RunOutcome::Succeeded,
                },
                RunReport {
                    name: "c".into(),
                    outcome: RunOutcome::Failed("exit status: 3".into()),
                },
            ],
            mounted: false,
        };

        app.show_startup(&report);

        assert_eq!(
            status_text(&app),
            "✗ \"c\" threw an error: exit status: 3"
        );
        assert_eq!(app.status.as_ref().unwrap().level, StatusLevel::Error);
    }
}
