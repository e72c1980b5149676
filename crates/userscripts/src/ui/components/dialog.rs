//! Modal dialogs for confirmations and file-path input.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::manager::Command;

/// What an input dialog's value is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    ExportPath,
    ImportPath,
}

/// The open dialog, if any.
#[derive(Debug, Default, Clone)]
pub enum DialogState {
    #[default]
    Closed,
    /// Yes/no question guarding `command`.
    Confirm { question: String, command: Command },
    Input {
        title: String,
        value: String,
        purpose: InputPurpose,
    },
}

impl DialogState {
    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    pub fn confirm<S: Into<String>>(&mut self, question: S, command: Command) {
        *self = DialogState::Confirm {
            question: question.into(),
            command,
        };
    }

    /// Open an input dialog with `initial` prefilled.
    pub fn input<S: Into<String>>(&mut self, title: &str, initial: S, purpose: InputPurpose) {
        *self = DialogState::Input {
            title: title.to_string(),
            value: initial.into(),
            purpose,
        };
    }

    /// Close the dialog, returning what it held.
    pub fn take(&mut self) -> DialogState {
        std::mem::take(self)
    }

    pub fn push_char(&mut self, ch: char) {
        if let DialogState::Input { value, .. } = self {
            value.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if let DialogState::Input { value, .. } = self {
            value.pop();
        }
    }
}

/// Visual component that renders the open dialog centered over `area`.
#[derive(Debug, Default)]
pub struct Dialog;

impl Dialog {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &DialogState) {
        let (title, body, hint) = match state {
            DialogState::Closed => return,
            DialogState::Confirm { question, .. } => (
                "Confirm",
                question
                    .lines()
                    .map(|line| Line::from(line.to_string()))
                    .collect::<Vec<_>>(),
                "y confirm · n / esc cancel",
            ),
            DialogState::Input { title, value, .. } => (
                title.as_str(),
                vec![Line::from(vec![
                    Span::raw(value.clone()),
                    Span::styled(" ", Style::default().bg(Color::Cyan)),
                ])],
                "enter accept · esc cancel",
            ),
        };

        let width = area.width.saturating_sub(10).min(80);
        let height = u16::try_from(body.len())
            .unwrap_or(u16::MAX)
            .saturating_add(4)
            .min(area.height);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let mut lines = body;
        lines.push(Line::default());
        lines.push(Line::styled(
            hint,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ));
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn take_closes_dialog() {
        let mut state = DialogState::default();
        state.confirm("Delete \"a\"?", Command::Delete(0));
        assert!(state.is_open());

        let taken = state.take();
        assert!(matches!(
            taken,
            DialogState::Confirm {
                command: Command::Delete(0),
                ..
            }
        ));
        assert!(!state.is_open());
    }

    #[test]
    fn input_edits_value() {
        let mut state = DialogState::default();
        state.input("Export to", "user-scripts.json", InputPurpose::ExportPath);
        state.pop_char();
        state.push_char('5');
        match state {
            DialogState::Input { value, .. } => assert_eq!(value, "user-scripts.jso5"),
            other => panic!("unexpected dialog: {other:?}"),
        }
    }

    #[test]
    fn very_long_question_is_clipped_to_the_area() {
        let backend = TestBackend::new(60, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let names: Vec<String> = (0..70_000).map(|i| format!("• script {i}")).collect();
        let mut state = DialogState::default();
        state.confirm(names.join("\n"), Command::Import("dupes.json".into()));

        terminal
            .draw(|frame| {
                let area = frame.size();
                Dialog.render(frame, area, &state);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("• script 0"));
    }

    #[test]
    fn renders_multiline_question() {
        let backend = TestBackend::new(80, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = DialogState::default();
        state.confirm("first line\n\n• A\n• B", Command::Delete(0));

        terminal
            .draw(|frame| {
                let area = frame.size();
                Dialog.render(frame, area, &state);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("first line"));
        assert!(text.contains("• B"));
    }
}
