//! Single-record editor pane.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::editor::{EditTarget, EditorSession, RunStatus, ScriptDraft};
use crate::infra::highlight::{HighlightLine, HighlightSpan};

const NAME_MAX_CHARS: usize = 60;
const DESCRIPTION_MAX_CHARS: usize = 120;

/// Field receiving keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorField {
    #[default]
    Name,
    Description,
    Enabled,
    Code,
}

impl EditorField {
    pub fn next(self) -> Self {
        match self {
            EditorField::Name => EditorField::Description,
            EditorField::Description => EditorField::Enabled,
            EditorField::Enabled => EditorField::Code,
            EditorField::Code => EditorField::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            EditorField::Name => EditorField::Code,
            EditorField::Description => EditorField::Name,
            EditorField::Enabled => EditorField::Description,
            EditorField::Code => EditorField::Enabled,
        }
    }
}

/// Append `ch` to the focused field. Returns `false` when the field refuses it.
pub fn insert_char(draft: &mut ScriptDraft, field: EditorField, ch: char) -> bool {
    match field {
        EditorField::Name => push_limited(&mut draft.name, ch, NAME_MAX_CHARS),
        EditorField::Description => {
            push_limited(&mut draft.description, ch, DESCRIPTION_MAX_CHARS)
        }
        EditorField::Enabled => {
            if ch == ' ' {
                draft.enabled = !draft.enabled;
                true
            } else {
                false
            }
        }
        EditorField::Code => {
            draft.code.push(ch);
            true
        }
    }
}

/// Remove the last character of the focused field.
pub fn backspace(draft: &mut ScriptDraft, field: EditorField) {
    match field {
        EditorField::Name => {
            draft.name.pop();
        }
        EditorField::Description => {
            draft.description.pop();
        }
        EditorField::Code => {
            draft.code.pop();
        }
        EditorField::Enabled => {}
    }
}

fn push_limited(value: &mut String, ch: char, max: usize) -> bool {
    if ch == '\n' || value.chars().count() >= max {
        return false;
    }
    value.push(ch);
    true
}

/// Ratatui component drawing the open editor.
#[derive(Debug, Default)]
pub struct EditorPane;

impl EditorPane {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        session: &EditorSession,
        field: EditorField,
        has_focus: bool,
        code_lines: &[HighlightLine],
    ) {
        let title = match session.target() {
            EditTarget::New => "New script".to_string(),
            EditTarget::Existing(index) => format!("Edit script #{index}"),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if has_focus {
                Color::Cyan
            } else {
                Color::DarkGray
            }));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(inner);

        let draft = &session.draft;
        let active = |target: EditorField| has_focus && field == target;

        frame.render_widget(
            Paragraph::new(text_field(
                "Name",
                &draft.name,
                "Script name...",
                active(EditorField::Name),
            )),
            layout[0],
        );
        frame.render_widget(
            Paragraph::new(text_field(
                "Description",
                &draft.description,
                "Description (optional)...",
                active(EditorField::Description),
            )),
            layout[1],
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                label("Enabled", active(EditorField::Enabled)),
                Span::raw(if draft.enabled { "[x]" } else { "[ ]" }),
            ])),
            layout[2],
        );

        let code_block = Block::default()
            .title(label("Code", active(EditorField::Code)))
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        let code_inner = code_block.inner(layout[3]);
        frame.render_widget(code_block, layout[3]);

        let mut lines: Vec<Line<'_>> = code_lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                let mut spans = vec![Span::styled(
                    format!("{:>3} │ ", idx + 1),
                    Style::default().fg(Color::DarkGray),
                )];
                spans.extend(line.spans.iter().map(highlight_span_to_span));
                Line::from(spans)
            })
            .collect();
        if active(EditorField::Code)
            && let Some(last) = lines.last_mut()
        {
            last.spans.push(cursor());
        }
        let visible = code_inner.height as usize;
        let skip = lines.len().saturating_sub(visible);
        frame.render_widget(
            Paragraph::new(lines.split_off(skip.min(lines.len()))),
            code_inner,
        );

        frame.render_widget(Paragraph::new(footer(session.run_status())), layout[4]);
    }
}

fn label(text: &str, active: bool) -> Span<'static> {
    let style = if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!("{text}: "), style)
}

fn cursor() -> Span<'static> {
    Span::styled(" ", Style::default().bg(Color::Cyan))
}

fn text_field(name: &str, value: &str, placeholder: &str, active: bool) -> Line<'static> {
    let mut spans = vec![label(name, active)];
    if value.is_empty() {
        spans.push(Span::styled(
            placeholder.to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ));
    } else {
        spans.push(Span::raw(value.to_string()));
    }
    if active {
        spans.push(cursor());
    }
    Line::from(spans)
}

fn footer(status: Option<&RunStatus>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        "ctrl+s save · ctrl+r run · ctrl+e $EDITOR · shift+tab fields · esc cancel  ",
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(status) = status {
        let color = match status {
            RunStatus::Ok => Color::Green,
            RunStatus::Err(_) => Color::Red,
        };
        spans.push(Span::styled(status.label(), Style::default().fg(color)));
    }
    Line::from(spans)
}

fn highlight_span_to_span(span: &HighlightSpan) -> Span<'_> {
    let mut style = Style::default();
    if let Some(color) = span.style.foreground {
        style = style.fg(Color::Rgb(color.r, color.g, color.b));
    }
    if span.style.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if span.style.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    Span::styled(span.content.as_str(), style)
}
