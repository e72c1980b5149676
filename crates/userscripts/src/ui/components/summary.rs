//! Toolbar showing the summary hint and available actions.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::domain::model::ScriptList;

/// Displays `<total> script(s) — <enabled> enabled` followed by key hints.
#[derive(Debug, Default)]
pub struct Summary;

impl Summary {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, scripts: &ScriptList, dragging: bool) {
        let mut spans = vec![
            Span::styled(
                "User Scripts",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(scripts.summary_hint(), Style::default().fg(Color::Gray)),
            Span::raw("  "),
        ];
        spans.extend(key_hints(dragging));
        let line = Line::from(spans);
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
    }
}

fn key_hints(dragging: bool) -> Vec<Span<'static>> {
    let pairs: &[(&str, &str)] = if dragging {
        &[("j/k", " move target · "), ("↵", " drop · "), ("esc", " cancel")]
    } else {
        &[
            ("n", " new · "),
            ("↵", " edit · "),
            ("space", " toggle · "),
            ("r", " run · "),
            ("d", " delete · "),
            ("g", " drag · "),
            ("x/i", " export/import · "),
            ("q", " quit"),
        ]
    };
    pairs
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, Style::default().fg(Color::Cyan)),
                Span::styled(*action, Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::domain::model::ScriptRecord;

    #[test]
    fn renders_summary_hint() {
        let backend = TestBackend::new(120, 2);
        let mut terminal = Terminal::new(backend).unwrap();
        let scripts = ScriptList::from(vec![
            ScriptRecord::new("a", "", "true", true),
            ScriptRecord::new("b", "", "true", false),
        ]);

        terminal
            .draw(|frame| {
                let area = frame.size();
                Summary.render(frame, area, &scripts, false);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("2 script(s) — 1 enabled"));
    }
}
