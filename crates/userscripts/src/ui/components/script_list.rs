//! Script list component and its cursor/drag state.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::domain::model::ScriptList;

/// Cursor position plus the record currently being dragged, if any.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptListState {
    selected: usize,
    grabbed: Option<usize>,
}

impl ScriptListState {
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        self.selected = index;
    }

    pub fn select_next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the cursor inside a list of `len` records.
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        if self.grabbed.is_some_and(|grabbed| grabbed >= len) {
            self.grabbed = None;
        }
    }

    /// Start dragging the record under the cursor.
    pub fn grab(&mut self) {
        self.grabbed = Some(self.selected);
    }

    pub fn grabbed(&self) -> Option<usize> {
        self.grabbed
    }

    /// Finish a drag, returning `(src, dst)` when the record should move.
    pub fn drop_grabbed(&mut self) -> Option<(usize, usize)> {
        let src = self.grabbed.take()?;
        (src != self.selected).then_some((src, self.selected))
    }

    pub fn cancel_grab(&mut self) -> bool {
        self.grabbed.take().is_some()
    }
}

/// Ratatui component rendering the ordered script list.
#[derive(Debug, Default)]
pub struct ScriptListView;

impl ScriptListView {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        scripts: &ScriptList,
        state: &ScriptListState,
        has_focus: bool,
        editing: Option<usize>,
    ) {
        let block = Block::default()
            .title("Scripts")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if has_focus {
                Color::Cyan
            } else {
                Color::DarkGray
            }));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if scripts.is_empty() {
            let placeholder = Paragraph::new("No scripts yet. Press n to add one.")
                .style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )
                .wrap(Wrap { trim: true });
            frame.render_widget(placeholder, inner);
            return;
        }

        let items: Vec<ListItem<'_>> = scripts
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let grabbed = state.grabbed() == Some(index);
                let handle_style = if grabbed {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let mut name_style = Style::default();
                if !record.enabled {
                    name_style = name_style.fg(Color::DarkGray);
                }

                let mut spans = vec![
                    Span::styled("⠿ ", handle_style),
                    Span::raw(if record.enabled { "[x] " } else { "[ ] " }),
                    Span::styled(record.display_name().to_string(), name_style),
                ];
                if !record.description.is_empty() {
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(
                        record.description.clone(),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    ));
                }
                if editing == Some(index) {
                    spans.push(Span::styled(" ✎", Style::default().fg(Color::Cyan)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(state.selected().min(scripts.len() - 1)));

        let highlight_style = if has_focus {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Black).bg(Color::Gray)
        };
        let symbol = if state.grabbed().is_some() { "↕ " } else { "▸ " };

        let list = List::new(items)
            .highlight_style(highlight_style)
            .highlight_symbol(symbol);
        frame.render_stateful_widget(list, inner, &mut list_state);
    }
}
