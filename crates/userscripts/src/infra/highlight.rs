//! Syntax highlighting for script source, built on top of syntect.

use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const DEFAULT_THEME: &str = "base16-ocean.dark";

static DEFAULT_ASSETS: Lazy<(Arc<SyntaxSet>, Arc<ThemeSet>)> = Lazy::new(|| {
    (
        Arc::new(SyntaxSet::load_defaults_newlines()),
        Arc::new(ThemeSet::load_defaults()),
    )
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightStyle {
    pub foreground: Option<RgbColor>,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub content: String,
    pub style: HighlightStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightLine {
    pub spans: Vec<HighlightSpan>,
}

impl HighlightLine {
    fn plain(text: &str) -> Self {
        Self {
            spans: vec![HighlightSpan {
                content: text.to_string(),
                style: HighlightStyle::default(),
            }],
        }
    }
}

/// Map an interpreter name to the syntect token of the language it runs.
pub fn syntax_token_for_shell(shell: &str) -> &'static str {
    let program = std::path::Path::new(shell)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(shell);
    match program {
        "cmd" => "bat",
        "powershell" | "pwsh" => "ps1",
        "python" | "python3" => "py",
        "node" | "deno" | "bun" => "js",
        "ruby" => "rb",
        "perl" => "pl",
        _ => "sh",
    }
}

/// Highlights script source one line at a time.
#[derive(Debug, Clone)]
pub struct Highlighter {
    syntax_set: Arc<SyntaxSet>,
    theme_set: Arc<ThemeSet>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        let assets = &*DEFAULT_ASSETS;
        Self {
            syntax_set: Arc::clone(&assets.0),
            theme_set: Arc::clone(&assets.1),
        }
    }

    /// Highlight `code` as the language named by `token`. Unknown languages or themes produce
    /// unstyled lines.
    pub fn highlight(&self, code: &str, token: &str, theme: &str) -> Vec<HighlightLine> {
        let syntax = self.syntax_set.find_syntax_by_token(token);
        match (syntax, self.resolve_theme(theme)) {
            (Some(syntax), Some(theme)) => self
                .highlight_with_syntax(code, theme, syntax)
                .unwrap_or_else(|err| {
                    tracing::warn!(error = %err, token, "highlight failed");
                    plain_lines(code)
                }),
            _ => plain_lines(code),
        }
    }

    fn highlight_with_syntax(
        &self,
        code: &str,
        theme: &Theme,
        syntax: &SyntaxReference,
    ) -> Result<Vec<HighlightLine>> {
        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut result = Vec::new();
        for line in LinesWithEndings::from(code) {
            let segments = highlighter.highlight_line(line, &self.syntax_set)?;
            let spans = segments
                .into_iter()
                .map(|(style, text)| HighlightSpan {
                    content: text.trim_end_matches(['\r', '\n']).to_string(),
                    style: convert_style(style),
                })
                .filter(|span| !span.content.is_empty())
                .collect();
            result.push(HighlightLine { spans });
        }
        if code.is_empty() || code.ends_with('\n') {
            result.push(HighlightLine::default());
        }
        Ok(result)
    }

    fn resolve_theme(&self, requested: &str) -> Option<&Theme> {
        let themes = &self.theme_set.themes;
        themes
            .get(requested)
            .or_else(|| {
                themes
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(requested))
                    .map(|(_, theme)| theme)
            })
            .or_else(|| {
                tracing::debug!(requested, fallback = DEFAULT_THEME, "theme not found");
                themes.get(DEFAULT_THEME)
            })
    }
}

fn plain_lines(code: &str) -> Vec<HighlightLine> {
    code.split('\n')
        .map(|line| HighlightLine::plain(line.trim_end_matches('\r')))
        .collect()
}

fn convert_style(style: SyntectStyle) -> HighlightStyle {
    let color = style.foreground;
    HighlightStyle {
        foreground: (color.a != 0).then_some(RgbColor {
            r: color.r,
            g: color.g,
            b: color.b,
        }),
        bold: style.font_style.contains(FontStyle::BOLD),
        italic: style.font_style.contains(FontStyle::ITALIC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &HighlightLine) -> String {
        line.spans.iter().map(|span| span.content.as_str()).collect()
    }

    #[test]
    fn highlights_shell_source_line_by_line() {
        let highlighter = Highlighter::new();
        let lines = highlighter.highlight("echo hi\nexit 0", "sh", DEFAULT_THEME);

        assert_eq!(lines.len(), 2);
        assert_eq!(text(&lines[0]), "echo hi");
        assert_eq!(text(&lines[1]), "exit 0");
        assert!(lines[0].spans.iter().any(|span| span.style.foreground.is_some()));
    }

    #[test]
    fn trailing_newline_yields_empty_last_line() {
        let highlighter = Highlighter::new();
        let lines = highlighter.highlight("true\n", "sh", DEFAULT_THEME);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].spans.is_empty());
    }

    #[test]
    fn unknown_language_is_plain() {
        let highlighter = Highlighter::new();
        let lines = highlighter.highlight("a\nb", "no-such-language", DEFAULT_THEME);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].spans[0].style, HighlightStyle::default());
    }

    #[test]
    fn maps_interpreters_to_tokens() {
        assert_eq!(syntax_token_for_shell("/bin/bash"), "sh");
        assert_eq!(syntax_token_for_shell("cmd"), "bat");
        assert_eq!(syntax_token_for_shell("python3"), "py");
    }
}
