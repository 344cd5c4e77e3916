//! Terminal rendering of assistant replies.
//!
//! While a reply streams in, fragments are printed raw. The finished reply is
//! printed again as markdown: prose through `termimad`, fenced code through
//! `syntect`.

use std::io::Write;

use crossterm::style::Color;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

const CODE_THEME: &str = "base16-ocean.dark";

pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl ChatRenderer {
    pub fn new(accent: Color) -> Self {
        let mut skin = MadSkin::default_dark();
        let accent = to_termimad(accent);
        skin.bold.set_fg(accent);
        skin.headers[0].set_fg(accent);
        skin.headers[1].set_fg(accent);
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render a complete reply. An unclosed fence still gets highlighted.
    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut fence: Option<String> = None;
        let mut code_buf = String::new();

        for line in markdown.lines() {
            let is_fence = line.trim_start().starts_with("```");
            match (&fence, is_fence) {
                (None, true) => {
                    fence = Some(line.trim().trim_start_matches('`').trim().to_string());
                    code_buf.clear();
                }
                (Some(lang), true) => {
                    output.push_str(&self.highlight_code(&code_buf, lang));
                    fence = None;
                }
                (Some(_), false) => {
                    code_buf.push_str(line);
                    code_buf.push('\n');
                }
                (None, false) => {
                    output.push_str(&self.skin.term_text(line).to_string());
                }
            }
        }

        if let Some(lang) = fence {
            if !code_buf.is_empty() {
                output.push_str(&self.highlight_code(&code_buf, &lang));
            }
        }

        output
    }

    /// Print one streamed fragment as-is.
    pub fn print_streaming_token(&self, token: &str) {
        print!("{token}");
        let _ = std::io::stdout().flush();
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let mut output = String::new();
        output.push_str(&format!("  {}\n", console::style(format!("--- {lang} ---")).dim()));

        let Some(theme) = self.theme_set.themes.get(CODE_THEME) else {
            for line in code.lines() {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };
        let mut h = HighlightLines::new(syntax, theme);

        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }

        output
    }
}

/// termimad re-exports its own crossterm; map between the two.
fn to_termimad(color: Color) -> termimad::crossterm::style::Color {
    use termimad::crossterm::style::Color as T;
    match color {
        Color::Cyan => T::Cyan,
        Color::Green => T::Green,
        Color::Yellow => T::Yellow,
        Color::Magenta => T::Magenta,
        Color::Blue => T::Blue,
        Color::Red => T::Red,
        Color::Rgb { r, g, b } => T::Rgb { r, g, b },
        _ => T::Cyan,
    }
}
