pub mod summary;
pub mod tools;
pub mod tree;
pub mod turns;
pub mod views;

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

pub const PREVIEW_CHARS: usize = 60;

/// Terminal colors, off unless stdout is a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn detect() -> Self {
        Self::new(std::io::stdout().is_terminal())
    }

    pub fn key(&self, s: &str) -> String {
        self.paint(s, |s| s.cyan().to_string())
    }

    pub fn ok(&self, s: &str) -> String {
        self.paint(s, |s| s.green().to_string())
    }

    pub fn error(&self, s: &str) -> String {
        self.paint(s, |s| s.red().to_string())
    }

    pub fn pending(&self, s: &str) -> String {
        self.paint(s, |s| s.yellow().to_string())
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(s, |s| s.dimmed().to_string())
    }

    fn paint(&self, s: &str, color: fn(&str) -> String) -> String {
        if self.color { color(s) } else { s.to_string() }
    }
}

/// Truncate and normalize string for display
/// - Collapses newlines and runs of whitespace into single spaces
/// - Respects UTF-8 character boundaries
pub fn truncate_for_display(s: &str, max_chars: usize) -> String {
    let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");

    if normalized.chars().count() <= max_chars {
        normalized
    } else {
        let truncated: String = normalized.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
