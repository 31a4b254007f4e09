use colored::Colorize;
use std::fmt;

/// Width of the horizontal rules framing cards and tables.
pub const RULE_WIDTH: usize = 93;

/// Message categories used by the console output helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Plain,
    Info,
    Success,
    Warning,
    Error,
    Section,
    Rule,
}

/// Formats a message for display, optionally with terminal colours.
pub fn render(kind: MessageKind, message: impl fmt::Display, color: bool) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Rule => "=".repeat(RULE_WIDTH),
        _ => text,
    };

    if !color {
        return base;
    }

    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Info => base.bright_cyan().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Plain | MessageKind::Rule => base,
    }
}

/// Field label styling used by entry and group cards.
pub fn field_label(label: &str, color: bool) -> String {
    if color {
        label.bold().bright_blue().to_string()
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rendering_has_no_escape_codes() {
        let rendered = render(MessageKind::Error, "boom", false);
        assert_eq!(rendered, "boom");
        assert_eq!(render(MessageKind::Section, " Help ", false), "=== Help ===");
        assert_eq!(render(MessageKind::Rule, "", false).len(), RULE_WIDTH);
    }
}
