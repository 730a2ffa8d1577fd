//! Short status messages written to a stream outside the game screen, e.g.
//! when a connection is refused or closed.

use std::fmt::Write as _;

use clicker_core::format::wrap_text;
use crossterm::style::{Attribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::Command;

/// Lines are wrapped to this many columns.
pub const NOTICE_WIDTH: usize = 60;

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Neutral information.
    Info,
    /// Completed action.
    Success,
    /// Failure.
    Error,
}

impl NoticeKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }

    const fn colors(self) -> (Color, Color) {
        match self {
            Self::Info => (Color::Black, Color::Blue),
            Self::Success => (Color::Black, Color::Green),
            Self::Error => (Color::White, Color::Red),
        }
    }
}

/// Render a labeled notice for a raw-mode terminal (CRLF line endings).
#[must_use]
pub fn notice(kind: NoticeKind, text: &str) -> String {
    let (fg, bg) = kind.colors();
    let mut out = String::from("\r\n  ");
    let _ = SetForegroundColor(fg).write_ansi(&mut out);
    let _ = SetBackgroundColor(bg).write_ansi(&mut out);
    let _ = write!(out, " {} ", kind.label());
    let _ = SetAttribute(Attribute::Reset).write_ansi(&mut out);
    out.push_str("\r\n");

    for paragraph in text.lines() {
        for line in wrap_text(paragraph, NOTICE_WIDTH) {
            let _ = write!(out, "  {line}\r\n");
        }
    }
    out.push_str("\r\n");
    out
}

/// Info notice.
#[must_use]
pub fn info(text: &str) -> String {
    notice(NoticeKind::Info, text)
}

/// Success notice.
#[must_use]
pub fn success(text: &str) -> String {
    notice(NoticeKind::Success, text)
}

/// Error notice.
#[must_use]
pub fn error(text: &str) -> String {
    notice(NoticeKind::Error, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_has_label_and_crlf() {
        let text = error("Your save is in use.");
        assert!(text.contains(" ERROR "));
        assert!(text.contains("  Your save is in use.\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_notice_wraps() {
        let long = "word ".repeat(40);
        let text = info(&long);
        let body_lines = text.matches("  word").count();
        assert!(body_lines >= 3);
    }
}
