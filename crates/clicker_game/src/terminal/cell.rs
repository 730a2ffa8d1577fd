//! Screen cells and text styles.

use std::fmt;

use crossterm::style::{Attribute, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::Command;

pub use crossterm::style::Color;

/// Foreground, background and attributes for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Text color.
    pub fg: Option<Color>,
    /// Background color.
    pub bg: Option<Color>,
    /// Bold weight.
    pub bold: bool,
    /// Italic.
    pub italic: bool,
}

impl Style {
    /// No color, no attributes.
    pub const PLAIN: Self = Self {
        fg: None,
        bg: None,
        bold: false,
        italic: false,
    };

    /// Text in `color`.
    #[must_use]
    pub const fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::PLAIN
        }
    }

    /// Same style on a `color` background.
    #[must_use]
    pub const fn on(self, color: Color) -> Self {
        Self {
            bg: Some(color),
            ..self
        }
    }

    /// Same style, bold.
    #[must_use]
    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    /// Same style, italic.
    #[must_use]
    pub const fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    /// Gray text at an explicit 0-255 level.
    #[must_use]
    pub const fn gray_level(level: u8) -> Self {
        Self::fg(Color::Rgb {
            r: level,
            g: level,
            b: level,
        })
    }

    /// Conventional muted text.
    #[must_use]
    pub const fn gray() -> Self {
        Self::fg(Color::DarkGrey)
    }

    /// Fill in a background if the style has none.
    #[must_use]
    pub(crate) const fn with_default_bg(self, color: Color) -> Self {
        match self.bg {
            Some(_) => self,
            None => self.on(color),
        }
    }

    /// Append the SGR sequence selecting this style.
    pub(crate) fn write_ansi(&self, out: &mut impl fmt::Write) -> fmt::Result {
        if let Some(fg) = self.fg {
            SetForegroundColor(fg).write_ansi(out)?;
        }
        if let Some(bg) = self.bg {
            SetBackgroundColor(bg).write_ansi(out)?;
        }
        if self.bold {
            SetAttribute(Attribute::Bold).write_ansi(out)?;
        }
        if self.italic {
            SetAttribute(Attribute::Italic).write_ansi(out)?;
        }
        Ok(())
    }

    /// Append the SGR reset sequence.
    pub(crate) fn write_reset(out: &mut impl fmt::Write) -> fmt::Result {
        SetAttribute(Attribute::Reset).write_ansi(out)
    }
}

/// One screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Character shown.
    pub ch: char,
    /// Style, or the terminal default.
    pub style: Option<Style>,
}

impl Cell {
    /// Unstyled space.
    pub const BLANK: Self = Self {
        ch: ' ',
        style: None,
    };
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}
