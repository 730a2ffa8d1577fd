//! Double-buffered differential screen.
//!
//! Draw calls land in the `next` grid. [`Surface::render`] compares each
//! row of `next` with what was last transmitted (`prev`) and writes only the
//! rows that differ, so an idle frame costs zero bytes.

use std::fmt::Write as _;
use std::io;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::Color;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::Command;
use tracing::trace;

use super::cell::{Cell, Style};
use super::sink::Sink;

/// Widest grid a surface will allocate. Larger reported sizes are clamped.
pub const MAX_WIDTH: u16 = 1024;
/// Tallest grid a surface will allocate.
pub const MAX_HEIGHT: u16 = 512;

/// Clamp a reported terminal size to what a surface will allocate.
#[must_use]
pub fn clamp_size(width: u16, height: u16) -> (u16, u16) {
    (width.min(MAX_WIDTH), height.min(MAX_HEIGHT))
}

/// One connection's screen.
pub struct Surface {
    width: u16,
    height: u16,
    next: Vec<Vec<Cell>>,
    prev: Vec<Vec<Cell>>,
    /// Rows that must be retransmitted even if they compare equal.
    stale: Vec<bool>,
    sink: Box<dyn Sink>,
    black_background: bool,
    pending_clear: bool,
    active: bool,
    closed: bool,
}

fn blank_grid(width: u16, height: u16) -> Vec<Vec<Cell>> {
    vec![vec![Cell::BLANK; usize::from(width)]; usize::from(height)]
}

fn command_ansi(command: impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = command.write_ansi(&mut out);
    out
}

impl Surface {
    /// Surface of the given size writing into `sink`, clamped to
    /// [`MAX_WIDTH`] by [`MAX_HEIGHT`].
    pub fn new(sink: Box<dyn Sink>, width: u16, height: u16) -> Self {
        let (width, height) = clamp_size(width, height);
        Self {
            width,
            height,
            next: blank_grid(width, height),
            prev: blank_grid(width, height),
            stale: vec![true; usize::from(height)],
            sink,
            black_background: false,
            pending_clear: false,
            active: false,
            closed: false,
        }
    }

    /// Current `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Middle cell of the screen.
    #[must_use]
    pub fn center(&self) -> (i32, i32) {
        (i32::from(self.width) / 2, i32::from(self.height) / 2)
    }

    /// Top-left corner that centers a `w × h` box. Negative when the box is
    /// larger than the screen.
    #[must_use]
    pub fn center_for(&self, w: i32, h: i32) -> (i32, i32) {
        (
            (i32::from(self.width) - w).div_euclid(2),
            (i32::from(self.height) - h).div_euclid(2),
        )
    }

    /// Whether [`Surface::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Write `text` starting at `(x, y)`. Characters outside the screen are
    /// dropped; control characters are drawn as spaces.
    pub fn draw(&mut self, x: i32, y: i32, text: &str, style: Style) {
        let Ok(row) = usize::try_from(y) else {
            return;
        };
        let Some(cells) = self.next.get_mut(row) else {
            return;
        };
        let style = (style != Style::PLAIN).then_some(style);
        for (i, ch) in text.chars().enumerate() {
            let Some(col) = i32::try_from(i).ok().and_then(|i| x.checked_add(i)) else {
                break;
            };
            let Ok(col) = usize::try_from(col) else {
                continue;
            };
            let Some(cell) = cells.get_mut(col) else {
                break;
            };
            let ch = if ch.is_control() { ' ' } else { ch };
            *cell = Cell { ch, style };
        }
    }

    /// [`Surface::draw`] with no style.
    pub fn draw_plain(&mut self, x: i32, y: i32, text: &str) {
        self.draw(x, y, text, Style::PLAIN);
    }

    /// Cell in the next frame, for inspection.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        self.next
            .get(usize::from(y))
            .and_then(|row| row.get(usize::from(x)))
            .copied()
    }

    /// Text of one row of the next frame, without styles.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.next
            .get(usize::from(y))
            .map(|row| row.iter().map(|c| c.ch).collect())
            .unwrap_or_default()
    }

    /// Start a new frame. A `full` clear also wipes the client's screen and
    /// forces every row to be retransmitted.
    pub fn clear(&mut self, full: bool) -> io::Result<()> {
        self.next = blank_grid(self.width, self.height);
        if full {
            self.prev = blank_grid(self.width, self.height);
            self.stale.iter_mut().for_each(|s| *s = true);
            if self.active && !self.closed {
                let mut out = command_ansi(Clear(ClearType::All));
                out.push_str(&command_ansi(Hide));
                self.sink.write(out.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Transmit the rows that changed since the last render. Returns the
    /// number of bytes written.
    pub fn render(&mut self) -> io::Result<usize> {
        if self.closed {
            return Ok(0);
        }

        let mut out = String::new();
        if self.pending_clear {
            out.push_str(&command_ansi(Clear(ClearType::All)));
            out.push_str(&command_ansi(Hide));
            self.pending_clear = false;
        }

        let default_bg = self.black_background.then_some(Color::Black);
        let mut rows = 0usize;
        for y in 0..usize::from(self.height) {
            if !self.stale[y] && self.next[y] == self.prev[y] {
                continue;
            }
            rows += 1;
            // Row indices fit in u16 because height does.
            let _ = MoveTo(0, y as u16).write_ansi(&mut out);
            write_row(&mut out, &self.next[y], default_bg);
            self.prev[y].clone_from(&self.next[y]);
            self.stale[y] = false;
        }

        if out.is_empty() {
            return Ok(0);
        }
        let _ = MoveTo(0, self.height).write_ansi(&mut out);

        if let Err(e) = self.sink.write(out.as_bytes()).and_then(|()| self.sink.flush()) {
            self.stale.iter_mut().for_each(|s| *s = true);
            return Err(e);
        }
        trace!(rows, bytes = out.len(), "Rendered frame");
        Ok(out.len())
    }

    /// Reallocate both grids, clamped like [`Surface::new`]. The next render
    /// repaints everything.
    pub fn resize(&mut self, width: u16, height: u16) {
        let (width, height) = clamp_size(width, height);
        self.width = width;
        self.height = height;
        self.next = blank_grid(width, height);
        self.prev = blank_grid(width, height);
        self.stale = vec![true; usize::from(height)];
        self.pending_clear = true;
    }

    /// Paint unstyled cells on black instead of the terminal's background.
    pub fn set_black_background(&mut self, enabled: bool) {
        if self.black_background != enabled {
            self.black_background = enabled;
            self.stale.iter_mut().for_each(|s| *s = true);
        }
    }

    /// Enter raw mode and the alternate screen, hide the cursor.
    pub fn setup(&mut self) -> io::Result<()> {
        if self.active || self.closed {
            return Ok(());
        }
        self.sink.acquire_raw_mode()?;
        let mut out = command_ansi(EnterAlternateScreen);
        out.push_str(&command_ansi(Clear(ClearType::All)));
        out.push_str(&command_ansi(Hide));
        self.sink.write(out.as_bytes())?;
        self.sink.flush()?;
        self.active = true;
        self.stale.iter_mut().for_each(|s| *s = true);
        Ok(())
    }

    /// Restore the client's terminal. Safe to call repeatedly; every step is
    /// attempted even if an earlier one fails.
    pub fn destroy(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut out = String::new();
        let _ = Style::write_reset(&mut out);
        out.push_str(&command_ansi(Show));
        out.push_str(&command_ansi(LeaveAlternateScreen));
        let written = self.sink.write(out.as_bytes()).and_then(|()| self.sink.flush());
        let released = self.sink.release_raw_mode();
        written.and(released)
    }

    /// Write bytes outside the frame protocol, e.g. a farewell notice after
    /// [`Surface::destroy`].
    pub fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.sink.write(bytes)?;
        self.sink.flush()
    }

    /// Close the sink. Later calls do nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.sink.flush();
        self.sink.close();
    }
}

/// Serialize one row, switching SGR state only where the style changes.
fn write_row(out: &mut String, row: &[Cell], default_bg: Option<Color>) {
    let mut current: Option<Style> = None;
    for cell in row {
        let style = match (cell.style, default_bg) {
            (Some(style), Some(bg)) => Some(style.with_default_bg(bg)),
            (None, Some(bg)) => Some(Style::PLAIN.on(bg)),
            (style, None) => style,
        };
        if style != current {
            if current.is_some() {
                let _ = Style::write_reset(out);
            }
            if let Some(style) = style {
                let _ = style.write_ansi(out);
            }
            current = style;
        }
        out.push(cell.ch);
    }
    if current.is_some() {
        let _ = Style::write_reset(out);
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("active", &self.active)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::MemorySink;

    fn surface(width: u16, height: u16) -> (Surface, MemorySink) {
        let sink = MemorySink::new();
        (Surface::new(Box::new(sink.clone()), width, height), sink)
    }

    #[test]
    fn test_only_changed_rows_are_sent() {
        let (mut s, sink) = surface(10, 4);
        s.render().unwrap();
        sink.take();

        s.draw_plain(0, 2, "hi");
        s.render().unwrap();
        let out = sink.take_string();
        assert!(out.contains(&command_ansi(MoveTo(0, 2))));
        assert!(!out.contains(&command_ansi(MoveTo(0, 1))));
        assert!(out.contains("hi"));
    }

    #[test]
    fn test_oversized_terminal_is_clamped() {
        let (mut s, _) = surface(u16::MAX, u16::MAX);
        assert_eq!(s.size(), (MAX_WIDTH, MAX_HEIGHT));

        s.resize(80, 24);
        assert_eq!(s.size(), (80, 24));
        s.resize(u16::MAX, 30);
        assert_eq!(s.size(), (MAX_WIDTH, 30));
        s.draw_plain(i32::from(MAX_WIDTH) - 1, 0, "xy");
        assert!(s.render().unwrap() > 0);
    }

    #[test]
    fn test_draw_clips_at_edges() {
        let (mut s, _) = surface(5, 2);
        s.draw_plain(3, 0, "abcdef");
        s.draw_plain(-2, 1, "xyz");
        assert_eq!(s.row_text(0), "   ab");
        assert_eq!(s.row_text(1), "z    ");
    }

    #[test]
    fn test_control_characters_become_spaces() {
        let (mut s, _) = surface(4, 1);
        s.draw_plain(0, 0, "a\x1bb");
        assert_eq!(s.row_text(0), "a b ");
    }

    #[test]
    fn test_styled_row_resets_at_end() {
        let (mut s, sink) = surface(6, 1);
        s.draw(0, 0, "ok", Style::fg(Color::Green));
        s.render().unwrap();
        let out = sink.take_string();
        let reset = {
            let mut r = String::new();
            Style::write_reset(&mut r).unwrap();
            r
        };
        assert!(out.contains(&reset));
    }

    #[test]
    fn test_center_for_large_box_goes_negative() {
        let (s, _) = surface(10, 4);
        assert_eq!(s.center(), (5, 2));
        assert_eq!(s.center_for(4, 2), (3, 1));
        assert_eq!(s.center_for(13, 0), (-2, 2));
    }

    #[test]
    fn test_failed_write_retransmits_next_time() {
        let (mut s, sink) = surface(4, 2);
        s.draw_plain(0, 0, "x");
        sink.fail_writes(true);
        assert!(s.render().is_err());
        sink.fail_writes(false);
        assert!(s.render().unwrap() > 0);
        assert!(sink.take_string().contains('x'));
    }

    #[test]
    fn test_setup_and_destroy_are_idempotent() {
        let (mut s, sink) = surface(4, 2);
        s.setup().unwrap();
        s.setup().unwrap();
        assert!(sink.in_raw_mode());
        let entered = sink.take_string();
        assert_eq!(entered.matches(&command_ansi(EnterAlternateScreen)).count(), 1);

        s.destroy().unwrap();
        s.destroy().unwrap();
        assert!(!sink.in_raw_mode());
        let left = sink.take_string();
        assert_eq!(left.matches(&command_ansi(LeaveAlternateScreen)).count(), 1);
    }

    #[test]
    fn test_closed_surface_renders_nothing() {
        let (mut s, sink) = surface(4, 2);
        s.close();
        s.close();
        s.draw_plain(0, 0, "x");
        assert_eq!(s.render().unwrap(), 0);
        assert!(sink.is_empty());
        assert!(sink.is_closed());
    }

    #[test]
    fn test_black_background_repaints() {
        let (mut s, sink) = surface(3, 2);
        s.render().unwrap();
        sink.take();
        assert_eq!(s.render().unwrap(), 0);
        s.set_black_background(true);
        assert!(s.render().unwrap() > 0);
        assert_eq!(s.render().unwrap(), 0);
    }
}
