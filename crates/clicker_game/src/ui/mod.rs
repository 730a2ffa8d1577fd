//! Screen widgets.
//!
//! Every widget draws into a [`Surface`] with absolute coordinates derived
//! from the surface size. Off-screen text is clipped by the surface, so the
//! widgets do not check bounds themselves.

mod bits;
mod cookie;
mod debug;
mod footer;
mod navbar;
mod settings;
mod stats;
mod upgrades;
mod workers;

use crate::controls::Game;
use crate::state::{Focus, Layout, Screen, LIST_PANEL_WIDTH};
use crate::terminal::{Style, Surface};

/// Per-frame facts that do not live in the game state.
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo<'a> {
    /// Address shown in the footer.
    pub public_address: &'a str,
    /// Measured frames per second, for the debug overlay.
    pub fps: u32,
}

/// Draw a whole frame into the surface's next grid.
pub fn draw_frame(surface: &mut Surface, game: &mut Game, info: &FrameInfo<'_>) {
    bits::draw_bits(surface, &game.ui);
    navbar::draw_navbar(surface, &game.ui);
    footer::draw_footer(surface, &game.sim, info.public_address);

    match game.ui.screen {
        Screen::Main => {
            cookie::draw_cookie(surface, &game.ui);
            stats::draw_stats(surface, &game.sim, &game.ui);
            match game.ui.layout {
                Layout::Large => {
                    workers::draw_workers(surface, &game.sim, &game.ui);
                    upgrades::draw_upgrades(surface, &game.sim, &game.ui);
                }
                Layout::Medium => match game.ui.focus {
                    Focus::Upgrades => upgrades::draw_upgrades(surface, &game.sim, &game.ui),
                    _ => workers::draw_workers(surface, &game.sim, &game.ui),
                },
                Layout::Small => {}
            }
        }
        Screen::Workers => workers::draw_workers(surface, &game.sim, &game.ui),
        Screen::Upgrades => upgrades::draw_upgrades(surface, &game.sim, &game.ui),
        Screen::Settings => settings::draw_settings(surface, &mut game.ui),
    }

    if game.ui.debug {
        debug::draw_debug(surface, &game.ui, info.fps);
    }
}

/// Column count of `text` as drawn.
pub(crate) fn text_width(text: &str) -> i32 {
    i32::try_from(text.chars().count()).unwrap_or(i32::MAX)
}

/// Left edge and width of the area the cookie and stats are centered in.
/// In the medium layout the list takes the left column.
pub(crate) fn main_column(surface: &Surface, layout: Layout) -> (i32, i32) {
    let width = i32::from(surface.size().0);
    match layout {
        Layout::Medium => (LIST_PANEL_WIDTH + 2, width - LIST_PANEL_WIDTH - 2),
        Layout::Small | Layout::Large => (0, width),
    }
}

/// X that centers `text_w` columns in the main column.
pub(crate) fn main_column_x(surface: &Surface, layout: Layout, text_w: i32) -> i32 {
    let (left, width) = main_column(surface, layout);
    left + (width - text_w).div_euclid(2)
}

/// Draw consecutive segments on one row, returning the x after the last.
pub(crate) fn draw_segments(
    surface: &mut Surface,
    x: i32,
    y: i32,
    segments: &[(&str, Style)],
) -> i32 {
    let mut x = x;
    for (text, style) in segments {
        surface.draw(x, y, text, *style);
        x += text_width(text);
    }
    x
}
