use crossterm::style::Color;

use super::text_width;
use crate::state::UiState;
use crate::terminal::{Style, Surface};

pub(super) fn draw_debug(surface: &mut Surface, ui: &UiState, fps: u32) {
    let (width, height) = surface.size();
    let style = Style::fg(Color::White).on(Color::Red).bold();

    let keys = " [0] 1min | [1] 10min | [2] 1hr ";
    let (x, _) = surface.center_for(text_width(keys), 0);
    surface.draw(x, i32::from(height) - 4, keys, style);

    let status = format!(
        " fps: {fps} | {width}x{height} | {} | {} | {} ",
        ui.layout.label(),
        ui.screen.label(),
        ui.focus.label()
    );
    let (x, _) = surface.center_for(text_width(&status), 0);
    surface.draw(x, i32::from(height) - 3, &status, style);
}
