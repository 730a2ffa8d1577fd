use super::{main_column_x, text_width};
use crate::effects::cookie_gray;
use crate::state::UiState;
use crate::terminal::{Style, Surface};

/// A floppy disk, baked fresh.
const ART: [&str; 10] = [
    " ________________________ ",
    "|  |                | [] |",
    "|  |   BYTE  OVEN   |    |",
    "|  |________________|    |",
    "|                        |",
    "|    ________________    |",
    "|   |   __           |   |",
    "|   |  |  |  0101    |   |",
    "|   |  |__|  1010    |   |",
    "|___|________________|___|",
];

const PROMPT: &str = "Press [space] to bake!";

/// Row below the art where the prompt goes; the stats widget lines up
/// under it.
pub(super) fn art_bottom(height: u16) -> i32 {
    let top = (i32::from(height) - ART.len() as i32).div_euclid(2);
    top + ART.len() as i32
}

pub(super) fn draw_cookie(surface: &mut Surface, ui: &UiState) {
    let (_, height) = surface.size();
    let art_width = text_width(ART[0]);
    let x = main_column_x(surface, ui.layout, art_width);
    let top = art_bottom(height) - ART.len() as i32;

    let style = Style::gray_level(cookie_gray(ui.highlight_ticks));
    for (i, line) in ART.iter().enumerate() {
        surface.draw(x, top + i as i32, line, style);
    }

    let prompt_x = main_column_x(surface, ui.layout, text_width(PROMPT));
    surface.draw(prompt_x, art_bottom(height) + 2, PROMPT, Style::gray());
}
