use crate::effects::bit_gray;
use crate::state::UiState;
use crate::terminal::{Style, Surface};

pub(super) fn draw_bits(surface: &mut Surface, ui: &UiState) {
    for bit in ui.effects.bits() {
        surface.draw(bit.x, bit.y, bit.glyph(), Style::gray_level(bit_gray(bit.ticks_left)));
    }
}
