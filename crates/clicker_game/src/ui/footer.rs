use clicker_core::simulation::SimulationState;
use crossterm::style::Color;

use super::{draw_segments, text_width};
use crate::terminal::{Style, Surface};

pub(super) fn draw_footer(surface: &mut Surface, sim: &SimulationState, public_address: &str) {
    let (_, height) = surface.size();
    let prestige = sim.prestige().to_string();
    let multiplier = format!("{}x", sim.multiplier());

    let white = Style::fg(Color::White);
    let segments = [
        ("ssh ", Style::gray()),
        (public_address, white),
        (" | prestige: ", Style::gray()),
        (prestige.as_str(), white),
        (" (", Style::gray()),
        (multiplier.as_str(), white),
        (" multi)", Style::gray()),
    ];
    let total: i32 = segments.iter().map(|(text, _)| text_width(text)).sum();
    let (x, _) = surface.center_for(total, 0);
    draw_segments(surface, x, i32::from(height) - 1, &segments);
}
