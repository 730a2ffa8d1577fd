use clicker_core::economy::prestige_multiplier;
use clicker_core::format::{format_bytes, format_rate};
use clicker_core::simulation::SimulationState;
use crossterm::style::Color;

use super::cookie::art_bottom;
use super::{draw_segments, main_column_x, text_width};
use crate::state::UiState;
use crate::terminal::{Style, Surface};

pub(super) fn draw_stats(surface: &mut Surface, sim: &SimulationState, ui: &UiState) {
    let (_, height) = surface.size();
    let balance = format!(" {} ", format_bytes(sim.bytes()));
    let rate = format!("({})", format_rate(sim.rate()));

    let total = text_width(&balance) + 2 + text_width(&rate);
    let x = main_column_x(surface, ui.layout, total);
    let y = i32::from(height) / 2 - 8;
    draw_segments(
        surface,
        x,
        y,
        &[
            (&balance, Style::fg(Color::White).on(Color::Black)),
            ("  ", Style::PLAIN),
            (&rate, Style::gray()),
        ],
    );

    draw_prestige_prompt(surface, sim, ui, art_bottom(height) + 4);
}

fn draw_prestige_prompt(surface: &mut Surface, sim: &SimulationState, ui: &UiState, y: i32) {
    if !sim.can_prestige() {
        return;
    }
    let next = prestige_multiplier(sim.prestige() + 1);
    let (text, style) = if ui.confirm_prestige {
        (
            format!("Reset all progress for a {next}x multiplier? [y]es / any key cancels"),
            Style::fg(Color::Red).bold(),
        )
    } else {
        (
            format!("[p]restige: reset for a {next}x multiplier"),
            Style::fg(Color::Magenta),
        )
    };
    let x = main_column_x(surface, ui.layout, text_width(&text));
    surface.draw(x, y, &text, style);
}
