use crossterm::style::Color;

use super::{draw_segments, text_width};
use crate::state::{Focus, Layout, Screen, UiState};
use crate::terminal::{Style, Surface};

const SETTINGS: &str = "[S]ettings";

pub(super) fn draw_navbar(surface: &mut Surface, ui: &UiState) {
    if ui.screen != Screen::Main {
        let back = "[backspace] to return";
        let (x, _) = surface.center_for(text_width(back), 0);
        surface.draw(x, 0, back, Style::gray());
        return;
    }

    match ui.layout {
        Layout::Large => {
            let (x, _) = surface.center_for(text_width(SETTINGS), 0);
            surface.draw(x, 0, SETTINGS, Style::gray());
        }
        Layout::Medium => {
            let workers = if ui.focus == Focus::Workers {
                Style::fg(Color::Yellow).bold()
            } else {
                Style::gray()
            };
            let upgrades = if ui.focus == Focus::Upgrades {
                Style::fg(Color::Blue).bold()
            } else {
                Style::gray()
            };
            let segments = [
                ("[W]orkers", workers),
                ("   ", Style::PLAIN),
                ("[U]pgrades", upgrades),
                ("   ", Style::PLAIN),
                (SETTINGS, Style::gray()),
            ];
            let total = segments.iter().map(|(text, _)| text_width(text)).sum();
            let (x, _) = surface.center_for(total, 0);
            draw_segments(surface, x, 0, &segments);
        }
        Layout::Small => {
            let text = "[W]orkers  [U]pgrades  [S]ettings";
            let (x, _) = surface.center_for(text_width(text), 0);
            surface.draw(x, 0, text, Style::gray());
        }
    }
}
