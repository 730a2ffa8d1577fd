use clicker_core::data::UpgradeData;
use clicker_core::format::{format_bytes, wrap_text};
use clicker_core::simulation::SimulationState;
use crossterm::style::Color;

use super::text_width;
use crate::scroll::scrollbar;
use crate::state::{listed_upgrades, upgrades_visible, Focus, Layout, UiState, LIST_PANEL_WIDTH, UPGRADE_ITEM_HEIGHT};
use crate::terminal::{Style, Surface};

const TOP: i32 = 3;

fn owned_label(data: &UpgradeData, owned: u32) -> String {
    match (data.max_owned, owned) {
        (1, 1) => " (owned)".to_string(),
        (1, _) => " (not owned)".to_string(),
        (max, owned) => format!(" (owned: {owned} / {max})"),
    }
}

fn draw_upgrade(surface: &mut Surface, x: i32, y: i32, data: &UpgradeData, selected: bool, sim: &SimulationState) {
    let owned = sim.upgrade_count(data.id);
    let cost = sim.upgrade_cost(data.id);
    let affordable = sim.can_afford(&cost);

    let name_style = if affordable {
        Style::fg(Color::Blue).bold()
    } else {
        Style::fg(Color::Blue)
    };
    surface.draw(x + 2, y, data.name, name_style);
    surface.draw(
        x + 2 + text_width(data.name),
        y,
        &owned_label(data, owned),
        Style::gray(),
    );
    surface.draw(x + 2, y + 1, "cost: ", Style::gray());
    surface.draw(x + 8, y + 1, &format_bytes(&cost), Style::fg(Color::White));

    let lines = wrap_text(data.description, (LIST_PANEL_WIDTH - 4) as usize);
    for (i, line) in lines.iter().enumerate() {
        surface.draw(x + 2, y + 2 + i as i32, line, Style::gray().italic());
    }

    if selected {
        let action_y = y + 2 + lines.len() as i32;
        surface.draw(x, y, ">", Style::fg(Color::Blue));
        if data.is_maxed(owned) {
            surface.draw(x + 2, action_y, "maxed out", Style::fg(Color::Red));
        } else if affordable {
            surface.draw(x + 2, action_y, "[b]uy", Style::fg(Color::Green));
        } else {
            surface.draw(x + 2, action_y, "you cannot afford this", Style::fg(Color::Red));
        }
    }
}

pub(super) fn draw_upgrades(surface: &mut Surface, sim: &SimulationState, ui: &UiState) {
    let (width, height) = surface.size();
    let width = i32::from(width);
    let focused = ui.focus == Focus::Upgrades;
    let visible = upgrades_visible(height);
    let panel_height = usize::from(height).saturating_sub(5);

    let (panel_x, scrollbar_x, title_x, keys_x) = match ui.layout {
        Layout::Large => (width - LIST_PANEL_WIDTH - 1, width - 2, width - 11, width - 23),
        Layout::Medium | Layout::Small => (3, 1, 1, 12),
    };

    let title = if focused {
        Style::fg(Color::Blue).bold()
    } else {
        Style::gray().bold()
    };
    surface.draw(title_x, 2, "[U]pgrades", title);
    if focused {
        surface.draw(keys_x, 2, "j(↓) / k(↑)", Style::gray());
    }

    let listed = listed_upgrades(sim, ui.show_maxed);
    let start = ui.upgrades.offset.min(listed.len());
    let end = (start + visible).min(listed.len());
    for (row, index) in (start..end).enumerate() {
        let y = TOP + (row * UPGRADE_ITEM_HEIGHT) as i32;
        draw_upgrade(
            surface,
            panel_x,
            y,
            listed[index].data(),
            focused && index == ui.upgrades.selected,
            sim,
        );
    }

    if let Some(bar) = scrollbar(listed.len(), visible, ui.upgrades.offset, panel_height) {
        for row in 0..bar.height {
            surface.draw(scrollbar_x, TOP + (bar.y + row) as i32, "┃", Style::gray());
        }
    }

    let hint = if ui.show_maxed {
        "[H]ide maxed upgrades"
    } else {
        "Un[h]ide maxed upgrades"
    };
    let hint_x = match ui.layout {
        Layout::Large => width - text_width(hint) - 1,
        Layout::Medium | Layout::Small => 1,
    };
    surface.draw(hint_x, 1, hint, Style::gray().italic());
}
