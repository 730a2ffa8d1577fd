use clicker_core::data::{WorkerData, WORKERS};
use clicker_core::format::{format_bytes, format_rate};
use clicker_core::simulation::SimulationState;
use crossterm::style::Color;

use super::{draw_segments, text_width};
use crate::scroll::scrollbar;
use crate::state::{workers_visible, Focus, UiState, WORKER_ITEM_HEIGHT};
use crate::terminal::{Style, Surface};

const TOP: i32 = 3;

fn draw_worker(surface: &mut Surface, y: i32, worker: &WorkerData, selected: bool, sim: &SimulationState) {
    let owned = sim.worker_count(worker.id);
    let cost = sim.worker_cost(worker.id);
    let affordable = sim.can_afford(&cost);

    let name_style = if affordable {
        Style::fg(Color::Yellow).bold()
    } else {
        Style::fg(Color::Yellow)
    };
    surface.draw(5, y, worker.name, name_style);
    surface.draw(
        6 + text_width(worker.name),
        y,
        &format!("(owned: {owned})"),
        Style::gray(),
    );

    let cost_text = format_bytes(&cost);
    let rate_text = format_rate(&worker.base_rate.to_bytes());
    draw_segments(
        surface,
        5,
        y + 1,
        &[
            ("cost: ", Style::gray()),
            (&cost_text, Style::fg(Color::White)),
            (", bps: ", Style::gray()),
            (&rate_text, Style::fg(Color::White)),
        ],
    );

    if selected {
        surface.draw(3, y, ">", Style::fg(Color::Yellow));
        if affordable {
            surface.draw(5, y + 2, "[b]uy", Style::fg(Color::Green));
        } else {
            surface.draw(5, y + 2, "you cannot afford this", Style::fg(Color::Red));
        }
    }
}

pub(super) fn draw_workers(surface: &mut Surface, sim: &SimulationState, ui: &UiState) {
    let (_, height) = surface.size();
    let focused = ui.focus == Focus::Workers;
    let visible = workers_visible(height);

    let title = if focused {
        Style::fg(Color::Yellow).bold()
    } else {
        Style::gray().bold()
    };
    surface.draw(1, 2, "[W]orkers", title);
    if focused {
        surface.draw(11, 2, "j(↓) / k(↑)", Style::gray());
    }

    let start = ui.workers.offset.min(WORKERS.len());
    let end = (start + visible).min(WORKERS.len());
    for (row, index) in (start..end).enumerate() {
        let y = TOP + (row * WORKER_ITEM_HEIGHT) as i32;
        draw_worker(
            surface,
            y,
            &WORKERS[index],
            focused && index == ui.workers.selected,
            sim,
        );
    }

    let bar_height = usize::from(height).saturating_sub(4);
    if let Some(bar) = scrollbar(WORKERS.len(), visible, ui.workers.offset, bar_height) {
        for row in 0..bar.height {
            surface.draw(1, TOP + (bar.y + row) as i32, "┃", Style::gray());
        }
    }
}
