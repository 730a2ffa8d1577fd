use crossterm::style::Color;

use super::draw_segments;
use crate::scroll::{ensure_visible_variable, scrollbar, visible_range};
use crate::settings::{description_lines, row_heights, settings_items, SettingsItem};
use crate::state::{Layout, UiState};
use crate::terminal::{Style, Surface};

const MAX_PANEL_WIDTH: i32 = 70;

struct Columns {
    pointer: i32,
    content: i32,
    scrollbar: i32,
    top: i32,
}

/// Draws the settings list and stores the scroll offset it settled on.
pub(super) fn draw_settings(surface: &mut Surface, ui: &mut UiState) {
    let (width, height) = surface.size();
    let panel_width = MAX_PANEL_WIDTH.min(i32::from(width) - 5).max(1);
    let panel_height = usize::from(height).saturating_sub(4);
    let (panel_x, panel_y) = surface.center_for(panel_width, panel_height as i32);

    let (title_x, title_y, columns) = match ui.layout {
        Layout::Large | Layout::Medium => (
            panel_x,
            panel_y - 1,
            Columns {
                pointer: panel_x + 2,
                content: panel_x + 4,
                scrollbar: panel_x,
                top: panel_y,
            },
        ),
        Layout::Small => (
            1,
            2,
            Columns {
                pointer: 5,
                content: 7,
                scrollbar: 1,
                top: 3,
            },
        ),
    };
    draw_segments(
        surface,
        title_x,
        title_y,
        &[
            ("[S]ettings", Style::fg(Color::White).bold()),
            (" ", Style::PLAIN),
            ("j(↓) / k(↑)", Style::gray()),
        ],
    );

    let items = settings_items(ui.identified);
    let panel_width = panel_width as usize;
    let heights = row_heights(&items, panel_width);

    let cursor = &mut ui.settings_cursor;
    cursor.selected = cursor.selected.min(items.len().saturating_sub(1));
    cursor.offset = ensure_visible_variable(cursor.selected, cursor.offset, &heights, panel_height);
    let (start, end) = visible_range(&heights, panel_height, cursor.offset);
    let cursor = *cursor;

    let mut y = columns.top;
    for index in start..end {
        let selected = index == cursor.selected;
        let pointer = if selected && !cursor.deleting_account { ">" } else { " " };
        draw_item(surface, &columns, y, &items[index], selected, pointer, ui, panel_width);
        y += heights[index] as i32;
    }

    if let Some(bar) = scrollbar(items.len(), end - start, cursor.offset, panel_height) {
        for row in 0..bar.height {
            surface.draw(columns.scrollbar, columns.top + (bar.y + row) as i32, "┃", Style::gray());
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_item(
    surface: &mut Surface,
    columns: &Columns,
    y: i32,
    item: &SettingsItem,
    selected: bool,
    pointer: &str,
    ui: &UiState,
    panel_width: usize,
) {
    let label_style = if selected {
        Style::fg(Color::White).bold()
    } else {
        Style::fg(Color::White)
    };

    let (description, mut line) = match item {
        SettingsItem::Header { label } => {
            surface.draw(columns.content, y, label, Style::fg(Color::White));
            return;
        }
        SettingsItem::Toggle {
            toggle,
            label,
            description,
        } => {
            let mark = if toggle.get(&ui.settings) { "x" } else { " " };
            surface.draw(columns.content, y, &format!("[{mark}] {label}"), label_style);
            (*description, y + 1)
        }
        SettingsItem::Options {
            choice,
            label,
            description,
        } => {
            let current = choice.current(&ui.settings);
            let mut x = draw_segments(surface, columns.content, y, &[(*label, label_style), (": ", Style::gray())]);
            for (i, option) in choice.options().into_iter().enumerate() {
                if i > 0 {
                    x = draw_segments(surface, x, y, &[(" / ", Style::gray())]);
                }
                let style = if option == current {
                    Style::fg(Color::Green).bold()
                } else {
                    Style::gray()
                };
                x = draw_segments(surface, x, y, &[(option, style)]);
            }
            (*description, y + 1)
        }
        SettingsItem::Action {
            label, description, ..
        } => {
            surface.draw(columns.content, y, label, label_style);
            (*description, y + 1)
        }
    };

    surface.draw(columns.pointer, y, pointer, Style::fg(Color::White));
    for text in description_lines(description, panel_width) {
        surface.draw(columns.content, line, &text, Style::gray().italic());
        line += 1;
    }

    match item {
        SettingsItem::Toggle { toggle, .. } if selected => {
            if toggle.get(&ui.settings) {
                surface.draw(columns.content, line, "[d]isable", Style::fg(Color::Red));
            } else {
                surface.draw(columns.content, line, "[e]nable", Style::fg(Color::Green));
            }
        }
        SettingsItem::Options { .. } if selected => {
            surface.draw(columns.content, line, "[tab] next option", Style::gray());
        }
        SettingsItem::Action { .. } if ui.settings_cursor.deleting_account && selected => {
            draw_segments(
                surface,
                columns.content,
                line,
                &[
                    ("are you sure? ", Style::fg(Color::Red).bold()),
                    ("[y]es ", Style::fg(Color::Red)),
                    ("[n]o", Style::fg(Color::Green)),
                ],
            );
        }
        SettingsItem::Action { .. } if selected => {
            surface.draw(columns.content, line, "[d]elete", Style::fg(Color::Red));
        }
        _ => {}
    }
}
