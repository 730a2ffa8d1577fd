//! Per-session interface state.

use clicker_core::data::{UpgradeId, UPGRADES};
use clicker_core::persistence::SettingsSnapshot;
use clicker_core::simulation::{ClickLimiter, SimulationState};

use crate::effects::Effects;
use crate::scroll::ListCursor;

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Cookie, stats and, on wider terminals, the lists.
    #[default]
    Main,
    /// Full-screen worker list (small layout).
    Workers,
    /// Full-screen upgrade list (small layout).
    Upgrades,
    /// Settings panel.
    Settings,
}

impl Screen {
    /// Name shown in the debug overlay.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Workers => "workers",
            Self::Upgrades => "upgrades",
            Self::Settings => "settings",
        }
    }
}

/// Which panel receives list keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Nothing in particular.
    #[default]
    Main,
    /// Worker list.
    Workers,
    /// Upgrade list.
    Upgrades,
    /// Settings list.
    Settings,
}

impl Focus {
    /// Name shown in the debug overlay.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Workers => "workers",
            Self::Upgrades => "upgrades",
            Self::Settings => "settings",
        }
    }
}

/// Arrangement chosen from the terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Narrower than [`Layout::MEDIUM_WIDTH`]: one thing per screen.
    Small,
    /// Cookie plus one list.
    Medium,
    /// Cookie plus both lists. From [`Layout::LARGE_WIDTH`] columns.
    Large,
}

impl Layout {
    /// First width that gets the medium layout.
    pub const MEDIUM_WIDTH: u16 = 80;
    /// First width that gets the large layout.
    pub const LARGE_WIDTH: u16 = 120;

    /// Layout for a terminal `width` columns wide.
    #[must_use]
    pub const fn for_width(width: u16) -> Self {
        if width < Self::MEDIUM_WIDTH {
            Self::Small
        } else if width < Self::LARGE_WIDTH {
            Self::Medium
        } else {
            Self::Large
        }
    }

    /// Name shown in the debug overlay.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Width of the list column in the medium and large layouts.
pub const LIST_PANEL_WIDTH: i32 = 44;

/// Rows used by one worker entry.
pub const WORKER_ITEM_HEIGHT: usize = 4;

/// Rows used by one upgrade entry.
pub const UPGRADE_ITEM_HEIGHT: usize = 5;

/// Worker entries that fit on a screen `height` rows tall.
#[must_use]
pub fn workers_visible(height: u16) -> usize {
    (usize::from(height).saturating_sub(3) / WORKER_ITEM_HEIGHT).max(1)
}

/// Upgrade entries that fit on a screen `height` rows tall.
#[must_use]
pub fn upgrades_visible(height: u16) -> usize {
    (usize::from(height).saturating_sub(5) / UPGRADE_ITEM_HEIGHT).max(1)
}

/// Upgrades listed for a player: unlocked ones, minus maxed ones unless
/// `show_maxed`.
#[must_use]
pub fn listed_upgrades(sim: &SimulationState, show_maxed: bool) -> Vec<UpgradeId> {
    UPGRADES
        .iter()
        .filter(|u| show_maxed || !u.is_maxed(sim.upgrade_count(u.id)))
        .filter(|u| sim.is_upgrade_unlocked(u.id))
        .map(|u| u.id)
        .collect()
}

/// Settings screen cursor and pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsCursor {
    /// Selected item index.
    pub selected: usize,
    /// First visible item index.
    pub offset: usize,
    /// "Delete all data" armed, waiting for y/n.
    pub deleting_account: bool,
}

/// Everything about a session that is not simulation progress.
#[derive(Debug)]
pub struct UiState {
    /// Current screen.
    pub screen: Screen,
    /// Current layout.
    pub layout: Layout,
    /// Focused panel.
    pub focus: Focus,
    /// Focus to restore when leaving settings.
    pub last_focus: Focus,
    /// Worker list position.
    pub workers: ListCursor,
    /// Upgrade list position.
    pub upgrades: ListCursor,
    /// List maxed upgrades too.
    pub show_maxed: bool,
    /// Settings list position.
    pub settings_cursor: SettingsCursor,
    /// Persisted display preferences.
    pub settings: SettingsSnapshot,
    /// Prestige armed, waiting for `y`.
    pub confirm_prestige: bool,
    /// Ticks left on the click highlight.
    pub highlight_ticks: u32,
    /// Falling bits.
    pub effects: Effects,
    /// Click rate limiting.
    pub click_limiter: ClickLimiter,
    /// Debug overlay and time-skip keys.
    pub debug: bool,
    /// Whether the player has an account (enables account actions).
    pub identified: bool,
}

impl UiState {
    /// Fresh interface state for a terminal `width` columns wide.
    #[must_use]
    pub fn new(width: u16, settings: SettingsSnapshot, identified: bool, debug: bool, seed: u64) -> Self {
        let mut ui = Self {
            screen: Screen::Main,
            layout: Layout::for_width(width),
            focus: Focus::Main,
            last_focus: Focus::Main,
            workers: ListCursor::default(),
            upgrades: ListCursor::default(),
            show_maxed: false,
            settings_cursor: SettingsCursor::default(),
            settings,
            confirm_prestige: false,
            highlight_ticks: 0,
            effects: Effects::new(seed),
            click_limiter: ClickLimiter::new(),
            debug,
            identified,
        };
        ui.normalize_focus();
        ui
    }

    /// Recompute the layout after a resize and fix up screen and focus so
    /// they make sense in it.
    pub fn set_layout(&mut self, width: u16) {
        self.layout = Layout::for_width(width);
        if self.layout != Layout::Small && matches!(self.screen, Screen::Workers | Screen::Upgrades) {
            self.screen = Screen::Main;
        }
        self.normalize_focus();
    }

    fn normalize_focus(&mut self) {
        match (self.layout, self.screen) {
            (Layout::Small, Screen::Main) => self.focus = Focus::Main,
            (Layout::Medium | Layout::Large, Screen::Main) if self.focus == Focus::Main => {
                self.focus = Focus::Workers;
            }
            _ => {}
        }
    }

    /// Back to the main screen, restoring the focus held before settings.
    pub fn return_to_main(&mut self) {
        self.settings_cursor.deleting_account = false;
        self.confirm_prestige = false;
        self.screen = Screen::Main;
        self.focus = self.last_focus;
        if self.focus == Focus::Settings {
            self.focus = Focus::Main;
        }
        self.normalize_focus();
    }

    /// Open the settings screen.
    pub fn open_settings(&mut self) {
        self.screen = Screen::Settings;
        self.last_focus = self.focus;
        self.focus = Focus::Settings;
        self.settings_cursor = SettingsCursor::default();
        self.confirm_prestige = false;
    }

    /// Tab: leave a sub-screen, or alternate between the two lists.
    pub fn cycle_focus(&mut self) {
        if self.screen != Screen::Main {
            self.return_to_main();
            return;
        }
        self.focus = match (self.layout, self.focus) {
            (Layout::Small, _) => Focus::Main,
            (_, Focus::Workers) => Focus::Upgrades,
            _ => Focus::Workers,
        };
    }

    /// Decay per-tick counters.
    pub fn tick(&mut self) {
        self.highlight_ticks = self.highlight_ticks.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui(width: u16) -> UiState {
        UiState::new(width, SettingsSnapshot::default(), true, false, 1)
    }

    #[test]
    fn test_layout_breakpoints() {
        assert_eq!(Layout::for_width(79), Layout::Small);
        assert_eq!(Layout::for_width(80), Layout::Medium);
        assert_eq!(Layout::for_width(119), Layout::Medium);
        assert_eq!(Layout::for_width(120), Layout::Large);
    }

    #[test]
    fn test_wide_layouts_focus_a_list() {
        assert_eq!(ui(60).focus, Focus::Main);
        assert_eq!(ui(100).focus, Focus::Workers);
    }

    #[test]
    fn test_growing_leaves_list_screen() {
        let mut ui = ui(60);
        ui.screen = Screen::Upgrades;
        ui.focus = Focus::Upgrades;
        ui.set_layout(130);
        assert_eq!(ui.screen, Screen::Main);
        assert_eq!(ui.focus, Focus::Upgrades);

        ui.set_layout(60);
        assert_eq!(ui.focus, Focus::Main);
    }

    #[test]
    fn test_cycle_focus_alternates_lists() {
        let mut ui = ui(100);
        ui.cycle_focus();
        assert_eq!(ui.focus, Focus::Upgrades);
        ui.cycle_focus();
        assert_eq!(ui.focus, Focus::Workers);
    }

    #[test]
    fn test_settings_round_trip_restores_focus() {
        let mut ui = ui(100);
        ui.focus = Focus::Upgrades;
        ui.open_settings();
        assert_eq!(ui.focus, Focus::Settings);
        ui.cycle_focus();
        assert_eq!(ui.screen, Screen::Main);
        assert_eq!(ui.focus, Focus::Upgrades);
    }

    #[test]
    fn test_visible_counts() {
        assert_eq!(workers_visible(24), 5);
        assert_eq!(upgrades_visible(24), 3);
        assert_eq!(workers_visible(2), 1);
    }

    #[test]
    fn test_listed_upgrades_hide_locked() {
        let sim = SimulationState::new();
        let listed = listed_upgrades(&sim, false);
        assert!(listed.iter().all(|id| id.data().prerequisite().is_none()));
        assert!(!listed.is_empty());
    }
}
