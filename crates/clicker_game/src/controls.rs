//! Key handling.
//!
//! [`Game`] bundles the simulation and interface state of a session and
//! implements [`KeyHandler`]. Keys are dispatched by screen and layout;
//! anything that needs the outside world (deleting the account) is queued
//! as a [`Request`] for the session to carry out.
//!
//! Prestige is a two-press action: `p` arms it, `y` confirms, and any other
//! key disarms it. The armed key itself is consumed by the disarm, except
//! that space still clicks.

use clicker_core::data::WorkerId;
use clicker_core::simulation::SimulationState;
use tracing::{debug, info};

use crate::effects::HIGHLIGHT_TICKS;
use crate::input::{Key, KeyHandler};
use crate::settings::{self, Action, SettingsItem};
use crate::state::{listed_upgrades, upgrades_visible, workers_visible, Focus, Layout, Screen, UiState};

/// Work a key asked for that the session itself must perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Delete all stored data and disconnect.
    DeleteAccount,
}

/// Simulation plus interface state: everything a key can change.
#[derive(Debug)]
pub struct Game {
    /// Progress.
    pub sim: SimulationState,
    /// Interface.
    pub ui: UiState,
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Milliseconds since the session started, for click rate limiting.
    pub now_ms: u64,
    requests: Vec<Request>,
}

impl Game {
    /// Bundle state for a `width × height` terminal.
    #[must_use]
    pub fn new(sim: SimulationState, ui: UiState, width: u16, height: u16) -> Self {
        Self {
            sim,
            ui,
            width,
            height,
            now_ms: 0,
            requests: Vec::new(),
        }
    }

    /// Take the queued requests.
    pub fn drain_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    /// One simulation tick plus effect decay.
    pub fn tick(&mut self) {
        self.sim.tick();
        self.ui.tick();
        let density = self.ui.settings.particles;
        self.ui
            .effects
            .tick(self.sim.rate(), density, self.width, self.height);
    }

    /// New terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.ui.set_layout(width);
        self.ui
            .workers
            .follow(WorkerId::COUNT, workers_visible(height));
        let listed = listed_upgrades(&self.sim, self.ui.show_maxed).len();
        self.ui.upgrades.follow(listed, upgrades_visible(height));
    }

    fn click(&mut self) {
        if self
            .sim
            .click(&mut self.ui.click_limiter, self.now_ms)
            .is_ok()
        {
            self.ui.highlight_ticks = HIGHLIGHT_TICKS;
            let density = self.ui.settings.particles;
            self.ui.effects.spawn_click(density, self.width, self.height);
        }
    }

    fn move_workers(&mut self, delta: isize) {
        self.ui
            .workers
            .step(delta, WorkerId::COUNT, workers_visible(self.height));
    }

    fn move_upgrades(&mut self, delta: isize) {
        let listed = listed_upgrades(&self.sim, self.ui.show_maxed).len();
        self.ui.upgrades.step(delta, listed, upgrades_visible(self.height));
    }

    fn buy_worker(&mut self) {
        let Some(id) = WorkerId::ALL.get(self.ui.workers.selected).copied() else {
            return;
        };
        if let Err(e) = self.sim.buy_worker(id) {
            debug!(worker = id.key(), error = %e, "Purchase refused");
        }
    }

    fn buy_upgrade(&mut self) {
        let listed = listed_upgrades(&self.sim, self.ui.show_maxed);
        let Some(id) = listed.get(self.ui.upgrades.selected).copied() else {
            return;
        };
        match self.sim.buy_upgrade(id) {
            Ok(_) => {
                // A maxed upgrade may drop out of the list.
                let listed = listed_upgrades(&self.sim, self.ui.show_maxed).len();
                self.ui.upgrades.follow(listed, upgrades_visible(self.height));
            }
            Err(e) => debug!(upgrade = id.key(), error = %e, "Purchase refused"),
        }
    }

    fn buy_focused(&mut self) {
        match self.ui.focus {
            Focus::Workers => self.buy_worker(),
            Focus::Upgrades => self.buy_upgrade(),
            Focus::Main | Focus::Settings => {}
        }
    }

    /// Show or hide maxed upgrades, keeping the selected upgrade selected
    /// when it is still listed.
    fn toggle_show_maxed(&mut self) {
        let before = listed_upgrades(&self.sim, self.ui.show_maxed);
        let selected = before.get(self.ui.upgrades.selected).copied();

        self.ui.show_maxed = !self.ui.show_maxed;
        let after = listed_upgrades(&self.sim, self.ui.show_maxed);
        let index = match selected {
            Some(id) => after
                .iter()
                .position(|u| *u == id)
                .unwrap_or(after.len().saturating_sub(1)),
            None => self.ui.upgrades.selected,
        };
        self.ui
            .upgrades
            .select(index, after.len(), upgrades_visible(self.height));
    }

    fn skip_minutes(&mut self, minutes: u32) {
        let gained = self.sim.skip_time(minutes);
        info!(minutes, gained = %gained, "Debug time skip");
    }

    fn main_screen_key(&mut self, c: char) {
        match (self.ui.layout, c) {
            (_, 's') => self.ui.open_settings(),
            (Layout::Small, 'w') => {
                self.ui.screen = Screen::Workers;
                self.ui.focus = Focus::Workers;
            }
            (Layout::Small, 'u') => {
                self.ui.screen = Screen::Upgrades;
                self.ui.focus = Focus::Upgrades;
            }
            (Layout::Small, _) => {}
            (_, 'w') => self.ui.focus = Focus::Workers,
            (_, 'u') => self.ui.focus = Focus::Upgrades,
            (_, 'j' | 'k') => {
                let delta = if c == 'j' { 1 } else { -1 };
                match self.ui.focus {
                    Focus::Workers => self.move_workers(delta),
                    Focus::Upgrades => self.move_upgrades(delta),
                    Focus::Main => {
                        self.ui.focus = if c == 'j' { Focus::Workers } else { Focus::Upgrades };
                    }
                    Focus::Settings => {}
                }
            }
            (_, 'b') => self.buy_focused(),
            (Layout::Large, 'h') => self.toggle_show_maxed(),
            (Layout::Medium, 'h') if self.ui.focus == Focus::Upgrades => self.toggle_show_maxed(),
            _ => {}
        }
    }

    fn list_screen_key(&mut self, c: char) {
        match (self.ui.screen, self.ui.focus, c) {
            (Screen::Workers, Focus::Workers, 'j') => self.move_workers(1),
            (Screen::Workers, Focus::Workers, 'k') => self.move_workers(-1),
            (Screen::Workers, Focus::Workers, 'b') => self.buy_worker(),
            (Screen::Upgrades, Focus::Upgrades, 'j') => self.move_upgrades(1),
            (Screen::Upgrades, Focus::Upgrades, 'k') => self.move_upgrades(-1),
            (Screen::Upgrades, Focus::Upgrades, 'b') => self.buy_upgrade(),
            (Screen::Upgrades, Focus::Upgrades, 'h') => self.toggle_show_maxed(),
            _ => {}
        }
    }

    fn settings_key(&mut self, c: char) {
        let items = settings::settings_items(self.ui.identified);
        let cursor = &mut self.ui.settings_cursor;

        if c == 'j' || c == 'k' {
            let delta = if c == 'j' { 1 } else { -1 };
            cursor.selected = settings::move_selection(&items, cursor.selected, delta);
            cursor.deleting_account = false;
            return;
        }

        if cursor.deleting_account {
            match c {
                'y' if self.ui.identified => {
                    cursor.deleting_account = false;
                    self.requests.push(Request::DeleteAccount);
                }
                'y' | 'n' => cursor.deleting_account = false,
                _ => {}
            }
            return;
        }

        match items.get(cursor.selected) {
            Some(SettingsItem::Toggle { toggle, .. }) => {
                let on = toggle.get(&self.ui.settings);
                match c {
                    'e' if !on => toggle.set(&mut self.ui.settings, true),
                    'd' if on => toggle.set(&mut self.ui.settings, false),
                    _ => {}
                }
            }
            Some(SettingsItem::Action {
                action: Action::DeleteAllData,
                ..
            }) if c == 'd' => cursor.deleting_account = true,
            _ => {}
        }
    }

    fn tab(&mut self) {
        if self.ui.screen == Screen::Settings {
            let items = settings::settings_items(self.ui.identified);
            if let Some(SettingsItem::Options { choice, .. }) = items.get(self.ui.settings_cursor.selected) {
                choice.cycle(&mut self.ui.settings);
                return;
            }
        }
        self.ui.confirm_prestige = false;
        self.ui.cycle_focus();
    }
}

impl KeyHandler for Game {
    fn handle_key(&mut self, key: Key) {
        let key = match key {
            Key::Up => Key::Char('k'),
            Key::Down => Key::Char('j'),
            other => other,
        };

        if self.ui.debug {
            let minutes = match key {
                Key::Char('0') => Some(1),
                Key::Char('1') => Some(10),
                Key::Char('2') => Some(60),
                _ => None,
            };
            if let Some(minutes) = minutes {
                self.ui.confirm_prestige = false;
                self.skip_minutes(minutes);
                return;
            }
        }

        match key {
            Key::Tab => {
                self.tab();
                return;
            }
            Key::Backspace if self.ui.screen != Screen::Main => {
                self.ui.return_to_main();
                return;
            }
            _ => {}
        }

        if key == Key::Char(' ') && self.ui.screen != Screen::Settings {
            self.click();
        }

        if self.ui.confirm_prestige && self.ui.screen == Screen::Main {
            if key.lower() == Some('y') {
                match self.sim.prestige_reset() {
                    Ok(level) => info!(level, "Prestiged"),
                    Err(e) => debug!(error = %e, "Prestige refused"),
                }
            }
            self.ui.confirm_prestige = false;
            return;
        }

        let Some(c) = key.lower() else {
            return;
        };

        if c == 'p' && self.ui.screen == Screen::Main && self.sim.can_prestige() {
            self.ui.confirm_prestige = true;
            return;
        }

        match self.ui.screen {
            Screen::Main => self.main_screen_key(c),
            Screen::Workers | Screen::Upgrades => self.list_screen_key(c),
            Screen::Settings => self.settings_key(c),
        }
        self.ui.confirm_prestige = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clicker_core::math::Bytes;
    use clicker_core::persistence::SettingsSnapshot;

    fn game(width: u16, height: u16) -> Game {
        let ui = UiState::new(width, SettingsSnapshot::default(), true, false, 7);
        Game::new(SimulationState::new(), ui, width, height)
    }

    fn press(game: &mut Game, keys: &str) {
        for c in keys.chars() {
            game.handle_key(Key::Char(c));
        }
    }

    #[test]
    fn test_space_clicks_with_rate_limit() {
        let mut g = game(100, 30);
        press(&mut g, " ");
        assert_eq!(g.sim.bytes(), &Bytes::from(1u32));
        assert_eq!(g.ui.highlight_ticks, HIGHLIGHT_TICKS);
        press(&mut g, " ");
        assert_eq!(g.sim.bytes(), &Bytes::from(1u32));
        g.now_ms = 1_000;
        press(&mut g, " ");
        assert_eq!(g.sim.bytes(), &Bytes::from(2u32));
    }

    #[test]
    fn test_time_skip_disarms_prestige() {
        let ui = UiState::new(100, SettingsSnapshot::default(), true, true, 7);
        let mut g = Game::new(SimulationState::new(), ui, 100, 30);
        g.sim.set_bytes(g.sim.prestige_cost());
        press(&mut g, "p");
        assert!(g.ui.confirm_prestige);

        press(&mut g, "0");
        assert!(!g.ui.confirm_prestige);
        press(&mut g, "y");
        assert_eq!(g.sim.prestige(), 0);
    }

    #[test]
    fn test_buy_selected_worker() {
        let mut g = game(100, 30);
        g.sim.set_bytes(Bytes::from(100u32));
        press(&mut g, "b");
        assert_eq!(g.sim.worker_count(WorkerId::Intern), 1);
        assert_eq!(g.sim.bytes(), &Bytes::from(90u32));
    }

    #[test]
    fn test_small_layout_opens_list_screens() {
        let mut g = game(60, 30);
        press(&mut g, "u");
        assert_eq!(g.ui.screen, Screen::Upgrades);
        g.handle_key(Key::Backspace);
        assert_eq!(g.ui.screen, Screen::Main);
        assert_eq!(g.ui.focus, Focus::Main);
    }

    #[test]
    fn test_arrows_move_selection() {
        let mut g = game(100, 30);
        g.handle_key(Key::Down);
        g.handle_key(Key::Down);
        g.handle_key(Key::Up);
        assert_eq!(g.ui.workers.selected, 1);
    }

    #[test]
    fn test_prestige_requires_threshold_to_arm() {
        let mut g = game(100, 30);
        press(&mut g, "p");
        assert!(!g.ui.confirm_prestige);

        let cost = g.sim.prestige_cost();
        g.sim.set_bytes(cost);
        press(&mut g, "p");
        assert!(g.ui.confirm_prestige);
        press(&mut g, "y");
        assert_eq!(g.sim.prestige(), 1);
        assert!(!g.ui.confirm_prestige);
    }

    #[test]
    fn test_tab_cycles_particle_option_in_settings() {
        let mut g = game(100, 30);
        press(&mut g, "sj");
        assert_eq!(g.ui.settings_cursor.selected, 1);
        g.handle_key(Key::Tab);
        assert_eq!(g.ui.settings.particles, clicker_core::save::ParticleDensity::Reduced);
        assert_eq!(g.ui.screen, Screen::Settings);
    }

    #[test]
    fn test_toggle_enable_disable() {
        let mut g = game(100, 30);
        press(&mut g, "se");
        assert!(g.ui.settings.pure_black_background);
        press(&mut g, "e");
        assert!(g.ui.settings.pure_black_background);
        press(&mut g, "d");
        assert!(!g.ui.settings.pure_black_background);
    }

    #[test]
    fn test_debug_keys_only_in_debug() {
        let mut g = game(100, 30);
        g.sim.set_bytes(Bytes::from(100u32));
        press(&mut g, "b");
        press(&mut g, "0");
        assert_eq!(g.sim.bytes(), &Bytes::from(90u32));

        g.ui.debug = true;
        press(&mut g, "0");
        assert_eq!(g.sim.bytes(), &Bytes::from(90u32 + 60));
    }
}
