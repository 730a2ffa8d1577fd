//! Settings screen model.
//!
//! Items are a tagged union so the list can be virtualized generically:
//! [`SettingsItem::height`] is a pure function of the item and the panel
//! width, and [`row_heights`] folds in the gaps between items.

use clicker_core::format::wrap_text;
use clicker_core::persistence::SettingsSnapshot;
use clicker_core::save::ParticleDensity;

/// A yes/no preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// [`SettingsSnapshot::pure_black_background`].
    PureBlackBackground,
}

impl Toggle {
    /// Current value.
    #[must_use]
    pub fn get(self, settings: &SettingsSnapshot) -> bool {
        match self {
            Self::PureBlackBackground => settings.pure_black_background,
        }
    }

    /// Set the value.
    pub fn set(self, settings: &mut SettingsSnapshot, value: bool) {
        match self {
            Self::PureBlackBackground => settings.pure_black_background = value,
        }
    }
}

/// A preference with several values, cycled with tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// [`SettingsSnapshot::particles`].
    Particles,
}

impl Choice {
    /// Labels of every value, in cycle order.
    #[must_use]
    pub fn options(self) -> Vec<&'static str> {
        match self {
            Self::Particles => ParticleDensity::ALL.iter().map(|d| d.label()).collect(),
        }
    }

    /// Label of the current value.
    #[must_use]
    pub fn current(self, settings: &SettingsSnapshot) -> &'static str {
        match self {
            Self::Particles => settings.particles.label(),
        }
    }

    /// Advance to the next value.
    pub fn cycle(self, settings: &mut SettingsSnapshot) {
        match self {
            Self::Particles => settings.particles = settings.particles.next(),
        }
    }
}

/// An irreversible account action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Delete the player's stored progress and disconnect.
    DeleteAllData,
}

/// One entry of the settings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    /// Checkbox.
    Toggle {
        /// Which preference.
        toggle: Toggle,
        /// Shown next to the box.
        label: &'static str,
        /// Wrapped under the label.
        description: &'static str,
    },
    /// Multiple choice.
    Options {
        /// Which preference.
        choice: Choice,
        /// Shown before the values.
        label: &'static str,
        /// Wrapped under the label.
        description: &'static str,
    },
    /// Section title. Not selectable.
    Header {
        /// Title text; empty headers take no space.
        label: &'static str,
    },
    /// Button.
    Action {
        /// What it does.
        action: Action,
        /// Button text.
        label: &'static str,
        /// Wrapped under the label.
        description: &'static str,
    },
}

impl SettingsItem {
    /// Rows the item occupies in a panel `panel_width` columns wide.
    #[must_use]
    pub fn height(&self, panel_width: usize) -> usize {
        match self {
            Self::Header { label } => usize::from(!label.is_empty()),
            Self::Toggle { description, .. }
            | Self::Options { description, .. }
            | Self::Action { description, .. } => {
                1 + description_lines(description, panel_width).len() + 1
            }
        }
    }

    /// Whether the cursor may rest on the item.
    #[must_use]
    pub const fn is_selectable(&self) -> bool {
        !matches!(self, Self::Header { .. })
    }
}

/// Description wrapped for a panel `panel_width` columns wide.
#[must_use]
pub fn description_lines(description: &str, panel_width: usize) -> Vec<String> {
    if description.is_empty() {
        return Vec::new();
    }
    wrap_text(description, panel_width.saturating_sub(4).max(1))
}

/// Items shown to a player. Account actions need an account.
#[must_use]
pub fn settings_items(identified: bool) -> Vec<SettingsItem> {
    let mut items = vec![
        SettingsItem::Toggle {
            toggle: Toggle::PureBlackBackground,
            label: "Pure black background",
            description: "Paints the whole screen black. May look better on light terminal themes.",
        },
        SettingsItem::Options {
            choice: Choice::Particles,
            label: "Falling bits",
            description: "How many falling bits are drawn. Fewer bits means fewer distractions.",
        },
    ];
    if identified {
        items.push(SettingsItem::Header { label: "Account" });
        items.push(SettingsItem::Action {
            action: Action::DeleteAllData,
            label: "Delete all data",
            description: "Deletes your progress and settings. This cannot be undone.",
        });
    }
    items
}

/// Blank rows after item `index`.
#[must_use]
pub fn gap_after(items: &[SettingsItem], index: usize, panel_width: usize) -> usize {
    if index + 1 >= items.len() || items[index].height(panel_width) == 0 {
        return 0;
    }
    match items[index] {
        SettingsItem::Header { .. } => 0,
        _ => 1,
    }
}

/// Height of each item including the gap after it, for list virtualization.
#[must_use]
pub fn row_heights(items: &[SettingsItem], panel_width: usize) -> Vec<usize> {
    (0..items.len())
        .map(|i| items[i].height(panel_width) + gap_after(items, i, panel_width))
        .collect()
}

/// Next selectable index from `current` in direction `delta`, or `current`
/// if there is none.
#[must_use]
pub fn move_selection(items: &[SettingsItem], current: usize, delta: isize) -> usize {
    let mut index = current;
    loop {
        let Some(next) = index.checked_add_signed(delta).filter(|i| *i < items.len()) else {
            return current;
        };
        if items[next].is_selectable() {
            return next;
        }
        index = next;
    }
}
