use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter};

/// The two externally observable flags of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "StoredState")]
pub struct FabState {
    expanded: bool,
    secondary_expanded: bool,
}

#[derive(Deserialize)]
struct StoredState {
    #[serde(default)]
    expanded: bool,
    #[serde(default)]
    secondary_expanded: bool,
}

impl From<StoredState> for FabState {
    fn from(stored: StoredState) -> Self {
        Self::new(stored.expanded, stored.secondary_expanded)
    }
}

impl FabState {
    pub const fn new(expanded: bool, secondary_expanded: bool) -> Self {
        Self {
            expanded,
            secondary_expanded: expanded && secondary_expanded,
        }
    }

    pub fn expanded(&self) -> bool {
        self.expanded
    }

    pub fn secondary_expanded(&self) -> bool {
        self.secondary_expanded
    }

    pub fn is_open(&self) -> bool {
        self.expanded || self.secondary_expanded
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
        if !expanded {
            self.secondary_expanded = false;
        }
    }

    /// Ignored while the primary layer is closed.
    pub fn set_secondary_expanded(&mut self, secondary_expanded: bool) -> bool {
        if secondary_expanded && !self.expanded {
            return false;
        }
        self.secondary_expanded = secondary_expanded;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter)]
pub enum MenuPhase {
    Collapsed,
    Expanding,
    Expanded,
    SecondaryExpanding,
    SecondaryExpanded,
    Collapsing,
    SecondaryCollapsing,
}

impl MenuPhase {
    /// Derives the visible phase from the flags and whichever layer is still animating.
    pub fn resolve(state: FabState, primary_animating: bool, secondary_animating: bool) -> Self {
        match (state.expanded, state.secondary_expanded) {
            (_, true) if secondary_animating => Self::SecondaryExpanding,
            (_, true) => Self::SecondaryExpanded,
            (_, false) if secondary_animating => Self::SecondaryCollapsing,
            (true, false) if primary_animating => Self::Expanding,
            (true, false) => Self::Expanded,
            (false, false) if primary_animating => Self::Collapsing,
            (false, false) => Self::Collapsed,
        }
    }
}
