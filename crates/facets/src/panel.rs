//! Filter-panel visibility state machine.
//!
//! ```text
//!            HeaderToggled / FacetChecked
//!   Open ─────────────────────────────────▶ Closed
//!    ▲                                        │
//!    └──── HeaderToggled / last filter gone ──┘
//! ```
//!
//! The machine lives as long as the page; there is no terminal state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelVisibility {
    #[default]
    Open,
    Closed,
}

impl PanelVisibility {
    pub fn is_open(self) -> bool {
        self == PanelVisibility::Open
    }

    pub fn toggled(self) -> Self {
        match self {
            PanelVisibility::Open => PanelVisibility::Closed,
            PanelVisibility::Closed => PanelVisibility::Open,
        }
    }

    /// Chevron shown next to the "Filters" header.
    pub fn glyph(self) -> &'static str {
        match self {
            PanelVisibility::Open => "▲",
            PanelVisibility::Closed => "▼",
        }
    }
}

/// Inputs to the panel machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTrigger {
    /// The "Filters" header or chevron was clicked.
    HeaderToggled,
    /// A category or rating checkbox went from unchecked to checked.
    FacetChecked,
    /// The pipeline re-evaluated the selection.
    FiltersEvaluated { active: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    HeaderToggled,
    FacetSelected,
    LastActiveFilterRemoved,
}

/// A fired transition. `from == to` is possible for the forced reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelTransition {
    pub from: PanelVisibility,
    pub to: PanelVisibility,
    pub reason: TransitionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelStateMachine {
    state: PanelVisibility,
    filters_active: bool,
}

impl PanelStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PanelVisibility {
        self.state
    }

    /// Whether the last evaluated selection had any active filter.
    pub fn filters_active(&self) -> bool {
        self.filters_active
    }

    /// Feed a trigger; returns the transition if a rule fired.
    pub fn fire(&mut self, trigger: PanelTrigger) -> Option<PanelTransition> {
        let from = self.state;
        let (to, reason) = match trigger {
            PanelTrigger::HeaderToggled => (from.toggled(), TransitionReason::HeaderToggled),
            PanelTrigger::FacetChecked => (PanelVisibility::Closed, TransitionReason::FacetSelected),
            PanelTrigger::FiltersEvaluated { active } => {
                let was_active = std::mem::replace(&mut self.filters_active, active);
                if !(was_active && !active) {
                    return None;
                }
                (PanelVisibility::Open, TransitionReason::LastActiveFilterRemoved)
            }
        };

        self.state = to;
        Some(PanelTransition { from, to, reason })
    }
}
