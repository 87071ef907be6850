//! Facet filtering for the product catalog.
//!
//! Pure, deterministic logic only: the facet selection model, the filter
//! engine, badge derivation and the filter-panel visibility state machine.
//! Reading controls and drawing the page belongs to `kulinastra-storefront`.

pub mod badges;
pub mod engine;
pub mod format;
pub mod panel;
pub mod selection;

pub use badges::{
    BadgeDescriptor, BadgeId, BadgeRemoval, RATING_BADGE_TEXT, derive_badges, has_active_filters,
    price_badge_text,
};
pub use engine::{match_products, matches};
pub use format::{PriceFormatter, RupiahFormatter};
pub use panel::{PanelStateMachine, PanelTransition, PanelTrigger, PanelVisibility, TransitionReason};
pub use selection::{ControlValues, FacetSelection, PriceRange, RATING_FLOOR, parse_price_input};
