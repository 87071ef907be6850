use serde::{Deserialize, Serialize};

use kulinastra_facets::BadgeId;
use kulinastra_products::CategoryTag;

use crate::event::Event;

/// Which price input was edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Min,
    Max,
}

impl PriceField {
    /// DOM id of the input.
    pub fn element_id(self) -> &'static str {
        match self {
            PriceField::Min => "min-price",
            PriceField::Max => "max-price",
        }
    }
}

/// Something the shopper did to the filter UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlEvent {
    /// A category checkbox changed; `checked` is its new state.
    CategoryChanged { tag: CategoryTag, checked: bool },
    /// A price input received an `input` event.
    PriceEdited { field: PriceField },
    /// The "rating 4+" checkbox changed.
    RatingChanged { checked: bool },
    /// An active-filter badge was clicked.
    BadgeClicked { badge: BadgeId },
    /// The "Filters" header / chevron was clicked.
    PanelHeaderClicked,
}

impl ControlEvent {
    /// True for an unchecked → checked transition of a facet checkbox.
    pub fn is_facet_check(&self) -> bool {
        matches!(
            self,
            ControlEvent::CategoryChanged { checked: true, .. }
                | ControlEvent::RatingChanged { checked: true }
        )
    }
}

impl Event for ControlEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ControlEvent::CategoryChanged { .. } => "filters.category.changed",
            ControlEvent::PriceEdited { .. } => "filters.price.edited",
            ControlEvent::RatingChanged { .. } => "filters.rating.changed",
            ControlEvent::BadgeClicked { .. } => "filters.badge.clicked",
            ControlEvent::PanelHeaderClicked => "filters.panel.header_clicked",
        }
    }

    fn needs_catalog(&self) -> bool {
        !matches!(self, ControlEvent::PanelHeaderClicked)
    }
}
