//! Badge derivation: one removable badge per active facet constraint.

use serde::{Deserialize, Serialize};

use kulinastra_core::ValueObject;
use kulinastra_products::CategoryTag;

use crate::format::PriceFormatter;
use crate::selection::{FacetSelection, PriceRange};

pub const RATING_BADGE_TEXT: &str = "Rating ⭐ 4+";

/// Stable badge identity, used as the reconciliation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tag", rename_all = "lowercase")]
pub enum BadgeId {
    Category(CategoryTag),
    Price,
    Rating,
}

impl BadgeId {
    /// The category tag, or the literal `"price"` / `"rating"`.
    pub fn key(&self) -> &str {
        match self {
            BadgeId::Category(tag) => tag.as_str(),
            BadgeId::Price => "price",
            BadgeId::Rating => "rating",
        }
    }

    /// Which control mutation removes this badge.
    pub fn removal(&self) -> BadgeRemoval {
        match self {
            BadgeId::Category(tag) => BadgeRemoval::UncheckCategory(tag.clone()),
            BadgeId::Price => BadgeRemoval::ClearPriceInputs,
            BadgeId::Rating => BadgeRemoval::UncheckRating,
        }
    }
}

/// The control mutation a badge click performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeRemoval {
    UncheckCategory(CategoryTag),
    /// Clears both price inputs (the price badge merges both bounds).
    ClearPriceInputs,
    UncheckRating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeDescriptor {
    pub id: BadgeId,
    pub label: String,
}

impl BadgeDescriptor {
    pub fn removal(&self) -> BadgeRemoval {
        self.id.removal()
    }
}

impl ValueObject for BadgeDescriptor {}

/// Text of the merged price badge, or `None` when no bound is set.
pub fn price_badge_text(range: &PriceRange, formatter: &dyn PriceFormatter) -> Option<String> {
    match (range.min(), range.max()) {
        (Some(min), Some(max)) => Some(format!(
            "{} - {}",
            formatter.format_price(min),
            formatter.format_price(max)
        )),
        (Some(min), None) => Some(format!("Min {}", formatter.format_price(min))),
        (None, Some(max)) => Some(format!("Max {}", formatter.format_price(max))),
        (None, None) => None,
    }
}

/// Badges for `selection`: categories in selection order, then one merged
/// price badge, then the rating badge.
pub fn derive_badges(selection: &FacetSelection, formatter: &dyn PriceFormatter) -> Vec<BadgeDescriptor> {
    let mut badges: Vec<BadgeDescriptor> = selection
        .categories()
        .iter()
        .map(|tag| BadgeDescriptor {
            id: BadgeId::Category(tag.clone()),
            label: tag.display_name().to_string(),
        })
        .collect();

    if let Some(label) = price_badge_text(selection.price(), formatter) {
        badges.push(BadgeDescriptor {
            id: BadgeId::Price,
            label,
        });
    }

    if selection.rating_floor() {
        badges.push(BadgeDescriptor {
            id: BadgeId::Rating,
            label: RATING_BADGE_TEXT.to_string(),
        });
    }

    badges
}

/// True iff `derive_badges(selection)` would be non-empty.
pub fn has_active_filters(selection: &FacetSelection) -> bool {
    !selection.is_empty()
}
