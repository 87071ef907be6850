//! Facet selection model.
//!
//! A `FacetSelection` is never stored: it is rebuilt from `ControlValues`
//! (the live state of the bound form controls) on every read.

use serde::{Deserialize, Serialize};

use kulinastra_core::{FilterError, FilterResult, ValueObject};
use kulinastra_products::CategoryTag;

/// The one supported rating threshold ("rating ≥ 4").
pub const RATING_FLOOR: u8 = 4;

/// Raw values read from the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlValues {
    /// Checked category checkboxes, in the order they were checked.
    pub checked_categories: Vec<CategoryTag>,
    /// Text of the min-price input.
    pub min_price: String,
    /// Text of the max-price input.
    pub max_price: String,
    /// Whether the "rating 4+" checkbox is checked.
    pub rating_floor: bool,
}

/// Parse a price input.
///
/// Empty input is an absent bound. Anything that is not a finite,
/// non-negative number is reported as malformed; callers treat that as
/// absent too.
pub fn parse_price_input(field: &'static str, raw: &str) -> FilterResult<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(FilterError::malformed(field, raw)),
    }
}

/// Optional lower/upper price bounds, inclusive.
///
/// Invariants: bounds are finite and non-negative, and `min` is never `0`
/// (it would not constrain anything). Bounds are kept as typed: an inverted
/// range (`min > max`) matches nothing and its badge shows both values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl PriceRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        let valid = |v: Option<f64>| v.filter(|x| x.is_finite() && *x >= 0.0);
        Self {
            min: valid(min).filter(|x| *x > 0.0),
            max: valid(max),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Both bounds set with `min > max`.
    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(lo), Some(hi)) if lo > hi)
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min.unwrap_or(0.0) && price <= self.max.unwrap_or(f64::INFINITY)
    }
}

impl ValueObject for PriceRange {}

/// Currently selected facet values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSelection {
    categories: Vec<CategoryTag>,
    price: PriceRange,
    rating_floor: bool,
}

impl FacetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from live control values.
    ///
    /// Malformed price inputs are logged and treated as absent bounds.
    pub fn from_controls(values: &ControlValues) -> Self {
        let bound = |field: &'static str, raw: &str| match parse_price_input(field, raw) {
            Ok(v) => v,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring price input");
                None
            }
        };

        let mut selection = Self::new();
        for tag in &values.checked_categories {
            selection.push_category(tag.clone());
        }
        selection.price = PriceRange::new(
            bound("min-price", &values.min_price),
            bound("max-price", &values.max_price),
        );
        selection.rating_floor = values.rating_floor;
        selection
    }

    pub fn with_category(mut self, tag: impl Into<CategoryTag>) -> Self {
        self.push_category(tag.into());
        self
    }

    pub fn with_price(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price = PriceRange::new(min, max);
        self
    }

    pub fn with_rating_floor(mut self, enabled: bool) -> Self {
        self.rating_floor = enabled;
        self
    }

    fn push_category(&mut self, tag: CategoryTag) {
        if !self.categories.contains(&tag) {
            self.categories.push(tag);
        }
    }

    /// Selected categories, in selection order, without duplicates.
    pub fn categories(&self) -> &[CategoryTag] {
        &self.categories
    }

    pub fn price(&self) -> &PriceRange {
        &self.price
    }

    pub fn rating_floor(&self) -> bool {
        self.rating_floor
    }

    /// True when no facet constrains the catalog.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.price.is_unbounded() && !self.rating_floor
    }
}

impl ValueObject for FacetSelection {}
