//! Seams between the controller and the page.
//!
//! `ControlSurface` is the source of truth for the facet selection: the
//! controller never caches control values, it reads them through this trait
//! on every apply. `Renderer` receives everything the controller draws.

use kulinastra_core::FilterResult;
use kulinastra_events::PriceField;
use kulinastra_facets::PanelVisibility;
use kulinastra_products::{CategoryTag, Product};

use crate::reconcile::BadgePatch;

/// The bound filter form controls.
///
/// Reads and writes fail with `FilterError::MissingDomTarget` when the
/// control is not on the page.
pub trait ControlSurface {
    /// Values of the checked category checkboxes, in document order.
    fn checked_categories(&self) -> FilterResult<Vec<CategoryTag>>;

    /// Raw text of a price input.
    fn price_input(&self, field: PriceField) -> FilterResult<String>;

    /// Whether the "rating 4+" checkbox is checked.
    fn rating_checked(&self) -> FilterResult<bool>;

    fn set_category_checked(&mut self, tag: &CategoryTag, checked: bool) -> FilterResult<()>;

    fn set_price_input(&mut self, field: PriceField, value: &str) -> FilterResult<()>;

    fn set_rating_checked(&mut self, checked: bool) -> FilterResult<()>;
}

/// What the results region should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultsView<'a> {
    Matches(&'a [&'a Product]),
    /// Explicit empty state; never an empty region.
    NoResults { message: &'a str },
}

/// Draws results, badges and the panel.
pub trait Renderer {
    /// Replace the results region wholesale.
    fn render_results(&mut self, view: ResultsView<'_>) -> FilterResult<()>;

    /// Apply a keyed badge patch to the badge container.
    fn render_badges(&mut self, patch: &BadgePatch) -> FilterResult<()>;

    /// Show or hide the panel and update its chevron.
    fn set_panel_visibility(&mut self, state: PanelVisibility) -> FilterResult<()>;
}
