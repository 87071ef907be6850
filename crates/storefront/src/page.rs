//! In-memory page for tests/dev.
//!
//! `InMemoryControls` behaves like the filter form: its helpers mutate a
//! control and return the event the browser would fire. `RecordingRenderer`
//! keeps what a real page would display, keyed the same way the DOM adapter
//! keys badge elements.

use std::collections::HashMap;

use kulinastra_core::{FilterError, FilterResult};
use kulinastra_events::{ControlEvent, PriceField};
use kulinastra_facets::{BadgeId, PanelVisibility};
use kulinastra_products::{Category, CategoryTag};

use crate::ports::{ControlSurface, Renderer, ResultsView};
use crate::reconcile::BadgePatch;

#[derive(Debug, Clone, Default)]
pub struct InMemoryControls {
    /// Category checkboxes in document order.
    categories: Vec<(CategoryTag, bool)>,
    /// `None` models an input missing from the page.
    min_price: Option<String>,
    max_price: Option<String>,
    rating: Option<bool>,
}

impl InMemoryControls {
    /// A form with one checkbox per tag, both price inputs and the rating box.
    pub fn new(tags: impl IntoIterator<Item = CategoryTag>) -> Self {
        Self {
            categories: tags.into_iter().map(|t| (t, false)).collect(),
            min_price: Some(String::new()),
            max_price: Some(String::new()),
            rating: Some(false),
        }
    }

    /// The storefront form: the full category vocabulary.
    pub fn standard() -> Self {
        Self::new(Category::ALL.into_iter().map(CategoryTag::from))
    }

    pub fn without_price_inputs(mut self) -> Self {
        self.min_price = None;
        self.max_price = None;
        self
    }

    pub fn without_rating(mut self) -> Self {
        self.rating = None;
        self
    }

    pub fn is_checked(&self, tag: &str) -> bool {
        self.categories
            .iter()
            .any(|(t, checked)| t.as_str() == tag && *checked)
    }

    pub fn price(&self, field: PriceField) -> Option<&str> {
        match field {
            PriceField::Min => self.min_price.as_deref(),
            PriceField::Max => self.max_price.as_deref(),
        }
    }

    pub fn rating(&self) -> Option<bool> {
        self.rating
    }

    /// Shopper checks a category box.
    pub fn check(&mut self, tag: &str) -> ControlEvent {
        self.click_category(tag, true)
    }

    /// Shopper unchecks a category box.
    pub fn uncheck(&mut self, tag: &str) -> ControlEvent {
        self.click_category(tag, false)
    }

    /// Shopper types into a price input (replacing its text).
    pub fn type_price(&mut self, field: PriceField, text: &str) -> ControlEvent {
        let _ = self.set_price_input(field, text);
        ControlEvent::PriceEdited { field }
    }

    /// Shopper clicks the rating box.
    pub fn set_rating(&mut self, checked: bool) -> ControlEvent {
        let _ = self.set_rating_checked(checked);
        ControlEvent::RatingChanged { checked }
    }

    fn click_category(&mut self, tag: &str, checked: bool) -> ControlEvent {
        let tag = CategoryTag::from(tag);
        let _ = self.set_category_checked(&tag, checked);
        ControlEvent::CategoryChanged { tag, checked }
    }
}

impl ControlSurface for InMemoryControls {
    fn checked_categories(&self) -> FilterResult<Vec<CategoryTag>> {
        Ok(self
            .categories
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(tag, _)| tag.clone())
            .collect())
    }

    fn price_input(&self, field: PriceField) -> FilterResult<String> {
        self.price(field)
            .map(str::to_string)
            .ok_or_else(|| FilterError::missing(format!("#{}", field.element_id())))
    }

    fn rating_checked(&self) -> FilterResult<bool> {
        self.rating.ok_or_else(|| FilterError::missing("#rating4"))
    }

    fn set_category_checked(&mut self, tag: &CategoryTag, checked: bool) -> FilterResult<()> {
        let slot = self
            .categories
            .iter_mut()
            .find(|(t, _)| t == tag)
            .ok_or_else(|| FilterError::missing(format!("#{tag}")))?;
        slot.1 = checked;
        Ok(())
    }

    fn set_price_input(&mut self, field: PriceField, value: &str) -> FilterResult<()> {
        let slot = match field {
            PriceField::Min => &mut self.min_price,
            PriceField::Max => &mut self.max_price,
        };
        match slot {
            Some(text) => {
                *text = value.to_string();
                Ok(())
            }
            None => Err(FilterError::missing(format!("#{}", field.element_id()))),
        }
    }

    fn set_rating_checked(&mut self, checked: bool) -> FilterResult<()> {
        match &mut self.rating {
            Some(value) => {
                *value = checked;
                Ok(())
            }
            None => Err(FilterError::missing("#rating4")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedResults {
    Products(Vec<String>),
    NoResults(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeElement {
    pub label: String,
    /// Creation sequence number; unchanged while the element survives.
    pub created: u64,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub results: Option<RenderedResults>,
    pub badge_elements: HashMap<BadgeId, BadgeElement>,
    pub badge_order: Vec<BadgeId>,
    pub badge_container_visible: bool,
    pub chrome_builds: u32,
    pub panel: Option<PanelVisibility>,
    pub panel_glyph: Option<&'static str>,
    /// Every visibility write, in order.
    pub panel_history: Vec<PanelVisibility>,
    next_element: u64,
    has_badge_container: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            has_badge_container: true,
            ..Default::default()
        }
    }

    /// Simulate a page without `#filter-badge-container`.
    pub fn without_badge_container(mut self) -> Self {
        self.has_badge_container = false;
        self
    }

    /// Add or remove `#filter-badge-container` (pages render in stages).
    pub fn set_badge_container(&mut self, present: bool) {
        self.has_badge_container = present;
    }

    pub fn product_ids(&self) -> Vec<String> {
        match &self.results {
            Some(RenderedResults::Products(ids)) => ids.clone(),
            _ => Vec::new(),
        }
    }

    /// Badge labels left to right.
    pub fn badge_labels(&self) -> Vec<String> {
        self.badge_order
            .iter()
            .filter_map(|id| self.badge_elements.get(id))
            .map(|el| el.label.clone())
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render_results(&mut self, view: ResultsView<'_>) -> FilterResult<()> {
        self.results = Some(match view {
            ResultsView::Matches(products) => {
                RenderedResults::Products(products.iter().map(|p| p.id.to_string()).collect())
            }
            ResultsView::NoResults { message } => RenderedResults::NoResults(message.to_string()),
        });
        Ok(())
    }

    fn render_badges(&mut self, patch: &BadgePatch) -> FilterResult<()> {
        if !self.has_badge_container {
            return Err(FilterError::missing("#filter-badge-container"));
        }

        if patch.create_chrome {
            self.chrome_builds += 1;
            self.badge_elements.clear();
        }
        for id in &patch.removed {
            self.badge_elements.remove(id);
        }
        for badge in &patch.added {
            self.next_element += 1;
            self.badge_elements.insert(
                badge.id.clone(),
                BadgeElement {
                    label: badge.label.clone(),
                    created: self.next_element,
                },
            );
        }
        for badge in &patch.relabeled {
            if let Some(el) = self.badge_elements.get_mut(&badge.id) {
                el.label = badge.label.clone();
            }
        }
        self.badge_order = patch.order.clone();
        self.badge_container_visible = patch.visible;
        Ok(())
    }

    fn set_panel_visibility(&mut self, state: PanelVisibility) -> FilterResult<()> {
        self.panel = Some(state);
        self.panel_glyph = Some(state.glyph());
        self.panel_history.push(state);
        Ok(())
    }
}
