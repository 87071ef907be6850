//! Browser DOM adapter.
//!
//! Binds a `FilterSession` to the storefront page:
//!
//! ```javascript,ignore
//! import init, { setAllProducts, toggleFilterPanel } from './kulinastra_storefront.js';
//!
//! await init();                       // installs the session, panel open
//! const res = await fetch('data.json');
//! setAllProducts(JSON.stringify((await res.json()).products));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use kulinastra_core::{FilterError, FilterResult};
use kulinastra_events::{ControlEvent, PriceField};
use kulinastra_facets::{BadgeId, PanelVisibility, PriceFormatter, RupiahFormatter};
use kulinastra_products::{CatalogDocument, CatalogError, CatalogHandle, CategoryTag, Product};

use crate::config::StorefrontConfig;
use crate::ports::{ControlSurface, Renderer, ResultsView};
use crate::reconcile::{BadgePatch, badge_dom_key, parse_badge_dom_key};
use crate::session::FilterSession;

type WebSession = FilterSession<DomControls, DomRenderer>;

thread_local! {
    static SESSION: RefCell<Option<Rc<RefCell<WebSession>>>> = const { RefCell::new(None) };
}

const CATEGORY_SELECTOR: &str = ".filter-category";
const RATING_ID: &str = "rating4";
const BADGE_CONTAINER_ID: &str = "filter-badge-container";
const PREFIX_BADGE_ID: &str = "filter-prefix-badge";
const BADGE_KEY_ATTR: &str = "data-badge-id";

fn document() -> FilterResult<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| FilterError::missing("document"))
}

fn element(doc: &Document, id: &str) -> FilterResult<Element> {
    doc.get_element_by_id(id)
        .ok_or_else(|| FilterError::missing(format!("#{id}")))
}

fn input(doc: &Document, id: &str) -> FilterResult<HtmlInputElement> {
    element(doc, id)?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| FilterError::missing(format!("#{id}")))
}

fn category_inputs(doc: &Document) -> FilterResult<Vec<HtmlInputElement>> {
    let nodes = doc
        .query_selector_all(CATEGORY_SELECTOR)
        .map_err(|_| FilterError::missing(CATEGORY_SELECTOR))?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reads and writes the filter form.
#[derive(Debug, Default)]
pub struct DomControls;

impl ControlSurface for DomControls {
    fn checked_categories(&self) -> FilterResult<Vec<CategoryTag>> {
        Ok(category_inputs(&document()?)?
            .into_iter()
            .filter(|input| input.checked())
            .map(|input| CategoryTag::new(input.value()))
            .collect())
    }

    fn price_input(&self, field: PriceField) -> FilterResult<String> {
        Ok(input(&document()?, field.element_id())?.value())
    }

    fn rating_checked(&self) -> FilterResult<bool> {
        Ok(input(&document()?, RATING_ID)?.checked())
    }

    fn set_category_checked(&mut self, tag: &CategoryTag, checked: bool) -> FilterResult<()> {
        let doc = document()?;
        let target = category_inputs(&doc)?
            .into_iter()
            .find(|input| input.value() == tag.as_str())
            .ok_or_else(|| FilterError::missing(format!("{CATEGORY_SELECTOR}[value={tag}]")))?;
        target.set_checked(checked);
        Ok(())
    }

    fn set_price_input(&mut self, field: PriceField, value: &str) -> FilterResult<()> {
        input(&document()?, field.element_id())?.set_value(value);
        Ok(())
    }

    fn set_rating_checked(&mut self, checked: bool) -> FilterResult<()> {
        input(&document()?, RATING_ID)?.set_checked(checked);
        Ok(())
    }
}

/// Draws into `#products-container`, `#filter-badge-container` and the
/// filter sidebar.
#[derive(Debug)]
pub struct DomRenderer {
    formatter: RupiahFormatter,
}

impl DomRenderer {
    pub fn new(formatter: RupiahFormatter) -> Self {
        Self { formatter }
    }

    fn product_card(&self, product: &Product) -> String {
        let stars = "⭐".repeat(usize::from(product.rating));
        let categories = product
            .categories
            .iter()
            .map(|tag| tag.display_name().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let image = product.image.as_deref().unwrap_or_default();
        format!(
            r#"<a class="product-card-wrapper" href="product-detail.html?id={id}">
  <div class="product-image-wrapper"><img src="{image}" alt="{name}" class="product-image"></div>
  <div class="product-info">
    <h3 class="product-name">{name}</h3>
    <p class="product-price">{price}</p>
    <p class="product-rating">{stars}</p>
    <p class="product-categories">{categories}</p>
  </div>
</a>"#,
            id = escape_html(product.id.as_str()),
            image = escape_html(image),
            name = escape_html(&product.name),
            price = escape_html(&self.formatter.format_price(product.price)),
            categories = escape_html(&categories),
        )
    }

    fn badge_element(doc: &Document, id: &BadgeId, label: &str) -> FilterResult<Element> {
        let badge = doc
            .create_element("span")
            .map_err(|_| FilterError::missing("span"))?;
        badge.set_class_name("filter-badge");
        badge
            .set_attribute(BADGE_KEY_ATTR, &badge_dom_key(id))
            .map_err(|_| FilterError::missing("span"))?;
        set_badge_label(&badge, label);
        Ok(badge)
    }
}

fn set_badge_label(badge: &Element, label: &str) {
    badge.set_inner_html(&format!(
        r#"{} <span class="badge-remove">×</span>"#,
        escape_html(label)
    ));
}

/// Every keyed badge element in `container`, in document order.
fn keyed_badges(container: &Element) -> Vec<Element> {
    container
        .query_selector_all(&format!("[{BADGE_KEY_ATTR}]"))
        .map(|nodes| {
            (0..nodes.length())
                .filter_map(|i| nodes.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect()
        })
        .unwrap_or_default()
}

// Compared attribute by attribute so tags never end up inside a selector.
fn find_badge(container: &Element, id: &BadgeId) -> Option<Element> {
    let key = badge_dom_key(id);
    keyed_badges(container)
        .into_iter()
        .find(|el| el.get_attribute(BADGE_KEY_ATTR).as_deref() == Some(key.as_str()))
}

impl Renderer for DomRenderer {
    fn render_results(&mut self, view: ResultsView<'_>) -> FilterResult<()> {
        let doc = document()?;
        let container = element(&doc, "products-container")?;
        let html = match view {
            ResultsView::Matches(products) => products
                .iter()
                .map(|p| self.product_card(p))
                .collect::<String>(),
            ResultsView::NoResults { message } => format!(
                r#"<div class="text-center text-muted no-results">{}</div>"#,
                escape_html(message)
            ),
        };
        container.set_inner_html(&html);
        Ok(())
    }

    fn render_badges(&mut self, patch: &BadgePatch) -> FilterResult<()> {
        let doc = document()?;
        let container = element(&doc, BADGE_CONTAINER_ID)?;

        if patch.create_chrome {
            // Leftovers from a render that failed halfway.
            for stale in keyed_badges(&container) {
                stale.remove();
            }
        }
        if patch.create_chrome && doc.get_element_by_id(PREFIX_BADGE_ID).is_none() {
            let prefix = doc
                .create_element("span")
                .map_err(|_| FilterError::missing(PREFIX_BADGE_ID))?;
            prefix.set_id(PREFIX_BADGE_ID);
            prefix.set_inner_html(r#"<span>Filters</span><span class="badge-separator">›</span>"#);
            container
                .append_child(&prefix)
                .map_err(|_| FilterError::missing(PREFIX_BADGE_ID))?;
        }

        for id in &patch.removed {
            if let Some(el) = find_badge(&container, id) {
                el.remove();
            }
        }
        for badge in &patch.added {
            let el = Self::badge_element(&doc, &badge.id, &badge.label)?;
            container
                .append_child(&el)
                .map_err(|_| FilterError::missing(BADGE_CONTAINER_ID))?;
        }
        for badge in &patch.relabeled {
            if let Some(el) = find_badge(&container, &badge.id) {
                set_badge_label(&el, &badge.label);
            }
        }
        // Re-appending an attached node moves it; the prefix stays first.
        for id in &patch.order {
            if let Some(el) = find_badge(&container, id) {
                let _ = container.append_child(&el);
            }
        }

        if let Some(html) = container.dyn_ref::<HtmlElement>() {
            html.set_hidden(!patch.visible);
        }
        Ok(())
    }

    fn set_panel_visibility(&mut self, state: PanelVisibility) -> FilterResult<()> {
        let doc = document()?;
        let sidebar = element(&doc, "filter-sidebar")?;
        let closed = !state.is_open();
        let _ = sidebar.class_list().toggle_with_force("hidden", closed);

        match doc.get_element_by_id("products-column") {
            Some(column) => {
                let _ = column.class_list().toggle_with_force("full-width", closed);
            }
            None => tracing::debug!("#products-column missing; leaving layout alone"),
        }
        if let Some(icon) = doc.get_element_by_id("filter-icon") {
            icon.set_text_content(Some(state.glyph()));
        }
        Ok(())
    }
}

fn with_session(f: impl FnOnce(&mut WebSession)) {
    let session = SESSION.with(|slot| slot.borrow().clone());
    let Some(session) = session else {
        tracing::debug!("no filter session installed");
        return;
    };
    match session.try_borrow_mut() {
        Ok(mut session) => f(&mut session),
        Err(_) => tracing::warn!("filter session busy; dropping re-entrant call"),
    };
}

fn listen(target: &web_sys::EventTarget, kind: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    if target
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .is_err()
    {
        tracing::warn!(kind, "could not register listener");
    }
    // Listeners live as long as the page.
    closure.forget();
}

fn wire_listeners(doc: &Document) -> FilterResult<()> {
    for checkbox in category_inputs(doc)? {
        let tag = CategoryTag::new(checkbox.value());
        let source = checkbox.clone();
        listen(&checkbox, "change", move |_| {
            let event = ControlEvent::CategoryChanged {
                tag: tag.clone(),
                checked: source.checked(),
            };
            with_session(|s| {
                s.dispatch(event);
            });
        });
    }

    for field in [PriceField::Min, PriceField::Max] {
        match input(doc, field.element_id()) {
            Ok(el) => listen(&el, "input", move |_| {
                with_session(|s| {
                    s.dispatch(ControlEvent::PriceEdited { field });
                });
            }),
            Err(err) => tracing::warn!(error = %err, "price input not wired"),
        }
    }

    match input(doc, RATING_ID) {
        Ok(el) => {
            let source = el.clone();
            listen(&el, "change", move |_| {
                let checked = source.checked();
                with_session(|s| {
                    s.dispatch(ControlEvent::RatingChanged { checked });
                });
            });
        }
        Err(err) => tracing::warn!(error = %err, "rating control not wired"),
    }

    // One delegated listener serves every badge, present and future.
    match element(doc, BADGE_CONTAINER_ID) {
        Ok(container) => listen(&container, "click", |ev| {
            let badge = ev
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&format!("[{BADGE_KEY_ATTR}]")).ok().flatten())
                .and_then(|el| el.get_attribute(BADGE_KEY_ATTR))
                .and_then(|key| parse_badge_dom_key(&key));
            if let Some(badge) = badge {
                with_session(|s| {
                    s.dispatch(ControlEvent::BadgeClicked { badge });
                });
            }
        }),
        Err(err) => tracing::warn!(error = %err, "badge container not wired"),
    }

    Ok(())
}

/// Install the filter session once per page.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if SESSION.with(|slot| slot.borrow().is_some()) {
        return Ok(());
    }

    let config = StorefrontConfig::default();
    let mut session = FilterSession::new(
        CatalogHandle::new(),
        DomControls,
        DomRenderer::new(config.formatter()),
        &config,
    );
    session.install();

    let doc = document().map_err(|e| JsValue::from_str(&e.to_string()))?;
    wire_listeners(&doc).map_err(|e| JsValue::from_str(&e.to_string()))?;

    SESSION.with(|slot| *slot.borrow_mut() = Some(Rc::new(RefCell::new(session))));
    Ok(())
}

/// Hand the fetched catalog to the filters.
///
/// Accepts either the product array or the `{ "products": [...] }` document.
#[wasm_bindgen(js_name = setAllProducts)]
pub fn set_all_products(json: &str) -> Result<(), JsValue> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let document = match value {
        serde_json::Value::Array(products) => serde_json::json!({ "products": products }),
        other => other,
    };
    let catalog = CatalogDocument::from_json(&document.to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mut result = Ok(());
    with_session(|s| match s.publish_catalog(catalog.products) {
        Ok(_) => {}
        Err(CatalogError::AlreadyLoaded) => tracing::warn!("catalog already published; ignoring"),
        Err(err) => result = Err(JsValue::from_str(&err.to_string())),
    });
    result
}

/// Header click handler for the filter panel.
#[wasm_bindgen(js_name = toggleFilterPanel)]
pub fn toggle_filter_panel() {
    with_session(|s| {
        s.dispatch(ControlEvent::PanelHeaderClicked);
    });
}
