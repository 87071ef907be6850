//! Synchronization controller.
//!
//! Every control change runs the same pipeline:
//!
//! 1. read the live control values into a fresh `FacetSelection`
//! 2. filter the catalog
//! 3. hand the matches (or the no-results message) to the renderer
//! 4. derive badges and patch the badge row by identity
//! 5. feed the active-filter signal to the panel state machine
//!
//! Badge removal is only a control write followed by the same pipeline.

use kulinastra_core::{FilterError, FilterResult};
use kulinastra_events::{ControlEvent, Event, PendingEvents, PriceField};
use kulinastra_facets::{
    BadgeId, BadgeRemoval, ControlValues, FacetSelection, PanelStateMachine, PanelTransition,
    PanelTrigger, PanelVisibility, RupiahFormatter, TransitionReason, derive_badges,
    has_active_filters, match_products,
};
use kulinastra_products::{CatalogHandle, CategoryTag};

use crate::config::StorefrontConfig;
use crate::ports::{ControlSurface, Renderer, ResultsView};
use crate::reconcile::BadgeBoard;

/// Summary of one pass through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    pub selection: FacetSelection,
    pub matched: usize,
    pub total: usize,
    pub badges: usize,
    /// Panel transition fired by this pass (the forced reopen).
    pub panel: Option<PanelTransition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The pipeline ran; `panel` is the transition caused by the event itself
    /// (auto-close on a checked facet), if any.
    Applied {
        report: ApplyReport,
        panel: Option<PanelTransition>,
    },
    /// Catalog not loaded yet; the event waits in the pending queue.
    Deferred { pending: usize },
    /// Only the panel changed.
    PanelToggled(PanelTransition),
}

pub struct SyncController<C, R> {
    catalog: CatalogHandle,
    controls: C,
    renderer: R,
    panel: PanelStateMachine,
    board: BadgeBoard,
    pending: PendingEvents<ControlEvent>,
    /// Category tags in the order they were checked.
    check_order: Vec<CategoryTag>,
    formatter: RupiahFormatter,
    no_results_message: String,
}

impl<C, R> SyncController<C, R>
where
    C: ControlSurface,
    R: Renderer,
{
    pub fn new(catalog: CatalogHandle, controls: C, renderer: R, config: &StorefrontConfig) -> Self {
        Self {
            catalog,
            controls,
            renderer,
            panel: PanelStateMachine::new(),
            board: BadgeBoard::new(),
            pending: PendingEvents::new(config.pending_event_capacity),
            check_order: Vec::new(),
            formatter: config.formatter(),
            no_results_message: config.no_results_message.clone(),
        }
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    /// Mutable access to the controls, for hosts that change them directly.
    /// Follow up with `handle` so the page catches up.
    pub fn controls_mut(&mut self) -> &mut C {
        &mut self.controls
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn panel_state(&self) -> PanelVisibility {
        self.panel.state()
    }

    pub fn badge_ids(&self) -> &[BadgeId] {
        self.board.ids()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Build the current selection from the live controls.
    ///
    /// Missing controls are logged and read as unset.
    pub fn read_selection(&self) -> FacetSelection {
        let checked = self.controls.checked_categories().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "category controls unavailable");
            Vec::new()
        });

        // Selection order first, then anything checked outside our events.
        let mut ordered: Vec<CategoryTag> = self
            .check_order
            .iter()
            .filter(|tag| checked.contains(tag))
            .cloned()
            .collect();
        for tag in checked {
            if !ordered.contains(&tag) {
                ordered.push(tag);
            }
        }

        let price = |field: PriceField| {
            self.controls.price_input(field).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "price input unavailable");
                String::new()
            })
        };

        let rating_floor = self.controls.rating_checked().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "rating control unavailable");
            false
        });

        FacetSelection::from_controls(&ControlValues {
            checked_categories: ordered,
            min_price: price(PriceField::Min),
            max_price: price(PriceField::Max),
            rating_floor,
        })
    }

    /// Run the pipeline against the current controls.
    ///
    /// Fails only with `DataNotReady`; rendering problems are logged and
    /// skipped.
    pub fn apply_filters(&mut self) -> FilterResult<ApplyReport> {
        if !self.catalog.is_loaded() {
            return Err(FilterError::DataNotReady);
        }

        let selection = self.read_selection();
        self.check_order
            .retain(|tag| selection.categories().contains(tag));

        let products = self.catalog.products().unwrap_or(&[]);
        let matched = match_products(products, &selection);
        let total = products.len();
        let matched_count = matched.len();

        let view = if matched.is_empty() {
            ResultsView::NoResults {
                message: &self.no_results_message,
            }
        } else {
            ResultsView::Matches(&matched)
        };
        if let Err(err) = self.renderer.render_results(view) {
            tracing::warn!(error = %err, "skipping results render");
        }

        let badges = derive_badges(&selection, &self.formatter);
        let patch = self.board.reconcile(&badges);
        if !patch.is_noop() {
            if let Err(err) = self.renderer.render_badges(&patch) {
                tracing::warn!(error = %err, "skipping badge render");
                self.board.invalidate();
            }
        }

        let active = has_active_filters(&selection);
        let panel = self.panel.fire(PanelTrigger::FiltersEvaluated { active });
        if let Some(transition) = panel {
            tracing::info!(reason = ?transition.reason, "reopening filter panel");
            self.show_panel(transition.to);
        }

        tracing::debug!(matched = matched_count, total, badges = badges.len(), active, "filters applied");

        Ok(ApplyReport {
            selection,
            matched: matched_count,
            total,
            badges: badges.len(),
            panel,
        })
    }

    /// Handle one control event.
    pub fn handle(&mut self, event: ControlEvent) -> EventOutcome {
        if let ControlEvent::PanelHeaderClicked = event {
            return EventOutcome::PanelToggled(self.toggle_panel());
        }

        if event.needs_catalog() && !self.catalog.is_loaded() {
            tracing::debug!(event_type = event.event_type(), "catalog not ready; deferring event");
            self.pending.push(event);
            return EventOutcome::Deferred {
                pending: self.pending.len(),
            };
        }

        self.handle_loaded(event)
    }

    /// Clear the control(s) behind `badge` and re-run the pipeline.
    pub fn remove_badge(&mut self, badge: BadgeId) -> EventOutcome {
        self.handle(ControlEvent::BadgeClicked { badge })
    }

    /// Flip the panel (header / chevron click).
    pub fn toggle_panel(&mut self) -> PanelTransition {
        let transition = self
            .panel
            .fire(PanelTrigger::HeaderToggled)
            .unwrap_or(PanelTransition {
                from: self.panel.state(),
                to: self.panel.state(),
                reason: TransitionReason::HeaderToggled,
            });
        self.show_panel(transition.to);
        transition
    }

    /// Push the current panel state to the renderer.
    pub fn sync_panel(&mut self) {
        self.show_panel(self.panel.state());
    }

    /// The catalog just loaded: replay deferred events, or run one apply
    /// when nothing was waiting.
    pub fn catalog_ready(&mut self) -> Vec<EventOutcome> {
        if !self.catalog.is_loaded() {
            return Vec::new();
        }

        let queued = self.pending.drain();
        if queued.is_empty() {
            return self
                .apply_filters()
                .map(|report| EventOutcome::Applied { report, panel: None })
                .into_iter()
                .collect();
        }

        tracing::info!(count = queued.len(), "replaying deferred control events");
        queued
            .into_iter()
            .map(|q| self.handle_loaded(q.event))
            .collect()
    }

    fn handle_loaded(&mut self, event: ControlEvent) -> EventOutcome {
        tracing::debug!(event_type = event.event_type(), "control event");

        match &event {
            ControlEvent::CategoryChanged { tag, checked } => self.note_category(tag, *checked),
            ControlEvent::BadgeClicked { badge } => self.clear_badge_controls(badge),
            ControlEvent::PanelHeaderClicked => {
                return EventOutcome::PanelToggled(self.toggle_panel());
            }
            ControlEvent::PriceEdited { .. } | ControlEvent::RatingChanged { .. } => {}
        }

        let report = match self.apply_filters() {
            Ok(report) => report,
            Err(_) => {
                self.pending.push(event);
                return EventOutcome::Deferred {
                    pending: self.pending.len(),
                };
            }
        };

        // A replayed check may have been undone since it was queued; only a
        // facet that is still checked closes the panel.
        let auto_close = event.is_facet_check() && facet_still_checked(&event, &report.selection);
        let panel = if auto_close {
            let transition = self.panel.fire(PanelTrigger::FacetChecked);
            if let Some(t) = transition {
                self.show_panel(t.to);
            }
            transition
        } else {
            None
        };

        EventOutcome::Applied { report, panel }
    }

    fn note_category(&mut self, tag: &CategoryTag, checked: bool) {
        self.check_order.retain(|t| t != tag);
        if checked {
            self.check_order.push(tag.clone());
        }
    }

    fn clear_badge_controls(&mut self, badge: &BadgeId) {
        let result = match badge.removal() {
            BadgeRemoval::UncheckCategory(tag) => {
                self.note_category(&tag, false);
                self.controls.set_category_checked(&tag, false)
            }
            BadgeRemoval::ClearPriceInputs => self
                .controls
                .set_price_input(PriceField::Min, "")
                .and(self.controls.set_price_input(PriceField::Max, "")),
            BadgeRemoval::UncheckRating => self.controls.set_rating_checked(false),
        };

        match result {
            Ok(()) => tracing::debug!(badge = badge.key(), "cleared badge controls"),
            Err(err) => tracing::warn!(badge = badge.key(), error = %err, "could not clear badge controls"),
        }
    }

    fn show_panel(&mut self, state: PanelVisibility) {
        if let Err(err) = self.renderer.set_panel_visibility(state) {
            tracing::warn!(error = %err, "skipping panel render");
        }
    }
}

fn facet_still_checked(event: &ControlEvent, selection: &FacetSelection) -> bool {
    match event {
        ControlEvent::CategoryChanged { tag, .. } => selection.categories().contains(tag),
        ControlEvent::RatingChanged { .. } => selection.rating_floor(),
        _ => false,
    }
}

impl<C, R> core::fmt::Debug for SyncController<C, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyncController")
            .field("catalog_loaded", &self.catalog.is_loaded())
            .field("panel", &self.panel.state())
            .field("badges", &self.board.ids())
            .field("pending", &self.pending.len())
            .finish()
    }
}
