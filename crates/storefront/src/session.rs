//! Filter session: the host page's single entry point.

use std::time::Duration;

use kulinastra_core::SessionId;
use kulinastra_events::ControlEvent;
use kulinastra_products::{CatalogError, CatalogHandle, CatalogLoader, CatalogStore, LoadOutcome, Product};

use crate::config::StorefrontConfig;
use crate::controller::{ApplyReport, EventOutcome, SyncController};
use crate::ports::{ControlSurface, Renderer};

#[derive(Debug, Clone, PartialEq)]
pub enum InstallOutcome {
    /// First install. `initial` is the first apply, when the catalog was
    /// already loaded.
    Installed { initial: Option<ApplyReport> },
    /// `install` had already run; nothing was wired twice.
    AlreadyInstalled,
}

/// One filter session per page view.
#[derive(Debug)]
pub struct FilterSession<C, R> {
    id: SessionId,
    controller: SyncController<C, R>,
    installed: bool,
    span: tracing::Span,
}

impl<C, R> FilterSession<C, R>
where
    C: ControlSurface,
    R: Renderer,
{
    pub fn new(catalog: CatalogHandle, controls: C, renderer: R, config: &StorefrontConfig) -> Self {
        let id = SessionId::new();
        Self {
            id,
            controller: SyncController::new(catalog, controls, renderer, config),
            installed: false,
            span: tracing::info_span!("filter_session", session_id = %id),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn controller(&self) -> &SyncController<C, R> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SyncController<C, R> {
        &mut self.controller
    }

    /// Wire the session to the page.
    ///
    /// Safe to call repeatedly: only the first call renders the panel and
    /// runs the initial apply.
    pub fn install(&mut self) -> InstallOutcome {
        let _guard = self.span.enter();
        if self.installed {
            tracing::debug!("filter session already installed");
            return InstallOutcome::AlreadyInstalled;
        }
        self.installed = true;

        self.controller.sync_panel();

        if !self.controller.catalog().is_loaded() {
            tracing::info!("filter session installed; waiting for catalog");
            return InstallOutcome::Installed { initial: None };
        }

        let initial = self
            .controller
            .catalog_ready()
            .into_iter()
            .filter_map(|outcome| match outcome {
                EventOutcome::Applied { report, .. } => Some(report),
                _ => None,
            })
            .last();
        tracing::info!(matched = initial.as_ref().map(|r| r.matched), "filter session installed");
        InstallOutcome::Installed { initial }
    }

    /// Route a control event to the controller.
    ///
    /// Returns `None` before `install`, when no listener should exist yet.
    pub fn dispatch(&mut self, event: ControlEvent) -> Option<EventOutcome> {
        let _guard = self.span.enter();
        if !self.installed {
            tracing::debug!(?event, "ignoring event before install");
            return None;
        }
        Some(self.controller.handle(event))
    }

    /// Load the catalog through `loader`, then catch the page up.
    pub fn load_catalog<S: CatalogStore>(
        &mut self,
        loader: &CatalogLoader<S>,
        sleep: impl FnMut(Duration),
    ) -> LoadOutcome {
        let span = self.span.clone();
        let _guard = span.enter();
        let outcome = loader.load_into(self.controller.catalog(), sleep);
        if let LoadOutcome::Loaded { .. } = outcome {
            self.catalog_loaded();
        }
        outcome
    }

    /// Publish products handed over by the host (already fetched), then
    /// catch the page up.
    pub fn publish_catalog(&mut self, products: Vec<Product>) -> Result<Vec<EventOutcome>, CatalogError> {
        let span = self.span.clone();
        let _guard = span.enter();
        self.controller.catalog().publish(products)?;
        Ok(self.catalog_loaded())
    }

    fn catalog_loaded(&mut self) -> Vec<EventOutcome> {
        if !self.installed {
            return Vec::new();
        }
        self.controller.catalog_ready()
    }
}
