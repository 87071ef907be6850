//! `kulinastra-storefront`
//!
//! **Responsibility:** keep the product grid, the active-filter badges and the
//! collapsible filter panel consistent with the filter controls.
//!
//! This crate provides:
//! - The synchronization controller (read controls → filter → render →
//!   badges → panel)
//! - Ports for the controls and the renderer, plus in-memory adapters
//! - Keyed badge reconciliation
//! - The session bootstrap entry point and its configuration
//! - A browser DOM adapter (`wasm32` only)

pub mod config;
pub mod controller;
pub mod page;
pub mod ports;
pub mod reconcile;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::StorefrontConfig;
pub use controller::{ApplyReport, EventOutcome, SyncController};
pub use page::{InMemoryControls, RecordingRenderer, RenderedResults};
pub use ports::{ControlSurface, Renderer, ResultsView};
pub use reconcile::{BadgeBoard, BadgePatch};
pub use session::{FilterSession, InstallOutcome};
