//! Storefront UI events.
//!
//! Control events (checkbox changes, price typing, badge clicks, header
//! clicks) and the bounded queue that holds them while the catalog loads.

pub mod control;
pub mod event;
pub mod queue;

pub use control::{ControlEvent, PriceField};
pub use event::Event;
pub use queue::{PendingEvents, QueuedEvent};
