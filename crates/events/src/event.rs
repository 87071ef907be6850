/// A UI event.
///
/// Events are:
/// - **immutable** (treat them as facts about what the user did)
/// - **named** (stable identifiers for logs)
pub trait Event: Clone + core::fmt::Debug + 'static {
    /// Stable event name (e.g. "filters.category.changed").
    fn event_type(&self) -> &'static str;

    /// Whether the event can be handled before the catalog is loaded.
    fn needs_catalog(&self) -> bool {
        true
    }
}
