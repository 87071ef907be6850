//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Facet selections, price ranges and badge descriptors are value objects:
/// two instances holding the same values are interchangeable, and a
/// "modified" value is always a freshly built one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct PriceRange { min: Option<f64>, max: Option<f64> }
///
/// impl ValueObject for PriceRange {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
