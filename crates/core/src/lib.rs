//! `kulinastra-core`: storefront foundation building blocks.
//!
//! This crate contains **pure** primitives shared by the catalog, facet and
//! storefront crates (no DOM, no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::{Entity, IdentitySet};
pub use error::{DomainError, DomainResult, FilterError, FilterResult};
pub use id::{ProductId, SessionId};
pub use value_object::ValueObject;
