//! Entity trait: things told apart by id, not by value.

use std::collections::HashSet;
use std::hash::Hash;

/// An item with a stable identifier.
///
/// Two catalog entries with the same id are the same product, even when
/// their other fields disagree.
pub trait Entity {
    type Id: Clone + Eq + Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Admits the first entity seen for each id.
#[derive(Debug)]
pub struct IdentitySet<Id> {
    seen: HashSet<Id>,
}

impl<Id: Clone + Eq + Hash> IdentitySet<Id> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// `true` when no earlier entity carried this id.
    pub fn admit<E: Entity<Id = Id>>(&mut self, entity: &E) -> bool {
        self.seen.insert(entity.id().clone())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<Id: Clone + Eq + Hash> Default for IdentitySet<Id> {
    fn default() -> Self {
        Self::new()
    }
}
