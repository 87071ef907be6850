//! Keyed reconciliation of the badge row.
//!
//! The controller keeps a `BadgeBoard` mirroring what the renderer currently
//! shows. Each apply diffs the freshly derived badges against it by
//! `BadgeId`, so unchanged badges (and their click listeners) survive.

use std::collections::HashMap;

use kulinastra_facets::{BadgeDescriptor, BadgeId};
use kulinastra_products::CategoryTag;

/// Minimal set of changes to bring the badge row up to date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgePatch {
    /// The container chrome ("Filters ›" prefix) must be created first.
    ///
    /// Also means the board starts from scratch: any keyed badge the
    /// renderer still shows is stale and must be dropped.
    pub create_chrome: bool,
    /// Whether the badge container should be shown.
    pub visible: bool,
    /// Badges to remove.
    pub removed: Vec<BadgeId>,
    /// Badges to create.
    pub added: Vec<BadgeDescriptor>,
    /// Existing badges whose text changed (e.g. a price bound was edited).
    pub relabeled: Vec<BadgeDescriptor>,
    /// Final left-to-right order of every badge.
    pub order: Vec<BadgeId>,
}

impl BadgePatch {
    /// True when applying the patch would not change the page.
    pub fn is_noop(&self) -> bool {
        !self.create_chrome
            && self.removed.is_empty()
            && self.added.is_empty()
            && self.relabeled.is_empty()
    }
}

/// Key a rendered badge element carries. Categories are prefixed so a tag
/// can never collide with `price` or `rating`.
pub fn badge_dom_key(id: &BadgeId) -> String {
    match id {
        BadgeId::Category(tag) => format!("category:{tag}"),
        other => other.key().to_string(),
    }
}

pub fn parse_badge_dom_key(key: &str) -> Option<BadgeId> {
    match key {
        "price" => Some(BadgeId::Price),
        "rating" => Some(BadgeId::Rating),
        _ => key
            .strip_prefix("category:")
            .map(|tag| BadgeId::Category(CategoryTag::from(tag))),
    }
}

#[derive(Debug, Default)]
pub struct BadgeBoard {
    labels: HashMap<BadgeId, String>,
    order: Vec<BadgeId>,
    chrome: bool,
    visible: bool,
}

impl BadgeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &BadgeId) -> bool {
        self.labels.contains_key(id)
    }

    /// Currently shown badge ids, left to right.
    pub fn ids(&self) -> &[BadgeId] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget everything the renderer was assumed to show.
    ///
    /// Used after a failed render so the next patch rebuilds from scratch.
    pub fn invalidate(&mut self) {
        self.labels.clear();
        self.order.clear();
        self.chrome = false;
        self.visible = false;
    }

    /// Diff `badges` against the board and record the new state.
    pub fn reconcile(&mut self, badges: &[BadgeDescriptor]) -> BadgePatch {
        let visible = !badges.is_empty();
        let create_chrome = visible && !self.chrome;

        let removed: Vec<BadgeId> = self
            .order
            .iter()
            .filter(|id| !badges.iter().any(|b| &b.id == *id))
            .cloned()
            .collect();

        let mut added = Vec::new();
        let mut relabeled = Vec::new();
        for badge in badges {
            match self.labels.get(&badge.id) {
                None => added.push(badge.clone()),
                Some(label) if label != &badge.label => relabeled.push(badge.clone()),
                Some(_) => {}
            }
        }

        let order: Vec<BadgeId> = badges.iter().map(|b| b.id.clone()).collect();
        let reordered = order != self.order && removed.is_empty() && added.is_empty();
        let visibility_changed = visible != self.visible;

        self.labels = badges
            .iter()
            .map(|b| (b.id.clone(), b.label.clone()))
            .collect();
        self.order = order.clone();
        self.chrome |= create_chrome;
        self.visible = visible;

        let mut patch = BadgePatch {
            create_chrome,
            visible,
            removed,
            added,
            relabeled,
            order,
        };

        // Pure reorders and visibility flips still need a render.
        if patch.is_noop() && (reordered || visibility_changed) {
            patch.relabeled = badges.to_vec();
        }
        patch
    }
}
