//! End-to-end scenarios for the filter session, driven through the in-memory
//! page.

use std::time::Duration;

use serde_json::json;

use kulinastra_core::SessionId;
use kulinastra_events::{ControlEvent, PriceField};
use kulinastra_facets::{BadgeId, PanelVisibility, TransitionReason};
use kulinastra_products::{
    CatalogDocument, CatalogError, CatalogHandle, CatalogLoader, InMemoryCatalogStore,
    JsonFileCatalogStore, LoadOutcome, Product, RetryPolicy,
};
use kulinastra_storefront::{
    EventOutcome, FilterSession, InMemoryControls, InstallOutcome, RecordingRenderer,
    RenderedResults, StorefrontConfig,
};

type Session = FilterSession<InMemoryControls, RecordingRenderer>;

fn catalog_json() -> serde_json::Value {
    json!({
        "products": [
            { "id": "a", "name": "Klepon", "price": 20000, "rating": 5,
              "categories": ["manis", "nabati", "jajan"], "stock": 12 },
            { "id": "b", "name": "Rendang", "price": 50000, "rating": 4,
              "categories": ["gurih", "hewani", "makanan-berat"], "stock": 3,
              "comments": [{ "user": "sari", "text": "enak" }] },
            { "id": "c", "name": "Onde-onde", "price": 15000, "rating": 3,
              "categories": ["manis", "jajan"], "stock": 20 },
            { "id": "d", "name": "Tahu Isi", "price": 10000, "rating": 4,
              "categories": ["gurih", "nabati", "jajan"], "stock": 8 }
        ]
    })
}

fn products() -> Vec<Product> {
    CatalogDocument::from_json(&catalog_json().to_string())
        .unwrap()
        .products
}

fn session(catalog: CatalogHandle) -> Session {
    session_with(catalog, &StorefrontConfig::default())
}

fn session_with(catalog: CatalogHandle, config: &StorefrontConfig) -> Session {
    kulinastra_observability::init_for_tests();
    FilterSession::new(
        catalog,
        InMemoryControls::standard(),
        RecordingRenderer::new(),
        config,
    )
}

fn installed() -> Session {
    let mut s = session(CatalogHandle::loaded(products()));
    s.install();
    s
}

/// Perform a shopper action on the form and dispatch the resulting event.
fn act(s: &mut Session, action: impl FnOnce(&mut InMemoryControls) -> ControlEvent) -> EventOutcome {
    let event = action(s.controller_mut().controls_mut());
    s.dispatch(event).unwrap()
}

fn renderer(s: &Session) -> &RecordingRenderer {
    s.controller().renderer()
}

#[test]
fn selecting_a_category_closes_panel_and_removing_its_badge_reopens_it() {
    let mut s = installed();

    let outcome = act(&mut s, |c| c.check("manis"));
    let EventOutcome::Applied { panel, .. } = outcome else {
        panic!("expected an apply, got {outcome:?}");
    };
    assert_eq!(panel.map(|t| t.reason), Some(TransitionReason::FacetSelected));
    assert_eq!(renderer(&s).product_ids(), vec!["a", "c"]);
    assert_eq!(renderer(&s).badge_labels(), vec!["Manis"]);
    assert_eq!(renderer(&s).panel, Some(PanelVisibility::Closed));
    assert_eq!(renderer(&s).panel_glyph, Some("▼"));

    let outcome = s
        .dispatch(ControlEvent::BadgeClicked {
            badge: BadgeId::Category("manis".into()),
        })
        .unwrap();
    let EventOutcome::Applied { report, .. } = outcome else {
        panic!("expected an apply, got {outcome:?}");
    };
    let reopen = report.panel.expect("last badge removal reopens the panel");
    assert_eq!(reopen.reason, TransitionReason::LastActiveFilterRemoved);
    assert_eq!(reopen.to, PanelVisibility::Open);

    assert!(!s.controller().controls().is_checked("manis"));
    assert_eq!(renderer(&s).product_ids(), vec!["a", "b", "c", "d"]);
    assert!(renderer(&s).badge_labels().is_empty());
    assert!(!renderer(&s).badge_container_visible);
    assert_eq!(renderer(&s).panel_glyph, Some("▲"));
}

#[test]
fn categories_combine_with_and() {
    let mut s = installed();
    act(&mut s, |c| c.check("manis"));
    act(&mut s, |c| c.check("jajan"));
    assert_eq!(renderer(&s).product_ids(), vec!["a", "c"]);

    act(&mut s, |c| c.check("nabati"));
    assert_eq!(renderer(&s).product_ids(), vec!["a"]);
    assert_eq!(renderer(&s).badge_labels(), vec!["Manis", "Jajan", "Nabati"]);
}

#[test]
fn removing_one_of_several_badges_keeps_the_panel_closed() {
    let mut s = installed();
    act(&mut s, |c| c.check("gurih"));
    act(&mut s, |c| c.set_rating(true));
    assert_eq!(s.controller().panel_state(), PanelVisibility::Closed);

    let outcome = s.controller_mut().remove_badge(BadgeId::Rating);
    let EventOutcome::Applied { report, .. } = outcome else {
        panic!("expected an apply, got {outcome:?}");
    };
    assert_eq!(report.panel, None);
    assert_eq!(s.controller().controls().rating(), Some(false));
    assert_eq!(s.controller().panel_state(), PanelVisibility::Closed);
    assert_eq!(renderer(&s).badge_labels(), vec!["Gurih"]);
}

#[test]
fn price_badge_merges_bounds_and_is_relabeled_in_place() {
    let mut s = installed();

    act(&mut s, |c| c.type_price(PriceField::Min, "15000"));
    assert_eq!(renderer(&s).badge_labels(), vec!["Min Rp 15.000"]);
    assert_eq!(renderer(&s).product_ids(), vec!["a", "b", "c"]);
    let created = renderer(&s).badge_elements[&BadgeId::Price].created;

    act(&mut s, |c| c.type_price(PriceField::Max, "20000"));
    assert_eq!(renderer(&s).badge_labels(), vec!["Rp 15.000 - Rp 20.000"]);
    assert_eq!(renderer(&s).product_ids(), vec!["a", "c"]);
    assert_eq!(renderer(&s).badge_elements[&BadgeId::Price].created, created);

    // Typing never touches the panel.
    assert_eq!(s.controller().panel_state(), PanelVisibility::Open);
    assert!(renderer(&s)
        .panel_history
        .iter()
        .all(|state| *state == PanelVisibility::Open));

    s.controller_mut().remove_badge(BadgeId::Price);
    assert_eq!(s.controller().controls().price(PriceField::Min), Some(""));
    assert_eq!(s.controller().controls().price(PriceField::Max), Some(""));
    assert_eq!(renderer(&s).product_ids().len(), 4);
}

#[test]
fn malformed_price_reads_as_no_bound() {
    let mut s = installed();
    let outcome = act(&mut s, |c| c.type_price(PriceField::Max, "20rb"));
    let EventOutcome::Applied { report, .. } = outcome else {
        panic!("expected an apply, got {outcome:?}");
    };
    assert!(report.selection.is_empty());
    assert_eq!(report.matched, 4);
    assert!(renderer(&s).badge_labels().is_empty());
}

#[test]
fn unchanged_badges_keep_their_elements() {
    let mut s = installed();
    act(&mut s, |c| c.check("manis"));
    let manis = BadgeId::Category("manis".into());
    let created = renderer(&s).badge_elements[&manis].created;

    act(&mut s, |c| c.set_rating(true));
    act(&mut s, |c| c.type_price(PriceField::Min, "1000"));

    assert_eq!(renderer(&s).badge_elements[&manis].created, created);
    assert_eq!(
        renderer(&s).badge_labels(),
        vec!["Manis", "Min Rp 1.000", "Rating ⭐ 4+"]
    );
    assert_eq!(renderer(&s).product_ids(), vec!["a"]);
    assert_eq!(renderer(&s).chrome_builds, 1);
}

#[test]
fn no_matches_show_the_empty_state_message() {
    let mut s = installed();
    act(&mut s, |c| c.check("hewani"));
    act(&mut s, |c| c.check("nabati"));
    assert_eq!(
        renderer(&s).results,
        Some(RenderedResults::NoResults(
            "Tidak ada produk yang sesuai dengan filter.".to_string()
        ))
    );
}

#[test]
fn install_is_idempotent() {
    let mut s = session(CatalogHandle::loaded(products()));

    assert_eq!(s.dispatch(ControlEvent::PanelHeaderClicked), None);

    let InstallOutcome::Installed { initial } = s.install() else {
        panic!("first install must install");
    };
    assert_eq!(initial.map(|r| r.matched), Some(4));
    assert_eq!(renderer(&s).panel_history, vec![PanelVisibility::Open]);

    assert_eq!(s.install(), InstallOutcome::AlreadyInstalled);
    assert_eq!(renderer(&s).panel_history, vec![PanelVisibility::Open]);
    assert!(s.is_installed());
}

#[test]
fn events_before_the_catalog_are_replayed_after_load() {
    let catalog = CatalogHandle::new();
    let mut s = session(catalog.clone());
    assert_eq!(s.install(), InstallOutcome::Installed { initial: None });

    let outcome = act(&mut s, |c| c.check("manis"));
    assert_eq!(outcome, EventOutcome::Deferred { pending: 1 });
    assert_eq!(renderer(&s).results, None);

    // Header toggles never wait for data.
    let outcome = s.dispatch(ControlEvent::PanelHeaderClicked).unwrap();
    assert!(matches!(outcome, EventOutcome::PanelToggled(t) if t.to == PanelVisibility::Closed));

    let loader = CatalogLoader::new(
        InMemoryCatalogStore::new(products()).failing_first(1),
        RetryPolicy::default(),
    );
    let mut sleeps = Vec::new();
    let outcome = s.load_catalog(&loader, |d| sleeps.push(d));

    assert_eq!(outcome, LoadOutcome::Loaded { count: 4, attempts: 2 });
    assert_eq!(sleeps, vec![Duration::from_millis(500)]);
    assert!(catalog.is_loaded());
    assert_eq!(s.controller().pending_len(), 0);
    assert_eq!(renderer(&s).product_ids(), vec!["a", "c"]);
    assert_eq!(renderer(&s).badge_labels(), vec!["Manis"]);
    assert_eq!(s.controller().panel_state(), PanelVisibility::Closed);
}

#[test]
fn check_undone_before_load_leaves_panel_open() {
    let mut s = session(CatalogHandle::new());
    s.install();

    act(&mut s, |c| c.check("manis"));
    act(&mut s, |c| c.uncheck("manis"));
    assert_eq!(s.controller().pending_len(), 2);

    let outcomes = s.publish_catalog(products()).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| matches!(o, EventOutcome::Applied { panel: None, .. })));

    assert!(!s.controller().controls().is_checked("manis"));
    assert_eq!(s.controller().panel_state(), PanelVisibility::Open);
    assert!(renderer(&s).badge_labels().is_empty());
    assert_eq!(renderer(&s).product_ids(), vec!["a", "b", "c", "d"]);
}

#[test]
fn replay_follows_live_controls_not_queued_values() {
    let mut s = session(CatalogHandle::new());
    s.install();

    act(&mut s, |c| c.check("manis"));
    act(&mut s, |c| c.check("jajan"));
    act(&mut s, |c| c.uncheck("manis"));
    act(&mut s, |c| c.type_price(PriceField::Min, "15000"));

    let outcomes = s.publish_catalog(products()).unwrap();
    assert_eq!(outcomes.len(), 4);

    // The stale "manis" check does not close the panel; the live "jajan" one does.
    let closes: Vec<bool> = outcomes
        .iter()
        .map(|o| matches!(o, EventOutcome::Applied { panel: Some(_), .. }))
        .collect();
    assert_eq!(closes, vec![false, true, false, false]);

    assert_eq!(renderer(&s).product_ids(), vec!["a", "c"]);
    assert_eq!(renderer(&s).badge_labels(), vec!["Jajan", "Min Rp 15.000"]);
    assert_eq!(s.controller().panel_state(), PanelVisibility::Closed);
}

#[test]
fn overflowing_the_pending_queue_still_replays_the_live_selection() {
    let config = StorefrontConfig {
        pending_event_capacity: 2,
        ..StorefrontConfig::default()
    };
    let mut s = session_with(CatalogHandle::new(), &config);
    s.install();

    act(&mut s, |c| c.check("manis"));
    act(&mut s, |c| c.check("jajan"));
    let outcome = act(&mut s, |c| c.type_price(PriceField::Max, "20000"));
    assert_eq!(outcome, EventOutcome::Deferred { pending: 2 });

    let outcomes = s.publish_catalog(products()).unwrap();
    assert_eq!(outcomes.len(), 2);

    // The dropped "manis" event is still reflected: the checkbox is live.
    assert_eq!(renderer(&s).product_ids(), vec!["a", "c"]);
    assert_eq!(
        renderer(&s).badge_labels(),
        vec!["Jajan", "Manis", "Max Rp 20.000"]
    );
    assert_eq!(s.controller().panel_state(), PanelVisibility::Closed);
}

#[test]
fn inverted_price_bounds_match_nothing_and_show_as_typed() {
    let mut s = installed();
    act(&mut s, |c| c.type_price(PriceField::Min, "50000"));
    act(&mut s, |c| c.type_price(PriceField::Max, "1"));

    assert!(matches!(
        renderer(&s).results,
        Some(RenderedResults::NoResults(_))
    ));
    assert_eq!(renderer(&s).badge_labels(), vec!["Rp 50.000 - Rp 1"]);
}

#[test]
fn exhausted_load_leaves_filters_inert() {
    let mut s = session(CatalogHandle::new());
    s.install();

    let loader = CatalogLoader::new(
        InMemoryCatalogStore::new(products()).failing_first(5),
        RetryPolicy::default(),
    );
    let outcome = s.load_catalog(&loader, |_| {});
    assert!(matches!(
        outcome,
        LoadOutcome::Exhausted { attempts: 2, last_error: CatalogError::Io(_) }
    ));

    let outcome = act(&mut s, |c| c.check("manis"));
    assert!(matches!(outcome, EventOutcome::Deferred { .. }));
    assert_eq!(renderer(&s).results, None);
}

#[test]
fn loaded_empty_catalog_is_not_data_not_ready() {
    let mut s = session(CatalogHandle::new());
    s.install();

    let outcomes = s.publish_catalog(Vec::new()).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(
        renderer(&s).results,
        Some(RenderedResults::NoResults(_))
    ));
    assert_eq!(
        s.publish_catalog(products()).unwrap_err(),
        CatalogError::AlreadyLoaded
    );
}

#[test]
fn json_file_store_feeds_the_session() {
    let path = std::env::temp_dir().join(format!("kulinastra-{}.json", SessionId::new()));
    std::fs::write(&path, catalog_json().to_string()).unwrap();

    let mut s = session(CatalogHandle::new());
    s.install();
    let loader = CatalogLoader::new(JsonFileCatalogStore::new(&path), RetryPolicy::no_retry());
    let outcome = s.load_catalog(&loader, |_| {});
    std::fs::remove_file(&path).ok();

    assert_eq!(outcome, LoadOutcome::Loaded { count: 4, attempts: 1 });
    assert_eq!(renderer(&s).product_ids(), vec!["a", "b", "c", "d"]);
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    const TAGS: [&str; 6] = ["manis", "gurih", "nabati", "hewani", "jajan", "makanan-berat"];

    #[derive(Debug, Clone)]
    enum Action {
        Check(usize),
        Uncheck(usize),
        Price(PriceField, Option<u32>),
        Rating(bool),
        RemoveCategory(usize),
        RemovePrice,
        RemoveRating,
        Header,
    }

    fn arb_action() -> impl Strategy<Value = Action> {
        let field = prop_oneof![Just(PriceField::Min), Just(PriceField::Max)];
        prop_oneof![
            (0..TAGS.len()).prop_map(Action::Check),
            (0..TAGS.len()).prop_map(Action::Uncheck),
            (field, proptest::option::of(0u32..60_000)).prop_map(|(f, v)| Action::Price(f, v)),
            any::<bool>().prop_map(Action::Rating),
            (0..TAGS.len()).prop_map(Action::RemoveCategory),
            Just(Action::RemovePrice),
            Just(Action::RemoveRating),
            Just(Action::Header),
        ]
    }

    fn perform(s: &mut Session, action: Action) -> EventOutcome {
        match action {
            Action::Check(i) => act(s, |c| c.check(TAGS[i])),
            Action::Uncheck(i) => act(s, |c| c.uncheck(TAGS[i])),
            Action::Price(field, value) => {
                let text = value.map(|v| v.to_string()).unwrap_or_default();
                act(s, |c| c.type_price(field, &text))
            }
            Action::Rating(checked) => act(s, |c| c.set_rating(checked)),
            Action::RemoveCategory(i) => s.controller_mut().remove_badge(BadgeId::Category(TAGS[i].into())),
            Action::RemovePrice => s.controller_mut().remove_badge(BadgeId::Price),
            Action::RemoveRating => s.controller_mut().remove_badge(BadgeId::Rating),
            Action::Header => s.dispatch(ControlEvent::PanelHeaderClicked).unwrap(),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: badges exist exactly when filters are active, and the
        /// panel is force-opened exactly when the active signal drops.
        #[test]
        fn badges_and_panel_track_active_filters(
            actions in proptest::collection::vec(arb_action(), 1..40),
        ) {
            let mut s = installed();
            let mut was_active = false;

            for action in actions {
                match perform(&mut s, action) {
                    EventOutcome::Applied { report, .. } => {
                        let active = !report.selection.is_empty();
                        prop_assert_eq!(active, report.badges > 0);
                        prop_assert_eq!(active, !s.controller().badge_ids().is_empty());
                        prop_assert_eq!(renderer(&s).badge_labels().len(), report.badges);
                        prop_assert_eq!(renderer(&s).badge_container_visible, active);
                        prop_assert_eq!(report.panel.is_some(), was_active && !active);
                        if report.panel.is_some() {
                            prop_assert_eq!(s.controller().panel_state(), PanelVisibility::Open);
                        }
                        was_active = active;
                    }
                    EventOutcome::PanelToggled(_) => {}
                    EventOutcome::Deferred { .. } => prop_assert!(false, "catalog is loaded"),
                }
                prop_assert_eq!(renderer(&s).panel, Some(s.controller().panel_state()));
            }
        }
    }
}
