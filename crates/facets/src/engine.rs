//! Facet filter engine.

use kulinastra_products::Product;

use crate::selection::{FacetSelection, RATING_FLOOR};

/// Does `product` satisfy every facet of `selection`?
///
/// Categories are conjunctive: the product must carry all selected tags.
/// Products with a negative or non-finite price never match.
pub fn matches(product: &Product, selection: &FacetSelection) -> bool {
    let category_match = selection
        .categories()
        .iter()
        .all(|tag| product.has_category(tag));

    let price_match = product.price.is_finite()
        && product.price >= 0.0
        && selection.price().contains(product.price);

    let rating_match = !selection.rating_floor() || product.rating >= RATING_FLOOR;

    category_match && price_match && rating_match
}

/// Products matching `selection`, in catalog order.
pub fn match_products<'a>(products: &'a [Product], selection: &FacetSelection) -> Vec<&'a Product> {
    products.iter().filter(|p| matches(p, selection)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kulinastra_core::ProductId;
    use kulinastra_products::CategoryTag;

    fn product(id: &str, price: f64, rating: u8, categories: &[&str]) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            name: id.to_uppercase(),
            price,
            rating,
            categories: categories.iter().map(|c| CategoryTag::from(*c)).collect(),
            stock: 1,
            description: String::new(),
            image: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("a", 20000.0, 5, &["manis"]),
            product("b", 50000.0, 3, &["gurih"]),
        ]
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn category_and_rating_scenario() {
        let catalog = catalog();
        let selection = FacetSelection::new()
            .with_category("manis")
            .with_rating_floor(true);
        assert_eq!(ids(&match_products(&catalog, &selection)), vec!["a"]);
    }

    #[test]
    fn min_price_scenario() {
        let catalog = catalog();
        let selection = FacetSelection::new().with_price(Some(25000.0), None);
        assert_eq!(ids(&match_products(&catalog, &selection)), vec!["b"]);
    }

    #[test]
    fn categories_are_conjunctive() {
        let klepon = product("k", 5000.0, 4, &["manis", "jajan"]);
        let both = FacetSelection::new().with_category("manis").with_category("jajan");
        let other = FacetSelection::new().with_category("manis").with_category("hewani");
        assert!(matches(&klepon, &both));
        assert!(!matches(&klepon, &other));
    }

    #[test]
    fn empty_selection_returns_catalog_unchanged() {
        let catalog = vec![
            product("free", 0.0, 1, &[]),
            product("a", 20000.0, 5, &["manis"]),
            product("b", 50000.0, 3, &["gurih"]),
        ];
        let matched = match_products(&catalog, &FacetSelection::new());
        assert_eq!(ids(&matched), vec!["free", "a", "b"]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let catalog = catalog();
        let selection = FacetSelection::new().with_price(Some(20000.0), Some(50000.0));
        assert_eq!(match_products(&catalog, &selection).len(), 2);
    }

    #[test]
    fn negative_prices_and_unknown_categories_never_match() {
        let broken = product("x", -1.0, 5, &["pedas"]);
        assert!(!matches(&broken, &FacetSelection::new()));
        let fine = product("y", 1.0, 5, &["manis"]);
        assert!(!matches(&fine, &FacetSelection::new().with_category("pedas")));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        const TAGS: [&str; 6] = ["manis", "gurih", "nabati", "hewani", "jajan", "makanan-berat"];

        fn arb_product() -> impl Strategy<Value = Product> {
            (
                "[a-z]{1,8}",
                0u32..200_000,
                1u8..=5,
                proptest::sample::subsequence(TAGS.to_vec(), 0..=3),
            )
                .prop_map(|(id, price, rating, tags)| product(&id, price as f64, rating, &tags))
        }

        fn arb_selection() -> impl Strategy<Value = FacetSelection> {
            (
                proptest::sample::subsequence(TAGS.to_vec(), 0..=2),
                proptest::option::of(0u32..200_000),
                proptest::option::of(0u32..200_000),
                any::<bool>(),
            )
                .prop_map(|(tags, min, max, rating)| {
                    let mut selection = FacetSelection::new()
                        .with_price(min.map(f64::from), max.map(f64::from))
                        .with_rating_floor(rating);
                    for tag in tags {
                        selection = selection.with_category(tag);
                    }
                    selection
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: filtering an already-filtered list again changes nothing.
            #[test]
            fn match_is_idempotent(
                catalog in proptest::collection::vec(arb_product(), 0..20),
                selection in arb_selection(),
            ) {
                let once: Vec<Product> = match_products(&catalog, &selection)
                    .into_iter()
                    .cloned()
                    .collect();
                let twice: Vec<Product> = match_products(&once, &selection)
                    .into_iter()
                    .cloned()
                    .collect();
                prop_assert_eq!(once, twice);
            }

            /// Property: output is an order-preserving subsequence of the input.
            #[test]
            fn match_preserves_input_order(
                catalog in proptest::collection::vec(arb_product(), 0..20),
                selection in arb_selection(),
            ) {
                let matched = match_products(&catalog, &selection);
                let mut cursor = catalog.iter();
                for m in matched {
                    prop_assert!(cursor.any(|p| std::ptr::eq(p, m)));
                }
            }

            /// Property: with no price bounds every non-negative price passes.
            #[test]
            fn absent_bounds_match_all_prices(product in arb_product()) {
                let selection = FacetSelection::new();
                prop_assert!(matches(&product, &selection));
            }
        }
    }
}
