//! Integration tests for carts that span several requests.
//!
//! Every block below that loads a cart stands for one request: the cart is
//! built from the session, used, and dropped, while the session carries the
//! state forward.

use carton::catalog::SimpleProduct;
use carton::{
    Cart, CartConfig, CartError, CatalogProduct, MemorySession, SessionStore, VariantAttributes,
};
use carton_core::{AttributeValue, Price, ProductId};
use carton_integration_tests::{
    CountingCatalog, OfflineCatalog, ReadOnlySession, active_catalog, active_product,
};
use serde_json::{Value, json};

fn price(s: &str) -> Option<Price> {
    Price::parse(s).ok()
}

fn variant(pairs: &[(&str, &str)]) -> VariantAttributes {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), AttributeValue::from(*v)))
        .collect()
}

fn stored_json(session: &MemorySession, key: &str) -> Value {
    let blob = session
        .get(key)
        .expect("session read failed")
        .expect("cart not stored");
    serde_json::from_str(&blob).expect("stored cart is not JSON")
}

// ============================================================================
// Session format
// ============================================================================

#[test]
fn test_session_blob_matches_wire_format() {
    let catalog = active_catalog(2);
    let mut session = MemorySession::new();
    let config = CartConfig::default();

    {
        let mut cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
        cart.add(&active_product(1), price("10.00"), 2, &variant(&[("size", "M"), ("color", "red")]))
            .expect("add failed");
        cart.add(&active_product(2), price("5.50"), 1, &VariantAttributes::new())
            .expect("add failed");
    }

    assert_eq!(
        stored_json(&session, "CART"),
        json!([
            {"key": {"_pk": 1, "color": "red", "size": "M"}, "value": {"quantity": 2, "price": "10.00"}},
            {"key": {"_pk": 2}, "value": {"quantity": 1, "price": "5.50"}}
        ])
    );
    assert!(session.is_modified());
}

#[test]
fn test_hand_written_blob_with_numeric_prices_loads() {
    let catalog = active_catalog(3);
    let mut session = MemorySession::new();
    session
        .insert(
            "CART",
            json!([
                {"key": {"_pk": 3, "size": "L"}, "value": {"quantity": 2, "price": 7.25}},
                {"key": {"_pk": 1}, "value": {"quantity": 1, "price": "0.50"}}
            ])
            .to_string(),
        )
        .expect("seed failed");

    let cart = Cart::load(&mut session, &catalog, &CartConfig::default()).expect("load failed");
    assert_eq!(cart.unique_count(), 2);
    assert_eq!(cart.total(), Price::parse("15.00").expect("bad price"));
    let first = cart.items().first().expect("no lines");
    assert_eq!(first.product().primary_key(), ProductId::new(3));
    assert_eq!(first.attributes(), variant(&[("size", "L")]));
}

// ============================================================================
// Request sequences
// ============================================================================

#[test]
fn test_shopping_session_across_requests() {
    let catalog = active_catalog(3);
    let mut session = MemorySession::new();
    let config = CartConfig::default();
    let tee = active_product(1);
    let mug = active_product(2);

    // Request 1: add a medium tee.
    {
        let mut cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
        cart.add(&tee, price("25.00"), 1, &variant(&[("size", "M")]))
            .expect("add failed");
    }

    // Request 2: another medium tee (the price is ignored), and a mug.
    {
        let mut cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
        cart.add(&tee, price("1.00"), 1, &variant(&[("size", "M")]))
            .expect("add failed");
        cart.add(&mug, price("8.00"), 2, &VariantAttributes::new())
            .expect("add failed");
    }

    // Request 3: one mug back, and look at the cart.
    {
        let mut cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
        cart.remove_single(&mug, &VariantAttributes::new())
            .expect("remove failed");

        assert_eq!(cart.count(), 3);
        assert_eq!(cart.unique_count(), 2);
        assert_eq!(cart.total(), Price::parse("58.00").expect("bad price"));
        assert!(cart.contains(&tee));
        assert!(!cart.contains(&active_product(3)));
    }

    // Request 4: checkout empties the cart.
    {
        let mut cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
        cart.clear().expect("clear failed");
    }

    let cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
    assert!(cart.is_empty());
    assert_eq!(cart.total(), Price::ZERO);
}

#[test]
fn test_cart_and_wishlist_share_a_session() {
    let catalog = active_catalog(2);
    let mut session = MemorySession::new();
    let cart_config = CartConfig::default();
    let wishlist_config = CartConfig::default().with_session_key("wishlist");

    {
        let mut cart = Cart::load(&mut session, &catalog, &cart_config).expect("load failed");
        cart.add(&active_product(1), price("3"), 1, &VariantAttributes::new())
            .expect("add failed");
    }
    {
        let mut wishlist =
            Cart::load(&mut session, &catalog, &wishlist_config).expect("load failed");
        wishlist
            .add(&active_product(2), price("4"), 1, &VariantAttributes::new())
            .expect("add failed");
    }

    assert_eq!(session.values().len(), 2);
    let cart = Cart::load(&mut session, &catalog, &cart_config).expect("load failed");
    let ids: Vec<_> = cart.products().map(CatalogProduct::primary_key).collect();
    assert_eq!(ids, vec![ProductId::new(1)]);
}

// ============================================================================
// Reconciliation against the catalog
// ============================================================================

#[test]
fn test_reconciliation_drops_filtered_and_deleted_products() {
    let mut catalog = active_catalog(3);
    let mut session = MemorySession::new();
    let config = CartConfig::default().with_lookup("active", true);

    {
        let mut cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
        for id in 1..=3 {
            cart.add(&active_product(id), price("2"), 1, &VariantAttributes::new())
                .expect("add failed");
        }
    }

    // Product 2 is deactivated between requests.
    catalog.insert(SimpleProduct::new(ProductId::new(2)).with_field("active", false));
    {
        let cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
        let ids: Vec<_> = cart.products().map(CatalogProduct::primary_key).collect();
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(3)]);
        assert_eq!(cart.total(), Price::parse("4").expect("bad price"));
    }
    // Loading alone does not rewrite the blob.
    assert_eq!(
        stored_json(&session, "CART").as_array().map(Vec::len),
        Some(3)
    );

    // Product 3 is deleted; the next mutation persists the pruned cart.
    catalog.remove(ProductId::new(3));
    {
        let mut cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
        cart.add(&active_product(1), None, 1, &VariantAttributes::new())
            .expect("add failed");
    }
    assert_eq!(
        stored_json(&session, "CART"),
        json!([{"key": {"_pk": 1}, "value": {"quantity": 2, "price": "2"}}])
    );
}

#[test]
fn test_load_issues_a_single_catalog_query() {
    let catalog = CountingCatalog::new(active_catalog(3));
    let mut session = MemorySession::new();
    let config = CartConfig::default();

    {
        let mut cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
        for id in 1..=3 {
            cart.add(&active_product(id), price("1"), 1, &variant(&[("size", "S")]))
                .expect("add failed");
            cart.add(&active_product(id), price("1"), 1, &variant(&[("size", "L")]))
                .expect("add failed");
        }
    }
    // No stored cart on the first load, so no query.
    assert_eq!(catalog.queries(), 0);

    let cart = Cart::load(&mut session, &catalog, &config).expect("load failed");
    assert_eq!(cart.unique_count(), 6);
    assert_eq!(catalog.queries(), 1);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_corrupt_session_blob_fails_load() {
    let catalog = active_catalog(1);
    let mut session = MemorySession::new();
    session
        .insert("CART", r#"[{"key": {"size": "M"}, "value": {"quantity": 1, "price": "1"}}]"#.to_string())
        .expect("seed failed");

    let result = Cart::load(&mut session, &catalog, &CartConfig::default());
    assert!(matches!(result, Err(CartError::CorruptCartState { .. })));
}

#[test]
fn test_catalog_failure_propagates() {
    let mut session = MemorySession::new();
    session
        .insert("CART", json!([{"key": {"_pk": 1}, "value": {"quantity": 1, "price": "1"}}]).to_string())
        .expect("seed failed");

    let result = Cart::load(&mut session, &OfflineCatalog, &CartConfig::default());
    assert!(matches!(result, Err(CartError::Catalog(_))));
}

#[test]
fn test_session_write_failure_propagates() {
    let catalog = active_catalog(1);
    let mut session = ReadOnlySession::default();

    let mut cart = Cart::load(&mut session, &catalog, &CartConfig::default()).expect("load failed");
    let result = cart.add(&active_product(1), price("1"), 1, &VariantAttributes::new());
    assert!(matches!(result, Err(CartError::Session(_))));
    drop(cart);
    assert!(!session.is_modified());
}
