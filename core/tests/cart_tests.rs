// tests/cart_tests.rs
mod common;

use cartflow::memory::{StoreCalls, StoreVerb};
use cartflow::model::DraftOrder;
use cartflow::{AddToCartOutcome, CartError, EmailMatch, EngineConfig, QuantityLimit, RemoteError};
use common::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_first_add_creates_exactly_one_draft_order() {
  let h = Harness::new();

  let request = h.engine.normalize("a@b.com", 1, TEE as i64, 1).unwrap();
  let outcome = h.engine.add_to_cart(request).await.unwrap();

  assert_eq!(outcome, AddToCartOutcome::Added);
  assert_eq!(
    h.store.calls(),
    StoreCalls {
      fetch_open: 1,
      create: 1,
      ..Default::default()
    }
  );
  let orders = h.store.orders().await;
  assert_eq!(orders.len(), 1);
  assert_eq!(orders[0].customer_email, "a@b.com");
  assert_eq!(orders[0].line_items[0].variant_id, TEE);
  assert_eq!(orders[0].line_items[0].quantity, 1);
  // Filled in by the store.
  assert_eq!(orders[0].line_items[0].price, "20.00");
}

#[tokio::test]
async fn test_adding_existing_variant_replaces_order_with_summed_quantity() {
  let store = store_with_catalog().with_order(draft(77, CUSTOMER, vec![line(1, TEE, 2, "20.00", Some(10))]));
  let h = Harness::with_store(store);

  let outcome = h.add(TEE, 1).await.unwrap();

  assert_eq!(outcome, AddToCartOutcome::AlreadyExist);
  let calls = h.store.calls();
  assert_eq!(calls.replace, 1);
  assert_eq!(calls.create, 0);
  let order = h.store.order(77).await.unwrap();
  assert_eq!(order.line_items.len(), 1);
  assert_eq!(order.line_items[0].quantity, 3);
}

#[tokio::test]
async fn test_new_variant_is_appended_to_existing_order() {
  let store = store_with_catalog().with_order(draft(77, CUSTOMER, vec![line(1, TEE, 1, "20.00", Some(10))]));
  let h = Harness::with_store(store);

  assert_eq!(h.add(MUG, 2).await.unwrap(), AddToCartOutcome::Added);

  let order = h.store.order(77).await.unwrap();
  let variants: Vec<u64> = order.line_items.iter().map(|li| li.variant_id).collect();
  assert_eq!(variants, vec![TEE, MUG]);
  assert!(order.line_items.iter().all(|li| li.id.is_some()));
}

#[tokio::test]
async fn test_add_entry_sums_while_update_entry_replaces() {
  // Add-to-cart twice.
  let h = Harness::new();
  h.add(TEE, 2).await.unwrap();
  h.add(TEE, 2).await.unwrap();
  let added = h.cart().await;
  assert_eq!(added.line_items[0].quantity, 4);

  // Add once, then set the same quantity through the update entry point.
  let h = Harness::new();
  h.add(TEE, 2).await.unwrap();
  let cart = h.cart().await;
  let item_id = cart.line_items[0].id.unwrap();
  h.engine.update_line_quantity(cart.id, item_id, 2).await.unwrap();
  let replaced = h.cart().await;
  assert_eq!(replaced.line_items[0].quantity, 2);

  assert_ne!(added.line_items[0].quantity, replaced.line_items[0].quantity);
}

#[tokio::test]
async fn test_invalid_input_makes_no_remote_call() {
  let h = Harness::new();
  let err = h.add(TEE, 0).await.unwrap_err();
  assert!(matches!(err, CartError::Validation(_)));
  let err = h.add(TEE, 6).await.unwrap_err();
  assert!(matches!(err, CartError::Validation(_)));
  assert_eq!(h.store.calls().total(), 0);
}

#[tokio::test]
async fn test_additive_merge_respects_stock() {
  // Mug stock is 3.
  let h = Harness::new();
  h.add(MUG, 2).await.unwrap();
  let err = h.add(MUG, 2).await.unwrap_err();

  assert_eq!(
    err,
    CartError::QuantityExceedsLimit {
      variant_id: MUG,
      requested: 4,
      allowed: 3,
      limit: QuantityLimit::Stock,
    }
  );
  assert!(err.user_message().contains('3'));
  assert_eq!(h.cart().await.line_items[0].quantity, 2);
}

#[tokio::test]
async fn test_additive_merge_respects_per_line_cap() {
  let h = Harness::new();
  h.add(TEE, 4).await.unwrap();
  let err = h.add(TEE, 2).await.unwrap_err();
  assert!(matches!(
    err,
    CartError::QuantityExceedsLimit {
      limit: QuantityLimit::PerLineCap,
      allowed: 5,
      ..
    }
  ));
  assert_eq!(h.store.calls().replace, 0);
}

#[tokio::test]
async fn test_update_quantity_errors() {
  let h = Harness::new();
  h.add(MUG, 1).await.unwrap();
  let cart = h.cart().await;
  let item_id = cart.line_items[0].id.unwrap();

  let err = h.engine.update_line_quantity(cart.id, item_id, 4).await.unwrap_err();
  assert!(matches!(err, CartError::QuantityExceedsLimit { limit: QuantityLimit::Stock, .. }));

  let err = h.engine.update_line_quantity(cart.id, 999, 1).await.unwrap_err();
  assert_eq!(err, CartError::LineItemNotFound(999));

  let err = h.engine.update_line_quantity(4242, item_id, 1).await.unwrap_err();
  assert_eq!(err, CartError::DraftOrderNotFound(4242));

  let err = h.engine.update_line_quantity(cart.id, item_id, 0).await.unwrap_err();
  assert!(matches!(err, CartError::Validation(_)));
}

#[tokio::test]
async fn test_update_requires_signed_in_customer() {
  let h = Harness::new();
  h.add(TEE, 1).await.unwrap();
  let cart = h.cart().await;
  h.session.sign_out();

  let err = h.engine.update_line_quantity(cart.id, cart.line_items[0].id.unwrap(), 2).await.unwrap_err();
  assert_eq!(err, CartError::NotSignedIn);
  assert_eq!(h.engine.current_cart().await.unwrap_err(), CartError::NotSignedIn);
}

#[tokio::test]
async fn test_remote_failures_are_classified_by_direction() {
  let h = Harness::new();
  h.store.fail(StoreVerb::FetchOpen, RemoteError::Transport("offline".into()));
  let err = h.add(TEE, 1).await.unwrap_err();
  assert_eq!(err, CartError::RemoteFetch(RemoteError::Transport("offline".into())));
  assert!(err.is_retryable());

  h.store.clear_failure(StoreVerb::FetchOpen);
  h.store.fail(
    StoreVerb::Create,
    RemoteError::Rejected {
      status: 422,
      message: "line_items invalid".into(),
    },
  );
  let err = h.add(TEE, 1).await.unwrap_err();
  assert!(matches!(err, CartError::RemoteWrite(RemoteError::Rejected { status: 422, .. })));
  // No automatic retry.
  assert_eq!(h.store.calls().create, 1);
}

#[tokio::test]
async fn test_other_customers_orders_are_ignored() {
  let store = store_with_catalog().with_order(draft(50, OTHER_CUSTOMER, vec![line(1, TEE, 2, "20.00", Some(10))]));
  let h = Harness::with_store(store);

  h.add(TEE, 1).await.unwrap();

  assert_eq!(h.store.calls().create, 1);
  assert_eq!(h.store.order(50).await.unwrap().line_items[0].quantity, 2);
}

#[tokio::test]
async fn test_email_match_is_exact_by_default() {
  let seeded = || store_with_catalog().with_order(draft(50, "Ada@Shop.io", vec![line(1, TEE, 1, "20.00", Some(10))]));

  let exact = Harness::with_store(seeded());
  exact.add(TEE, 1).await.unwrap();
  assert_eq!(exact.store.calls().create, 1);

  let config = EngineConfig {
    email_match: EmailMatch::CaseInsensitive,
    ..Default::default()
  };
  let relaxed = Harness::build(seeded(), config, cartflow::memory::PaymentScript::Complete);
  relaxed.add(TEE, 1).await.unwrap();
  assert_eq!(relaxed.store.calls().create, 0);
  assert_eq!(relaxed.store.order(50).await.unwrap().line_items[0].quantity, 2);
}

#[tokio::test]
async fn test_concurrent_adds_for_one_customer_do_not_lose_updates() {
  let h = Arc::new(Harness::with_store(
    store_with_catalog().with_latency(Duration::from_millis(5)),
  ));

  let mut tasks = Vec::new();
  for _ in 0..4 {
    let h = h.clone();
    tasks.push(tokio::spawn(async move { h.add(TEE, 1).await }));
  }
  for t in tasks {
    t.await.unwrap().unwrap();
  }

  let orders: Vec<DraftOrder> = h.store.orders().await;
  assert_eq!(orders.len(), 1, "only one draft order may be created");
  assert_eq!(orders[0].line_items[0].quantity, 4);
  assert_eq!(h.store.calls().create, 1);
}

#[tokio::test]
async fn test_remove_line_item_and_last_line_deletes_draft() {
  let h = Harness::new();
  h.add(TEE, 1).await.unwrap();
  h.add(MUG, 1).await.unwrap();
  let cart = h.cart().await;
  let tee = cart.line_items[0].id.unwrap();
  let mug = cart.line_items[1].id.unwrap();

  let remaining = h.engine.remove_line_item(cart.id, tee).await.unwrap().unwrap();
  assert_eq!(remaining.line_items.len(), 1);
  assert_eq!(remaining.line_items[0].variant_id, MUG);

  assert!(h.engine.remove_line_item(cart.id, mug).await.unwrap().is_none());
  assert!(h.engine.current_cart().await.unwrap().is_none());
  assert_eq!(h.store.calls().delete, 1);
}
