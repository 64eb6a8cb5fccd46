use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::domain::cart::{CartLine, CartProduct, QuantityOutcome, BULK_ORDER_THRESHOLD};
use crate::domain::catalog::Product;
use crate::domain::errors::DomainError;
use crate::domain::ports::{collections, DocumentStore};
use crate::domain::session::Session;

use super::optimistic::with_rollback;
use super::requests::{NewRequest, RequestService};

/// Reconciles per-user cart lines against the remote store.
///
/// A cart line is the document `users/{uid}/cart/{productId}`, so the
/// at-most-one-line-per-(user, product) invariant is carried by the key
/// itself. Quantities are always positive in storage; a line at zero is
/// deleted, never written.
pub struct CartService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> CartService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Add `quantity` units of a product. An existing line is bumped with an
    /// atomic field increment rather than read-modify-write, so two
    /// concurrent adds both land.
    pub fn add_to_cart(
        &self,
        session: &Session,
        product_id: &str,
        quantity: i64,
    ) -> Result<(), DomainError> {
        if quantity <= 0 {
            return Err(DomainError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }
        let cart = collections::user_cart(&session.user_id);
        if self.store.get(&cart, product_id)?.is_some() {
            self.store
                .increment_field(&cart, product_id, "quantity", quantity)?;
        } else {
            self.store.set(
                &cart,
                product_id,
                json!({ "quantity": quantity, "addedAt": Utc::now() }),
            )?;
        }
        Ok(())
    }

    /// Read the user's cart and resolve every line to its product in one
    /// batch query. Lines whose product has been deleted are filtered out
    /// and logged; the stored line stays put, so a restored product brings
    /// the line back.
    pub fn get_cart_products(&self, session: &Session) -> Result<Vec<CartProduct>, DomainError> {
        let cart = collections::user_cart(&session.user_id);
        let docs = self.store.get_all(&cart)?;
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let lines: Vec<CartLine> = docs
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc)
                    .map_err(|e| DomainError::Internal(format!("malformed cart line: {}", e)))
            })
            .collect::<Result<_, _>>()?;

        let ids: Vec<String> = lines.iter().map(|l| l.product_id.clone()).collect();
        let mut products: HashMap<String, Product> = HashMap::new();
        for doc in self.store.query_in(collections::ITEMS, "id", &ids)? {
            let product: Product = serde_json::from_value(doc)
                .map_err(|e| DomainError::Internal(format!("malformed product: {}", e)))?;
            products.insert(product.id.clone(), product);
        }

        let mut out = Vec::with_capacity(lines.len());
        for line in lines {
            match products.remove(&line.product_id) {
                Some(product) => out.push(CartProduct {
                    product,
                    quantity: line.quantity,
                }),
                None => log::warn!(
                    "cart line for user {} references missing product {}",
                    session.user_id,
                    line.product_id
                ),
            }
        }
        Ok(out)
    }

    /// Overwrite a line's quantity. Zero or less deletes the line. A
    /// quantity above [`BULK_ORDER_THRESHOLD`] is never written here; the
    /// caller gets [`QuantityOutcome::NeedsConfirmation`] and must route the
    /// confirmed order through [`Self::escalate_bulk_order`].
    pub fn set_quantity(
        &self,
        session: &Session,
        product_id: &str,
        quantity: i64,
    ) -> Result<QuantityOutcome, DomainError> {
        if quantity > BULK_ORDER_THRESHOLD {
            return Ok(QuantityOutcome::NeedsConfirmation);
        }
        let cart = collections::user_cart(&session.user_id);
        if quantity > 0 {
            self.store
                .update(&cart, product_id, json!({ "quantity": quantity }))?;
            Ok(QuantityOutcome::Updated)
        } else {
            self.store.delete(&cart, product_id)?;
            Ok(QuantityOutcome::Removed)
        }
    }

    /// Confirmed bulk-order path: submit a pending custom request for admin
    /// review instead of writing the oversized quantity to the cart. The
    /// cart line itself is left exactly as it was.
    pub fn escalate_bulk_order(
        &self,
        session: &Session,
        product_id: &str,
        quantity: i64,
    ) -> Result<String, DomainError> {
        let quantity = u32::try_from(quantity).map_err(|_| {
            DomainError::Validation("quantity must be a positive integer".to_string())
        })?;
        let doc = self
            .store
            .get(collections::ITEMS, product_id)?
            .ok_or_else(|| DomainError::NotFound(format!("items/{}", product_id)))?;
        let product: Product = serde_json::from_value(doc)
            .map_err(|e| DomainError::Internal(format!("malformed product: {}", e)))?;

        let requests = RequestService::new(Arc::clone(&self.store));
        requests.submit(
            session,
            NewRequest {
                description: format!("Bulk order for {}", product.name),
                quantity,
                product_id: Some(product.id),
            },
        )
    }

    /// Quantity change against a locally-held cart view: the cache is
    /// mutated optimistically and rolled back to its prior snapshot when
    /// the remote write fails. Failures are surfaced, never retried.
    pub fn set_quantity_cached(
        &self,
        session: &Session,
        cache: &mut Vec<CartProduct>,
        product_id: &str,
        quantity: i64,
    ) -> Result<QuantityOutcome, DomainError> {
        if quantity > BULK_ORDER_THRESHOLD {
            return Ok(QuantityOutcome::NeedsConfirmation);
        }
        with_rollback(
            cache,
            |cache| {
                if quantity > 0 {
                    if let Some(entry) = cache.iter_mut().find(|c| c.product.id == product_id) {
                        entry.quantity = quantity;
                    }
                } else {
                    cache.retain(|c| c.product.id != product_id);
                }
            },
            || self.set_quantity(session, product_id, quantity),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::ports::StoreError;
    use crate::domain::requests::RequestStatus;
    use crate::infrastructure::MemoryStore;

    fn seed_product(store: &MemoryStore, name: &str) -> String {
        store
            .create(
                collections::ITEMS,
                json!({
                    "name": name,
                    "category": "Crochet",
                    "price": "4.50",
                    "activate": true,
                    "description": "hand made",
                }),
            )
            .expect("seed product")
    }

    fn service(store: Arc<MemoryStore>) -> CartService<MemoryStore> {
        CartService::new(store)
    }

    #[test]
    fn add_then_get_includes_line_with_quantity() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Bee Plushie");
        let cart = service(store);
        let session = Session::customer("u1", "Ana");

        cart.add_to_cart(&session, &product_id, 3).expect("add");

        let items = cart.get_cart_products(&session).expect("get");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id, product_id);
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn repeat_add_increments_instead_of_overwriting() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Bee Plushie");
        let cart = service(store);
        let session = Session::customer("u1", "Ana");

        cart.add_to_cart(&session, &product_id, 2).expect("add");
        cart.add_to_cart(&session, &product_id, 5).expect("add again");

        let items = cart.get_cart_products(&session).expect("get");
        assert_eq!(items[0].quantity, 7);
    }

    #[test]
    fn add_rejects_non_positive_quantity_before_any_write() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Bee Plushie");
        let cart = CartService::new(Arc::clone(&store));
        let session = Session::customer("u1", "Ana");

        assert!(matches!(
            cart.add_to_cart(&session, &product_id, 0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            cart.add_to_cart(&session, &product_id, -4),
            Err(DomainError::Validation(_))
        ));
        let lines = store
            .get_all(&collections::user_cart("u1"))
            .expect("get_all");
        assert!(lines.is_empty());
    }

    #[test]
    fn setting_quantity_to_zero_removes_the_line() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Bee Plushie");
        let cart = service(store);
        let session = Session::customer("u1", "Ana");

        cart.add_to_cart(&session, &product_id, 2).expect("add");
        let outcome = cart.set_quantity(&session, &product_id, 0).expect("set");
        assert_eq!(outcome, QuantityOutcome::Removed);

        let items = cart.get_cart_products(&session).expect("get");
        assert!(items.is_empty());
    }

    #[test]
    fn set_quantity_overwrites_rather_than_increments() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Bee Plushie");
        let cart = service(store);
        let session = Session::customer("u1", "Ana");

        cart.add_to_cart(&session, &product_id, 10).expect("add");
        let outcome = cart.set_quantity(&session, &product_id, 4).expect("set");
        assert_eq!(outcome, QuantityOutcome::Updated);

        let items = cart.get_cart_products(&session).expect("get");
        assert_eq!(items[0].quantity, 4);
    }

    #[test]
    fn bulk_quantity_is_not_written_and_asks_for_confirmation() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Bumble Bee");
        let cart = service(Arc::clone(&store));
        let session = Session::customer("u1", "Ana");

        cart.add_to_cart(&session, &product_id, 2).expect("add");
        let outcome = cart.set_quantity(&session, &product_id, 150).expect("set");
        assert_eq!(outcome, QuantityOutcome::NeedsConfirmation);

        let items = cart.get_cart_products(&session).expect("get");
        assert_eq!(items[0].quantity, 2, "cart quantity must be unchanged");
    }

    #[test]
    fn confirmed_bulk_order_becomes_a_pending_custom_request() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Bumble Bee");
        let cart = service(Arc::clone(&store));
        let session = Session::customer("u1", "Ana");

        cart.add_to_cart(&session, &product_id, 2).expect("add");
        let request_id = cart
            .escalate_bulk_order(&session, &product_id, 150)
            .expect("escalate");

        let doc = store
            .get(collections::CUSTOM_REQUESTS, &request_id)
            .expect("get request")
            .expect("request exists");
        let description = doc["description"].as_str().expect("description");
        assert!(description.contains("Bumble Bee"));
        assert_eq!(doc["quantity"], json!(150));
        assert_eq!(doc["status"], json!(RequestStatus::Pending));
        assert_eq!(doc["productId"], json!(product_id));

        let items = cart.get_cart_products(&session).expect("get cart");
        assert_eq!(items[0].quantity, 2, "cart quantity must be unchanged");
    }

    #[test]
    fn escalating_a_missing_product_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let cart = service(store);
        let session = Session::customer("u1", "Ana");

        assert!(matches!(
            cart.escalate_bulk_order(&session, "ghost", 150),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn lines_for_deleted_products_are_filtered_at_read_time() {
        let store = Arc::new(MemoryStore::new());
        let keep = seed_product(&store, "Keeper");
        let gone = seed_product(&store, "Goner");
        let cart = service(Arc::clone(&store));
        let session = Session::customer("u1", "Ana");

        cart.add_to_cart(&session, &keep, 1).expect("add");
        cart.add_to_cart(&session, &gone, 1).expect("add");
        store.delete(collections::ITEMS, &gone).expect("delete");

        let items = cart.get_cart_products(&session).expect("get");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id, keep);

        // The dangling line itself is left in the store.
        let lines = store
            .get_all(&collections::user_cart("u1"))
            .expect("get_all");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn empty_cart_short_circuits_to_an_empty_list() {
        let store = Arc::new(MemoryStore::new());
        let cart = service(store);
        let session = Session::customer("u1", "Ana");

        assert!(cart.get_cart_products(&session).expect("get").is_empty());
    }

    // ── optimistic cache reconciliation ──────────────────────────────────────

    /// Store double whose writes all fail; reads pass through.
    struct FailingWrites {
        inner: MemoryStore,
    }

    impl DocumentStore for FailingWrites {
        fn create(&self, _: &str, _: Value) -> Result<String, StoreError> {
            Err(StoreError::WriteFailed("injected".to_string()))
        }
        fn set(&self, _: &str, _: &str, _: Value) -> Result<(), StoreError> {
            Err(StoreError::WriteFailed("injected".to_string()))
        }
        fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
            self.inner.get(collection, id)
        }
        fn get_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
            self.inner.get_all(collection)
        }
        fn query_eq(&self, c: &str, f: &str, v: &Value) -> Result<Vec<Value>, StoreError> {
            self.inner.query_eq(c, f, v)
        }
        fn query_in(&self, c: &str, f: &str, v: &[String]) -> Result<Vec<Value>, StoreError> {
            self.inner.query_in(c, f, v)
        }
        fn update(&self, _: &str, _: &str, _: Value) -> Result<(), StoreError> {
            Err(StoreError::WriteFailed("injected".to_string()))
        }
        fn delete(&self, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::WriteFailed("injected".to_string()))
        }
        fn increment_field(&self, _: &str, _: &str, _: &str, _: i64) -> Result<(), StoreError> {
            Err(StoreError::WriteFailed("injected".to_string()))
        }
    }

    #[test]
    fn cached_update_commits_on_success() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Bee Plushie");
        let cart = service(store);
        let session = Session::customer("u1", "Ana");

        cart.add_to_cart(&session, &product_id, 2).expect("add");
        let mut cache = cart.get_cart_products(&session).expect("get");

        let outcome = cart
            .set_quantity_cached(&session, &mut cache, &product_id, 6)
            .expect("cached set");
        assert_eq!(outcome, QuantityOutcome::Updated);
        assert_eq!(cache[0].quantity, 6);
    }

    #[test]
    fn cached_update_rolls_back_when_the_remote_write_fails() {
        let seeded = MemoryStore::new();
        let product_id = seed_product(&seeded, "Bee Plushie");
        seeded
            .set(
                &collections::user_cart("u1"),
                &product_id,
                json!({ "quantity": 2, "addedAt": Utc::now() }),
            )
            .expect("seed line");

        let store = Arc::new(FailingWrites { inner: seeded });
        let cart: CartService<FailingWrites> = CartService::new(Arc::clone(&store));
        let session = Session::customer("u1", "Ana");
        let mut cache = cart.get_cart_products(&session).expect("get");

        let err = cart
            .set_quantity_cached(&session, &mut cache, &product_id, 6)
            .unwrap_err();
        assert!(matches!(err, DomainError::Remote(_)));
        assert_eq!(cache[0].quantity, 2, "cache must be rolled back");
    }

    #[test]
    fn cached_bulk_quantity_leaves_cache_untouched() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Bumble Bee");
        let cart = service(store);
        let session = Session::customer("u1", "Ana");

        cart.add_to_cart(&session, &product_id, 2).expect("add");
        let mut cache = cart.get_cart_products(&session).expect("get");

        let outcome = cart
            .set_quantity_cached(&session, &mut cache, &product_id, 150)
            .expect("cached set");
        assert_eq!(outcome, QuantityOutcome::NeedsConfirmation);
        assert_eq!(cache[0].quantity, 2);
    }
}
