use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use crate::domain::catalog::Product;
use crate::domain::errors::DomainError;
use crate::domain::ports::{collections, DocumentStore};
use crate::domain::session::Session;

/// Per-user favourite-product membership. A favourite is the document
/// `users/{uid}/favourites/{productId}`; existence is the whole payload.
pub struct FavouritesService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> FavouritesService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Membership test. An empty user or product id is simply "not a
    /// favourite", never an error.
    pub fn is_favourite(&self, session: &Session, product_id: &str) -> Result<bool, DomainError> {
        if session.user_id.is_empty() || product_id.is_empty() {
            return Ok(false);
        }
        let coll = collections::user_favourites(&session.user_id);
        Ok(self.store.get(&coll, product_id)?.is_some())
    }

    /// Idempotent set/unset keyed by the desired end state. Two callers
    /// racing towards the same state cannot undo each other.
    pub fn set_favourite(
        &self,
        session: &Session,
        product_id: &str,
        desired: bool,
    ) -> Result<(), DomainError> {
        let coll = collections::user_favourites(&session.user_id);
        if desired {
            self.store
                .set(&coll, product_id, json!({ "addedAt": Utc::now() }))?;
        } else {
            self.store.delete(&coll, product_id)?;
        }
        Ok(())
    }

    /// Inversion-style toggle for callers that track the current state
    /// themselves. Returns the new state.
    pub fn toggle_favourite(
        &self,
        session: &Session,
        product_id: &str,
        currently_favourite: bool,
    ) -> Result<bool, DomainError> {
        let desired = !currently_favourite;
        self.set_favourite(session, product_id, desired)?;
        Ok(desired)
    }

    pub fn get_favourite_ids(&self, session: &Session) -> Result<Vec<String>, DomainError> {
        let coll = collections::user_favourites(&session.user_id);
        Ok(self
            .store
            .get_all(&coll)?
            .iter()
            .filter_map(|doc| doc.get("id").and_then(Value::as_str).map(str::to_string))
            .collect())
    }

    /// Resolve the favourite set to product records with a single batch
    /// query. Short-circuits before touching the products collection when
    /// the set is empty, since an `in` query over zero ids is invalid.
    pub fn get_favourite_products(&self, session: &Session) -> Result<Vec<Product>, DomainError> {
        let ids = self.get_favourite_ids(session)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .query_in(collections::ITEMS, "id", &ids)?
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc)
                    .map_err(|e| DomainError::Internal(format!("malformed product: {}", e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::domain::ports::StoreError;
    use crate::infrastructure::MemoryStore;

    fn seed_product(store: &MemoryStore, name: &str) -> String {
        store
            .create(
                collections::ITEMS,
                json!({ "name": name, "category": "Crochet", "price": "4.50" }),
            )
            .expect("seed product")
    }

    #[test]
    fn two_toggles_round_trip_membership() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Octopus");
        let favourites = FavouritesService::new(store);
        let session = Session::customer("u1", "Ana");

        let now = favourites
            .toggle_favourite(&session, &product_id, false)
            .expect("toggle on");
        assert!(now);
        assert!(favourites.is_favourite(&session, &product_id).expect("is"));

        let now = favourites
            .toggle_favourite(&session, &product_id, true)
            .expect("toggle off");
        assert!(!now);
        assert!(!favourites.is_favourite(&session, &product_id).expect("is"));
    }

    #[test]
    fn set_favourite_is_idempotent_per_desired_state() {
        let store = Arc::new(MemoryStore::new());
        let product_id = seed_product(&store, "Octopus");
        let favourites = FavouritesService::new(store);
        let session = Session::customer("u1", "Ana");

        favourites
            .set_favourite(&session, &product_id, true)
            .expect("set");
        favourites
            .set_favourite(&session, &product_id, true)
            .expect("set again");
        assert_eq!(favourites.get_favourite_ids(&session).expect("ids").len(), 1);

        favourites
            .set_favourite(&session, &product_id, false)
            .expect("unset");
        favourites
            .set_favourite(&session, &product_id, false)
            .expect("unset again");
        assert!(favourites.get_favourite_ids(&session).expect("ids").is_empty());
    }

    #[test]
    fn blank_ids_are_not_favourites_and_not_errors() {
        let store = Arc::new(MemoryStore::new());
        let favourites = FavouritesService::new(store);

        let anonymous = Session::customer("", "Ghost");
        assert!(!favourites.is_favourite(&anonymous, "p1").expect("is"));

        let session = Session::customer("u1", "Ana");
        assert!(!favourites.is_favourite(&session, "").expect("is"));
    }

    #[test]
    fn favourite_products_resolves_marks_to_products() {
        let store = Arc::new(MemoryStore::new());
        let a = seed_product(&store, "Octopus");
        let _b = seed_product(&store, "Whale");
        let favourites = FavouritesService::new(store);
        let session = Session::customer("u1", "Ana");

        favourites.set_favourite(&session, &a, true).expect("set");

        let products = favourites.get_favourite_products(&session).expect("get");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, a);
        assert_eq!(products[0].name, "Octopus");
    }

    /// Pass-through store double that counts `query_in` calls.
    struct CountingStore {
        inner: MemoryStore,
        in_queries: AtomicUsize,
    }

    impl DocumentStore for CountingStore {
        fn create(&self, c: &str, d: Value) -> Result<String, StoreError> {
            self.inner.create(c, d)
        }
        fn set(&self, c: &str, id: &str, d: Value) -> Result<(), StoreError> {
            self.inner.set(c, id, d)
        }
        fn get(&self, c: &str, id: &str) -> Result<Option<Value>, StoreError> {
            self.inner.get(c, id)
        }
        fn get_all(&self, c: &str) -> Result<Vec<Value>, StoreError> {
            self.inner.get_all(c)
        }
        fn query_eq(&self, c: &str, f: &str, v: &Value) -> Result<Vec<Value>, StoreError> {
            self.inner.query_eq(c, f, v)
        }
        fn query_in(&self, c: &str, f: &str, v: &[String]) -> Result<Vec<Value>, StoreError> {
            self.in_queries.fetch_add(1, Ordering::SeqCst);
            self.inner.query_in(c, f, v)
        }
        fn update(&self, c: &str, id: &str, d: Value) -> Result<(), StoreError> {
            self.inner.update(c, id, d)
        }
        fn delete(&self, c: &str, id: &str) -> Result<(), StoreError> {
            self.inner.delete(c, id)
        }
        fn increment_field(&self, c: &str, id: &str, f: &str, d: i64) -> Result<(), StoreError> {
            self.inner.increment_field(c, id, f, d)
        }
    }

    #[test]
    fn empty_favourite_set_never_issues_a_product_query() {
        let store = Arc::new(CountingStore {
            inner: MemoryStore::new(),
            in_queries: AtomicUsize::new(0),
        });
        let favourites: FavouritesService<CountingStore> =
            FavouritesService::new(Arc::clone(&store));
        let session = Session::customer("u1", "Ana");

        let products = favourites.get_favourite_products(&session).expect("get");
        assert!(products.is_empty());
        assert_eq!(store.in_queries.load(Ordering::SeqCst), 0);
    }
}
