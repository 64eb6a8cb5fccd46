use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Product;

/// Quantities above this are not written to the cart; they go through the
/// bulk-order escalation path and land on an admin's desk instead.
pub const BULK_ORDER_THRESHOLD: i64 = 99;

/// One line of a user's cart. The document id inside `users/{uid}/cart` is
/// the product id, which is what makes the line unique per (user, product).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: String,
    pub quantity: i64,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

/// A cart line joined with its product, as rendered to the user.
#[derive(Debug, Clone)]
pub struct CartProduct {
    pub product: Product,
    pub quantity: i64,
}

/// Outcome of a quantity change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityOutcome {
    /// The line now holds the requested quantity.
    Updated,
    /// The requested quantity was zero or less; the line was deleted.
    Removed,
    /// The quantity exceeds [`BULK_ORDER_THRESHOLD`]. Nothing was written;
    /// the caller must confirm before escalating to a custom request.
    NeedsConfirmation,
}
