use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub activate: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Back-reference to the custom request this product was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_request_id: Option<String>,
}

/// Category assigned to products derived from accepted custom requests.
pub const CUSTOM_REQUEST_CATEGORY: &str = "Custom Requests";
