//! SearchSpring native-format response types for the `/api/search` endpoint.
//!
//! ## Observed shape from the Mattel Creations search proxy
//!
//! ### `tags_category`
//! A JSON array of category strings. Vehicle listings carry exactly
//! `["Vehicles"]`; apparel and accessories carry other values. The
//! projection filter matches the whole list, not containment.
//!
//! ### `price`
//! Returned as either a JSON number (`25.0`) or a decimal string
//! (`"25.00"`) depending on the proxy revision; modeled through a
//! string-or-number deserializer and kept as a display string.
//!
//! ### `ss_inventory_count`
//! The indexed inventory figure at crawl time. Absent for listings the
//! index has no count for; may be negative when a drop oversold. Absent is
//! NOT the same as zero — downstream treats a missing reading as "no
//! observation".
//!
//! ### `uid`
//! Opaque SearchSpring document identifier, also accepted by the
//! storefront inventory endpoint. Required for live-count enrichment.

use serde::{Deserialize, Deserializer};

/// Top-level response from `GET /api/search?resultsFormat=native`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub pagination: Pagination,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Pagination block of the native results format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// A single raw catalog entry from the search index.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    /// Opaque document identifier, used to query the inventory endpoint.
    #[serde(default)]
    pub uid: String,

    /// Display name of the listing.
    #[serde(default)]
    pub name: String,

    /// Stock-keeping identifier.
    #[serde(default)]
    pub sku: String,

    /// Product page URL; the last path segment is the page slug.
    #[serde(default)]
    pub url: String,

    /// Primary image URL, usually carrying sizing query parameters.
    #[serde(default, rename = "imageUrl")]
    pub image_url: String,

    /// Display price; string or number depending on proxy revision.
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,

    /// Category tags; vehicle listings carry exactly `["Vehicles"]`.
    #[serde(default)]
    pub tags_category: Vec<String>,

    /// Indexed inventory count. Absent means "no reading", not zero.
    #[serde(default)]
    pub ss_inventory_count: Option<i64>,
}

/// Deserializes a field that the proxy returns as either a JSON string or
/// a number into its display-string form. Null and other shapes become the
/// empty string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
