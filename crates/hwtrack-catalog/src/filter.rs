//! Projection from raw search results to [`hwtrack_core::Product`] records.
//!
//! Thin and deterministic: entries whose category tags are exactly
//! `["Vehicles"]` are projected, everything else is discarded.

use hwtrack_core::Product;

use crate::types::SearchResult;

/// Category tag list a listing must carry, in full, to be projected.
const VEHICLE_TAGS: &[&str] = &["Vehicles"];

/// Projects raw search results into canonical [`Product`] records.
///
/// Keeps only entries whose `tags_category` matches [`VEHICLE_TAGS`]
/// exactly. The page slug is taken from the last `/`-segment of the
/// product URL, image query parameters are stripped, and quantities are
/// normalized so that `max_qty >= current_qty >= 0` holds for entries that
/// carry a reading. Entries without an `ss_inventory_count` are still
/// projected with no reading; the inventory updater fills them in.
#[must_use]
pub fn project_results(results: &[SearchResult]) -> Vec<Product> {
    results
        .iter()
        .filter(|r| r.tags_category == VEHICLE_TAGS)
        .map(project_one)
        .collect()
}

fn project_one(result: &SearchResult) -> Product {
    let mut product = Product {
        car_name: result.name.clone(),
        sku: result.sku.clone(),
        page_name: page_slug(&result.url),
        max_qty: 0,
        current_qty: result.ss_inventory_count,
        image_url: strip_query(&result.image_url),
        price: result.price.clone(),
        uid: result.uid.clone(),
    };
    // First observation: the reading is also the historical ceiling.
    product.normalize();
    product
}

/// Returns the last `/`-segment of a product URL, the storefront page slug.
fn page_slug(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().to_string()
}

/// Strips the query string from an image URL, keeping everything before
/// the first `?`.
fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or_default().to_string()
}
