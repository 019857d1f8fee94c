//! Batch inventory enrichment.
//!
//! Drives [`InventoryClient::lookup`] over a projected product batch while
//! consulting the [`CredentialManager`] before each call. One bad item
//! never aborts the batch; only total credential loss halts it.

use std::time::Duration;

use hwtrack_core::Product;

use crate::credential::CredentialManager;
use crate::error::InventoryError;
use crate::lookup::{InventoryClient, InventoryCounts};
use crate::provider::CredentialProvider;

/// Outcome of one enrichment pass over a product batch.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Products whose counts were refreshed from the live endpoint.
    pub updated: usize,
    /// Page slugs of products that fell back to `(0, 0)`.
    pub failed: Vec<String>,
}

/// Enriches each product in `products` with live inventory counts.
///
/// Per-item policy:
/// - no `uid` — assigned `(0, 0)` without a lookup;
/// - invalid credential before a call — one forced refresh; if that fails
///   the batch halts and every remaining product is zero-filled and
///   reported failed (no credential means no further enrichment);
/// - [`InventoryError::AuthExpired`] — the cached credential is
///   invalidated, refreshed once, and the item retried exactly once; a
///   second failure zero-fills the item and processing continues;
/// - any other lookup failure — the item is zero-filled and processing
///   continues.
///
/// `inter_request_delay_ms` is applied between lookups.
pub async fn update_quantities<P: CredentialProvider>(
    products: &mut [Product],
    manager: &mut CredentialManager<P>,
    client: &InventoryClient,
    inter_request_delay_ms: u64,
) -> UpdateReport {
    let mut report = UpdateReport::default();
    let mut first_lookup = true;

    for idx in 0..products.len() {
        if products[idx].uid.is_empty() {
            tracing::warn!(
                page_name = %products[idx].page_name,
                "product has no uid; assigning zero counts"
            );
            zero_fill(&mut products[idx], &mut report);
            continue;
        }

        if !first_lookup && inter_request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
        }
        first_lookup = false;

        let Some(token) = manager.get(!manager.is_valid()).await else {
            tracing::error!(
                remaining = products.len() - idx,
                "no credential available; zero-filling the rest of the batch"
            );
            for product in &mut products[idx..] {
                zero_fill(product, &mut report);
            }
            break;
        };

        match client.lookup(&token, &products[idx].uid).await {
            Ok(counts) => apply(&mut products[idx], counts, &mut report),
            Err(InventoryError::AuthExpired { status, .. }) => {
                tracing::warn!(
                    page_name = %products[idx].page_name,
                    status,
                    "inventory endpoint rejected credential; refreshing and retrying once"
                );
                manager.invalidate();
                match manager.get(true).await {
                    Some(fresh) => match client.lookup(&fresh, &products[idx].uid).await {
                        Ok(counts) => apply(&mut products[idx], counts, &mut report),
                        Err(e) => {
                            tracing::warn!(
                                page_name = %products[idx].page_name,
                                error = %e,
                                "retry after credential refresh failed"
                            );
                            zero_fill(&mut products[idx], &mut report);
                        }
                    },
                    None => zero_fill(&mut products[idx], &mut report),
                }
            }
            Err(e) => {
                tracing::warn!(
                    page_name = %products[idx].page_name,
                    error = %e,
                    "inventory lookup failed"
                );
                zero_fill(&mut products[idx], &mut report);
            }
        }
    }

    report
}

fn apply(product: &mut Product, counts: InventoryCounts, report: &mut UpdateReport) {
    product.current_qty = Some(counts.current_qty);
    product.max_qty = counts.max_qty;
    product.normalize();
    report.updated += 1;
}

fn zero_fill(product: &mut Product, report: &mut UpdateReport) {
    product.current_qty = Some(0);
    product.max_qty = 0;
    report.failed.push(product.page_name.clone());
}
