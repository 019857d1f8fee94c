//! Orchestration of a tracking run.
//!
//! One pass over the configured collections: fetch catalog pages, project
//! vehicle entries, enrich with live inventory counts, merge into the
//! store, persist. A failing collection is logged and the next one is
//! attempted; the process exits successfully once the iteration completes.

use std::time::Duration;

use hwtrack_catalog::SearchClient;
use hwtrack_core::{AppConfig, CollectionConfig};
use hwtrack_inventory::{
    update_quantities, CommandProvider, CredentialManager, CredentialProvider, InventoryClient,
    InventoryError,
};
use hwtrack_store::ReconciliationStore;

/// Provider as configured by the environment: delegates to the external
/// capture command when one is set, otherwise yields no token so the run
/// degrades to zero-fill enrichment.
struct ConfiguredProvider(Option<CommandProvider>);

impl CredentialProvider for ConfiguredProvider {
    async fn acquire(&self) -> Result<Option<String>, InventoryError> {
        match &self.0 {
            Some(command) => command.acquire().await,
            None => {
                tracing::warn!("HWTRACK_TOKEN_COMMAND is not set; cannot capture a credential");
                Ok(None)
            }
        }
    }
}

/// Runs the full poll-and-reconcile pass over every configured collection.
///
/// # Errors
///
/// Returns an error only for conditions that make the whole run
/// impossible: unreadable config, an unloadable store, or invalid base
/// URLs. Per-collection failures are logged and skipped.
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let collections = hwtrack_core::load_collections(&config.collections_path)?;

    let mut store = ReconciliationStore::open(&config.store_path);
    let loaded = store.load()?;
    let folded = store.remove_duplicates();
    tracing::info!(loaded, folded, path = %config.store_path.display(), "store ready");

    let search = SearchClient::new(
        &config.search_base_url,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?;
    let inventory = InventoryClient::new(
        &config.inventory_base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;

    let command = config.token_command.as_deref().and_then(|line| {
        CommandProvider::from_command_line(
            line,
            Duration::from_secs(config.token_command_timeout_secs),
        )
    });
    // One manager for the whole run: the token and the attempt budget are
    // shared across collections.
    let mut manager = CredentialManager::new(
        ConfiguredProvider(command),
        Duration::from_secs(config.token_ttl_secs),
        config.max_refresh_attempts,
    );

    let mut failed_collections = 0usize;
    for collection in &collections.collections {
        if let Err(e) =
            process_collection(config, collection, &search, &inventory, &mut manager, &mut store)
                .await
        {
            failed_collections += 1;
            tracing::error!(
                collection = %collection.handle,
                error = format!("{e:#}"),
                "collection failed; continuing with the next one"
            );
        }
    }

    if failed_collections > 0 {
        tracing::warn!(
            failed_collections,
            total = collections.collections.len(),
            "some collections failed this run"
        );
    }
    Ok(())
}

/// Fetch → project → enrich → merge → persist for one collection.
async fn process_collection(
    config: &AppConfig,
    collection: &CollectionConfig,
    search: &SearchClient,
    inventory: &InventoryClient,
    manager: &mut CredentialManager<ConfiguredProvider>,
    store: &mut ReconciliationStore,
) -> anyhow::Result<()> {
    let results = search
        .fetch_collection(
            &collection.handle,
            config.results_per_page,
            config.inter_request_delay_ms,
        )
        .await?;
    let mut products = hwtrack_catalog::project_results(&results);

    let report = update_quantities(
        &mut products,
        manager,
        inventory,
        config.inter_request_delay_ms,
    )
    .await;
    for slug in &report.failed {
        tracing::warn!(collection = %collection.handle, page_name = %slug, "inventory enrichment failed");
    }

    let projected = products.len();
    for product in products {
        store.update_or_add(product);
    }
    store.save()?;

    tracing::info!(
        collection = %collection.handle,
        fetched = results.len(),
        projected,
        updated = report.updated,
        failed = report.failed.len(),
        store_records = store.len(),
        "collection reconciled"
    );
    Ok(())
}

/// Loads the store, folds duplicate identities, and saves it back.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or saved.
pub fn dedup(config: &AppConfig) -> anyhow::Result<()> {
    let mut store = ReconciliationStore::open(&config.store_path);
    let loaded = store.load()?;
    let removed = store.remove_duplicates();
    store.save()?;
    tracing::info!(loaded, removed, remaining = store.len(), "dedup pass complete");
    println!("removed {removed} duplicate record(s), {} remain", store.len());
    Ok(())
}
