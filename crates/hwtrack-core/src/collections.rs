use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One collection to poll: a display name and the storefront collection
/// handle used as the `bgfilter.collection_handle` query value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    pub handle: String,
}

#[derive(Debug, Deserialize)]
pub struct CollectionsFile {
    pub collections: Vec<CollectionConfig>,
}

/// Load and validate the collections configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (empty list, empty name, malformed or duplicate handle).
pub fn load_collections(path: &Path) -> Result<CollectionsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CollectionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CollectionsFile = serde_yaml::from_str(&content)?;
    validate_collections(&file)?;
    Ok(file)
}

fn validate_collections(file: &CollectionsFile) -> Result<(), ConfigError> {
    if file.collections.is_empty() {
        return Err(ConfigError::Validation(
            "collections list must not be empty".to_string(),
        ));
    }

    let mut seen_handles = HashSet::new();
    for collection in &file.collections {
        if collection.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "collection name must be non-empty".to_string(),
            ));
        }

        if collection.handle.is_empty()
            || !collection
                .handle
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ConfigError::Validation(format!(
                "collection '{}' has invalid handle '{}'; expected lowercase alphanumerics and hyphens",
                collection.name, collection.handle
            )));
        }

        if !seen_handles.insert(collection.handle.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate collection handle: '{}'",
                collection.handle
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "collections_test.rs"]
mod tests;
