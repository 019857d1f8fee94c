//! Durable, identity-keyed record set over a CSV file.
//!
//! The store is read once per run into an in-memory working set, merged
//! against fresh observations under the reconciliation policy in
//! [`hwtrack_core::Product::merge_from`], and written back whole. There is
//! no concurrent writer; the save path still goes through a temp file and
//! rename so a killed process cannot leave a half-written store.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hwtrack_core::{Product, ProductKey};

use crate::error::StoreError;

/// The authoritative, de-duplicated record set, keyed by the
/// `(page_name, car_name, sku)` identity triple.
pub struct ReconciliationStore {
    path: PathBuf,
    records: Vec<Product>,
}

impl ReconciliationStore {
    /// Creates a store handle over `path` with an empty working set. Call
    /// [`Self::load`] to read the persisted records.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Loads the persisted record set, replacing the in-memory working
    /// set. A missing file is an empty set, not an error. Rows that fail
    /// to deserialize are logged and skipped; unparseable quantity cells
    /// load as 0 with the row admitted. Returns the number of records
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be opened.
    pub fn load(&mut self) -> Result<usize, StoreError> {
        self.records.clear();

        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no persisted store; starting empty");
            return Ok(0);
        }

        let file = std::fs::File::open(&self.path).map_err(|e| StoreError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        for (row, result) in reader.deserialize::<Product>().enumerate() {
            match result {
                Ok(mut record) => {
                    record.normalize();
                    self.records.push(record);
                }
                Err(e) => {
                    // Corrupt-row tolerance: one bad row never aborts the load.
                    tracing::warn!(
                        path = %self.path.display(),
                        row = row + 1,
                        error = %e,
                        "skipping unreadable store row"
                    );
                }
            }
        }

        Ok(self.records.len())
    }

    /// Folds records that collide on identity into a single record using
    /// the merge policy, preserving first-arrival order. Returns the
    /// number of records eliminated.
    pub fn remove_duplicates(&mut self) -> usize {
        let mut kept: Vec<Product> = Vec::with_capacity(self.records.len());
        let mut index: HashMap<ProductKey, usize> = HashMap::with_capacity(self.records.len());
        let mut removed = 0usize;

        for record in self.records.drain(..) {
            match index.entry(record.key()) {
                Entry::Occupied(entry) => {
                    kept[*entry.get()].merge_from(&record);
                    removed += 1;
                }
                Entry::Vacant(entry) => {
                    entry.insert(kept.len());
                    kept.push(record);
                }
            }
        }

        self.records = kept;
        if removed > 0 {
            tracing::info!(removed, "folded duplicate store records");
        }
        removed
    }

    /// Merges `observation` into the record with the same identity, or
    /// inserts it as a new record after normalization.
    ///
    /// An observation without an inventory reading is a no-op: absence of
    /// a reading is not a zero.
    pub fn update_or_add(&mut self, observation: Product) {
        if !observation.has_reading() {
            tracing::debug!(
                page_name = %observation.page_name,
                "observation carries no inventory reading; ignoring"
            );
            return;
        }

        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|r| r.same_identity(&observation))
        {
            existing.merge_from(&observation);
        } else {
            let mut record = observation;
            record.normalize();
            self.records.push(record);
        }
    }

    /// Serializes the full working set back to the store file, replacing
    /// the previous contents. Writes to a sibling temp file first and
    /// renames on success so an interrupted save leaves the old store
    /// intact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] on serialization failure or
    /// [`StoreError::Io`] on write/rename failure.
    pub fn save(&self) -> Result<(), StoreError> {
        let tmp_path = self.tmp_path();

        let mut writer = csv::Writer::from_path(&tmp_path).map_err(|e| StoreError::Csv {
            path: tmp_path.display().to_string(),
            source: e,
        })?;
        // serialize() only emits the header row alongside the first record,
        // so an empty set needs it written explicitly.
        if self.records.is_empty() {
            writer
                .write_record([
                    "car_name",
                    "sku",
                    "page_name",
                    "max_qty",
                    "current_qty",
                    "image_url",
                    "price",
                ])
                .map_err(|e| StoreError::Csv {
                    path: tmp_path.display().to_string(),
                    source: e,
                })?;
        }
        for record in self.records.iter().filter(|r| r.has_reading()) {
            writer.serialize(record).map_err(|e| StoreError::Csv {
                path: tmp_path.display().to_string(),
                source: e,
            })?;
        }
        writer.flush().map_err(|e| StoreError::Io {
            path: tmp_path.display().to_string(),
            source: e,
        })?;
        drop(writer);

        std::fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            records = self.records.len(),
            "persisted store"
        );
        Ok(())
    }

    #[must_use]
    pub fn records(&self) -> &[Product] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map_or_else(
            || std::ffi::OsString::from("store"),
            std::ffi::OsStr::to_os_string,
        );
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
