use serde::{Deserialize, Serialize};

/// One catalog entry enriched with inventory counts, normalized for storage
/// and reconciliation across runs.
///
/// Identity is the `(page_name, car_name, sku)` triple; two records with the
/// same identity describe the same catalog item observed at different times
/// and must be merged, never duplicated, in the persisted set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Display name as shown on the storefront. May be empty; still part of
    /// the identity triple.
    pub car_name: String,
    /// Stock-keeping identifier. Part of the identity triple.
    pub sku: String,
    /// URL slug, the last path segment of the product URL. Part of the
    /// identity triple.
    pub page_name: String,
    /// Highest inventory figure ever observed. Monotonically non-decreasing
    /// under merge.
    #[serde(default, deserialize_with = "lenient_qty")]
    pub max_qty: i64,
    /// Most recently observed inventory figure. `None` means no reading has
    /// been taken yet; such records are never merged or persisted. A row on
    /// disk always has a reading, so a missing cell loads as `Some(0)`.
    #[serde(default = "zero_reading", deserialize_with = "lenient_opt_qty")]
    pub current_qty: Option<i64>,
    /// Product image location with query parameters stripped. Empty when the
    /// storefront supplied none.
    #[serde(default)]
    pub image_url: String,
    /// Display price exactly as the storefront returns it, currency-unaware.
    #[serde(default)]
    pub price: String,
    /// Opaque identifier used only to query the inventory endpoint during a
    /// run. Never persisted.
    #[serde(skip)]
    pub uid: String,
}

/// Owned identity key for a [`Product`], usable as a `HashMap` key when
/// grouping records by identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductKey {
    pub page_name: String,
    pub car_name: String,
    pub sku: String,
}

impl Product {
    /// Returns the owned identity key `(page_name, car_name, sku)`.
    #[must_use]
    pub fn key(&self) -> ProductKey {
        ProductKey {
            page_name: self.page_name.clone(),
            car_name: self.car_name.clone(),
            sku: self.sku.clone(),
        }
    }

    /// Returns `true` if `other` has the same identity triple.
    #[must_use]
    pub fn same_identity(&self, other: &Product) -> bool {
        self.page_name == other.page_name
            && self.car_name == other.car_name
            && self.sku == other.sku
    }

    /// Returns `true` if an inventory reading has been recorded for this
    /// product in the current run or a previous one.
    #[must_use]
    pub fn has_reading(&self) -> bool {
        self.current_qty.is_some()
    }

    /// Clamps quantities into their invariant ranges: `current_qty >= 0`
    /// (negative readings mean "oversold" and are stored as 0) and
    /// `max_qty >= current_qty >= 0`.
    ///
    /// Applied before a record is first inserted into the store and after
    /// loading rows from disk.
    pub fn normalize(&mut self) {
        if let Some(cur) = self.current_qty.as_mut() {
            *cur = (*cur).max(0);
        }
        self.max_qty = self.max_qty.max(0);
        if let Some(cur) = self.current_qty {
            self.max_qty = self.max_qty.max(cur);
        }
    }

    /// Merges `incoming` into `self` under the reconciliation policy. Both
    /// records must share the same identity triple; identity fields are not
    /// touched.
    ///
    /// - `current_qty`: the lower reading wins (stock only depletes between
    ///   observations), clamped at 0 to absorb oversold readings.
    /// - `max_qty`: monotonic high-water mark.
    /// - `image_url` / `price`: fill-if-empty; an existing non-empty value
    ///   is never overwritten.
    /// - `uid`: the incoming observation wins when non-empty (it is the one
    ///   valid for the current run).
    pub fn merge_from(&mut self, incoming: &Product) {
        self.current_qty = match (self.current_qty, incoming.current_qty) {
            (Some(existing), Some(observed)) => Some(existing.min(observed).max(0)),
            (existing, observed) => existing.or(observed).map(|qty| qty.max(0)),
        };
        self.max_qty = self.max_qty.max(incoming.max_qty);
        if let Some(cur) = self.current_qty {
            self.max_qty = self.max_qty.max(cur);
        }
        if self.image_url.is_empty() && !incoming.image_url.is_empty() {
            self.image_url = incoming.image_url.clone();
        }
        if self.price.is_empty() && !incoming.price.is_empty() {
            self.price = incoming.price.clone();
        }
        if !incoming.uid.is_empty() {
            self.uid = incoming.uid.clone();
        }
    }
}

/// Default for a persisted row missing its `current_qty` column entirely:
/// the row is admitted with a zero reading rather than dropped.
fn zero_reading() -> Option<i64> {
    Some(0)
}

/// Deserializes a quantity field leniently: absent, empty, or unparseable
/// values become 0 so that one bad cell does not drop the whole row.
fn lenient_qty<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0))
}

/// Like [`lenient_qty`] but keeps the `Option` wrapper: absent or
/// unparseable values load as `Some(0)` (the row is admitted, not dropped).
fn lenient_opt_qty<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(Some(
        raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(current_qty: Option<i64>, max_qty: i64) -> Product {
        Product {
            car_name: "Twin Mill".to_string(),
            sku: "HW-001".to_string(),
            page_name: "twin-mill".to_string(),
            max_qty,
            current_qty,
            image_url: String::new(),
            price: String::new(),
            uid: String::new(),
        }
    }

    #[test]
    fn key_matches_identity_triple() {
        let product = make_product(Some(5), 5);
        let key = product.key();
        assert_eq!(key.page_name, "twin-mill");
        assert_eq!(key.car_name, "Twin Mill");
        assert_eq!(key.sku, "HW-001");
    }

    #[test]
    fn same_identity_ignores_quantities() {
        let a = make_product(Some(5), 5);
        let b = make_product(Some(99), 200);
        assert!(a.same_identity(&b));
    }

    #[test]
    fn same_identity_false_on_differing_sku() {
        let a = make_product(Some(5), 5);
        let mut b = make_product(Some(5), 5);
        b.sku = "HW-002".to_string();
        assert!(!a.same_identity(&b));
    }

    #[test]
    fn normalize_clamps_negative_current_to_zero() {
        let mut product = make_product(Some(-4), 10);
        product.normalize();
        assert_eq!(product.current_qty, Some(0));
        assert_eq!(product.max_qty, 10);
    }

    #[test]
    fn normalize_raises_max_to_cover_current() {
        let mut product = make_product(Some(7), 0);
        product.normalize();
        assert_eq!(product.max_qty, 7);
    }

    #[test]
    fn merge_depletion_takes_lower_current() {
        let mut existing = make_product(Some(10), 10);
        let incoming = make_product(Some(3), 10);
        existing.merge_from(&incoming);
        assert_eq!(existing.current_qty, Some(3));
        assert_eq!(existing.max_qty, 10);
    }

    #[test]
    fn merge_restock_keeps_min_current_and_max_ceiling() {
        let mut existing = make_product(Some(2), 10);
        let incoming = make_product(Some(7), 12);
        existing.merge_from(&incoming);
        assert_eq!(existing.current_qty, Some(2));
        assert_eq!(existing.max_qty, 12);
    }

    #[test]
    fn merge_clamps_negative_incoming_reading() {
        let mut existing = make_product(Some(5), 10);
        let incoming = make_product(Some(-4), 10);
        existing.merge_from(&incoming);
        assert_eq!(existing.current_qty, Some(0));
    }

    #[test]
    fn merge_never_decreases_max() {
        let mut existing = make_product(Some(1), 20);
        let incoming = make_product(Some(1), 5);
        existing.merge_from(&incoming);
        assert_eq!(existing.max_qty, 20);
    }

    #[test]
    fn merge_fills_empty_metadata_only() {
        let mut existing = make_product(Some(5), 5);
        existing.image_url = "https://img.example/twin-mill.jpg".to_string();

        let mut incoming = make_product(Some(5), 5);
        incoming.price = "$25.00".to_string();

        existing.merge_from(&incoming);
        assert_eq!(existing.image_url, "https://img.example/twin-mill.jpg");
        assert_eq!(existing.price, "$25.00");
    }

    #[test]
    fn merge_does_not_overwrite_with_empty_metadata() {
        let mut existing = make_product(Some(5), 5);
        existing.image_url = "https://img.example/a.jpg".to_string();
        existing.price = "$25.00".to_string();

        let incoming = make_product(Some(5), 5);
        existing.merge_from(&incoming);
        assert_eq!(existing.image_url, "https://img.example/a.jpg");
        assert_eq!(existing.price, "$25.00");
    }

    #[test]
    fn merge_prefers_incoming_uid() {
        let mut existing = make_product(Some(5), 5);
        existing.uid = "old-uid".to_string();
        let mut incoming = make_product(Some(5), 5);
        incoming.uid = "new-uid".to_string();
        existing.merge_from(&incoming);
        assert_eq!(existing.uid, "new-uid");
    }

    #[test]
    fn merge_keeps_existing_uid_when_incoming_empty() {
        let mut existing = make_product(Some(5), 5);
        existing.uid = "old-uid".to_string();
        let incoming = make_product(Some(5), 5);
        existing.merge_from(&incoming);
        assert_eq!(existing.uid, "old-uid");
    }

    #[test]
    fn merge_with_absent_incoming_reading_keeps_existing() {
        let mut existing = make_product(Some(5), 10);
        let incoming = make_product(None, 0);
        existing.merge_from(&incoming);
        assert_eq!(existing.current_qty, Some(5));
        assert_eq!(existing.max_qty, 10);
    }

    #[test]
    fn lenient_deserialization_admits_bad_quantity_cells() {
        let json = r#"{
            "car_name": "Bone Shaker",
            "sku": "HW-002",
            "page_name": "bone-shaker",
            "max_qty": "not-a-number",
            "current_qty": "",
            "image_url": "",
            "price": ""
        }"#;
        let product: Product = serde_json::from_str(json).expect("row should be admitted");
        assert_eq!(product.max_qty, 0);
        assert_eq!(product.current_qty, Some(0));
    }
}
