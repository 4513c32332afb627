use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de;

/// One source catalog entry as mirrored in the local cache.
///
/// The four variable-shape fields (`families`, `images`, `products`,
/// `subattributes`) are kept as opaque JSON exactly as the source API sent
/// them and are only parsed when reconciliation needs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedProduct {
    /// Source-assigned identifier. Unique within the cache; also the SKU of
    /// the commerce product built from this record.
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Base price, two decimal places.
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub minimum_order_quantity: Option<i32>,
    pub unit_weight: Option<i32>,
    pub height: Option<i32>,
    pub length: Option<i32>,
    /// Category list, e.g. `[{"description": "Mugs"}]`.
    pub families: Value,
    /// Image list, e.g. `[{"image_url": "https://..."}]`.
    pub images: Value,
    /// Variant list; each entry becomes a commerce variation for variable products.
    pub products: Value,
    pub subattributes: Value,
}

impl CachedProduct {
    /// Number of entries in the raw variant list, parseable or not.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.products.as_array().map_or(0, Vec::len)
    }

    /// `true` when the record should become a variable (multi-variation) product.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.variant_count() > 1
    }

    /// Variant entries that deserialize cleanly. Malformed entries are skipped.
    #[must_use]
    pub fn variants(&self) -> Vec<SourceVariant> {
        parse_list(&self.products)
    }

    #[must_use]
    pub fn families(&self) -> Vec<Family> {
        parse_list(&self.families)
    }

    #[must_use]
    pub fn images(&self) -> Vec<SourceImage> {
        parse_list(&self.images)
    }

    /// Trimmed, non-empty category names in source order.
    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.families()
            .into_iter()
            .filter_map(|family| family.description)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

fn parse_list<T>(value: &Value) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// One entry of a cached record's variant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceVariant {
    /// Source variant identifier; used as the variation SKU.
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    pub stock: Option<i64>,
    /// First color descriptor.
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub element_description_1: Option<String>,
    /// Second color descriptor.
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub element_description_2: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub general_description: Option<String>,
}

impl SourceVariant {
    /// `true` when neither color descriptor is present. Such variants have no
    /// attribute values and are not turned into variations.
    #[must_use]
    pub fn lacks_descriptors(&self) -> bool {
        self.element_description_1.is_none() && self.element_description_2.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub image_url: Option<String>,
}
