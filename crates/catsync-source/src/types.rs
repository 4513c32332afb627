//! Response types for the source catalog's `generic_product` endpoints.
//!
//! ## Observed shape
//!
//! ### Listing: `GET {base}?page=N&limit=M`
//! `{"generic_products": [...], "total_pages": 12}`. `total_pages` is
//! sometimes absent on single-page responses; treat absence as one page.
//!
//! ### Single product: `GET {base}/{id}`
//! `{"generic_product": {...}}`.
//!
//! ### Numeric fields
//! `price` arrives as a number or a numeric string depending on the record.
//! Integer measurements (`unit_weight`, `height`, ...) behave the same way
//! and are occasionally `null`.
//!
//! ### Nested lists
//! `families`, `images`, `products` (variants) and `subattributes` are
//! passed through untouched; their shapes vary between records.

use std::str::FromStr;

use catsync_core::de::value_as_i64;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One product entry from the source catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct GenericProduct {
    #[serde(deserialize_with = "catsync_core::de::string_or_number")]
    pub external_id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default, deserialize_with = "lenient_i32")]
    pub minimum_order_quantity: Option<i32>,

    #[serde(default, deserialize_with = "lenient_i32")]
    pub unit_weight: Option<i32>,

    #[serde(default, deserialize_with = "lenient_i32")]
    pub height: Option<i32>,

    #[serde(default, deserialize_with = "lenient_i32")]
    pub length: Option<i32>,

    #[serde(default)]
    pub families: Value,

    #[serde(default)]
    pub images: Value,

    #[serde(default)]
    pub products: Value,

    #[serde(default)]
    pub subattributes: Value,
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    })
}

fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_i64(&Value::deserialize(deserializer)?).and_then(|n| i32::try_from(n).ok()))
}
