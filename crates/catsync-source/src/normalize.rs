//! Conversion from raw source payloads to [`catsync_core::CachedProduct`].

use catsync_core::CachedProduct;
use serde_json::Value;

use crate::error::SourceError;
use crate::types::GenericProduct;

/// Normalizes a [`GenericProduct`] into the cached record shape.
///
/// Prices are rounded to two decimal places to match the cache column.
/// Missing nested lists become empty arrays.
///
/// # Errors
///
/// Returns [`SourceError::Normalization`] if the external id is blank.
pub fn normalize_product(product: GenericProduct) -> Result<CachedProduct, SourceError> {
    let external_id = product.external_id.trim().to_string();
    if external_id.is_empty() {
        return Err(SourceError::Normalization {
            external_id: product.external_id,
            reason: "external_id is empty".into(),
        });
    }

    Ok(CachedProduct {
        external_id,
        name: product.name.map(|n| n.trim().to_string()).unwrap_or_default(),
        description: product.description,
        price: product.price.map(|p| p.round_dp(2)),
        currency: product.currency.filter(|c| !c.trim().is_empty()),
        minimum_order_quantity: product.minimum_order_quantity,
        unit_weight: product.unit_weight,
        height: product.height,
        length: product.length,
        families: list_or_empty(product.families),
        images: list_or_empty(product.images),
        products: list_or_empty(product.products),
        subattributes: list_or_empty(product.subattributes),
    })
}

fn list_or_empty(value: Value) -> Value {
    match value {
        Value::Null => Value::Array(Vec::new()),
        other => other,
    }
}
