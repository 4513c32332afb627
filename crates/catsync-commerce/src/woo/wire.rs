//! WooCommerce REST (`wc/v3`) request and response bodies.
//!
//! Prices and measurements travel as strings (`"4990.00"`, `"12"`); an empty
//! string means unset. Ids are numbers. Category, term and attribute names
//! come back HTML-escaped (`&amp;`).

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{
    Dimensions, Product, ProductAttribute, ProductKind, Variation, VariationAttribute,
};

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireProduct {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub categories: Vec<WireRef>,
    #[serde(default)]
    pub images: Vec<WireRef>,
    #[serde(default)]
    pub manage_stock: WireManageStock,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub dimensions: WireDimensions,
    #[serde(default)]
    pub attributes: Vec<WireProductAttribute>,
}

/// Variations report `manage_stock` as `"parent"` when inheriting from the
/// parent product; products report a plain boolean.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireManageStock {
    Flag(bool),
    Inherited(String),
    #[default]
    Missing,
}

impl WireManageStock {
    fn as_flag(&self) -> Option<bool> {
        match self {
            WireManageStock::Flag(flag) => Some(*flag),
            WireManageStock::Inherited(_) | WireManageStock::Missing => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireVariation {
    pub id: u64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub manage_stock: WireManageStock,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub attributes: Vec<WireVariationAttribute>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireRef {
    pub id: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct WireDimensions {
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub width: String,
    #[serde(default)]
    pub height: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireProductAttribute {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub variation: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireVariationAttribute {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub option: String,
}

/// Category, attribute, or term listing entry.
#[derive(Debug, Deserialize)]
pub(crate) struct WireTaxon {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMedia {
    pub id: u64,
}

/// REST error body, e.g. `{"code": "term_exists", "message": "...", "data": {"resource_id": 12}}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<WireErrorData>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireErrorData {
    #[serde(default)]
    pub resource_id: Option<u64>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ProductWrite<'a> {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub sku: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<WireRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<WireRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<WireDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<WireProductAttribute>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VariationWrite<'a> {
    pub sku: &'a str,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    pub attributes: Vec<WireVariationAttribute>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttributeWrite<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub order_by: &'static str,
    pub has_archives: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct NamedWrite<'a> {
    pub name: &'a str,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn parse_price(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else {
        Decimal::from_str(raw).ok()
    }
}

fn format_price(price: Decimal) -> String {
    format!("{:.2}", price.round_dp(2))
}

fn non_empty(raw: String) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw)
    }
}

/// Undo the entity escaping WordPress applies to taxonomy names.
pub(crate) fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&")
        .replace("&#039;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

impl From<WireProduct> for Product {
    fn from(wire: WireProduct) -> Self {
        let kind = if wire.type_ == "variable" {
            ProductKind::Variable
        } else {
            ProductKind::Simple
        };
        let dimensions = Dimensions {
            length: non_empty(wire.dimensions.length),
            width: non_empty(wire.dimensions.width),
            height: non_empty(wire.dimensions.height),
        };
        let has_dimensions = dimensions != Dimensions::default();

        Self {
            id: Some(wire.id),
            kind,
            sku: wire.sku,
            name: wire.name,
            description: wire.description,
            regular_price: parse_price(&wire.regular_price),
            category_ids: Some(wire.categories.into_iter().map(|c| c.id).collect()),
            image_id: wire.images.first().map(|image| image.id),
            new_image_id: None,
            manage_stock: wire.manage_stock.as_flag(),
            stock_quantity: wire.stock_quantity,
            weight: non_empty(wire.weight),
            dimensions: has_dimensions.then_some(dimensions),
            attributes: wire
                .attributes
                .into_iter()
                .map(|a| ProductAttribute {
                    attribute_id: a.id,
                    name: a.name,
                    options: a.options,
                    visible: a.visible,
                    variation: a.variation,
                })
                .collect(),
        }
    }
}

impl WireVariation {
    pub(crate) fn into_variation(self, parent_id: u64) -> Variation {
        Variation {
            id: Some(self.id),
            parent_id,
            sku: self.sku,
            description: self.description,
            regular_price: parse_price(&self.regular_price),
            manage_stock: self.manage_stock.as_flag(),
            stock_quantity: self.stock_quantity,
            attributes: self
                .attributes
                .into_iter()
                .map(|a| VariationAttribute {
                    attribute_id: a.id,
                    name: a.name,
                    option: a.option,
                })
                .collect(),
        }
    }
}

impl<'a> From<&'a Product> for ProductWrite<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            type_: product.kind.as_str(),
            sku: &product.sku,
            name: &product.name,
            description: &product.description,
            regular_price: product.regular_price.map(format_price),
            categories: product
                .category_ids
                .as_ref()
                .map(|ids| ids.iter().map(|id| WireRef { id: *id }).collect()),
            images: product.new_image_id.map(|id| vec![WireRef { id }]),
            manage_stock: product.manage_stock,
            stock_quantity: product.stock_quantity,
            weight: product.weight.as_deref(),
            dimensions: product.dimensions.as_ref().map(|d| WireDimensions {
                length: d.length.clone().unwrap_or_default(),
                width: d.width.clone().unwrap_or_default(),
                height: d.height.clone().unwrap_or_default(),
            }),
            attributes: (!product.attributes.is_empty()).then(|| {
                product
                    .attributes
                    .iter()
                    .map(|a| WireProductAttribute {
                        id: a.attribute_id,
                        name: a.name.clone(),
                        visible: a.visible,
                        variation: a.variation,
                        options: a.options.clone(),
                    })
                    .collect()
            }),
        }
    }
}

impl<'a> From<&'a Variation> for VariationWrite<'a> {
    fn from(variation: &'a Variation) -> Self {
        Self {
            sku: &variation.sku,
            description: &variation.description,
            regular_price: variation.regular_price.map(format_price),
            manage_stock: variation.manage_stock,
            stock_quantity: variation.stock_quantity,
            attributes: variation
                .attributes
                .iter()
                .map(|a| WireVariationAttribute {
                    id: a.attribute_id,
                    name: a.name.clone(),
                    option: a.option.clone(),
                })
                .collect(),
        }
    }
}
