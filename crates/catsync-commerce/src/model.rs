use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// Single price and stock level.
    Simple,
    /// Price and stock live on attribute-driven variations.
    Variable,
}

impl ProductKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductKind::Simple => "simple",
            ProductKind::Variable => "variable",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// A commerce product as reconciliation sees it.
///
/// `id` is `None` until the product has been saved once. Optional fields
/// left as `None` are not sent on save, so the stored value is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Option<u64>,
    pub kind: ProductKind,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub regular_price: Option<Decimal>,
    pub category_ids: Option<Vec<u64>>,
    /// Current primary image, as read from the catalog.
    pub image_id: Option<u64>,
    /// Primary image assigned since the product was read. Only this is sent
    /// on save; the stored gallery is left alone otherwise.
    pub new_image_id: Option<u64>,
    pub manage_stock: Option<bool>,
    pub stock_quantity: Option<i64>,
    pub weight: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub attributes: Vec<ProductAttribute>,
}

impl Product {
    /// Unsaved product with only kind and SKU set.
    #[must_use]
    pub fn new(kind: ProductKind, sku: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            sku: sku.into(),
            name: String::new(),
            description: String::new(),
            regular_price: None,
            category_ids: None,
            image_id: None,
            new_image_id: None,
            manage_stock: None,
            stock_quantity: None,
            weight: None,
            dimensions: None,
            attributes: Vec::new(),
        }
    }

    /// Make `image_id` the primary image on the next save.
    pub fn assign_image(&mut self, image_id: u64) {
        self.image_id = Some(image_id);
        self.new_image_id = Some(image_id);
    }
}

/// A global attribute attached to a product, with the term names it offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAttribute {
    pub attribute_id: u64,
    pub name: String,
    pub options: Vec<String>,
    pub visible: bool,
    /// Whether variations are generated from this attribute.
    pub variation: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    pub id: Option<u64>,
    pub parent_id: u64,
    pub sku: String,
    pub description: String,
    pub regular_price: Option<Decimal>,
    pub manage_stock: Option<bool>,
    pub stock_quantity: Option<i64>,
    pub attributes: Vec<VariationAttribute>,
}

impl Variation {
    #[must_use]
    pub fn new(parent_id: u64, sku: impl Into<String>) -> Self {
        Self {
            id: None,
            parent_id,
            sku: sku.into(),
            description: String::new(),
            regular_price: None,
            manage_stock: None,
            stock_quantity: None,
            attributes: Vec::new(),
        }
    }
}

/// The term a variation takes for one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationAttribute {
    pub attribute_id: u64,
    pub name: String,
    /// Term name.
    pub option: String,
}

/// Requested shape of a global attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Slug without the taxonomy prefix, e.g. `color`.
    pub slug: String,
    /// Display label, e.g. `Color`.
    pub label: String,
}

impl AttributeSpec {
    #[must_use]
    pub fn new(slug: &str, label: &str) -> Self {
        Self {
            slug: slug.to_string(),
            label: label.to_string(),
        }
    }

    /// Taxonomy name as stored by the platform, e.g. `pa_color`.
    #[must_use]
    pub fn taxonomy(&self) -> String {
        format!("pa_{}", self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: u64,
    pub name: String,
    pub slug: String,
}
