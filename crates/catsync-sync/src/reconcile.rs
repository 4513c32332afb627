//! Reconciliation of one cached record with the commerce catalog.
//!
//! The commerce product is located by SKU (the record's external id). An
//! existing product is updated in place and keeps its kind; a new product is
//! variable when the record lists more than one variant, simple otherwise.
//! Fields named in the omit set are left as they are. Category assignment of
//! an existing product is never touched.

use catsync_commerce::{
    Attribute, AttributeSpec, CommerceCatalog, Dimensions, Product, ProductAttribute, ProductKind,
    Term, Variation, VariationAttribute,
};
use catsync_core::{CachedProduct, OmitField, OmitFields, ReconcileAction, SourceVariant};

use crate::context::{Commerce, SyncContext};
use crate::error::ReconcileError;

/// Global attributes derived from the variant color descriptors, as
/// `(slug, label)`. Index 0 reads `element_description_1`, index 1 reads
/// `element_description_2`.
pub const COLOR_ATTRIBUTES: [(&str, &str); 2] = [("color", "Color"), ("color2", "Color 2")];

/// Create or update the commerce product (and its variations) for `record`.
///
/// Image import failures are logged and never fail the record. Category
/// creation failures are logged and the category is left off.
///
/// # Errors
///
/// Returns [`ReconcileError`] when a product or variation lookup or save
/// fails, or a color attribute or term cannot be resolved.
pub async fn reconcile_record(
    ctx: &SyncContext,
    record: &CachedProduct,
    omit: OmitFields,
) -> Result<ReconcileAction, ReconcileError> {
    let commerce = ctx.commerce().map_err(|_| ReconcileError::NotConfigured)?;
    Reconciler { ctx, commerce }.run(record, omit).await
}

struct Reconciler<'a> {
    ctx: &'a SyncContext,
    commerce: &'a Commerce,
}

/// Color attributes resolved for one record, with the terms of every value
/// seen across its variants.
#[derive(Default)]
struct ColorAttributes {
    resolved: [Option<(Attribute, Vec<Term>)>; 2],
}

impl ColorAttributes {
    fn product_attributes(&self) -> Vec<ProductAttribute> {
        self.resolved
            .iter()
            .flatten()
            .map(|(attribute, terms)| ProductAttribute {
                attribute_id: attribute.id,
                name: attribute.name.clone(),
                options: terms.iter().map(|t| t.name.clone()).collect(),
                visible: true,
                variation: true,
            })
            .collect()
    }

    fn variation_attributes(&self, variant: &SourceVariant) -> Vec<VariationAttribute> {
        let mut out = Vec::new();
        for (index, slot) in self.resolved.iter().enumerate() {
            let (Some((attribute, terms)), Some(value)) = (slot, descriptor(variant, index)) else {
                continue;
            };
            let option = terms
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(value))
                .map_or_else(|| value.to_string(), |t| t.name.clone());
            out.push(VariationAttribute {
                attribute_id: attribute.id,
                name: attribute.name.clone(),
                option,
            });
        }
        out
    }
}

fn descriptor(variant: &SourceVariant, index: usize) -> Option<&str> {
    match index {
        0 => variant.element_description_1.as_deref(),
        _ => variant.element_description_2.as_deref(),
    }
}

/// Distinct descriptor values at `index` across `variants`, in first-seen order.
fn distinct_descriptors(variants: &[SourceVariant], index: usize) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in variants.iter().filter_map(|v| descriptor(v, index)) {
        if !values.iter().any(|seen| seen == value) {
            values.push(value.to_string());
        }
    }
    values
}

impl Reconciler<'_> {
    fn catalog(&self) -> &dyn CommerceCatalog {
        self.commerce.catalog.as_ref()
    }

    async fn run(
        &self,
        record: &CachedProduct,
        mut omit: OmitFields,
    ) -> Result<ReconcileAction, ReconcileError> {
        let sink = self.ctx.sink();
        let sku = record.external_id.as_str();
        sink.debug(format!("Importing product: {sku} ({})", record.name))
            .await;

        let existing = self
            .catalog()
            .find_product_by_sku(sku)
            .await
            .map_err(|source| ReconcileError::Lookup {
                sku: sku.to_string(),
                source,
            })?;

        let (mut product, action) = match existing {
            Some(product) => {
                omit.insert(OmitField::Categories);
                sink.debug(format!("Updating existing product: {sku}")).await;
                (product, ReconcileAction::Updated)
            }
            None => {
                let kind = if record.is_variable() {
                    ProductKind::Variable
                } else {
                    ProductKind::Simple
                };
                sink.debug(format!("Creating new {} product: {sku}", kind.as_str()))
                    .await;
                (Product::new(kind, sku), ReconcileAction::Imported)
            }
        };

        self.apply_fields(&mut product, record, omit).await;

        let colors = match product.kind {
            ProductKind::Simple => {
                apply_simple_stock(&mut product, record, omit);
                ColorAttributes::default()
            }
            ProductKind::Variable => {
                let variants = record.variants();
                let colors = self.resolve_colors(&variants).await?;
                if !variants.is_empty() {
                    product.attributes = colors.product_attributes();
                }
                colors
            }
        };

        let product_id = self.save_product(&product).await?;
        product.id = Some(product_id);

        if product.kind == ProductKind::Variable && !omit.contains(OmitField::Variants) {
            let saved = self
                .sync_variations(product_id, record, omit, &colors)
                .await?;
            if saved > 0 {
                self.save_product(&product).await?;
            }
        }

        let verb = match action {
            ReconcileAction::Imported => "imported",
            ReconcileAction::Updated => "updated",
        };
        sink.info(format!("Product {sku} {verb} successfully")).await;
        Ok(action)
    }

    async fn save_product(&self, product: &Product) -> Result<u64, ReconcileError> {
        self.catalog()
            .save_product(product)
            .await
            .map_err(|source| ReconcileError::SaveProduct {
                sku: product.sku.clone(),
                source,
            })
    }

    async fn apply_fields(&self, product: &mut Product, record: &CachedProduct, omit: OmitFields) {
        if !omit.contains(OmitField::Title) {
            product.name.clone_from(&record.name);
        }
        if !omit.contains(OmitField::Description) {
            product.description = record.description.clone().unwrap_or_default();
        }
        if !omit.contains(OmitField::Categories) {
            product.category_ids = Some(self.category_ids(record).await);
        }
        if !omit.contains(OmitField::Image) {
            self.attach_primary_image(product, record).await;
        }

        product.sku.clone_from(&record.external_id);

        if !omit.contains(OmitField::Price) {
            if let Some(price) = record.price {
                product.regular_price = Some(price);
                self.ctx
                    .sink()
                    .debug(format!(
                        "Price set for product {}: {price}",
                        record.external_id
                    ))
                    .await;
            }
        }
        if !omit.contains(OmitField::Packing) {
            apply_packing(product, record);
        }
    }

    async fn category_ids(&self, record: &CachedProduct) -> Vec<u64> {
        let sink = self.ctx.sink();
        let mut ids = Vec::new();
        for name in record.category_names() {
            match self.catalog().ensure_category(&name).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    sink.error(format!("Error creating category '{name}': {e}")).await;
                }
            }
        }
        sink.debug(format!(
            "Categories updated for product: {}",
            record.external_id
        ))
        .await;
        ids
    }

    /// Download the first listed image and assign it, unless the product
    /// already has one. Never fails the record.
    async fn attach_primary_image(&self, product: &mut Product, record: &CachedProduct) {
        let sink = self.ctx.sink();
        let sku = &record.external_id;

        if product.image_id.is_some() {
            sink.info(format!(
                "Product {sku} already has a primary image; skipping image import"
            ))
            .await;
            return;
        }

        let Some(first) = record.images().into_iter().next() else {
            return;
        };
        let Some(url) = first.image_url else {
            sink.error(format!("Empty image URL for product: {}", record.name))
                .await;
            return;
        };

        sink.debug(format!("Importing image from URL: {url}")).await;
        let uploaded = match self.ctx.images().fetch(&url).await {
            Ok(file) => self
                .commerce
                .media
                .upload_image(&file)
                .await
                .map_err(|e| format!("Error storing image {}: {e}", file.filename)),
            Err(e) => Err(format!("Error downloading image {url}: {e}")),
        };

        match uploaded {
            Ok(id) => {
                product.assign_image(id);
                sink.info(format!("Image imported successfully. ID: {id}")).await;
            }
            Err(reason) => {
                sink.error(reason).await;
                sink.warning(format!("Could not import image for product: {sku}"))
                    .await;
            }
        }
    }

    /// Ensure both color attributes and the terms for every descriptor value
    /// across `variants`. Attributes with no values are left unresolved.
    async fn resolve_colors(
        &self,
        variants: &[SourceVariant],
    ) -> Result<ColorAttributes, ReconcileError> {
        let mut colors = ColorAttributes::default();

        for (index, (slug, label)) in COLOR_ATTRIBUTES.iter().enumerate() {
            let values = distinct_descriptors(variants, index);
            if values.is_empty() {
                continue;
            }

            let attribute = self
                .catalog()
                .ensure_attribute(&AttributeSpec::new(*slug, *label))
                .await
                .map_err(|source| ReconcileError::Attribute {
                    slug: (*slug).to_string(),
                    source,
                })?;

            let mut terms = Vec::with_capacity(values.len());
            for value in values {
                let term = self
                    .catalog()
                    .ensure_term(&attribute, &value)
                    .await
                    .map_err(|source| ReconcileError::Term {
                        slug: (*slug).to_string(),
                        term: value.clone(),
                        source,
                    })?;
                terms.push(term);
            }

            colors.resolved[index] = Some((attribute, terms));
        }

        Ok(colors)
    }

    /// Create or update one variation per variant that carries at least one
    /// color descriptor. Returns how many variations were saved.
    async fn sync_variations(
        &self,
        product_id: u64,
        record: &CachedProduct,
        omit: OmitFields,
        colors: &ColorAttributes,
    ) -> Result<usize, ReconcileError> {
        let sink = self.ctx.sink();
        let mut saved = 0;

        for variant in record.variants() {
            if variant.lacks_descriptors() {
                sink.debug(format!("Skipping variation without colors: {}", variant.id))
                    .await;
                continue;
            }

            let existing = self
                .catalog()
                .find_variation_by_sku(product_id, &variant.id)
                .await
                .map_err(|source| ReconcileError::Lookup {
                    sku: variant.id.clone(),
                    source,
                })?;
            if existing.is_some() {
                sink.debug(format!(
                    "Updating existing variation with SKU: {}",
                    variant.id
                ))
                .await;
            }

            let mut variation =
                existing.unwrap_or_else(|| Variation::new(product_id, variant.id.clone()));
            variation.parent_id = product_id;
            variation.sku.clone_from(&variant.id);
            variation.description = variant.general_description.clone().unwrap_or_default();
            variation.attributes = colors.variation_attributes(&variant);

            if !omit.contains(OmitField::Price) {
                if let Some(price) = record.price {
                    variation.regular_price = Some(price);
                }
            }
            if !omit.contains(OmitField::Stock) {
                variation.stock_quantity = variant.stock;
                variation.manage_stock = Some(true);
            }

            self.catalog()
                .save_variation(&variation)
                .await
                .map_err(|source| ReconcileError::SaveVariation {
                    sku: variant.id.clone(),
                    source,
                })?;
            saved += 1;
        }

        Ok(saved)
    }
}

/// Simple products take their stock from the first listed variant.
fn apply_simple_stock(product: &mut Product, record: &CachedProduct, omit: OmitFields) {
    if omit.contains(OmitField::Stock) {
        return;
    }
    if let Some(first) = record.variants().into_iter().next() {
        product.stock_quantity = first.stock;
        product.manage_stock = Some(true);
    }
}

/// `unit_weight` becomes the weight; `height` and `length` become dimensions.
/// Width is not supplied by the source and is kept as stored.
fn apply_packing(product: &mut Product, record: &CachedProduct) {
    if let Some(weight) = record.unit_weight {
        product.weight = Some(weight.to_string());
    }
    if record.height.is_some() || record.length.is_some() {
        let current = product.dimensions.take().unwrap_or_default();
        product.dimensions = Some(Dimensions {
            length: record.length.map(|l| l.to_string()).or(current.length),
            width: current.width,
            height: record.height.map(|h| h.to_string()).or(current.height),
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn variant(id: &str, c1: Option<&str>, c2: Option<&str>) -> SourceVariant {
        SourceVariant {
            id: id.to_string(),
            stock: Some(1),
            element_description_1: c1.map(str::to_string),
            element_description_2: c2.map(str::to_string),
            general_description: None,
        }
    }

    fn record() -> CachedProduct {
        CachedProduct {
            external_id: "Z1".to_string(),
            name: "Mug".to_string(),
            description: None,
            price: None,
            currency: None,
            minimum_order_quantity: None,
            unit_weight: Some(350),
            height: Some(10),
            length: None,
            families: json!([]),
            images: json!([]),
            products: json!([]),
            subattributes: json!([]),
        }
    }

    #[test]
    fn distinct_descriptors_keep_first_seen_order() {
        let variants = vec![
            variant("1", Some("Red"), None),
            variant("2", Some("Blue"), Some("White")),
            variant("3", Some("Red"), Some("White")),
        ];
        assert_eq!(distinct_descriptors(&variants, 0), vec!["Red", "Blue"]);
        assert_eq!(distinct_descriptors(&variants, 1), vec!["White"]);
    }

    #[test]
    fn variation_attributes_use_resolved_term_names() {
        let colors = ColorAttributes {
            resolved: [
                Some((
                    Attribute {
                        id: 2,
                        name: "Color".to_string(),
                        slug: "color".to_string(),
                    },
                    vec![Term {
                        id: 9,
                        name: "Red".to_string(),
                        slug: "red".to_string(),
                    }],
                )),
                None,
            ],
        };

        let attrs = colors.variation_attributes(&variant("1", Some("red"), Some("White")));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].attribute_id, 2);
        assert_eq!(attrs[0].option, "Red");
    }

    #[test]
    fn packing_sets_weight_and_keeps_stored_width() {
        let mut product = Product::new(ProductKind::Simple, "Z1");
        product.dimensions = Some(Dimensions {
            length: Some("4".to_string()),
            width: Some("7".to_string()),
            height: None,
        });

        apply_packing(&mut product, &record());
        assert_eq!(product.weight.as_deref(), Some("350"));
        assert_eq!(
            product.dimensions,
            Some(Dimensions {
                length: Some("4".to_string()),
                width: Some("7".to_string()),
                height: Some("10".to_string()),
            })
        );
    }

    #[test]
    fn simple_stock_comes_from_first_variant() {
        let mut rec = record();
        rec.products = json!([{"id": 5, "stock": 12}, {"id": 6, "stock": 99}]);

        let mut product = Product::new(ProductKind::Simple, "Z1");
        apply_simple_stock(&mut product, &rec, OmitFields::empty());
        assert_eq!(product.stock_quantity, Some(12));
        assert_eq!(product.manage_stock, Some(true));

        let mut untouched = Product::new(ProductKind::Simple, "Z1");
        apply_simple_stock(&mut untouched, &rec, OmitFields::empty().with(OmitField::Stock));
        assert_eq!(untouched.stock_quantity, None);
        assert_eq!(untouched.manage_stock, None);
    }
}
