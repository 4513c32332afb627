//! In-process catalog used by pipeline tests and dry runs.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::catalog::{CommerceCatalog, MediaLibrary};
use crate::error::CommerceError;
use crate::image::ImageFile;
use crate::model::{Attribute, AttributeSpec, Product, Term, Variation};
use crate::slug::slugify;

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    products: Vec<Product>,
    variations: Vec<Variation>,
    categories: Vec<(u64, String)>,
    attributes: Vec<Attribute>,
    terms: HashMap<u64, Vec<Term>>,
    uploads: Vec<(u64, String)>,
    product_saves: usize,
    variation_saves: usize,
    rejected_skus: HashSet<String>,
    reject_uploads: bool,
}

impl State {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// [`CommerceCatalog`] and [`MediaLibrary`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make saves of the product with this SKU fail.
    pub fn reject_product_sku(&self, sku: impl Into<String>) {
        self.lock().rejected_skus.insert(sku.into());
    }

    /// Make every media upload fail.
    pub fn reject_uploads(&self) {
        self.lock().reject_uploads = true;
    }

    /// Insert a product as if it had been created earlier. Returns its id.
    pub fn seed_product(&self, mut product: Product) -> u64 {
        let mut state = self.lock();
        let id = state.allocate_id();
        product.id = Some(id);
        state.products.push(product);
        id
    }

    #[must_use]
    pub fn product_by_sku(&self, sku: &str) -> Option<Product> {
        self.lock().products.iter().find(|p| p.sku == sku).cloned()
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    #[must_use]
    pub fn variations_of(&self, parent_id: u64) -> Vec<Variation> {
        self.lock()
            .variations
            .iter()
            .filter(|v| v.parent_id == parent_id)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.lock()
            .categories
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }

    #[must_use]
    pub fn attributes(&self) -> Vec<Attribute> {
        self.lock().attributes.clone()
    }

    #[must_use]
    pub fn term_names(&self, attribute_id: u64) -> Vec<String> {
        self.lock()
            .terms
            .get(&attribute_id)
            .map(|terms| terms.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Filenames of uploaded images, in upload order.
    #[must_use]
    pub fn uploaded_filenames(&self) -> Vec<String> {
        self.lock()
            .uploads
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }

    #[must_use]
    pub fn product_saves(&self) -> usize {
        self.lock().product_saves
    }

    #[must_use]
    pub fn variation_saves(&self) -> usize {
        self.lock().variation_saves
    }
}

/// Overlay `incoming` on `stored`, keeping stored values for unset fields.
fn merge_product(stored: &mut Product, incoming: &Product) {
    stored.kind = incoming.kind;
    stored.sku.clone_from(&incoming.sku);
    stored.name.clone_from(&incoming.name);
    stored.description.clone_from(&incoming.description);
    if incoming.regular_price.is_some() {
        stored.regular_price = incoming.regular_price;
    }
    if incoming.category_ids.is_some() {
        stored.category_ids.clone_from(&incoming.category_ids);
    }
    if let Some(image_id) = incoming.new_image_id {
        stored.image_id = Some(image_id);
    }
    if incoming.manage_stock.is_some() {
        stored.manage_stock = incoming.manage_stock;
    }
    if incoming.stock_quantity.is_some() {
        stored.stock_quantity = incoming.stock_quantity;
    }
    if incoming.weight.is_some() {
        stored.weight.clone_from(&incoming.weight);
    }
    if incoming.dimensions.is_some() {
        stored.dimensions.clone_from(&incoming.dimensions);
    }
    if !incoming.attributes.is_empty() {
        stored.attributes.clone_from(&incoming.attributes);
    }
}

fn merge_variation(stored: &mut Variation, incoming: &Variation) {
    stored.sku.clone_from(&incoming.sku);
    stored.description.clone_from(&incoming.description);
    if incoming.regular_price.is_some() {
        stored.regular_price = incoming.regular_price;
    }
    if incoming.manage_stock.is_some() {
        stored.manage_stock = incoming.manage_stock;
    }
    if incoming.stock_quantity.is_some() {
        stored.stock_quantity = incoming.stock_quantity;
    }
    stored.attributes.clone_from(&incoming.attributes);
}

#[async_trait]
impl CommerceCatalog for MemoryCatalog {
    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, CommerceError> {
        Ok(self.product_by_sku(sku))
    }

    async fn save_product(&self, product: &Product) -> Result<u64, CommerceError> {
        let mut state = self.lock();
        if state.rejected_skus.contains(&product.sku) {
            return Err(CommerceError::Rejected(format!(
                "product save refused for sku {}",
                product.sku
            )));
        }
        state.product_saves += 1;

        if let Some(id) = product.id {
            let stored = state
                .products
                .iter_mut()
                .find(|p| p.id == Some(id))
                .ok_or_else(|| CommerceError::NotFound {
                    entity: "product",
                    id: id.to_string(),
                })?;
            merge_product(stored, product);
            return Ok(id);
        }

        let id = state.allocate_id();
        let mut created = product.clone();
        created.id = Some(id);
        created.image_id = product.new_image_id;
        created.new_image_id = None;
        state.products.push(created);
        Ok(id)
    }

    async fn find_variation_by_sku(
        &self,
        parent_id: u64,
        sku: &str,
    ) -> Result<Option<Variation>, CommerceError> {
        Ok(self
            .lock()
            .variations
            .iter()
            .find(|v| v.parent_id == parent_id && v.sku == sku)
            .cloned())
    }

    async fn save_variation(&self, variation: &Variation) -> Result<u64, CommerceError> {
        let mut state = self.lock();
        if !state
            .products
            .iter()
            .any(|p| p.id == Some(variation.parent_id))
        {
            return Err(CommerceError::NotFound {
                entity: "product",
                id: variation.parent_id.to_string(),
            });
        }
        state.variation_saves += 1;

        if let Some(id) = variation.id {
            let stored = state
                .variations
                .iter_mut()
                .find(|v| v.id == Some(id))
                .ok_or_else(|| CommerceError::NotFound {
                    entity: "variation",
                    id: id.to_string(),
                })?;
            merge_variation(stored, variation);
            return Ok(id);
        }

        let id = state.allocate_id();
        let mut created = variation.clone();
        created.id = Some(id);
        state.variations.push(created);
        Ok(id)
    }

    async fn ensure_category(&self, name: &str) -> Result<u64, CommerceError> {
        let mut state = self.lock();
        if let Some((id, _)) = state
            .categories
            .iter()
            .find(|(_, existing)| existing.eq_ignore_ascii_case(name))
        {
            return Ok(*id);
        }
        let id = state.allocate_id();
        state.categories.push((id, name.to_string()));
        Ok(id)
    }

    async fn ensure_attribute(&self, spec: &AttributeSpec) -> Result<Attribute, CommerceError> {
        let mut state = self.lock();
        if let Some(found) = state.attributes.iter().find(|a| a.slug == spec.slug) {
            return Ok(found.clone());
        }
        let attribute = Attribute {
            id: state.allocate_id(),
            name: spec.label.clone(),
            slug: spec.slug.clone(),
        };
        state.attributes.push(attribute.clone());
        Ok(attribute)
    }

    async fn ensure_term(&self, attribute: &Attribute, name: &str) -> Result<Term, CommerceError> {
        let mut state = self.lock();
        if let Some(found) = state
            .terms
            .get(&attribute.id)
            .and_then(|terms| terms.iter().find(|t| t.name.eq_ignore_ascii_case(name)))
        {
            return Ok(found.clone());
        }
        let term = Term {
            id: state.allocate_id(),
            name: name.to_string(),
            slug: slugify(name),
        };
        state
            .terms
            .entry(attribute.id)
            .or_default()
            .push(term.clone());
        Ok(term)
    }
}

#[async_trait]
impl MediaLibrary for MemoryCatalog {
    async fn upload_image(&self, image: &ImageFile) -> Result<u64, CommerceError> {
        let mut state = self.lock();
        if state.reject_uploads {
            return Err(CommerceError::Rejected(format!(
                "upload refused for {}",
                image.filename
            )));
        }
        let id = state.allocate_id();
        state.uploads.push((id, image.filename.clone()));
        Ok(id)
    }
}
