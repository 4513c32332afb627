use async_trait::async_trait;

use crate::error::CommerceError;
use crate::image::ImageFile;
use crate::model::{Attribute, AttributeSpec, Product, Term, Variation};

/// Product and taxonomy operations on the commerce platform.
///
/// `ensure_*` methods are idempotent: they return the existing entity when
/// one matches and create it otherwise.
#[async_trait]
pub trait CommerceCatalog: Send + Sync {
    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, CommerceError>;

    /// Create (`id == None`) or update the product. Returns its id.
    async fn save_product(&self, product: &Product) -> Result<u64, CommerceError>;

    async fn find_variation_by_sku(
        &self,
        parent_id: u64,
        sku: &str,
    ) -> Result<Option<Variation>, CommerceError>;

    /// Create (`id == None`) or update the variation. Returns its id.
    async fn save_variation(&self, variation: &Variation) -> Result<u64, CommerceError>;

    /// Id of the product category named `name`.
    async fn ensure_category(&self, name: &str) -> Result<u64, CommerceError>;

    async fn ensure_attribute(&self, spec: &AttributeSpec) -> Result<Attribute, CommerceError>;

    async fn ensure_term(&self, attribute: &Attribute, name: &str) -> Result<Term, CommerceError>;
}

/// Attachment storage for product images.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Store the file and return its attachment id.
    async fn upload_image(&self, image: &ImageFile) -> Result<u64, CommerceError>;
}
