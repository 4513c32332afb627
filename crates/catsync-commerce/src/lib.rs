//! Commerce catalog seam: product, variation, taxonomy and media operations,
//! with a WooCommerce REST implementation and an in-memory one.

pub mod catalog;
pub mod error;
pub mod image;
pub mod memory;
pub mod model;
pub mod slug;
pub mod woo;

pub use catalog::{CommerceCatalog, MediaLibrary};
pub use error::{CommerceError, ImageError};
pub use image::{ImageFetcher, ImageFile, ImageKind};
pub use memory::MemoryCatalog;
pub use model::{
    Attribute, AttributeSpec, Dimensions, Product, ProductAttribute, ProductKind, Term, Variation,
    VariationAttribute,
};
pub use slug::slugify;
pub use woo::WooClient;
