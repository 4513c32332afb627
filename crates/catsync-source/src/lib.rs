pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{SourceClient, SourcePage};
pub use error::SourceError;
pub use normalize::normalize_product;
pub use types::GenericProduct;
