//! WooCommerce REST client implementing [`CommerceCatalog`] and [`MediaLibrary`].

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use catsync_core::CommerceCredentials;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::{CommerceCatalog, MediaLibrary};
use crate::error::CommerceError;
use crate::image::ImageFile;
use crate::model::{Attribute, AttributeSpec, Product, Term, Variation};
use wire::{
    decode_entities, AttributeWrite, NamedWrite, ProductWrite, VariationWrite, WireError,
    WireMedia, WireProduct, WireTaxon, WireVariation,
};

/// Page size for taxonomy lookups.
const LOOKUP_PER_PAGE: &str = "100";

/// HTTP client for the WooCommerce REST API (`/wp-json/wc/v3`) and the
/// WordPress media endpoint (`/wp-json/wp/v2/media`), using basic auth.
pub struct WooClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl WooClient {
    /// # Errors
    ///
    /// Returns [`CommerceError::InvalidBaseUrl`] if the site URL does not
    /// parse, or [`CommerceError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        credentials: &CommerceCredentials,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CommerceError> {
        let trimmed = credentials.base_url.trim_end_matches('/');
        let base_url =
            Url::parse(&format!("{trimmed}/")).map_err(|e| CommerceError::InvalidBaseUrl {
                url: credentials.base_url.clone(),
                reason: e.to_string(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    /// Resolve `wp-json/{path}` against the site URL.
    fn endpoint(&self, path: &str) -> Result<Url, CommerceError> {
        self.base_url
            .join(&format!("wp-json/{path}"))
            .map_err(|e| CommerceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn wc(&self, path: &str) -> Result<Url, CommerceError> {
        self.endpoint(&format!("wc/v3/{path}"))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send_json<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, CommerceError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url_text = url.to_string();
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        decode(response, &url_text).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, CommerceError> {
        self.send_json::<(), T>(Method::GET, url, None).await
    }

    /// Find a taxonomy entry by display name, or create it.
    ///
    /// A concurrent create surfaces as `term_exists`; the existing id from
    /// the error body is used in that case.
    async fn find_or_create_taxon(
        &self,
        collection: &str,
        name: &str,
    ) -> Result<WireTaxon, CommerceError> {
        let mut url = self.wc(collection)?;
        url.query_pairs_mut()
            .append_pair("search", name)
            .append_pair("per_page", LOOKUP_PER_PAGE);
        let existing: Vec<WireTaxon> = self.get(url).await?;

        if let Some(found) = existing
            .into_iter()
            .find(|t| decode_entities(&t.name).eq_ignore_ascii_case(name))
        {
            return Ok(found);
        }

        let create_url = self.wc(collection)?;
        match self
            .send_json::<_, WireTaxon>(Method::POST, create_url, Some(&NamedWrite { name }))
            .await
        {
            Ok(created) => {
                tracing::debug!(collection, name, id = created.id, "created taxonomy entry");
                Ok(created)
            }
            Err(CommerceError::Api { code, .. }) if code == "term_exists" => {
                Err(CommerceError::Rejected(format!(
                    "{collection}: '{name}' exists but was not returned by search"
                )))
            }
            Err(other) => Err(other),
        }
    }
}

/// Map a response to `T`, turning non-2xx statuses into [`CommerceError::Api`].
async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, CommerceError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let err: WireError = serde_json::from_str(&body).unwrap_or_default();
        if let Some(resource_id) = err.data.as_ref().and_then(|d| d.resource_id) {
            if err.code == "term_exists" {
                // Re-shape into the caller's type: `{"id": N}` satisfies every taxon type.
                let id_only = serde_json::json!({ "id": resource_id });
                return serde_json::from_value(id_only).map_err(|e| CommerceError::Deserialize {
                    context: format!("term_exists resource from {url}"),
                    source: e,
                });
            }
        }
        return Err(CommerceError::Api {
            status: status.as_u16(),
            url: url.to_string(),
            code: if err.code.is_empty() {
                "http_error".to_string()
            } else {
                err.code
            },
            message: err.message,
        });
    }

    serde_json::from_str(&body).map_err(|e| CommerceError::Deserialize {
        context: format!("response from {url}"),
        source: e,
    })
}

#[async_trait]
impl CommerceCatalog for WooClient {
    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, CommerceError> {
        let mut url = self.wc("products")?;
        url.query_pairs_mut()
            .append_pair("sku", sku)
            .append_pair("per_page", "1");
        let found: Vec<WireProduct> = self.get(url).await?;
        Ok(found.into_iter().next().map(Product::from))
    }

    async fn save_product(&self, product: &Product) -> Result<u64, CommerceError> {
        let body = ProductWrite::from(product);
        let saved: WireProduct = match product.id {
            Some(id) => {
                self.send_json(Method::PUT, self.wc(&format!("products/{id}"))?, Some(&body))
                    .await?
            }
            None => {
                self.send_json(Method::POST, self.wc("products")?, Some(&body))
                    .await?
            }
        };
        Ok(saved.id)
    }

    async fn find_variation_by_sku(
        &self,
        parent_id: u64,
        sku: &str,
    ) -> Result<Option<Variation>, CommerceError> {
        let mut url = self.wc(&format!("products/{parent_id}/variations"))?;
        url.query_pairs_mut()
            .append_pair("sku", sku)
            .append_pair("per_page", "1");
        let found: Vec<WireVariation> = self.get(url).await?;
        Ok(found
            .into_iter()
            .next()
            .map(|v| v.into_variation(parent_id)))
    }

    async fn save_variation(&self, variation: &Variation) -> Result<u64, CommerceError> {
        let parent_id = variation.parent_id;
        let body = VariationWrite::from(variation);
        let saved: WireVariation = match variation.id {
            Some(id) => {
                let url = self.wc(&format!("products/{parent_id}/variations/{id}"))?;
                self.send_json(Method::PUT, url, Some(&body)).await?
            }
            None => {
                let url = self.wc(&format!("products/{parent_id}/variations"))?;
                self.send_json(Method::POST, url, Some(&body)).await?
            }
        };
        Ok(saved.id)
    }

    async fn ensure_category(&self, name: &str) -> Result<u64, CommerceError> {
        Ok(self
            .find_or_create_taxon("products/categories", name)
            .await?
            .id)
    }

    async fn ensure_attribute(&self, spec: &AttributeSpec) -> Result<Attribute, CommerceError> {
        let taxonomy = spec.taxonomy();
        let existing: Vec<WireTaxon> = self.get(self.wc("products/attributes")?).await?;
        if let Some(found) = existing
            .into_iter()
            .find(|a| a.slug == taxonomy || a.slug == spec.slug)
        {
            return Ok(Attribute {
                id: found.id,
                name: decode_entities(&found.name),
                slug: spec.slug.clone(),
            });
        }

        let body = AttributeWrite {
            name: &spec.label,
            slug: &spec.slug,
            type_: "select",
            order_by: "menu_order",
            has_archives: false,
        };
        let created: WireTaxon = self
            .send_json(Method::POST, self.wc("products/attributes")?, Some(&body))
            .await?;
        tracing::debug!(slug = %spec.slug, id = created.id, "created global attribute");
        Ok(Attribute {
            id: created.id,
            name: spec.label.clone(),
            slug: spec.slug.clone(),
        })
    }

    async fn ensure_term(&self, attribute: &Attribute, name: &str) -> Result<Term, CommerceError> {
        let taxon = self
            .find_or_create_taxon(&format!("products/attributes/{}/terms", attribute.id), name)
            .await?;
        Ok(Term {
            id: taxon.id,
            name: if taxon.name.is_empty() {
                name.to_string()
            } else {
                decode_entities(&taxon.name)
            },
            slug: taxon.slug,
        })
    }
}

#[async_trait]
impl MediaLibrary for WooClient {
    async fn upload_image(&self, image: &ImageFile) -> Result<u64, CommerceError> {
        let url = self.endpoint("wp/v2/media")?;
        let url_text = url.to_string();
        let disposition = format!(
            "attachment; filename=\"{}\"",
            image.filename.replace('"', "")
        );

        let response = self
            .request(Method::POST, url)
            .header(reqwest::header::CONTENT_TYPE, image.kind.mime_type())
            .header(reqwest::header::CONTENT_DISPOSITION, disposition)
            .body(image.bytes.clone())
            .send()
            .await?;

        let media: WireMedia = decode(response, &url_text).await?;
        Ok(media.id)
    }
}

#[cfg(test)]
#[path = "../woo_test.rs"]
mod tests;
