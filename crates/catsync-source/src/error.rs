use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid payload from {url}: {reason}")]
    InvalidPayload { url: String, reason: String },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("normalization error for product {external_id}: {reason}")]
    Normalization { external_id: String, reason: String },

    #[error("pagination limit reached: source reported more than {max_pages} pages")]
    PaginationLimit { max_pages: u32 },

    #[error("invalid source API URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
