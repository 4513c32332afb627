use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Non-2xx response. `code` and `message` come from the REST error body
    /// when one was returned.
    #[error("commerce API returned {status} for {url}: {code}: {message}")]
    Api {
        status: u16,
        url: String,
        code: String,
        message: String,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid commerce URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("rejected by catalog: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error downloading image: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} downloading {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid image URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("empty image body from {url}")]
    Empty { url: String },

    #[error("unsupported image type for {url}")]
    UnsupportedType { url: String },
}
