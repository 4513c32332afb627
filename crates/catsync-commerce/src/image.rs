//! Primary-image download and file-type validation.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::ImageError;

/// Image formats accepted into the media library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    /// Detect the format from the file's leading bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageKind::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageKind::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageKind::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageKind::Webp)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }

    fn accepts_extension(self, ext: &str) -> bool {
        match self {
            ImageKind::Jpeg => matches!(ext, "jpg" | "jpeg" | "jpe"),
            other => ext == other.extension(),
        }
    }
}

/// A downloaded, validated image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub filename: String,
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Validate `bytes` downloaded from `url` and derive a filename.
    ///
    /// The content must sniff as a supported image. A filename extension
    /// that disagrees with the sniffed type is replaced.
    ///
    /// # Errors
    ///
    /// [`ImageError::Empty`] for an empty body, [`ImageError::UnsupportedType`]
    /// when the bytes are not a supported image.
    pub fn from_download(url: &Url, bytes: Vec<u8>) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty {
                url: url.to_string(),
            });
        }
        let kind = ImageKind::sniff(&bytes).ok_or_else(|| ImageError::UnsupportedType {
            url: url.to_string(),
        })?;

        let last_segment = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("image");

        let (stem, ext) = match last_segment.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext.to_ascii_lowercase())),
            _ => (last_segment, None),
        };

        let filename = match ext {
            Some(ext) if kind.accepts_extension(&ext) => last_segment.to_string(),
            _ => format!("{stem}.{}", kind.extension()),
        };

        Ok(Self {
            filename,
            kind,
            bytes,
        })
    }
}

/// Downloads product images over HTTP.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    /// # Errors
    ///
    /// Returns [`ImageError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Download `url` and validate it as an image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] on an invalid URL, transport failure, non-200
    /// status, or a body that is not a supported image.
    pub async fn fetch(&self, url: &str) -> Result<ImageFile, ImageError> {
        let parsed = Url::parse(url).map_err(|e| ImageError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self.client.get(parsed.clone()).send().await?;
        if response.status() != StatusCode::OK {
            return Err(ImageError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        ImageFile::from_download(&parsed, bytes)
    }
}
