use std::sync::Arc;

use catsync_commerce::{CommerceCatalog, ImageFetcher, MediaLibrary, WooClient};
use catsync_core::{AppConfig, CacheStore, SettingsStore};
use catsync_source::SourceClient;

use crate::error::SyncError;
use crate::log_sink::LogSink;

/// Timeout for commerce REST calls.
const COMMERCE_TIMEOUT_SECS: u64 = 60;

const DEFAULT_PAGE_SIZE: u32 = 50;
const DEFAULT_BATCH_SIZE: u32 = 10;

/// Commerce-side seams used by reconciliation.
#[derive(Clone)]
pub struct Commerce {
    pub catalog: Arc<dyn CommerceCatalog>,
    pub media: Arc<dyn MediaLibrary>,
}

/// Everything a pipeline run needs, constructed once per process and
/// shared by reference.
pub struct SyncContext {
    cache: Arc<dyn CacheStore>,
    settings: Arc<dyn SettingsStore>,
    commerce: Option<Commerce>,
    source: SourceClient,
    images: ImageFetcher,
    sink: Arc<LogSink>,
    page_size: u32,
    batch_size: u32,
}

impl SyncContext {
    /// Context without a commerce site. Fetch works; import and refresh
    /// fail with [`SyncError::CommerceNotConfigured`] until
    /// [`SyncContext::with_commerce`] is applied.
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheStore>,
        settings: Arc<dyn SettingsStore>,
        source: SourceClient,
        images: ImageFetcher,
        sink: Arc<LogSink>,
    ) -> Self {
        Self {
            cache,
            settings,
            commerce: None,
            source,
            images,
            sink,
            page_size: DEFAULT_PAGE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Build a context from application config, with the given stores.
    ///
    /// A WooCommerce client is attached when `config.commerce` is set.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if an HTTP client cannot be constructed or a
    /// configured base URL does not parse.
    pub fn from_config(
        config: &AppConfig,
        cache: Arc<dyn CacheStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Self, SyncError> {
        let source = SourceClient::new(
            &config.source_api_url,
            config.source_timeout_secs,
            &config.user_agent,
        )?;
        let images = ImageFetcher::new(config.image_timeout_secs, &config.user_agent)?;
        let sink = Arc::new(LogSink::new(&config.log_path, config.log_min_severity));

        let mut ctx = Self::new(cache, settings, source, images, sink)
            .with_page_size(config.source_page_size)
            .with_batch_size(config.import_batch_size);

        if let Some(credentials) = &config.commerce {
            let woo = Arc::new(WooClient::new(
                credentials,
                COMMERCE_TIMEOUT_SECS,
                &config.user_agent,
            )?);
            ctx = ctx.with_commerce(woo.clone(), woo);
        }

        Ok(ctx)
    }

    #[must_use]
    pub fn with_commerce(
        mut self,
        catalog: Arc<dyn CommerceCatalog>,
        media: Arc<dyn MediaLibrary>,
    ) -> Self {
        self.commerce = Some(Commerce { catalog, media });
        self
    }

    /// Values below 1 are raised to 1.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Values below 1 are raised to 1.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    #[must_use]
    pub fn source(&self) -> &SourceClient {
        &self.source
    }

    #[must_use]
    pub fn images(&self) -> &ImageFetcher {
        &self.images
    }

    #[must_use]
    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    #[must_use]
    pub fn has_commerce(&self) -> bool {
        self.commerce.is_some()
    }

    /// # Errors
    ///
    /// Returns [`SyncError::CommerceNotConfigured`] when no commerce site is attached.
    pub fn commerce(&self) -> Result<&Commerce, SyncError> {
        self.commerce
            .as_ref()
            .ok_or(SyncError::CommerceNotConfigured)
    }
}
