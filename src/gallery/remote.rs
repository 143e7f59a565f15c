//! Remote gallery listing client and the breaker-gated fallback loader.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::breaker::{BreakerError, CircuitBreaker};
use super::descriptor::{
    ImageDescriptor, NOMINAL_HEIGHT, NOMINAL_WIDTH, SourceKind, optimized_delivery_url,
};
use super::error::RemoteError;

/// Paginated listing returned by `GET /galeria/{folder}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryListing {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, rename = "perPage")]
    pub per_page: Option<u32>,
    #[serde(default, rename = "nextCursor")]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub images: Vec<ListedImage>,
}

/// One listing entry.
///
/// Older deployments of the listing endpoint returned bare `secure_url`
/// strings while newer ones return rich objects; both shapes are accepted
/// here and normalized into [`ImageDescriptor`] before anything downstream
/// sees them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListedImage {
    Entry(ListingEntry),
    Url(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingEntry {
    pub url: String,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub format: Option<String>,
    pub public_id: String,
}

/// Seam for the remote gallery listing endpoint.
#[async_trait]
pub trait GalleryApi: Send + Sync {
    async fn fetch_listing(&self, gallery: &str) -> Result<GalleryListing, RemoteError>;
}

/// HTTP client for the listing endpoint.
pub struct HttpGalleryApi {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    page: Option<u32>,
    per_page: Option<u32>,
}

impl HttpGalleryApi {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            request_timeout,
            page,
            per_page,
        }
    }
}

#[async_trait]
impl GalleryApi for HttpGalleryApi {
    async fn fetch_listing(&self, gallery: &str) -> Result<GalleryListing, RemoteError> {
        let url = format!("{}/galeria/{}", self.base_url.trim_end_matches('/'), gallery);
        debug!(%url, "fetching remote gallery listing");

        let mut request = self.client.get(&url).timeout(self.request_timeout);
        if let Some(page) = self.page {
            request = request.query(&[("page", page)]);
        }
        if let Some(per_page) = self.per_page {
            request = request.query(&[("perPage", per_page)]);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                RemoteError::Timeout
            } else {
                RemoteError::Transport(err.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Http(status.as_u16()));
        }

        response
            .json::<GalleryListing>()
            .await
            .map_err(|err| RemoteError::Payload(err.to_string()))
    }
}

/// Fetches a gallery from the remote API, gated by the shared circuit
/// breaker. A breaker rejection surfaces as [`RemoteError::BreakerOpen`] and
/// does not count toward the failure threshold.
pub struct RemoteLoader {
    api: Arc<dyn GalleryApi>,
    breaker: Arc<CircuitBreaker>,
}

impl RemoteLoader {
    pub fn new(api: Arc<dyn GalleryApi>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { api, breaker }
    }

    pub async fn load(&self, gallery: &str) -> Result<Vec<ImageDescriptor>, RemoteError> {
        let listing = self
            .breaker
            .execute(|| self.api.fetch_listing(gallery))
            .await
            .map_err(|err| match err {
                BreakerError::Open => {
                    warn!(gallery, "remote listing rejected, circuit breaker open");
                    RemoteError::BreakerOpen
                }
                BreakerError::Inner(inner) => inner,
            })?;

        Ok(listing.images.into_iter().map(normalize).collect())
    }
}

/// Normalize either listing shape into a REMOTE descriptor.
fn normalize(image: ListedImage) -> ImageDescriptor {
    match image {
        ListedImage::Entry(entry) => {
            let thumb = entry
                .thumb
                .unwrap_or_else(|| optimized_delivery_url(&entry.url));
            ImageDescriptor {
                thumb,
                width: entry.width.unwrap_or(NOMINAL_WIDTH),
                height: entry.height.unwrap_or(NOMINAL_HEIGHT),
                format: entry.format.unwrap_or_else(|| extension_of(&entry.url)),
                public_id: entry.public_id,
                url: entry.url,
                source: SourceKind::Remote,
            }
        }
        ListedImage::Url(url) => ImageDescriptor {
            thumb: optimized_delivery_url(&url),
            width: NOMINAL_WIDTH,
            height: NOMINAL_HEIGHT,
            format: extension_of(&url),
            public_id: stem_of(&url),
            url,
            source: SourceKind::Remote,
        },
    }
}

fn extension_of(url: &str) -> String {
    last_segment(url)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "jpg".to_string())
}

fn stem_of(url: &str) -> String {
    let segment = last_segment(url);
    segment
        .rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or_else(|| segment.to_string())
}

fn last_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
