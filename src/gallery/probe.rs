//! Lightweight existence probes for local assets.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Seam for checking whether an asset URL is actually fetchable.
///
/// Probe failures are never escalated; a `false` simply drops the asset from
/// the validated set.
#[async_trait]
pub trait AssetProber: Send + Sync {
    async fn exists(&self, url: &str) -> bool;
}

/// Header-only HTTP probe against the static file origin.
///
/// Relative asset paths are resolved against `base_url`; any non-2xx status,
/// transport error, or timeout counts as "not available".
pub struct HttpProber {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpProber {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), url)
        }
    }
}

#[async_trait]
impl AssetProber for HttpProber {
    async fn exists(&self, url: &str) -> bool {
        let target = self.absolute_url(url);

        match self
            .client
            .head(&target)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => {
                let ok = response.status().is_success();
                if !ok {
                    debug!(url = %target, status = %response.status(), "asset probe rejected");
                }
                ok
            }
            Err(err) => {
                debug!(url = %target, error = %err, "asset probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_urls_resolve_against_base() {
        let prober = HttpProber::new("http://127.0.0.1:8080/", HttpProber::DEFAULT_TIMEOUT);
        assert_eq!(
            prober.absolute_url("/images/galeria/noivas/a.avif"),
            "http://127.0.0.1:8080/images/galeria/noivas/a.avif"
        );
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        let prober = HttpProber::new("http://127.0.0.1:8080", HttpProber::DEFAULT_TIMEOUT);
        assert_eq!(
            prober.absolute_url("https://cdn.example.com/a.avif"),
            "https://cdn.example.com/a.avif"
        );
    }
}
