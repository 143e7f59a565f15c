//! Hybrid resolution orchestrator.
//!
//! Implements the end-to-end fallback ladder for a gallery request:
//!
//! 1. Cache hit → return immediately, no validation, no network.
//! 2. Local assets from the registry, filtered through the validator. A
//!    non-empty validated set is cached and returned; the remote is not
//!    consulted even if it might hold more images.
//! 3. Remote listing through the breaker-gated loader. A non-empty result is
//!    cached and returned.
//! 4. Last resort: the unvalidated local descriptors from step 2, bypassing
//!    the cache so stale-looking data is never persisted as the cached truth.
//!
//! `resolve` is a total function: every failure path has a fallback value and
//! nothing propagates to the caller. Worst case a gallery renders as "no
//! photos found".

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cache::GalleryCache;
use super::descriptor::ImageDescriptor;
use super::error::RemoteError;
use super::registry::AssetRegistry;
use super::remote::RemoteLoader;
use super::validator::AssetValidator;
use crate::observability::Metrics;

pub struct HybridResolver {
    registry: Arc<AssetRegistry>,
    validator: AssetValidator,
    remote: RemoteLoader,
    cache: GalleryCache,
    metrics: Arc<Metrics>,
}

impl HybridResolver {
    pub fn new(
        registry: Arc<AssetRegistry>,
        validator: AssetValidator,
        remote: RemoteLoader,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            registry,
            validator,
            remote,
            cache: GalleryCache::new(),
            metrics,
        }
    }

    /// Resolve the displayable image list for `gallery`. Never fails.
    pub async fn resolve(&self, gallery: &str) -> Vec<ImageDescriptor> {
        if let Some(cached) = self.cache.get(gallery).await {
            self.metrics.cache_hit();
            debug!(gallery, count = cached.len(), "serving gallery from cache");
            return cached;
        }

        if !self.registry.contains(gallery) {
            debug!(gallery, "unknown gallery, resolving to empty list");
            return Vec::new();
        }

        let local = self.registry.local_descriptors(gallery);

        if !local.is_empty() {
            info!(gallery, count = local.len(), "validating local assets");
            let validated = self.validator.validate(local.clone()).await;

            let dropped = local.len() - validated.len();
            if dropped > 0 {
                self.metrics.probes_dropped(dropped as u64);
            }

            if !validated.is_empty() {
                self.metrics.local_resolution();
                info!(
                    gallery,
                    validated = validated.len(),
                    total = local.len(),
                    "gallery resolved from local assets"
                );
                self.cache.set(gallery, validated.clone()).await;
                return validated;
            }

            warn!(gallery, "no local asset survived validation");
        }

        match self.remote.load(gallery).await {
            Ok(images) if !images.is_empty() => {
                self.metrics.remote_resolution();
                info!(gallery, count = images.len(), "gallery resolved from remote listing");
                self.cache.set(gallery, images.clone()).await;
                return images;
            }
            Ok(_) => {
                warn!(gallery, "remote listing returned no images");
            }
            Err(RemoteError::BreakerOpen) => {
                self.metrics.breaker_rejection();
            }
            Err(err) => {
                self.metrics.remote_failure();
                warn!(gallery, error = %err, "remote listing failed");
            }
        }

        self.metrics.last_resort_fallback();
        warn!(
            gallery,
            count = local.len(),
            "falling back to unvalidated local assets"
        );
        local
    }
}
