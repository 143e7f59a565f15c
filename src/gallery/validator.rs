//! Batched validation of local asset descriptors.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use super::descriptor::ImageDescriptor;
use super::probe::AssetProber;

/// Confirms which local descriptors are actually retrievable before they are
/// trusted.
///
/// Probes run in fixed-size batches to bound the number of outstanding
/// requests: batches execute sequentially, probes within a batch race freely.
/// Surviving descriptors keep their original relative order. Never errors;
/// the worst case is an empty result.
pub struct AssetValidator {
    prober: Arc<dyn AssetProber>,
    batch_size: usize,
}

impl AssetValidator {
    pub const DEFAULT_BATCH_SIZE: usize = 5;

    pub fn new(prober: Arc<dyn AssetProber>, batch_size: usize) -> Self {
        Self {
            prober,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn validate(&self, descriptors: Vec<ImageDescriptor>) -> Vec<ImageDescriptor> {
        let total = descriptors.len();
        if total == 0 {
            return descriptors;
        }

        let mut keep = vec![false; total];

        for (batch_index, batch) in descriptors.chunks(self.batch_size).enumerate() {
            let mut probes = JoinSet::new();

            for (offset, descriptor) in batch.iter().enumerate() {
                let prober = Arc::clone(&self.prober);
                let url = descriptor.url.clone();
                let index = batch_index * self.batch_size + offset;

                probes.spawn(async move { (index, prober.exists(&url).await) });
            }

            while let Some(joined) = probes.join_next().await {
                if let Ok((index, available)) = joined {
                    keep[index] = available;
                }
            }

            debug!(batch = batch_index, size = batch.len(), "probe batch settled");
        }

        let validated: Vec<ImageDescriptor> = descriptors
            .into_iter()
            .zip(keep)
            .filter_map(|(descriptor, available)| available.then_some(descriptor))
            .collect();

        info!(validated = validated.len(), total, "local asset validation finished");
        validated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::descriptor::SourceKind;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProber {
        unavailable: HashSet<String>,
        calls: AtomicUsize,
        max_in_flight: AtomicUsize,
        in_flight: AtomicUsize,
    }

    impl ScriptedProber {
        fn failing(urls: &[&str]) -> Self {
            Self {
                unavailable: urls.iter().map(|u| u.to_string()).collect(),
                calls: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl AssetProber for ScriptedProber {
        async fn exists(&self, url: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            // Suspend so probes in the same batch overlap.
            tokio::task::yield_now().await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            !self.unavailable.contains(url)
        }
    }

    fn descriptor(url: &str) -> ImageDescriptor {
        ImageDescriptor {
            url: url.to_string(),
            thumb: url.to_string(),
            width: 800,
            height: 1200,
            format: "avif".to_string(),
            public_id: url.to_string(),
            source: SourceKind::Local,
        }
    }

    #[tokio::test]
    async fn test_failed_probes_are_dropped_in_order() {
        let prober = Arc::new(ScriptedProber::failing(&["/b", "/e"]));
        let validator = AssetValidator::new(prober.clone(), 2);

        let input: Vec<_> = ["/a", "/b", "/c", "/d", "/e", "/f", "/g"]
            .iter()
            .map(|u| descriptor(u))
            .collect();

        let validated = validator.validate(input).await;

        let urls: Vec<_> = validated.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, ["/a", "/c", "/d", "/f", "/g"]);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_batches_bound_concurrency() {
        let prober = Arc::new(ScriptedProber::failing(&[]));
        let validator = AssetValidator::new(prober.clone(), 3);

        let input: Vec<_> = (0..10).map(|i| descriptor(&format!("/img{i}"))).collect();
        let validated = validator.validate(input).await;

        assert_eq!(validated.len(), 10);
        assert!(prober.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty_not_error() {
        let prober = Arc::new(ScriptedProber::failing(&["/a", "/b"]));
        let validator = AssetValidator::new(prober, AssetValidator::DEFAULT_BATCH_SIZE);

        let validated = validator
            .validate(vec![descriptor("/a"), descriptor("/b")])
            .await;
        assert!(validated.is_empty());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let prober = Arc::new(ScriptedProber::failing(&[]));
        let validator = AssetValidator::new(prober.clone(), 5);

        assert!(validator.validate(Vec::new()).await.is_empty());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let prober = Arc::new(ScriptedProber::failing(&[]));
        let validator = AssetValidator::new(prober, 0);
        assert_eq!(validator.batch_size, 1);
    }
}
