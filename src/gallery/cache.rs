//! Process-wide memoization of resolved galleries.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::descriptor::ImageDescriptor;

/// Last successfully resolved descriptor list per gallery.
///
/// Entries are overwritten, never merged, and never expire within the
/// process lifetime; the known gallery set is small and finite, so there is
/// no eviction policy. Writes are serialized behind the lock. Concurrent
/// resolution of the same gallery before the first write lands may duplicate
/// work, which is harmless: both resolutions converge on the same value.
#[derive(Debug, Default)]
pub struct GalleryCache {
    entries: RwLock<HashMap<String, Vec<ImageDescriptor>>>,
}

impl GalleryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, gallery: &str) -> Option<Vec<ImageDescriptor>> {
        self.entries.read().await.get(gallery).cloned()
    }

    pub async fn set(&self, gallery: &str, images: Vec<ImageDescriptor>) {
        self.entries
            .write()
            .await
            .insert(gallery.to_string(), images);
    }
}
