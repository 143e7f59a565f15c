//! Static registry of locally mirrored gallery assets.
//!
//! The offline sync job downloads every remote image, transcodes it to a
//! single compressed format, and writes a JSON manifest mapping each gallery
//! to its ordered filename list. The registry is read-only at runtime: it is
//! rebuilt only when the manifest is regenerated out-of-band.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use super::descriptor::{ImageDescriptor, SourceKind};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read asset manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse asset manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where local assets live and which nominal dimensions to report for them.
#[derive(Debug, Clone)]
pub struct AssetLayout {
    /// URL prefix under which the static file server exposes gallery folders.
    pub public_prefix: String,
    pub default_width: u32,
    pub default_height: u32,
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self {
            public_prefix: "/images/galeria".to_string(),
            default_width: super::descriptor::NOMINAL_WIDTH,
            default_height: super::descriptor::NOMINAL_HEIGHT,
        }
    }
}

/// Fixed mapping from gallery name to the ordered list of local filenames.
///
/// Pure and synchronous; unknown galleries yield empty results, never errors.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    galleries: BTreeMap<String, Vec<String>>,
    layout: AssetLayout,
}

impl AssetRegistry {
    pub fn new(galleries: BTreeMap<String, Vec<String>>, layout: AssetLayout) -> Self {
        Self { galleries, layout }
    }

    /// Load the registry from the manifest written by the sync job.
    pub fn from_manifest_file(
        path: impl AsRef<Path>,
        layout: AssetLayout,
    ) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let galleries: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)?;

        info!(
            path = %path.as_ref().display(),
            galleries = galleries.len(),
            "loaded asset manifest"
        );

        Ok(Self::new(galleries, layout))
    }

    /// Whether `gallery` belongs to the known set of folders.
    ///
    /// A known gallery may still have zero local files (mirrored remote-only
    /// folders appear in the manifest with an empty list).
    pub fn contains(&self, gallery: &str) -> bool {
        self.galleries.contains_key(gallery)
    }

    /// Ordered local filenames for `gallery`; empty for unknown names.
    pub fn list_local_assets(&self, gallery: &str) -> &[String] {
        self.galleries
            .get(gallery)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Local descriptors for `gallery`, in manifest (alphabetical) order.
    ///
    /// Ids are deterministic (`local_{gallery}_{index}`) and dimensions are
    /// nominal; the registry never probes actual files.
    pub fn local_descriptors(&self, gallery: &str) -> Vec<ImageDescriptor> {
        self.list_local_assets(gallery)
            .iter()
            .enumerate()
            .map(|(index, filename)| {
                let url = format!("{}/{}/{}", self.layout.public_prefix, gallery, filename);
                ImageDescriptor {
                    thumb: url.clone(),
                    url,
                    width: self.layout.default_width,
                    height: self.layout.default_height,
                    format: format_from_filename(filename),
                    public_id: format!("local_{gallery}_{index}"),
                    source: SourceKind::Local,
                }
            })
            .collect()
    }

    /// Known gallery names, in manifest order.
    pub fn gallery_names(&self) -> impl Iterator<Item = &str> {
        self.galleries.keys().map(String::as_str)
    }
}

/// The sync job emits a single compressed format, so the extension is the
/// encoding family.
fn format_from_filename(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "avif".to_string())
}
