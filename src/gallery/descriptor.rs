//! Image descriptor model shared by the local and remote resolution paths.

use serde::{Deserialize, Serialize};

/// Nominal dimensions used when the actual pixel size of an image is unknown.
///
/// Local assets are never probed for their real dimensions and some remote
/// listings omit them; galleries render portrait-oriented studio photos, so
/// the placeholder is a portrait box.
pub const NOMINAL_WIDTH: u32 = 800;
pub const NOMINAL_HEIGHT: u32 = 1200;

/// Where a descriptor's bytes are served from.
///
/// Set once at construction and never inferred afterwards; the resolver's
/// fallback treatment depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

/// One displayable photo.
///
/// `public_id` is unique within the list returned for a single gallery and is
/// used as the display key; list ordering is significant and preserved all
/// the way to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Primary resolved location: a local path or a remote absolute URL.
    pub url: String,
    /// Preview location, possibly a degraded variant of `url`.
    pub thumb: String,
    pub width: u32,
    pub height: u32,
    /// Encoding family tag, e.g. "avif" or "jpg".
    pub format: String,
    pub public_id: String,
    pub source: SourceKind,
}

/// Derives a delivery-optimized variant of a Cloudinary-style URL by
/// injecting automatic format/quality transformation parameters into the
/// `/upload/` path segment. URLs without that segment pass through unchanged.
pub fn optimized_delivery_url(url: &str) -> String {
    const PARAMS: &str = "f_auto,q_auto,fl_lossy,fl_strip_profile";

    match url.find("/upload/") {
        Some(idx) => {
            let (head, tail) = url.split_at(idx + "/upload/".len());
            format!("{head}{PARAMS}/{tail}")
        }
        None => url.to_string(),
    }
}
