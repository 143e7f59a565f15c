//! API models for the gallery and operator endpoints.
//!
//! The gallery endpoint is consumed by the website UI and is deliberately
//! total: an unknown gallery returns an empty list with `200 OK`, never an
//! error status, so a gallery page can always render something.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::gallery::ImageDescriptor;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GalleryResponse {
    pub gallery: String,
    pub count: usize,
    pub images: Vec<ImageDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
}
