//! Hybrid gallery resolution: local mirrored assets first, remote listing as
//! a breaker-gated fallback, unvalidated local data as the last resort.
//!
//! ## Key Components
//!
//! - [`AssetRegistry`] - static mapping of gallery name to local filenames
//! - [`AssetValidator`] - batched existence probes over local descriptors
//! - [`CircuitBreaker`] - guards the remote listing dependency
//! - [`RemoteLoader`] - breaker-gated remote fetch
//! - [`HybridResolver`] - the resolution ladder itself

mod breaker;
mod cache;
mod descriptor;
mod error;
mod probe;
mod registry;
mod remote;
mod resolver;
mod validator;

pub use breaker::{BreakerError, BreakerState, BreakerStats, CircuitBreaker};
pub use cache::GalleryCache;
pub use descriptor::{
    ImageDescriptor, NOMINAL_HEIGHT, NOMINAL_WIDTH, SourceKind, optimized_delivery_url,
};
pub use error::RemoteError;
pub use probe::{AssetProber, HttpProber};
pub use registry::{AssetLayout, AssetRegistry, RegistryError};
pub use remote::{GalleryApi, GalleryListing, HttpGalleryApi, ListedImage, ListingEntry, RemoteLoader};
pub use resolver::HybridResolver;
pub use validator::AssetValidator;
