pub mod api;
pub mod config;
pub mod gallery;
pub mod observability;
