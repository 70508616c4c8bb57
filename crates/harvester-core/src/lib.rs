//! Core library for the continuous Reddit/Instagram scraping engine.
//!
//! This crate contains the concurrency substrate -- supervisor loop,
//! proxy/account registries, API clients, scraper cycles, media ingest --
//! and the storage layer backing all of it. The HTTP control surface,
//! review CRUD routes, and AI tagging layer are external collaborators
//! consumed through the narrow contracts exposed here.
pub mod account;
pub mod config;
pub mod control;
pub mod error;
pub mod instagram;
pub mod media;
pub mod proxy;
pub mod reddit;
pub mod retry;
pub mod storage;
pub mod supervisor;

pub use error::*;

/// Returns the version of the harvester-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
