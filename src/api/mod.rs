//! Search API module.
//!
//! This module provides:
//! - The search provider seam and its Pushshift implementation
//! - The shared network client used for downloads
//! - API response types

pub mod client;
pub mod network;
pub mod provider;
pub mod types;

pub use client::PushshiftApi;
pub use network::{NetworkClient, DEFAULT_POOL_LIMIT};
pub use provider::{SearchProvider, SearchQuery};
pub use types::*;
