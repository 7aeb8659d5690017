//! Secret fetcher implementations
//!
//! This module provides fetchers that require no external services:
//!
//! - [`MemorySecretFetcher`] - In-memory secrets, for tests and embedding
//! - [`CachingFetcher`] - Deduplicates fetches of the same secret within a run
//!
//! AWS Secrets Manager lives in the `secretmap-aws` crate.

mod caching;
mod memory;

pub use caching::CachingFetcher;
pub use memory::MemorySecretFetcher;
