//! Fetch deduplication
//!
//! A mapping commonly references several keys of the same JSON secret
//! (`sm:aws:user@db`, `sm:aws:password@db`). [`CachingFetcher`] makes those
//! share a single backend call, including when they run concurrently.

use crate::{FetchError, SecretFetcher};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

type CellMap<T> = Mutex<HashMap<String, Arc<OnceCell<T>>>>;

/// Memoizing wrapper around another [`SecretFetcher`]
///
/// Only successful fetches are cached; a failed fetch is retried by the next
/// caller asking for the same name.
pub struct CachingFetcher<F> {
    inner: F,
    strings: CellMap<String>,
    documents: CellMap<Value>,
}

impl<F: SecretFetcher> CachingFetcher<F> {
    /// Wrap a fetcher
    #[must_use]
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            strings: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped fetcher
    #[must_use]
    pub const fn inner(&self) -> &F {
        &self.inner
    }

    async fn cell<T>(map: &CellMap<T>, name: &str) -> Arc<OnceCell<T>> {
        map.lock()
            .await
            .entry(name.to_string())
            .or_default()
            .clone()
    }
}

impl<F> std::fmt::Debug for CachingFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingFetcher").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F: SecretFetcher> SecretFetcher for CachingFetcher<F> {
    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    async fn fetch_string(&self, name: &str) -> Result<String, FetchError> {
        let cell = Self::cell(&self.strings, name).await;
        cell.get_or_try_init(|| self.inner.fetch_string(name))
            .await
            .cloned()
    }

    async fn fetch_json(&self, name: &str) -> Result<Value, FetchError> {
        let cell = Self::cell(&self.documents, name).await;
        cell.get_or_try_init(|| self.inner.fetch_json(name))
            .await
            .cloned()
    }
}
