//! In-memory secret fetcher

use crate::{FetchError, SecretFetcher};
use async_trait::async_trait;
use std::collections::HashMap;

/// Serves secrets from an in-memory map
///
/// Values are stored as raw strings; JSON secrets are parsed on fetch like
/// any other backend.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretFetcher {
    secrets: HashMap<String, String>,
}

impl MemorySecretFetcher {
    /// Create an empty fetcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret, builder style
    #[must_use]
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a secret
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.secrets.insert(name.into(), value.into());
    }

    /// Number of stored secrets
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether no secrets are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemorySecretFetcher {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            secrets: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl SecretFetcher for MemorySecretFetcher {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_string(&self, name: &str) -> Result<String, FetchError> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                name: name.to_string(),
            })
    }
}
