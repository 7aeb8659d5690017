//! Batch resolution with per-key failure isolation
//!
//! Every key is resolved independently: one failing secret never prevents the
//! others from resolving. Failures are collected and reported together once
//! the whole batch has run.

use crate::mapper::{MapOptions, SecretsMapper};
use crate::{Error, MappingInput, MappingOutput, Result, SecretFetcher};
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use miette::Diagnostic;
use serde_json::Value;
use std::fmt;

/// Aggregate of every per-key failure from [`SecretsMapper::map_all`]
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{}", render_failures(.errors))]
#[diagnostic(
    code(secretmap::mapping_exceptions),
    help("Check that each referenced secret exists and contains the requested key")
)]
pub struct MappingExceptions {
    /// Failing key -> cause, in input order
    pub errors: IndexMap<String, Error>,
}

impl MappingExceptions {
    /// Keys that failed to resolve, in input order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Number of failing keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no key failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

fn render_failures(errors: &IndexMap<String, Error>) -> String {
    struct Lines<'a>(&'a IndexMap<String, Error>);

    impl fmt::Display for Lines<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Failed to resolve {} key(s):", self.0.len())?;
            for (key, error) in self.0 {
                write!(f, "\n  {key}: {error}")?;
            }
            Ok(())
        }
    }

    Lines(errors).to_string()
}

impl<F: SecretFetcher> SecretsMapper<F> {
    /// Resolve every value of `input`.
    ///
    /// Keys whose key/value reference points at an absent field (non-strict
    /// mode) map to `null`. The output keeps the input order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MappingExceptions`] carrying every failing key when at
    /// least one resolution fails.
    pub async fn map_all(&self, input: &MappingInput, options: MapOptions) -> Result<MappingOutput> {
        let outcomes: Vec<(&String, Result<Option<Value>>)> = stream::iter(input)
            .map(|(key, value)| async move { (key, self.resolve_value(value, options).await) })
            .buffered(options.concurrency.max(1))
            .collect()
            .await;

        let mut resolved = MappingOutput::with_capacity(input.len());
        let mut errors = IndexMap::new();
        for (key, outcome) in outcomes {
            match outcome {
                Ok(value) => {
                    resolved.insert(key.clone(), value.unwrap_or(Value::Null));
                }
                Err(error) => {
                    errors.insert(key.clone(), error);
                }
            }
        }

        if !errors.is_empty() {
            let failed: Vec<&str> = errors.keys().map(String::as_str).collect();
            tracing::error!(
                keys = ?failed,
                count = failed.len(),
                "Found the following errors while resolving secrets"
            );
            return Err(MappingExceptions { errors }.into());
        }

        tracing::debug!(count = resolved.len(), "Resolved all keys");
        Ok(resolved)
    }
}
