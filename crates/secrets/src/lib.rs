// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! Secret reference resolution for secretmap
//!
//! Turns a flat mapping of configuration values into resolved values by
//! recognising secret references and delegating the fetch to an injected
//! [`SecretFetcher`]. Plain values pass through untouched unless strict mode
//! is requested.
//!
//! # Identifier grammar
//!
//! ```text
//! sm:aws:json:<secret-name>        whole JSON document
//! sm:aws:<key>@<secret-name>       one field of a JSON document
//! sm:aws:<secret-name>             raw string secret
//! ```
//!
//! # Example
//!
//! ```ignore
//! use secretmap_secrets::{MapOptions, MemorySecretFetcher, SecretsMapper, merge_inputs};
//!
//! let fetcher = MemorySecretFetcher::new()
//!     .with_secret("MyApp/db", r#"{"user":"app","password":"hunter2"}"#);
//! let mapper = SecretsMapper::new(fetcher);
//!
//! let input = merge_inputs(&files, Some("production"))?;
//! let output = mapper.map_all(&input, MapOptions::default()).await?;
//! ```

mod batch;
pub mod fetchers;
mod mapper;
mod merge;
pub mod scheme;

pub use batch::MappingExceptions;
pub use fetchers::{CachingFetcher, MemorySecretFetcher};
pub use mapper::{DEFAULT_CONCURRENCY, MapOptions, SecretsMapper};
pub use merge::merge_inputs;
pub use scheme::{SecretReference, classify};

use async_trait::async_trait;
use indexmap::IndexMap;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

/// One parsed input file, before environment selection and shape validation.
pub type NestedMappingInput = IndexMap<String, Value>;

/// Flat key -> scalar mapping handed to the batch mapper.
///
/// Values are strings, numbers or booleans; only strings can carry a secret
/// reference.
pub type MappingInput = IndexMap<String, Value>;

/// Key -> resolved value mapping produced by the batch mapper.
pub type MappingOutput = IndexMap<String, Value>;

/// Errors raised by a secret backend.
///
/// These are surfaced unchanged through [`Error::Backend`].
#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    /// The backend has no secret with this name
    #[error("Secret '{name}' does not exist")]
    #[diagnostic(code(secretmap::fetch::not_found))]
    NotFound {
        /// Secret name
        name: String,
    },

    /// The backend could not be reached or rejected the request
    #[error("Failed to fetch secret '{name}': {message}")]
    #[diagnostic(code(secretmap::fetch::failed))]
    Failed {
        /// Secret name
        name: String,
        /// Error message from the backend
        message: String,
    },

    /// The secret exists but its value is not a JSON document
    #[error("Secret '{name}' is not valid JSON: {source}")]
    #[diagnostic(code(secretmap::fetch::invalid_json))]
    InvalidJson {
        /// Secret name
        name: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },
}

/// Error type for resolving and merging configuration values
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// No secret scheme matches the identifier
    #[error("Invalid scheme for secret '{identifier}'")]
    #[diagnostic(code(secretmap::invalid_scheme))]
    InvalidSecretScheme {
        /// The identifier that failed to parse
        identifier: String,
    },

    /// A secret, a key inside it, or a scheme could not be found in strict mode
    #[error("{message}")]
    #[diagnostic(
        code(secretmap::value_not_found),
        help("Run without --strict to pass unresolved values through unchanged")
    )]
    ValueNotFound {
        /// Description of what was missing
        message: String,
    },

    /// The secret backend failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Backend(#[from] FetchError),

    /// One or more keys of a batch failed to resolve
    #[error(transparent)]
    #[diagnostic(transparent)]
    MappingExceptions(#[from] MappingExceptions),

    /// Input values that are not scalars
    #[error("invalid values for keys: {}", .keys.join(", "))]
    #[diagnostic(
        code(secretmap::invalid_shape),
        help("Input files must be single-level objects; pass --env to select a nested section")
    )]
    InvalidShape {
        /// Every key holding an object, array or null
        keys: Vec<String>,
    },
}

impl Error {
    /// Strict-mode failure for a value that matches no scheme
    #[must_use]
    pub fn no_scheme(identifier: &str) -> Self {
        Self::ValueNotFound {
            message: format!("Could not find a scheme for '{identifier}'"),
        }
    }

    /// Strict-mode failure for a key missing from a JSON secret
    #[must_use]
    pub fn missing_value(identifier: &str) -> Self {
        Self::ValueNotFound {
            message: format!("Could not find a value for secret '{identifier}'"),
        }
    }
}

/// Result type alias for secretmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Capability for fetching secrets from a backend.
///
/// Implementors must provide:
/// - [`fetch_string`](SecretFetcher::fetch_string) - Raw secret value
/// - [`provider_name`](SecretFetcher::provider_name) - Provider identifier for logs
///
/// [`fetch_json`](SecretFetcher::fetch_json) parses the raw value by default;
/// override it when the backend can return structured data directly.
#[async_trait]
pub trait SecretFetcher: Send + Sync {
    /// Get the provider name for this fetcher, e.g. `"aws"` or `"memory"`.
    fn provider_name(&self) -> &'static str;

    /// Fetch a secret as an opaque string.
    async fn fetch_string(&self, name: &str) -> std::result::Result<String, FetchError>;

    /// Fetch a secret and parse it as a JSON document.
    async fn fetch_json(&self, name: &str) -> std::result::Result<Value, FetchError> {
        let raw = self.fetch_string(name).await?;
        serde_json::from_str(&raw).map_err(|source| FetchError::InvalidJson {
            name: name.to_string(),
            source,
        })
    }
}

#[async_trait]
impl<F: SecretFetcher + ?Sized> SecretFetcher for std::sync::Arc<F> {
    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    async fn fetch_string(&self, name: &str) -> std::result::Result<String, FetchError> {
        (**self).fetch_string(name).await
    }

    async fn fetch_json(&self, name: &str) -> std::result::Result<Value, FetchError> {
        (**self).fetch_json(name).await
    }
}
