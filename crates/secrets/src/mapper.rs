//! Single-identifier resolution

use crate::scheme::{SecretReference, classify};
use crate::{Error, Result, SecretFetcher};
use serde_json::Value;

/// Default number of identifiers resolved concurrently by [`SecretsMapper::map_all`]
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Options for resolving identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapOptions {
    /// Fail on unrecognized identifiers and missing keys instead of warning
    pub strict: bool,
    /// Maximum number of in-flight resolutions during a batch
    pub concurrency: usize,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            strict: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl MapOptions {
    /// Default options with strict mode enabled
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Resolves secret references against a [`SecretFetcher`]
///
/// # Example
///
/// ```ignore
/// let mapper = SecretsMapper::new(AwsSecretsClient::new().await?);
/// let value = mapper.resolve("sm:aws:principal@MyApp/prod", MapOptions::default()).await?;
/// ```
#[derive(Debug)]
pub struct SecretsMapper<F> {
    fetcher: F,
}

impl<F: SecretFetcher> SecretsMapper<F> {
    /// Create a mapper backed by the given fetcher
    #[must_use]
    pub const fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// The backing fetcher
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolve one input value.
    ///
    /// Strings go through [`resolve`](Self::resolve). Numbers and booleans
    /// cannot name a secret: they are returned unchanged, or rejected in
    /// strict mode.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_value(&self, value: &Value, options: MapOptions) -> Result<Option<Value>> {
        if let Value::String(identifier) = value {
            return self.resolve(identifier, options).await;
        }
        if options.strict {
            return Err(Error::no_scheme(&value.to_string()));
        }
        tracing::warn!(%value, "Could not find a scheme, passing value through");
        Ok(Some(value.clone()))
    }

    /// Resolve one identifier.
    ///
    /// Returns `Ok(None)` for a key/value reference whose key is absent from
    /// the secret in non-strict mode. Identifiers that match no scheme are
    /// returned unchanged unless `options.strict` is set.
    ///
    /// # Errors
    ///
    /// - [`Error::ValueNotFound`] in strict mode for unrecognized identifiers
    ///   and missing keys
    /// - [`Error::Backend`] when the fetcher fails
    pub async fn resolve(&self, identifier: &str, options: MapOptions) -> Result<Option<Value>> {
        let Some(reference) = classify(identifier) else {
            if options.strict {
                return Err(Error::no_scheme(identifier));
            }
            tracing::warn!(identifier, "Could not find a scheme, passing value through");
            return Ok(Some(Value::String(identifier.to_string())));
        };

        tracing::debug!(
            kind = reference.kind(),
            secret = reference.secret_name(),
            provider = self.fetcher.provider_name(),
            "Resolving secret reference"
        );

        match reference {
            SecretReference::Json { secret_name } => {
                Ok(Some(self.fetcher.fetch_json(&secret_name).await?))
            }
            SecretReference::KeyValue { key, secret_name } => {
                let mut document = self.fetcher.fetch_json(&secret_name).await?;
                match document.as_object_mut().and_then(|fields| fields.remove(&key)) {
                    Some(value) => Ok(Some(value)),
                    None if options.strict => Err(Error::missing_value(identifier)),
                    None => {
                        tracing::warn!(identifier, "Could not find secret value");
                        Ok(None)
                    }
                }
            }
            SecretReference::Raw { secret_name } => Ok(Some(Value::String(
                self.fetcher.fetch_string(&secret_name).await?,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchError, MemorySecretFetcher};
    use serde_json::json;

    const SECRET_ID: &str = "MyApp/valid-pair";
    const BAD_SCHEME: &str = "not-real:scheme@invalid";

    fn mapper() -> SecretsMapper<MemorySecretFetcher> {
        SecretsMapper::new(
            MemorySecretFetcher::new()
                .with_secret(
                    SECRET_ID,
                    r#"{"principal":"my-principal","credential":"my-credential"}"#,
                )
                .with_secret("MyApp/token", "s3cr3t")
                .with_secret("MyApp/list", "[1,2,3]"),
        )
    }

    #[tokio::test]
    async fn test_key_value_fetches_field() {
        let result = mapper()
            .resolve("sm:aws:principal@MyApp/valid-pair", MapOptions::default())
            .await
            .unwrap();
        assert_eq!(result, Some(json!("my-principal")));
    }

    #[tokio::test]
    async fn test_key_value_missing_secret_fails() {
        let err = mapper()
            .resolve("sm:aws:principal@MyApp/non-existent", MapOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(FetchError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_key_value_missing_key_non_strict_is_absent() {
        let result = mapper()
            .resolve("sm:aws:nope@MyApp/valid-pair", MapOptions::default())
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_key_value_missing_key_strict_fails() {
        let err = mapper()
            .resolve("sm:aws:nope@MyApp/valid-pair", MapOptions::strict())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ValueNotFound { .. }));
        assert!(err.to_string().contains("sm:aws:nope@MyApp/valid-pair"));
    }

    #[tokio::test]
    async fn test_key_value_on_non_object_document_is_missing_key() {
        let result = mapper()
            .resolve("sm:aws:0@MyApp/list", MapOptions::default())
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_json_returns_whole_document() {
        let result = mapper()
            .resolve("sm:aws:json:MyApp/valid-pair", MapOptions::default())
            .await
            .unwrap();
        assert_eq!(
            result,
            Some(json!({"principal": "my-principal", "credential": "my-credential"}))
        );
    }

    #[tokio::test]
    async fn test_json_on_text_secret_propagates_backend_error() {
        let err = mapper()
            .resolve("sm:aws:json:MyApp/token", MapOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(FetchError::InvalidJson { .. })));
    }

    #[tokio::test]
    async fn test_raw_returns_string_verbatim() {
        let result = mapper()
            .resolve("sm:aws:MyApp/token", MapOptions::default())
            .await
            .unwrap();
        assert_eq!(result, Some(json!("s3cr3t")));
    }

    #[tokio::test]
    async fn test_raw_does_not_parse_json() {
        let result = mapper()
            .resolve("sm:aws:MyApp/list", MapOptions::default())
            .await
            .unwrap();
        assert_eq!(result, Some(json!("[1,2,3]")));
    }

    #[tokio::test]
    async fn test_unrecognized_passes_through() {
        let result = mapper()
            .resolve(BAD_SCHEME, MapOptions::default())
            .await
            .unwrap();
        assert_eq!(result, Some(json!(BAD_SCHEME)));
    }

    #[tokio::test]
    async fn test_unrecognized_strict_fails() {
        let err = mapper()
            .resolve(BAD_SCHEME, MapOptions::strict())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ValueNotFound { .. }));
        assert!(err.to_string().contains(BAD_SCHEME));
    }

    #[tokio::test]
    async fn test_key_value_with_empty_name_reaches_backend() {
        let err = mapper()
            .resolve("sm:aws:principal@", MapOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(FetchError::NotFound { name }) if name.is_empty()));
    }

    #[tokio::test]
    async fn test_key_value_with_empty_key_is_absent() {
        let result = mapper()
            .resolve("sm:aws:@MyApp/valid-pair", MapOptions::default())
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_resolve_value_keeps_scalars() {
        let mapper = mapper();
        assert_eq!(
            mapper.resolve_value(&json!(8080), MapOptions::default()).await.unwrap(),
            Some(json!(8080))
        );
        assert_eq!(
            mapper.resolve_value(&json!(false), MapOptions::default()).await.unwrap(),
            Some(json!(false))
        );
        assert_eq!(
            mapper
                .resolve_value(&json!("sm:aws:MyApp/token"), MapOptions::default())
                .await
                .unwrap(),
            Some(json!("s3cr3t"))
        );
    }

    #[tokio::test]
    async fn test_resolve_value_strict_rejects_scalars() {
        let err = mapper()
            .resolve_value(&json!(true), MapOptions::strict())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Could not find a scheme for 'true'");
    }

    #[test]
    fn test_default_options() {
        let options = MapOptions::default();
        assert!(!options.strict);
        assert_eq!(options.concurrency, DEFAULT_CONCURRENCY);
        assert!(MapOptions::strict().strict);
    }
}
