//! AWS Secrets Manager fetcher with auto-negotiating dual-mode (HTTP + CLI)

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use secretmap_secrets::{FetchError, SecretFetcher};
use std::fmt;
use tokio::process::Command;

/// How [`AwsSecretsClient`] talks to Secrets Manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwsMode {
    /// AWS SDK over HTTPS
    Http,
    /// The `aws` command-line tool
    Cli,
}

impl fmt::Display for AwsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "http",
            Self::Cli => "cli",
        })
    }
}

/// Fetches secrets from AWS Secrets Manager
///
/// Mode is auto-negotiated by [`AwsSecretsClient::new`]:
/// - If `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY` are set → HTTP mode
/// - Otherwise → CLI mode (uses the `aws` CLI and its configured profile)
///
/// Secret names may be plain names or full ARNs.
pub struct AwsSecretsClient {
    http_client: Option<Client>,
}

impl fmt::Debug for AwsSecretsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSecretsClient")
            .field("mode", &self.mode())
            .finish()
    }
}

impl AwsSecretsClient {
    /// Create a client with auto-detected mode
    ///
    /// If AWS credentials are available in the environment, loads the SDK
    /// configuration (region, endpoint) and uses HTTP mode.
    pub async fn new() -> Self {
        if Self::http_credentials_available() {
            Self::http().await
        } else {
            Self::cli()
        }
    }

    /// Always use the SDK, resolving credentials through the default provider chain
    pub async fn http() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::from_client(Client::new(&config))
    }

    /// Use an already configured SDK client
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self {
            http_client: Some(client),
        }
    }

    /// Always shell out to the `aws` CLI
    #[must_use]
    pub const fn cli() -> Self {
        Self { http_client: None }
    }

    /// The mode this client uses
    #[must_use]
    pub const fn mode(&self) -> AwsMode {
        if self.http_client.is_some() {
            AwsMode::Http
        } else {
            AwsMode::Cli
        }
    }

    /// Check if HTTP credentials are available in environment
    fn http_credentials_available() -> bool {
        credentials_present(|var| std::env::var(var).ok())
    }

    /// Fetch using the AWS SDK (HTTP mode)
    async fn fetch_http(client: &Client, name: &str) -> Result<String, FetchError> {
        let response = client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                if e
                    .as_service_error()
                    .is_some_and(GetSecretValueError::is_resource_not_found_exception)
                {
                    FetchError::NotFound {
                        name: name.to_string(),
                    }
                } else {
                    FetchError::Failed {
                        name: name.to_string(),
                        message: format!("AWS Secrets Manager error: {}", DisplayErrorContext(&e)),
                    }
                }
            })?;

        response
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| FetchError::Failed {
                name: name.to_string(),
                message: "Secret has no string value (may be binary)".to_string(),
            })
    }

    /// Fetch using the AWS CLI
    async fn fetch_cli(name: &str) -> Result<String, FetchError> {
        let output = Command::new("aws")
            .args(cli_args(name))
            .output()
            .await
            .map_err(|e| FetchError::Failed {
                name: name.to_string(),
                message: format!("Failed to execute aws CLI: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(cli_failure(name, &stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Both static credential variables are set
fn credentials_present(lookup: impl Fn(&str) -> Option<String>) -> bool {
    ["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"]
        .into_iter()
        .all(|var| lookup(var).is_some())
}

/// Arguments for `aws secretsmanager get-secret-value`
fn cli_args(name: &str) -> [&str; 8] {
    [
        "secretsmanager",
        "get-secret-value",
        "--secret-id",
        name,
        "--query",
        "SecretString",
        "--output",
        "text",
    ]
}

/// Map a failed `aws` invocation to a fetch error
fn cli_failure(name: &str, stderr: &str) -> FetchError {
    if stderr.contains("ResourceNotFoundException") {
        FetchError::NotFound {
            name: name.to_string(),
        }
    } else {
        FetchError::Failed {
            name: name.to_string(),
            message: format!("aws CLI failed: {}", stderr.trim()),
        }
    }
}

#[async_trait]
impl SecretFetcher for AwsSecretsClient {
    fn provider_name(&self) -> &'static str {
        "aws"
    }

    async fn fetch_string(&self, name: &str) -> Result<String, FetchError> {
        tracing::debug!(secret = name, mode = %self.mode(), "Fetching secret from AWS");
        match &self.http_client {
            Some(client) => Self::fetch_http(client, name).await,
            None => Self::fetch_cli(name).await,
        }
    }
}
