//! The map command: load, merge, resolve, render, write

use crate::cli::{AwsModeArg, Cli, CliError};
use crate::format::{OutputFormat, format_output};
use crate::input::load_inputs;
use crate::output::write_output;
use secretmap_aws::AwsSecretsClient;
use secretmap_secrets::{CachingFetcher, MapOptions, SecretFetcher, SecretsMapper, merge_inputs};
use std::path::PathBuf;
use tracing::instrument;

/// Everything needed to run one mapping, detached from argument parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapCommand {
    /// Input files in merge order
    pub files: Vec<PathBuf>,
    /// Output format
    pub format: OutputFormat,
    /// Output file, stdout when `None`
    pub out: Option<PathBuf>,
    /// Environment section to select
    pub env: Option<String>,
    /// Resolution options
    pub options: MapOptions,
}

impl From<&Cli> for MapCommand {
    fn from(cli: &Cli) -> Self {
        Self {
            files: cli.files.clone(),
            format: cli.format,
            out: cli.out.clone(),
            env: cli.env.clone(),
            options: MapOptions {
                strict: cli.strict,
                concurrency: cli.concurrency,
            },
        }
    }
}

/// Run the map command against AWS Secrets Manager
///
/// # Errors
///
/// Returns the first input, resolution or output error encountered.
pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let client = match cli.aws_mode {
        AwsModeArg::Auto => AwsSecretsClient::new().await,
        AwsModeArg::Http => AwsSecretsClient::http().await,
        AwsModeArg::Cli => AwsSecretsClient::cli(),
    };
    tracing::debug!(mode = %client.mode(), "Using AWS Secrets Manager");

    run_with_fetcher(&MapCommand::from(cli), client).await
}

/// Run the map command with any secret backend and write the result
///
/// # Errors
///
/// Returns the first input, resolution or output error encountered.
pub async fn run_with_fetcher<F: SecretFetcher>(
    command: &MapCommand,
    fetcher: F,
) -> Result<(), CliError> {
    let rendered = render(command, fetcher).await?;
    write_output(command.out.as_deref(), &rendered).await
}

/// Load, merge and resolve the inputs, returning the rendered output
///
/// Repeated references to the same secret are fetched once.
///
/// # Errors
///
/// Returns a configuration error for bad inputs and a resolution error
/// when any key fails to resolve.
#[instrument(
    name = "map",
    skip(fetcher),
    fields(files = command.files.len(), format = %command.format, strict = command.options.strict)
)]
pub async fn render<F: SecretFetcher>(command: &MapCommand, fetcher: F) -> Result<String, CliError> {
    let inputs = load_inputs(&command.files).await?;
    let merged = merge_inputs(&inputs, command.env.as_deref())?;
    tracing::info!(keys = merged.len(), env = ?command.env, "Merged input files");

    let mapper = SecretsMapper::new(CachingFetcher::new(fetcher));
    let resolved = mapper.map_all(&merged, command.options).await?;

    format_output(&resolved, command.format)
}
