//! Command-line definition, error types and exit codes

use crate::format::OutputFormat;
use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, ValueEnum};
use miette::{Diagnostic, Report};
use secretmap_secrets::DEFAULT_CONCURRENCY;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI, input file or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Secret resolution error exit code
pub const EXIT_RESOLVE: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Bad input files or arguments (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(secretmap::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// One or more secrets failed to resolve (exit code 3)
    #[error("Resolution error: {message}")]
    #[diagnostic(code(secretmap::cli::resolve))]
    Resolution {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(secretmap::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new resolution error with help text
    #[must_use]
    pub fn resolution_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error with help text
    #[must_use]
    pub fn other_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Short machine-readable code used in JSON error envelopes
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Resolution { .. } => "resolve",
            Self::Other { .. } => "other",
        }
    }
}

/// Convert `secretmap_secrets::Error` to the matching `CliError` variant.
///
/// - Shape and scheme errors are input problems -> Config (exit code 2)
/// - Mapping failures, missing values and backend errors -> Resolution (exit code 3)
impl From<secretmap_secrets::Error> for CliError {
    fn from(err: secretmap_secrets::Error) -> Self {
        use secretmap_secrets::Error;

        let help = miette::Diagnostic::help(&err).map(|h| h.to_string());
        let message = err.to_string();
        match err {
            Error::InvalidShape { .. } | Error::InvalidSecretScheme { .. } => {
                Self::Config { message, help }
            }
            Error::MappingExceptions(_) | Error::ValueNotFound { .. } | Error::Backend(_) => {
                Self::Resolution { message, help }
            }
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Resolution { .. } | CliError::Other { .. } => EXIT_RESOLVE,
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Status indicator - always "error"
    pub status: &'static str,
    /// Error category
    pub code: &'static str,
    /// Human-readable message
    pub message: String,
}

impl ErrorEnvelope {
    /// Build the envelope for an error
    #[must_use]
    pub fn new(err: &CliError) -> Self {
        Self {
            status: "error",
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        match serde_json::to_string(&ErrorEnvelope::new(err)) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        // Ensure output is flushed before potential process exit
        let _ = io::stderr().flush();
    }
}

/// How to reach AWS Secrets Manager
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AwsModeArg {
    /// SDK when AWS credentials are in the environment, `aws` CLI otherwise
    #[default]
    Auto,
    /// Always use the SDK
    Http,
    /// Always use the `aws` CLI
    Cli,
}

/// Merges one or more JSON files, resolves secrets from their identifiers,
/// and writes the result in the requested format.
#[derive(Parser, Debug)]
#[command(name = "secretmap", version, about, long_about = None)]
#[command(after_help = "Secret identifiers:
  sm:aws:json:<secret-name>     whole JSON document
  sm:aws:<key>@<secret-name>    one field of a JSON document
  sm:aws:<secret-name>          raw string secret

Any other value is passed through unchanged (or rejected with --strict).")]
pub struct Cli {
    /// JSON files to merge in order; later files win. Use `-` for stdin
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, env = "SECRETMAP_FORMAT")]
    pub format: OutputFormat,

    /// Write the result to FILE instead of stdout
    #[arg(short, long, value_name = "FILE", env = "SECRETMAP_OUT")]
    pub out: Option<PathBuf>,

    /// Select this top-level section from files nested by environment
    #[arg(short, long, value_name = "ENV", env = "SECRETMAP_ENV")]
    pub env: Option<String>,

    /// Fail on values without a secret scheme and on missing keys
    #[arg(short, long, env = "SECRETMAP_STRICT")]
    pub strict: bool,

    /// Maximum number of secrets resolved concurrently
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CONCURRENCY, env = "SECRETMAP_CONCURRENCY")]
    pub concurrency: usize,

    /// How to reach AWS Secrets Manager
    #[arg(long, value_enum, default_value_t = AwsModeArg::Auto, env = "SECRETMAP_AWS_MODE")]
    pub aws_mode: AwsModeArg,

    /// Log level (overridden by RUST_LOG)
    #[arg(short, long, value_enum, default_value_t = LogLevel::Warn)]
    pub level: LogLevel,

    /// Log line format
    #[arg(long, value_enum, default_value_t = TracingFormat::Compact)]
    pub log_format: TracingFormat,

    /// Emit logs and errors as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse command line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
