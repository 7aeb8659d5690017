//! Rendering resolved mappings

use crate::cli::CliError;
use secretmap_secrets::MappingOutput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// Output format for the resolved mapping
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Compact JSON object
    #[default]
    Json,
    /// `KEY=value` lines
    Dotenv,
    /// `export KEY=value` lines
    Exports,
    /// Dockerfile `ENV KEY=value` directives
    Docker,
}

impl OutputFormat {
    const fn line_prefix(self) -> &'static str {
        match self {
            Self::Json | Self::Dotenv => "",
            Self::Exports => "export ",
            Self::Docker => "ENV ",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Json => "json",
            Self::Dotenv => "dotenv",
            Self::Exports => "exports",
            Self::Docker => "docker",
        };
        write!(f, "{s}")
    }
}

/// Render a resolved mapping in the given format
///
/// # Errors
///
/// Returns an error if a value cannot be represented in a shell-style line
/// (strings containing NUL bytes) or JSON serialization fails.
pub fn format_output(result: &MappingOutput, format: OutputFormat) -> Result<String, CliError> {
    if format == OutputFormat::Json {
        return serde_json::to_string(result)
            .map_err(|e| CliError::config(format!("Failed to serialize output: {e}")));
    }

    let prefix = format.line_prefix();
    let mut out = String::new();
    for (key, value) in result {
        let value = serialize_value(value).map_err(|e| {
            CliError::config_with_help(
                format!("Cannot render value for key '{key}': {e}"),
                "Use --format json for values containing NUL bytes",
            )
        })?;
        out.push_str(prefix);
        out.push_str(key);
        out.push('=');
        out.push_str(&value);
        out.push('\n');
    }
    Ok(out)
}

/// Shell-safe representation of a single value
fn serialize_value(value: &Value) -> Result<Cow<'_, str>, shlex::QuoteError> {
    match value {
        Value::Null => Ok(Cow::Borrowed("")),
        Value::Number(n) => Ok(Cow::Owned(n.to_string())),
        Value::String(s) => shlex::try_quote(s),
        other => shlex::try_quote(&other.to_string()).map(|q| Cow::Owned(q.into_owned())),
    }
}
