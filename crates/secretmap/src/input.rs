//! Loading JSON input files

use crate::cli::CliError;
use futures::future::try_join_all;
use secretmap_secrets::NestedMappingInput;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Path that selects stdin instead of a file
pub const STDIN_PATH: &str = "-";

/// Read and parse every input file, preserving argument order
///
/// # Errors
///
/// Returns a configuration error if no files are given, a file cannot be
/// read, or its contents are not a JSON object.
pub async fn load_inputs(paths: &[PathBuf]) -> Result<Vec<NestedMappingInput>, CliError> {
    if paths.is_empty() {
        return Err(CliError::config_with_help(
            "No input file names provided",
            "Pass one or more JSON files, or `-` to read from stdin",
        ));
    }
    if paths.iter().filter(|p| is_stdin(p)).count() > 1 {
        return Err(CliError::config("stdin (`-`) can only be used once"));
    }

    try_join_all(paths.iter().map(|path| load_input(path))).await
}

/// Read and parse a single input
///
/// # Errors
///
/// Returns a configuration error naming the path on I/O or parse failures.
pub async fn load_input(path: &Path) -> Result<NestedMappingInput, CliError> {
    let contents = if is_stdin(path) {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .map_err(|e| CliError::config(format!("Failed to read stdin: {e}")))?;
        buf
    } else {
        tokio::fs::read_to_string(path).await.map_err(|e| {
            CliError::config_with_help(
                format!("Failed to read {}: {e}", path.display()),
                "Check that the file exists and is readable",
            )
        })?
    };

    tracing::debug!(path = %path.display(), bytes = contents.len(), "Loaded input file");
    parse_input(path, &contents)
}

fn parse_input(path: &Path, contents: &str) -> Result<NestedMappingInput, CliError> {
    serde_json::from_str(contents).map_err(|e| {
        CliError::config_with_help(
            format!("Invalid JSON in {}: {e}", path.display()),
            "Input files must contain a single JSON object",
        )
    })
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}
