//! Writing rendered output

use crate::cli::CliError;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Write rendered output to `out`, or stdout when no path is given
///
/// The content is written verbatim; no trailing newline is added.
///
/// # Errors
///
/// Returns an error if the file or stdout cannot be written.
pub async fn write_output(out: Option<&Path>, content: &str) -> Result<(), CliError> {
    match out {
        Some(path) => {
            tokio::fs::write(path, content).await.map_err(|e| {
                CliError::config_with_help(
                    format!("Failed to write {}: {e}", path.display()),
                    "Check that the parent directory exists and is writable",
                )
            })?;
            tracing::info!(path = %path.display(), bytes = content.len(), "Wrote output file");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            let written = async {
                stdout.write_all(content.as_bytes()).await?;
                stdout.flush().await
            }
            .await;
            written.map_err(|e| {
                CliError::other_with_help(
                    format!("Failed to write to stdout: {e}"),
                    "Use --out to write to a file instead",
                )
            })?;
        }
    }
    Ok(())
}
