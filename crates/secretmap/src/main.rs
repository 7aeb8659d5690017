//! secretmap CLI entry point

// CLI binary needs to output to stderr before tracing is available
#![allow(clippy::print_stderr)]

use secretmap::cli::{self, CliError, EXIT_OK, exit_code_for, render_error};
use secretmap::commands;
use secretmap::tracing::{TracingConfig, TracingFormat, init_tracing};

/// Exit code when the runtime cannot be started
const EXIT_FATAL: i32 = 1;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            cli.log_format
        },
        level: cli.level.into(),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("Warning: {e}");
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            render_error(
                &CliError::other_with_help(
                    format!("Failed to create tokio runtime: {e}"),
                    "This is an internal error",
                ),
                cli.json,
            );
            std::process::exit(EXIT_FATAL);
        }
    };

    let exit_code = match rt.block_on(commands::run(&cli)) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            ::tracing::debug!(code = err.code(), "secretmap failed");
            render_error(&err, cli.json);
            exit_code_for(&err)
        }
    };

    // Drop the runtime before exiting so pending stdout writes are flushed
    drop(rt);
    std::process::exit(exit_code);
}
