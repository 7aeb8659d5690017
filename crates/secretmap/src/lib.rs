// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! secretmap command-line library
//!
//! Merges JSON configuration files, resolves AWS Secrets Manager references
//! found in their values and renders the result as JSON, dotenv, shell
//! exports or Dockerfile `ENV` lines. The binary is a thin wrapper around
//! [`commands::run`]; the pieces are public so the pipeline can be driven
//! with a different [`secretmap_secrets::SecretFetcher`].

pub mod cli;
pub mod commands;
pub mod format;
pub mod input;
pub mod output;
pub mod tracing;
