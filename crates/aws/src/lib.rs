//! AWS integration for secretmap
//!
//! Provides the AWS Secrets Manager backend used to resolve `sm:aws:...`
//! references, via the [`secrets`] module.

pub mod secrets;

pub use secrets::{AwsMode, AwsSecretsClient};
