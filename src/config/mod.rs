//! Configuration layer for ntlm-soap.
//!
//! This module provides:
//! - The construction options bundle ([`ClientOptions`])
//! - Validated endpoint configuration ([`EndpointConfig`], [`Protocol`], [`Credentials`])
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`file`])
//! - Validated binary configuration ([`RunConfig`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! For the binary, values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! # Protocol
//!
//! The protocol scheme is permissive: values other than `http` and `https`
//! are silently ignored and the previous value is kept. This applies to
//! the option bundle, the CLI flag and [`EndpointConfig::set_protocol`].
//!
//! # Authentication Mode
//!
//! When both `username` and `password` are empty or absent the client is
//! anonymous. When either is present, NTLM mode is active and the missing
//! half is treated as an empty string.

mod cli;
pub mod defaults;
mod endpoint;
mod error;
pub mod file;
mod options;
mod validated;

#[cfg(test)]
mod file_tests;

pub use cli::{Cli, Command};
pub use endpoint::{Credentials, EndpointConfig, Protocol, Timeouts};
pub use error::{ConfigError, field};
pub use file::write_default_config;
pub use options::{ClientOptions, TimeoutsSection};
pub use validated::{BodySource, RunConfig};
