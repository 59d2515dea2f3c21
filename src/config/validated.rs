//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that the
//! binary runs with. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};

use super::cli::Cli;
use super::endpoint::{EndpointConfig, Protocol};
use super::error::{ConfigError, field};
use super::file;
use super::options::ClientOptions;

/// Where the SOAP envelope is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    /// Standard input
    Stdin,
    /// A file on disk
    File(PathBuf),
}

impl BodySource {
    fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            Some(path) if path != Path::new("-") => Self::File(path.to_path_buf()),
            _ => Self::Stdin,
        }
    }
}

impl fmt::Display for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fully validated configuration ready for use by the binary.
///
/// # Construction
///
/// Use [`RunConfig::from_raw`] to create from CLI args and an optional
/// configuration file bundle. Explicit CLI values win over the file,
/// the file wins over built-in defaults.
#[derive(Debug)]
pub struct RunConfig {
    /// Validated endpoint configuration
    pub endpoint: EndpointConfig,

    /// SOAP action (required)
    pub action: String,

    /// Envelope source
    pub body: BodySource,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ action: {}, body: {}, {} }}",
            self.action, self.body, self.endpoint
        )
    }
}

impl RunConfig {
    /// Creates a validated configuration from CLI arguments and optional file options.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (`url`, `action`)
    /// - A URL is invalid
    /// - A timeout is zero
    pub fn from_raw(cli: &Cli, file: Option<&ClientOptions>) -> Result<Self, ConfigError> {
        let options = merge_options(cli, file);
        let endpoint = EndpointConfig::from_options(&options)?;

        let action = cli
            .action
            .clone()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ConfigError::missing(field::ACTION, "Use --action"))?;

        Ok(Self {
            endpoint,
            action,
            body: BodySource::from_arg(cli.body.as_deref()),
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = if let Some(ref path) = cli.config {
            Some(file::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, file.as_ref())
    }
}

/// Merges CLI values over the file bundle.
fn merge_options(cli: &Cli, file: Option<&ClientOptions>) -> ClientOptions {
    let mut options = file.cloned().unwrap_or_default();

    override_with(&mut options.url, cli.url.as_ref());
    // Same permissive rule as the setter: an unrecognized value changes nothing
    override_with(
        &mut options.protocol,
        cli.protocol.as_ref().filter(|p| Protocol::parse(p).is_some()),
    );
    override_with(&mut options.username, cli.username.as_ref());
    override_with(&mut options.password, cli.password.as_ref());
    override_with(&mut options.location, cli.location.as_ref());
    override_with(&mut options.timeouts.connect, cli.connect_timeout.as_ref());
    override_with(&mut options.timeouts.request, cli.timeout.as_ref());

    // Flag only enables; a file value of true cannot be turned off here
    if cli.fetch_wsdl {
        options.fetch_wsdl = Some(true);
    }

    options
}

fn override_with<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
    if let Some(value) = value {
        *slot = Some(value.clone());
    }
}
