//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ntlm-soap: send a SOAP envelope over HTTP with optional NTLM auth
///
/// Posts one envelope to the endpoint and writes the raw response body
/// to standard output.
#[derive(Debug, Parser)]
#[command(name = "ntlm-soap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Endpoint or WSDL URL
    #[arg(long)]
    pub url: Option<String>,

    /// Protocol scheme: http or https (other values are ignored)
    #[arg(long)]
    pub protocol: Option<String>,

    /// NTLM user name, optionally DOMAIN\user
    #[arg(long, short)]
    pub username: Option<String>,

    /// NTLM password
    #[arg(long, short)]
    pub password: Option<String>,

    /// SOAP endpoint used for the call (default: url without query)
    #[arg(long)]
    pub location: Option<String>,

    /// SOAP action sent in the `SOAPAction` header
    #[arg(long, short)]
    pub action: Option<String>,

    /// File holding the SOAP envelope, or '-' for standard input
    #[arg(long, short, value_name = "FILE")]
    pub body: Option<PathBuf>,

    /// Connect timeout in seconds
    #[arg(long = "connect-timeout")]
    pub connect_timeout: Option<u64>,

    /// Whole-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Fetch the service metadata before sending the call
    #[arg(long = "fetch-wsdl")]
    pub fetch_wsdl: bool,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for ntlm-soap
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "ntlm-soap.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}
