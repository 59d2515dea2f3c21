//! TOML configuration file parsing.
//!
//! A configuration file is a serialized [`ClientOptions`] bundle.

use std::path::Path;

use super::ConfigError;
use super::options::ClientOptions;

/// Loads a configuration bundle from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<ClientOptions, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse(&content)
}

/// Parses a configuration bundle from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid.
pub fn parse(content: &str) -> Result<ClientOptions, ConfigError> {
    toml::from_str(content).map_err(ConfigError::from)
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, default_config_template()).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# ntlm-soap configuration file

# Endpoint or WSDL URL (required)
# url = "https://intranet.example.com/Service.svc?wsdl"

# Protocol scheme: "http" or "https"
# Defaults to the URL's scheme; any other value is ignored.
# protocol = "https"

# NTLM credentials. Leave both empty for anonymous access.
# A domain can be given as DOMAIN\user.
# username = 'CORP\svc-account'
# password = "secret"

# SOAP endpoint used for calls (default: url without its query string)
# location = "https://intranet.example.com/Service.svc"

# Fetch the service metadata while constructing the client
# (default: true when the url ends in ?wsdl)
# fetch_wsdl = true

[timeouts]
# Connect timeout in seconds (default: 10)
# connect = 10

# Whole-request timeout in seconds (default: 60)
# request = 60
"#
    .to_string()
}
