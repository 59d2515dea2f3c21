//! Tests for TOML configuration parsing.

use std::io::Write;

use super::ConfigError;
use super::file::{default_config_template, load, parse, write_default_config};

mod parsing {
    use super::*;

    #[test]
    fn empty_file_is_valid() {
        let options = parse("").unwrap();

        assert!(options.url.is_none());
        assert!(options.passthrough.is_empty());
    }

    #[test]
    fn full_file_parses_all_fields() {
        let options = parse(
            r#"
            url = "https://svc/Service.svc?wsdl"
            protocol = "https"
            username = 'CORP\alice'
            password = "secret"
            location = "https://svc/Service.svc"
            fetch_wsdl = false

            [timeouts]
            connect = 5
            request = 30
        "#,
        )
        .unwrap();

        assert_eq!(options.url.as_deref(), Some("https://svc/Service.svc?wsdl"));
        assert_eq!(options.protocol.as_deref(), Some("https"));
        assert_eq!(options.username.as_deref(), Some("CORP\\alice"));
        assert_eq!(options.password.as_deref(), Some("secret"));
        assert_eq!(options.location.as_deref(), Some("https://svc/Service.svc"));
        assert_eq!(options.fetch_wsdl, Some(false));
        assert_eq!(options.timeouts.connect, Some(5));
        assert_eq!(options.timeouts.request, Some(30));
    }

    #[test]
    fn unknown_top_level_keys_are_passed_through() {
        let options = parse(
            r#"
            url = "http://svc/test"
            soap_version = "1.2"
            cache_wsdl = 0
        "#,
        )
        .unwrap();

        assert_eq!(options.passthrough.len(), 2);
        assert_eq!(
            options.passthrough.get("soap_version"),
            Some(&toml::Value::String("1.2".to_string()))
        );
        assert_eq!(
            options.passthrough.get("cache_wsdl"),
            Some(&toml::Value::Integer(0))
        );
    }

    #[test]
    fn unknown_timeout_key_is_rejected() {
        let result = parse(
            r"
            [timeouts]
            read = 5
        ",
        );

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = parse("url = 42");

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}

mod files {
    use super::*;

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"url = "http://svc/test""#).unwrap();

        let options = load(file.path()).unwrap();

        assert_eq!(options.url.as_deref(), Some("http://svc/test"));
    }

    #[test]
    fn load_missing_file_returns_file_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let result = load(&path);

        assert!(matches!(result, Err(ConfigError::FileRead { path: p, .. }) if p == path));
    }

    #[test]
    fn template_parses_as_empty_bundle() {
        let options = parse(&default_config_template()).unwrap();

        assert!(options.url.is_none());
        assert!(options.username.is_none());
        assert!(options.timeouts.connect.is_none());
    }

    #[test]
    fn write_default_config_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ntlm-soap.toml");

        write_default_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, default_config_template());
    }

    #[test]
    fn write_default_config_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/config.toml");

        let result = write_default_config(&path);

        assert!(matches!(result, Err(ConfigError::FileWrite { .. })));
    }
}
