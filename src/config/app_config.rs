use super::cli::Cli;
use super::file::FileConfig;
use super::model::{
    CheckConfig, DEFAULT_CRITICAL_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_TLS_TIMEOUT_MS,
    DEFAULT_URL, DEFAULT_WARNING_SECS, OutputUnit,
};
use crate::errors::ConfigurationError;

/// Load the check configuration from the command line, the environment and an
/// optional YAML file.
/// Values given as flags or `CHECK_*` environment variables take precedence over
/// the file referenced by `--config` / `CHECK_CONFIG_FILE`, which in turn takes
/// precedence over the built-in defaults.
/// No validation happens here beyond what is needed to read the values; see
/// [`crate::check::validate`].
pub fn load_config(cli: &Cli) -> Result<CheckConfig, ConfigurationError> {
    let file = match &cli.config_file {
        Some(path) => {
            log::debug!("Reading config file {}", path.display());
            FileConfig::load(path)?
        }
        None => FileConfig::default(),
    };

    Ok(merge(cli, file))
}

fn merge(cli: &Cli, file: FileConfig) -> CheckConfig {
    let dns_servers = if cli.dns_servers.is_empty() {
        file.dns_servers
    } else {
        cli.dns_servers.clone()
    };

    if !dns_servers.is_empty() {
        log::info!("Using DNS servers: {:?}", dns_servers);
    }

    CheckConfig {
        url: cli
            .url
            .clone()
            .or(file.url)
            .unwrap_or_else(|| DEFAULT_URL.to_string()),
        timeout_secs: cli.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS),
        tls_timeout_ms: cli
            .tls_timeout
            .or(file.tls_timeout)
            .unwrap_or(DEFAULT_TLS_TIMEOUT_MS),
        warning: cli.warning.or(file.warning).unwrap_or(DEFAULT_WARNING_SECS),
        critical: cli
            .critical
            .or(file.critical)
            .unwrap_or(DEFAULT_CRITICAL_SECS),
        output_unit: OutputUnit::from_output_in_ms(
            cli.output_in_ms || file.output_in_ms.unwrap_or(false),
        ),
        insecure_skip_verify: cli.insecure_skip_verify
            || file.insecure_skip_verify.unwrap_or(false),
        dns_servers,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(yaml.as_bytes()).expect("write config");
        file.flush().expect("flush config");
        file
    }

    #[test]
    fn test_defaults_without_flags_or_file() {
        let config = load_config(&Cli::default()).expect("config");
        assert_eq!(config, CheckConfig::default());
    }

    #[test]
    fn test_file_values_fill_in_unset_flags() {
        let file = write_config(
            "url: https://example.com/\nwarning: 0.3\ncritical: 0.9\noutput_in_ms: true\n",
        );
        let cli = Cli {
            config_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let config = load_config(&cli).expect("config");
        assert_eq!(config.url, "https://example.com/");
        assert_eq!(config.warning, 0.3);
        assert_eq!(config.critical, 0.9);
        assert_eq!(config.output_unit, OutputUnit::Milliseconds);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_flags_override_file_values() {
        let file =
            write_config("url: https://example.com/\ntimeout: 30\ndns_servers: [9.9.9.9]\n");
        let cli = Cli {
            url: Some("http://127.0.0.1:8080/".to_string()),
            timeout: Some(3),
            dns_servers: vec!["1.1.1.1".parse().unwrap()],
            config_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let config = load_config(&cli).expect("config");
        assert_eq!(config.url, "http://127.0.0.1:8080/");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(
            config.dns_servers,
            vec!["1.1.1.1".parse::<std::net::IpAddr>().unwrap()]
        );
    }

    #[test]
    fn test_unreadable_file_is_a_configuration_error() {
        let cli = Cli {
            config_file: Some("/nonexistent/http-perf.yml".into()),
            ..Default::default()
        };
        assert!(matches!(
            load_config(&cli),
            Err(ConfigurationError::ReadConfigFile { .. })
        ));
    }
}
