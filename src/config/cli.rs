use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use clap::builder::BoolishValueParser;

/// Command line of the check. Every option can also be set through its
/// `CHECK_*` environment variable; options left unset fall back to the config
/// file and then to the built-in defaults.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "http-perf",
    version,
    about = "Time the phases of one HTTP request and report them as performance data"
)]
pub struct Cli {
    /// URL to test (default http://localhost:80/)
    #[arg(short = 'u', long, env = "CHECK_URL")]
    pub url: Option<String>,

    /// Request timeout in seconds (default 15)
    #[arg(short = 'T', long, env = "CHECK_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Warning threshold, in seconds (default 1)
    #[arg(short = 'w', long, env = "CHECK_WARNING", allow_negative_numbers = true)]
    pub warning: Option<f64>,

    /// Critical threshold, in seconds (default 2)
    #[arg(short = 'c', long, env = "CHECK_CRITICAL", allow_negative_numbers = true)]
    pub critical: Option<f64>,

    /// Provide output in milliseconds (default false, display in seconds)
    #[arg(short = 'm', long, env = "CHECK_OUTPUT_IN_MS", value_parser = BoolishValueParser::new())]
    pub output_in_ms: bool,

    /// Skip TLS certificate verification (not recommended!)
    #[arg(
        short = 'i',
        long,
        env = "CHECK_INSECURE_SKIP_VERIFY",
        value_parser = BoolishValueParser::new()
    )]
    pub insecure_skip_verify: bool,

    /// TLS handshake timeout in milliseconds (default 1000)
    #[arg(short = 'z', long, env = "CHECK_TLS_TIMEOUT")]
    pub tls_timeout: Option<u64>,

    /// Name servers to resolve the target with, comma separated (default: system resolver)
    #[arg(long = "dns-server", env = "CHECK_DNS_SERVERS", value_delimiter = ',')]
    pub dns_servers: Vec<IpAddr>,

    /// YAML file with default values for the options above
    #[arg(long = "config", env = "CHECK_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "http-perf",
            "-u",
            "https://example.com/",
            "-T",
            "5",
            "-w",
            "0.5",
            "-c",
            "1.5",
            "-m",
            "-i",
            "-z",
            "300",
        ])
        .expect("valid arguments");

        assert_eq!(cli.url.as_deref(), Some("https://example.com/"));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.warning, Some(0.5));
        assert_eq!(cli.critical, Some(1.5));
        assert!(cli.output_in_ms);
        assert!(cli.insecure_skip_verify);
        assert_eq!(cli.tls_timeout, Some(300));
    }

    #[test]
    fn test_dns_servers_are_comma_separated() {
        let cli = Cli::try_parse_from(["http-perf", "--dns-server", "1.1.1.1,8.8.8.8"])
            .expect("valid arguments");
        assert_eq!(
            cli.dns_servers,
            vec![
                "1.1.1.1".parse::<IpAddr>().unwrap(),
                "8.8.8.8".parse::<IpAddr>().unwrap()
            ]
        );
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["http-perf", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn test_empty_url_is_accepted_by_the_parser() {
        let cli = Cli::try_parse_from(["http-perf", "--url", ""]).expect("valid arguments");
        assert_eq!(cli.url.as_deref(), Some(""));
    }
}
