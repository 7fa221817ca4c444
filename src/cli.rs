//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate, health), and their associated argument
//! structs. Every `run` flag has an environment variable equivalent
//! for container deployments.

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::model::DEFAULT_MAX_ANSWER_BODY;

pub const DEFAULT_PID_FILE: &str = "/var/run/multipart-relay.pid";

#[derive(Parser)]
#[command(
    name = "multipart-relay",
    version,
    about = "Transfer and strip multipart JSON messages",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        multipart-relay run -r http://127.0.0.1:8123/api     Relay to one endpoint\n  \
        multipart-relay run -r http://a/api,http://b/api     Fan out to two endpoints\n  \
        multipart-relay validate -r http://a/api             Check the endpoint list"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server
    Run(Box<RunArgs>),

    /// Validate an endpoint list without starting
    Validate(ValidateArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        multipart-relay run                                     Relay to http://127.0.0.1:8123\n  \
        multipart-relay run -r http://a/api,http://b/api -p 80  Two endpoints, port 80\n  \
        multipart-relay run --daemon --log-file relay.log       Detach into the background")]
pub struct RunArgs {
    /// Endpoint URLs, comma separated; answers keep this order
    #[arg(
        short = 'r',
        long = "url",
        env = "RELAY_URLS",
        value_delimiter = ',',
        default_value = "http://127.0.0.1:8123"
    )]
    pub urls: Vec<String>,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 8321)]
    pub port: u16,

    /// Listen address
    #[arg(short = 'l', long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Process --
    /// Run in the background
    #[arg(long, help_heading = "Process")]
    pub daemon: bool,

    /// PID file path (defaults to /var/run/multipart-relay.pid with --daemon)
    #[arg(long, env = "RELAY_PID_FILE", help_heading = "Process")]
    pub pid_file: Option<PathBuf>,

    // -- Logging --
    /// Log level
    #[arg(short = 'L', long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Append logs to this file instead of stdout
    #[arg(long, env = "RELAY_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Per-endpoint timeout in milliseconds
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_MS",
        default_value_t = 5000,
        help_heading = "Tuning"
    )]
    pub timeout: u64,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 10 * 1_048_576,
        help_heading = "Tuning"
    )]
    pub max_body: usize,

    /// Max endpoint response size in bytes; larger answers are dropped
    #[arg(
        long,
        env = "MAX_ANSWER_BODY",
        default_value_t = DEFAULT_MAX_ANSWER_BODY,
        help_heading = "Tuning"
    )]
    pub max_answer_body: usize,
}

impl RunArgs {
    /// Listen host with any `http://` or `https://` prefix removed.
    #[must_use]
    pub fn listen_host(&self) -> &str {
        let host = self
            .host
            .strip_prefix("http://")
            .or_else(|| self.host.strip_prefix("https://"))
            .unwrap_or(&self.host);
        host.trim_end_matches('/')
    }

    /// Socket address to bind. IPv6 hosts may be given bare (`::`) or
    /// bracketed (`[::1]`).
    pub fn listen_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let host = self
            .listen_host()
            .trim_start_matches('[')
            .trim_end_matches(']');
        let ip: IpAddr = host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    #[must_use]
    pub fn resolved_pid_file(&self) -> Option<PathBuf> {
        self.pid_file
            .clone()
            .or_else(|| self.daemon.then(|| PathBuf::from(DEFAULT_PID_FILE)))
    }
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Endpoint URLs, comma separated
    #[arg(short = 'r', long = "url", env = "RELAY_URLS", value_delimiter = ',', required = true)]
    pub urls: Vec<String>,

    /// Per-endpoint timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 5000)]
    pub timeout: u64,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:8321")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["multipart-relay", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Some(Commands::Run(args)) => *args,
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn urls_split_on_commas_in_order() {
        let args = run_args(&["-r", "http://b:1/x,http://a:2/y"]);
        assert_eq!(args.urls, ["http://b:1/x", "http://a:2/y"]);
    }

    #[test]
    fn scheme_prefixed_host_is_accepted() {
        let args = run_args(&["-l", "http://0.0.0.0"]);
        assert_eq!(args.listen_host(), "0.0.0.0");
    }

    #[test]
    fn ipv6_hosts_bind() {
        let any = run_args(&["-l", "::", "-p", "9000"]).listen_addr().unwrap();
        assert_eq!(any, "[::]:9000".parse::<SocketAddr>().unwrap());
        let loopback = run_args(&["-l", "[::1]"]).listen_addr().unwrap();
        assert_eq!(loopback, "[::1]:8321".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn ipv4_host_binds() {
        let addr = run_args(&["-l", "http://127.0.0.1/", "-p", "80"]).listen_addr().unwrap();
        assert_eq!(addr, "127.0.0.1:80".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn hostname_is_not_a_listen_address() {
        assert!(run_args(&["-l", "localhost"]).listen_addr().is_err());
    }

    #[test]
    fn answer_limit_defaults_to_one_mebibyte() {
        assert_eq!(run_args(&[]).max_answer_body, DEFAULT_MAX_ANSWER_BODY);
        assert_eq!(run_args(&["--max-answer-body", "64"]).max_answer_body, 64);
    }

    #[test]
    fn pid_file_defaults_only_when_daemonized() {
        assert!(run_args(&[]).resolved_pid_file().is_none());
        assert_eq!(
            run_args(&["--daemon"]).resolved_pid_file(),
            Some(PathBuf::from(DEFAULT_PID_FILE))
        );
        assert_eq!(
            run_args(&["--daemon", "--pid-file", "/tmp/r.pid"]).resolved_pid_file(),
            Some(PathBuf::from("/tmp/r.pid"))
        );
    }
}
