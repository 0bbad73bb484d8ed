use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use std::path::PathBuf;

/// Runtime configuration for the `echo-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first). Zero values for the optional transport knobs
/// disable them.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "echo-server",
    version,
    about = "A gRPC server hosting the Echo service"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/echo.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// PEM encoded certificate chain. TLS is enabled only when both the
    /// certificate and the key are set.
    ///
    /// Environment variable: `TLS_CERT`
    #[arg(long, env = "TLS_CERT")]
    pub tls_cert: Option<PathBuf>,

    /// PEM encoded private key matching `--tls-cert`.
    ///
    /// Environment variable: `TLS_KEY`
    #[arg(long, env = "TLS_KEY")]
    pub tls_key: Option<PathBuf>,

    /// Per-request timeout in milliseconds. `0` disables the timeout.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_MS`
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 0)]
    pub request_timeout_ms: u64,

    /// Maximum number of in-flight requests per connection. `0` means
    /// unlimited.
    ///
    /// Environment variable: `CONCURRENCY_PER_CONNECTION`
    #[arg(long, env = "CONCURRENCY_PER_CONNECTION", default_value_t = 0)]
    pub concurrency_per_connection: usize,

    /// TCP keepalive interval in seconds. `0` leaves keepalive off.
    ///
    /// Environment variable: `TCP_KEEPALIVE_SECS`
    #[arg(long, env = "TCP_KEEPALIVE_SECS", default_value_t = 0)]
    pub tcp_keepalive_secs: u64,
}

/// Certificate and key locations for a TLS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub tls: Option<TlsPaths>,
    pub request_timeout: Option<Duration>,
    pub concurrency_per_connection: Option<usize>,
    pub tcp_keepalive: Option<Duration>,
}

impl ServerConfig {
    pub const fn enable_tls(&self) -> bool {
        self.tls.is_some()
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        let tls = match (args.tls_cert, args.tls_key) {
            (Some(cert), Some(key)) => Some(TlsPaths { cert, key }),
            (None, None) => None,
            (Some(_), None) => bail!("TLS_CERT is set but TLS_KEY is missing"),
            (None, Some(_)) => bail!("TLS_KEY is set but TLS_CERT is missing"),
        };

        if tls.is_some() && !cfg!(feature = "tls") {
            bail!("TLS was requested but echo-server was built without the `tls` feature");
        }

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            tls,
            request_timeout: (args.request_timeout_ms > 0)
                .then(|| Duration::from_millis(args.request_timeout_ms)),
            concurrency_per_connection: (args.concurrency_per_connection > 0)
                .then_some(args.concurrency_per_connection),
            tcp_keepalive: (args.tcp_keepalive_secs > 0)
                .then(|| Duration::from_secs(args.tcp_keepalive_secs)),
        })
    }
}
