#![doc = include_str!("../README.md")]

mod server;

use clap::Parser;
use echo_core::proto::{FILE_DESCRIPTOR_SET, echo_server::EchoServer};
use futures::Stream;
use server::config::{CliArgs, ServerConfig};
use server::events::{EventBus, ServerEvent, log_event};
use server::service::handler::EchoService;
use server::telemetry::init_telemetry;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tonic::transport::server::{Connected, TcpIncoming};
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let mut events = EventBus::new();
    events.add_listener(log_event);

    let res = listen_and_serve(config, events).await;
    providers.shutdown();
    res
}

async fn listen_and_serve(config: ServerConfig, events: EventBus) -> anyhow::Result<()> {
    if config.uds {
        #[cfg(unix)]
        {
            use tokio::net::UnixListener;
            use tokio_stream::wrappers::UnixListenerStream;
            let uds_path = config.server_addr.clone();
            let uds = UnixListener::bind(&uds_path)?;
            let incoming = UnixListenerStream::new(uds);
            log_startup_info(&uds_path, &config);
            events.emit(ServerEvent::Serving {
                addr: uds_path.clone(),
            });
            let res = serve(incoming, config, events).await;
            // Not reached on panic, which leaves the socket file behind.
            let _ = std::fs::remove_file(&uds_path);
            res
        }
        #[cfg(not(unix))]
        {
            anyhow::bail!("Unix domain sockets are not supported on this platform");
        }
    } else {
        let tcp = TcpListener::bind(&config.server_addr).await?;
        let addr = tcp.local_addr()?.to_string();
        let incoming = tcp_incoming(tcp, &config);
        log_startup_info(&addr, &config);
        events.emit(ServerEvent::Serving { addr });
        serve(incoming, config, events).await
    }
}

/// Accept stream for a bound listener. `Server::tcp_keepalive` does not reach
/// caller-provided listeners, so keepalive is set on each accepted socket here.
fn tcp_incoming(listener: TcpListener, config: &ServerConfig) -> TcpIncoming {
    TcpIncoming::from(listener).with_keepalive(config.tcp_keepalive)
}

async fn serve<I, IO, IE>(incoming: I, config: ServerConfig, events: EventBus) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<EchoServer<EchoService>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let mut builder = Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true));

    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(limit) = config.concurrency_per_connection {
        builder = builder.concurrency_limit_per_connection(limit);
    }

    #[cfg(feature = "tls")]
    {
        if let Some(paths) = &config.tls {
            builder = builder.tls_config(load_tls_config(paths)?)?;
        }
    }

    let result = builder
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_echo_service(EchoService::new()))
        .serve_with_incoming_shutdown(incoming, shutdown_signal(health_reporter, events.clone()))
        .await;

    match result {
        Ok(()) => {
            events.emit(ServerEvent::Stopped);
            Ok(())
        }
        Err(err) => {
            events.emit(ServerEvent::Failure {
                reason: err.to_string(),
            });
            Err(err.into())
        }
    }
}

#[cfg(feature = "tls")]
fn load_tls_config(
    paths: &server::config::TlsPaths,
) -> anyhow::Result<tonic::transport::ServerTlsConfig> {
    use anyhow::Context;
    use tonic::transport::{Identity, ServerTlsConfig};

    let cert = std::fs::read(&paths.cert)
        .with_context(|| format!("failed to read TLS certificate {}", paths.cert.display()))?;
    let key = std::fs::read(&paths.key)
        .with_context(|| format!("failed to read TLS key {}", paths.key.display()))?;

    Ok(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))
}

fn log_startup_info(_addr: &str, _config: &ServerConfig) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting Echo service on {} with full config: {:#?}",
            _addr,
            _config
        );
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting Echo service on {} (tls: {})",
            _addr,
            _config.enable_tls()
        );
    }
}

fn build_echo_service(service: EchoService) -> EchoServer<EchoService> {
    EchoServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

async fn shutdown_signal(health_reporter: HealthReporter, events: EventBus) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal");
        },
        () = events.stopped() => {
            #[cfg(feature = "tracing")]
            tracing::info!("Stop requested");
        },
    }

    events.emit(ServerEvent::Draining);

    health_reporter
        .set_not_serving::<EchoServer<EchoService>>()
        .await;
}
