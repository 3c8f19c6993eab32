//! Server orchestration for the `MessagingService` gateway.
//!
//! This module resolves the command line and configuration, then either runs
//! an administrative command or binds the gRPC endpoint and serves the
//! selected UDF until a shutdown signal arrives. Binary crates stay thin
//! wrappers that only need to call [`run`].

#![expect(
    clippy::print_stdout,
    reason = "intentional console output for server status"
)]

pub mod admin;
pub mod grpc;

use std::{
    ffi::OsString,
    future::Future,
    io::{self, Write},
    net::{SocketAddr, ToSocketAddrs},
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
pub use cli_defs::{AppConfig, Cli, Commands, SendArgs};
use ortho_config::OrthoConfig;
use tokio::net::TcpListener;
use tonic::transport::{Server, server::TcpIncoming};
use tracing::{info, warn};

pub use self::grpc::GrpcGateway;
use crate::{
    handler::Handler,
    proto::{SERVICE_NAME, messaging_service_server::MessagingServiceServer},
    samples::SampleUdf,
};

/// Command line resolved against configuration files and the environment.
#[derive(Debug, Clone)]
pub struct ResolvedCli {
    /// Merged daemon configuration.
    pub config: AppConfig,
    /// Requested subcommand, if any.
    pub command: Option<Commands>,
}

/// Resolve the process arguments.
///
/// # Errors
///
/// Returns an error if the arguments do not parse or the configuration
/// layers cannot be merged.
pub fn load_cli() -> Result<ResolvedCli> { load_cli_from(std::env::args_os()) }

/// Resolve `args` as if they were the process arguments.
///
/// Configuration layers are only merged for the daemon; subcommands merge
/// their own arguments when they run.
///
/// # Errors
///
/// Returns an error if the arguments do not parse or the configuration
/// layers cannot be merged.
pub fn load_cli_from<I, T>(args: I) -> Result<ResolvedCli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let cli = Cli::try_parse_from(&argv)?;
    if cli.command.is_some() {
        return Ok(ResolvedCli {
            config: cli.config,
            command: cli.command,
        });
    }
    let config = AppConfig::load_from_iter(argv).context("failed to load configuration")?;
    Ok(ResolvedCli {
        config,
        command: None,
    })
}

/// Parse CLI arguments and execute the requested command or daemon.
///
/// # Errors
///
/// Returns any error emitted while parsing configuration, running a
/// subcommand or serving.
pub async fn run() -> Result<()> {
    let cli = load_cli()?;
    run_with_cli(cli).await
}

/// Execute the server logic using an already resolved [`ResolvedCli`].
///
/// # Errors
///
/// Propagates any failure reported by the subcommand or the daemon.
pub async fn run_with_cli(cli: ResolvedCli) -> Result<()> {
    let ResolvedCli { config, command } = cli;
    if let Some(command) = command {
        admin::run_command(command).await
    } else {
        run_daemon(&config).await
    }
}

async fn run_daemon(config: &AppConfig) -> Result<()> {
    let bootstrap = GatewayBootstrap::prepare(config)?;
    info!(udf = %bootstrap.udf, bind = %bootstrap.serve.bind, "starting gateway");
    let handler = bootstrap.udf.handler(config.fraud_threshold);
    serve(bootstrap.serve, handler, shutdown_signal()).await
}

/// Daemon settings derived from [`AppConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GatewayBootstrap {
    serve: ServeConfig,
    udf: SampleUdf,
}

impl GatewayBootstrap {
    fn prepare(config: &AppConfig) -> Result<Self> {
        let serve = ServeConfig::from_app_config(config)?;
        let udf = config.udf.parse::<SampleUdf>()?;
        Ok(Self { serve, udf })
    }
}

/// Where the gRPC endpoint listens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServeConfig {
    /// Socket address to bind.
    pub bind: SocketAddr,
}

impl ServeConfig {
    /// Resolve `host` and `port` of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is neither an IP address nor a
    /// resolvable name.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let host = config.host.trim();
        let target = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", config.port)
        } else {
            format!("{host}:{}", config.port)
        };
        Ok(Self {
            bind: parse_bind_addr(&target)?,
        })
    }
}

/// Bind `config.bind` and serve `handler` until `shutdown` completes.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve<S>(config: ServeConfig, handler: Arc<dyn Handler>, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    serve_listener(listener, handler, shutdown).await
}

/// Serve `handler` on an already bound listener until `shutdown` completes.
///
/// In-flight calls are allowed to finish before this returns.
///
/// # Errors
///
/// Returns an error if the listener cannot be adopted or the server fails.
pub async fn serve_listener<S>(
    listener: TcpListener,
    handler: Arc<dyn Handler>,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()> + Send,
{
    let addr = listener
        .local_addr()
        .context("failed to get local address")?;
    let incoming = TcpIncoming::from_listener(listener, true, None).map_err(|err| anyhow!(err))?;
    announce_listening(addr);

    Server::builder()
        .add_service(MessagingServiceServer::new(GrpcGateway::new(handler)))
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await
        .context("gRPC server terminated")?;
    info!("gateway stopped");
    Ok(())
}

fn announce_listening(addr: SocketAddr) {
    info!(%addr, service = SERVICE_NAME, "gateway listening");
    println!("udf-gateway listening on {addr}");
    if let Err(error) = io::stdout().flush() {
        warn!(%error, "failed to flush stdout");
    }
}

/// Waits for a shutdown signal, completing when termination is requested.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if let Err(error) = res {
                            warn!(%error, "failed to listen for Ctrl-C");
                        }
                    },
                    _ = term.recv() => {},
                }
            }
            Err(error) => {
                warn!(%error, "failed to install SIGTERM handler");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }
    info!("shutdown signal received");
}

async fn wait_for_ctrl_c() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for Ctrl-C");
    }
}

fn parse_bind_addr(target: &str) -> Result<SocketAddr> {
    target
        .parse()
        .or_else(|_| resolve_hostname(target))
        .with_context(|| format!("invalid bind address '{target}'"))
}

fn resolve_hostname(target: &str) -> Result<SocketAddr> {
    let mut addrs = target
        .to_socket_addrs()
        .with_context(|| format!("failed to resolve '{target}'"))?;
    addrs
        .next()
        .ok_or_else(|| anyhow!("failed to resolve '{target}'"))
}


#[cfg(test)]
mod bdd;
