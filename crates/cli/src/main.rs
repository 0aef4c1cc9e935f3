use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kmcp_api::{ClusterAccess, KubeBackend, McpServer, Tool};
use kmcp_core::MapperRegistry;
use kmcp_kubehub::{parse_gvk_key, resolve_mapping, ClusterOptions};
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "kmcp", version, about = "Read-only Kubernetes tools over a stdio JSON-RPC agent protocol")]
struct Cli {
    /// Log filter directive (stderr only; stdout carries the protocol)
    #[arg(long = "log", env = "KMCP_LOG", global = true, default_value = "info")]
    log: String,

    /// Connect timeout for cluster API calls
    #[arg(long = "connect-timeout-secs", env = "KMCP_CONNECT_TIMEOUT_SECS", global = true, default_value_t = 10)]
    connect_timeout_secs: u64,

    /// Read timeout for cluster API calls
    #[arg(long = "read-timeout-secs", env = "KMCP_READ_TIMEOUT_SECS", global = true, default_value_t = 60)]
    read_timeout_secs: u64,

    /// Expose Prometheus metrics on host:port
    #[arg(long = "metrics-addr", env = "KMCP_METRICS_ADDR", global = true)]
    metrics_addr: Option<String>,

    /// Output format for the inspection subcommands
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the tool protocol on stdin/stdout (default)
    Serve,
    /// List kubeconfig contexts
    Contexts,
    /// Resolve a kind to its REST endpoint via discovery
    Resolve {
        /// GVK key, e.g. "v1/pod" or "apps/v1/Deployment"
        gvk: String,
        /// Kubeconfig context (default: current)
        #[arg(long = "context", default_value = "")]
        context: String,
    },
    /// Print the tool catalog
    Tools,
}

fn init_tracing(directive: &str) {
    let filter = tracing_subscriber::EnvFilter::from_str(directive).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics(addr: Option<&str>) {
    let Some(addr) = addr else { return };
    match addr.parse::<std::net::SocketAddr>() {
        Ok(sock) => match metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(sock).install() {
            Ok(_) => info!(addr = %addr, "Prometheus metrics exporter listening"),
            Err(e) => warn!(error = %e, "failed to install metrics exporter"),
        },
        Err(_) => warn!(addr = %addr, "invalid metrics address; expected host:port"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await { warn!(error = %e, "ctrl-c handler failed"); }
    };
    #[cfg(unix)]
    let term = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => { s.recv().await; }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = term => {},
    }
}

async fn serve(backend: Arc<KubeBackend>) -> Result<()> {
    let registry = Arc::new(MapperRegistry::builtin());
    info!(mappers = registry.len(), "mapper registry ready");
    let server = McpServer::new(registry, backend);
    tokio::select! {
        res = server.serve_stdio() => res,
        _ = shutdown_signal() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);
    init_metrics(cli.metrics_addr.as_deref());

    let opts = ClusterOptions {
        connect_timeout: Duration::from_secs(cli.connect_timeout_secs),
        read_timeout: Duration::from_secs(cli.read_timeout_secs),
    };
    let backend = Arc::new(KubeBackend::new(opts));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(backend).await?,
        Commands::Contexts => {
            let contexts = backend.contexts()?;
            match cli.output {
                Output::Human => {
                    for c in contexts {
                        let marker = if c.is_current { "*" } else { " " };
                        println!("{} {} • {}", marker, c.name, c.cluster_name);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&contexts)?),
            }
        }
        Commands::Resolve { gvk, context } => {
            let gvk = parse_gvk_key(&gvk)?;
            match resolve_mapping(backend.as_ref(), &context, &gvk).await {
                Ok(m) => match cli.output {
                    Output::Human => {
                        let scope = if m.namespaced { "namespaced" } else { "cluster" };
                        println!("{} → {} • {}", gvk, m.resource, scope);
                    }
                    Output::Json => println!("{}", serde_json::to_string_pretty(&m.resource)?),
                },
                Err(e) => {
                    error!(error = %e, "resolve failed");
                    return Err(e).context("resolve");
                }
            }
        }
        Commands::Tools => {
            let tools: Vec<_> = Tool::ALL.iter().map(|t| t.describe()).collect();
            match cli.output {
                Output::Human => {
                    for t in Tool::ALL {
                        println!("{} • {}", t.name(), t.description());
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&tools)?),
            }
        }
    }
    Ok(())
}
