use clap::{Parser, Subcommand};
use common::utils::logging::{init_logging, LogFormat};
use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

/// OpenSDS service broker: exposes OpenSDS volumes through the Open Service Broker API
#[derive(Parser, Debug)]
#[command(name = "broker")]
struct Args {
    /// Port for the broker to listen on
    #[arg(long)]
    port: Option<u16>,

    /// OpenSDS endpoint the broker connects to
    #[arg(long)]
    endpoint: Option<String>,

    /// Path of the TOML config file (defaults to CONFIG_PATH or config.toml)
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the build version and exit
    Version,
}

/// File (or defaults), then environment, then flags; validated last so
/// flag values go through the same checks as everything else.
fn resolve_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut cfg = AppConfig::load(args.config.as_deref())?;
    cfg.apply_env();
    apply_flags(&mut cfg, args);
    cfg.normalize()?;
    Ok(cfg)
}

fn apply_flags(cfg: &mut AppConfig, args: &Args) {
    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    if let Some(endpoint) = &args.endpoint {
        cfg.backend.endpoint = endpoint.clone();
    }
}

/// `<binary name>/<crate version>`
fn version_line(argv0: Option<&str>) -> String {
    let bin = argv0
        .and_then(|p| std::path::Path::new(p).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "broker".to_string());
    format!("{}/{}", bin, env!("CARGO_PKG_VERSION"))
}

fn main() -> std::process::ExitCode {
    let args = Args::parse();

    if let Some(Command::Version) = args.command {
        println!("{}", version_line(std::env::args().next().as_deref()));
        return std::process::ExitCode::SUCCESS;
    }

    dotenv().ok();
    let cfg = match resolve_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("invalid configuration: {e:#}");
            return std::process::ExitCode::FAILURE;
        }
    };
    init_logging(LogFormat::from_name(&cfg.logging.format));
    info!(service = "broker", event = "logger_init", "tracing subscriber initialized");

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "broker", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "broker", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "broker",
        event = "start",
        %service_id,
        pid,
        version,
        port = cfg.server.port,
        endpoint = %cfg.backend.endpoint,
        "broker service starting"
    );

    rt.block_on(async move {
        let shutdown = async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(service = "broker", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
            }
        };
        match server::run(cfg, shutdown).await {
            Ok(()) => {
                info!(service = "broker", event = "stop", %service_id, pid, "broker stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "broker", event = "run_failed", error = %e, "broker returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
