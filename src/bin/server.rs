use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use uptimeguard::db::{JsonFileStore, MonitorStore};
use uptimeguard::monitoring::{HttpProber, LivenessProbe};
use uptimeguard::notifications::NotificationService;
use uptimeguard::server::config::ServerConfig;
use uptimeguard::sweep::{run_periodic_sweeps, SweepCoordinator};
use uptimeguard::version::VERSION;
use uptimeguard::web::{create_axum_router, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "uptimeguard.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // --- Server Config Setup ---
    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load server configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&server_config.log_dir);
    info!("Starting UptimeGuard, version: {}", VERSION);

    // --- Store Setup ---
    tokio::fs::create_dir_all(&server_config.data_dir).await?;
    let store_path = Path::new(&server_config.data_dir).join("monitors.json");
    let store: Arc<dyn MonitorStore> = match JsonFileStore::open(&store_path).await {
        Ok(store) => {
            info!(path = ?store_path, "Monitor store opened.");
            Arc::new(store)
        }
        Err(e) => {
            error!(path = ?store_path, error = %e, "Failed to open monitor store.");
            return Err(e.into());
        }
    };

    let prober: Arc<dyn LivenessProbe> = Arc::new(HttpProber::new()?);

    // --- Notification Service Setup ---
    // A broken transport keeps the server up; sweeps then answer with a setup error.
    let notifier = server_config
        .channel_config()
        .and_then(|channel| {
            NotificationService::from_channel_config(&channel, &server_config.display_timezone)
                .map_err(|e| e.to_string())
        })
        .map(Arc::new);
    match &notifier {
        Ok(service) => info!(
            transport = %server_config.notification_transport,
            timezone = %service.timezone().name(),
            "Notification service ready."
        ),
        Err(e) => warn!(error = %e, "Notification transport is not usable. Sweeps will fail until it is fixed."),
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // --- Periodic Sweep Task ---
    let sweep_task = match (server_config.sweep_interval(), &notifier) {
        (Some(period), Ok(service)) => {
            let coordinator = Arc::new(SweepCoordinator::new(
                store.clone(),
                prober.clone(),
                service.clone(),
                server_config.sweep_options(),
            ));
            Some(tokio::spawn(run_periodic_sweeps(
                coordinator,
                period,
                shutdown_rx.clone(),
            )))
        }
        (Some(_), Err(_)) => {
            warn!("Periodic sweeps disabled: no usable notification transport.");
            None
        }
        (None, _) => {
            info!("No sweep interval configured. Sweeps run only through /api/cron.");
            None
        }
    };

    // --- Axum HTTP Server Setup ---
    let app_state = Arc::new(AppState {
        store,
        prober,
        notifier,
        config: server_config.clone(),
    });
    let http_router = create_axum_router(app_state);

    let addr: SocketAddr = server_config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening.");

    axum::serve(listener, http_router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C.");
            }
            info!("Shutdown signal received.");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(task) = sweep_task {
        if let Err(e) = task.await {
            error!(error = %e, "Periodic sweep task ended abnormally.");
        }
    }
    info!("Server stopped.");
    Ok(())
}
