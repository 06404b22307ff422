use std::{io, net::SocketAddr, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use sweep_config::{Config, ConfigLoader};
use sweep_core::{
    infrastructure::ManualTrigger,
    ports::ScanTrigger,
    runtime::TokioTrigger,
    scan::ScanCoordinator,
};
use tracing::{error, info, warn};

use sweep_server::{
    AppState,
    cli::{
        Cli, Command, ServeArgs,
        scan::{
            ScanExit, run_reset_command, run_scan_command, run_status_command,
        },
    },
    infra::{
        backends::{BackendKind, Backends},
        startup::{ProdStartupHooks, StartupHooks},
        telemetry::init_tracing,
    },
    routes::create_app,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ScanExit> {
    let config = load_config(&cli.serve)?;

    let Some(command) = cli.command else {
        run_server(config).await?;
        return Ok(ScanExit::Clean);
    };

    let backends = Backends::connect(&config).await?;
    // Foreground commands never schedule continuations.
    let trigger: Arc<dyn ScanTrigger> = Arc::new(ManualTrigger::new());
    let coordinator = ScanCoordinator::new(
        backends.content,
        backends.progress,
        trigger,
        config.scanner.coordinator_config(),
    );

    let mut out = io::stdout().lock();
    match command {
        Command::Scan(args) => {
            run_scan_command(&coordinator, &args.post_types, &mut out).await
        }
        Command::Status => {
            run_status_command(&coordinator, &mut out).await?;
            Ok(ScanExit::Clean)
        }
        Command::Reset => {
            run_reset_command(&coordinator, &mut out).await?;
            Ok(ScanExit::Clean)
        }
    }
}

fn load_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    let load = loader.load().context("failed to load configuration")?;

    for warning in &load.warnings.items {
        warn!("{warning}");
    }

    let mut config = load.config;
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    Ok(Arc::new(config))
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let backends = Backends::connect(&config).await?;
    if backends.kind == BackendKind::InMemory {
        info!("serving in-memory demo content");
    }

    let (trigger, jobs) = TokioTrigger::new();
    let trigger = Arc::new(trigger);
    let state = AppState::new(
        Arc::clone(&config),
        backends.content,
        backends.progress,
        trigger.clone(),
    );

    ProdStartupHooks
        .run(&state, Some(jobs))
        .await
        .context("startup hooks failed")?;

    let bind = config.bind_address();
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Starting Sweep maintenance server on {addr}");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    trigger.shutdown().await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
}
