//! ipmi-dashboard entry point: CLI dispatch, logging setup, HTTP server.

mod app;
mod config;
mod control;
mod handlers;
mod ipmi;
mod poller;
mod routes;
mod system;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use app::cli::Args;
use app::logging::{filter_for_level, init_tracing};
use app::status::run_health_check;
use config::credentials::CredentialSource;
use config::persistence::{load_config, resolve_config_path};
use config::types::DashboardConfig;
use ipmi::{IpmiGateway, IpmiRequest, IpmiResponse};
use poller::SensorPoller;
use routes::{create_router, AppState};
use system::executor::SystemProcessRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) {
                err.exit();
            }
            eprintln!("{}", err);
            eprintln!("\nFor more information, try '--help'.");
            std::process::exit(1);
        }
    };

    if !args.has_command() {
        eprintln!("ERROR: No command specified. You must specify a command.");
        eprintln!();
        Args::command().print_help()?;
        eprintln!();
        eprintln!("Common commands:");
        eprintln!("  ./ipmi-dashboard --serve              Start the API server");
        eprintln!("  ./ipmi-dashboard --exec sensor        Read all sensors once");
        eprintln!("  ./ipmi-dashboard --check              Check ipmitool and credentials");
        std::process::exit(1);
    }

    let config = load_config(args.config_file.as_deref()).await?;

    // Priority: 1. --log-level flag, 2. LOG_LEVEL env, 3. config file, 4. default (info)
    let log_level = args
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| config.logging.log_level.clone());
    let filter = filter_for_level(&log_level).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}'. Using INFO. Valid levels: TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL",
            log_level
        );
        "info"
    });
    init_tracing(filter);

    if args.show_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let credentials = CredentialSource::environment();

    if args.check {
        let config_path = resolve_config_path(args.config_file.as_deref())?;
        let ok = run_health_check(&config, &config_path, &credentials)?;
        std::process::exit(if ok { 0 } else { 1 });
    }

    let gateway = Arc::new(IpmiGateway::new(
        config.ipmi.clone(),
        credentials,
        Arc::new(SystemProcessRunner),
    ));

    if let Some(words) = args.exec.as_ref() {
        let (command, rest) = words
            .split_first()
            .context("--exec needs a command name")?;
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
        let response = gateway.respond(IpmiRequest::new(command, &rest)).await;
        return print_response(&response);
    }

    if let Some(percent) = args.fan_speed {
        let response: IpmiResponse = match control::fan::fan_speed_request(percent) {
            Ok(request) => gateway.execute(&request).await.into(),
            Err(e) => (&e).into(),
        };
        return print_response(&response);
    }

    serve(&args, &config, gateway).await
}

fn print_response(response: &IpmiResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

async fn serve(args: &Args, config: &DashboardConfig, gateway: Arc<IpmiGateway>) -> Result<()> {
    info!(
        "Starting ipmi-dashboard v{} ({} via {})",
        env!("CARGO_PKG_VERSION"),
        gateway.settings().tool,
        gateway.settings().interface
    );

    let shutdown = CancellationToken::new();
    let poller = Arc::new(SensorPoller::new(Arc::clone(&gateway), config.poller.interval()));

    let poller_task = if config.poller.enabled && !args.no_poll {
        Some(tokio::spawn(Arc::clone(&poller).run(shutdown.clone())))
    } else {
        info!("Sensor poller disabled");
        None
    };

    let bind = args.bind.clone().unwrap_or_else(|| config.server.bind_address.clone());
    let port = args.port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind, port))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let app = create_router(AppState { gateway, poller });

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
            }
            signal_token.cancel();
        })
        .await
        .context("HTTP server failed")?;

    shutdown.cancel();
    if let Some(task) = poller_task {
        if let Err(e) = task.await {
            error!("Sensor poller task failed: {}", e);
        }
    }

    info!("Shutdown complete");
    Ok(())
}
