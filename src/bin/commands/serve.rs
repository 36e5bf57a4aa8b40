use anyhow::Result;
use chrono::Utc;
use chrono_humanize::HumanTime;
use clap::Args;
use isitgov::lens::domain::DomainLens;
use isitgov::server::{start_server, ServerConfig, ServerState, SystemInfo};
use isitgov::IsitgovConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Arguments for the Serve command
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind to, overrides listen_address
    #[clap(short, long)]
    pub address: Option<String>,

    /// Port to listen on, overrides listen_port
    #[clap(short, long)]
    pub port: Option<u16>,
}

pub fn run(config: &IsitgovConfig, args: ServeArgs) -> Result<()> {
    let server_config = ServerConfig::new()
        .with_address(args.address.unwrap_or_else(|| config.listen_address.clone()))
        .with_port(args.port.unwrap_or(config.listen_port));

    let scheduler = super::scheduler_from_config(config);
    let state = ServerState::new(
        DomainLens::new(scheduler.store().clone()),
        SystemInfo {
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            source: config.source_url.clone(),
            refresh_interval: humantime::format_duration(config.refresh_interval).to_string(),
        },
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let cancel = CancellationToken::new();

        let shutdown = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("unable to listen for shutdown signal: {}", e);
                return;
            }
            info!("shutdown signal received");
            shutdown.cancel();
        });

        let refresher = scheduler.spawn(cancel.clone());

        let status_store = scheduler.store().clone();
        let status_cancel = cancel.clone();
        tokio::spawn(async move {
            // report once the first refresh attempt has finished
            loop {
                tokio::select! {
                    _ = status_cancel.cancelled() => return,
                    _ = tokio::time::sleep(std::time::Duration::from_millis(500)) => {}
                }
                let status = status_store.status();
                if status.last_attempt.is_none() {
                    continue;
                }
                if let Some(next) = status.next_update {
                    info!(
                        "{} registrations loaded, next refresh {}",
                        status.records,
                        HumanTime::from(next - Utc::now())
                    );
                }
                return;
            }
        });

        let served = start_server(state, server_config, cancel.clone()).await;
        cancel.cancel();
        if let Err(e) = refresher.await {
            warn!("refresh scheduler task failed: {}", e);
        }
        served
    })
}
