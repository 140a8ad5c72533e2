use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::{load_address_pool, load_target_set, Settings};
use crate::dns::{create_provider, DnsProvider, DnsRecord};
use crate::updater::{Shutdown, Updater};

/// Validate the settings, build the record index and rotate until SIGINT/SIGTERM.
pub async fn run(settings: Settings) -> Result<()> {
    let interval = settings.interval()?;
    let targets = load_target_set(settings.domains_file()?)?;
    let pool = load_address_pool(settings.ips_file()?)?;
    let provider = create_provider(&settings)?;

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn shutdown signal handler
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown().await {
            error!("Error waiting for shutdown signal: {}", e);
            return;
        }
        let _ = shutdown_tx.send(true);
    });

    let mut updater = Updater::new(provider, &targets).await;
    updater
        .run_with_shutdown(&pool, interval, Shutdown::new(shutdown_rx))
        .await;

    Ok(())
}

/// List the zone once and report which targets resolve to a record. Writes nothing.
pub async fn check(settings: &Settings) -> Result<()> {
    let targets = load_target_set(settings.domains_file()?)?;
    let provider = create_provider(settings)?;

    let records = list_for_check(&provider).await;
    println!("Checking {} target hostnames...\n", targets.len());

    for target in &targets {
        match records.iter().rev().find(|record| &record.name == target) {
            Some(record) => println!(
                "{}: record {} -> {}",
                target,
                record.id,
                record.content.as_deref().unwrap_or("-")
            ),
            None => println!("{}: no matching record", target),
        }
    }

    Ok(())
}

async fn list_for_check(provider: &Arc<dyn DnsProvider>) -> Vec<DnsRecord> {
    match provider.list_records().await {
        Ok(records) => records,
        Err(e) => {
            println!("Failed to list DNS records: {:#}\n", e);
            Vec::new()
        }
    }
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
