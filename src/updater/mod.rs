mod index;
mod pool;
mod shutdown;

pub use index::RecordIndex;
pub use pool::AddressPool;
pub use shutdown::Shutdown;

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::dns::{DnsProvider, RecordUpdate};

/// Rotates the targeted hostnames through an address pool.
///
/// The record index is resolved once on construction and never refreshed.
/// Records created on the provider afterwards are not picked up.
pub struct Updater<R = StdRng> {
    provider: Arc<dyn DnsProvider>,
    index: RecordIndex,
    rng: R,
}

impl Updater<StdRng> {
    pub async fn new(provider: Arc<dyn DnsProvider>, targets: &[String]) -> Self {
        Self::with_rng(provider, targets, StdRng::from_entropy()).await
    }
}

impl<R: Rng> Updater<R> {
    /// Build the index from the provider's current records. A failed listing
    /// is logged and leaves the index empty.
    pub async fn with_rng(provider: Arc<dyn DnsProvider>, targets: &[String], rng: R) -> Self {
        let index = match provider.list_records().await {
            Ok(records) => RecordIndex::build(records, targets),
            Err(e) => {
                error!("Failed to list DNS records: {:#}", e);
                RecordIndex::default()
            }
        };

        for target in targets {
            if !index.contains(target) {
                warn!("No existing record for {}, it will not be rotated", target);
            }
        }

        info!(
            "Indexed {} of {} target hostnames on {}",
            index.len(),
            targets.len(),
            provider.provider_name()
        );

        Self {
            provider,
            index,
            rng,
        }
    }

    pub fn index(&self) -> &RecordIndex {
        &self.index
    }

    /// Point `hostname` at `address`. Failures are logged, never returned.
    pub async fn update_record(&self, hostname: &str, record_id: &str, address: &str) {
        push_update(self.provider.as_ref(), hostname, record_id, address).await;
    }

    /// Rotate forever.
    pub async fn run(&mut self, pool: &AddressPool, interval: Duration) {
        self.run_with_shutdown(pool, interval, Shutdown::never())
            .await
    }

    /// Rotate until `shutdown` is requested. It is checked before each
    /// hostname and while sleeping.
    pub async fn run_with_shutdown(
        &mut self,
        pool: &AddressPool,
        interval: Duration,
        mut shutdown: Shutdown,
    ) {
        info!(
            "Rotating {} hostnames over {} addresses, {} seconds between updates",
            self.index.len(),
            pool.len(),
            interval.as_secs()
        );

        loop {
            let flow = if self.index.is_empty() {
                // nothing to write, still yield once per interval
                pause(interval, &mut shutdown).await
            } else {
                self.run_pass(pool, interval, &mut shutdown).await
            };

            if flow.is_break() {
                info!("Rotation stopped");
                return;
            }
        }
    }

    /// One pass over the index: pick, update, sleep, for each hostname in order.
    /// Breaks as soon as shutdown is requested.
    pub async fn run_pass(
        &mut self,
        pool: &AddressPool,
        interval: Duration,
        shutdown: &mut Shutdown,
    ) -> ControlFlow<()> {
        let Self {
            provider,
            index,
            rng,
        } = self;

        for (hostname, record_id) in index.iter() {
            if shutdown.is_requested() {
                return ControlFlow::Break(());
            }

            let address = pool.choose(&mut *rng);
            push_update(&**provider, hostname, record_id, address).await;

            pause(interval, shutdown).await?;
        }

        ControlFlow::Continue(())
    }
}

async fn push_update(provider: &dyn DnsProvider, hostname: &str, record_id: &str, address: &str) {
    debug!("Setting {} ({}) to {}", hostname, record_id, address);

    let update = RecordUpdate::proxied_a(hostname, address);
    match provider.update_record(record_id, &update).await {
        Ok(()) => info!("Successfully updated DNS record for {} to {}", hostname, address),
        Err(e) => error!("Failed to update DNS record for {}: {:#}", hostname, e),
    }
}

async fn pause(interval: Duration, shutdown: &mut Shutdown) -> ControlFlow<()> {
    tokio::select! {
        _ = tokio::time::sleep(interval) => ControlFlow::Continue(()),
        _ = shutdown.requested() => {
            info!("Shutdown signal received, stopping rotation");
            ControlFlow::Break(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::DnsRecord;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::watch;
    use tokio::time::Instant;

    #[derive(Default)]
    struct FakeProvider {
        records: Option<Vec<DnsRecord>>,
        failing: Vec<String>,
        updates: Mutex<Vec<(String, RecordUpdate)>>,
    }

    impl FakeProvider {
        fn with_records(records: &[(&str, &str)]) -> Self {
            Self {
                records: Some(
                    records
                        .iter()
                        .map(|(name, id)| DnsRecord {
                            id: id.to_string(),
                            name: name.to_string(),
                            content: None,
                        })
                        .collect(),
                ),
                ..Default::default()
            }
        }

        fn failing_on(mut self, hostname: &str) -> Self {
            self.failing.push(hostname.to_string());
            self
        }

        fn updates(&self) -> Vec<(String, RecordUpdate)> {
            self.updates.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DnsProvider for FakeProvider {
        async fn list_records(&self) -> Result<Vec<DnsRecord>> {
            self.records
                .clone()
                .ok_or_else(|| anyhow!("Cloudflare API error (500): boom"))
        }

        async fn update_record(&self, record_id: &str, update: &RecordUpdate) -> Result<()> {
            self.updates
                .lock()
                .unwrap()
                .push((record_id.to_string(), update.clone()));
            if self.failing.contains(&update.name) {
                return Err(anyhow!("Cloudflare API error (400): rejected"));
            }
            Ok(())
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }
    }

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn pool(addresses: &[&str]) -> AddressPool {
        AddressPool::new(addresses.iter().map(|a| a.to_string()).collect()).unwrap()
    }

    async fn updater(provider: &Arc<FakeProvider>, names: &[&str]) -> Updater {
        let provider: Arc<dyn DnsProvider> = provider.clone();
        Updater::with_rng(provider, &targets(names), StdRng::seed_from_u64(1)).await
    }

    #[tokio::test]
    async fn test_index_built_from_targets() {
        let provider = Arc::new(FakeProvider::with_records(&[("a.com", "1"), ("b.com", "2")]));
        let updater = updater(&provider, &["a.com", "c.com"]).await;

        let entries: Vec<(&str, &str)> = updater.index().iter().collect();
        assert_eq!(entries, vec![("a.com", "1")]);
    }

    #[tokio::test]
    async fn test_list_failure_leaves_empty_index() {
        let provider = Arc::new(FakeProvider::default());
        let updater = updater(&provider, &["a.com"]).await;
        assert!(updater.index().is_empty());
    }

    #[tokio::test]
    async fn test_update_record_sends_proxied_a() {
        let provider = Arc::new(FakeProvider::with_records(&[("a.com", "1")]));
        let updater = updater(&provider, &["a.com"]).await;

        updater.update_record("a.com", "1", "1.2.3.4").await;

        assert_eq!(
            provider.updates(),
            vec![("1".to_string(), RecordUpdate::proxied_a("a.com", "1.2.3.4"))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_pass() {
        let provider = Arc::new(
            FakeProvider::with_records(&[("x.com", "1"), ("y.com", "2")]).failing_on("x.com"),
        );
        let mut updater = updater(&provider, &["x.com", "y.com"]).await;

        let flow = updater
            .run_pass(&pool(&["1.1.1.1"]), Duration::from_secs(1), &mut Shutdown::never())
            .await;

        assert!(flow.is_continue());
        let hosts: Vec<String> = provider.updates().into_iter().map(|(_, u)| u.name).collect();
        assert_eq!(hosts, vec!["x.com", "y.com"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pass_sleeps_after_each_update() {
        let provider = Arc::new(FakeProvider::with_records(&[
            ("a.com", "1"),
            ("b.com", "2"),
            ("c.com", "3"),
        ]));
        let mut updater = updater(&provider, &["a.com", "b.com", "c.com"]).await;

        let start = Instant::now();
        updater
            .run_pass(&pool(&["1.1.1.1"]), Duration::from_secs(10), &mut Shutdown::never())
            .await;
        let elapsed = start.elapsed();

        assert_eq!(provider.updates().len(), 3);
        assert!(elapsed >= Duration::from_secs(30), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(31), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_addresses_come_from_pool() {
        let provider = Arc::new(FakeProvider::with_records(&[("a.com", "1"), ("b.com", "2")]));
        let mut updater = updater(&provider, &["a.com", "b.com"]).await;
        let pool = pool(&["1.1.1.1", "2.2.2.2", "3.3.3.3"]);

        for _ in 0..50 {
            updater
                .run_pass(&pool, Duration::from_secs(1), &mut Shutdown::never())
                .await;
        }

        let updates = provider.updates();
        assert_eq!(updates.len(), 100);
        for (_, update) in &updates {
            assert!(pool.addresses().contains(&update.content));
        }
        for address in pool.addresses() {
            assert!(updates.iter().any(|(_, u)| &u.content == address));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_rotation() {
        let provider = Arc::new(FakeProvider::with_records(&[("a.com", "1"), ("b.com", "2")]));
        let mut updater = updater(&provider, &["a.com", "b.com"]).await;
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            updater
                .run_with_shutdown(&pool(&["1.1.1.1"]), Duration::from_secs(10), Shutdown::new(rx))
                .await;
        });

        // updates at t=0, 10, 20; stop during the sleep that follows
        tokio::time::sleep(Duration::from_secs(25)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        let hosts: Vec<String> = provider.updates().into_iter().map(|(_, u)| u.name).collect();
        assert_eq!(hosts, vec!["a.com", "b.com", "a.com"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_index_runs_without_writes() {
        let provider = Arc::new(FakeProvider::default());
        let mut updater = updater(&provider, &["a.com"]).await;
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            updater
                .run_with_shutdown(&pool(&["1.1.1.1"]), Duration::from_secs(5), Shutdown::new(rx))
                .await;
        });

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!handle.is_finished());
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(provider.updates().is_empty());
    }
}
