use tokio::sync::watch;

/// Optional stop signal for the rotation loop. `never()` keeps it running
/// until the process is killed.
#[derive(Debug, Default)]
pub struct Shutdown {
    rx: Option<watch::Receiver<bool>>,
}

impl Shutdown {
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Stops once `true` is sent on the channel.
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx: Some(rx) }
    }

    pub fn is_requested(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once shutdown is requested. A dropped sender can no longer
    /// request it, so this then never resolves.
    pub async fn requested(&mut self) {
        let Some(rx) = self.rx.as_mut() else {
            return std::future::pending().await;
        };

        loop {
            let stop = *rx.borrow_and_update();
            if stop {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}
