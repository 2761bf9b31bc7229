use std::sync::Arc;

use tokio::sync::watch;

/// Trigger side of a step cancellation. Cloneable; any clone cancels.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Waiting side, passed into a step.
#[derive(Debug)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token nothing can fire.
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Resolves once the paired handle cancels. Never resolves if the handle is
    /// dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (
        CancelHandle { tx: Arc::new(tx) },
        CancelToken { rx: Some(rx) },
    )
}
