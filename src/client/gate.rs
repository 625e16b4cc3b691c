use std::future::Future;

use tokio::sync::OnceCell;

use crate::Result;

/// Sticky "app id checked" flag. The first successful check is cached for the
/// life of the client; concurrent callers wait on the same check. Failures are
/// not cached, so the next call checks again.
#[derive(Debug, Default)]
pub struct AppIdGate {
    checked: OnceCell<()>,
}

impl AppIdGate {
    pub fn is_open(&self) -> bool {
        self.checked.initialized()
    }

    /// Mark the gate open after a check done outside `open_with`.
    pub fn open(&self) {
        // Already open, or another caller is opening it right now.
        let _ = self.checked.set(());
    }

    pub async fn open_with<F, Fut>(&self, check: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.checked.get_or_try_init(check).await.map(|_| ())
    }
}
