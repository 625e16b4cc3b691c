// src/dispatch.rs - Hands listener callbacks to the host's main thread
use tokio::sync::mpsc;
use tracing::warn;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where listener callbacks run. Never the transport's worker.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Sending half, given to the SDK.
#[derive(Debug, Clone)]
pub struct MainThreadDispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

/// Receiving half, drained by the host on its own thread.
pub struct MainThreadQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

pub fn main_thread() -> (MainThreadDispatcher, MainThreadQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MainThreadDispatcher { tx }, MainThreadQueue { rx })
}

impl Dispatcher for MainThreadDispatcher {
    fn dispatch(&self, job: Job) {
        if self.tx.send(job).is_err() {
            warn!("Main thread queue dropped, callback discarded");
        }
    }
}

impl MainThreadQueue {
    /// Run whatever is queued right now without waiting.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait for the next callback and run it. `false` once every dispatcher is gone.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}
