use std::{future::Future, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle, time::sleep};

/// Coalesces rapid edits. Each [`push`](Self::push) supersedes the pending
/// text and restarts the delay; `flush` runs once the editor has been quiet
/// for `delay`, with the latest text only.
pub struct Debouncer {
    tx: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl Debouncer {
    pub fn new<F, Fut>(delay: Duration, mut flush: F) -> Self
    where
        F: FnMut(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let task = tokio::spawn(async move {
            while let Some(mut pending) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(text) => pending = text,
                            None => {
                                flush(pending).await;
                                return;
                            }
                        },
                        _ = sleep(delay) => {
                            flush(pending).await;
                            break;
                        }
                    }
                }
            }
        });

        Self { tx, task }
    }

    pub fn push(&self, text: String) {
        let _ = self.tx.send(text);
    }

    /// Sends whatever is still pending right away and waits for it.
    pub async fn finish(self) {
        let Self { tx, task } = self;
        drop(tx);
        if let Err(err) = task.await {
            tracing::warn!(error = %err, "debounced flush did not complete");
        }
    }
}
