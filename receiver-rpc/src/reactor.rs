//! Client-side event reactor: a single long-running reader that turns the
//! `Subscribe` stream into native events for a user handler, optionally
//! off-loaded to a dedicated callback thread so the handler never blocks the
//! tokio task driving the stream.

use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle as ThreadJoinHandle;

use tokio::task::JoinHandle;

use receiver_core::{ReceiverEvent, ReceiverEventKind};

use crate::client::ReceiverClient;
use crate::convert::{self, NativeEvent};

/// Owns the subscribe loop. Dropping it leaves the loop running; call
/// [`EventReactor::stop`] to tear it down explicitly.
pub struct EventReactor {
    task: JoinHandle<()>,
    callback_thread: Option<(std_mpsc::Sender<NativeEvent>, ThreadJoinHandle<()>)>,
}

impl EventReactor {
    /// Delivers events directly on the tokio task reading the stream.
    pub fn spawn<F>(client: ReceiverClient, sync_only: bool, handler: F) -> Self
    where
        F: Fn(NativeEvent) + Send + 'static,
    {
        let task = tokio::spawn(run(client, sync_only, move |ev| handler(ev)));
        Self {
            task,
            callback_thread: None,
        }
    }

    /// Like [`EventReactor::spawn`], but `handler` runs on a dedicated OS
    /// thread rather than the stream's tokio task, so a slow handler never
    /// stalls the reader.
    pub fn spawn_with_callback_thread<F>(client: ReceiverClient, sync_only: bool, handler: F) -> Self
    where
        F: Fn(NativeEvent) + Send + 'static,
    {
        let (tx, rx) = std_mpsc::channel::<NativeEvent>();
        let thread = std::thread::Builder::new()
            .name("receiver-event-callback".into())
            .spawn(move || {
                while let Ok(ev) = rx.recv() {
                    handler(ev);
                }
            })
            .expect("failed to spawn event callback thread");

        let forward = tx.clone();
        let task = tokio::spawn(run(client, sync_only, move |ev| {
            let _ = forward.send(ev);
        }));

        Self {
            task,
            callback_thread: Some((tx, thread)),
        }
    }

    /// Aborts the subscribe task and, if a callback thread is running, closes
    /// its channel and joins it.
    pub fn stop(self) {
        self.task.abort();
        if let Some((tx, thread)) = self.callback_thread {
            drop(tx);
            let _ = thread.join();
        }
    }
}

async fn run<F>(client: ReceiverClient, sync_only: bool, deliver: F)
where
    F: Fn(NativeEvent) + Send + 'static,
{
    let mut stream = match client.subscribe_raw(sync_only).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(error = %err, "event reactor failed to open subscription");
            return;
        }
    };

    loop {
        match stream.message().await {
            Ok(Some(event)) => {
                if let Some(native) = convert::proto_to_native(event) {
                    deliver(native);
                }
            }
            Ok(None) => break,
            Err(status) => {
                tracing::warn!(error = %status, "event stream ended with error");
                break;
            }
        }
    }

    deliver(NativeEvent::Receiver(ReceiverEvent::synthetic(
        ReceiverEventKind::Unsubscribed,
    )));
}
