//! Serializes notification delivery into a single decoder.
//!
//! BLE stacks hand out notifications from their own callbacks, possibly on
//! several threads. [`spawn`] moves a [`Decoder`] into one tokio task that
//! drains a queue, so `feed` is only ever called by one consumer, in the
//! order chunks were queued.

use crate::decoder::{DecodeResult, Decoder};
use crate::error::DecoderError;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Producer side, cloneable into each notification callback
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::Sender<Bytes>,
}

impl NotificationSender {
    /// Queue a chunk, waiting for space if the queue is full
    pub async fn send(&self, chunk: Bytes) -> Result<(), DecoderError> {
        self.tx.send(chunk).await.map_err(|_| DecoderError::QueueClosed)
    }

    /// Queue a chunk from synchronous code without waiting
    pub fn try_send(&self, chunk: Bytes) -> Result<(), DecoderError> {
        self.tx.try_send(chunk).map_err(|err| match err {
            TrySendError::Full(_) => DecoderError::QueueFull,
            TrySendError::Closed(_) => DecoderError::QueueClosed,
        })
    }
}

/// Consumer side: decode results and, once every sender is dropped, the
/// decoder itself.
#[derive(Debug)]
pub struct NotificationPump {
    results: mpsc::UnboundedReceiver<DecodeResult>,
    task: JoinHandle<Decoder>,
}

impl NotificationPump {
    /// Next non-empty decode result, or `None` after the last sender is gone
    /// and the queue has drained.
    pub async fn recv(&mut self) -> Option<DecodeResult> {
        self.results.recv().await
    }

    /// Wait for the queue to drain and hand the decoder back.
    ///
    /// Completes only after every [`NotificationSender`] has been dropped.
    /// Results not yet received are dropped; observers have already run.
    pub async fn finish(self) -> Result<Decoder, DecoderError> {
        drop(self.results);
        Ok(self.task.await?)
    }
}

/// Start the decoding task. `capacity` bounds the number of queued chunks.
pub fn spawn(decoder: Decoder, capacity: usize) -> (NotificationSender, NotificationPump) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (results_tx, results) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(decoder, rx, results_tx));
    (NotificationSender { tx }, NotificationPump { results, task })
}

async fn run(
    mut decoder: Decoder,
    mut rx: mpsc::Receiver<Bytes>,
    results: mpsc::UnboundedSender<DecodeResult>,
) -> Decoder {
    let mut chunks = 0usize;
    while let Some(chunk) = rx.recv().await {
        chunks += 1;
        let result = decoder.feed(&chunk);
        if !result.is_empty() && results.send(result).is_err() {
            debug!("Result receiver dropped, decoding for observers only");
        }
    }
    info!(
        "Notification queue closed after {} chunks, {} bytes carried",
        chunks,
        decoder.buffered_len()
    );
    decoder
}
