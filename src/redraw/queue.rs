//! Batch queue between the transport and the render tick
//!
//! The transport side decodes each redraw notification and pushes the batch
//! without touching UI state; the tick drains everything pending, in FIFO
//! order, right before applying and rendering.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use serde_json::Value;

use super::decode::decode_batch;
use super::event::Batch;

/// The consuming side of the queue is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("batch queue closed")]
pub struct QueueClosed;

/// Create a connected sender/receiver pair
pub fn batch_queue() -> (BatchSender, BatchReceiver) {
    let (tx, rx) = mpsc::channel();
    (
        BatchSender { tx },
        BatchReceiver { rx, closed: false },
    )
}

/// Producer handle, owned by the transport adapter
#[derive(Debug)]
pub struct BatchSender {
    tx: Sender<Batch>,
}

impl BatchSender {
    /// Queue an already decoded batch and return immediately
    pub fn send(&self, batch: Batch) -> Result<(), QueueClosed> {
        self.tx.send(batch).map_err(|_| QueueClosed)
    }

    /// Decode the parameters of a redraw notification and queue them
    pub fn send_notification(&self, params: &[Value]) -> Result<(), QueueClosed> {
        self.send(decode_batch(params))
    }
}

/// Consumer handle, owned by the tick
#[derive(Debug)]
pub struct BatchReceiver {
    rx: Receiver<Batch>,
    closed: bool,
}

impl BatchReceiver {
    /// Take every batch queued so far, oldest first
    pub fn drain(&mut self) -> Vec<Batch> {
        let mut batches = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(batch) => batches.push(batch),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                },
            }
        }
        batches
    }

    /// The producer is gone and everything it sent has been drained
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
