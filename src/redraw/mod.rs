//! Redraw Event Module
//!
//! Everything between the editor's redraw notifications and the UI state:
//! - Tagged event enumeration
//! - Decoding from the dynamically typed notification payload
//! - The processor applying events in order
//! - The queue handing decoded batches from the transport to the tick

mod decode;
mod event;
mod processor;
mod queue;

pub use decode::{decode_batch, decode_event, DecodeError};
pub use event::{Batch, LineCell, RedrawEvent};
pub use processor::{BatchOutcome, EventProcessor, UiState};
pub use queue::{batch_queue, BatchReceiver, BatchSender, QueueClosed};
