//! Output channel between pipeline tasks and the renderer
//!
//! Any number of pipeline tasks push results; a single consumer forwards them
//! in arrival order until it reads the shutdown sentinel.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::types::ResultMessage;

/// Item carried by the output channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMessage {
    Result(ResultMessage),
    /// Tells the consumer to stop; never rendered
    Shutdown,
}

/// Receives results from the output consumer
pub trait ResultSink {
    fn deliver(&mut self, message: &ResultMessage);
}

impl ResultSink for Vec<ResultMessage> {
    fn deliver(&mut self, message: &ResultMessage) {
        self.push(message.clone());
    }
}

/// Cloneable producer side of the output channel
#[derive(Debug, Clone)]
pub struct OutputSender {
    tx: UnboundedSender<OutputMessage>,
}

pub type OutputReceiver = UnboundedReceiver<OutputMessage>;

/// Create the unbounded output channel
pub fn output_channel() -> (OutputSender, OutputReceiver) {
    let (tx, rx) = unbounded_channel();
    (OutputSender { tx }, rx)
}

impl OutputSender {
    /// Push a result. Returns `false` when the consumer is already gone.
    pub fn send(&self, message: ResultMessage) -> bool {
        match self.tx.send(OutputMessage::Result(message)) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Output consumer gone, dropping result: {:?}", e.0);
                false
            }
        }
    }

    /// Push the shutdown sentinel behind every result sent so far
    pub fn shutdown(&self) -> bool {
        self.tx.send(OutputMessage::Shutdown).is_ok()
    }
}

/// Forward results to `sink` until the sentinel arrives or every sender is dropped.
///
/// Returns the number of results delivered.
pub async fn consume<S: ResultSink>(mut receiver: OutputReceiver, sink: &mut S) -> usize {
    let mut delivered = 0;

    while let Some(message) = receiver.recv().await {
        match message {
            OutputMessage::Result(result) => {
                sink.deliver(&result);
                delivered += 1;
            }
            OutputMessage::Shutdown => {
                tracing::debug!("Output consumer stopping after {} results", delivered);
                break;
            }
        }
    }

    delivered
}
