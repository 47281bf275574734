//! # Background Worker
//!
//! Esegue il batch su un thread bloccante (`spawn_blocking`) così il runtime
//! async resta libero di gestire input, segnali e output.
//! Le chiamate al `Reporter` diventano `BatchEvent` su un canale mpsc.

use crate::{
    error::CompressError,
    optimizer::{
        batch::BatchController,
        progress_tracker::{BatchEvent, Reporter},
    },
    outcome::{BatchReport, CompressionOutcome},
};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Forwards reporter calls over an unbounded channel
pub struct ChannelReporter {
    sender: mpsc::UnboundedSender<BatchEvent>,
}

impl ChannelReporter {
    pub fn new(sender: mpsc::UnboundedSender<BatchEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: BatchEvent) {
        // A closed channel means nobody is listening anymore
        let _ = self.sender.send(event);
    }
}

impl Reporter for ChannelReporter {
    fn on_progress(&mut self, fraction: f64) {
        self.send(BatchEvent::Progress(fraction));
    }

    fn on_log(&mut self, message: &str) {
        self.send(BatchEvent::Log(message.to_string()));
    }

    fn on_outcome(&mut self, outcome: &CompressionOutcome) {
        self.send(BatchEvent::Outcome(outcome.clone()));
    }
}

/// Run `controller` over `root` on the blocking pool.
///
/// The event receiver closes once the batch has finished.
pub fn spawn_batch(
    mut controller: BatchController,
    root: PathBuf,
) -> (JoinHandle<Result<BatchReport, CompressError>>, mpsc::UnboundedReceiver<BatchEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();

    let handle = tokio::task::spawn_blocking(move || {
        let mut reporter = ChannelReporter::new(sender);
        controller.run(&root, &mut reporter)
    });

    (handle, receiver)
}
