//! External file selection handshake
//!
//! When nothing is playable the coordinator asks the UI layer to present a
//! file chooser. The request travels over an mpsc channel and carries a
//! oneshot reply slot, so the coordinator simply awaits the answer:
//!
//! ```text
//! coordinator ── SelectionRequest ──▶ UI layer
//!      ▲                                 │ (user picks files / closes dialog)
//!      └────────── Selection ◀───────────┘
//! ```
//!
//! A UI that drops the request without answering counts as a cancellation.

use crate::types::TrackRef;
use tokio::sync::{mpsc, oneshot};

/// Outcome of a file chooser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Paths picked by the user (possibly none)
    Chosen(Vec<TrackRef>),

    /// User closed the dialog
    Cancelled,
}

/// A pending request for the UI to present a file chooser
#[derive(Debug)]
pub struct SelectionRequest {
    /// Whether several files may be picked
    pub multiple: bool,

    /// Accepted file extensions, without leading dot
    pub extensions: Vec<String>,

    reply: oneshot::Sender<Selection>,
}

impl SelectionRequest {
    /// Answer the request
    pub fn respond(self, selection: Selection) {
        // Requester may have gone away
        let _ = self.reply.send(selection);
    }

    pub fn choose(self, paths: Vec<TrackRef>) {
        self.respond(Selection::Chosen(paths));
    }

    pub fn cancel(self) {
        self.respond(Selection::Cancelled);
    }
}

/// Coordinator-side handle for requesting a file selection
#[derive(Debug, Clone)]
pub struct FileSelector {
    tx: mpsc::Sender<SelectionRequest>,
}

/// Create a selection channel
///
/// The receiver is owned by the UI layer, which answers each request.
pub fn selection_channel(capacity: usize) -> (FileSelector, mpsc::Receiver<SelectionRequest>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (FileSelector { tx }, rx)
}

impl FileSelector {
    /// Ask the UI to present a chooser and wait for the user
    ///
    /// No timeout: the wait ends only when the UI answers, drops the
    /// request, or closes the channel.
    pub async fn choose(&self, multiple: bool, extensions: &[String]) -> Selection {
        let (reply, answer) = oneshot::channel();
        let request = SelectionRequest {
            multiple,
            extensions: extensions.to_vec(),
            reply,
        };

        if self.tx.send(request).await.is_err() {
            tracing::warn!("File selection channel closed; treating as cancelled");
            return Selection::Cancelled;
        }

        answer.await.unwrap_or(Selection::Cancelled)
    }
}
