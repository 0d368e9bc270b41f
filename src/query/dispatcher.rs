//! Query dispatcher
//!
//! UI-side half of the query flow. The dispatcher hands submissions to the
//! pipeline worker, tracks which request is current, and turns completed
//! responses into [`AssistantReply`] values while recording their plain
//! text in the [`Session`].
//!
//! Overlapping submissions are not serialized. Every submission gets a new
//! request id and only the most recent one is applied; completions for
//! earlier requests are discarded when they arrive.

use crate::messages::AssistantReply;
use crate::query::pipeline::{QueryCommand, QueryEvent};
use crate::session::Session;
use crate::{AssistError, Result};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of applying one pipeline event
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// A reply for the current request arrived and was recorded
    Reply(AssistantReply),
    /// The current request failed
    Failed(AssistError),
}

pub struct QueryDispatcher {
    session: Session,
    command_tx: Sender<QueryCommand>,
    event_rx: Receiver<QueryEvent>,
    pending: Option<Uuid>,
}

impl QueryDispatcher {
    pub fn new(
        session: Session,
        command_tx: Sender<QueryCommand>,
        event_rx: Receiver<QueryEvent>,
    ) -> Self {
        Self {
            session,
            command_tx,
            event_rx,
            pending: None,
        }
    }

    /// Send a query; the input is forwarded exactly as typed
    pub fn submit(&mut self, input: &str) -> Result<Uuid> {
        let request_id = Uuid::new_v4();

        if let Some(previous) = self.pending.replace(request_id) {
            debug!("Query {} superseded by {}", previous, request_id);
        }

        self.command_tx
            .send(QueryCommand::Submit {
                input: input.to_string(),
                request_id,
            })
            .map_err(|e| {
                self.pending = None;
                AssistError::ChannelError(format!("Query pipeline unavailable: {}", e))
            })?;

        Ok(request_id)
    }

    /// The request whose result will be applied next
    pub fn pending(&self) -> Option<Uuid> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drain pipeline events and apply those that belong to the current request
    pub fn poll(&mut self) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();

        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                QueryEvent::Completed {
                    request_id,
                    response,
                    elapsed_ms,
                } => {
                    if self.pending != Some(request_id) {
                        debug!("Discarding stale response for {}", request_id);
                        continue;
                    }
                    self.pending = None;

                    let reply = AssistantReply::new(request_id, response);
                    self.session.record(reply.plain_text.clone());
                    info!("Reply received in {}ms", elapsed_ms);
                    outcomes.push(DispatchOutcome::Reply(reply));
                }
                QueryEvent::Failed { request_id, error } => match request_id {
                    Some(id) if self.pending != Some(id) => {
                        debug!("Discarding stale failure for {}: {}", id, error);
                    }
                    _ => {
                        self.pending = None;
                        outcomes.push(DispatchOutcome::Failed(error));
                    }
                },
                QueryEvent::Shutdown => {
                    warn!("Query pipeline shut down");
                }
            }
        }

        outcomes
    }
}
