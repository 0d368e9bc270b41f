//! Query dispatch pipeline
//!
//! Provides a channel-based interface for sending queries to the backend
//! without blocking the UI thread. The worker owns a tokio runtime; each
//! submission runs as its own task, so overlapping submissions proceed
//! concurrently and complete in whatever order the backend answers.

use crate::query::backend::QueryBackend;
use crate::{AssistError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Commands that can be sent to the query pipeline
#[derive(Debug, Clone)]
pub enum QueryCommand {
    /// Send a query to the backend
    Submit {
        /// The user's input, unmodified
        input: String,
        /// Unique request ID for tracking
        request_id: Uuid,
    },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the query pipeline
#[derive(Debug, Clone)]
pub enum QueryEvent {
    /// The backend answered
    Completed {
        request_id: Uuid,
        /// Response markup
        response: String,
        elapsed_ms: u64,
    },

    /// The request failed
    Failed {
        request_id: Option<Uuid>,
        error: AssistError,
    },

    /// Pipeline has shut down
    Shutdown,
}

/// Query pipeline with channel-based communication
pub struct QueryPipeline {
    backend: Arc<dyn QueryBackend>,

    command_tx: Sender<QueryCommand>,
    command_rx: Receiver<QueryCommand>,

    event_tx: Sender<QueryEvent>,
    event_rx: Receiver<QueryEvent>,
}

impl QueryPipeline {
    /// Create a new pipeline around a backend
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        Self {
            backend,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<QueryCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<QueryEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread
    pub fn start_worker(self) -> Result<JoinHandle<()>> {
        let backend = self.backend;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;

        std::thread::Builder::new()
            .name("query-pipeline".to_string())
            .spawn(move || {
                info!("Query pipeline worker starting");

                let runtime = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to create tokio runtime: {}", e);
                        let _ = event_tx.send(startup_failure(e));
                        let _ = event_tx.send(QueryEvent::Shutdown);
                        return;
                    }
                };

                loop {
                    match command_rx.recv() {
                        Ok(QueryCommand::Submit { input, request_id }) => {
                            debug!("Dispatching query {}", request_id);

                            let backend = Arc::clone(&backend);
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let started = Instant::now();
                                let event = match backend.query(&input).await {
                                    Ok(response) => {
                                        let elapsed_ms = started.elapsed().as_millis() as u64;
                                        debug!(
                                            "Query {} answered in {}ms ({} chars)",
                                            request_id,
                                            elapsed_ms,
                                            response.len()
                                        );
                                        QueryEvent::Completed {
                                            request_id,
                                            response,
                                            elapsed_ms,
                                        }
                                    }
                                    Err(e) => {
                                        warn!("Query {} failed: {}", request_id, e);
                                        QueryEvent::Failed {
                                            request_id: Some(request_id),
                                            error: e,
                                        }
                                    }
                                };
                                if event_tx.send(event).is_err() {
                                    debug!("Event receiver dropped, discarding result");
                                }
                            });
                        }
                        Ok(QueryCommand::Shutdown) => {
                            info!("Query pipeline shutting down");
                            break;
                        }
                        Err(e) => {
                            debug!("Command channel closed: {}", e);
                            break;
                        }
                    }
                }

                runtime.shutdown_background();
                let _ = event_tx.send(QueryEvent::Shutdown);
                info!("Query pipeline worker stopped");
            })
            .map_err(|e| AssistError::ChannelError(format!("Failed to spawn worker: {}", e)))
    }
}

/// Event sent when the worker cannot start its runtime
fn startup_failure(e: std::io::Error) -> QueryEvent {
    QueryEvent::Failed {
        request_id: None,
        error: AssistError::from(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::time::Duration;

    struct EchoBackend;

    impl QueryBackend for EchoBackend {
        fn query<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<String>> {
            async move {
                if input == "fail" {
                    Err(AssistError::ParseError("missing field `response`".into()))
                } else {
                    Ok(format!("<b>{}</b>", input))
                }
            }
            .boxed()
        }
    }

    #[test]
    fn test_submit_and_complete() {
        let pipeline = QueryPipeline::new(Arc::new(EchoBackend));
        let tx = pipeline.command_sender();
        let rx = pipeline.event_receiver();
        pipeline.start_worker().unwrap();

        let request_id = Uuid::new_v4();
        tx.send(QueryCommand::Submit {
            input: "hi".to_string(),
            request_id,
        })
        .unwrap();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            QueryEvent::Completed {
                request_id: id,
                response,
                ..
            } => {
                assert_eq!(id, request_id);
                assert_eq!(response, "<b>hi</b>");
            }
            other => panic!("Unexpected event: {:?}", other),
        }

        tx.send(QueryCommand::Shutdown).unwrap();
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            QueryEvent::Shutdown
        ));
    }

    #[test]
    fn test_failure_is_reported() {
        let pipeline = QueryPipeline::new(Arc::new(EchoBackend));
        let tx = pipeline.command_sender();
        let rx = pipeline.event_receiver();
        pipeline.start_worker().unwrap();

        let request_id = Uuid::new_v4();
        tx.send(QueryCommand::Submit {
            input: "fail".to_string(),
            request_id,
        })
        .unwrap();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            QueryEvent::Failed {
                request_id: id,
                error,
            } => {
                assert_eq!(id, Some(request_id));
                assert!(matches!(error, AssistError::ParseError(_)));
            }
            other => panic!("Unexpected event: {:?}", other),
        }

        let _ = tx.send(QueryCommand::Shutdown);
    }

    #[test]
    fn test_startup_failure_is_io_error() {
        let e = std::io::Error::new(std::io::ErrorKind::Other, "too many open files");
        match startup_failure(e) {
            QueryEvent::Failed { request_id, error } => {
                assert_eq!(request_id, None);
                assert!(matches!(error, AssistError::IOError(ref m) if m.contains("too many open files")));
                assert!(!error.is_recoverable());
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }
}
