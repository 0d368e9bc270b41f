//! Query flow: backend access, the dispatch worker, and the UI-side dispatcher
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vassist::config::BackendConfig;
//! use vassist::query::{HttpBackend, QueryDispatcher, QueryPipeline};
//! use vassist::session::Session;
//!
//! let backend = HttpBackend::new(&BackendConfig::default())?;
//! let pipeline = QueryPipeline::new(Arc::new(backend));
//! let session = Session::new();
//! let mut dispatcher =
//!     QueryDispatcher::new(session.clone(), pipeline.command_sender(), pipeline.event_receiver());
//! pipeline.start_worker()?;
//!
//! dispatcher.submit("what time is it")?;
//! // later, once per frame
//! for outcome in dispatcher.poll() { /* update the display */ }
//! ```

pub mod backend;
pub mod dispatcher;
pub mod pipeline;

pub use backend::{HttpBackend, QueryBackend};
pub use dispatcher::{DispatchOutcome, QueryDispatcher};
pub use pipeline::{QueryCommand, QueryEvent, QueryPipeline};
