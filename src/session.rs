//! Shared session state
//!
//! The session carries the plain text of the most recent assistant reply
//! from the query side to the read-aloud control. One `Session` is created
//! at startup and clones of it are handed to every component that needs it.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Handle to the process-wide last-response slot
#[derive(Debug, Clone, Default)]
pub struct Session {
    last_response: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the last response with the plain text of a new reply
    pub fn record(&self, plain_text: impl Into<String>) {
        let text = plain_text.into();
        debug!("Recording last response ({} chars)", text.len());
        *self.last_response.write() = Some(text);
    }

    /// Plain text of the most recent reply, if any query has completed
    pub fn last_response(&self) -> Option<String> {
        self.last_response.read().clone()
    }

    pub fn has_response(&self) -> bool {
        self.last_response.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initially_absent() {
        let session = Session::new();
        assert!(!session.has_response());
        assert_eq!(session.last_response(), None);
    }

    #[test]
    fn test_clones_share_the_slot() {
        let session = Session::new();
        let reader = session.clone();

        session.record("first");
        session.record("second");
        assert_eq!(reader.last_response().as_deref(), Some("second"));
        assert!(reader.has_response());
    }
}
