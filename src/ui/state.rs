//! Application state management
//!
//! Central state for the assistant window. Handlers for the query form,
//! the speak control and the microphone control all act on this struct;
//! asynchronous completions are drained once per frame in `poll_events`.

use crate::config::AssistConfig;
use crate::messages::AssistantReply;
use crate::query::{DispatchOutcome, HttpBackend, QueryDispatcher, QueryPipeline};
use crate::session::Session;
use crate::speech::{
    detect_recognizer, detect_synthesizer, CaptureOutcome, RecognitionSettings,
    SpeechInputCapture, SpeechOutputTrigger,
};
use crate::{AssistError, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Placeholder shown while a query is in flight
pub const THINKING_TEXT: &str = "Thinking...";

/// Text shown in the display region when a query fails
pub fn failure_text(error: &AssistError) -> String {
    if error.is_recoverable() {
        format!("{} You can send the query again.", error.user_message())
    } else {
        error.user_message()
    }
}

/// Content of the response display region
#[derive(Debug, Clone, Default)]
pub enum ResponseView {
    /// Nothing asked yet
    #[default]
    Empty,
    /// Waiting for the backend
    Thinking,
    /// Assistant bubble with the latest reply
    Reply(AssistantReply),
    /// The last query failed
    Failed(String),
}

/// Central application state
pub struct AppState {
    /// Current value of the query field
    pub input_text: String,

    /// What the display region shows
    pub response: ResponseView,

    /// Shared last-response slot
    pub session: Session,

    /// Read-aloud control
    pub speech_output: SpeechOutputTrigger,

    /// Microphone control
    pub speech_input: SpeechInputCapture,

    /// Pending blocking alerts, oldest first
    alerts: VecDeque<String>,

    dispatcher: Option<QueryDispatcher>,
}

impl AppState {
    /// Create state around already-constructed speech controls
    pub fn new(
        session: Session,
        speech_output: SpeechOutputTrigger,
        speech_input: SpeechInputCapture,
    ) -> Self {
        Self {
            input_text: String::new(),
            response: ResponseView::Empty,
            session,
            speech_output,
            speech_input,
            alerts: VecDeque::new(),
            dispatcher: None,
        }
    }

    /// Attach the dispatcher that carries queries to the backend
    pub fn with_dispatcher(mut self, dispatcher: QueryDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Build the full state: HTTP backend, dispatch worker and speech backends
    pub fn connect(config: &AssistConfig) -> Result<Self> {
        config.validate()?;

        let session = Session::new();

        let backend = HttpBackend::new(&config.backend)?;
        info!("Assistant backend at {}", backend.url());
        let pipeline = QueryPipeline::new(Arc::new(backend));
        let dispatcher = QueryDispatcher::new(
            session.clone(),
            pipeline.command_sender(),
            pipeline.event_receiver(),
        );
        pipeline.start_worker()?;

        let speech_output = SpeechOutputTrigger::new(
            session.clone(),
            detect_synthesizer(&config.speech),
            config.speech.language.clone(),
        );
        let speech_input = SpeechInputCapture::new(
            detect_recognizer(&config.speech),
            &RecognitionSettings::from(&config.speech),
        );

        Ok(Self::new(session, speech_output, speech_input).with_dispatcher(dispatcher))
    }

    /// Handle a query form submission
    pub fn submit_query(&mut self) {
        self.response = ResponseView::Thinking;

        let result = match self.dispatcher.as_mut() {
            Some(dispatcher) => dispatcher.submit(&self.input_text).map(|_| ()),
            None => Err(AssistError::ChannelError("No query dispatcher attached".into())),
        };

        if let Err(e) = result {
            warn!("Query not sent: {}", e);
            self.response = ResponseView::Failed(failure_text(&e));
        }
    }

    /// Handle a click on the speak control
    pub fn speak_last_response(&mut self) {
        match self.speech_output.trigger() {
            Ok(true) => debug!("Speaking last response"),
            Ok(false) => {}
            Err(e) => warn!("Read-aloud failed: {}", e),
        }
    }

    /// Handle a click on the microphone control
    pub fn start_dictation(&mut self) {
        if let Err(e) = self.speech_input.click() {
            warn!("Could not start recognition: {}", e);
            self.alerts.push_back(e.user_message());
        }
    }

    /// Whether a query is in flight
    pub fn is_waiting(&self) -> bool {
        self.dispatcher.as_ref().is_some_and(|d| d.is_pending())
    }

    /// Whether anything asynchronous may still change the state
    pub fn is_busy(&self) -> bool {
        self.is_waiting() || self.speech_input.is_listening()
    }

    /// The alert currently blocking the window
    pub fn current_alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    /// Close the current alert
    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    /// Apply query completions and recognition events
    pub fn poll_events(&mut self) {
        if let Some(dispatcher) = self.dispatcher.as_mut() {
            for outcome in dispatcher.poll() {
                match outcome {
                    DispatchOutcome::Reply(reply) => {
                        self.response = ResponseView::Reply(reply);
                    }
                    DispatchOutcome::Failed(error) => {
                        self.response = ResponseView::Failed(failure_text(&error));
                    }
                }
            }
        }

        for outcome in self.speech_input.poll() {
            match outcome {
                CaptureOutcome::Transcript(transcript) => self.input_text = transcript,
                CaptureOutcome::Alert(message) => self.alerts.push_back(message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryCommand, QueryEvent};
    use crossbeam_channel::{bounded, Receiver, Sender};

    fn state() -> (AppState, Receiver<QueryCommand>, Sender<QueryEvent>) {
        let session = Session::new();
        let (command_tx, command_rx) = bounded(10);
        let (event_tx, event_rx) = bounded(10);
        let dispatcher = QueryDispatcher::new(session.clone(), command_tx, event_rx);

        let state = AppState::new(
            session.clone(),
            SpeechOutputTrigger::new(session, None, "en-US"),
            SpeechInputCapture::new(None, &RecognitionSettings::default()),
        )
        .with_dispatcher(dispatcher);

        (state, command_rx, event_tx)
    }

    #[test]
    fn test_submit_shows_placeholder() {
        let (mut state, commands, _events) = state();
        state.input_text = "hello".to_string();
        state.submit_query();

        assert!(matches!(state.response, ResponseView::Thinking));
        assert!(state.is_waiting());
        assert!(matches!(
            commands.try_recv().unwrap(),
            QueryCommand::Submit { ref input, .. } if input == "hello"
        ));
        // The field keeps its value after submission
        assert_eq!(state.input_text, "hello");
    }

    #[test]
    fn test_reply_replaces_placeholder() {
        let (mut state, commands, events) = state();
        state.input_text = "hi".to_string();
        state.submit_query();

        let request_id = match commands.try_recv().unwrap() {
            QueryCommand::Submit { request_id, .. } => request_id,
            other => panic!("Unexpected command: {:?}", other),
        };
        events
            .send(QueryEvent::Completed {
                request_id,
                response: "<b>Hi</b>".to_string(),
                elapsed_ms: 5,
            })
            .unwrap();
        state.poll_events();

        match &state.response {
            ResponseView::Reply(reply) => assert_eq!(reply.markup, "<b>Hi</b>"),
            other => panic!("Unexpected view: {:?}", other),
        }
        assert_eq!(state.session.last_response().as_deref(), Some("Hi"));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_failure_is_shown() {
        let (mut state, commands, events) = state();
        state.submit_query();
        let request_id = match commands.try_recv().unwrap() {
            QueryCommand::Submit { request_id, .. } => request_id,
            other => panic!("Unexpected command: {:?}", other),
        };
        events
            .send(QueryEvent::Failed {
                request_id: Some(request_id),
                error: AssistError::RequestError("connection refused".into()),
            })
            .unwrap();
        state.poll_events();

        match &state.response {
            ResponseView::Failed(text) => assert!(text.ends_with("You can send the query again.")),
            other => panic!("Unexpected view: {:?}", other),
        }
        assert!(state.session.last_response().is_none());
    }

    #[test]
    fn test_failure_text_offers_retry_only_when_recoverable() {
        let refused = AssistError::RequestError("connection refused".into());
        assert_eq!(
            failure_text(&refused),
            format!("{} You can send the query again.", refused.user_message())
        );

        let not_found = AssistError::BackendStatus {
            status: 404,
            message: "Not Found".into(),
        };
        assert_eq!(failure_text(&not_found), not_found.user_message());
    }

    #[test]
    fn test_submit_without_dispatcher() {
        let session = Session::new();
        let mut state = AppState::new(
            session.clone(),
            SpeechOutputTrigger::new(session, None, "en-US"),
            SpeechInputCapture::new(None, &RecognitionSettings::default()),
        );
        state.submit_query();
        match &state.response {
            ResponseView::Failed(text) => {
                assert_eq!(text, &AssistError::ChannelError(String::new()).user_message())
            }
            other => panic!("Unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_alerts_are_dismissed_in_order() {
        let (mut state, _commands, _events) = state();
        state.alerts.push_back("first".into());
        state.alerts.push_back("second".into());

        assert_eq!(state.current_alert(), Some("first"));
        state.dismiss_alert();
        assert_eq!(state.current_alert(), Some("second"));
        state.dismiss_alert();
        assert_eq!(state.current_alert(), None);
    }
}
