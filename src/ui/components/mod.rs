//! UI components for the assistant window

mod alert_dialog;
mod query_form;
mod response_panel;
mod speech_controls;

pub use alert_dialog::AlertDialog;
pub use query_form::QueryForm;
pub use response_panel::ResponsePanel;
pub use speech_controls::SpeechControls;

/// Accessibility label of the query field
pub const QUERY_INPUT_LABEL: &str = "Query input";
/// Accessibility label of the submit button
pub const SEND_LABEL: &str = "Send";
/// Accessibility label of the read-aloud button
pub const SPEAK_LABEL: &str = "Speak response";
/// Accessibility label of the microphone button
pub const MICROPHONE_LABEL: &str = "Microphone";
