//! Read-aloud and dictation flows with scripted speech backends

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use vassist::session::Session;
use vassist::speech::{
    CaptureOutcome, RecognitionError, RecognitionEvent, RecognitionResult, RecognitionSettings,
    SpeechInputCapture, SpeechOutputTrigger, SpeechRecognizer, SpeechSynthesizer, Utterance,
};
use vassist::Result;

/// Synthesizer that only records what it was asked to say
#[derive(Clone, Default)]
struct RecordingSynthesizer {
    spoken: Arc<Mutex<Vec<Utterance>>>,
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        self.spoken.lock().push(utterance.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Recognizer whose events are pushed by the test
struct ScriptedRecognizer {
    settings: Arc<Mutex<Option<RecognitionSettings>>>,
    starts: Arc<Mutex<usize>>,
    events_tx: Sender<RecognitionEvent>,
    events_rx: Receiver<RecognitionEvent>,
}

impl ScriptedRecognizer {
    fn new() -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            settings: Arc::new(Mutex::new(None)),
            starts: Arc::new(Mutex::new(0)),
            events_tx,
            events_rx,
        }
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn configure(&mut self, settings: &RecognitionSettings) -> Result<()> {
        *self.settings.lock() = Some(settings.clone());
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        *self.starts.lock() += 1;
        let _ = self.events_tx.send(RecognitionEvent::Start);
        Ok(())
    }

    fn events(&self) -> Receiver<RecognitionEvent> {
        self.events_rx.clone()
    }
}

#[test]
fn test_speak_before_any_reply_is_silent() {
    let synth = RecordingSynthesizer::default();
    let mut trigger = SpeechOutputTrigger::new(Session::new(), Some(Box::new(synth.clone())), "en-US");

    assert!(!trigger.trigger().unwrap());
    assert!(synth.spoken.lock().is_empty());
}

#[test]
fn test_speak_uses_latest_plain_text() {
    let session = Session::new();
    let synth = RecordingSynthesizer::default();
    let mut trigger =
        SpeechOutputTrigger::new(session.clone(), Some(Box::new(synth.clone())), "en-US");

    session.record("Hi");
    assert!(trigger.trigger().unwrap());

    session.record("Second answer");
    assert!(trigger.trigger().unwrap());

    let spoken = synth.spoken.lock();
    assert_eq!(spoken.len(), 2);
    assert_eq!(spoken[0], Utterance::new("Hi", "en-US"));
    assert_eq!(spoken[1].text, "Second answer");
}

#[test]
fn test_microphone_disabled_without_recognizer() {
    let mut capture = SpeechInputCapture::new(None, &RecognitionSettings::default());

    assert!(!capture.is_available());
    assert_eq!(
        capture.unavailable_reason(),
        Some("Speech recognition not supported on this system.")
    );
    assert!(!capture.click().unwrap());
    assert!(!capture.is_listening());
    assert!(capture.poll().is_empty());
}

#[test]
fn test_recognizer_configured_with_settings() {
    let recognizer = ScriptedRecognizer::new();
    let settings = Arc::clone(&recognizer.settings);

    let _capture = SpeechInputCapture::new(Some(Box::new(recognizer)), &RecognitionSettings::default());

    let applied = settings.lock().clone().unwrap();
    assert_eq!(applied.language, "en-US");
    assert!(!applied.interim_results);
    assert_eq!(applied.max_alternatives, 1);
}

#[test]
fn test_transcript_replaces_input() {
    let recognizer = ScriptedRecognizer::new();
    let events = recognizer.events_tx.clone();
    let mut capture =
        SpeechInputCapture::new(Some(Box::new(recognizer)), &RecognitionSettings::default());

    assert!(capture.click().unwrap());
    events
        .send(RecognitionEvent::Result(RecognitionResult::single("test query")))
        .unwrap();
    events.send(RecognitionEvent::End).unwrap();

    assert_eq!(
        capture.poll(),
        vec![CaptureOutcome::Transcript("test query".to_string())]
    );
    assert!(!capture.is_listening());
}

#[test]
fn test_recognition_error_raises_one_alert() {
    let recognizer = ScriptedRecognizer::new();
    let events = recognizer.events_tx.clone();
    let mut capture =
        SpeechInputCapture::new(Some(Box::new(recognizer)), &RecognitionSettings::default());

    capture.click().unwrap();
    events
        .send(RecognitionEvent::Error(RecognitionError::NoSpeech))
        .unwrap();
    events.send(RecognitionEvent::End).unwrap();

    let outcomes = capture.poll();
    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        CaptureOutcome::Alert(message) => assert!(message.contains("no-speech")),
        other => panic!("Unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_clicks_ignored_while_listening() {
    let recognizer = ScriptedRecognizer::new();
    let starts = Arc::clone(&recognizer.starts);
    let events = recognizer.events_tx.clone();
    let mut capture =
        SpeechInputCapture::new(Some(Box::new(recognizer)), &RecognitionSettings::default());

    assert!(capture.click().unwrap());
    assert!(!capture.click().unwrap());
    assert_eq!(*starts.lock(), 1);

    events.send(RecognitionEvent::End).unwrap();
    capture.poll();
    assert!(capture.click().unwrap());
    assert_eq!(*starts.lock(), 2);
}
