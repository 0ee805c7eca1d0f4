use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// No speech recognizer on this device
    #[error("voice dictation is not available on this device")]
    Unavailable,
}

/// The external speech-to-text collaborator
///
/// Recognized text is delivered separately as [`RecognitionEvent`]s; this
/// trait only covers the start/stop controls the session owns.
pub trait SpeechCapture {
    fn start(&mut self) -> Result<(), CaptureError>;
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// One recognizer hypothesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

/// A batch of results from the recognizer; entries before `result_index`
/// were already delivered in earlier events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionEvent {
    pub result_index: usize,
    pub results: Vec<RecognitionResult>,
}

impl RecognitionEvent {
    /// A single finalized piece of text
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            result_index: 0,
            results: vec![RecognitionResult {
                transcript: text.into(),
                is_final: true,
            }],
        }
    }

    /// A single interim hypothesis
    pub fn interim_text(text: impl Into<String>) -> Self {
        Self {
            result_index: 0,
            results: vec![RecognitionResult {
                transcript: text.into(),
                is_final: false,
            }],
        }
    }
}

/// Transcript as seen so far in one recording
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBuffer {
    text: String,
}

impl TranscriptBuffer {
    /// Replace the visible transcript with the event's final text, or with
    /// its interim text when nothing in the event is final yet
    pub fn apply(&mut self, event: &RecognitionEvent) {
        let mut final_text = String::new();
        let mut interim_text = String::new();

        for result in event.results.iter().skip(event.result_index) {
            if result.is_final {
                final_text.push_str(&result.transcript);
            } else {
                interim_text.push_str(&result.transcript);
            }
        }

        self.text = if final_text.is_empty() {
            interim_text
        } else {
            final_text
        };
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Capture that replays a fixed transcript, for headless use
#[derive(Debug, Clone)]
pub struct ScriptedCapture {
    transcript: String,
    active: bool,
    available: bool,
}

impl ScriptedCapture {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            active: false,
            available: true,
        }
    }

    /// A capture whose `start` always fails
    pub fn unavailable() -> Self {
        Self {
            transcript: String::new(),
            active: false,
            available: false,
        }
    }

    /// The event this capture delivers once started
    pub fn event(&self) -> RecognitionEvent {
        RecognitionEvent::final_text(self.transcript.clone())
    }
}

impl SpeechCapture for ScriptedCapture {
    fn start(&mut self) -> Result<(), CaptureError> {
        if !self.available {
            return Err(CaptureError::Unavailable);
        }
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
