use thiserror::Error;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use super::capture::{CaptureError, RecognitionEvent, SpeechCapture, TranscriptBuffer};
use crate::models::{Decision, PendingSuggestion, Roster, SuggestionPayload};
use crate::pipeline::{process_transcript, PipelineConfig};
use crate::stages::Resolution;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a suggestion is awaiting confirmation")]
    SuggestionPending,
    #[error("already recording")]
    AlreadyRecording,
    #[error("not recording")]
    NotRecording,
    #[error("no suggestion is awaiting confirmation")]
    NothingToConfirm,
    #[error("session was cancelled")]
    Cancelled,
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Where a dictation session currently stands
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Recording,
    ConfirmationPending(PendingSuggestion),
    Resolved(String),
    Cancelled,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::ConfirmationPending(_) => "confirmation_pending",
            SessionState::Resolved(_) => "resolved",
            SessionState::Cancelled => "cancelled",
        }
    }
}

/// Result of stopping a recording
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// Nothing but whitespace was heard; the session is idle again
    NothingCaptured,
    /// The transcript was resolved without user input
    Completed(String),
    /// A low-confidence rewrite needs an accept or reject
    AwaitingConfirmation(SuggestionPayload),
}

/// One dictation dialog: owns the capture collaborator and at most one
/// pending suggestion
pub struct DictationSession<C: SpeechCapture> {
    id: Uuid,
    capture: C,
    roster: Roster,
    config: PipelineConfig,
    buffer: TranscriptBuffer,
    state: SessionState,
}

impl<C: SpeechCapture> DictationSession<C> {
    pub fn new(capture: C, roster: Roster, config: PipelineConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            capture,
            roster,
            config,
            buffer: TranscriptBuffer::default(),
            state: SessionState::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// Transcript captured so far in the current recording
    pub fn transcript(&self) -> &str {
        self.buffer.text()
    }

    /// The pending suggestion's prompt contents, if one is outstanding
    pub fn pending(&self) -> Option<SuggestionPayload> {
        match &self.state {
            SessionState::ConfirmationPending(pending) => Some(pending.payload()),
            _ => None,
        }
    }

    /// Text produced by the last completed utterance
    pub fn final_text(&self) -> Option<&str> {
        match &self.state {
            SessionState::Resolved(text) => Some(text),
            _ => None,
        }
    }

    /// Begin a new recording
    pub fn start(&mut self) -> Result<(), SessionError> {
        let _span = info_span!("dictation", session = %self.id).entered();

        match self.state {
            SessionState::Idle | SessionState::Resolved(_) => {}
            SessionState::Recording => return Err(SessionError::AlreadyRecording),
            SessionState::ConfirmationPending(_) => return Err(SessionError::SuggestionPending),
            SessionState::Cancelled => return Err(SessionError::Cancelled),
        }

        self.buffer.clear();
        if let Err(e) = self.capture.start() {
            warn!("Speech capture unavailable: {}", e);
            return Err(e.into());
        }

        info!("Recording started");
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Feed recognizer output; ignored unless recording
    pub fn on_event(&mut self, event: &RecognitionEvent) {
        if self.state == SessionState::Recording {
            self.buffer.apply(event);
        } else {
            debug!("Dropping recognition event in state {}", self.state.name());
        }
    }

    /// Stop recording and run the transcript through the pipeline
    pub fn stop(&mut self) -> Result<StopOutcome, SessionError> {
        let _span = info_span!("dictation", session = %self.id).entered();

        if self.state != SessionState::Recording {
            return Err(match self.state {
                SessionState::Cancelled => SessionError::Cancelled,
                _ => SessionError::NotRecording,
            });
        }
        self.capture.stop();

        if self.buffer.is_blank() {
            info!("Recording stopped with nothing captured");
            self.state = SessionState::Idle;
            return Ok(StopOutcome::NothingCaptured);
        }

        let outcome = match process_transcript(self.buffer.text(), &self.roster, &self.config) {
            Resolution::PassThrough { text } | Resolution::AutoApplied { text, .. } => {
                self.state = SessionState::Resolved(text.clone());
                StopOutcome::Completed(text)
            }
            Resolution::NeedsConfirmation(pending) => {
                let payload = pending.payload();
                self.state = SessionState::ConfirmationPending(pending);
                StopOutcome::AwaitingConfirmation(payload)
            }
        };

        info!("Recording stopped, session {}", self.state.name());
        Ok(outcome)
    }

    /// Close the pending suggestion with the user's answer
    pub fn confirm(&mut self, decision: Decision) -> Result<String, SessionError> {
        let _span = info_span!("dictation", session = %self.id).entered();

        let pending = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::ConfirmationPending(pending) => pending,
            other => {
                let err = match other {
                    SessionState::Cancelled => SessionError::Cancelled,
                    _ => SessionError::NothingToConfirm,
                };
                self.state = other;
                return Err(err);
            }
        };

        let text = pending.resolve(decision);
        info!("Suggestion resolved: {}", decision);
        self.state = SessionState::Resolved(text.clone());
        Ok(text)
    }

    /// Close the session, discarding any pending suggestion
    pub fn cancel(&mut self) {
        let _span = info_span!("dictation", session = %self.id).entered();

        if self.capture.is_active() {
            self.capture.stop();
        }
        if matches!(self.state, SessionState::ConfirmationPending(_)) {
            debug!("Discarding pending suggestion");
        }
        self.buffer.clear();
        self.state = SessionState::Cancelled;
        info!("Session cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamMember;

    /// Capture double counting start/stop calls
    #[derive(Default)]
    struct RecordingCapture {
        active: bool,
        starts: usize,
        stops: usize,
        fail: bool,
    }

    impl SpeechCapture for RecordingCapture {
        fn start(&mut self) -> Result<(), CaptureError> {
            if self.fail {
                return Err(CaptureError::Unavailable);
            }
            self.starts += 1;
            self.active = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.stops += 1;
            self.active = false;
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn session() -> DictationSession<RecordingCapture> {
        DictationSession::new(
            RecordingCapture::default(),
            Roster::new(vec![TeamMember::new("joseph", "Joseph Smith")]),
            PipelineConfig::default(),
        )
    }

    fn dictate(session: &mut DictationSession<RecordingCapture>, text: &str) -> StopOutcome {
        session.start().unwrap();
        session.on_event(&RecognitionEvent::final_text(text));
        session.stop().unwrap()
    }

    #[test]
    fn test_high_confidence_completes() {
        let mut session = session();
        let outcome = dictate(&mut session, "tell joseph to frame the bathroom");
        assert_eq!(
            outcome,
            StopOutcome::Completed("tell @joseph to frame the bathroom".to_string())
        );
        assert_eq!(session.final_text(), Some("tell @joseph to frame the bathroom"));
        assert_eq!(session.capture().stops, 1);
    }

    #[test]
    fn test_confirmation_round() {
        let mut session = session();
        let outcome = dictate(&mut session, "call jasef about the tile");
        let StopOutcome::AwaitingConfirmation(payload) = outcome else {
            panic!("expected confirmation, got {:?}", outcome);
        };
        assert_eq!(payload.updated, "call @joseph about the tile");
        assert_eq!(payload.matched_member_name, "Joseph Smith");

        assert_eq!(session.start(), Err(SessionError::SuggestionPending));

        let text = session.confirm(Decision::Reject).unwrap();
        assert_eq!(text, "call jasef about the tile");
        assert_eq!(session.confirm(Decision::Accept), Err(SessionError::NothingToConfirm));

        // A new recording may begin once the suggestion is closed
        assert!(session.start().is_ok());
    }

    #[test]
    fn test_blank_transcript_returns_to_idle() {
        let mut session = session();
        assert_eq!(dictate(&mut session, "   "), StopOutcome::NothingCaptured);
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_cancel_discards_suggestion_and_stops_capture() {
        let mut session = session();
        dictate(&mut session, "call jasef about the tile");
        session.cancel();
        assert_eq!(session.state(), &SessionState::Cancelled);
        assert!(session.pending().is_none());
        assert!(session.final_text().is_none());
        assert_eq!(session.confirm(Decision::Accept), Err(SessionError::Cancelled));
        assert_eq!(session.start(), Err(SessionError::Cancelled));

        let mut recording = self::session();
        recording.start().unwrap();
        recording.on_event(&RecognitionEvent::interim_text("tell jos"));
        recording.cancel();
        assert!(!recording.capture().is_active());
        assert_eq!(recording.transcript(), "");
    }

    #[test]
    fn test_capture_unavailable() {
        let mut session = DictationSession::new(
            RecordingCapture {
                fail: true,
                ..Default::default()
            },
            Roster::default(),
            PipelineConfig::default(),
        );
        assert_eq!(
            session.start(),
            Err(SessionError::Capture(CaptureError::Unavailable))
        );
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_events_ignored_when_not_recording() {
        let mut session = session();
        session.on_event(&RecognitionEvent::final_text("joseph"));
        assert_eq!(session.transcript(), "");
        assert_eq!(session.stop(), Err(SessionError::NotRecording));
    }
}
