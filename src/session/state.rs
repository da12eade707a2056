use tracing::{info, warn};

use super::guard::{InFlight, RequestGuard};
use super::transcript::Transcript;
use crate::agents::{AgentCategory, AgentResponse};
use crate::input::{compose, Attachment, Submission};
use crate::runtime::ExchangeEvent;
use crate::utils::MedicoreError;

/// Where the current exchange is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Request sent, category not known yet
    Routing,
    /// Category known, answer not shown yet
    Handoff(AgentCategory),
}

/// A submission that won the request slot
#[derive(Debug)]
pub struct PendingExchange {
    pub submission: Submission,
    pub permit: InFlight,
}

/// Transient session state. Single writer: the UI loop (or the one-shot runner).
#[derive(Debug, Default)]
pub struct Session {
    /// Text being typed
    pub input: String,
    attachment: Option<Attachment>,
    transcript: Transcript,
    guard: RequestGuard,
    highlighted: AgentCategory,
    last_response: Option<AgentResponse>,
    phase: Phase,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Attach an image, replacing any pending one
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    /// Remove the pending image, returning it
    pub fn detach(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    /// Specialist shown as active in the sidebar
    pub fn highlighted(&self) -> AgentCategory {
        self.highlighted
    }

    pub fn last_response(&self) -> Option<&AgentResponse> {
        self.last_response.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_processing(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Whether pressing send would do anything right now
    pub fn can_submit(&self) -> bool {
        !self.is_processing()
            && !self.guard.is_busy()
            && (!self.input.trim().is_empty() || self.attachment.is_some())
    }

    /// Start an exchange from the current input.
    ///
    /// Returns `None` (and changes nothing) when there is nothing to send or
    /// an exchange is already in flight. Otherwise appends the user turn,
    /// clears the input and pending image, and hands back the submission
    /// together with the request slot.
    pub fn begin_submit(&mut self) -> Option<PendingExchange> {
        if self.is_processing() {
            return None;
        }
        let submission = compose(&self.input, self.attachment.as_ref())?;
        let permit = self.guard.try_begin()?;

        info!(
            "Submitting {} chars{}",
            submission.text.chars().count(),
            if submission.image.is_some() { " with image" } else { "" }
        );

        self.transcript.append_user(submission.display_text());
        self.input.clear();
        self.attachment = None;
        self.highlighted = AgentCategory::Coordinator;
        self.last_response = None;
        self.phase = Phase::Routing;

        Some(PendingExchange { submission, permit })
    }

    /// Fold one progress event from the exchange runner into the session
    pub fn apply(&mut self, event: ExchangeEvent) {
        match event {
            ExchangeEvent::Routed(category) => {
                if self.is_processing() {
                    self.highlighted = category;
                    self.phase = Phase::Handoff(category);
                }
            }
            ExchangeEvent::Completed(response) => self.complete(response),
            ExchangeEvent::Failed(error) => self.fail(error),
        }
    }

    fn complete(&mut self, response: AgentResponse) {
        info!("{} agent answered", response.category);
        self.highlighted = response.category;
        self.last_response = Some(response.clone());
        self.transcript.append_assistant(response);
        self.phase = Phase::Idle;
    }

    fn fail(&mut self, error: MedicoreError) {
        debug_assert!(error.is_recoverable(), "exchange failed with {:?}", error);
        warn!("Exchange failed: {}", error);
        self.transcript.append_error(&error);
        self.highlighted = AgentCategory::Coordinator;
        self.last_response = None;
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::reply;

    fn finish(session: &mut Session, pending: PendingExchange, response: AgentResponse) {
        drop(pending.permit);
        session.apply(ExchangeEvent::Routed(response.category));
        session.apply(ExchangeEvent::Completed(response));
    }

    #[test]
    fn test_empty_input_is_a_noop() {
        let mut session = Session::new();
        session.input = "   \n".to_string();

        assert!(!session.can_submit());
        assert!(session.begin_submit().is_none());
        assert_eq!(session.transcript().len(), 0);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.input, "   \n");
    }

    #[test]
    fn test_image_alone_can_be_sent() {
        let mut session = Session::new();
        session.attach(Attachment::from_bytes("xray.png", "image/png", b"png"));

        let pending = session.begin_submit().unwrap();
        assert!(pending.submission.image.is_some());
        assert!(session.attachment().is_none());
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_submit_while_in_flight_is_a_noop() {
        let mut session = Session::new();
        session.input = "first".to_string();
        let _pending = session.begin_submit().unwrap();

        session.input = "second".to_string();
        assert!(!session.can_submit());
        assert!(session.begin_submit().is_none());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.input, "second");
    }

    #[test]
    fn test_slot_held_elsewhere_blocks_submit() {
        let mut session = Session::new();
        let _held = session.guard.try_begin().unwrap();

        session.input = "hello".to_string();
        assert!(session.begin_submit().is_none());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_transcript_grows_by_two_per_exchange() {
        let mut session = Session::new();
        let categories = [
            AgentCategory::Rme,
            AgentCategory::Admin,
            AgentCategory::Clinical,
            AgentCategory::Education,
            AgentCategory::Coordinator,
        ];

        for (n, category) in categories.into_iter().enumerate() {
            session.input = format!("request {}", n);
            let before = session.transcript().len();

            let pending = session.begin_submit().unwrap();
            assert_eq!(session.highlighted(), AgentCategory::Coordinator);
            finish(&mut session, pending, reply(category, "ok"));

            assert_eq!(session.transcript().len(), before + 2);
            assert_eq!(session.highlighted(), category);
            assert_eq!(session.last_response().unwrap().category, category);
            assert!(!session.is_processing());
        }
    }

    #[test]
    fn test_routed_event_highlights_before_answer() {
        let mut session = Session::new();
        session.input = "bill".to_string();
        let _pending = session.begin_submit().unwrap();

        session.apply(ExchangeEvent::Routed(AgentCategory::Admin));
        assert_eq!(session.phase(), Phase::Handoff(AgentCategory::Admin));
        assert_eq!(session.highlighted(), AgentCategory::Admin);
        assert!(session.last_response().is_none());
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_failure_appends_error_turn_and_resets() {
        let mut session = Session::new();
        session.input = "first".to_string();
        let pending = session.begin_submit().unwrap();
        finish(&mut session, pending, reply(AgentCategory::Clinical, "ok"));

        session.input = "second".to_string();
        let pending = session.begin_submit().unwrap();
        drop(pending.permit);
        session.apply(ExchangeEvent::Failed(MedicoreError::MalformedResponse(
            "missing agentType".to_string(),
        )));

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.iter().nth(1).unwrap().content(), "ok");
        assert!(transcript.last().unwrap().is_error());
        assert_eq!(session.highlighted(), AgentCategory::Coordinator);
        assert!(!session.is_processing());

        // The session is usable again
        session.input = "third".to_string();
        assert!(session.begin_submit().is_some());
    }

    #[test]
    fn test_attach_replaces_and_detach_removes() {
        let mut session = Session::new();
        session.attach(Attachment::from_bytes("a.png", "image/png", b"a"));
        session.attach(Attachment::from_bytes("b.png", "image/png", b"b"));
        assert_eq!(session.attachment().unwrap().file_name(), "b.png");

        let removed = session.detach().unwrap();
        assert_eq!(removed.file_name(), "b.png");
        assert!(session.attachment().is_none());
        assert!(!session.can_submit());
    }
}
