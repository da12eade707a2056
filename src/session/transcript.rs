use chrono::{DateTime, Local};
use serde::Serialize;

use crate::agents::AgentResponse;
use crate::utils::MedicoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message in the transcript. Immutable once appended.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    id: u64,
    role: TurnRole,
    content: String,
    response: Option<AgentResponse>,
    error_kind: Option<&'static str>,
    timestamp: DateTime<Local>,
}

impl Turn {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The agent response behind an assistant turn
    pub fn response(&self) -> Option<&AgentResponse> {
        self.response.as_ref()
    }

    /// Inline error turn standing in for a failed exchange
    pub fn is_error(&self) -> bool {
        self.error_kind.is_some()
    }

    /// Short label of the failure behind an error turn
    pub fn error_kind(&self) -> Option<&'static str> {
        self.error_kind
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

/// Append-only, in-memory conversation
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, content: String) -> &Turn {
        self.push(TurnRole::User, content, None, None)
    }

    pub fn append_assistant(&mut self, response: AgentResponse) -> &Turn {
        let content = response.content.clone();
        self.push(TurnRole::Assistant, content, Some(response), None)
    }

    /// Record a failed exchange where the answer would have gone
    pub fn append_error(&mut self, error: &MedicoreError) -> &Turn {
        self.push(TurnRole::Assistant, error.to_string(), None, Some(error.kind()))
    }

    fn push(
        &mut self,
        role: TurnRole,
        content: String,
        response: Option<AgentResponse>,
        error_kind: Option<&'static str>,
    ) -> &Turn {
        // Ids follow position; turns are never removed
        let id = self.turns.len() as u64 + 1;
        self.turns.push(Turn {
            id,
            role,
            content,
            response,
            error_kind,
            timestamp: Local::now(),
        });
        &self.turns[self.turns.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
