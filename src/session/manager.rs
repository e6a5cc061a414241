use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{CaseDefinition, TurnRole};

use super::coverage::update_coverage;
use super::transcript::{CoverageState, Transcript};
use super::SessionError;

/// Owns one transcript per active session. Sessions share no mutable
/// state; dropping a session discards its transcript.
pub struct SessionManager {
    sessions: HashMap<Uuid, SessionEntry>,
}

struct SessionEntry {
    case_id: String,
    transcript: Transcript,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Start a session against a case. Returns the session id.
    pub fn start(&mut self, case: &CaseDefinition) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            SessionEntry {
                case_id: case.case_id.clone(),
                transcript: Transcript::new(),
            },
        );
        tracing::info!(session = %id, case_id = %case.case_id, "session started");
        id
    }

    /// Append a student turn and advance coverage with it.
    pub fn record_user_turn(
        &mut self,
        session_id: Uuid,
        content: &str,
        case: &CaseDefinition,
    ) -> Result<CoverageState, SessionError> {
        let entry = self.entry_mut(session_id)?;
        entry.transcript.append(TurnRole::User, content);

        let next = update_coverage(entry.transcript.coverage(), content, case.checklist());
        entry.transcript.set_coverage(next.clone());
        Ok(next)
    }

    /// Append a standardized-patient turn. Coverage is untouched: only the
    /// student's words count toward the checklist.
    pub fn record_patient_turn(
        &mut self,
        session_id: Uuid,
        content: &str,
    ) -> Result<usize, SessionError> {
        let entry = self.entry_mut(session_id)?;
        Ok(entry.transcript.append(TurnRole::Patient, content).index)
    }

    pub fn transcript(&self, session_id: Uuid) -> Result<&Transcript, SessionError> {
        self.sessions
            .get(&session_id)
            .map(|e| &e.transcript)
            .ok_or(SessionError::NotFound(session_id))
    }

    pub fn case_id(&self, session_id: Uuid) -> Result<&str, SessionError> {
        self.sessions
            .get(&session_id)
            .map(|e| e.case_id.as_str())
            .ok_or(SessionError::NotFound(session_id))
    }

    /// End a session, handing the final transcript to the caller.
    pub fn end(&mut self, session_id: Uuid) -> Result<Transcript, SessionError> {
        self.sessions
            .remove(&session_id)
            .map(|e| {
                tracing::info!(session = %session_id, turns = e.transcript.len(), "session ended");
                e.transcript
            })
            .ok_or(SessionError::NotFound(session_id))
    }

    fn entry_mut(&mut self, session_id: Uuid) -> Result<&mut SessionEntry, SessionError> {
        self.sessions
            .get_mut(&session_id)
            .ok_or(SessionError::NotFound(session_id))
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
