use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::TurnRole;

/// One utterance in a session. Created only by [`Transcript::append`];
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    /// Position in append order, starting at 0.
    pub index: usize,
}

/// Which checklist items the student has addressed so far.
///
/// `covered_ids` and `partial_ids` are disjoint: promotion to covered
/// removes the id from the partial set, and covered ids never leave.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageState {
    pub covered_ids: BTreeSet<String>,
    pub partial_ids: BTreeSet<String>,
    pub coverage_pct: u8,
}

impl CoverageState {
    /// Mark an item fully covered, normalizing it out of the partial set.
    pub fn mark_covered(&mut self, id: &str) {
        self.partial_ids.remove(id);
        self.covered_ids.insert(id.to_string());
    }

    /// Mark an item partially covered. No-op if it is already covered.
    pub fn mark_partial(&mut self, id: &str) {
        if !self.covered_ids.contains(id) {
            self.partial_ids.insert(id.to_string());
        }
    }
}

/// Append-only sequence of turns plus the session's coverage state.
/// Owned by exactly one session; snapshots are handed to consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
    coverage: CoverageState,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return it. O(1); indices are monotonic.
    pub fn append(&mut self, role: TurnRole, content: &str) -> &Turn {
        let turn = Turn {
            role,
            content: content.to_string(),
            index: self.turns.len(),
        };
        self.turns.push(turn);
        self.turns.last().expect("turn just pushed")
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn latest_user_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == TurnRole::User)
    }

    /// Contents of every user turn, in order.
    pub fn user_contents(&self) -> Vec<&str> {
        self.turns
            .iter()
            .filter(|t| t.role == TurnRole::User)
            .map(|t| t.content.as_str())
            .collect()
    }

    /// Every turn's content joined for whole-transcript keyword checks.
    pub fn full_text_lower(&self) -> String {
        self.turns
            .iter()
            .map(|t| t.content.to_lowercase())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn coverage(&self) -> &CoverageState {
        &self.coverage
    }

    pub fn set_coverage(&mut self, state: CoverageState) {
        self.coverage = state;
    }

    /// Immutable copy for downstream consumers.
    pub fn snapshot(&self) -> Transcript {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_monotonic_indices() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.append(TurnRole::User, "您好").index, 0);
        assert_eq!(transcript.append(TurnRole::Patient, "醫師好").index, 1);
        assert_eq!(transcript.append(TurnRole::User, "哪裡痛？").index, 2);
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn latest_user_turn_skips_patient_turns() {
        let mut transcript = Transcript::new();
        transcript.append(TurnRole::User, "first");
        transcript.append(TurnRole::Patient, "reply");
        assert_eq!(transcript.latest_user_turn().unwrap().content, "first");

        transcript.append(TurnRole::User, "second");
        assert_eq!(transcript.latest_user_turn().unwrap().content, "second");
    }

    #[test]
    fn user_contents_filters_roles() {
        let mut transcript = Transcript::new();
        transcript.append(TurnRole::System, "setup");
        transcript.append(TurnRole::User, "q1");
        transcript.append(TurnRole::Patient, "a1");
        transcript.append(TurnRole::User, "q2");
        assert_eq!(transcript.user_contents(), vec!["q1", "q2"]);
    }

    #[test]
    fn mark_covered_normalizes_partial() {
        let mut state = CoverageState::default();
        state.mark_partial("site");
        assert!(state.partial_ids.contains("site"));

        state.mark_covered("site");
        assert!(state.covered_ids.contains("site"));
        assert!(!state.partial_ids.contains("site"));
    }

    #[test]
    fn mark_partial_ignores_already_covered() {
        let mut state = CoverageState::default();
        state.mark_covered("site");
        state.mark_partial("site");
        assert!(!state.partial_ids.contains("site"));
    }

    #[test]
    fn snapshot_is_independent() {
        let mut transcript = Transcript::new();
        transcript.append(TurnRole::User, "q1");
        let snapshot = transcript.snapshot();

        transcript.append(TurnRole::Patient, "a1");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(transcript.len(), 2);
    }
}
