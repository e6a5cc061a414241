//! Standardized-patient adapter.
//!
//! Bridges a case definition and the chat capability: the case's templated
//! system prompt plus the running transcript become one chat call that
//! produces the patient's next reply. The evaluator uses the same chat
//! collaborator with different prompts; the two never share state.

use crate::case::build_patient_system_prompt;
use crate::llm::{ChatMessage, ChatModel, LlmError};
use crate::models::{CaseDefinition, TurnRole};
use crate::session::Transcript;

pub struct PatientSimulator<'a, G: ChatModel> {
    chat: &'a G,
    case: &'a CaseDefinition,
}

impl<'a, G: ChatModel> PatientSimulator<'a, G> {
    pub fn new(chat: &'a G, case: &'a CaseDefinition) -> Self {
        Self { chat, case }
    }

    /// Produce the patient's reply to the latest student turn.
    ///
    /// The transcript maps onto chat roles directly: student turns are
    /// `user`, previous patient turns are `assistant`. System turns are
    /// engine bookkeeping and stay out of the prompt.
    pub fn reply(&self, transcript: &Transcript) -> Result<String, LlmError> {
        let mut messages = vec![ChatMessage::system(build_patient_system_prompt(self.case))];
        for turn in transcript.turns() {
            match turn.role {
                TurnRole::User => messages.push(ChatMessage::user(&turn.content)),
                TurnRole::Patient => messages.push(ChatMessage::assistant(&turn.content)),
                TurnRole::System => {}
            }
        }

        let reply = self.chat.chat(&messages)?;
        Ok(reply.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockChatModel;
    use crate::models::PatientProfile;

    fn test_case() -> CaseDefinition {
        CaseDefinition {
            case_id: "chest-pain-01".into(),
            patient: PatientProfile {
                name: "陳志明".into(),
                age: 58,
                gender: "男性".into(),
                occupation: None,
                chief_complaint: Some("胸口悶痛".into()),
                personality: None,
            },
            story_data: serde_yaml::Value::Null,
            vital_signs: serde_yaml::Value::Null,
            system_prompt_template: "你是 {name}，主訴{chief_complaint}。".into(),
            checklist: vec![],
            critical_actions: vec![],
        }
    }

    #[test]
    fn reply_trims_model_output() {
        let chat = MockChatModel::always("  就是胸口這邊悶悶的。\n");
        let case = test_case();
        let simulator = PatientSimulator::new(&chat, &case);

        let mut transcript = Transcript::new();
        transcript.append(TurnRole::User, "哪裡不舒服？");

        let reply = simulator.reply(&transcript).unwrap();
        assert_eq!(reply, "就是胸口這邊悶悶的。");
        assert_eq!(chat.calls(), 1);
    }

    #[test]
    fn provider_failure_propagates() {
        let chat = MockChatModel::failing();
        let case = test_case();
        let simulator = PatientSimulator::new(&chat, &case);

        let result = simulator.reply(&Transcript::new());
        assert!(result.is_err());
    }
}
