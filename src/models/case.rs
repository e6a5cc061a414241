use serde::{Deserialize, Serialize};

/// A fully loaded clinical case. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDefinition {
    pub case_id: String,
    pub patient: PatientProfile,
    /// Free-form scenario data templated into the patient prompt.
    /// The engine never interprets individual fields.
    #[serde(default)]
    pub story_data: serde_yaml::Value,
    #[serde(default)]
    pub vital_signs: serde_yaml::Value,
    pub system_prompt_template: String,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub critical_actions: Vec<CriticalAction>,
}

/// Persona of the standardized patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub name: String,
    pub age: u32,
    pub gender: String,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
}

/// One interview item the student is expected to address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    /// Human-readable statement of the item.
    pub point: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// A case-level must-do, checked by keyword presence over the whole transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalAction {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CaseDefinition {
    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.checklist
    }

    pub fn critical_actions(&self) -> &[CriticalAction] {
        &self.critical_actions
    }
}
