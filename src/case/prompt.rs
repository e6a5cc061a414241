//! Patient-role system prompt assembly.
//!
//! The case file carries a template with `{placeholder}` slots; persona
//! fields and scenario data are substituted as plain text. The engine adds
//! a fixed role-guard suffix so a case author cannot accidentally produce a
//! patient that breaks character or volunteers unprompted diagnoses.

use crate::models::CaseDefinition;

const ROLE_GUARD: &str = r#"
扮演規則：
1. 你是病人，不是醫師。永遠以病人的身分與口吻回答。
2. 只回答學生實際問到的內容；不要主動說出尚未被問到的病史。
3. 不要提供診斷、檢查建議或醫療知識。
4. 回答保持口語、簡短，符合你的個性設定。
5. 若被問到設定中沒有的細節，以「不太確定」或合理的日常說法帶過。"#;

/// Render the case's system prompt for the standardized-patient LLM.
pub fn build_patient_system_prompt(case: &CaseDefinition) -> String {
    let patient = &case.patient;
    let mut prompt = case
        .system_prompt_template
        .replace("{name}", &patient.name)
        .replace("{age}", &patient.age.to_string())
        .replace("{gender}", &patient.gender)
        .replace("{occupation}", patient.occupation.as_deref().unwrap_or(""))
        .replace(
            "{chief_complaint}",
            patient.chief_complaint.as_deref().unwrap_or(""),
        )
        .replace("{personality}", patient.personality.as_deref().unwrap_or(""));

    if prompt.contains("{story_data}") {
        prompt = prompt.replace("{story_data}", &yaml_block(&case.story_data));
    }
    if prompt.contains("{vital_signs}") {
        prompt = prompt.replace("{vital_signs}", &yaml_block(&case.vital_signs));
    }

    prompt.push_str(ROLE_GUARD);
    prompt
}

fn yaml_block(value: &serde_yaml::Value) -> String {
    if value.is_null() {
        return String::new();
    }
    serde_yaml::to_string(value)
        .unwrap_or_default()
        .trim_end()
        .to_string()
}
