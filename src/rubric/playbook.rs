//! Static criterion-id → keyword mapping.
//!
//! Case and rubric authors usually leave keyword lists empty for the
//! standard history-taking items; this playbook supplies the implementation
//! keywords for those well-known ids. Entries carry Traditional Chinese and
//! English forms side by side, matching the bilingual clinical material the
//! simulator runs on.

/// Default keywords for a well-known criterion or checklist-item id.
///
/// Returns `None` for ids the playbook does not know; callers then fall
/// back to CJK-run extraction from the human-readable text.
pub fn default_keywords(id: &str) -> Option<&'static [&'static str]> {
    let keywords: &'static [&'static str] = match id {
        "intro" | "introduction" => &[
            "你好", "您好", "醫師", "我是", "請問怎麼稱呼", "確認", "名字",
            "hello", "my name", "introduce",
        ],
        "site" | "location" => &[
            "哪裡", "位置", "部位", "哪邊", "不舒服", "where", "location",
        ],
        "onset" => &[
            "什麼時候", "何時", "開始", "多久", "突然", "漸漸", "when",
            "onset", "start",
        ],
        "quality" | "character" => &[
            "怎麼痛", "悶", "刺", "壓", "絞", "灼熱", "性質", "什麼感覺",
            "quality", "describe",
        ],
        "radiation" => &[
            "延伸", "轉移", "放射", "傳到", "肩膀", "下巴", "手臂",
            "radiate", "spread",
        ],
        "severity" => &[
            "幾分", "分數", "多痛", "程度", "嚴重", "scale", "severity",
        ],
        "timing" | "duration" => &[
            "持續", "多久", "頻率", "一陣", "間歇", "duration", "how long",
        ],
        "aggravating" => &[
            "加重", "更痛", "惡化", "走路", "運動", "用力", "worse",
            "aggravat",
        ],
        "relieving" => &[
            "緩解", "減輕", "休息", "舒服一點", "改善", "relieve", "better",
        ],
        "associated" => &[
            "其他症狀", "喘", "冒汗", "噁心", "嘔吐", "頭暈", "心悸",
            "associated", "symptom",
        ],
        "pmh" | "past_history" => &[
            "病史", "慢性病", "高血壓", "糖尿病", "開過刀", "住院",
            "history", "condition",
        ],
        "medication" | "medications" | "drug_history" => &[
            "藥", "用藥", "服用", "吃什麼藥", "medication", "medicine",
        ],
        "allergy" | "allergies" => &["過敏", "allergy", "allergic"],
        "family" | "family_history" => &[
            "家族", "家人", "父親", "母親", "遺傳", "family",
        ],
        "social" | "social_history" => &[
            "抽菸", "吸菸", "喝酒", "工作", "職業", "smoke", "alcohol",
        ],
        "ecg" => &["心電圖", "12 導程", "12導程", "ecg", "ekg"],
        "vitals" | "vital_signs" => &[
            "生命徵象", "血壓", "心跳", "體溫", "血氧", "vital", "blood pressure",
        ],
        _ => return None,
    };
    Some(keywords)
}

/// Resolve the active keyword list for an id + human-readable text, applying
/// the shared rule of three: explicit list, then playbook, then CJK runs.
pub fn resolve_keywords(id: &str, explicit: &[String], fallback_text: &str) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    if let Some(defaults) = default_keywords(id) {
        return defaults.iter().map(|s| s.to_string()).collect();
    }
    crate::text::cjk_runs(fallback_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_have_keywords() {
        for id in ["intro", "site", "onset", "ecg", "allergy", "severity"] {
            let keywords = default_keywords(id).unwrap();
            assert!(!keywords.is_empty(), "playbook entry for {id} is empty");
        }
    }

    #[test]
    fn unknown_id_returns_none() {
        assert!(default_keywords("frobnicate").is_none());
    }

    #[test]
    fn explicit_keywords_win() {
        let explicit = vec!["痛".to_string()];
        let resolved = resolve_keywords("site", &explicit, "詢問疼痛位置");
        assert_eq!(resolved, vec!["痛".to_string()]);
    }

    #[test]
    fn playbook_used_when_explicit_empty() {
        let resolved = resolve_keywords("site", &[], "詢問疼痛位置");
        assert!(resolved.iter().any(|k| k == "位置"));
    }

    #[test]
    fn cjk_runs_as_last_resort() {
        let resolved = resolve_keywords("custom-item", &[], "詢問旅遊史、接觸史");
        assert_eq!(
            resolved,
            vec!["詢問旅遊史".to_string(), "接觸史".to_string()]
        );
    }

    #[test]
    fn latin_only_text_yields_empty_last_resort() {
        let resolved = resolve_keywords("custom-item", &[], "ask about travel");
        assert!(resolved.is_empty());
    }
}
