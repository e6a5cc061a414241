//! Incremental checklist coverage.
//!
//! Only the latest user turn is examined, so the per-turn cost stays O(1)
//! in transcript length and the resulting percentage is monotonic across a
//! session: items enter the partial set on one keyword hit, promote to
//! covered on two, and never move backwards.

use crate::models::ChecklistItem;
use crate::rubric::playbook::resolve_keywords;
use crate::text::keyword_match_count;

use super::transcript::CoverageState;

/// Keyword hits needed to mark an item fully covered.
const COVERED_THRESHOLD: usize = 2;

/// Advance the coverage state with the latest user turn.
///
/// Pure function: callers decide where the new state lands. Patient and
/// system turns must not be passed here — coverage is a property of what
/// the student said.
pub fn update_coverage(
    state: &CoverageState,
    latest_user_turn: &str,
    checklist: &[ChecklistItem],
) -> CoverageState {
    let mut next = state.clone();
    let text = latest_user_turn.to_lowercase();

    for item in checklist {
        if next.covered_ids.contains(&item.id) {
            continue;
        }
        let keywords = resolve_keywords(&item.id, &item.keywords, &item.point);
        let matches = keyword_match_count(&text, &keywords);

        if matches >= COVERED_THRESHOLD {
            next.mark_covered(&item.id);
        } else if matches == 1 {
            next.mark_partial(&item.id);
        }
    }

    next.coverage_pct = coverage_percentage(&next, checklist.len());
    next
}

/// Weighted coverage: full items count 1.0, partial-only items 0.5,
/// floored and clamped to [0, 100]. Empty checklists report 0.
pub fn coverage_percentage(state: &CoverageState, checklist_len: usize) -> u8 {
    if checklist_len == 0 {
        return 0;
    }
    let unique_covered = state.covered_ids.len();
    let partial_only = state.partial_ids.difference(&state.covered_ids).count();

    let pct = (unique_covered as f64 + 0.5 * partial_only as f64) / checklist_len as f64 * 100.0;
    (pct.floor() as i64).clamp(0, 100) as u8
}
