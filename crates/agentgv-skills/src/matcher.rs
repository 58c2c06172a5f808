//! Keyword matcher and best-match selection

use agentgv_types::{AgentGvError, MatchCandidate, MatchResult, Result, SkillCatalog};
use tracing::debug;

/// Score every catalog skill against a task description
///
/// A skill's score is the number of its keywords found as substrings of the
/// lowercased description. Containment is partial, so `"ai"` also hits
/// `"main"`. Zero-score skills are dropped and the rest are ordered by
/// descending score; the sort is stable, so ties keep catalog order.
pub fn match_skills(description: &str, catalog: &SkillCatalog) -> Vec<MatchCandidate> {
    let task = description.to_lowercase();

    let mut candidates: Vec<MatchCandidate> = catalog
        .iter_skills()
        .filter_map(|(category, skill)| {
            let matched_keywords: Vec<String> = skill
                .keywords
                .iter()
                .filter(|keyword| keyword_hits(&task, keyword))
                .cloned()
                .collect();

            if matched_keywords.is_empty() {
                return None;
            }

            Some(MatchCandidate {
                skill: skill.clone(),
                category: category.to_string(),
                score: matched_keywords.len(),
                matched_keywords,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

// Blank keywords would match every description.
fn keyword_hits(task_lower: &str, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    !keyword.trim().is_empty() && task_lower.contains(&keyword)
}

/// Pick the top candidate, or the general-purpose fallback when there is none
pub fn select_best(candidates: Vec<MatchCandidate>) -> MatchResult {
    match candidates.into_iter().next() {
        Some(best) => MatchResult::matched(best),
        None => MatchResult::fallback(),
    }
}

/// Route a task description to a skill
///
/// Empty or whitespace-only descriptions are rejected with
/// [`AgentGvError::InvalidInput`].
pub fn route(description: &str, catalog: &SkillCatalog) -> Result<MatchResult> {
    if description.trim().is_empty() {
        return Err(AgentGvError::InvalidInput(
            "Task description must be a non-empty string".to_string(),
        ));
    }

    let candidates = match_skills(description, catalog);
    debug!("{} candidate skills for task", candidates.len());

    let result = select_best(candidates);
    debug!(
        "Routed to '{}' ({}) with {} confidence",
        result.skill().id,
        result.category(),
        result.confidence()
    );
    Ok(result)
}
