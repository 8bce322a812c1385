//! Free-text problem search with structured filters.

use super::catalog::ProblemCatalog;
use super::{Difficulty, LeetCodeProblem};

/// Maximum number of search hits returned.
pub const SEARCH_LIMIT: usize = 50;

/// Optional narrowing applied after the text match. Empty lists mean "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemFilters {
    pub difficulty: Vec<Difficulty>,
    pub topics: Vec<String>,
    pub companies: Vec<String>,
    pub is_paid: Option<bool>,
    pub min_acceptance_rate: Option<f64>,
    pub max_acceptance_rate: Option<f64>,
}

impl ProblemFilters {
    pub fn matches(&self, problem: &LeetCodeProblem) -> bool {
        if !self.difficulty.is_empty() && !self.difficulty.contains(&problem.difficulty) {
            return false;
        }
        if !self.topics.is_empty() && !self.topics.iter().any(|t| problem.has_topic(t)) {
            return false;
        }
        if !self.companies.is_empty() && !self.companies.iter().any(|c| problem.has_company(c)) {
            return false;
        }
        if self.is_paid.is_some_and(|paid| paid != problem.is_paid) {
            return false;
        }
        if self.min_acceptance_rate.is_some_and(|min| problem.ac_rate < min) {
            return false;
        }
        if self.max_acceptance_rate.is_some_and(|max| problem.ac_rate > max) {
            return false;
        }
        true
    }
}

fn text_matches(problem: &LeetCodeProblem, needle: &str) -> bool {
    problem.title.to_lowercase().contains(needle)
        || problem.topics.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Case-insensitive match on title or topic, then filters, capped at
/// [`SEARCH_LIMIT`] in catalog order.
pub fn search_problems(
    catalog: &ProblemCatalog,
    query: &str,
    filters: &ProblemFilters,
) -> Vec<LeetCodeProblem> {
    let needle = query.trim().to_lowercase();
    catalog
        .all()
        .iter()
        .filter(|p| text_matches(p, &needle))
        .filter(|p| filters.matches(p))
        .take(SEARCH_LIMIT)
        .cloned()
        .collect()
}
