//! Ingredient substitution tool
//!
//! Lookup plus the pure view transforms applied to the stored candidates:
//! minimum-score filter, sort, and qualitative score buckets.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use super::controller::{QueryController, QueryState};
use super::error::ToolError;
use crate::api::ApiClient;
use crate::models::SubstitutionCandidate;

pub type SubstitutionFinder = QueryController<Vec<SubstitutionCandidate>>;

/// Ingredients offered as starting points
pub const POPULAR_INGREDIENTS: &[&str] = &[
    "milk", "butter", "cheese", "eggs", "flour", "sugar", "dairy", "chicken", "beef", "rice",
    "pasta", "broccoli", "tomato", "onion", "garlic",
];

pub fn new_finder(history_cap: usize) -> SubstitutionFinder {
    QueryController::new(history_cap, "Please enter an ingredient name")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Score,
    Name,
}

impl SortBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "score" => Some(SortBy::Score),
            "name" => Some(SortBy::Name),
            _ => None,
        }
    }
}

/// Qualitative label for a match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchQuality {
    Excellent,
    Good,
    Fair,
    Possible,
}

impl MatchQuality {
    pub fn label(&self) -> &'static str {
        match self {
            MatchQuality::Excellent => "Excellent",
            MatchQuality::Good => "Good",
            MatchQuality::Fair => "Fair",
            MatchQuality::Possible => "Possible",
        }
    }
}

/// Lower bounds of each bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBuckets {
    pub excellent: u8,
    pub good: u8,
    pub fair: u8,
}

impl Default for ScoreBuckets {
    fn default() -> Self {
        Self {
            excellent: 80,
            good: 60,
            fair: 40,
        }
    }
}

impl ScoreBuckets {
    pub fn classify(&self, score: u8) -> MatchQuality {
        if score >= self.excellent {
            MatchQuality::Excellent
        } else if score >= self.good {
            MatchQuality::Good
        } else if score >= self.fair {
            MatchQuality::Fair
        } else {
            MatchQuality::Possible
        }
    }
}

/// How candidates are presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstituteView {
    pub sort_by: SortBy,
    pub min_score: u8,
    pub buckets: ScoreBuckets,
}

/// Drop candidates scoring below `min_score`, keeping adapter order
pub fn filter_by_min_score(
    candidates: &[SubstitutionCandidate],
    min_score: u8,
) -> Vec<SubstitutionCandidate> {
    candidates
        .iter()
        .filter(|c| c.score >= min_score)
        .cloned()
        .collect()
}

/// Stable sort: equal keys keep their adapter order
pub fn sort_candidates(candidates: &mut [SubstitutionCandidate], sort_by: SortBy) {
    match sort_by {
        SortBy::Score => candidates.sort_by(|a, b| b.score.cmp(&a.score)),
        SortBy::Name => candidates.sort_by_cached_key(|c| c.name.to_lowercase()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSubstitute {
    pub ingredient: String,
    pub score: u8,
    pub quality: MatchQuality,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstituteResults {
    pub query: String,
    pub count: usize,
    pub hidden_below_min_score: usize,
    pub substitutes: Vec<RankedSubstitute>,
}

/// Filter, sort and label a candidate list
pub fn present(query: &str, candidates: &[SubstitutionCandidate], view: &SubstituteView) -> SubstituteResults {
    let mut kept = filter_by_min_score(candidates, view.min_score);
    sort_candidates(&mut kept, view.sort_by);

    let substitutes: Vec<RankedSubstitute> = kept
        .into_iter()
        .map(|c| {
            let quality = view.buckets.classify(c.score);
            RankedSubstitute {
                label: format!("{} Match", quality.label()),
                ingredient: c.name,
                score: c.score,
                quality,
            }
        })
        .collect();

    SubstituteResults {
        query: query.to_string(),
        count: substitutes.len(),
        hidden_below_min_score: candidates.len() - substitutes.len(),
        substitutes,
    }
}

/// Look up substitutes for an ingredient and make them the displayed result
pub async fn find_substitutes(
    api: &dyn ApiClient,
    finder: &Mutex<SubstitutionFinder>,
    ingredient: &str,
    view: &SubstituteView,
) -> Result<SubstituteResults, ToolError> {
    let pending = finder.lock().await.begin(ingredient)?;
    let outcome = api.lookup_substitutes(pending.query()).await;

    let query = pending.query().to_string();
    let mut finder = finder.lock().await;
    match outcome {
        Ok(candidates) => {
            let results = present(&query, &candidates, view);
            info!(ingredient = %query, found = candidates.len(), "Substitutes found");
            finder.resolve(pending, Ok(candidates));
            Ok(results)
        }
        Err(e) => {
            finder.resolve(pending, Err(e.user_message()));
            Err(e.into())
        }
    }
}

/// Re-present the stored result with a different view
pub fn show_substitutes(
    finder: &SubstitutionFinder,
    view: &SubstituteView,
) -> Result<SubstituteResults, ToolError> {
    match finder.state() {
        QueryState::Success { query, data } => Ok(present(query, data, view)),
        QueryState::Failure { message, .. } => Err(ToolError::NoResult(message.clone())),
        QueryState::Loading { query } => Err(ToolError::NoResult(format!(
            "Still looking up substitutes for \"{}\"",
            query
        ))),
        QueryState::Idle => Err(ToolError::NoResult(
            "No substitutes looked up yet".to_string(),
        )),
    }
}
