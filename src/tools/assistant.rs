//! Dietary assistant tool
//!
//! Free-text dietary queries go to the remote NLP parser. Whatever it
//! detects is shown as returned; the only local derivation is the badge list.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use super::controller::QueryController;
use super::error::ToolError;
use crate::api::ApiClient;
use crate::models::{AllergyReport, DietaryAnalysis, ParsedDietaryInfo, TasteRecommendations};

pub type SmartAssistant = QueryController<DietaryAnalysis>;

/// Sample prompts offered by the assistant
pub const EXAMPLE_QUERIES: &[&str] = &[
    "I'm allergic to nuts and dairy, but I like sweet creamy things",
    "I need gluten-free options that are savory and flavorful",
    "I want vegan spicy food recommendations",
    "No eggs or soy, looking for something sweet and fresh",
    "I prefer low-sodium vegetarian meals with herbs",
];

pub const NO_RESTRICTIONS: &str = "No specific dietary restrictions detected";

pub fn new_assistant(history_cap: usize) -> SmartAssistant {
    QueryController::new(history_cap, "Please describe your dietary needs")
}

/// Rendered view of a parser response
#[derive(Debug, Clone, Serialize)]
pub struct DietaryView {
    pub query: String,
    pub allergies: Vec<String>,
    pub tastes: Vec<String>,
    pub badges: Vec<&'static str>,
    pub restrictions: String,
    pub suggestions: Vec<String>,
    pub allergy_count: usize,
    pub taste_count: usize,
}

impl DietaryView {
    pub fn new(query: &str, analysis: &DietaryAnalysis) -> Self {
        let info: &ParsedDietaryInfo = &analysis.parsed_info;
        let badges: Vec<&'static str> = info
            .dietary_preferences
            .badges()
            .iter()
            .map(|b| b.label())
            .collect();
        let restrictions = if badges.is_empty() {
            NO_RESTRICTIONS.to_string()
        } else {
            badges.join(", ")
        };

        Self {
            query: analysis.query.clone().unwrap_or_else(|| query.to_string()),
            allergies: info.allergies.clone(),
            tastes: info.tastes.clone(),
            badges,
            restrictions,
            suggestions: analysis.suggestions.clone(),
            allergy_count: analysis.allergy_count,
            taste_count: analysis.taste_count,
        }
    }
}

/// Send a free-text query to the dietary parser
pub async fn analyze_dietary_query(
    api: &dyn ApiClient,
    assistant: &Mutex<SmartAssistant>,
    query: &str,
) -> Result<DietaryView, ToolError> {
    let pending = assistant.lock().await.begin(query)?;
    let outcome = api.parse_dietary_query(pending.query()).await;

    let mut assistant = assistant.lock().await;
    match outcome {
        Ok(analysis) => {
            let view = DietaryView::new(pending.query(), &analysis);
            info!(
                allergies = view.allergies.len(),
                tastes = view.tastes.len(),
                suggestions = view.suggestions.len(),
                "Dietary query analyzed"
            );
            assistant.resolve(pending, Ok(analysis));
            Ok(view)
        }
        Err(e) => {
            assistant.resolve(pending, Err(e.user_message()));
            Err(e.into())
        }
    }
}

/// Parse a query without asking for suggestions
pub async fn parse_dietary_info(
    api: &dyn ApiClient,
    query: &str,
) -> Result<ParsedDietaryInfo, ToolError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ToolError::validation("Please describe your dietary needs"));
    }
    Ok(api.parse_dietary_info(query).await?)
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check ingredients against a list of allergies
pub async fn check_allergies(
    api: &dyn ApiClient,
    ingredients: &[String],
    allergies: &[String],
) -> Result<AllergyReport, ToolError> {
    let ingredients = clean_list(ingredients);
    let allergies = clean_list(allergies);
    if ingredients.is_empty() {
        return Err(ToolError::validation("Please list at least one ingredient"));
    }
    if allergies.is_empty() {
        return Err(ToolError::validation("Please list at least one allergy"));
    }

    let report = api.check_allergies(&ingredients, &allergies).await?;
    info!(
        safe = report.safe_ingredients.len(),
        flagged = report.allergen_containing.len(),
        "Allergy check complete"
    );
    Ok(report)
}

/// Ingredient ideas for a set of taste preferences
pub async fn taste_recommendations(
    api: &dyn ApiClient,
    tastes: &[String],
    exclude_allergies: &[String],
) -> Result<TasteRecommendations, ToolError> {
    let tastes = clean_list(tastes);
    if tastes.is_empty() {
        return Err(ToolError::validation("Please list at least one taste preference"));
    }
    let exclude = clean_list(exclude_allergies);

    Ok(api.taste_recommendations(&tastes, &exclude).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ops, MockApiClient};
    use crate::models::DietaryPreferences;

    fn nuts_and_dairy() -> DietaryAnalysis {
        DietaryAnalysis {
            query: Some(EXAMPLE_QUERIES[0].to_string()),
            parsed_info: ParsedDietaryInfo {
                allergies: vec!["nuts".into(), "dairy".into()],
                tastes: vec!["sweet".into(), "creamy".into()],
                dietary_preferences: DietaryPreferences {
                    dairy_free: true,
                    nut_free: true,
                    ..Default::default()
                },
            },
            suggestions: vec!["coconut cream".into()],
            allergy_count: 2,
            taste_count: 2,
        }
    }

    #[tokio::test]
    async fn test_renders_parser_output_unchanged() {
        let api = MockApiClient::new().with_dietary(Ok(nuts_and_dairy()));
        let assistant = Mutex::new(new_assistant(5));

        let view = analyze_dietary_query(&api, &assistant, EXAMPLE_QUERIES[0]).await.unwrap();

        assert_eq!(view.allergies, vec!["nuts", "dairy"]);
        assert_eq!(view.tastes, vec!["sweet", "creamy"]);
        assert_eq!(view.badges, vec!["Dairy-Free", "Nut-Free"]);
        assert_eq!(view.restrictions, "Dairy-Free, Nut-Free");
        assert_eq!(view.suggestions, vec!["coconut cream"]);
        assert_eq!(assistant.lock().await.current(), Some(&nuts_and_dairy()));
    }

    #[tokio::test]
    async fn test_no_restrictions_summary() {
        let mut analysis = nuts_and_dairy();
        analysis.parsed_info.dietary_preferences = DietaryPreferences::default();
        analysis.query = None;
        let api = MockApiClient::new().with_dietary(Ok(analysis));
        let assistant = Mutex::new(new_assistant(5));

        let view = analyze_dietary_query(&api, &assistant, "anything").await.unwrap();
        assert!(view.badges.is_empty());
        assert_eq!(view.restrictions, NO_RESTRICTIONS);
        assert_eq!(view.query, "anything");
    }

    #[tokio::test]
    async fn test_allergy_check_validates_lists() {
        let api = MockApiClient::new().with_allergy_report(Ok(AllergyReport::default()));

        let err = check_allergies(&api, &[" ".into()], &["nuts".into()]).await.unwrap_err();
        assert_eq!(err.to_string(), "Please list at least one ingredient");
        assert_eq!(api.total_calls(), 0);

        check_allergies(&api, &["milk".into(), " rice ".into()], &["dairy".into()])
            .await
            .unwrap();
        assert_eq!(api.call_args(ops::ALLERGIES), vec!["milk,rice|dairy"]);
    }

    #[tokio::test]
    async fn test_taste_recommendations_allows_no_exclusions() {
        let api = MockApiClient::new().with_taste_recommendations(Ok(TasteRecommendations {
            taste_preferences: vec!["sweet".into()],
            all_suggestions: vec!["honey".into()],
            total_suggestions: 1,
            ..Default::default()
        }));

        let recs = taste_recommendations(&api, &["sweet".into()], &[]).await.unwrap();
        assert_eq!(recs.all_suggestions, vec!["honey"]);
        assert_eq!(api.call_args(ops::TASTES), vec!["sweet|"]);

        assert!(taste_recommendations(&api, &[], &[]).await.is_err());
        assert_eq!(api.call_count(ops::TASTES), 1);
    }

    #[tokio::test]
    async fn test_parse_only() {
        let api = MockApiClient::new().with_dietary_info(Ok(nuts_and_dairy().parsed_info));
        let info = parse_dietary_info(&api, "no nuts please").await.unwrap();
        assert_eq!(info.allergies, vec!["nuts", "dairy"]);
        assert!(parse_dietary_info(&api, "   ").await.is_err());
        assert_eq!(api.call_count(ops::DIETARY_INFO), 1);
    }
}
