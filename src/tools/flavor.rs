//! Flavor profile tool

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use super::controller::QueryController;
use super::error::ToolError;
use crate::api::ApiClient;
use crate::models::{FlavorField, FlavorProfile};

pub type FlavorAnalyzer = QueryController<FlavorProfile>;

/// Example ingredients for the flavor tool
pub const EXAMPLE_INGREDIENTS: &[&str] = &[
    "vanilla", "chocolate", "garlic", "lemon", "cinnamon", "coffee", "basil", "ginger", "honey",
    "mint",
];

pub fn new_analyzer(history_cap: usize) -> FlavorAnalyzer {
    QueryController::new(history_cap, "Please enter an ingredient name")
}

#[derive(Debug, Clone, Serialize)]
pub struct TasteScore {
    pub taste: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlavorReport {
    pub ingredient: String,
    pub dominant_tastes: Vec<TasteScore>,
    pub fields: Vec<FlavorField>,
    pub profile: FlavorProfile,
}

impl FlavorReport {
    pub fn new(ingredient: &str, profile: FlavorProfile) -> Self {
        let dominant_tastes = profile
            .dominant_tastes()
            .into_iter()
            .map(|(taste, score)| TasteScore { taste, score })
            .collect();
        Self {
            ingredient: ingredient.to_string(),
            dominant_tastes,
            fields: profile.fields(),
            profile,
        }
    }
}

/// Look up and render the flavor profile of an ingredient
pub async fn analyze_flavor(
    api: &dyn ApiClient,
    analyzer: &Mutex<FlavorAnalyzer>,
    ingredient: &str,
) -> Result<FlavorReport, ToolError> {
    let pending = analyzer.lock().await.begin(ingredient)?;
    let outcome = api.lookup_flavor_profile(pending.query()).await;

    let mut analyzer = analyzer.lock().await;
    match outcome {
        Ok(profile) => {
            let report = FlavorReport::new(pending.query(), profile.clone());
            info!(ingredient = %pending.query(), fields = report.fields.len(), "Flavor profile loaded");
            analyzer.resolve(pending, Ok(profile));
            Ok(report)
        }
        Err(e) => {
            analyzer.resolve(pending, Err(e.user_message()));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ops, MockApiClient};
    use crate::tools::controller::QueryState;

    fn garlic() -> FlavorProfile {
        serde_json::from_value(serde_json::json!({
            "description": "Pungent",
            "flavor_profile": {"umami": 6, "spicy": 8, "sweet": 2},
            "pairings": ["butter", "basil"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_report_orders_tastes() {
        let api = MockApiClient::new().with_flavor(Ok(garlic()));
        let analyzer = Mutex::new(new_analyzer(5));

        let report = analyze_flavor(&api, &analyzer, " Garlic ").await.unwrap();

        assert_eq!(report.ingredient, "Garlic");
        assert_eq!(report.dominant_tastes[0].taste, "spicy");
        assert_eq!(report.dominant_tastes[2].taste, "sweet");
        assert!(report.fields.iter().any(|f| f.label == "description" && f.text == "Pungent"));
        assert_eq!(analyzer.lock().await.history().entries(), &["garlic"]);
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let api = MockApiClient::new();
        let analyzer = Mutex::new(new_analyzer(5));

        let err = analyze_flavor(&api, &analyzer, "unobtainium").await.unwrap_err();
        assert_eq!(err.to_string(), "No flavor data found for \"unobtainium\"");
        assert!(matches!(analyzer.lock().await.state(), QueryState::Failure { .. }));
        assert_eq!(api.call_count(ops::FLAVOR), 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let api = MockApiClient::new();
        let analyzer = Mutex::new(new_analyzer(5));
        assert!(analyze_flavor(&api, &analyzer, "").await.is_err());
        assert_eq!(api.total_calls(), 0);
    }
}
