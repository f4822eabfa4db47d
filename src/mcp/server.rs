//! FlavoursVerse MCP Server Implementation
//!
//! Implements the MCP server with all FlavoursVerse tools.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::tools::assistant::{self, SmartAssistant};
use crate::tools::calories::{self, CalorieLookup};
use crate::tools::flavor::{self, FlavorAnalyzer};
use crate::tools::recipes::{self, RecipeBuilder};
use crate::tools::status::{StatusTracker, USAGE_INSTRUCTIONS};
use crate::tools::substitutes::{self, ScoreBuckets, SortBy, SubstituteResults, SubstituteView, SubstitutionFinder};
use crate::tools::suggestions::{suggest, MAX_SUGGESTIONS};
use crate::tools::{ToolError, ToolKind};

/// FlavoursVerse MCP Service
#[derive(Clone)]
pub struct FlavoursVerseService {
    api: Arc<dyn ApiClient>,
    substitutes: Arc<Mutex<SubstitutionFinder>>,
    flavor: Arc<Mutex<FlavorAnalyzer>>,
    assistant: Arc<Mutex<SmartAssistant>>,
    calories: Arc<Mutex<CalorieLookup>>,
    recipe: Arc<Mutex<RecipeBuilder>>,
    buckets: ScoreBuckets,
    export_dir: PathBuf,
    status_tracker: Arc<Mutex<StatusTracker>>,
    tool_router: ToolRouter<FlavoursVerseService>,
}

impl FlavoursVerseService {
    pub fn new(config: &Config, api: Arc<dyn ApiClient>) -> Self {
        let caps = &config.history_caps;
        Self {
            api,
            substitutes: Arc::new(Mutex::new(substitutes::new_finder(caps.substitution))),
            flavor: Arc::new(Mutex::new(flavor::new_analyzer(caps.flavor))),
            assistant: Arc::new(Mutex::new(assistant::new_assistant(caps.assistant))),
            calories: Arc::new(Mutex::new(calories::new_lookup(caps.calories))),
            recipe: Arc::new(Mutex::new(RecipeBuilder::new())),
            buckets: ScoreBuckets::default(),
            export_dir: config.export_dir.clone(),
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                config.api_url.clone(),
                config.export_dir.clone(),
            ))),
            tool_router: Self::tool_router(),
        }
    }

    /// Override the substitute score breakpoints
    pub fn with_score_buckets(mut self, buckets: ScoreBuckets) -> Self {
        self.buckets = buckets;
        self
    }

    fn substitute_view(&self, sort_by: Option<&str>, min_score: Option<u8>) -> Result<SubstituteView, ToolError> {
        let sort_by = match sort_by {
            Some(name) => SortBy::parse(name).ok_or_else(|| {
                ToolError::validation(format!("Unknown sort \"{}\"; expected score or name", name))
            })?,
            None => SortBy::default(),
        };
        Ok(SubstituteView {
            sort_by,
            min_score: min_score.unwrap_or(0).min(100),
            buckets: self.buckets,
        })
    }

    async fn history_of(&self, kind: ToolKind) -> Vec<String> {
        match kind {
            ToolKind::Substitutes => self.substitutes.lock().await.history().entries().to_vec(),
            ToolKind::Flavor => self.flavor.lock().await.history().entries().to_vec(),
            ToolKind::Assistant => self.assistant.lock().await.history().entries().to_vec(),
            ToolKind::Calories => self.calories.lock().await.history().entries().to_vec(),
        }
    }

    async fn clear_history_of(&self, kind: ToolKind) {
        match kind {
            ToolKind::Substitutes => self.substitutes.lock().await.clear_history(),
            ToolKind::Flavor => self.flavor.lock().await.clear_history(),
            ToolKind::Assistant => self.assistant.lock().await.clear_history(),
            ToolKind::Calories => self.calories.lock().await.clear_history(),
        }
    }
}

fn parse_tool_kind(name: &str) -> Result<ToolKind, ToolError> {
    ToolKind::parse(name).ok_or_else(|| {
        ToolError::validation(format!(
            "Unknown tool \"{}\"; expected one of: substitutes, flavor, assistant, calories",
            name
        ))
    })
}

/// `{"error": "<message>"}`
fn error_json(err: &ToolError) -> String {
    serde_json::json!({ "error": err.to_string() }).to_string()
}

fn success_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn respond<T: Serialize>(result: Result<T, ToolError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => success_json(&value),
        Err(err) => {
            warn!(error = %err, "Tool call failed");
            Ok(CallToolResult::error(vec![Content::text(error_json(&err))]))
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    tool: &'static str,
    input: String,
    suggestions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    history: BTreeMap<&'static str, Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ClearHistoryResponse {
    success: bool,
    cleared: Vec<&'static str>,
}

// ============================================================================
// Lookup Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FindSubstitutesParams {
    /// Ingredient to replace, e.g. "milk"
    pub ingredient: String,
    /// "score" (default, best match first) or "name"
    pub sort_by: Option<String>,
    /// Hide candidates scoring below this (0-100)
    pub min_score: Option<u8>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ShowSubstitutesParams {
    /// "score" (default) or "name"
    pub sort_by: Option<String>,
    /// Hide candidates scoring below this (0-100)
    pub min_score: Option<u8>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParams {
    /// Ingredient name
    pub ingredient: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DietaryQueryParams {
    /// Free-text description of dietary needs and taste preferences
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CheckAllergiesParams {
    /// Ingredients to check
    pub ingredients: Vec<String>,
    /// Allergies to check against, e.g. ["nuts", "dairy"]
    pub allergies: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TasteRecommendationsParams {
    /// Taste preferences, e.g. ["sweet", "creamy"]
    pub tastes: Vec<String>,
    /// Allergies whose ingredients should be left out
    #[serde(default)]
    pub exclude_allergies: Vec<String>,
}

// ============================================================================
// Session Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SuggestIngredientsParams {
    /// One of: substitutes, flavor, assistant, calories
    pub tool: String,
    /// What has been typed so far (empty lists everything)
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HistoryParams {
    /// One of: substitutes, flavor, assistant, calories (omit for all)
    pub tool: Option<String>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetRecipeAmountParams {
    /// Index of the ingredient as shown by get_recipe
    pub index: usize,
    /// New amount in grams
    pub grams: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveRecipeIngredientParams {
    /// Index of the ingredient as shown by get_recipe
    pub index: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetRecipeServingsParams {
    /// Number of servings the whole recipe makes (greater than 0)
    pub servings: f64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl FlavoursVerseService {
    // --- Status ---

    #[tool(description = "Get the current status of the FlavoursVerse service including build info, API URL, export directory, and process information")]
    async fn status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        success_json(&tracker.get_status())
    }

    #[tool(description = "Get the usage guide for the FlavoursVerse tools. Call this when unsure which tool to use.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Substitutes ---

    #[tool(description = "Find substitutes for an ingredient, each with a 0-100 match score and a quality label")]
    async fn find_substitutes(&self, Parameters(p): Parameters<FindSubstitutesParams>) -> Result<CallToolResult, McpError> {
        info!(ingredient = %p.ingredient, "find_substitutes");
        let view = match self.substitute_view(p.sort_by.as_deref(), p.min_score) {
            Ok(view) => view,
            Err(e) => return respond::<SubstituteResults>(Err(e)),
        };
        respond(substitutes::find_substitutes(self.api.as_ref(), &self.substitutes, &p.ingredient, &view).await)
    }

    #[tool(description = "Re-sort or re-filter the last substitute result without calling the API again")]
    async fn show_substitutes(&self, Parameters(p): Parameters<ShowSubstitutesParams>) -> Result<CallToolResult, McpError> {
        let view = match self.substitute_view(p.sort_by.as_deref(), p.min_score) {
            Ok(view) => view,
            Err(e) => return respond::<SubstituteResults>(Err(e)),
        };
        let finder = self.substitutes.lock().await;
        respond(substitutes::show_substitutes(&finder, &view))
    }

    // --- Flavor ---

    #[tool(description = "Analyze the flavor profile of an ingredient: taste scores, aroma, categories and pairings")]
    async fn analyze_flavor(&self, Parameters(p): Parameters<IngredientParams>) -> Result<CallToolResult, McpError> {
        info!(ingredient = %p.ingredient, "analyze_flavor");
        respond(flavor::analyze_flavor(self.api.as_ref(), &self.flavor, &p.ingredient).await)
    }

    // --- Dietary Assistant ---

    #[tool(description = "Analyze a free-text dietary query: detected allergies, tastes, dietary flags and ingredient suggestions")]
    async fn analyze_dietary_query(&self, Parameters(p): Parameters<DietaryQueryParams>) -> Result<CallToolResult, McpError> {
        info!("analyze_dietary_query");
        respond(assistant::analyze_dietary_query(self.api.as_ref(), &self.assistant, &p.query).await)
    }

    #[tool(description = "Parse a free-text dietary query into allergies, tastes and dietary flags without suggestions")]
    async fn parse_dietary_info(&self, Parameters(p): Parameters<DietaryQueryParams>) -> Result<CallToolResult, McpError> {
        respond(assistant::parse_dietary_info(self.api.as_ref(), &p.query).await)
    }

    #[tool(description = "Check a list of ingredients against a list of allergies")]
    async fn check_allergies(&self, Parameters(p): Parameters<CheckAllergiesParams>) -> Result<CallToolResult, McpError> {
        info!(ingredients = p.ingredients.len(), allergies = p.allergies.len(), "check_allergies");
        respond(assistant::check_allergies(self.api.as_ref(), &p.ingredients, &p.allergies).await)
    }

    #[tool(description = "Suggest ingredients matching taste preferences, optionally excluding allergens")]
    async fn taste_recommendations(&self, Parameters(p): Parameters<TasteRecommendationsParams>) -> Result<CallToolResult, McpError> {
        respond(assistant::taste_recommendations(self.api.as_ref(), &p.tastes, &p.exclude_allergies).await)
    }

    // --- Calories ---

    #[tool(description = "Look up calories, protein, carbs and fat of an ingredient (per 100g). The result can then be added to the recipe with add_to_recipe.")]
    async fn lookup_calories(&self, Parameters(p): Parameters<IngredientParams>) -> Result<CallToolResult, McpError> {
        info!(ingredient = %p.ingredient, "lookup_calories");
        respond(calories::lookup_calories(self.api.as_ref(), &self.calories, &p.ingredient).await)
    }

    // --- Session ---

    #[tool(description = "Suggest popular inputs for a tool (substitutes, flavor, assistant, calories) matching what has been typed")]
    fn suggest_ingredients(&self, Parameters(p): Parameters<SuggestIngredientsParams>) -> Result<CallToolResult, McpError> {
        respond(parse_tool_kind(&p.tool).map(|kind| SuggestionsResponse {
            tool: kind.as_str(),
            suggestions: suggest(kind.popular_inputs(), &p.input, MAX_SUGGESTIONS),
            input: p.input,
        }))
    }

    #[tool(description = "Get recent searches, newest first, for one tool or all of them")]
    async fn search_history(&self, Parameters(p): Parameters<HistoryParams>) -> Result<CallToolResult, McpError> {
        let kinds = match p.tool.as_deref() {
            Some(name) => match parse_tool_kind(name) {
                Ok(kind) => vec![kind],
                Err(e) => return respond::<HistoryResponse>(Err(e)),
            },
            None => ToolKind::ALL.to_vec(),
        };

        let mut history = BTreeMap::new();
        for kind in kinds {
            history.insert(kind.as_str(), self.history_of(kind).await);
        }
        success_json(&HistoryResponse { history })
    }

    #[tool(description = "Clear recent searches for one tool or all of them")]
    async fn clear_search_history(&self, Parameters(p): Parameters<HistoryParams>) -> Result<CallToolResult, McpError> {
        let kinds = match p.tool.as_deref() {
            Some(name) => match parse_tool_kind(name) {
                Ok(kind) => vec![kind],
                Err(e) => return respond::<ClearHistoryResponse>(Err(e)),
            },
            None => ToolKind::ALL.to_vec(),
        };

        let mut cleared = Vec::new();
        for kind in kinds {
            self.clear_history_of(kind).await;
            cleared.push(kind.as_str());
        }
        success_json(&ClearHistoryResponse { success: true, cleared })
    }

    // --- Recipe ---

    #[tool(description = "Add the ingredient from the last lookup_calories result to the recipe at 100g")]
    async fn add_to_recipe(&self) -> Result<CallToolResult, McpError> {
        respond(recipes::add_to_recipe(&self.calories, &self.recipe).await)
    }

    #[tool(description = "Get the recipe: ingredients with their indexes, servings, totals and per-serving values")]
    async fn get_recipe(&self) -> Result<CallToolResult, McpError> {
        let builder = self.recipe.lock().await;
        success_json(&builder.view())
    }

    #[tool(description = "Set the amount in grams of a recipe ingredient by index")]
    async fn set_recipe_amount(&self, Parameters(p): Parameters<SetRecipeAmountParams>) -> Result<CallToolResult, McpError> {
        let mut builder = self.recipe.lock().await;
        let result = builder.set_amount(p.index, p.grams).map(|_| builder.view());
        respond(result.map_err(ToolError::from))
    }

    #[tool(description = "Remove an ingredient from the recipe by index")]
    async fn remove_recipe_ingredient(&self, Parameters(p): Parameters<RemoveRecipeIngredientParams>) -> Result<CallToolResult, McpError> {
        let mut builder = self.recipe.lock().await;
        let result = builder.remove_entry(p.index).map(|_| builder.view());
        respond(result.map_err(ToolError::from))
    }

    #[tool(description = "Set how many servings the whole recipe makes; per-serving values are the totals divided by this number")]
    async fn set_recipe_servings(&self, Parameters(p): Parameters<SetRecipeServingsParams>) -> Result<CallToolResult, McpError> {
        let mut builder = self.recipe.lock().await;
        let result = builder.set_servings(p.servings).map(|_| builder.view());
        respond(result.map_err(ToolError::from))
    }

    #[tool(description = "Calculate total nutrition for the recipe using the FlavoursVerse API")]
    async fn calculate_recipe(&self) -> Result<CallToolResult, McpError> {
        info!("calculate_recipe");
        respond(recipes::calculate_recipe(self.api.as_ref(), &self.recipe).await)
    }

    #[tool(description = "Export the calculated recipe (ingredients, servings, totals, per-serving values) to a JSON file")]
    async fn export_recipe(&self) -> Result<CallToolResult, McpError> {
        let builder = self.recipe.lock().await;
        respond(recipes::export_recipe(&builder, &self.export_dir))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FlavoursVerseService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "flavoursverse".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("FlavoursVerse".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "FlavoursVerse - ingredient substitutes, flavor profiles, dietary analysis and recipe nutrition. \
                 Call usage_instructions for the full guide. \
                 Substitutes: find_substitutes, show_substitutes. \
                 Flavor: analyze_flavor. \
                 Dietary: analyze_dietary_query, parse_dietary_info, check_allergies, taste_recommendations. \
                 Calories: lookup_calories, then add_to_recipe. \
                 Recipe: get_recipe, set_recipe_amount, remove_recipe_ingredient, set_recipe_servings, \
                 calculate_recipe, export_recipe. \
                 Session: suggest_ingredients, search_history, clear_search_history, status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApiClient;
    use crate::config::HistoryCaps;
    use crate::models::{IngredientNutrition, Nutrition, RecipeTotals, SubstitutionCandidate};
    use std::time::Duration;

    fn config(export_dir: PathBuf) -> Config {
        Config {
            api_url: "http://localhost:8000".into(),
            api_timeout: Duration::from_secs(10),
            export_dir,
            history_caps: HistoryCaps::default(),
        }
    }

    fn service(api: MockApiClient, export_dir: PathBuf) -> FlavoursVerseService {
        FlavoursVerseService::new(&config(export_dir), Arc::new(api))
    }

    fn is_error(result: &CallToolResult) -> bool {
        result.is_error == Some(true)
    }

    #[test]
    fn test_error_json_shape() {
        let json = error_json(&ToolError::validation("Please enter an ingredient name"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "Please enter an ingredient name");
    }

    #[tokio::test]
    async fn test_lookup_failure_is_tool_error() {
        let svc = service(MockApiClient::new(), PathBuf::from("."));
        let result = svc
            .find_substitutes(Parameters(FindSubstitutesParams {
                ingredient: " ".into(),
                sort_by: None,
                min_score: None,
            }))
            .await
            .unwrap();
        assert!(is_error(&result));
    }

    #[tokio::test]
    async fn test_unknown_sort_is_rejected() {
        let api = MockApiClient::new().with_substitutes(Ok(vec![SubstitutionCandidate::new("soy milk", 85)]));
        let svc = service(api, PathBuf::from("."));

        let result = svc
            .find_substitutes(Parameters(FindSubstitutesParams {
                ingredient: "milk".into(),
                sort_by: Some("alpha".into()),
                min_score: None,
            }))
            .await
            .unwrap();
        assert!(is_error(&result));
        assert!(svc.history_of(ToolKind::Substitutes).await.is_empty());

        let err = svc.substitute_view(Some("alpha"), None).unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        assert_eq!(svc.substitute_view(Some("Name"), None).unwrap().sort_by, SortBy::Name);
    }

    #[tokio::test]
    async fn test_history_shared_with_tool_state() {
        let api = MockApiClient::new().with_substitutes(Ok(vec![SubstitutionCandidate::new("soy milk", 85)]));
        let svc = service(api, PathBuf::from("."));

        for input in ["Milk", "milk"] {
            let result = svc
                .find_substitutes(Parameters(FindSubstitutesParams {
                    ingredient: input.into(),
                    sort_by: Some("name".into()),
                    min_score: Some(50),
                }))
                .await
                .unwrap();
            assert!(!is_error(&result));
        }
        assert_eq!(svc.history_of(ToolKind::Substitutes).await, vec!["milk"]);
        assert!(svc.history_of(ToolKind::Flavor).await.is_empty());

        svc.clear_history_of(ToolKind::Substitutes).await;
        assert!(svc.history_of(ToolKind::Substitutes).await.is_empty());
    }

    #[tokio::test]
    async fn test_recipe_flow() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApiClient::new()
            .with_nutrition(IngredientNutrition {
                name: "chicken".into(),
                nutrition: Nutrition { calories: 165.0, protein: 31.0, carbs: 0.0, fat: 3.6 },
                unit: "per 100g".into(),
            })
            .with_recipe_totals(Ok(RecipeTotals {
                total_calories: 165.0,
                total_protein: 31.0,
                total_carbs: 0.0,
                total_fat: 3.6,
                serving_size: 1.0,
            }));
        let svc = service(api, dir.path().to_path_buf());

        assert!(is_error(&svc.export_recipe().await.unwrap()));
        assert!(is_error(&svc.calculate_recipe().await.unwrap()));
        assert!(is_error(&svc.add_to_recipe().await.unwrap()));

        let looked_up = svc
            .lookup_calories(Parameters(IngredientParams { ingredient: "chicken".into() }))
            .await
            .unwrap();
        assert!(!is_error(&looked_up));
        assert!(!is_error(&svc.add_to_recipe().await.unwrap()));
        assert!(!is_error(&svc.calculate_recipe().await.unwrap()));
        assert!(is_error(
            &svc.set_recipe_servings(Parameters(SetRecipeServingsParams { servings: 0.0 }))
                .await
                .unwrap()
        ));
        assert!(!is_error(&svc.export_recipe().await.unwrap()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_unknown_tool_kind() {
        let err = parse_tool_kind("recipes").unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }
}
