//! In-memory `ApiClient` for tests
//!
//! Responses are canned per operation; each call is counted so tests can
//! assert how many requests a tool issued.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::ApiClient;
use super::error::{ApiError, ApiResult};
use crate::models::{
    AllergyReport, DietaryAnalysis, FlavorProfile, IngredientNutrition, ParsedDietaryInfo,
    RecipeEntry, RecipeTotals, SubstitutionCandidate, TasteRecommendations,
};

/// Operation names used for call counting
pub mod ops {
    pub const SUBSTITUTES: &str = "substitutes";
    pub const FLAVOR: &str = "flavor";
    pub const NUTRITION: &str = "nutrition";
    pub const RECIPE: &str = "recipe";
    pub const DIETARY: &str = "dietary";
    pub const DIETARY_INFO: &str = "dietary_info";
    pub const ALLERGIES: &str = "allergies";
    pub const TASTES: &str = "tastes";
}

/// Canned outcome: `Err` strings come back as `ApiError::Server`
type Canned<T> = Option<Result<T, String>>;

#[derive(Default)]
struct Responses {
    substitutes: Canned<Vec<SubstitutionCandidate>>,
    flavor: Canned<FlavorProfile>,
    nutrition: HashMap<String, IngredientNutrition>,
    recipe: Canned<RecipeTotals>,
    dietary: Canned<DietaryAnalysis>,
    dietary_info: Canned<ParsedDietaryInfo>,
    allergies: Canned<AllergyReport>,
    tastes: Canned<TasteRecommendations>,
}

#[derive(Default)]
pub struct MockApiClient {
    responses: Mutex<Responses>,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_substitutes(self, result: Result<Vec<SubstitutionCandidate>, String>) -> Self {
        self.set(|r| r.substitutes = Some(result));
        self
    }

    pub fn with_flavor(self, result: Result<FlavorProfile, String>) -> Self {
        self.set(|r| r.flavor = Some(result));
        self
    }

    /// Nutrition is keyed by lowercased ingredient name; unknown names 404
    pub fn with_nutrition(self, record: IngredientNutrition) -> Self {
        self.set(|r| {
            r.nutrition.insert(record.name.to_lowercase(), record);
        });
        self
    }

    pub fn with_recipe_totals(self, result: Result<RecipeTotals, String>) -> Self {
        self.set(|r| r.recipe = Some(result));
        self
    }

    pub fn with_dietary(self, result: Result<DietaryAnalysis, String>) -> Self {
        self.set(|r| r.dietary = Some(result));
        self
    }

    pub fn with_dietary_info(self, result: Result<ParsedDietaryInfo, String>) -> Self {
        self.set(|r| r.dietary_info = Some(result));
        self
    }

    pub fn with_allergy_report(self, result: Result<AllergyReport, String>) -> Self {
        self.set(|r| r.allergies = Some(result));
        self
    }

    pub fn with_taste_recommendations(self, result: Result<TasteRecommendations, String>) -> Self {
        self.set(|r| r.tastes = Some(result));
        self
    }

    /// Number of calls made to one operation
    pub fn call_count(&self, op: &str) -> usize {
        self.lock_calls().iter().filter(|(name, _)| *name == op).count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock_calls().len()
    }

    /// Arguments of every call to one operation, oldest first
    pub fn call_args(&self, op: &str) -> Vec<String> {
        self.lock_calls()
            .iter()
            .filter(|(name, _)| *name == op)
            .map(|(_, arg)| arg.clone())
            .collect()
    }

    fn set(&self, f: impl FnOnce(&mut Responses)) {
        let mut guard = self.responses.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut guard);
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<(&'static str, String)>> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, op: &'static str, arg: impl Into<String>) {
        self.lock_calls().push((op, arg.into()));
    }

    fn answer<T: Clone>(
        &self,
        pick: impl FnOnce(&Responses) -> &Canned<T>,
        subject: (&'static str, &str),
    ) -> ApiResult<T> {
        let guard = self.responses.lock().unwrap_or_else(|p| p.into_inner());
        match pick(&guard) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(ApiError::Server(message.clone())),
            None => Err(ApiError::NotFound {
                what: subject.0,
                ingredient: subject.1.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn lookup_substitutes(&self, ingredient: &str) -> ApiResult<Vec<SubstitutionCandidate>> {
        self.record(ops::SUBSTITUTES, ingredient);
        self.answer(|r| &r.substitutes, ("substitutes", ingredient))
    }

    async fn lookup_flavor_profile(&self, ingredient: &str) -> ApiResult<FlavorProfile> {
        self.record(ops::FLAVOR, ingredient);
        self.answer(|r| &r.flavor, ("flavor data", ingredient))
    }

    async fn lookup_nutrition(&self, ingredient: &str) -> ApiResult<IngredientNutrition> {
        self.record(ops::NUTRITION, ingredient);
        let guard = self.responses.lock().unwrap_or_else(|p| p.into_inner());
        guard
            .nutrition
            .get(&ingredient.to_lowercase())
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                what: "calorie data",
                ingredient: ingredient.to_string(),
            })
    }

    async fn aggregate_recipe_nutrition(&self, entries: &[RecipeEntry]) -> ApiResult<RecipeTotals> {
        let summary = entries
            .iter()
            .map(|e| format!("{}:{}", e.name, e.amount_grams))
            .collect::<Vec<_>>()
            .join(",");
        self.record(ops::RECIPE, summary);
        self.answer(|r| &r.recipe, ("recipe nutrition", "recipe"))
    }

    async fn parse_dietary_query(&self, query: &str) -> ApiResult<DietaryAnalysis> {
        self.record(ops::DIETARY, query);
        self.answer(|r| &r.dietary, ("dietary suggestions", query))
    }

    async fn parse_dietary_info(&self, query: &str) -> ApiResult<ParsedDietaryInfo> {
        self.record(ops::DIETARY_INFO, query);
        self.answer(|r| &r.dietary_info, ("dietary information", query))
    }

    async fn check_allergies(
        &self,
        ingredients: &[String],
        user_allergies: &[String],
    ) -> ApiResult<AllergyReport> {
        self.record(
            ops::ALLERGIES,
            format!("{}|{}", ingredients.join(","), user_allergies.join(",")),
        );
        self.answer(|r| &r.allergies, ("allergy analysis", "ingredients"))
    }

    async fn taste_recommendations(
        &self,
        taste_preferences: &[String],
        exclude_allergies: &[String],
    ) -> ApiResult<TasteRecommendations> {
        self.record(
            ops::TASTES,
            format!("{}|{}", taste_preferences.join(","), exclude_allergies.join(",")),
        );
        self.answer(|r| &r.tastes, ("taste recommendations", "taste preferences"))
    }
}
