//! Calorie lookup tool

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use super::controller::QueryController;
use super::error::ToolError;
use crate::api::ApiClient;
use crate::models::IngredientNutrition;

pub type CalorieLookup = QueryController<IngredientNutrition>;

/// Popular ingredients for the calorie tool
pub const POPULAR_INGREDIENTS: &[&str] = &[
    "chicken", "beef", "rice", "pasta", "broccoli", "eggs", "milk", "bread", "cheese", "potatoes",
];

pub fn new_lookup(history_cap: usize) -> CalorieLookup {
    QueryController::new(history_cap, "Please enter an ingredient name")
}

#[derive(Debug, Clone, Serialize)]
pub struct CalorieResult {
    pub query: String,
    #[serde(flatten)]
    pub record: IngredientNutrition,
}

/// Look up nutrition for one ingredient
///
/// The record stays the tool's current result, which is what
/// `add_to_recipe` picks up.
pub async fn lookup_calories(
    api: &dyn ApiClient,
    lookup: &Mutex<CalorieLookup>,
    ingredient: &str,
) -> Result<CalorieResult, ToolError> {
    let pending = lookup.lock().await.begin(ingredient)?;
    let outcome = api.lookup_nutrition(pending.query()).await;

    let mut lookup = lookup.lock().await;
    match outcome {
        Ok(record) => {
            info!(
                ingredient = %record.name,
                calories = record.nutrition.calories,
                "Nutrition looked up"
            );
            let result = CalorieResult {
                query: pending.query().to_string(),
                record: record.clone(),
            };
            lookup.resolve(pending, Ok(record));
            Ok(result)
        }
        Err(e) => {
            lookup.resolve(pending, Err(e.user_message()));
            Err(e.into())
        }
    }
}
