//! Recipe models
//!
//! Ingredient entries of a recipe being assembled, and the totals reported
//! back by the recipe calculation endpoint.

use serde::{Deserialize, Serialize};

use super::Nutrition;

/// Default amount for a freshly added ingredient
pub const DEFAULT_AMOUNT_GRAMS: f64 = 100.0;

/// One ingredient of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeEntry {
    #[serde(rename = "ingredient")]
    pub name: String,
    #[serde(rename = "amount")]
    pub amount_grams: f64,
}

impl RecipeEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount_grams: DEFAULT_AMOUNT_GRAMS,
        }
    }

    pub fn with_amount(name: impl Into<String>, amount_grams: f64) -> Self {
        Self {
            name: name.into(),
            amount_grams,
        }
    }
}

/// Totals for a whole recipe, as computed by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeTotals {
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    #[serde(default = "default_serving_size")]
    pub serving_size: f64,
}

fn default_serving_size() -> f64 {
    1.0
}

impl RecipeTotals {
    pub fn nutrition(&self) -> Nutrition {
        Nutrition {
            calories: self.total_calories,
            protein: self.total_protein,
            carbs: self.total_carbs,
            fat: self.total_fat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_as_wire_shape() {
        let entry = RecipeEntry::new("chicken");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, serde_json::json!({"ingredient": "chicken", "amount": 100.0}));
    }

    #[test]
    fn test_totals_without_serving_size() {
        let json = r#"{"total_calories":360,"total_protein":35,"total_carbs":42,"total_fat":4}"#;
        let totals: RecipeTotals = serde_json::from_str(json).unwrap();
        assert_eq!(totals.serving_size, 1.0);
        assert_eq!(totals.nutrition().calories, 360.0);
    }
}
