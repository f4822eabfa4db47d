//! Shared nutrition data structures
//!
//! Macro values as reported by the calorie endpoints, and the rounding used
//! when they are shown per serving.

use serde::{Deserialize, Serialize};

/// Calories and macronutrients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
}

impl Nutrition {
    /// Every value divided by `divisor`
    pub fn divide(&self, divisor: f64) -> Self {
        Self {
            calories: self.calories / divisor,
            protein: self.protein / divisor,
            carbs: self.carbs / divisor,
            fat: self.fat / divisor,
        }
    }

    /// Round for display: whole kilocalories, macros to a tenth of a gram
    pub fn rounded(&self) -> Self {
        Self {
            calories: self.calories.round(),
            protein: round_tenth(self.protein),
            carbs: round_tenth(self.carbs),
            fat: round_tenth(self.fat),
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Nutrition of a single ingredient, per reference quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientNutrition {
    #[serde(rename = "ingredient")]
    pub name: String,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    /// Reference quantity, e.g. "per 100g"
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    "per 100g".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divide() {
        let total = Nutrition { calories: 150.0, protein: 11.0, carbs: 25.0, fat: 2.5 };
        let half = total.divide(2.0);
        assert_eq!(half.calories, 75.0);
        assert_eq!(half.protein, 5.5);
        assert_eq!(half.carbs, 12.5);
        assert_eq!(total.divide(1.0), total);
    }

    #[test]
    fn test_rounded() {
        let n = Nutrition { calories: 165.5, protein: 31.04, carbs: 0.06, fat: 3.56 };
        let r = n.rounded();
        assert_eq!(r.calories, 166.0);
        assert_eq!(r.protein, 31.0);
        assert_eq!(r.carbs, 0.1);
        assert!((r.fat - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_ingredient_nutrition_wire_shape() {
        let json = r#"{"ingredient":"chicken","calories":165,"protein":31,"carbs":0,"fat":3.6,"unit":"per 100g"}"#;
        let record: IngredientNutrition = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "chicken");
        assert_eq!(record.nutrition.calories, 165.0);
        assert_eq!(record.nutrition.protein, 31.0);
        assert_eq!(record.unit, "per 100g");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["ingredient"], "chicken");
        assert_eq!(back["fat"], 3.6);
    }

    #[test]
    fn test_missing_unit_defaults() {
        let json = r#"{"ingredient":"rice","calories":130,"protein":2.7,"carbs":28,"fat":0.3}"#;
        let record: IngredientNutrition = serde_json::from_str(json).unwrap();
        assert_eq!(record.unit, "per 100g");
    }
}
