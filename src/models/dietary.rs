//! Dietary preference models
//!
//! Everything here is populated by the remote NLP parser; nothing is derived
//! locally apart from the badge list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fixed set of dietary restriction flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietaryPreferences {
    pub vegan: bool,
    pub vegetarian: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
    pub nut_free: bool,
    pub low_sugar: bool,
    pub low_sodium: bool,
}

/// Badge shown for a set dietary flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryBadge {
    Vegan,
    Vegetarian,
    GlutenFree,
    DairyFree,
    NutFree,
    LowSugar,
    LowSodium,
}

impl DietaryBadge {
    pub fn label(&self) -> &'static str {
        match self {
            DietaryBadge::Vegan => "Vegan",
            DietaryBadge::Vegetarian => "Vegetarian",
            DietaryBadge::GlutenFree => "Gluten-Free",
            DietaryBadge::DairyFree => "Dairy-Free",
            DietaryBadge::NutFree => "Nut-Free",
            DietaryBadge::LowSugar => "Low-Sugar",
            DietaryBadge::LowSodium => "Low-Sodium",
        }
    }
}

impl DietaryPreferences {
    /// One badge per set flag, in declaration order
    pub fn badges(&self) -> Vec<DietaryBadge> {
        [
            (self.vegan, DietaryBadge::Vegan),
            (self.vegetarian, DietaryBadge::Vegetarian),
            (self.gluten_free, DietaryBadge::GlutenFree),
            (self.dairy_free, DietaryBadge::DairyFree),
            (self.nut_free, DietaryBadge::NutFree),
            (self.low_sugar, DietaryBadge::LowSugar),
            (self.low_sodium, DietaryBadge::LowSodium),
        ]
        .into_iter()
        .filter_map(|(set, badge)| set.then_some(badge))
        .collect()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.badges().is_empty()
    }
}

/// Parser output for a free-text dietary query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDietaryInfo {
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub tastes: Vec<String>,
    #[serde(default)]
    pub dietary_preferences: DietaryPreferences,
}

/// Response of the dietary suggestions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietaryAnalysis {
    #[serde(default)]
    pub query: Option<String>,
    pub parsed_info: ParsedDietaryInfo,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub allergy_count: usize,
    #[serde(default)]
    pub taste_count: usize,
}

/// An ingredient flagged by the allergy check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllergenMatch {
    pub ingredient: String,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub severity: String,
}

/// Response of the allergy check endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllergyReport {
    #[serde(default)]
    pub safe_ingredients: Vec<String>,
    #[serde(default)]
    pub allergen_containing: Vec<AllergenMatch>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Response of the taste recommendations endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasteRecommendations {
    #[serde(default)]
    pub taste_preferences: Vec<String>,
    #[serde(default)]
    pub all_suggestions: Vec<String>,
    #[serde(default)]
    pub categorized: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub total_suggestions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badges_follow_flags() {
        let prefs = DietaryPreferences {
            vegan: true,
            nut_free: true,
            low_sodium: true,
            ..Default::default()
        };
        let labels: Vec<&str> = prefs.badges().iter().map(|b| b.label()).collect();
        assert_eq!(labels, vec!["Vegan", "Nut-Free", "Low-Sodium"]);
        assert!(!prefs.is_unrestricted());
        assert!(DietaryPreferences::default().is_unrestricted());
    }

    #[test]
    fn test_analysis_wire_shape() {
        let json = serde_json::json!({
            "query": "I'm allergic to nuts and dairy, but I like sweet creamy things",
            "parsed_info": {
                "allergies": ["nuts", "dairy"],
                "tastes": ["sweet", "creamy"],
                "dietary_preferences": {"dairy_free": true, "nut_free": true}
            },
            "suggestions": ["coconut cream", "maple syrup"],
            "allergy_count": 2,
            "taste_count": 2
        });
        let analysis: DietaryAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(analysis.parsed_info.allergies, vec!["nuts", "dairy"]);
        assert_eq!(analysis.parsed_info.tastes, vec!["sweet", "creamy"]);
        assert!(analysis.parsed_info.dietary_preferences.dairy_free);
        assert!(!analysis.parsed_info.dietary_preferences.vegan);
        assert_eq!(analysis.allergy_count, 2);
    }

    #[test]
    fn test_allergy_report_shape() {
        let json = serde_json::json!({
            "safe_ingredients": ["rice"],
            "allergen_containing": [
                {"ingredient": "milk", "allergens": ["dairy", "lactose"], "severity": "high"}
            ],
            "warnings": ["milk contains dairy, lactose"]
        });
        let report: AllergyReport = serde_json::from_value(json).unwrap();
        assert_eq!(report.allergen_containing[0].severity, "high");
        assert_eq!(report.safe_ingredients, vec!["rice"]);
    }
}
