//! Data models
//!
//! Rust structs for the payloads exchanged with the FlavoursVerse API.

mod dietary;
mod flavor;
mod nutrition;
mod recipe;
mod substitution;

pub use dietary::{
    AllergenMatch, AllergyReport, DietaryAnalysis, DietaryBadge, DietaryPreferences,
    ParsedDietaryInfo, TasteRecommendations,
};
pub use flavor::{FlavorField, FlavorProfile};
pub use nutrition::{IngredientNutrition, Nutrition};
pub use recipe::{RecipeEntry, RecipeTotals, DEFAULT_AMOUNT_GRAMS};
pub use substitution::{SubstituteResponse, SubstitutionCandidate};
