//! Recipe builder tools
//!
//! The recipe is an ordered list of (ingredient, grams) entries. Totals come
//! from the remote calculation endpoint and are kept verbatim; the only local
//! math is the per-serving division.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::calories::CalorieLookup;
use super::error::{RecipeError, ToolError};
use crate::api::ApiClient;
use crate::models::{IngredientNutrition, Nutrition, RecipeEntry, RecipeTotals};
use crate::session::write_json_snapshot;

/// File name stem of recipe exports
pub const EXPORT_STEM: &str = "recipe-nutrition";

/// Where the builder is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RecipePhase {
    Empty,
    Populated,
    /// Totals exist; `stale` once the entries changed after calculating
    Calculated { stale: bool },
}

#[derive(Debug, Clone)]
struct Calculation {
    totals: RecipeTotals,
    revision: u64,
}

#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    entries: Vec<RecipeEntry>,
    calculation: Option<Calculation>,
    /// Bumped on every entry change
    revision: u64,
    servings: f64,
}

impl Default for RecipeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            calculation: None,
            revision: 0,
            servings: 1.0,
        }
    }

    pub fn entries(&self) -> &[RecipeEntry] {
        &self.entries
    }

    pub fn servings(&self) -> f64 {
        self.servings
    }

    pub fn totals(&self) -> Option<&RecipeTotals> {
        self.calculation.as_ref().map(|c| &c.totals)
    }

    pub fn phase(&self) -> RecipePhase {
        match &self.calculation {
            Some(calc) => RecipePhase::Calculated {
                stale: calc.revision != self.revision,
            },
            None if self.entries.is_empty() => RecipePhase::Empty,
            None => RecipePhase::Populated,
        }
    }

    /// Append a looked-up ingredient at the default amount; returns its index
    pub fn add_entry(&mut self, record: &IngredientNutrition) -> usize {
        self.entries.push(RecipeEntry::new(record.name.clone()));
        self.revision += 1;
        self.entries.len() - 1
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<RecipeEntry, RecipeError> {
        self.check_index(index)?;
        self.revision += 1;
        Ok(self.entries.remove(index))
    }

    /// Any finite amount is accepted, zero and fractions included
    pub fn set_amount(&mut self, index: usize, grams: f64) -> Result<(), RecipeError> {
        self.check_index(index)?;
        if !grams.is_finite() {
            return Err(RecipeError::InvalidAmount(grams));
        }
        self.entries[index].amount_grams = grams;
        self.revision += 1;
        Ok(())
    }

    /// Number of servings the whole recipe makes
    pub fn set_servings(&mut self, servings: f64) -> Result<(), RecipeError> {
        if !servings.is_finite() || servings <= 0.0 {
            return Err(RecipeError::InvalidServings(servings));
        }
        self.servings = servings;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), RecipeError> {
        if index >= self.entries.len() {
            return Err(RecipeError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    /// Entries to send for calculation, tagged with the current revision
    fn snapshot(&self) -> Result<(Vec<RecipeEntry>, u64), RecipeError> {
        if self.entries.is_empty() {
            return Err(RecipeError::Empty);
        }
        Ok((self.entries.clone(), self.revision))
    }

    fn store_totals(&mut self, totals: RecipeTotals, revision: u64) {
        if let Some(current) = &self.calculation {
            if current.revision > revision {
                debug!(revision, latest = current.revision, "Discarding older recipe totals");
                return;
            }
        }
        self.calculation = Some(Calculation { totals, revision });
    }

    /// A failed calculation drops the totals unless newer ones already landed
    fn clear_totals(&mut self, revision: u64) {
        if let Some(current) = &self.calculation {
            if current.revision > revision {
                debug!(revision, latest = current.revision, "Ignoring failure of older recipe calculation");
                return;
            }
        }
        self.calculation = None;
    }

    pub fn per_serving(&self) -> Option<Nutrition> {
        self.totals()
            .and_then(|t| derive_per_serving(t, self.servings).ok())
    }

    pub fn view(&self) -> RecipeView {
        RecipeView {
            phase: self.phase(),
            entries: self
                .entries
                .iter()
                .enumerate()
                .map(|(index, e)| IndexedEntry {
                    index,
                    ingredient: e.name.clone(),
                    amount_grams: e.amount_grams,
                })
                .collect(),
            servings: self.servings,
            totals: self.totals().cloned(),
            per_serving: self.per_serving(),
        }
    }

    /// Export document, timestamped `at`
    pub fn export_document(&self, at: DateTime<Utc>) -> Result<RecipeExport, RecipeError> {
        let totals = self.totals().ok_or(RecipeError::NotCalculated)?;
        let per_serving = derive_per_serving(totals, self.servings)?;

        Ok(RecipeExport {
            recipe: ExportedRecipe {
                ingredients: self.entries.clone(),
                serving_size: self.servings,
                per_serving,
                totals: totals.clone(),
            },
            generated_at: at.to_rfc3339(),
        })
    }
}

/// Per-serving values: totals divided by `servings`, whole kcal and
/// macros to a tenth of a gram
pub fn derive_per_serving(totals: &RecipeTotals, servings: f64) -> Result<Nutrition, RecipeError> {
    if !servings.is_finite() || servings <= 0.0 {
        return Err(RecipeError::InvalidServings(servings));
    }
    Ok(totals.nutrition().divide(servings).rounded())
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexedEntry {
    pub index: usize,
    pub ingredient: String,
    pub amount_grams: f64,
}

/// Response for get_recipe and every recipe edit
#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    #[serde(flatten)]
    pub phase: RecipePhase,
    pub entries: Vec<IndexedEntry>,
    pub servings: f64,
    pub totals: Option<RecipeTotals>,
    pub per_serving: Option<Nutrition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedRecipe {
    pub ingredients: Vec<RecipeEntry>,
    pub serving_size: f64,
    pub per_serving: Nutrition,
    pub totals: RecipeTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeExport {
    pub recipe: ExportedRecipe,
    pub generated_at: String,
}

/// Response for export_recipe
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecipeResponse {
    pub path: PathBuf,
    pub ingredient_count: usize,
    pub stale: bool,
}

// ============================================================================
// Recipe Tools
// ============================================================================

/// Add the calorie tool's current result to the recipe
pub async fn add_to_recipe(
    lookup: &Mutex<CalorieLookup>,
    builder: &Mutex<RecipeBuilder>,
) -> Result<RecipeView, ToolError> {
    let record = lookup
        .lock()
        .await
        .current()
        .cloned()
        .ok_or_else(|| ToolError::NoResult("Look up an ingredient's calories first".to_string()))?;

    let mut builder = builder.lock().await;
    let index = builder.add_entry(&record);
    info!(ingredient = %record.name, index, "Ingredient added to recipe");
    Ok(builder.view())
}

/// Send the current entries to the calculation endpoint
pub async fn calculate_recipe(
    api: &dyn ApiClient,
    builder: &Mutex<RecipeBuilder>,
) -> Result<RecipeView, ToolError> {
    let (entries, revision) = builder.lock().await.snapshot()?;
    let totals = match api.aggregate_recipe_nutrition(&entries).await {
        Ok(totals) => totals,
        Err(e) => {
            builder.lock().await.clear_totals(revision);
            return Err(e.into());
        }
    };

    info!(
        ingredients = entries.len(),
        total_calories = totals.total_calories,
        "Recipe nutrition calculated"
    );

    let mut builder = builder.lock().await;
    builder.store_totals(totals, revision);
    Ok(builder.view())
}

/// Write the calculated recipe as JSON into `dir`
pub fn export_recipe(builder: &RecipeBuilder, dir: &Path) -> Result<ExportRecipeResponse, ToolError> {
    let document = builder.export_document(Utc::now())?;
    let path = write_json_snapshot(dir, EXPORT_STEM, &document)?;

    Ok(ExportRecipeResponse {
        path,
        ingredient_count: document.recipe.ingredients.len(),
        stale: matches!(builder.phase(), RecipePhase::Calculated { stale: true }),
    })
}
