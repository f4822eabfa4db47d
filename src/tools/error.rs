//! Tool error types

use thiserror::Error;

use crate::api::ApiError;
use crate::session::ExportError;

/// Misuse of the recipe builder
#[derive(Debug, Error, PartialEq)]
pub enum RecipeError {
    #[error("Please add ingredients to the recipe first")]
    Empty,

    #[error("No recipe data to export; calculate the recipe first")]
    NotCalculated,

    #[error("No recipe ingredient at index {index} (recipe has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Serving count must be a positive number, got {0}")]
    InvalidServings(f64),

    #[error("Ingredient amount must be a finite number of grams, got {0}")]
    InvalidAmount(f64),
}

#[derive(Debug, Error)]
pub enum ToolError {
    /// Rejected before any request was made
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// A follow-up action needs a result that does not exist yet
    #[error("{0}")]
    NoResult(String),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation(message.into())
    }
}
