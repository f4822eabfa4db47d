//! FlavoursVerse Tools module
//!
//! Tool implementations behind the MCP surface. Each lookup tool owns a
//! `QueryController`; the recipe builder is shared with the calorie tool.

pub mod assistant;
pub mod calories;
pub mod controller;
pub mod error;
pub mod flavor;
pub mod recipes;
pub mod status;
pub mod substitutes;
pub mod suggestions;

pub use controller::{PendingQuery, QueryController, QueryState, Resolution};
pub use error::{RecipeError, ToolError};

/// The four lookup tools that keep a search history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Substitutes,
    Flavor,
    Assistant,
    Calories,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Substitutes,
        ToolKind::Flavor,
        ToolKind::Assistant,
        ToolKind::Calories,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "substitutes" | "substitution" => Some(ToolKind::Substitutes),
            "flavor" | "flavour" => Some(ToolKind::Flavor),
            "assistant" | "dietary" => Some(ToolKind::Assistant),
            "calories" | "calorie" => Some(ToolKind::Calories),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Substitutes => "substitutes",
            ToolKind::Flavor => "flavor",
            ToolKind::Assistant => "assistant",
            ToolKind::Calories => "calories",
        }
    }

    /// Popular or example inputs offered for this tool
    pub fn popular_inputs(&self) -> &'static [&'static str] {
        match self {
            ToolKind::Substitutes => substitutes::POPULAR_INGREDIENTS,
            ToolKind::Flavor => flavor::EXAMPLE_INGREDIENTS,
            ToolKind::Assistant => assistant::EXAMPLE_QUERIES,
            ToolKind::Calories => calories::POPULAR_INGREDIENTS,
        }
    }
}
