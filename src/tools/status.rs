//! FlavoursVerse Status Tool
//!
//! Provides runtime status information and the usage guide.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::{BUILD_NUMBER, BUILD_TIMESTAMP, VERSION};

/// Usage guide for AI assistants
pub const USAGE_INSTRUCTIONS: &str = r#"
# FlavoursVerse Tool Guide

FlavoursVerse answers four kinds of ingredient questions by calling the
FlavoursVerse API. Every lookup tool keeps its latest result and a short list
of recent searches.

---

## Ingredient Substitutes

**Tool:** `find_substitutes`
- `ingredient` (required): what to replace, e.g. "milk"
- `sort_by`: "score" (default, best match first) or "name"
- `min_score`: hide candidates scoring below this (0-100, default 0)

Each candidate carries a 0-100 score and a label:

| Score | Label |
|-------|-------|
| 80+ | Excellent Match |
| 60-79 | Good Match |
| 40-59 | Fair Match |
| below 40 | Possible Match |

**Tool:** `show_substitutes` re-sorts or re-filters the last result without
calling the API again.

---

## Flavor Profiles

**Tool:** `analyze_flavor`
- `ingredient` (required): e.g. "vanilla"

Returns the taste axes (0-10) ordered strongest first, plus every field the
API knows about the ingredient (aroma, categories, pairings, ...).

---

## Dietary Assistant

**Tool:** `analyze_dietary_query`
- `query` (required): free text, e.g. "I'm allergic to nuts and dairy, but I like sweet creamy things"

Detected allergies, tastes and dietary flags (Vegan, Gluten-Free, ...) come
straight from the API's language parser, along with ingredient suggestions.

**Tool:** `check_allergies`
- `ingredients` (required): list of ingredients to check
- `allergies` (required): list of allergies

**Tool:** `taste_recommendations`
- `tastes` (required): e.g. ["sweet", "creamy"]
- `exclude_allergies`: allergies to leave out of the suggestions

---

## Calories and Recipes

1. `lookup_calories` with an ingredient: nutrition per 100g
2. `add_to_recipe`: adds the last looked-up ingredient at 100g
3. `set_recipe_amount` / `remove_recipe_ingredient` by index (see `get_recipe`)
4. `calculate_recipe`: totals for the whole recipe, computed by the API
5. `set_recipe_servings`: how many servings the recipe makes; per-serving
   values are the totals divided by this number
6. `export_recipe`: writes the calculated recipe to a JSON file

Editing the recipe after calculating marks the totals as stale. They stay
visible until `calculate_recipe` is called again.

---

## Other Tools

- `suggest_ingredients`: popular inputs for a tool matching what was typed
- `search_history` / `clear_search_history`: recent searches per tool
- `status`: build and runtime information
"#;

/// Runtime status of the FlavoursVerse service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Remote API
    pub api_url: String,

    /// Export information
    pub export_dir: String,
    pub export_count: Option<usize>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    api_url: String,
    export_dir: PathBuf,
}

impl StatusTracker {
    pub fn new(api_url: impl Into<String>, export_dir: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            api_url: api_url.into(),
            export_dir,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> ServiceStatus {
        // Missing directory means nothing exported yet
        let export_count = std::fs::read_dir(&self.export_dir)
            .ok()
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                    .count()
            });

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ServiceStatus {
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            version: VERSION,
            api_url: self.api_url.clone(),
            export_dir: self.export_dir.display().to_string(),
            export_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_exports() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("recipe-nutrition-1.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let tracker = StatusTracker::new("http://localhost:8000", dir.path().to_path_buf());
        let status = tracker.get_status();
        assert_eq!(status.export_count, Some(1));
        assert_eq!(status.api_url, "http://localhost:8000");
        assert_eq!(status.process_id, std::process::id());
    }

    #[test]
    fn test_missing_export_dir() {
        let tracker = StatusTracker::new("http://localhost:8000", PathBuf::from("/nonexistent/flavoursverse"));
        assert_eq!(tracker.get_status().export_count, None);
    }
}
