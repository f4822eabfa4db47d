//! Flavor profile model
//!
//! The flavor endpoint returns an open-ended object. A handful of keys are
//! recognised; everything else is kept as-is in `extra`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlavorProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Taste axis scores, 0-10
    #[serde(
        default,
        deserialize_with = "deserialize_scores",
        skip_serializing_if = "Option::is_none"
    )]
    pub flavor_profile: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aroma: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairings: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Non-numeric axis values are dropped rather than failing the whole profile
fn deserialize_scores<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(raw.map(|map| {
        map.into_iter()
            .filter_map(|(k, v)| v.as_f64().map(|score| (k, score)))
            .collect()
    }))
}

/// One rendered line of a flavor profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlavorField {
    pub label: String,
    pub text: String,
}

impl FlavorProfile {
    /// Taste axes ordered by score, highest first
    pub fn dominant_tastes(&self) -> Vec<(String, f64)> {
        let mut axes: Vec<(String, f64)> = self
            .flavor_profile
            .iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.clone(), *v)))
            .collect();
        axes.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        axes
    }

    /// Every key of the profile as a label/text pair, in key order
    pub fn fields(&self) -> Vec<FlavorField> {
        let value = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => return Vec::new(),
        };

        let mut keys: Vec<&String> = value.keys().collect();
        keys.sort();

        keys.into_iter()
            .map(|key| {
                let v = &value[key.as_str()];
                let text = match v {
                    Value::String(s) => s.clone(),
                    Value::Object(_) | Value::Array(_) => {
                        serde_json::to_string_pretty(v).unwrap_or_default()
                    }
                    other => other.to_string(),
                };
                FlavorField {
                    label: key.replace('_', " "),
                    text,
                }
            })
            .collect()
    }
}
