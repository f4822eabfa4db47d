//! Substitution candidate model

use serde::{Deserialize, Deserializer, Serialize};

/// An alternative ingredient with an opaque 0-100 compatibility score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionCandidate {
    #[serde(rename = "ingredient")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
}

impl SubstitutionCandidate {
    pub fn new(name: impl Into<String>, score: u8) -> Self {
        Self {
            name: name.into(),
            score: score.min(100),
        }
    }
}

/// The substitute endpoint answers with either a bare array or a wrapper object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SubstituteResponse {
    List(Vec<SubstitutionCandidate>),
    Wrapped {
        #[serde(default)]
        substitutes: Vec<SubstitutionCandidate>,
    },
}

impl SubstituteResponse {
    pub fn into_candidates(self) -> Vec<SubstitutionCandidate> {
        match self {
            SubstituteResponse::List(list) => list,
            SubstituteResponse::Wrapped { substitutes } => substitutes,
        }
    }
}

// Some backends emit 85.0 rather than 85
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("score must be a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array_shape() {
        let json = r#"[{"ingredient":"soy milk","score":85},{"ingredient":"oat milk","score":70}]"#;
        let resp: SubstituteResponse = serde_json::from_str(json).unwrap();
        let list = resp.into_candidates();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], SubstitutionCandidate::new("soy milk", 85));
    }

    #[test]
    fn test_wrapped_shape() {
        let json = r#"{"substitutes":[{"ingredient":"margarine","score":72.6}]}"#;
        let resp: SubstituteResponse = serde_json::from_str(json).unwrap();
        let list = resp.into_candidates();
        assert_eq!(list, vec![SubstitutionCandidate::new("margarine", 73)]);
    }

    #[test]
    fn test_score_is_clamped() {
        let json = r#"[{"ingredient":"x","score":140},{"ingredient":"y","score":-3}]"#;
        let list = serde_json::from_str::<SubstituteResponse>(json)
            .unwrap()
            .into_candidates();
        assert_eq!(list[0].score, 100);
        assert_eq!(list[1].score, 0);
    }
}
