use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Body of `POST /research`.
///
/// Built fresh for every submission and never persisted.
#[derive(Clone, Serialize, PartialEq)]
pub struct ResearchRequest {
    pub query: String,
    pub max_iterations: u32,
    #[serde(rename = "anthropic_api_key")]
    pub api_key: String,
    /// Secondary key for live web search. Serialized as `null` when disabled.
    pub tavily_api_key: Option<String>,
}

// Keys stay out of logs.
impl fmt::Debug for ResearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResearchRequest")
            .field("query", &self.query)
            .field("max_iterations", &self.max_iterations)
            .field("api_key", &"<redacted>")
            .field(
                "tavily_api_key",
                &self.tavily_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResearchResult {
    pub query: String,
    pub timestamp: String,
    pub report: String,
    pub confidence: f64,
    pub search_results_count: u32,
    pub validations_count: u32,
    /// A finished run always has at least one iteration.
    #[serde(deserialize_with = "at_least_one")]
    pub iterations: u32,
    pub conflicts_detected: bool,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub full_state: Option<FullState>,
}

fn at_least_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = u32::deserialize(deserializer)?;
    if value == 0 {
        return Err(serde::de::Error::custom("iterations must be at least 1"));
    }
    Ok(value)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Reference {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

/// Trace of the upstream run. The service sends more keys than these; the
/// rest are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct FullState {
    #[serde(default)]
    pub messages: Option<Vec<String>>,
    #[serde(default)]
    pub validations: Option<Vec<ValidationEntry>>,
    #[serde(default)]
    pub search_queries: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ValidationEntry {
    pub claim: String,
    pub is_validated: bool,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

fn default_min_iterations() -> u32 {
    1
}

fn default_max_iterations() -> u32 {
    3
}

/// Response of `GET /api/config`: the iteration bounds the service accepts.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerLimits {
    #[serde(default = "default_min_iterations")]
    pub min_iterations_allowed: u32,
    #[serde(default = "default_max_iterations")]
    pub max_iterations_allowed: u32,
    #[serde(default = "default_min_iterations")]
    pub default_iterations: u32,
    #[serde(default)]
    pub tavily_optional: bool,
    #[serde(default)]
    pub supported_features: Vec<String>,
}

impl Default for ServerLimits {
    fn default() -> Self {
        ServerLimits {
            min_iterations_allowed: default_min_iterations(),
            max_iterations_allowed: default_max_iterations(),
            default_iterations: default_min_iterations(),
            tavily_optional: true,
            supported_features: Vec::new(),
        }
    }
}

impl ServerLimits {
    /// Keeps a stepper value inside the advertised bounds.
    pub fn clamp_iterations(&self, value: u32) -> u32 {
        let max = self.max_iterations_allowed.max(self.min_iterations_allowed);
        value.clamp(self.min_iterations_allowed, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_wire_names_and_null_search_key() {
        let request = ResearchRequest {
            query: "test".into(),
            max_iterations: 2,
            api_key: "k".into(),
            tavily_api_key: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "test",
                "max_iterations": 2,
                "anthropic_api_key": "k",
                "tavily_api_key": null
            })
        );
    }

    #[test]
    fn request_debug_redacts_keys() {
        let request = ResearchRequest {
            query: "q".into(),
            max_iterations: 1,
            api_key: "sk-ant-secret".into(),
            tavily_api_key: Some("tvly-secret".into()),
        };
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn result_tolerates_missing_optional_fields() {
        let result: ResearchResult = serde_json::from_value(json!({
            "query": "q",
            "timestamp": "2025-01-01T00:00:00",
            "report": "# R",
            "confidence": 0.5,
            "search_results_count": 0,
            "validations_count": 0,
            "iterations": 1,
            "conflicts_detected": false,
            "references": [{}]
        }))
        .unwrap();
        assert!(result.full_state.is_none());
        assert_eq!(result.references, vec![Reference::default()]);
    }

    #[test]
    fn full_state_ignores_unknown_keys() {
        let state: FullState = serde_json::from_value(json!({
            "query": "q",
            "current_iteration": 2,
            "validations": [
                {"claim": "c", "is_validated": true, "confidence": 0.8}
            ]
        }))
        .unwrap();
        let validations = state.validations.unwrap();
        assert_eq!(validations[0].reasoning, "");
        assert!(state.messages.is_none());
    }

    #[test]
    fn negative_count_is_rejected() {
        let parsed = serde_json::from_value::<ResearchResult>(json!({
            "query": "q",
            "timestamp": "t",
            "report": "",
            "confidence": 0.1,
            "search_results_count": -1,
            "validations_count": 0,
            "iterations": 1,
            "conflicts_detected": false,
            "references": []
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let parsed = serde_json::from_value::<ResearchResult>(json!({
            "query": "q",
            "timestamp": "t",
            "report": "",
            "confidence": 0.1,
            "search_results_count": 0,
            "validations_count": 0,
            "iterations": 0,
            "conflicts_detected": false
        }));
        let err = parsed.unwrap_err();
        assert!(err.to_string().contains("iterations must be at least 1"));
    }

    #[test]
    fn limits_clamp_stepper_values() {
        let limits = ServerLimits::default();
        assert_eq!(limits.clamp_iterations(0), 1);
        assert_eq!(limits.clamp_iterations(2), 2);
        assert_eq!(limits.clamp_iterations(9), 3);
    }
}
