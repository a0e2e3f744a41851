//! The structured verdict produced by one successful analysis.
//!
//! Field names follow the collaborator's wire contract (`camelCase`), so the
//! same types deserialize the model output and serialize CLI responses.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AnalysisError;

/// Number of named dimension scores every verdict carries.
pub const DIMENSION_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// DietaryClass
// ---------------------------------------------------------------------------

/// Dietary classification of the analyzed product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DietaryClass {
    #[serde(rename = "veg")]
    Veg,
    #[serde(rename = "non-veg")]
    NonVeg,
    #[serde(rename = "vegan")]
    Vegan,
    #[serde(rename = "unknown")]
    Unknown,
}

impl DietaryClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Veg => "veg",
            Self::NonVeg => "non-veg",
            Self::Vegan => "vegan",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DietaryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InsightCategory
// ---------------------------------------------------------------------------

/// Tone of a single insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Positive,
    Warning,
    Critical,
    Neutral,
}

impl InsightCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// A flagged ingredient or substance.
///
/// `name` is the literal text expected to appear inside the verdict's
/// free-text fields. Names are not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Villain {
    pub name: String,
    pub explanation: String,
}

impl Villain {
    pub fn new(name: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            explanation: explanation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub category: InsightCategory,
    /// Model confidence, 0-100.
    pub confidence: f64,
}

/// One of the five named dimension scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DimensionScore {
    pub subject: String,
    /// Score, 0-100.
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Tradeoffs {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Uncertainty {
    pub is_uncertain: bool,
    #[serde(default)]
    pub reason: String,
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// Immutable verdict for one captured input unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    /// Short script meant to be spoken aloud.
    pub audio_script: String,
    /// Shareable blurb.
    pub share_content: String,
    /// Overall score, 0-100.
    pub health_score: u8,
    pub dietary_classification: DietaryClass,
    pub uncertainty: Uncertainty,
    pub tradeoffs: Tradeoffs,
    pub insights: Vec<Insight>,
    pub radar_data: [DimensionScore; DIMENSION_COUNT],
    #[serde(default)]
    pub reasoning_steps: Vec<String>,
    pub villains: Vec<Villain>,
}

impl AnalysisResult {
    /// Parse and validate a verdict from the collaborator's JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Parse`] when the payload is not valid JSON,
    /// misses a required field, or carries out-of-range values. A partial
    /// verdict is never produced.
    pub fn from_json(payload: &str) -> Result<Self, AnalysisError> {
        let result: Self = serde_json::from_str(payload)
            .map_err(|error| AnalysisError::Parse(error.to_string()))?;
        result.validate()?;
        Ok(result)
    }

    /// Check value ranges that the type system does not already enforce.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Parse`] naming the first offending field.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.health_score > 100 {
            return Err(AnalysisError::Parse(format!(
                "healthScore {} is outside 0-100",
                self.health_score
            )));
        }
        if let Some(point) = self.radar_data.iter().find(|point| point.value > 100) {
            return Err(AnalysisError::Parse(format!(
                "radarData '{}' value {} is outside 0-100",
                point.subject, point.value
            )));
        }
        if let Some(insight) = self
            .insights
            .iter()
            .find(|insight| !(0.0..=100.0).contains(&insight.confidence))
        {
            return Err(AnalysisError::Parse(format!(
                "insight '{}' confidence {} is outside 0-100",
                insight.title, insight.confidence
            )));
        }
        Ok(())
    }

    /// Resolve a villain by case-insensitive name. First occurrence wins.
    #[must_use]
    pub fn villain_for(&self, name: &str) -> Option<&Villain> {
        let wanted = name.to_lowercase();
        self.villains
            .iter()
            .find(|villain| villain.name.to_lowercase() == wanted)
    }

    /// Free-text fields the term highlighter is applied to, labeled for display.
    #[must_use]
    pub fn free_text_fields(&self) -> Vec<(String, &str)> {
        let mut fields = vec![
            ("summary".to_string(), self.summary.as_str()),
            ("audioScript".to_string(), self.audio_script.as_str()),
            ("shareContent".to_string(), self.share_content.as_str()),
        ];
        if self.uncertainty.is_uncertain && !self.uncertainty.reason.is_empty() {
            fields.push(("uncertainty".to_string(), self.uncertainty.reason.as_str()));
        }
        for (index, pro) in self.tradeoffs.pros.iter().enumerate() {
            fields.push((format!("pros[{index}]"), pro.as_str()));
        }
        for (index, con) in self.tradeoffs.cons.iter().enumerate() {
            fields.push((format!("cons[{index}]"), con.as_str()));
        }
        for (index, insight) in self.insights.iter().enumerate() {
            fields.push((format!("insights[{index}]"), insight.description.as_str()));
        }
        for (index, step) in self.reasoning_steps.iter().enumerate() {
            fields.push((format!("reasoningSteps[{index}]"), step.as_str()));
        }
        fields
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A complete, valid collaborator payload.
    pub const VALID: &str = r#"{
        "summary": "Sweet snack bar with Corn Syrup and Maltodextrin.",
        "audioScript": "Heads up: this bar leans on corn syrup.",
        "shareContent": "Scanned a snack bar: 42/100.",
        "healthScore": 42,
        "dietaryClassification": "veg",
        "uncertainty": { "isUncertain": false, "reason": "" },
        "tradeoffs": { "pros": ["Quick energy"], "cons": ["High in Corn Syrup"] },
        "insights": [
            {
                "title": "Added sugars",
                "description": "Maltodextrin spikes blood sugar.",
                "category": "warning",
                "confidence": 85
            }
        ],
        "radarData": [
            { "subject": "Sugar", "value": 80 },
            { "subject": "Protein", "value": 20 },
            { "subject": "Fiber", "value": 10 },
            { "subject": "Additives", "value": 60 },
            { "subject": "Processing", "value": 70 }
        ],
        "reasoningSteps": ["Read label", "Flag sweeteners"],
        "villains": [
            { "name": "Corn Syrup", "explanation": "Refined sweetener." },
            { "name": "Maltodextrin", "explanation": "High glycemic filler." },
            { "name": "corn syrup", "explanation": "Duplicate entry." }
        ]
    }"#;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::fixtures::VALID;
    use super::*;
    use crate::errors::ErrorKind;

    fn payload_without(field: &str) -> String {
        let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
        value.as_object_mut().unwrap().remove(field);
        value.to_string()
    }

    #[test]
    fn parses_complete_payload() {
        let result = AnalysisResult::from_json(VALID).expect("valid payload");
        assert_eq!(result.health_score, 42);
        assert_eq!(result.dietary_classification, DietaryClass::Veg);
        assert_eq!(result.radar_data[0].subject, "Sugar");
        assert_eq!(result.insights[0].category, InsightCategory::Warning);
        assert_eq!(result.reasoning_steps.len(), 2);
    }

    #[test]
    fn reasoning_steps_are_optional() {
        let result = AnalysisResult::from_json(&payload_without("reasoningSteps")).unwrap();
        assert!(result.reasoning_steps.is_empty());
    }

    #[test]
    fn missing_required_field_is_parse_failure() {
        for field in [
            "summary",
            "audioScript",
            "shareContent",
            "healthScore",
            "insights",
            "radarData",
            "dietaryClassification",
            "tradeoffs",
            "uncertainty",
            "villains",
        ] {
            let err = AnalysisResult::from_json(&payload_without(field)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParseFailure, "field {field}");
        }
    }

    #[test]
    fn radar_data_must_have_exactly_five_entries() {
        let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
        value["radarData"].as_array_mut().unwrap().pop();
        let err = AnalysisResult::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn out_of_range_health_score_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
        value["healthScore"] = serde_json::json!(140);
        let err = AnalysisResult::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("healthScore"));
    }

    #[test]
    fn dietary_class_uses_hyphenated_wire_names() {
        let json = serde_json::to_string(&DietaryClass::NonVeg).unwrap();
        assert_eq!(json, "\"non-veg\"");
        let parsed: DietaryClass = serde_json::from_str("\"vegan\"").unwrap();
        assert_eq!(parsed, DietaryClass::Vegan);
    }

    #[test]
    fn villain_lookup_is_case_insensitive_first_wins() {
        let result = AnalysisResult::from_json(VALID).unwrap();
        let villain = result.villain_for("CORN SYRUP").expect("villain");
        assert_eq!(villain.explanation, "Refined sweetener.");
        assert!(result.villain_for("Palm Oil").is_none());
    }

    #[test]
    fn free_text_fields_cover_every_prose_field() {
        let result = AnalysisResult::from_json(VALID).unwrap();
        let labels = result
            .free_text_fields()
            .into_iter()
            .map(|(label, _)| label)
            .collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![
                "summary",
                "audioScript",
                "shareContent",
                "pros[0]",
                "cons[0]",
                "insights[0]",
                "reasoningSteps[0]",
                "reasoningSteps[1]",
            ]
        );
    }
}
