//! `generateContent` request body and the structured-output schema.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use lens_core::InputUnit;
use serde::Serialize;
use serde_json::{Value, json};

/// Task prompt sent with every captured frame.
const IMAGE_PROMPT: &str = "Analyze the product or ingredient label in this image. \
Return the verdict as JSON matching the response schema. List every concerning \
ingredient in `villains`, using the exact ingredient name as it appears in your \
own text fields.";

/// Task prompt sent ahead of free text.
const TEXT_PROMPT: &str = "Analyze the following ingredient list or product \
description. Return the verdict as JSON matching the response schema. List every \
concerning ingredient in `villains`, using the exact ingredient name as it appears \
in your own text fields.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: &'static str,
    pub response_schema: Value,
    pub temperature: f32,
}

impl GenerateRequest {
    /// Build the request for one captured unit under an optional persona
    /// instruction fragment.
    #[must_use]
    pub fn build(unit: &InputUnit, instruction: Option<&str>) -> Self {
        let parts = match unit {
            InputUnit::Image(image) => vec![
                Part::InlineData(InlineData {
                    mime_type: image.mime_type.clone(),
                    data: BASE64.encode(&image.bytes),
                }),
                Part::Text(IMAGE_PROMPT.to_string()),
            ],
            InputUnit::Text { content } => vec![
                Part::Text(TEXT_PROMPT.to_string()),
                Part::Text(content.clone()),
            ],
        };

        Self {
            system_instruction: instruction
                .filter(|fragment| !fragment.trim().is_empty())
                .map(|fragment| Content {
                    role: None,
                    parts: vec![Part::Text(fragment.to_string())],
                }),
            contents: vec![Content {
                role: Some("user"),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature: 0.2,
            },
        }
    }
}

/// OpenAPI-subset schema for the verdict, mirroring `AnalysisResult`.
#[must_use]
pub fn response_schema() -> Value {
    let string = json!({ "type": "STRING" });
    let strings = json!({ "type": "ARRAY", "items": { "type": "STRING" } });

    json!({
        "type": "OBJECT",
        "properties": {
            "summary": string,
            "audioScript": string,
            "shareContent": string,
            "healthScore": { "type": "INTEGER", "minimum": 0, "maximum": 100 },
            "dietaryClassification": {
                "type": "STRING",
                "enum": ["veg", "non-veg", "vegan", "unknown"]
            },
            "uncertainty": {
                "type": "OBJECT",
                "properties": {
                    "isUncertain": { "type": "BOOLEAN" },
                    "reason": string
                },
                "required": ["isUncertain", "reason"]
            },
            "tradeoffs": {
                "type": "OBJECT",
                "properties": { "pros": strings, "cons": strings },
                "required": ["pros", "cons"]
            },
            "insights": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": string,
                        "description": string,
                        "category": {
                            "type": "STRING",
                            "enum": ["positive", "warning", "critical", "neutral"]
                        },
                        "confidence": { "type": "NUMBER", "minimum": 0, "maximum": 100 }
                    },
                    "required": ["title", "description", "category", "confidence"]
                }
            },
            "radarData": {
                "type": "ARRAY",
                "minItems": 5,
                "maxItems": 5,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "subject": string,
                        "value": { "type": "INTEGER", "minimum": 0, "maximum": 100 }
                    },
                    "required": ["subject", "value"]
                }
            },
            "reasoningSteps": strings,
            "villains": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": { "name": string, "explanation": string },
                    "required": ["name", "explanation"]
                }
            }
        },
        "required": [
            "summary",
            "audioScript",
            "shareContent",
            "healthScore",
            "insights",
            "radarData",
            "dietaryClassification",
            "tradeoffs",
            "uncertainty",
            "villains"
        ]
    })
}
