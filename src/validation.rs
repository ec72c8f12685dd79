use crate::errors::{AppError, AppResult};
use crate::models::{Topic, TopicSet};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::Value;

static TOPIC_SET_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::json!({
        "type": "object",
        "properties": {
            "tcs": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "code": { "type": "string", "minLength": 1 },
                        "name": { "type": "string" },
                        "items": { "type": "array", "items": { "type": "string" } },
                        "keywords": { "type": "string" }
                    },
                    "required": ["code", "name", "items"]
                }
            }
        },
        "required": ["tcs"]
    })
});

static TOPIC_SET_VALIDATOR: Lazy<JSONSchema> =
    Lazy::new(|| JSONSchema::compile(&TOPIC_SET_SCHEMA).expect("valid topic set schema"));

/// Parses a `{ "tcs": [...] }` document, rejecting payloads that do not match the topic shape.
pub fn decode_topic_set(raw: &str) -> AppResult<Vec<Topic>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Deserialization("topic set document is empty".to_string()));
    }

    let value: Value = serde_json::from_str(trimmed)?;
    let errors = schema_errors(&value);
    if !errors.is_empty() {
        return Err(AppError::Deserialization(format!(
            "topic set did not match schema: {}",
            errors.join("; ")
        )));
    }

    let set: TopicSet = serde_json::from_value(value)?;
    Ok(set.tcs)
}

pub fn encode_topic_set(topics: &[Topic]) -> AppResult<String> {
    let set = TopicSet {
        tcs: topics.to_vec(),
    };
    serde_json::to_string(&set).map_err(|error| AppError::Internal(error.to_string()))
}

fn schema_errors(value: &Value) -> Vec<String> {
    TOPIC_SET_VALIDATOR
        .validate(value)
        .err()
        .map(|errors| {
            errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    if path.is_empty() {
                        error.to_string()
                    } else {
                        format!("{}: {}", path, error)
                    }
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}
