use serde_yaml::Value;

use super::raw::{is_unknown_key, RawConfig};
use super::FormatParser;
use crate::config::error::SyntaxError;
use crate::config::model::{Extra, NAMESPACE};

pub struct YamlParser;

impl FormatParser for YamlParser {
    type Tree = Value;

    fn decode_tree(text: &str) -> Result<Value, SyntaxError> {
        Ok(serde_yaml::from_str(text)?)
    }

    fn select_namespace(root: Value) -> Value {
        match root {
            Value::Mapping(mut mapping) => match mapping.remove(NAMESPACE) {
                Some(node) => node,
                None => Value::Mapping(mapping),
            },
            other => other,
        }
    }

    fn decode_record(node: &Value) -> Result<RawConfig, SyntaxError> {
        // `markata-go:` with nothing under it, or an empty document.
        if node.is_null() {
            return Ok(RawConfig::default());
        }
        Ok(serde_yaml::from_value(node.clone())?)
    }

    fn unknown_keys(node: &Value) -> Extra {
        let Value::Mapping(mapping) = node else {
            return Extra::new();
        };
        mapping
            .iter()
            .filter_map(|(key, value)| {
                let key = key.as_str()?;
                is_unknown_key(key).then(|| (key.to_string(), to_json(value)))
            })
            .collect()
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Mapping(mapping) => serde_json::Value::Object(
            mapping
                .iter()
                .map(|(k, v)| (key_string(k), to_json(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => to_json(&tagged.value),
    }
}

fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
