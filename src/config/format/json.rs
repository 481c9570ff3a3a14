use serde::Deserialize;
use serde_json::Value;

use super::raw::{is_unknown_key, RawConfig};
use super::FormatParser;
use crate::config::error::SyntaxError;
use crate::config::model::{Extra, NAMESPACE};

pub struct JsonParser;

impl FormatParser for JsonParser {
    type Tree = Value;

    fn decode_tree(text: &str) -> Result<Value, SyntaxError> {
        Ok(serde_json::from_str(text)?)
    }

    fn select_namespace(root: Value) -> Value {
        match root {
            Value::Object(mut object) => match object.remove(NAMESPACE) {
                Some(node) => node,
                None => Value::Object(object),
            },
            other => other,
        }
    }

    fn decode_record(node: &Value) -> Result<RawConfig, SyntaxError> {
        if node.is_null() {
            return Ok(RawConfig::default());
        }
        Ok(RawConfig::deserialize(node)?)
    }

    fn unknown_keys(node: &Value) -> Extra {
        let Value::Object(object) = node else {
            return Extra::new();
        };
        object
            .iter()
            .filter(|(key, _)| is_unknown_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
