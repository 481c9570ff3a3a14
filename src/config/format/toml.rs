use ::toml::{Table, Value};

use super::raw::{is_unknown_key, RawConfig};
use super::FormatParser;
use crate::config::error::SyntaxError;
use crate::config::model::{Extra, NAMESPACE};

pub struct TomlParser;

impl FormatParser for TomlParser {
    type Tree = Value;

    fn decode_tree(text: &str) -> Result<Value, SyntaxError> {
        let table: Table = text.parse()?;
        Ok(Value::Table(table))
    }

    fn select_namespace(root: Value) -> Value {
        match root {
            Value::Table(mut table) => match table.remove(NAMESPACE) {
                Some(node) => node,
                None => Value::Table(table),
            },
            other => other,
        }
    }

    fn decode_record(node: &Value) -> Result<RawConfig, SyntaxError> {
        Ok(node.clone().try_into()?)
    }

    fn unknown_keys(node: &Value) -> Extra {
        let Value::Table(table) = node else {
            return Extra::new();
        };
        table
            .iter()
            .filter(|(key, _)| is_unknown_key(key))
            .map(|(key, value)| (key.clone(), to_json(value)))
            .collect()
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Table(table) => serde_json::Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_empty_config() {
        let config = TomlParser::parse("").unwrap();
        assert!(config.output_dir.is_empty());
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_unknown_keys_keep_datetimes_as_strings() {
        let config = TomlParser::parse(
            "[markata-go]\npublished = 1979-05-27T07:32:00Z\nratio = 0.5\n",
        )
        .unwrap();
        assert_eq!(config.extra["published"], "1979-05-27T07:32:00Z");
        assert_eq!(config.extra["ratio"], 0.5);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        assert!(matches!(
            TomlParser::parse("[markata-go\nurl = 1"),
            Err(SyntaxError::Toml(_))
        ));
    }
}
