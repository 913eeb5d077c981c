#![forbid(unsafe_code)]

//! Raw directive values as they arrive from templates.
//!
//! A directive's value is loosely typed: a bare message key, a
//! `{msg, params}` record, or a parameter list. [`BindingValue`] makes the
//! shapes explicit so the parser can match on them exhaustively.

use lingo_i18n::Param;
use serde_json::Value;

/// The parameter part of a `{msg, params}` record.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsValue {
    /// A single scalar; normalized to a one-element list.
    One(Param),
    Many(Vec<Param>),
}

/// A raw directive value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BindingValue {
    /// No value (`v-i18n:key` without `=`, or an explicit null).
    #[default]
    Null,
    /// A literal message key.
    Key(String),
    /// `{ msg: "key", params: [..] }`.
    Record {
        msg: Option<String>,
        params: Option<ParamsValue>,
    },
    /// `[..]`: parameters for a key given as the directive argument.
    List(Vec<Param>),
}

impl BindingValue {
    /// A bare message key.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// A `{msg, params}` record.
    #[must_use]
    pub fn record<P: Into<Param>>(
        msg: impl Into<String>,
        params: impl IntoIterator<Item = P>,
    ) -> Self {
        Self::Record {
            msg: Some(msg.into()),
            params: Some(ParamsValue::Many(
                params.into_iter().map(Into::into).collect(),
            )),
        }
    }

    /// A parameter list.
    #[must_use]
    pub fn list<P: Into<Param>>(params: impl IntoIterator<Item = P>) -> Self {
        Self::List(params.into_iter().map(Into::into).collect())
    }

    /// Convert a loosely typed template value.
    ///
    /// | JSON | Value |
    /// |------|-------|
    /// | `null` | `Null` |
    /// | string | `Key` |
    /// | number, bool | `Key` of its display form |
    /// | array | `List` |
    /// | object | `Record` from `msg` and `params`; other fields ignored |
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(s) => Self::Key(s.clone()),
            Value::Number(n) => Self::Key(n.to_string()),
            Value::Bool(b) => Self::Key(b.to_string()),
            Value::Array(items) => Self::List(items.iter().map(param_from_json).collect()),
            Value::Object(map) => Self::Record {
                msg: map.get("msg").and_then(json_key),
                params: map.get("params").and_then(|params| match params {
                    Value::Null => None,
                    Value::Array(items) => Some(ParamsValue::Many(
                        items.iter().map(param_from_json).collect(),
                    )),
                    scalar => Some(ParamsValue::One(param_from_json(scalar))),
                }),
            },
        }
    }
}

impl From<&str> for BindingValue {
    fn from(value: &str) -> Self {
        Self::Key(value.to_owned())
    }
}

impl From<String> for BindingValue {
    fn from(value: String) -> Self {
        Self::Key(value)
    }
}

impl From<Vec<Param>> for BindingValue {
    fn from(value: Vec<Param>) -> Self {
        Self::List(value)
    }
}

impl From<&Value> for BindingValue {
    fn from(value: &Value) -> Self {
        Self::from_json(value)
    }
}

fn json_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Scalars map onto their `Param` variant; nested arrays and objects are
/// passed as their JSON text.
fn param_from_json(value: &Value) -> Param {
    match value {
        Value::String(s) => Param::Text(s.clone()),
        Value::Bool(b) => Param::Bool(*b),
        Value::Number(n) => n
            .as_i64()
            .map(Param::Int)
            .or_else(|| n.as_f64().map(Param::Float))
            .unwrap_or_else(|| Param::Text(n.to_string())),
        Value::Null => Param::Text(String::new()),
        other => Param::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_string_is_key() {
        assert_eq!(
            BindingValue::from_json(&json!("hello_world")),
            BindingValue::key("hello_world")
        );
    }

    #[test]
    fn json_object_is_record() {
        assert_eq!(
            BindingValue::from_json(&json!({"msg": "search_results", "params": [10]})),
            BindingValue::record("search_results", [10])
        );
    }

    #[test]
    fn json_object_scalar_params() {
        assert_eq!(
            BindingValue::from_json(&json!({"msg": "greet", "params": "Alice"})),
            BindingValue::Record {
                msg: Some("greet".into()),
                params: Some(ParamsValue::One(Param::from("Alice"))),
            }
        );
    }

    #[test]
    fn json_object_ignores_unknown_fields() {
        assert_eq!(
            BindingValue::from_json(&json!({"msg": "k", "format": "html", "params": null})),
            BindingValue::Record {
                msg: Some("k".into()),
                params: None,
            }
        );
    }

    #[test]
    fn json_object_without_msg() {
        assert_eq!(
            BindingValue::from_json(&json!({"params": [1]})),
            BindingValue::Record {
                msg: None,
                params: Some(ParamsValue::Many(vec![Param::Int(1)])),
            }
        );
    }

    #[test]
    fn json_array_is_list() {
        assert_eq!(
            BindingValue::from_json(&json!(["Alice", 2, 2.5, true, null])),
            BindingValue::List(vec![
                Param::from("Alice"),
                Param::Int(2),
                Param::Float(2.5),
                Param::Bool(true),
                Param::Text(String::new()),
            ])
        );
    }

    #[test]
    fn json_null_and_scalars() {
        assert_eq!(BindingValue::from_json(&json!(null)), BindingValue::Null);
        assert_eq!(BindingValue::from_json(&json!(42)), BindingValue::key("42"));
        assert_eq!(
            BindingValue::from_json(&json!(false)),
            BindingValue::key("false")
        );
    }

    #[test]
    fn nested_param_is_json_text() {
        assert_eq!(
            BindingValue::from_json(&json!([[1, 2]])),
            BindingValue::List(vec![Param::Text("[1,2]".into())])
        );
    }
}
