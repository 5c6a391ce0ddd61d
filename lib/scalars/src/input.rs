/// A raw input value as handed over by the schema engine, before scalar coercion.
///
/// Numbers can arrive in three shapes depending on where they came from: a native
/// integer parsed from a query literal, a 64-bit integer from a decoded variable, or
/// an unparsed decimal token that crossed a textual boundary (a request body decoded
/// with arbitrary precision, for example).
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Null,
    Boolean(bool),
    Int(i32),
    Int64(i64),
    Float(f64),
    /// Decimal number token, kept as text.
    Number(String),
    String(String),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

impl InputValue {
    /// Name of the runtime kind, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            InputValue::Null => "null",
            InputValue::Boolean(_) => "boolean",
            InputValue::Int(_) => "int",
            InputValue::Int64(_) => "int64",
            InputValue::Float(_) => "float",
            InputValue::Number(_) => "number",
            InputValue::String(_) => "string",
            InputValue::List(_) => "list",
            InputValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, InputValue::Null)
    }
}

impl From<serde_json::Value> for InputValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => InputValue::Null,
            serde_json::Value::Bool(b) => InputValue::Boolean(b),
            serde_json::Value::Number(number) => {
                if let Some(i) = number.as_i64() {
                    InputValue::Int64(i)
                } else if number.is_f64() {
                    number
                        .as_f64()
                        .map(InputValue::Float)
                        .unwrap_or_else(|| InputValue::Number(number.to_string()))
                } else {
                    // u64 above i64::MAX
                    InputValue::Number(number.to_string())
                }
            }
            serde_json::Value::String(s) => InputValue::String(s),
            serde_json::Value::Array(items) => {
                InputValue::List(items.into_iter().map(InputValue::from).collect())
            }
            serde_json::Value::Object(map) => InputValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, InputValue::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InputValue;
    use serde_json::json;

    #[test]
    fn converts_json_numbers_by_shape() {
        assert_eq!(InputValue::from(json!(42)), InputValue::Int64(42));
        assert_eq!(InputValue::from(json!(-7)), InputValue::Int64(-7));
        assert_eq!(InputValue::from(json!(1.5)), InputValue::Float(1.5));
        assert_eq!(
            InputValue::from(json!(u64::MAX)),
            InputValue::Number("18446744073709551615".to_string())
        );
    }

    #[test]
    fn converts_nested_json() {
        let value = InputValue::from(json!({ "ids": [1, null], "name": "x" }));
        let InputValue::Object(entries) = value else {
            panic!("expected an object");
        };
        assert!(entries.contains(&(
            "ids".to_string(),
            InputValue::List(vec![InputValue::Int64(1), InputValue::Null])
        )));
        assert!(entries.contains(&("name".to_string(), InputValue::String("x".to_string()))));
    }

    #[test]
    fn reports_kind_names() {
        assert_eq!(InputValue::Null.kind(), "null");
        assert_eq!(InputValue::Number("1".into()).kind(), "number");
        assert_eq!(InputValue::Object(vec![]).kind(), "object");
        assert!(InputValue::Null.is_null());
        assert!(!InputValue::Boolean(false).is_null());
    }
}
