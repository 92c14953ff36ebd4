//! SQL parameter and column values.

/// A database value that can be used as a parameter or read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Integer value.
    Integer(i64),
    /// Real/float value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// Try to get the value as an i64.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get the value as a string. Blobs holding UTF-8 are accepted.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Blob(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<&Value> for spin_sdk::sqlite::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => spin_sdk::sqlite::Value::Null,
            Value::Integer(i) => spin_sdk::sqlite::Value::Integer(*i),
            Value::Real(f) => spin_sdk::sqlite::Value::Real(*f),
            Value::Text(s) => spin_sdk::sqlite::Value::Text(s.clone()),
            Value::Blob(b) => spin_sdk::sqlite::Value::Blob(b.clone()),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<&spin_sdk::sqlite::Value> for Value {
    fn from(v: &spin_sdk::sqlite::Value) -> Self {
        match v {
            spin_sdk::sqlite::Value::Null => Value::Null,
            spin_sdk::sqlite::Value::Integer(i) => Value::Integer(*i),
            spin_sdk::sqlite::Value::Real(f) => Value::Real(*f),
            spin_sdk::sqlite::Value::Text(s) => Value::Text(s.clone()),
            spin_sdk::sqlite::Value::Blob(b) => Value::Blob(b.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        let none: Option<String> = None;
        assert!(Value::from(none).is_null());
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn test_text_from_blob() {
        let v = Value::Blob(b"[]".to_vec());
        assert_eq!(v.as_text(), Some("[]"));
        assert_eq!(Value::Integer(3).as_text(), None);
    }

    #[test]
    fn test_params_macro() {
        let params: &[Value] = crate::params!["cart-1", 42i64, None::<String>];
        assert_eq!(params.len(), 3);
        assert_eq!(params[1].as_integer(), Some(42));
        assert!(params[2].is_null());
    }
}
