//! Typed access to request parameters.
//!
//! Parameters arrive as a flat JSON object. Handlers pull each field out
//! with a typed getter; a missing required field or a value of the wrong
//! JSON type is a [`ParameterError`], never a silent default. Only the
//! `optional_*` getters substitute a default, and only when the field is
//! absent or `null`.

use crate::error::ParameterError;
use serde_json::{Map, Value};

const STRING: &str = "a string";
const INTEGER: &str = "an integer";
const BOOLEAN: &str = "a boolean";
const STRING_LIST: &str = "a list of strings";
const OBJECT: &str = "an object";

type Result<T> = std::result::Result<T, ParameterError>;

/// Borrowed view over a request's parameter object.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Params<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// Present and not `null`.
    fn get(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name).filter(|v| !v.is_null())
    }

    fn required(&self, name: &str) -> Result<&'a Value> {
        self.get(name)
            .ok_or_else(|| ParameterError::Missing(name.to_string()))
    }

    fn wrong_type(name: &str, expected: &'static str) -> ParameterError {
        ParameterError::WrongType {
            name: name.to_string(),
            expected,
        }
    }

    pub fn required_str(&self, name: &str) -> Result<&'a str> {
        self.required(name)?
            .as_str()
            .ok_or_else(|| Self::wrong_type(name, STRING))
    }

    pub fn required_i64(&self, name: &str) -> Result<i64> {
        self.required(name)?
            .as_i64()
            .ok_or_else(|| Self::wrong_type(name, INTEGER))
    }

    pub fn required_i32(&self, name: &str) -> Result<i32> {
        let value = self.required_i64(name)?;
        narrow(name, value)
    }

    pub fn required_u16(&self, name: &str) -> Result<u16> {
        let value = self.required_i64(name)?;
        narrow(name, value)
    }

    pub fn required_bool(&self, name: &str) -> Result<bool> {
        self.required(name)?
            .as_bool()
            .ok_or_else(|| Self::wrong_type(name, BOOLEAN))
    }

    pub fn optional_str(&self, name: &str, default: &'a str) -> Result<&'a str> {
        match self.get(name) {
            None => Ok(default),
            Some(v) => v.as_str().ok_or_else(|| Self::wrong_type(name, STRING)),
        }
    }

    pub fn optional_i32(&self, name: &str, default: i32) -> Result<i32> {
        match self.get(name) {
            None => Ok(default),
            Some(_) => self.required_i32(name),
        }
    }

    pub fn optional_bool(&self, name: &str, default: bool) -> Result<bool> {
        match self.get(name) {
            None => Ok(default),
            Some(v) => v.as_bool().ok_or_else(|| Self::wrong_type(name, BOOLEAN)),
        }
    }

    pub fn str_list(&self, name: &str) -> Result<Vec<String>> {
        let items = self
            .required(name)?
            .as_array()
            .ok_or_else(|| Self::wrong_type(name, STRING_LIST))?;
        items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Self::wrong_type(name, STRING_LIST))
            })
            .collect()
    }

    /// Like [`Params::str_list`], but absent means empty.
    pub fn optional_str_list(&self, name: &str) -> Result<Vec<String>> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(_) => self.str_list(name),
        }
    }

    pub fn object(&self, name: &str) -> Result<&'a Map<String, Value>> {
        self.required(name)?
            .as_object()
            .ok_or_else(|| Self::wrong_type(name, OBJECT))
    }
}

fn narrow<T: TryFrom<i64>>(name: &str, value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| ParameterError::OutOfRange {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_required_missing_and_null() {
        let m = map(json!({ "ccid": null }));
        let p = Params::new(&m);
        assert_eq!(
            p.required_str("ccid"),
            Err(ParameterError::Missing("ccid".into()))
        );
        assert_eq!(
            p.required_str("other"),
            Err(ParameterError::Missing("other".into()))
        );
    }

    #[test]
    fn test_wrong_type() {
        let m = map(json!({ "quiet": "yes", "ccid": 4 }));
        let p = Params::new(&m);
        assert!(matches!(
            p.required_i32("quiet"),
            Err(ParameterError::WrongType { expected: "an integer", .. })
        ));
        assert!(matches!(
            p.required_str("ccid"),
            Err(ParameterError::WrongType { expected: "a string", .. })
        ));
    }

    #[test]
    fn test_narrowing_out_of_range() {
        let m = map(json!({ "sid": 70000, "x": -5 }));
        let p = Params::new(&m);
        assert!(matches!(
            p.required_u16("sid"),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert_eq!(p.required_i32("x"), Ok(-5));
    }

    #[test]
    fn test_optional_defaults_only_when_absent() {
        let m = map(json!({ "trickplay": 1 }));
        let p = Params::new(&m);
        assert_eq!(p.optional_i32("quiet", 0), Ok(0));
        assert!(p.optional_bool("trickplay", false).is_err());
        assert_eq!(p.optional_str_list("otherKeys"), Ok(Vec::new()));
    }

    #[test]
    fn test_str_list_rejects_mixed_items() {
        let m = map(json!({ "keys": ["a", 1] }));
        let p = Params::new(&m);
        assert!(p.str_list("keys").is_err());
    }
}
