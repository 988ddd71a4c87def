use crate::error::MalformedResponse;

use serde_json::{Map, Value};

/// What a record parser does when an optional key is not in the object at all.
///
/// A key that is present with the value `null` always reads as absent. A key
/// that is present with the wrong JSON type is always an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// A missing optional key reads as absent. Responses narrowed with
    /// `elements=` or `include=` omit keys, so this is the default.
    #[default]
    Lenient,
    /// Every modeled key must be present, possibly as `null`.
    Strict,
}

/// Typed, null-safe view over one JSON object of the response.
///
/// `path` names the object inside the document (`days[3].hours[12]`) so that
/// every error can be traced back to a single field.
pub struct Fields<'a> {
    obj: &'a Map<String, Value>,
    path: String,
    policy: KeyPolicy,
}

impl<'a> Fields<'a> {
    pub fn new(obj: &'a Map<String, Value>, path: String, policy: KeyPolicy) -> Fields<'a> {
        Fields { obj, path, policy }
    }

    /// Wrap a value that must be a JSON object
    pub fn of(value: &'a Value, path: String, policy: KeyPolicy) -> Result<Fields<'a>, MalformedResponse> {
        match value.as_object() {
            Some(obj) => Ok(Fields::new(obj, path, policy)),
            None => Err(MalformedResponse::NotAnObject { path }),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// Look a key up. `Ok(None)` means JSON null, or a missing key under
    /// [`KeyPolicy::Lenient`].
    fn value(&self, key: &str) -> Result<Option<&'a Value>, MalformedResponse> {
        match self.obj.get(key) {
            Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(value)),
            None => match self.policy {
                KeyPolicy::Lenient => Ok(None),
                KeyPolicy::Strict => Err(self.missing(key)),
            },
        }
    }

    /// Look up a key that has to be there and has to be non-null, whatever the policy.
    fn required(&self, key: &str) -> Result<&'a Value, MalformedResponse> {
        match self.obj.get(key) {
            Some(Value::Null) => Err(MalformedResponse::NullValue {
                path: self.path.clone(),
                key: key.to_string(),
            }),
            Some(value) => Ok(value),
            None => Err(self.missing(key)),
        }
    }

    fn missing(&self, key: &str) -> MalformedResponse {
        MalformedResponse::MissingKey {
            path: self.path.clone(),
            key: key.to_string(),
        }
    }

    fn wrong_type(&self, key: &str, expected: &'static str) -> MalformedResponse {
        MalformedResponse::WrongType {
            path: self.path.clone(),
            key: key.to_string(),
            expected,
        }
    }

    pub fn f64_or_null(&self, key: &str) -> Result<Option<f64>, MalformedResponse> {
        self.value(key)?
            .map(|v| self.to_f64(key, v))
            .transpose()
    }

    pub fn str_or_null(&self, key: &str) -> Result<Option<String>, MalformedResponse> {
        self.value(key)?
            .map(|v| self.to_str(key, v).map(str::to_string))
            .transpose()
    }

    pub fn i64_or_null(&self, key: &str) -> Result<Option<i64>, MalformedResponse> {
        self.value(key)?
            .map(|v| self.to_i64(key, v))
            .transpose()
    }

    pub fn i32_or_null(&self, key: &str) -> Result<Option<i32>, MalformedResponse> {
        self.value(key)?
            .map(|v| self.to_i32(key, v))
            .transpose()
    }

    /// A JSON array of strings, in order. A null array is absent, not empty.
    pub fn strings_or_null(&self, key: &str) -> Result<Option<Vec<String>>, MalformedResponse> {
        let Some(items) = self.array_or_null(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.wrong_type(&format!("{key}[{i}]"), "string"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub fn array_or_null(&self, key: &str) -> Result<Option<&'a Vec<Value>>, MalformedResponse> {
        self.value(key)?
            .map(|v| v.as_array().ok_or_else(|| self.wrong_type(key, "array")))
            .transpose()
    }

    pub fn object_or_null(&self, key: &str) -> Result<Option<&'a Map<String, Value>>, MalformedResponse> {
        self.value(key)?
            .map(|v| v.as_object().ok_or_else(|| self.wrong_type(key, "object")))
            .transpose()
    }

    pub fn required_f64(&self, key: &str) -> Result<f64, MalformedResponse> {
        self.to_f64(key, self.required(key)?)
    }

    pub fn required_str(&self, key: &str) -> Result<&'a str, MalformedResponse> {
        self.to_str(key, self.required(key)?)
    }

    pub fn required_i64(&self, key: &str) -> Result<i64, MalformedResponse> {
        self.to_i64(key, self.required(key)?)
    }

    pub fn required_array(&self, key: &str) -> Result<&'a Vec<Value>, MalformedResponse> {
        self.required(key)?
            .as_array()
            .ok_or_else(|| self.wrong_type(key, "array"))
    }

    fn to_f64(&self, key: &str, value: &Value) -> Result<f64, MalformedResponse> {
        value.as_f64().ok_or_else(|| self.wrong_type(key, "number"))
    }

    fn to_str<'v>(&self, key: &str, value: &'v Value) -> Result<&'v str, MalformedResponse> {
        value.as_str().ok_or_else(|| self.wrong_type(key, "string"))
    }

    fn to_i64(&self, key: &str, value: &Value) -> Result<i64, MalformedResponse> {
        value.as_i64().ok_or_else(|| self.wrong_type(key, "64-bit integer"))
    }

    fn to_i32(&self, key: &str, value: &Value) -> Result<i32, MalformedResponse> {
        value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| self.wrong_type(key, "32-bit integer"))
    }
}
