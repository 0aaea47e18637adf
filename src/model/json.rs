// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON document host
//!
//! A ready-made [`Context`] over a `serde_json::Value` document. JSON objects
//! and arrays are exposed as object handles, scalars as plain values. It
//! backs the command line tool and is a compact reference for writing a
//! host integration.

use serde_json::Value as JsonValue;

use super::context::{Context, HostResult};
use super::object::ObjectRef;
use super::value::Value;

/// Object handle payload for JSON objects and arrays
#[derive(Debug, Clone, PartialEq)]
pub struct JsonNode(pub JsonValue);

/// Context that resolves variables against the fields of a JSON object
///
/// Supported methods on objects and arrays: `len()`, `has(key)` and `keys()`.
/// Indexing accepts integer positions for arrays and string keys for
/// objects; several indices navigate successively, so `a[0, "name"]` is
/// `a[0]["name"]`.
#[derive(Debug, Clone)]
pub struct JsonContext {
    root: JsonValue,
}

impl JsonContext {
    /// Create a context over a JSON document
    pub fn new(root: JsonValue) -> Self {
        Self { root }
    }

    /// Parse a JSON document and create a context over it
    pub fn from_json_str(text: &str) -> HostResult<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    /// The underlying document
    pub fn root(&self) -> &JsonValue {
        &self.root
    }
}

impl Default for JsonContext {
    fn default() -> Self {
        Self::new(JsonValue::Object(serde_json::Map::new()))
    }
}

impl Context for JsonContext {
    fn get_var(&self, obj: Option<&ObjectRef>, name: &str) -> HostResult<Value> {
        let target = match obj {
            None => &self.root,
            Some(handle) => match handle.downcast_ref::<JsonNode>() {
                Some(node) => &node.0,
                None => return Ok(Value::Unknown),
            },
        };
        Ok(target.get(name).map_or(Value::Unknown, from_json))
    }

    fn call(&self, obj: Option<&ObjectRef>, name: &str, args: &[Value]) -> HostResult<Value> {
        let Some(node) = obj.and_then(|handle| handle.downcast_ref::<JsonNode>()) else {
            return Ok(Value::Unknown);
        };
        let result = match (name, args) {
            ("len", []) => match &node.0 {
                JsonValue::Array(items) => Value::Int(items.len() as i64),
                JsonValue::Object(fields) => Value::Int(fields.len() as i64),
                _ => Value::Unknown,
            },
            ("has", [Value::String(key)]) => match &node.0 {
                JsonValue::Object(fields) => Value::Bool(fields.contains_key(key)),
                _ => Value::Bool(false),
            },
            ("keys", []) => match &node.0 {
                JsonValue::Object(fields) => {
                    let keys = fields.keys().cloned().map(JsonValue::String).collect();
                    Value::object(JsonNode(JsonValue::Array(keys)))
                }
                _ => Value::Unknown,
            },
            _ => Value::Unknown,
        };
        Ok(result)
    }

    fn get_by_index(&self, obj: &ObjectRef, indices: &[Value]) -> HostResult<Value> {
        let Some(node) = obj.downcast_ref::<JsonNode>() else {
            return Ok(Value::Unknown);
        };
        let mut current = &node.0;
        for index in indices {
            let next = match (current, index) {
                (JsonValue::Array(items), Value::Int(i)) => {
                    usize::try_from(*i).ok().and_then(|i| items.get(i))
                }
                (JsonValue::Object(fields), Value::String(key)) => fields.get(key),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Ok(Value::Unknown),
            }
        }
        Ok(from_json(current))
    }

    fn dump(&self) -> String {
        serde_json::to_string_pretty(&self.root).unwrap_or_else(|_| self.root.to_string())
    }
}

/// Convert a JSON value into a formula value
///
/// Objects and arrays become [`JsonNode`] handles.
pub fn from_json(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Unknown, Value::Float),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::object(JsonNode(value.clone())),
    }
}

/// Convert a formula value into JSON
///
/// `Unknown` and non-finite floats map to `null`; foreign object handles are
/// rendered as their string form.
pub fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Unknown | Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Object(handle) => match handle.downcast_ref::<JsonNode>() {
            Some(node) => node.0.clone(),
            None => JsonValue::String(value.to_string()),
        },
    }
}
