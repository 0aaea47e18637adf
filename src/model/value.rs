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

//! Core value type for formula expressions

use std::cmp::Ordering;
use std::fmt;

use super::object::ObjectRef;

/// Universal operand and result type of the formula engine
///
/// Every literal, variable, operator result and host answer is a `Value`.
/// Operations that have no rule for a given combination of variants produce
/// [`Value::Unknown`] instead of failing.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Result of an unsupported operation or an unresolved lookup
    #[default]
    Unknown,
    /// Explicit absence of a value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit signed)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Handle to a host object
    Object(ObjectRef),
}

/// Both operands of a numeric operation after promotion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericPair {
    /// Both operands were integers
    Ints(i64, i64),
    /// At least one operand was a float, both promoted
    Floats(f64, f64),
}

impl Value {
    /// Create a string value
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Create an object value from a host object
    pub fn object<T: std::any::Any + Send + Sync>(value: T) -> Self {
        Self::Object(ObjectRef::new(value))
    }

    /// Truthiness used by `!`, `&&` and `||`
    ///
    /// Unknown, Null, `false`, `0`, `0.0` and `""` are false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Unknown | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Object(_) => true,
        }
    }

    /// Check for [`Value::Unknown`]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Check for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check whether the value is an Int or a Float
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::Object(_) => "Object",
        }
    }

    /// Get the boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get a numeric value as f64, promoting integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the object handle
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Promote a pair of operands for arithmetic and comparison
    pub fn numeric_pair(left: &Value, right: &Value) -> Option<NumericPair> {
        match (left, right) {
            (Self::Int(l), Self::Int(r)) => Some(NumericPair::Ints(*l, *r)),
            (Self::Int(l), Self::Float(r)) => Some(NumericPair::Floats(*l as f64, *r)),
            (Self::Float(l), Self::Int(r)) => Some(NumericPair::Floats(*l, *r as f64)),
            (Self::Float(l), Self::Float(r)) => Some(NumericPair::Floats(*l, *r)),
            _ => None,
        }
    }

    /// Equality used by the `==` operator
    ///
    /// Same as `PartialEq` except that Int and Float operands are compared numerically.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match Self::numeric_pair(self, other) {
            Some(NumericPair::Ints(l, r)) => l == r,
            Some(NumericPair::Floats(l, r)) => l == r,
            None => self == other,
        }
    }

    /// Ordering used by `<`, `<=`, `>` and `>=`
    ///
    /// Defined for numeric pairs and for two strings; `None` otherwise.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match Self::numeric_pair(self, other) {
            Some(NumericPair::Ints(l, r)) => Some(l.cmp(&r)),
            Some(NumericPair::Floats(l, r)) => l.partial_cmp(&r),
            None => match (self, other) {
                (Self::String(l), Self::String(r)) => Some(l.cmp(r)),
                _ => None,
            },
        }
    }

    /// Render the value as source text that parses back to the same value
    pub fn to_literal(&self) -> String {
        match self {
            Self::Unknown => "unknown".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.is_finite() => {
                let text = f.to_string();
                if text.contains('.') {
                    text
                } else {
                    format!("{text}.0")
                }
            }
            Self::Float(f) => format!("{f:?}"),
            Self::String(s) if s.contains('"') => format!("'{s}'"),
            Self::String(s) => format!("\"{s}\""),
            Self::Object(o) => format!("<object {}>", o.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unknown, Self::Unknown) | (Self::Null, Self::Null) => true,
            (Self::Bool(l), Self::Bool(r)) => l == r,
            (Self::Int(l), Self::Int(r)) => l == r,
            (Self::Float(l), Self::Float(r)) => l == r,
            (Self::String(l), Self::String(r)) => l == r,
            (Self::Object(l), Self::Object(r)) => l.ptr_eq(r),
            _ => false,
        }
    }
}

/// String coercion used by concatenation and host output
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Object(o) => write!(f, "<object {}>", o.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
