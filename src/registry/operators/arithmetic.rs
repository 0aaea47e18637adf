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

//! Arithmetic operators for formula expressions

use super::super::operator::{Associativity, FormulaOperator};
use crate::model::{NumericPair, Value};

/// Addition and string concatenation operator (+)
pub struct AddOperator;

impl FormulaOperator for AddOperator {
    fn symbol(&self) -> &str {
        "+"
    }
    fn human_friendly_name(&self) -> &str {
        "Addition"
    }
    fn priority(&self) -> i32 {
        6
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        match (left, right) {
            (Value::String(l), r) => Value::String(format!("{l}{r}")),
            (l, Value::String(r)) => Value::String(format!("{l}{r}")),
            _ => match Value::numeric_pair(left, right) {
                Some(NumericPair::Ints(l, r)) => Value::Int(l.wrapping_add(r)),
                Some(NumericPair::Floats(l, r)) => Value::Float(l + r),
                None => Value::Unknown,
            },
        }
    }
}

/// Subtraction and negation operator (-)
pub struct SubtractOperator;

impl FormulaOperator for SubtractOperator {
    fn symbol(&self) -> &str {
        "-"
    }
    fn human_friendly_name(&self) -> &str {
        "Subtraction"
    }
    fn priority(&self) -> i32 {
        6
    }
    fn is_unary(&self) -> bool {
        true
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_unary(&self, operand: &Value) -> Value {
        match operand {
            Value::Int(i) => Value::Int(i.wrapping_neg()),
            Value::Float(f) => Value::Float(-f),
            _ => Value::Unknown,
        }
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        match Value::numeric_pair(left, right) {
            Some(NumericPair::Ints(l, r)) => Value::Int(l.wrapping_sub(r)),
            Some(NumericPair::Floats(l, r)) => Value::Float(l - r),
            None => Value::Unknown,
        }
    }
}

/// Multiplication operator (*)
pub struct MultiplyOperator;

impl FormulaOperator for MultiplyOperator {
    fn symbol(&self) -> &str {
        "*"
    }
    fn human_friendly_name(&self) -> &str {
        "Multiplication"
    }
    fn priority(&self) -> i32 {
        5
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        match Value::numeric_pair(left, right) {
            Some(NumericPair::Ints(l, r)) => Value::Int(l.wrapping_mul(r)),
            Some(NumericPair::Floats(l, r)) => Value::Float(l * r),
            None => Value::Unknown,
        }
    }
}

/// Division operator (/), always produces a float
pub struct DivideOperator;

impl FormulaOperator for DivideOperator {
    fn symbol(&self) -> &str {
        "/"
    }
    fn human_friendly_name(&self) -> &str {
        "Division"
    }
    fn priority(&self) -> i32 {
        5
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        match Value::numeric_pair(left, right) {
            Some(NumericPair::Ints(l, r)) => Value::Float(l as f64 / r as f64),
            Some(NumericPair::Floats(l, r)) => Value::Float(l / r),
            None => Value::Unknown,
        }
    }
}

/// Remainder operator (%)
pub struct ModuloOperator;

impl FormulaOperator for ModuloOperator {
    fn symbol(&self) -> &str {
        "%"
    }
    fn human_friendly_name(&self) -> &str {
        "Modulo"
    }
    fn priority(&self) -> i32 {
        5
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        match Value::numeric_pair(left, right) {
            Some(NumericPair::Ints(l, r)) => l.checked_rem(r).map_or(Value::Unknown, Value::Int),
            Some(NumericPair::Floats(l, r)) => Value::Float(l % r),
            None => Value::Unknown,
        }
    }
}

/// Power operator (^), always produces a float
pub struct PowerOperator;

impl FormulaOperator for PowerOperator {
    fn symbol(&self) -> &str {
        "^"
    }
    fn human_friendly_name(&self) -> &str {
        "Power"
    }
    fn priority(&self) -> i32 {
        2
    }
    fn associativity(&self) -> Associativity {
        Associativity::Right
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        match Value::numeric_pair(left, right) {
            Some(NumericPair::Ints(l, r)) => Value::Float((l as f64).powf(r as f64)),
            Some(NumericPair::Floats(l, r)) => Value::Float(l.powf(r)),
            None => Value::Unknown,
        }
    }
}
