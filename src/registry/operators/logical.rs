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

//! Logical operators for formula expressions

use super::super::operator::{Associativity, FormulaOperator, OperatorForm, PREFIX_PRIORITY};
use crate::model::Value;

/// Logical NOT operator (!)
pub struct NotOperator;

impl FormulaOperator for NotOperator {
    fn symbol(&self) -> &str {
        "!"
    }
    fn human_friendly_name(&self) -> &str {
        "Logical Not"
    }
    fn priority(&self) -> i32 {
        PREFIX_PRIORITY
    }
    fn is_unary(&self) -> bool {
        true
    }

    fn evaluate_unary(&self, operand: &Value) -> Value {
        Value::Bool(!operand.is_truthy())
    }
}

/// Short-circuit OR operator (||)
///
/// Returns the left operand when it is truthy, otherwise the right operand.
pub struct OrOperator;

impl FormulaOperator for OrOperator {
    fn symbol(&self) -> &str {
        "||"
    }
    fn human_friendly_name(&self) -> &str {
        "Logical Or"
    }
    fn priority(&self) -> i32 {
        14
    }
    fn associativity(&self) -> Associativity {
        Associativity::NonAssociative
    }
    fn form(&self) -> OperatorForm {
        OperatorForm::Or
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        if left.is_truthy() {
            left.clone()
        } else {
            right.clone()
        }
    }
}

/// Short-circuit AND operator (&&)
///
/// Returns the left operand when it is falsy, otherwise the right operand.
pub struct AndOperator;

impl FormulaOperator for AndOperator {
    fn symbol(&self) -> &str {
        "&&"
    }
    fn human_friendly_name(&self) -> &str {
        "Logical And"
    }
    fn priority(&self) -> i32 {
        13
    }
    fn associativity(&self) -> Associativity {
        Associativity::NonAssociative
    }
    fn form(&self) -> OperatorForm {
        OperatorForm::And
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        if left.is_truthy() {
            right.clone()
        } else {
            left.clone()
        }
    }
}
