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

//! Comparison and equality operators for formula expressions

use std::cmp::Ordering;

use super::super::operator::{Associativity, FormulaOperator};
use crate::model::Value;

/// Equality operator (==)
pub struct EqualOperator;

impl FormulaOperator for EqualOperator {
    fn symbol(&self) -> &str {
        "=="
    }
    fn human_friendly_name(&self) -> &str {
        "Equality"
    }
    fn priority(&self) -> i32 {
        9
    }
    fn associativity(&self) -> Associativity {
        Associativity::NonAssociative
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        Value::Bool(left.loose_eq(right))
    }
}

/// Inequality operator (!=)
pub struct NotEqualOperator;

impl FormulaOperator for NotEqualOperator {
    fn symbol(&self) -> &str {
        "!="
    }
    fn human_friendly_name(&self) -> &str {
        "Inequality"
    }
    fn priority(&self) -> i32 {
        9
    }
    fn associativity(&self) -> Associativity {
        Associativity::NonAssociative
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        Value::Bool(!left.loose_eq(right))
    }
}

/// Ordering operators (<, <=, >, >=) share one implementation
pub struct OrderingOperator {
    symbol: &'static str,
    name: &'static str,
    accepts: fn(Ordering) -> bool,
}

impl OrderingOperator {
    /// Less than operator (<)
    pub fn less_than() -> Self {
        Self {
            symbol: "<",
            name: "Less Than",
            accepts: Ordering::is_lt,
        }
    }

    /// Less than or equal operator (<=)
    pub fn less_than_or_equal() -> Self {
        Self {
            symbol: "<=",
            name: "Less Than Or Equal",
            accepts: Ordering::is_le,
        }
    }

    /// Greater than operator (>)
    pub fn greater_than() -> Self {
        Self {
            symbol: ">",
            name: "Greater Than",
            accepts: Ordering::is_gt,
        }
    }

    /// Greater than or equal operator (>=)
    pub fn greater_than_or_equal() -> Self {
        Self {
            symbol: ">=",
            name: "Greater Than Or Equal",
            accepts: Ordering::is_ge,
        }
    }
}

impl FormulaOperator for OrderingOperator {
    fn symbol(&self) -> &str {
        self.symbol
    }
    fn human_friendly_name(&self) -> &str {
        self.name
    }
    fn priority(&self) -> i32 {
        8
    }
    fn associativity(&self) -> Associativity {
        Associativity::NonAssociative
    }
    fn is_binary(&self) -> bool {
        true
    }

    fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        match left.compare(right) {
            Some(ordering) => Value::Bool((self.accepts)(ordering)),
            None => Value::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_on_mixed_numbers() {
        let lt = OrderingOperator::less_than();
        let ge = OrderingOperator::greater_than_or_equal();
        assert_eq!(lt.evaluate_binary(&1.into(), &1.5.into()), Value::Bool(true));
        assert_eq!(ge.evaluate_binary(&2.0.into(), &2.into()), Value::Bool(true));
    }

    #[test]
    fn ordering_on_strings_is_lexicographic() {
        let gt = OrderingOperator::greater_than();
        assert_eq!(gt.evaluate_binary(&"b".into(), &"a".into()), Value::Bool(true));
    }

    #[test]
    fn ordering_without_rule_is_unknown() {
        let le = OrderingOperator::less_than_or_equal();
        assert_eq!(le.evaluate_binary(&"a".into(), &1.into()), Value::Unknown);
        assert_eq!(le.evaluate_binary(&Value::Null, &1.into()), Value::Unknown);
    }

    #[test]
    fn equality_always_answers() {
        assert_eq!(EqualOperator.evaluate_binary(&1.into(), &1.0.into()), Value::Bool(true));
        assert_eq!(EqualOperator.evaluate_binary(&1.into(), &"1".into()), Value::Bool(false));
        assert_eq!(
            NotEqualOperator.evaluate_binary(&Value::Null, &Value::Unknown),
            Value::Bool(true)
        );
    }
}
