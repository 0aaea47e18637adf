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

//! Operator registry and the operator trait

use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::model::Value;
use crate::registry::operators;

/// Priority of structural forms (member access, calls, indexing, grouping)
///
/// Structural forms are recognised by the parser directly and always bind
/// tighter than any generic operator.
pub const STRUCTURAL_PRIORITY: i32 = -1;

/// Priority band that prefix operators bind their operand at
pub const PREFIX_PRIORITY: i32 = 3;

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// Left-associative operator (evaluated left to right)
    Left,
    /// Right-associative operator (evaluated right to left)
    Right,
    /// Operator that cannot be chained with another operator of its priority
    NonAssociative,
}

/// How an operator node computes its value
///
/// Generic operators hand evaluated operands to [`FormulaOperator::evaluate_unary`]
/// or [`FormulaOperator::evaluate_binary`]. Every other form needs control over
/// when and how its operands are evaluated, so the evaluator and compiler
/// implement them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorForm {
    /// Plain unary/binary calculation on evaluated operands
    Generic,
    /// Short-circuit `||` returning the deciding operand
    Or,
    /// Short-circuit `&&` returning the deciding operand
    And,
    /// Member access `obj.name`
    Dot,
    /// Grouping `( expr )`
    Parenthesis,
    /// Free function call `name(args)`
    FunctionCall,
    /// Method call `obj.name(args)`
    MethodCall,
    /// Indexing `obj[args]`
    Indexer,
    /// Debug operator logging value, context and per-node trace
    Dump,
    /// Debug operator logging the value
    Log,
}

impl OperatorForm {
    /// Whether this form is handled by the parser outside generic precedence scanning
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Self::Dot | Self::Parenthesis | Self::FunctionCall | Self::MethodCall | Self::Indexer
        )
    }
}

/// Trait for implementing formula operators
pub trait FormulaOperator: Send + Sync {
    /// Get the operator symbol as matched in source text (e.g. "+", ">=")
    fn symbol(&self) -> &str;

    /// Get a human-friendly name for the operator
    fn human_friendly_name(&self) -> &str;

    /// Get the operator priority (lower values bind tighter, -1 for structural forms)
    fn priority(&self) -> i32;

    /// Get the operator associativity
    fn associativity(&self) -> Associativity {
        Associativity::Left
    }

    /// Get the calculation form
    fn form(&self) -> OperatorForm {
        OperatorForm::Generic
    }

    /// Whether the operator can be used in prefix position
    fn is_unary(&self) -> bool {
        false
    }

    /// Whether the operator can be used in infix position
    fn is_binary(&self) -> bool {
        false
    }

    /// Evaluate the operator with one operand
    fn evaluate_unary(&self, _operand: &Value) -> Value {
        Value::Unknown
    }

    /// Evaluate the operator with two operands
    fn evaluate_binary(&self, _left: &Value, _right: &Value) -> Value {
        Value::Unknown
    }
}

impl std::fmt::Debug for dyn FormulaOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Operator({})", self.symbol())
    }
}

/// Registry for formula operators
///
/// Read-only once built. Infix and prefix candidates are kept sorted by symbol
/// length so that token matching is longest-match-wins.
#[derive(Clone)]
pub struct OperatorRegistry {
    operators: FxHashMap<String, Arc<dyn FormulaOperator>>,
    structural: FxHashMap<OperatorForm, Arc<dyn FormulaOperator>>,
    infix: Vec<Arc<dyn FormulaOperator>>,
    prefix: Vec<Arc<dyn FormulaOperator>>,
}

static STANDARD: Lazy<Arc<OperatorRegistry>> = Lazy::new(|| {
    let mut registry = OperatorRegistry::new();
    register_builtin_operators(&mut registry);
    log::debug!("standard operator registry built with {} operators", registry.len());
    Arc::new(registry)
});

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorRegistry {
    /// Create an empty operator registry
    pub fn new() -> Self {
        OperatorRegistry {
            operators: FxHashMap::default(),
            structural: FxHashMap::default(),
            infix: Vec::new(),
            prefix: Vec::new(),
        }
    }

    /// Shared registry holding all built-in operators, built on first use
    pub fn standard() -> Arc<OperatorRegistry> {
        STANDARD.clone()
    }

    /// Register an operator in the registry, replacing one with the same symbol
    pub fn register<O: FormulaOperator + 'static>(&mut self, operator: O) {
        let operator: Arc<dyn FormulaOperator> = Arc::new(operator);
        let symbol = operator.symbol().to_string();

        self.infix.retain(|op| op.symbol() != symbol);
        self.prefix.retain(|op| op.symbol() != symbol);

        let form = operator.form();
        if form.is_structural() {
            self.structural.insert(form, operator.clone());
        }
        if operator.is_binary() || form == OperatorForm::Dot {
            self.infix.push(operator.clone());
            self.infix
                .sort_by(|a, b| b.symbol().len().cmp(&a.symbol().len()));
        }
        if operator.is_unary() && !form.is_structural() {
            self.prefix.push(operator.clone());
            self.prefix
                .sort_by(|a, b| b.symbol().len().cmp(&a.symbol().len()));
        }

        self.operators.insert(symbol, operator);
    }

    /// Get an operator by symbol
    pub fn get(&self, symbol: &str) -> Option<Arc<dyn FormulaOperator>> {
        self.operators.get(symbol).cloned()
    }

    /// Get the operator implementing a structural form
    pub fn structural(&self, form: OperatorForm) -> Option<Arc<dyn FormulaOperator>> {
        self.structural.get(&form).cloned()
    }

    /// Longest infix operator whose symbol starts `input`
    pub fn match_infix(&self, input: &str) -> Option<Arc<dyn FormulaOperator>> {
        self.infix
            .iter()
            .find(|op| input.starts_with(op.symbol()))
            .cloned()
    }

    /// Longest prefix operator whose symbol starts `input`
    pub fn match_prefix(&self, input: &str) -> Option<Arc<dyn FormulaOperator>> {
        self.prefix
            .iter()
            .find(|op| input.starts_with(op.symbol()))
            .cloned()
    }

    /// Check if an operator with this symbol exists
    pub fn contains(&self, symbol: &str) -> bool {
        self.operators.contains_key(symbol)
    }

    /// Number of registered operators
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Check if the registry has no operators
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Get all operator symbols
    pub fn symbols(&self) -> Vec<&str> {
        self.operators.keys().map(|s| s.as_str()).collect()
    }
}

/// Register all built-in operators
pub fn register_builtin_operators(registry: &mut OperatorRegistry) {
    operators::register_builtin_operators(registry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_wins() {
        let registry = OperatorRegistry::standard();
        assert_eq!(registry.match_infix(">= 3").unwrap().symbol(), ">=");
        assert_eq!(registry.match_infix("> 3").unwrap().symbol(), ">");
        assert_eq!(registry.match_infix("!= 3").unwrap().symbol(), "!=");
        assert_eq!(registry.match_prefix("@@x").unwrap().symbol(), "@@");
        assert_eq!(registry.match_prefix("@x").unwrap().symbol(), "@");
    }

    #[test]
    fn prefix_and_infix_sets_are_separate() {
        let registry = OperatorRegistry::standard();
        assert!(registry.match_prefix("*x").is_none());
        assert!(registry.match_infix("!x").is_none());
        assert_eq!(registry.match_prefix("-x").unwrap().symbol(), "-");
        assert_eq!(registry.match_infix("-x").unwrap().symbol(), "-");
    }

    #[test]
    fn structural_forms_are_registered() {
        let registry = OperatorRegistry::standard();
        for form in [
            OperatorForm::Dot,
            OperatorForm::Parenthesis,
            OperatorForm::FunctionCall,
            OperatorForm::MethodCall,
            OperatorForm::Indexer,
        ] {
            let op = registry.structural(form).expect("structural operator");
            assert_eq!(op.priority(), STRUCTURAL_PRIORITY);
        }
        assert!(registry.match_infix("[1]").is_none());
        assert!(registry.match_infix("(1)").is_none());
    }

    #[test]
    fn standard_registry_is_shared() {
        assert!(Arc::ptr_eq(&OperatorRegistry::standard(), &OperatorRegistry::standard()));
    }
}
