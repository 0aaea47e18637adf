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

//! Visitor pattern for expression tree traversal

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::model::Value;
use crate::registry::{FormulaOperator, OperatorForm, PrecompiledDescr};

use super::expression::{Expression, ExpressionKind};

/// Trait for visiting expression nodes
pub trait Visitor: Sized {
    /// The result type of visiting a node
    type Result;

    /// Visit an expression node
    fn visit_expression(&mut self, expr: &Expression) -> Self::Result {
        walk_expression(self, expr)
    }

    /// Visit a literal
    fn visit_constant(&mut self, value: &Value) -> Self::Result;

    /// Visit a variable reference
    fn visit_variable(&mut self, name: &str) -> Self::Result;

    /// Visit an operator node with its operands
    fn visit_operator(
        &mut self,
        operator: &Arc<dyn FormulaOperator>,
        operands: &[Arc<Expression>],
    ) -> Self::Result;

    /// Visit a `#name` reference
    fn visit_precompiled(&mut self, descr: &PrecompiledDescr) -> Self::Result;
}

/// Default implementation of walking an expression tree
pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) -> V::Result {
    match expr.kind() {
        ExpressionKind::Constant(value) => visitor.visit_constant(value),
        ExpressionKind::Variable(name) => visitor.visit_variable(name),
        ExpressionKind::Operator(operator) => visitor.visit_operator(operator, expr.operands()),
        ExpressionKind::Precompiled(descr) => visitor.visit_precompiled(descr),
    }
}

/// Names an expression refers to, split by how they are reached
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct References {
    /// Free variables read from the context
    pub variables: BTreeSet<String>,
    /// Free functions called by name
    pub functions: BTreeSet<String>,
    /// Members read through `.`
    pub members: BTreeSet<String>,
    /// Methods called through `.name(...)`
    pub methods: BTreeSet<String>,
    /// `#name` references
    pub precompiled: BTreeSet<String>,
}

/// Visitor collecting the names an expression refers to
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    references: References,
}

impl ReferenceCollector {
    /// Collect references from `expr`
    pub fn collect(expr: &Expression) -> References {
        let mut collector = Self::default();
        collector.visit_expression(expr);
        collector.references
    }

    fn visit_all(&mut self, operands: &[Arc<Expression>]) {
        for operand in operands {
            self.visit_expression(operand);
        }
    }
}

impl Visitor for ReferenceCollector {
    type Result = ();

    fn visit_constant(&mut self, _value: &Value) {}

    fn visit_variable(&mut self, name: &str) {
        self.references.variables.insert(name.to_string());
    }

    fn visit_operator(&mut self, operator: &Arc<dyn FormulaOperator>, operands: &[Arc<Expression>]) {
        let name_at = |i: usize| operands.get(i).and_then(|operand| operand.variable_name());
        match operator.form() {
            OperatorForm::Dot => {
                if let Some(member) = name_at(1) {
                    self.references.members.insert(member.to_string());
                }
                self.visit_all(operands.get(..1).unwrap_or_default());
            }
            OperatorForm::MethodCall => {
                if let Some(method) = name_at(1) {
                    self.references.methods.insert(method.to_string());
                }
                self.visit_all(operands.get(..1).unwrap_or_default());
                self.visit_all(operands.get(2..).unwrap_or_default());
            }
            OperatorForm::FunctionCall => {
                if let Some(function) = name_at(0) {
                    self.references.functions.insert(function.to_string());
                }
                self.visit_all(operands.get(1..).unwrap_or_default());
            }
            _ => self.visit_all(operands),
        }
    }

    fn visit_precompiled(&mut self, descr: &PrecompiledDescr) {
        self.references.precompiled.insert(descr.name.to_string());
    }
}

/// Visitor measuring the height of a tree (a single node has depth 1)
#[derive(Debug, Default)]
pub struct DepthVisitor;

impl Visitor for DepthVisitor {
    type Result = usize;

    fn visit_constant(&mut self, _value: &Value) -> usize {
        1
    }

    fn visit_variable(&mut self, _name: &str) -> usize {
        1
    }

    fn visit_operator(
        &mut self,
        _operator: &Arc<dyn FormulaOperator>,
        operands: &[Arc<Expression>],
    ) -> usize {
        1 + operands
            .iter()
            .map(|operand| self.visit_expression(operand))
            .max()
            .unwrap_or(0)
    }

    fn visit_precompiled(&mut self, _descr: &PrecompiledDescr) -> usize {
        1
    }
}

impl Expression {
    /// Names this expression refers to
    pub fn references(&self) -> References {
        ReferenceCollector::collect(self)
    }

    /// Height of the tree rooted at this node
    pub fn depth(&self) -> usize {
        DepthVisitor.visit_expression(self)
    }
}
