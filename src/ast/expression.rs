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

//! Expression tree node

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::compiler::CompiledExpression;
use crate::model::Value;
use crate::registry::{FormulaOperator, NativeFunctionDescr, OperatorForm, PrecompiledDescr};

/// What a node is
#[derive(Debug, Clone)]
pub enum ExpressionKind {
    /// Literal value
    Constant(Value),
    /// Bare identifier, resolved through the context when evaluated
    Variable(String),
    /// Application of an operator to the node's operands
    Operator(Arc<dyn FormulaOperator>),
    /// Hand-written evaluator referenced as `#name`
    Precompiled(PrecompiledDescr),
}

/// A node of a parsed formula
///
/// Operand layout is fixed per form:
///
/// | Form | Operands |
/// |------|----------|
/// | member access | `[target, Variable(member)]` |
/// | function call | `[Variable(name), args...]` |
/// | method call | `[target, Variable(method), args...]` |
/// | indexer | `[target, index...]` |
/// | grouping | `[inner]` |
/// | unary / binary | `[operand]` / `[left, right]` |
///
/// A tree never changes after parsing, except for two caches: the result of
/// the last evaluation of each node (shown by [`dump`](Self::dump)) and the
/// compiled closure built by [`compile`](Self::compile).
pub struct Expression {
    kind: ExpressionKind,
    operands: Vec<Arc<Expression>>,
    native: Option<NativeFunctionDescr>,
    result: Mutex<Value>,
    pub(crate) compiled: OnceCell<Option<CompiledExpression>>,
}

impl Expression {
    fn new(kind: ExpressionKind, operands: Vec<Arc<Expression>>) -> Self {
        Self {
            kind,
            operands,
            native: None,
            result: Mutex::new(Value::Unknown),
            compiled: OnceCell::new(),
        }
    }

    /// Literal node
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::new(ExpressionKind::Constant(value.into()), Vec::new())
    }

    /// Variable reference node
    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(ExpressionKind::Variable(name.into()), Vec::new())
    }

    /// Operator node
    pub fn operator(operator: Arc<dyn FormulaOperator>, operands: Vec<Arc<Expression>>) -> Self {
        Self::new(ExpressionKind::Operator(operator), operands)
    }

    /// `#name` node
    pub fn precompiled(descr: PrecompiledDescr) -> Self {
        Self::new(ExpressionKind::Precompiled(descr), Vec::new())
    }

    /// Attach the native function a function-call node was bound to
    pub fn with_native(mut self, native: Option<NativeFunctionDescr>) -> Self {
        self.native = native;
        self
    }

    /// Node kind
    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }

    /// Operands in grammar order
    pub fn operands(&self) -> &[Arc<Expression>] {
        &self.operands
    }

    /// Native function bound at parse time (function-call nodes only)
    pub fn native(&self) -> Option<&NativeFunctionDescr> {
        self.native.as_ref()
    }

    /// Operator of an operator node
    pub fn as_operator(&self) -> Option<&Arc<dyn FormulaOperator>> {
        match &self.kind {
            ExpressionKind::Operator(operator) => Some(operator),
            _ => None,
        }
    }

    /// Calculation form of an operator node
    pub fn form(&self) -> Option<OperatorForm> {
        self.as_operator().map(|operator| operator.form())
    }

    /// Literal of a constant node
    pub fn as_constant(&self) -> Option<&Value> {
        match &self.kind {
            ExpressionKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Name of a variable node
    pub fn variable_name(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Result of the most recent evaluation of this node
    pub fn last_result(&self) -> Value {
        self.result.lock().clone()
    }

    pub(crate) fn store_result(&self, value: &Value) {
        *self.result.lock() = value.clone();
    }

    /// Whether a compiled closure is available for this node
    pub fn is_compiled(&self) -> bool {
        self.compiled_fn().is_some()
    }

    pub(crate) fn compiled_fn(&self) -> Option<&CompiledExpression> {
        self.compiled.get().and_then(Option::as_ref)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Expression");
        debug.field("kind", &self.kind);
        if !self.operands.is_empty() {
            debug.field("operands", &self.operands);
        }
        if let Some(native) = &self.native {
            debug.field("native", native);
        }
        debug.finish()
    }
}
