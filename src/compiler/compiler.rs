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

//! Closure compiler for formula trees
//!
//! Lowers a parsed tree bottom-up into nested closures. Each node's closure
//! calls its children's closures directly, so re-evaluating a compiled
//! formula skips the per-node dispatch of the tree walker. Both backends go
//! through the same host call-outs and operator implementations, produce the
//! same values and leave the same per-node results behind for `dump`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::{Expression, ExpressionKind};
use crate::evaluator::{Arguments, EvaluationResult, identifier, structural, trace};
use crate::model::{Context, Value};
use crate::registry::{FormulaOperator, OperatorForm};

/// A formula lowered to a directly callable closure
pub type CompiledExpression =
    Arc<dyn Fn(&dyn Context, bool) -> EvaluationResult<Value> + Send + Sync>;

/// Compilation error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompilationError {
    /// Operator node with the wrong number of operands
    #[error("Operator '{operator}' expects {expected} operands, got {actual}")]
    InvalidOperands {
        /// Operator symbol
        operator: String,
        /// Expected operand count
        expected: &'static str,
        /// Actual operand count
        actual: usize,
    },

    /// Structural form whose name operand is not a bare identifier
    #[error("Operator '{operator}' expects an identifier operand")]
    ExpectedIdentifier {
        /// Operator symbol
        operator: String,
    },

    /// Tree is deeper than the configured limit
    #[error("Expression depth {depth} exceeds the limit of {max_depth}")]
    MaxDepthExceeded {
        /// Depth of the tree
        depth: usize,
        /// Configured limit
        max_depth: usize,
    },

    /// A subtree already failed to compile
    #[error("Subexpression '{expression}' cannot be compiled")]
    NotCompilable {
        /// Text of the subtree
        expression: String,
    },
}

/// Result type for compilation operations
pub type CompilationResult<T> = Result<T, CompilationError>;

/// Configuration for the expression compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Deepest tree that will be compiled
    pub max_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

impl CompilerConfig {
    /// Set the depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Expression {
    /// Compile with the default configuration
    pub fn compile(&self) -> bool {
        self.compile_with(&CompilerConfig::default())
    }

    /// Lower this tree to closures, returning whether it succeeded
    ///
    /// The outcome is cached per node, so calling this again is cheap and
    /// gives the same answer. On failure the reason is logged and evaluation
    /// keeps walking the tree.
    pub fn compile_with(&self, config: &CompilerConfig) -> bool {
        if let Some(cached) = self.compiled.get() {
            return cached.is_some();
        }
        match self.try_compile(config) {
            Ok(_) => true,
            Err(error) => {
                log::warn!("cannot compile '{self}': {error}");
                false
            }
        }
    }

    /// Lower this tree to closures, reporting why it failed
    ///
    /// A tree that was already lowered keeps its closures whatever `config` says.
    pub fn try_compile(&self, config: &CompilerConfig) -> CompilationResult<CompiledExpression> {
        if self.compiled.get().is_some() {
            return self.lower();
        }
        let depth = self.depth();
        if depth > config.max_depth {
            let _ = self.compiled.set(None);
            return Err(CompilationError::MaxDepthExceeded {
                depth,
                max_depth: config.max_depth,
            });
        }
        self.lower()
    }

    fn lower(&self) -> CompilationResult<CompiledExpression> {
        if let Some(cached) = self.compiled.get() {
            return cached.clone().ok_or_else(|| CompilationError::NotCompilable {
                expression: self.to_string(),
            });
        }
        let result = self.build();
        let _ = self.compiled.set(result.as_ref().ok().cloned());
        result
    }

    fn build(&self) -> CompilationResult<CompiledExpression> {
        let compiled: CompiledExpression = match self.kind() {
            ExpressionKind::Constant(value) => {
                let value = value.clone();
                Arc::new(move |_, _| Ok(value.clone()))
            }
            ExpressionKind::Variable(name) => {
                let name = name.clone();
                Arc::new(move |ctx, as_value| structural::variable(ctx, &name, as_value))
            }
            ExpressionKind::Precompiled(descr) => descr.function.clone(),
            ExpressionKind::Operator(operator) => self.build_operator(operator)?,
        };
        Ok(compiled)
    }

    fn build_operator(
        &self,
        operator: &Arc<dyn FormulaOperator>,
    ) -> CompilationResult<CompiledExpression> {
        let operands = self.operands();
        let invalid = |expected: &'static str| CompilationError::InvalidOperands {
            operator: operator.symbol().to_string(),
            expected,
            actual: operands.len(),
        };
        let name_of = |operand: &Expression| {
            identifier(operator.as_ref(), operand)
                .map(str::to_string)
                .map_err(|_| CompilationError::ExpectedIdentifier {
                    operator: operator.symbol().to_string(),
                })
        };

        let compiled: CompiledExpression = match operator.form() {
            OperatorForm::Generic => match operands {
                [operand] => {
                    let operand = recorded(operand)?;
                    let operator = operator.clone();
                    Arc::new(move |ctx, _| Ok(operator.evaluate_unary(&operand(ctx, true)?)))
                }
                [left, right] => {
                    let (left, right) = (recorded(left)?, recorded(right)?);
                    let operator = operator.clone();
                    Arc::new(move |ctx, _| {
                        let left = left(ctx, true)?;
                        let right = right(ctx, true)?;
                        Ok(operator.evaluate_binary(&left, &right))
                    })
                }
                _ => return Err(invalid("1 or 2")),
            },

            OperatorForm::Or => {
                let [left, right] = operands else {
                    return Err(invalid("2"));
                };
                let (left, right) = (recorded(left)?, recorded(right)?);
                Arc::new(move |ctx, _| {
                    let left = left(ctx, true)?;
                    if left.is_truthy() {
                        Ok(left)
                    } else {
                        right(ctx, true)
                    }
                })
            }

            OperatorForm::And => {
                let [left, right] = operands else {
                    return Err(invalid("2"));
                };
                let (left, right) = (recorded(left)?, recorded(right)?);
                Arc::new(move |ctx, _| {
                    let left = left(ctx, true)?;
                    if left.is_truthy() {
                        right(ctx, true)
                    } else {
                        Ok(left)
                    }
                })
            }

            OperatorForm::Parenthesis => match operands {
                [inner] => recorded(inner)?,
                _ => return Err(invalid("1")),
            },

            OperatorForm::Dot => {
                let [target, member] = operands else {
                    return Err(invalid("2"));
                };
                let name = name_of(member)?;
                let target = recorded(target)?;
                Arc::new(move |ctx, as_value| {
                    let target = target(ctx, false)?;
                    structural::member(ctx, &target, &name, as_value)
                })
            }

            OperatorForm::FunctionCall => {
                let [name, args @ ..] = operands else {
                    return Err(invalid("at least 1"));
                };
                let name = name_of(name)?;
                let args = lower_all(args)?;
                let native = self.native().cloned();
                Arc::new(move |ctx, as_value| {
                    let args = call_all(&args, ctx)?;
                    structural::function(ctx, native.as_ref(), &name, &args, as_value)
                })
            }

            OperatorForm::MethodCall => {
                let [target, method, args @ ..] = operands else {
                    return Err(invalid("at least 2"));
                };
                let name = name_of(method)?;
                let target = recorded(target)?;
                let args = lower_all(args)?;
                Arc::new(move |ctx, as_value| {
                    let target = target(ctx, false)?;
                    let args = call_all(&args, ctx)?;
                    structural::method(ctx, &target, &name, &args, as_value)
                })
            }

            OperatorForm::Indexer => {
                let [target, indices @ ..] = operands else {
                    return Err(invalid("at least 2"));
                };
                if indices.is_empty() {
                    return Err(invalid("at least 2"));
                }
                let target = recorded(target)?;
                let indices = lower_all(indices)?;
                Arc::new(move |ctx, as_value| {
                    let target = target(ctx, false)?;
                    let indices = call_all(&indices, ctx)?;
                    structural::index(ctx, &target, &indices, as_value)
                })
            }

            OperatorForm::Log => {
                let [operand] = operands else {
                    return Err(invalid("1"));
                };
                let text = operand.to_string();
                let operand = recorded(operand)?;
                Arc::new(move |ctx, as_value| {
                    let value = operand(ctx, as_value)?;
                    trace::log_value(&text, &value);
                    Ok(value)
                })
            }

            OperatorForm::Dump => {
                let [operand] = operands else {
                    return Err(invalid("1"));
                };
                let operand = Arc::clone(operand);
                Arc::new(move |ctx, as_value| {
                    let value = operand.evaluate(ctx, as_value)?;
                    trace::dump_value(ctx, &operand, &value);
                    Ok(value)
                })
            }
        };
        Ok(compiled)
    }
}

/// Lower a child and record what it produced, as the tree walker does
fn recorded(node: &Arc<Expression>) -> CompilationResult<CompiledExpression> {
    let compiled = node.lower()?;
    let node = Arc::clone(node);
    Ok(Arc::new(move |ctx, as_value| {
        let value = compiled(ctx, as_value)?;
        node.store_result(&value);
        Ok(value)
    }))
}

fn lower_all(operands: &[Arc<Expression>]) -> CompilationResult<Vec<CompiledExpression>> {
    operands.iter().map(recorded).collect()
}

fn call_all(compiled: &[CompiledExpression], ctx: &dyn Context) -> EvaluationResult<Arguments> {
    compiled.iter().map(|f| f(ctx, true)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmptyContext;
    use crate::parser::parse;
    use crate::registry::OperatorRegistry;

    #[test]
    fn compiles_and_agrees_with_tree_walking() {
        for text in ["2 + 3 * 4", "(2 + 3) * 4", "-2 + 3", "2 || 3", "0 && 2.5", "max(1, 2.5)", "#pi > 3"] {
            let walked = parse(text, false).unwrap();
            let compiled = parse(text, false).unwrap();
            assert!(compiled.compile(), "{text} should compile");
            assert!(compiled.is_compiled());
            assert_eq!(
                compiled.calc(&EmptyContext, true),
                walked.calc(&EmptyContext, true),
                "{text}"
            );
        }
    }

    #[test]
    fn compile_is_idempotent() {
        let tree = parse("1 + 2", false).unwrap();
        assert!(tree.compile());
        assert!(tree.compile());
        assert!(tree.operands()[0].is_compiled());
    }

    #[test]
    fn depth_limit_falls_back_to_tree_walking() {
        let tree = parse("((((1))))", false).unwrap();
        let config = CompilerConfig::default().with_max_depth(3);
        assert!(matches!(
            tree.try_compile(&config),
            Err(CompilationError::MaxDepthExceeded { depth: 5, max_depth: 3 })
        ));
        assert!(!tree.compile_with(&config));
        assert!(!tree.is_compiled());
        assert_eq!(tree.calc(&EmptyContext, true), Value::Int(1));
    }

    #[test]
    fn compiled_tree_keeps_its_closures() {
        let tree = parse("((1))", false).unwrap();
        assert!(tree.compile());
        let tighter = CompilerConfig::default().with_max_depth(1);
        assert!(tree.try_compile(&tighter).is_ok());
        assert!(tree.compile_with(&tighter));
        assert!(tree.is_compiled());
    }

    #[test]
    fn malformed_operands_fail_compilation() {
        let plus = OperatorRegistry::standard().get("+").unwrap();
        let one = Arc::new(Expression::constant(1));
        let tree = Expression::operator(plus, vec![one.clone(), one.clone(), one]);
        assert!(matches!(
            tree.try_compile(&CompilerConfig::default()),
            Err(CompilationError::InvalidOperands { actual: 3, .. })
        ));
        assert!(!tree.compile());
        assert_eq!(tree.calc(&EmptyContext, true), Value::Unknown);
    }

    #[test]
    fn failed_child_fails_parent() {
        let dot = OperatorRegistry::standard().get(".").unwrap();
        let plus = OperatorRegistry::standard().get("+").unwrap();
        let bad_member = Arc::new(Expression::operator(
            dot,
            vec![Arc::new(Expression::variable("a")), Arc::new(Expression::constant(1))],
        ));
        let tree = Expression::operator(plus, vec![Arc::new(Expression::constant(1)), bad_member]);
        assert!(!tree.compile());
        assert!(tree.operands()[0].is_compiled());
        assert!(!tree.operands()[1].is_compiled());
        assert!(!tree.is_compiled());
    }
}
