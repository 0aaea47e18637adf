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

//! Tree-walking evaluation

use std::sync::Arc;

use smallvec::SmallVec;

use crate::ast::{Expression, ExpressionKind};
use crate::model::{Context, Value};
use crate::registry::{FormulaOperator, OperatorForm};

use super::error::{EvaluationError, EvaluationResult};
use super::{structural, trace};

/// Evaluated argument list
pub(crate) type Arguments = SmallVec<[Value; 4]>;

impl Expression {
    /// Evaluate without the error boundary of [`calc`](Self::calc)
    ///
    /// Uses the compiled closure when one was built and walks the tree
    /// otherwise. Host failures come back as `Err`.
    pub fn try_calc(&self, ctx: &dyn Context, as_value: bool) -> EvaluationResult<Value> {
        match self.compiled_fn() {
            Some(compiled) => {
                let value = compiled(ctx, as_value)?;
                self.store_result(&value);
                Ok(value)
            }
            None => self.evaluate(ctx, as_value),
        }
    }

    /// Walk this node and remember the result
    pub(crate) fn evaluate(&self, ctx: &dyn Context, as_value: bool) -> EvaluationResult<Value> {
        let value = self.walk(ctx, as_value)?;
        self.store_result(&value);
        Ok(value)
    }

    fn walk(&self, ctx: &dyn Context, as_value: bool) -> EvaluationResult<Value> {
        match self.kind() {
            ExpressionKind::Constant(value) => Ok(value.clone()),
            ExpressionKind::Variable(name) => structural::variable(ctx, name, as_value),
            ExpressionKind::Precompiled(descr) => descr.call(ctx, as_value),
            ExpressionKind::Operator(operator) => self.walk_operator(operator, ctx, as_value),
        }
    }

    fn walk_operator(
        &self,
        operator: &Arc<dyn FormulaOperator>,
        ctx: &dyn Context,
        as_value: bool,
    ) -> EvaluationResult<Value> {
        let operands = self.operands();
        let invalid = |expected: &'static str| {
            EvaluationError::invalid_operands(operator.symbol(), expected, operands.len())
        };

        match operator.form() {
            OperatorForm::Generic => match operands {
                [operand] => {
                    let operand = operand.evaluate(ctx, true)?;
                    Ok(operator.evaluate_unary(&operand))
                }
                [left, right] => {
                    let left = left.evaluate(ctx, true)?;
                    let right = right.evaluate(ctx, true)?;
                    Ok(operator.evaluate_binary(&left, &right))
                }
                _ => Err(invalid("1 or 2")),
            },

            OperatorForm::Or => {
                let [left, right] = operands else {
                    return Err(invalid("2"));
                };
                let left = left.evaluate(ctx, true)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    right.evaluate(ctx, true)
                }
            }

            OperatorForm::And => {
                let [left, right] = operands else {
                    return Err(invalid("2"));
                };
                let left = left.evaluate(ctx, true)?;
                if left.is_truthy() {
                    right.evaluate(ctx, true)
                } else {
                    Ok(left)
                }
            }

            OperatorForm::Parenthesis => match operands {
                [inner] => inner.evaluate(ctx, as_value),
                _ => Err(invalid("1")),
            },

            OperatorForm::Dot => {
                let [target, member] = operands else {
                    return Err(invalid("2"));
                };
                let name = identifier(operator.as_ref(), member)?;
                let target = target.evaluate(ctx, false)?;
                structural::member(ctx, &target, name, as_value)
            }

            OperatorForm::FunctionCall => {
                let [name, args @ ..] = operands else {
                    return Err(invalid("at least 1"));
                };
                let name = identifier(operator.as_ref(), name)?;
                let args = evaluate_all(args, ctx)?;
                structural::function(ctx, self.native(), name, &args, as_value)
            }

            OperatorForm::MethodCall => {
                let [target, method, args @ ..] = operands else {
                    return Err(invalid("at least 2"));
                };
                let name = identifier(operator.as_ref(), method)?;
                let target = target.evaluate(ctx, false)?;
                let args = evaluate_all(args, ctx)?;
                structural::method(ctx, &target, name, &args, as_value)
            }

            OperatorForm::Indexer => {
                let [target, indices @ ..] = operands else {
                    return Err(invalid("at least 2"));
                };
                if indices.is_empty() {
                    return Err(invalid("at least 2"));
                }
                let target = target.evaluate(ctx, false)?;
                let indices = evaluate_all(indices, ctx)?;
                structural::index(ctx, &target, &indices, as_value)
            }

            OperatorForm::Log => {
                let [operand] = operands else {
                    return Err(invalid("1"));
                };
                let value = operand.evaluate(ctx, as_value)?;
                trace::log_value(&operand.to_string(), &value);
                Ok(value)
            }

            OperatorForm::Dump => {
                let [operand] = operands else {
                    return Err(invalid("1"));
                };
                let value = operand.evaluate(ctx, as_value)?;
                trace::dump_value(ctx, operand, &value);
                Ok(value)
            }
        }
    }
}

/// Name carried by the identifier operand of a structural form
pub(crate) fn identifier<'e>(
    operator: &dyn FormulaOperator,
    operand: &'e Expression,
) -> EvaluationResult<&'e str> {
    operand
        .variable_name()
        .ok_or_else(|| EvaluationError::ExpectedIdentifier {
            operator: operator.symbol().to_string(),
        })
}

fn evaluate_all(args: &[Arc<Expression>], ctx: &dyn Context) -> EvaluationResult<Arguments> {
    args.iter().map(|arg| arg.evaluate(ctx, true)).collect()
}
