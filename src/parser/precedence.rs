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

//! Recursive descent parser with precedence climbing
//!
//! The grammar is driven entirely by the [`OperatorRegistry`]: every infix
//! and prefix token is looked up there, so the parser itself knows nothing
//! about individual operators except the structural forms.
//!
//! Every sub-step that fails puts the cursor back where it started. The
//! failure that got furthest into the input is kept and reported when the
//! expression as a whole cannot consume the text.

use std::sync::Arc;

use crate::ast::Expression;
use crate::model::Value;
use crate::registry::{
    Associativity, FunctionRegistry, OperatorForm, OperatorRegistry, PREFIX_PRIORITY,
};

use super::error::{ParseError, ParseResult};
use super::scanner::Scanner;

/// Priority limit for a full expression
const TOP_LEVEL: i32 = i32::MAX;

/// Longest slice of unconsumed input quoted in an error
const MAX_ERROR_SNIPPET: usize = 16;

/// Parser over a single formula text
pub struct FormulaParser<'input, 'reg> {
    scanner: Scanner<'input>,
    operators: &'reg OperatorRegistry,
    functions: &'reg FunctionRegistry,
    furthest: Option<ParseError>,
}

impl<'input, 'reg> FormulaParser<'input, 'reg> {
    /// Create a parser for `input` using the given registries
    pub fn new(
        input: &'input str,
        operators: &'reg OperatorRegistry,
        functions: &'reg FunctionRegistry,
    ) -> Self {
        Self {
            scanner: Scanner::new(input),
            operators,
            functions,
            furthest: None,
        }
    }

    /// Parse the whole input as one expression
    pub fn parse(mut self) -> ParseResult<Expression> {
        self.scanner.skip_blanks();
        if self.scanner.is_at_end() {
            return Err(ParseError::EmptyExpression);
        }

        let expression = self.read_expression(TOP_LEVEL);
        self.scanner.skip_blanks();

        match expression {
            Some(expression) if self.scanner.is_at_end() => Ok(expression),
            _ => {
                if !self.scanner.is_at_end() {
                    let found: String = self.scanner.rest().chars().take(MAX_ERROR_SNIPPET).collect();
                    self.fail(ParseError::UnexpectedInput {
                        found,
                        position: self.scanner.position(),
                    });
                }
                Err(self.furthest.unwrap_or(ParseError::ExpectedOperand { position: 0 }))
            }
        }
    }

    /// Remember a failure if it got further than any previous one
    fn fail(&mut self, error: ParseError) {
        let further = match (&self.furthest, error.position()) {
            (None, _) => true,
            (Some(current), Some(position)) => current.position().is_none_or(|p| position > p),
            (Some(_), None) => false,
        };
        if further {
            log::trace!("parse failure candidate: {error}");
            self.furthest = Some(error);
        }
    }

    /// Read an expression whose operators all have priority `<= max_priority`
    fn read_expression(&mut self, max_priority: i32) -> Option<Expression> {
        let mut left = self.read_prefixed_operand()?;
        let mut chained_priority: Option<i32> = None;

        loop {
            let checkpoint = self.scanner.position();
            self.scanner.skip_blanks();

            if self.scanner.peek() == Some(b'(') {
                match self.read_call(left) {
                    Ok(call) => {
                        left = call;
                        continue;
                    }
                    Err(not_callable) => {
                        left = not_callable;
                        self.scanner.reset(checkpoint);
                        break;
                    }
                }
            }

            if self.scanner.peek() == Some(b'[') {
                match self.read_indexer(left) {
                    Ok(indexer) => {
                        left = indexer;
                        continue;
                    }
                    Err(target) => {
                        left = target;
                        self.scanner.reset(checkpoint);
                        break;
                    }
                }
            }

            let Some(operator) = self.operators.match_infix(self.scanner.rest()) else {
                self.scanner.reset(checkpoint);
                break;
            };
            let operator_position = self.scanner.position();

            if operator.form() == OperatorForm::Dot {
                self.scanner.advance(operator.symbol().len());
                self.scanner.skip_blanks();
                match self.scanner.read_identifier() {
                    Some(member) => {
                        left = Expression::operator(
                            operator,
                            vec![Arc::new(left), Arc::new(Expression::variable(member))],
                        );
                        continue;
                    }
                    None => {
                        self.fail(ParseError::ExpectedMember {
                            position: self.scanner.position(),
                        });
                        self.scanner.reset(checkpoint);
                        break;
                    }
                }
            }

            let priority = operator.priority();
            if priority > max_priority {
                self.scanner.reset(checkpoint);
                break;
            }
            if operator.associativity() == Associativity::NonAssociative
                && chained_priority == Some(priority)
            {
                self.fail(ParseError::NonAssociative {
                    operator: operator.symbol().to_string(),
                    position: operator_position,
                });
                self.scanner.reset(checkpoint);
                break;
            }

            self.scanner.advance(operator.symbol().len());
            let right_limit = match operator.associativity() {
                Associativity::Right => priority,
                Associativity::Left | Associativity::NonAssociative => priority - 1,
            };
            let Some(right) = self.read_expression(right_limit) else {
                self.scanner.reset(checkpoint);
                break;
            };

            left = Expression::operator(operator, vec![Arc::new(left), Arc::new(right)]);
            chained_priority = Some(priority);
        }

        Some(left)
    }

    /// An operand, or a prefix operator applied to one
    fn read_prefixed_operand(&mut self) -> Option<Expression> {
        if let Some(operand) = self.read_operand() {
            return Some(operand);
        }

        let start = self.scanner.position();
        self.scanner.skip_blanks();
        let Some(operator) = self.operators.match_prefix(self.scanner.rest()) else {
            self.scanner.reset(start);
            return None;
        };
        self.scanner.advance(operator.symbol().len());

        match self.read_expression(PREFIX_PRIORITY) {
            Some(operand) => Some(Expression::operator(operator, vec![Arc::new(operand)])),
            None => {
                self.scanner.reset(start);
                None
            }
        }
    }

    fn read_operand(&mut self) -> Option<Expression> {
        let start = self.scanner.position();
        self.scanner.skip_blanks();
        let position = self.scanner.position();

        let operand = match self.scanner.peek() {
            Some(b'#') => self.read_precompiled(),
            Some(b'(') => self.read_parenthesis(),
            Some(b'\'' | b'"') => match self.scanner.read_quoted_string() {
                Some(text) => Some(Expression::constant(Value::from(text))),
                None => {
                    self.fail(ParseError::UnterminatedString { position });
                    None
                }
            },
            _ => self
                .scanner
                .read_number()
                .map(Expression::constant)
                .or_else(|| self.read_word()),
        };

        if operand.is_none() {
            self.fail(ParseError::ExpectedOperand { position });
            self.scanner.reset(start);
        }
        operand
    }

    /// Keyword literal or variable reference
    fn read_word(&mut self) -> Option<Expression> {
        let word = self.scanner.read_identifier()?;
        Some(match word {
            "true" => Expression::constant(Value::Bool(true)),
            "false" => Expression::constant(Value::Bool(false)),
            "null" => Expression::constant(Value::Null),
            "unknown" => Expression::constant(Value::Unknown),
            name => Expression::variable(name),
        })
    }

    fn read_precompiled(&mut self) -> Option<Expression> {
        let position = self.scanner.position();
        if !self.scanner.eat(b'#') {
            return None;
        }
        let Some(name) = self.scanner.read_identifier() else {
            self.scanner.reset(position);
            return None;
        };
        match self.functions.precompiled(name) {
            Some(descr) => Some(Expression::precompiled(descr.clone())),
            None => {
                self.fail(ParseError::UnknownPrecompiled {
                    name: name.to_string(),
                    position,
                });
                self.scanner.reset(position);
                None
            }
        }
    }

    fn read_parenthesis(&mut self) -> Option<Expression> {
        let start = self.scanner.position();
        let operator = self.operators.structural(OperatorForm::Parenthesis)?;
        if !self.scanner.eat(b'(') {
            return None;
        }

        let inner = self.read_expression(TOP_LEVEL);
        self.scanner.skip_blanks();
        match inner {
            Some(inner) if self.scanner.eat(b')') => {
                Some(Expression::operator(operator, vec![Arc::new(inner)]))
            }
            _ => {
                self.fail(ParseError::Expected {
                    expected: ')',
                    position: self.scanner.position(),
                });
                self.scanner.reset(start);
                None
            }
        }
    }

    /// Comma separated expressions up to `close`, cursor just after the opener
    fn read_arguments(&mut self, close: u8, allow_empty: bool) -> Option<Vec<Arc<Expression>>> {
        let mut arguments = Vec::new();
        self.scanner.skip_blanks();
        if allow_empty && self.scanner.eat(close) {
            return Some(arguments);
        }

        loop {
            let argument = self.read_expression(TOP_LEVEL)?;
            arguments.push(Arc::new(argument));
            self.scanner.skip_blanks();
            if self.scanner.eat(b',') {
                continue;
            }
            if self.scanner.eat(close) {
                return Some(arguments);
            }
            self.fail(ParseError::Expected {
                expected: close as char,
                position: self.scanner.position(),
            });
            return None;
        }
    }

    /// `name(args)` or `target.name(args)`; hands `callee` back if it is not callable here
    fn read_call(&mut self, callee: Expression) -> Result<Expression, Expression> {
        let form = if callee.variable_name().is_some() {
            OperatorForm::FunctionCall
        } else if callee.form() == Some(OperatorForm::Dot) {
            OperatorForm::MethodCall
        } else {
            return Err(callee);
        };
        let Some(operator) = self.operators.structural(form) else {
            return Err(callee);
        };

        self.scanner.eat(b'(');
        let Some(arguments) = self.read_arguments(b')', true) else {
            return Err(callee);
        };

        let expression = match form {
            OperatorForm::FunctionCall => {
                let name = callee.variable_name().unwrap_or_default().to_string();
                let native = self.functions.function(&name).cloned();
                let mut operands = Vec::with_capacity(arguments.len() + 1);
                operands.push(Arc::new(callee));
                operands.extend(arguments);
                Expression::operator(operator, operands).with_native(native)
            }
            _ => {
                let mut operands = callee.operands().to_vec();
                operands.extend(arguments);
                Expression::operator(operator, operands)
            }
        };
        Ok(expression)
    }

    fn read_indexer(&mut self, target: Expression) -> Result<Expression, Expression> {
        let Some(operator) = self.operators.structural(OperatorForm::Indexer) else {
            return Err(target);
        };
        self.scanner.eat(b'[');
        let Some(indices) = self.read_arguments(b']', false) else {
            return Err(target);
        };

        let mut operands = Vec::with_capacity(indices.len() + 1);
        operands.push(Arc::new(target));
        operands.extend(indices);
        Ok(Expression::operator(operator, operands))
    }
}

/// Parse `input` with explicit registries
pub fn parse_with(
    input: &str,
    operators: &OperatorRegistry,
    functions: &FunctionRegistry,
) -> ParseResult<Expression> {
    let result = FormulaParser::new(input, operators, functions).parse();
    if let Err(error) = &result {
        log::debug!("failed to parse '{input}': {error}");
    }
    result
}
