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

//! Re-serialization and per-node trace output

use std::fmt::{self, Write};

use crate::registry::OperatorForm;

use super::expression::{Expression, ExpressionKind};

impl fmt::Display for Expression {
    /// Normalized source text that parses back to an equivalent tree
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operator = match self.kind() {
            ExpressionKind::Constant(value) => return f.write_str(&value.to_literal()),
            ExpressionKind::Variable(name) => return f.write_str(name),
            ExpressionKind::Precompiled(descr) => return write!(f, "#{}", descr.name),
            ExpressionKind::Operator(operator) => operator,
        };

        let operands = self.operands();
        match (operator.form(), operands) {
            (OperatorForm::Dot, [target, member]) => write!(f, "{target}.{member}"),
            (OperatorForm::Parenthesis, [inner]) => write!(f, "({inner})"),
            (OperatorForm::FunctionCall, [name, args @ ..]) => {
                write!(f, "{name}(")?;
                write_list(f, args)?;
                f.write_char(')')
            }
            (OperatorForm::MethodCall, [target, method, args @ ..]) => {
                write!(f, "{target}.{method}(")?;
                write_list(f, args)?;
                f.write_char(')')
            }
            (OperatorForm::Indexer, [target, indices @ ..]) => {
                write!(f, "{target}[")?;
                write_list(f, indices)?;
                f.write_char(']')
            }
            (_, [operand]) => {
                let text = operand.to_string();
                if needs_separator(operator.symbol(), &text) {
                    write!(f, "{} {text}", operator.symbol())
                } else {
                    write!(f, "{}{text}", operator.symbol())
                }
            }
            (_, [left, right]) => write!(f, "{left} {} {right}", operator.symbol()),
            _ => write!(f, "<malformed {}>", operator.symbol()),
        }
    }
}

/// `@` followed by `@x` would read back as `@@x`, and `-` followed by `2`
/// as the literal `-2`
fn needs_separator(symbol: &str, operand: &str) -> bool {
    operand.starts_with(|c: char| {
        (c.is_ascii_punctuation() && !matches!(c, '(' | '#' | '\'' | '"' | '_'))
            || (symbol.ends_with('-') && c.is_ascii_digit())
    })
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[std::sync::Arc<Expression>]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Expression {
    /// One line per node with the value it produced on its last evaluation
    ///
    /// Children are indented one `indent` deeper than their parent and every
    /// line ends with `newline`. Names that are part of a structural form
    /// (member, method and function names) are folded into their parent's line.
    pub fn dump(&self, indent: &str, newline: &str) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, indent, newline, 0);
        out
    }

    fn dump_into(&self, out: &mut String, indent: &str, newline: &str, depth: usize) {
        for _ in 0..depth {
            out.push_str(indent);
        }
        let _ = write!(out, "{} => {}{newline}", self.label(), self.last_result().to_literal());

        let skip_name = match self.form() {
            Some(OperatorForm::Dot | OperatorForm::MethodCall) => Some(1),
            Some(OperatorForm::FunctionCall) => Some(0),
            _ => None,
        };
        for (i, operand) in self.operands().iter().enumerate() {
            if Some(i) != skip_name {
                operand.dump_into(out, indent, newline, depth + 1);
            }
        }
    }

    fn label(&self) -> String {
        match self.kind() {
            ExpressionKind::Constant(value) => value.to_literal(),
            ExpressionKind::Variable(name) => name.clone(),
            ExpressionKind::Precompiled(descr) => format!("#{}", descr.name),
            ExpressionKind::Operator(operator) => {
                let name = |i: usize| {
                    self.operands()
                        .get(i)
                        .and_then(|operand| operand.variable_name())
                        .unwrap_or("?")
                        .to_string()
                };
                match operator.form() {
                    OperatorForm::Dot => format!(".{}", name(1)),
                    OperatorForm::MethodCall => format!(".{}()", name(1)),
                    OperatorForm::FunctionCall => format!("{}()", name(0)),
                    _ => operator.symbol().to_string(),
                }
            }
        }
    }
}
