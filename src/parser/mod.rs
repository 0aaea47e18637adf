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

//! Formula parser
//!
//! Turns formula text into an [`Expression`] tree by recursive descent with
//! precedence climbing. Operator tokens, priorities and associativity all come
//! from an [`OperatorRegistry`]; function calls are bound to natives from a
//! [`FunctionRegistry`] while parsing.

#![warn(missing_docs)]

pub mod error;
pub mod precedence;
pub mod scanner;

pub use error::{ParseError, ParseResult};
pub use precedence::{FormulaParser, parse_with};
pub use scanner::Scanner;

use crate::ast::Expression;
use crate::registry::{FunctionRegistry, OperatorRegistry};

/// Parse a formula with the standard registries
///
/// With `allow_compilation` the tree is also lowered to closures right away.
/// A compilation failure is not a parse failure: it is logged and the tree
/// falls back to tree walking.
pub fn parse(input: &str, allow_compilation: bool) -> ParseResult<Expression> {
    let operators = OperatorRegistry::standard();
    let functions = FunctionRegistry::standard();
    let expression = parse_with(input, &operators, &functions)?;
    if allow_compilation {
        expression.compile();
    }
    Ok(expression)
}
