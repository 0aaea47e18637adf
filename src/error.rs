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

//! Error types for the formula engine
//!
//! Each layer has its own error enum; [`FormulaError`] wraps them for callers
//! that go through [`FormulaEngine`](crate::FormulaEngine).

use thiserror::Error;

use crate::compiler::CompilationError;
use crate::evaluator::EvaluationError;
use crate::parser::ParseError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, FormulaError>;

/// Comprehensive error type for formula operations
#[derive(Error, Debug)]
pub enum FormulaError {
    /// Formula text could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Evaluation failed in the host or on a malformed tree
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// Tree could not be lowered to closures
    #[error("Compilation error: {0}")]
    Compilation(#[from] CompilationError),

    /// Strict mode: the formula evaluated to `unknown`
    #[error("Formula '{expression}' evaluated to unknown")]
    UnknownResult {
        /// Text of the formula
        expression: String,
    },
}

impl FormulaError {
    /// Create an unknown-result error
    pub fn unknown_result(expression: impl Into<String>) -> Self {
        Self::UnknownResult {
            expression: expression.into(),
        }
    }

    /// Whether the formula text was at fault rather than the data it ran against
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
