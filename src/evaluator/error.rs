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

//! Error types for formula evaluation

use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur while evaluating a formula
///
/// Type mismatches are not errors: they evaluate to `Value::Unknown`. What is
/// left are failures reported by the host and trees that do not have the
/// operand layout their operator expects.
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// The host context or a native function failed
    #[error("Host error: {0}")]
    Host(#[from] anyhow::Error),

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

    /// Panic raised by host code during evaluation
    #[error("Evaluation panicked: {0}")]
    Panic(String),
}

impl EvaluationError {
    /// Wrong operand count for `operator`
    pub fn invalid_operands(operator: &str, expected: &'static str, actual: usize) -> Self {
        Self::InvalidOperands {
            operator: operator.to_string(),
            expected,
            actual,
        }
    }

    /// Whether the error came from the host side
    pub fn is_host_error(&self) -> bool {
        matches!(self, Self::Host(_) | Self::Panic(_))
    }
}
