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

//! Parser error types

use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with location information
///
/// Positions are byte offsets into the source text. When several
/// alternatives fail, the error reported is the one that got furthest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was empty or blank
    #[error("Empty expression")]
    EmptyExpression,

    /// An operand was required but none could be read
    #[error("Expected operand at position {position}")]
    ExpectedOperand {
        /// Position where the operand was expected
        position: usize,
    },

    /// Quoted string without a closing delimiter
    #[error("Unterminated string literal starting at position {position}")]
    UnterminatedString {
        /// Position of the opening quote
        position: usize,
    },

    /// `#name` does not refer to a registered precompiled expression
    #[error("Unknown precompiled expression '#{name}' at position {position}")]
    UnknownPrecompiled {
        /// Name after `#`
        name: String,
        /// Position of the `#`
        position: usize,
    },

    /// A specific character was required
    #[error("Expected '{expected}' at position {position}")]
    Expected {
        /// The character that was required
        expected: char,
        /// Position where it was expected
        position: usize,
    },

    /// `.` not followed by a member name
    #[error("Expected member name after '.' at position {position}")]
    ExpectedMember {
        /// Position after the dot
        position: usize,
    },

    /// Non-associative operator chained with another of the same priority
    #[error("Operator '{operator}' cannot be chained at position {position}; add parentheses")]
    NonAssociative {
        /// Symbol of the rejected operator
        operator: String,
        /// Position of the rejected operator
        position: usize,
    },

    /// Input left over after a complete expression
    #[error("Unexpected '{found}' at position {position}")]
    UnexpectedInput {
        /// The unconsumed text, truncated
        found: String,
        /// Position of the first unconsumed byte
        position: usize,
    },
}

impl ParseError {
    /// Position associated with the error, if any
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::EmptyExpression => None,
            ParseError::ExpectedOperand { position }
            | ParseError::UnterminatedString { position }
            | ParseError::UnknownPrecompiled { position, .. }
            | ParseError::Expected { position, .. }
            | ParseError::ExpectedMember { position }
            | ParseError::NonAssociative { position, .. }
            | ParseError::UnexpectedInput { position, .. } => Some(*position),
        }
    }
}
