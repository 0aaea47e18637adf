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

//! Structural forms and debug operators
//!
//! These operators carry no calculation of their own: the evaluator and the
//! compiler dispatch on their [`OperatorForm`] to decide how operands are
//! evaluated and which [`Context`](crate::model::Context) call to make.

use super::super::operator::{
    FormulaOperator, OperatorForm, PREFIX_PRIORITY, STRUCTURAL_PRIORITY,
};

/// Member access operator (.)
pub struct DotOperator;

impl FormulaOperator for DotOperator {
    fn symbol(&self) -> &str {
        "."
    }
    fn human_friendly_name(&self) -> &str {
        "Member Access"
    }
    fn priority(&self) -> i32 {
        STRUCTURAL_PRIORITY
    }
    fn form(&self) -> OperatorForm {
        OperatorForm::Dot
    }
}

/// Grouping `( expr )`
pub struct ParenthesisOperator;

impl FormulaOperator for ParenthesisOperator {
    fn symbol(&self) -> &str {
        "( )"
    }
    fn human_friendly_name(&self) -> &str {
        "Parenthesis"
    }
    fn priority(&self) -> i32 {
        STRUCTURAL_PRIORITY
    }
    fn form(&self) -> OperatorForm {
        OperatorForm::Parenthesis
    }
}

/// Free function call `name(args)`
pub struct FunctionCallOperator;

impl FormulaOperator for FunctionCallOperator {
    fn symbol(&self) -> &str {
        "()"
    }
    fn human_friendly_name(&self) -> &str {
        "Function Call"
    }
    fn priority(&self) -> i32 {
        STRUCTURAL_PRIORITY
    }
    fn form(&self) -> OperatorForm {
        OperatorForm::FunctionCall
    }
}

/// Method call `obj.name(args)`
pub struct MethodCallOperator;

impl FormulaOperator for MethodCallOperator {
    fn symbol(&self) -> &str {
        ".()"
    }
    fn human_friendly_name(&self) -> &str {
        "Method Call"
    }
    fn priority(&self) -> i32 {
        STRUCTURAL_PRIORITY
    }
    fn form(&self) -> OperatorForm {
        OperatorForm::MethodCall
    }
}

/// Indexing `obj[args]`
pub struct IndexerOperator;

impl FormulaOperator for IndexerOperator {
    fn symbol(&self) -> &str {
        "[]"
    }
    fn human_friendly_name(&self) -> &str {
        "Indexer"
    }
    fn priority(&self) -> i32 {
        STRUCTURAL_PRIORITY
    }
    fn form(&self) -> OperatorForm {
        OperatorForm::Indexer
    }
}

/// Prefix `@@`: logs the operand's value, the context dump and a per-node trace
pub struct DumpOperator;

impl FormulaOperator for DumpOperator {
    fn symbol(&self) -> &str {
        "@@"
    }
    fn human_friendly_name(&self) -> &str {
        "Dump"
    }
    fn priority(&self) -> i32 {
        PREFIX_PRIORITY
    }
    fn form(&self) -> OperatorForm {
        OperatorForm::Dump
    }
    fn is_unary(&self) -> bool {
        true
    }
}

/// Prefix `@`: logs the operand's text and value
pub struct LogOperator;

impl FormulaOperator for LogOperator {
    fn symbol(&self) -> &str {
        "@"
    }
    fn human_friendly_name(&self) -> &str {
        "Log"
    }
    fn priority(&self) -> i32 {
        PREFIX_PRIORITY
    }
    fn form(&self) -> OperatorForm {
        OperatorForm::Log
    }
    fn is_unary(&self) -> bool {
        true
    }
}
