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

//! Embedded formula engine
//!
//! Evaluates small, data-authored expressions such as `base * (1 + bonus)`,
//! `unit.hp / unit.max_hp < 0.25 && !unit.fleeing` or `clamp(morale, 0, 100)`
//! against a host object graph reached through the [`Context`] trait.
//!
//! Formulas are parsed once into [`Expression`] trees and evaluated as often as
//! needed, either by walking the tree or through closures built by
//! [`Expression::compile`]. Evaluation never fails: type mismatches produce
//! [`Value::Unknown`], and host errors are logged and degrade to `Unknown` too.
//!
//! ```rust
//! use octo_formula::{FormulaEngine, JsonContext, Value};
//!
//! let ctx = JsonContext::from_json_str(r#"{"unit": {"hp": 30, "max_hp": 120}}"#).unwrap();
//! let engine = FormulaEngine::new();
//! let low = engine.evaluate("unit.hp / unit.max_hp < 0.5", &ctx).unwrap();
//! assert_eq!(low, Value::Bool(true));
//! ```

pub mod ast;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod registry;

// Re-export main types
pub use ast::Expression;
pub use compiler::{CompilationError, CompiledExpression, CompilerConfig};
pub use engine::{EngineConfig, FormulaEngine};
pub use error::{FormulaError, Result};
pub use evaluator::{EvaluationError, EvaluationResult, evaluation_count, failure_count};
pub use model::{Context, EmptyContext, HostResult, JsonContext, ObjectRef, Value};
pub use parser::{ParseError, parse};
pub use registry::{FunctionRegistry, OperatorRegistry};
