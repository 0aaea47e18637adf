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

//! Operator and native function registries
//!
//! Both registries are plain values: build them once at startup (or use the
//! shared [`OperatorRegistry::standard`] / [`FunctionRegistry::standard`]
//! defaults) and pass them by reference to the parser and engine.

#![warn(missing_docs)]

pub mod function;
pub mod functions;
pub mod macros;
pub mod operator;
pub mod operators;

pub use function::{
    FunctionRegistry, NativeFn, NativeFunctionDescr, PrecompiledDescr, PrecompiledFn,
};
pub use operator::{
    Associativity, FormulaOperator, OperatorForm, OperatorRegistry, PREFIX_PRIORITY,
    STRUCTURAL_PRIORITY,
};

/// Create fresh standard registries with all built-in functions and operators
pub fn create_standard_registries() -> (FunctionRegistry, OperatorRegistry) {
    let mut functions = FunctionRegistry::new();
    let mut operators = OperatorRegistry::new();

    // Register built-in functions
    functions::register_builtin_functions(&mut functions);

    // Register built-in operators
    operator::register_builtin_operators(&mut operators);

    (functions, operators)
}
