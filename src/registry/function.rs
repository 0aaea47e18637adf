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

//! Native function table
//!
//! Host-side routines callable from formula text. Two fixed call shapes are
//! supported:
//!
//! - free functions `(context, args, as_value) -> value`, reached with
//!   `name(args)`;
//! - precompiled expressions `(context, as_value) -> value`, reached with
//!   `#name` and evaluated without going through the parser or the tree
//!   walker.
//!
//! The table is assembled once from an explicit list (see
//! [`register_natives!`](crate::register_natives)) and is read-only afterwards.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::evaluator::EvaluationResult;
use crate::model::{Context, Value};
use crate::registry::functions;

/// Signature of a native free function
pub type NativeFn = dyn Fn(&dyn Context, &[Value], bool) -> EvaluationResult<Value> + Send + Sync;

/// Signature of a precompiled expression, identical to a compiled formula
pub type PrecompiledFn = dyn Fn(&dyn Context, bool) -> EvaluationResult<Value> + Send + Sync;

/// A named native free function
#[derive(Clone)]
pub struct NativeFunctionDescr {
    /// Name the function is called by
    pub name: Arc<str>,
    /// The routine
    pub function: Arc<NativeFn>,
}

impl NativeFunctionDescr {
    /// Invoke the function
    pub fn call(&self, context: &dyn Context, args: &[Value], as_value: bool) -> EvaluationResult<Value> {
        (self.function)(context, args, as_value)
    }
}

impl fmt::Debug for NativeFunctionDescr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// A named hand-written evaluator reachable through `#name`
#[derive(Clone)]
pub struct PrecompiledDescr {
    /// Name used after `#`
    pub name: Arc<str>,
    /// The routine
    pub function: Arc<PrecompiledFn>,
}

impl PrecompiledDescr {
    /// Invoke the precompiled expression
    pub fn call(&self, context: &dyn Context, as_value: bool) -> EvaluationResult<Value> {
        (self.function)(context, as_value)
    }
}

impl fmt::Debug for PrecompiledDescr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Precompiled(#{})", self.name)
    }
}

/// Registry of native functions and precompiled expressions
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, NativeFunctionDescr>,
    precompiled: FxHashMap<String, PrecompiledDescr>,
}

static STANDARD: Lazy<Arc<FunctionRegistry>> = Lazy::new(|| {
    let mut registry = FunctionRegistry::new();
    functions::register_builtin_functions(&mut registry);
    log::debug!(
        "standard function registry built with {} functions and {} precompiled expressions",
        registry.functions.len(),
        registry.precompiled.len()
    );
    Arc::new(registry)
});

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared registry holding the built-in math library, built on first use
    pub fn standard() -> Arc<FunctionRegistry> {
        STANDARD.clone()
    }

    /// Create a registry pre-populated with the built-in math library
    pub fn with_builtins() -> Self {
        Self::standard().as_ref().clone()
    }

    /// Register a free function under `name`, replacing any previous one
    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&dyn Context, &[Value], bool) -> EvaluationResult<Value> + Send + Sync + 'static,
    {
        self.functions.insert(
            name.to_string(),
            NativeFunctionDescr {
                name: Arc::from(name),
                function: Arc::new(function),
            },
        );
    }

    /// Register a precompiled expression under `name`, replacing any previous one
    pub fn register_precompiled<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&dyn Context, bool) -> EvaluationResult<Value> + Send + Sync + 'static,
    {
        self.precompiled.insert(
            name.to_string(),
            PrecompiledDescr {
                name: Arc::from(name),
                function: Arc::new(function),
            },
        );
    }

    /// Builder-style variant of [`register_function`](Self::register_function)
    pub fn with_function<F>(mut self, name: &str, function: F) -> Self
    where
        F: Fn(&dyn Context, &[Value], bool) -> EvaluationResult<Value> + Send + Sync + 'static,
    {
        self.register_function(name, function);
        self
    }

    /// Builder-style variant of [`register_precompiled`](Self::register_precompiled)
    pub fn with_precompiled<F>(mut self, name: &str, function: F) -> Self
    where
        F: Fn(&dyn Context, bool) -> EvaluationResult<Value> + Send + Sync + 'static,
    {
        self.register_precompiled(name, function);
        self
    }

    /// Look up a free function by exact name
    pub fn function(&self, name: &str) -> Option<&NativeFunctionDescr> {
        self.functions.get(name)
    }

    /// Look up a precompiled expression by exact name
    pub fn precompiled(&self, name: &str) -> Option<&PrecompiledDescr> {
        self.precompiled.get(name)
    }

    /// Names of all free functions, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Names of all precompiled expressions, sorted
    pub fn precompiled_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.precompiled.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.functions.len() + self.precompiled.len()
    }

    /// Check if the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.precompiled.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.function_names())
            .field("precompiled", &self.precompiled_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmptyContext;

    fn double(_: &dyn Context, args: &[Value], _: bool) -> EvaluationResult<Value> {
        Ok(match args {
            [Value::Int(i)] => Value::Int(i * 2),
            _ => Value::Unknown,
        })
    }

    fn answer(_: &dyn Context, _: bool) -> EvaluationResult<Value> {
        Ok(Value::Int(42))
    }

    #[test]
    fn macro_registers_by_identifier() {
        let mut registry = FunctionRegistry::new();
        crate::register_natives!(registry; functions: [double]; precompiled: [answer]);

        let ctx = EmptyContext;
        let double = registry.function("double").expect("double registered");
        assert_eq!(double.call(&ctx, &[Value::Int(4)], true).unwrap(), Value::Int(8));
        let answer = registry.precompiled("answer").expect("answer registered");
        assert_eq!(answer.call(&ctx, true).unwrap(), Value::Int(42));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn builder_accepts_closures() {
        let bonus = 5;
        let registry = FunctionRegistry::new()
            .with_function("bonus", move |_, _, _| Ok(Value::Int(bonus)))
            .with_precompiled("one", |_, _| Ok(Value::Int(1)));
        assert_eq!(registry.function_names(), vec!["bonus"]);
        assert_eq!(registry.precompiled_names(), vec!["one"]);
        assert!(registry.function("Bonus").is_none());
    }

    #[test]
    fn standard_table_has_math_library() {
        let registry = FunctionRegistry::standard();
        for name in ["min", "max", "abs", "floor", "ceil", "round", "sqrt", "clamp", "iif"] {
            assert!(registry.function(name).is_some(), "missing {name}");
        }
        assert!(registry.precompiled("pi").is_some());
        assert!(registry.precompiled("e").is_some());
    }
}
