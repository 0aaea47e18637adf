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

//! Macros for registering native functions
//!
//! Native functions are ordinary Rust functions with one of the two fixed
//! call shapes. Listing a function in [`register_natives!`] is all it takes to
//! make it callable from formula text under its own name; the compiler
//! rejects anything with the wrong shape.

/// Register plain functions in a [`FunctionRegistry`](crate::registry::FunctionRegistry)
/// under their identifiers
///
/// # Usage
/// ```rust
/// use octo_formula::evaluator::EvaluationResult;
/// use octo_formula::model::{Context, Value};
/// use octo_formula::registry::FunctionRegistry;
/// use octo_formula::register_natives;
///
/// fn morale(ctx: &dyn Context, _args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
///     Ok(ctx.get_var(None, "base_morale")?)
/// }
///
/// fn zero(_ctx: &dyn Context, _as_value: bool) -> EvaluationResult<Value> {
///     Ok(Value::Int(0))
/// }
///
/// let mut registry = FunctionRegistry::new();
/// register_natives!(registry; functions: [morale]; precompiled: [zero]);
/// assert!(registry.function("morale").is_some());
/// assert!(registry.precompiled("zero").is_some());
/// ```
#[macro_export]
macro_rules! register_natives {
    // Free functions only
    ($registry:expr; functions: [$($function:ident),* $(,)?] $(;)?) => {{
        $( $registry.register_function(stringify!($function), $function); )*
    }};

    // Precompiled expressions only
    ($registry:expr; precompiled: [$($precompiled:ident),* $(,)?] $(;)?) => {{
        $( $registry.register_precompiled(stringify!($precompiled), $precompiled); )*
    }};

    // Both shapes
    ($registry:expr; functions: [$($function:ident),* $(,)?]; precompiled: [$($precompiled:ident),* $(,)?] $(;)?) => {{
        $( $registry.register_function(stringify!($function), $function); )*
        $( $registry.register_precompiled(stringify!($precompiled), $precompiled); )*
    }};
}
