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

//! Host capability the engine evaluates against

use super::object::ObjectRef;
use super::value::Value;

/// Result type for host callbacks
///
/// Hosts may fail with any error type; failures are trapped at the
/// evaluation boundary and degrade the formula result to `Unknown`.
pub type HostResult<T> = anyhow::Result<T>;

/// Access to the host object graph
///
/// This is the only way host semantics enter an evaluation: variable and
/// member lookups, function and method calls, and indexing are all forwarded
/// here. A `None` receiver means the lookup is global (a bare identifier or a
/// free function call).
pub trait Context {
    /// Resolve `name` globally (`obj == None`) or as a member of `obj`
    fn get_var(&self, obj: Option<&ObjectRef>, name: &str) -> HostResult<Value>;

    /// Call a free function (`obj == None`) or a method on `obj`
    fn call(&self, obj: Option<&ObjectRef>, name: &str, args: &[Value]) -> HostResult<Value>;

    /// Evaluate `obj[indices...]`
    fn get_by_index(&self, obj: &ObjectRef, indices: &[Value]) -> HostResult<Value>;

    /// Human readable description of the context, used by the dump operator
    fn dump(&self) -> String;

    /// Turn a lookup result into a plain value
    ///
    /// Called when the caller asked for a raw value rather than a reference
    /// it will keep navigating. Hosts whose objects wrap a scalar (a stat, a
    /// counter) unwrap it here; the default keeps the value unchanged.
    fn resolve(&self, value: Value) -> HostResult<Value> {
        Ok(value)
    }
}

/// Context without any variables, functions or objects
///
/// Every lookup answers `Unknown`. Useful for constant formulas and for
/// natives that do not need the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyContext;

impl Context for EmptyContext {
    fn get_var(&self, _obj: Option<&ObjectRef>, _name: &str) -> HostResult<Value> {
        Ok(Value::Unknown)
    }

    fn call(&self, _obj: Option<&ObjectRef>, _name: &str, _args: &[Value]) -> HostResult<Value> {
        Ok(Value::Unknown)
    }

    fn get_by_index(&self, _obj: &ObjectRef, _indices: &[Value]) -> HostResult<Value> {
        Ok(Value::Unknown)
    }

    fn dump(&self) -> String {
        "EmptyContext".to_string()
    }
}
