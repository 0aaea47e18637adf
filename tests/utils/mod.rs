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

//! Host contexts shared by the integration tests

#![allow(dead_code)]

use octo_formula::{Context, HostResult, ObjectRef, Value, parse};

/// Payload of the `a` object
#[derive(Debug)]
pub struct Probe;

/// Host object wrapping a number, unwrapped by `resolve`
#[derive(Debug)]
pub struct Stat(pub i64);

/// Deterministic host used by the oracle tables
///
/// - `a` is an object whose members `x` and `y` are the strings `"x"` and `"y"`;
/// - the globals `x` and `y` answer the same strings;
/// - `F<n>(...)` and `a.M<n>(...)` answer their own name when called with
///   exactly `n` arguments and `unknown` otherwise;
/// - `a[i1, ..., in]` answers `"["` followed by `n - 1` commas and `"]"`;
/// - `stat` is an object that resolves to `12` when read as a value.
pub struct TestContext {
    probe: ObjectRef,
    stat: ObjectRef,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            probe: ObjectRef::new(Probe),
            stat: ObjectRef::new(Stat(12)),
        }
    }

    pub fn probe(&self) -> &ObjectRef {
        &self.probe
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn expected_arity(name: &str, prefix: char) -> Option<usize> {
    name.strip_prefix(prefix)?.parse().ok()
}

impl Context for TestContext {
    fn get_var(&self, obj: Option<&ObjectRef>, name: &str) -> HostResult<Value> {
        let value = match (obj, name) {
            (None, "a") => Value::Object(self.probe.clone()),
            (None, "stat") => Value::Object(self.stat.clone()),
            (None, "hp") => Value::Int(40),
            (None, "max_hp") => Value::Int(120),
            (None, "speed") => Value::Float(1.5),
            (None, "name") => Value::string("knight"),
            (None, "nothing") => Value::Null,
            (None, "x" | "y") => Value::string(name),
            (Some(obj), "x" | "y") if obj.is::<Probe>() => Value::string(name),
            _ => Value::Unknown,
        };
        Ok(value)
    }

    fn call(&self, obj: Option<&ObjectRef>, name: &str, args: &[Value]) -> HostResult<Value> {
        let arity = match obj {
            None => expected_arity(name, 'F'),
            Some(obj) if obj.is::<Probe>() => expected_arity(name, 'M'),
            Some(_) => None,
        };
        Ok(match arity {
            Some(n) if n == args.len() => Value::string(name),
            _ => Value::Unknown,
        })
    }

    fn get_by_index(&self, obj: &ObjectRef, indices: &[Value]) -> HostResult<Value> {
        if !obj.is::<Probe>() || indices.is_empty() {
            return Ok(Value::Unknown);
        }
        Ok(Value::String(format!("[{}]", ",".repeat(indices.len() - 1))))
    }

    fn dump(&self) -> String {
        "TestContext { a, stat }".to_string()
    }

    fn resolve(&self, value: Value) -> HostResult<Value> {
        Ok(match &value {
            Value::Object(obj) => match obj.downcast_ref::<Stat>() {
                Some(stat) => Value::Int(stat.0),
                None => value,
            },
            _ => value,
        })
    }
}

/// Host whose variable lookups fail and whose calls panic
pub struct ThrowingContext;

impl Context for ThrowingContext {
    fn get_var(&self, _obj: Option<&ObjectRef>, name: &str) -> HostResult<Value> {
        anyhow::bail!("lookup of '{name}' failed")
    }

    fn call(&self, _obj: Option<&ObjectRef>, name: &str, _args: &[Value]) -> HostResult<Value> {
        panic!("call to '{name}' exploded")
    }

    fn get_by_index(&self, _obj: &ObjectRef, _indices: &[Value]) -> HostResult<Value> {
        anyhow::bail!("indexing failed")
    }

    fn dump(&self) -> String {
        "ThrowingContext".to_string()
    }
}

/// Parse `text` and evaluate it against a fresh [`TestContext`]
pub fn evaluate(text: &str, compiled: bool) -> Value {
    let tree = parse(text, compiled).unwrap_or_else(|e| panic!("'{text}' should parse: {e}"));
    assert_eq!(tree.is_compiled(), compiled, "compilation state of '{text}'");
    tree.calc(&TestContext::new(), true)
}
