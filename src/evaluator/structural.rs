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

//! Host call-outs shared by the tree walker and the compiler
//!
//! Both backends evaluate operands their own way and then hand the values to
//! these helpers, so the two paths agree on every structural form.

use crate::model::{Context, Value};
use crate::registry::NativeFunctionDescr;

use super::error::EvaluationResult;

/// Apply the host's `resolve` hook when a raw value was asked for
#[inline]
pub(crate) fn resolve(ctx: &dyn Context, value: Value, as_value: bool) -> EvaluationResult<Value> {
    if as_value {
        Ok(ctx.resolve(value)?)
    } else {
        Ok(value)
    }
}

/// Global variable lookup
pub(crate) fn variable(ctx: &dyn Context, name: &str, as_value: bool) -> EvaluationResult<Value> {
    let value = ctx.get_var(None, name)?;
    resolve(ctx, value, as_value)
}

/// `target.name`
pub(crate) fn member(
    ctx: &dyn Context,
    target: &Value,
    name: &str,
    as_value: bool,
) -> EvaluationResult<Value> {
    let Value::Object(object) = target else {
        return Ok(Value::Unknown);
    };
    let value = ctx.get_var(Some(object), name)?;
    resolve(ctx, value, as_value)
}

/// `name(args)`: the bound native wins, the host is asked otherwise
pub(crate) fn function(
    ctx: &dyn Context,
    native: Option<&NativeFunctionDescr>,
    name: &str,
    args: &[Value],
    as_value: bool,
) -> EvaluationResult<Value> {
    if let Some(native) = native {
        return native.call(ctx, args, as_value);
    }
    let value = ctx.call(None, name, args)?;
    resolve(ctx, value, as_value)
}

/// `target.name(args)`
pub(crate) fn method(
    ctx: &dyn Context,
    target: &Value,
    name: &str,
    args: &[Value],
    as_value: bool,
) -> EvaluationResult<Value> {
    let Value::Object(object) = target else {
        return Ok(Value::Unknown);
    };
    let value = ctx.call(Some(object), name, args)?;
    resolve(ctx, value, as_value)
}

/// `target[indices]`
pub(crate) fn index(
    ctx: &dyn Context,
    target: &Value,
    indices: &[Value],
    as_value: bool,
) -> EvaluationResult<Value> {
    let Value::Object(object) = target else {
        return Ok(Value::Unknown);
    };
    let value = ctx.get_by_index(object, indices)?;
    resolve(ctx, value, as_value)
}
