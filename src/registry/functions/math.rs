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

//! Host-independent math library

use crate::evaluator::EvaluationResult;
use crate::model::{Context, NumericPair, Value};
use crate::registry::FunctionRegistry;

/// Register the math library
pub fn register_math_functions(registry: &mut FunctionRegistry) {
    crate::register_natives!(
        registry;
        functions: [min, max, abs, floor, ceil, round, sqrt, clamp, iif];
        precompiled: [pi, e]
    );
}

fn extreme(args: &[Value], keep_left: fn(&Value, &Value) -> bool) -> Value {
    let Some((first, rest)) = args.split_first() else {
        return Value::Unknown;
    };
    if !first.is_numeric() {
        return Value::Unknown;
    }
    let mut best = first.clone();
    let mut all_ints = matches!(first, Value::Int(_));
    for candidate in rest {
        if !candidate.is_numeric() {
            return Value::Unknown;
        }
        all_ints &= matches!(candidate, Value::Int(_));
        if !keep_left(&best, candidate) {
            best = candidate.clone();
        }
    }
    match (all_ints, best.as_f64()) {
        (true, _) => best,
        (false, Some(f)) => Value::Float(f),
        (false, None) => Value::Unknown,
    }
}

/// `min(a, b, ...)`: smallest numeric argument, Float if any argument is a Float
pub fn min(_ctx: &dyn Context, args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
    Ok(extreme(args, |best, candidate| {
        best.compare(candidate).is_some_and(|o| o.is_le())
    }))
}

/// `max(a, b, ...)`: largest numeric argument, Float if any argument is a Float
pub fn max(_ctx: &dyn Context, args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
    Ok(extreme(args, |best, candidate| {
        best.compare(candidate).is_some_and(|o| o.is_ge())
    }))
}

/// `abs(x)`
pub fn abs(_ctx: &dyn Context, args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
    Ok(match args {
        [Value::Int(i)] => Value::Int(i.wrapping_abs()),
        [Value::Float(f)] => Value::Float(f.abs()),
        _ => Value::Unknown,
    })
}

fn float_to_int(args: &[Value], op: fn(f64) -> f64) -> Value {
    match args {
        [Value::Int(i)] => Value::Int(*i),
        [Value::Float(f)] => {
            let rounded = op(*f);
            if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
                Value::Int(rounded as i64)
            } else {
                Value::Float(rounded)
            }
        }
        _ => Value::Unknown,
    }
}

/// `floor(x)`: largest integer not above `x`
pub fn floor(_ctx: &dyn Context, args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
    Ok(float_to_int(args, f64::floor))
}

/// `ceil(x)`: smallest integer not below `x`
pub fn ceil(_ctx: &dyn Context, args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
    Ok(float_to_int(args, f64::ceil))
}

/// `round(x)`: nearest integer, halves away from zero
pub fn round(_ctx: &dyn Context, args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
    Ok(float_to_int(args, f64::round))
}

/// `sqrt(x)`
pub fn sqrt(_ctx: &dyn Context, args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
    Ok(match args {
        [x] => x.as_f64().map_or(Value::Unknown, |f| Value::Float(f.sqrt())),
        _ => Value::Unknown,
    })
}

/// `clamp(x, lo, hi)`
pub fn clamp(_ctx: &dyn Context, args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
    let [x, lo, hi] = args else {
        return Ok(Value::Unknown);
    };
    let (Some(xf), Some(lof), Some(hif)) = (x.as_f64(), lo.as_f64(), hi.as_f64()) else {
        return Ok(Value::Unknown);
    };
    Ok(match (Value::numeric_pair(x, lo), Value::numeric_pair(x, hi)) {
        (Some(NumericPair::Ints(xi, loi)), Some(NumericPair::Ints(_, hii))) if loi <= hii => {
            Value::Int(xi.clamp(loi, hii))
        }
        (Some(NumericPair::Ints(..)), Some(NumericPair::Ints(..))) => Value::Unknown,
        // NaN bounds fail this check too
        _ if lof <= hif => Value::Float(xf.clamp(lof, hif)),
        _ => Value::Unknown,
    })
}

/// `iif(condition, when_true, when_false)`
pub fn iif(_ctx: &dyn Context, args: &[Value], _as_value: bool) -> EvaluationResult<Value> {
    Ok(match args {
        [condition, when_true, when_false] => {
            if condition.is_truthy() {
                when_true.clone()
            } else {
                when_false.clone()
            }
        }
        _ => Value::Unknown,
    })
}

/// `#pi`
pub fn pi(_ctx: &dyn Context, _as_value: bool) -> EvaluationResult<Value> {
    Ok(Value::Float(std::f64::consts::PI))
}

/// `#e`
pub fn e(_ctx: &dyn Context, _as_value: bool) -> EvaluationResult<Value> {
    Ok(Value::Float(std::f64::consts::E))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmptyContext;

    fn call(f: fn(&dyn Context, &[Value], bool) -> EvaluationResult<Value>, args: &[Value]) -> Value {
        f(&EmptyContext, args, true).unwrap()
    }

    #[test]
    fn min_max_keep_integer_type() {
        assert_eq!(call(min, &[3.into(), 1.into(), 2.into()]), Value::Int(1));
        assert_eq!(call(max, &[3.into(), 1.into(), 2.into()]), Value::Int(3));
        assert_eq!(call(max, &[3.into(), 1.5.into()]), Value::Float(3.0));
        assert_eq!(call(min, &[]), Value::Unknown);
        assert_eq!(call(min, &[1.into(), "a".into()]), Value::Unknown);
    }

    #[test]
    fn rounding_produces_integers() {
        assert_eq!(call(floor, &[2.7.into()]), Value::Int(2));
        assert_eq!(call(ceil, &[2.1.into()]), Value::Int(3));
        assert_eq!(call(round, &[(-2.5).into()]), Value::Int(-3));
        assert_eq!(call(round, &[4.into()]), Value::Int(4));
        assert_eq!(call(floor, &[f64::INFINITY.into()]), Value::Float(f64::INFINITY));
    }

    #[test]
    fn clamp_respects_bounds() {
        assert_eq!(call(clamp, &[15.into(), 0.into(), 10.into()]), Value::Int(10));
        assert_eq!(call(clamp, &[0.5.into(), 1.into(), 10.into()]), Value::Float(1.0));
        assert_eq!(call(clamp, &[5.into(), 10.into(), 0.into()]), Value::Unknown);
        assert_eq!(call(clamp, &[5.into()]), Value::Unknown);
    }

    #[test]
    fn clamp_rejects_unordered_bounds_without_panicking() {
        assert_eq!(call(clamp, &[1.into(), f64::NAN.into(), 2.into()]), Value::Unknown);
        assert_eq!(call(clamp, &[1.into(), 0.into(), f64::NAN.into()]), Value::Unknown);
        assert_eq!(
            call(clamp, &[5.into(), i64::MAX.into(), (i64::MAX - 1).into()]),
            Value::Unknown
        );
        assert_eq!(
            call(clamp, &[5.into(), (i64::MAX - 1).into(), i64::MAX.into()]),
            Value::Int(i64::MAX - 1)
        );
    }

    #[test]
    fn wrong_arity_is_unknown() {
        assert_eq!(call(abs, &[]), Value::Unknown);
        assert_eq!(call(sqrt, &[1.into(), 2.into()]), Value::Unknown);
        assert_eq!(call(iif, &[true.into(), 1.into()]), Value::Unknown);
        assert_eq!(call(iif, &[Value::Null, 1.into(), 2.into()]), Value::Int(2));
    }
}
