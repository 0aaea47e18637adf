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

//! Formula evaluator
//!
//! [`Expression::calc`] is the error boundary every host call should go
//! through: it never fails and never panics. Host errors and panics are
//! trapped, logged once with the formula text, and turned into
//! [`Value::Unknown`]. Host callbacks may themselves evaluate other formulas;
//! only the outermost `calc` on a thread logs.

#![warn(missing_docs)]

mod error;
pub(crate) mod structural;
pub(crate) mod trace;
mod walk;

pub use error::{EvaluationError, EvaluationResult};
pub(crate) use walk::{Arguments, identifier};

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ast::Expression;
use crate::model::{Context, Value};

static EVALUATIONS: AtomicU64 = AtomicU64::new(0);
static FAILURES: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static EVALUATING: Cell<bool> = const { Cell::new(false) };
}

/// Number of `calc` calls made in this process
pub fn evaluation_count() -> u64 {
    EVALUATIONS.load(Ordering::Relaxed)
}

/// Number of `calc` calls that degraded to `Unknown` because of an error
pub fn failure_count() -> u64 {
    FAILURES.load(Ordering::Relaxed)
}

/// Marks the current thread as evaluating for the guard's lifetime
struct EvaluationGuard {
    outermost: bool,
}

impl EvaluationGuard {
    fn enter() -> Self {
        let nested = EVALUATING.with(|flag| flag.replace(true));
        Self { outermost: !nested }
    }
}

impl Drop for EvaluationGuard {
    fn drop(&mut self) {
        if self.outermost {
            EVALUATING.with(|flag| flag.set(false));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

impl Expression {
    /// Evaluate against `ctx`, degrading any failure to `Unknown`
    ///
    /// With `as_value` the host's [`Context::resolve`] hook is applied to
    /// looked-up results, so the caller gets a plain value rather than a
    /// reference into the host.
    pub fn calc(&self, ctx: &dyn Context, as_value: bool) -> Value {
        self.calc_checked(ctx, as_value).unwrap_or(Value::Unknown)
    }

    /// Same boundary as [`calc`](Self::calc), handing the trapped error back
    ///
    /// The failure is still counted and logged; the caller only decides what
    /// to do with it instead of receiving `Unknown`.
    pub fn calc_checked(&self, ctx: &dyn Context, as_value: bool) -> EvaluationResult<Value> {
        EVALUATIONS.fetch_add(1, Ordering::Relaxed);
        let guard = EvaluationGuard::enter();

        let error = match panic::catch_unwind(AssertUnwindSafe(|| self.try_calc(ctx, as_value))) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(error)) => error,
            Err(payload) => EvaluationError::Panic(panic_message(payload.as_ref())),
        };

        FAILURES.fetch_add(1, Ordering::Relaxed);
        if guard.outermost {
            log::error!("failed to evaluate '{self}': {error}");
        } else {
            log::trace!("nested evaluation of '{self}' failed: {error}");
        }
        self.store_result(&Value::Unknown);
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmptyContext, HostResult, ObjectRef};
    use crate::parser::parse;

    struct FailingContext;

    impl Context for FailingContext {
        fn get_var(&self, _obj: Option<&ObjectRef>, name: &str) -> HostResult<Value> {
            anyhow::bail!("no variable {name}")
        }
        fn call(&self, _obj: Option<&ObjectRef>, _name: &str, _args: &[Value]) -> HostResult<Value> {
            panic!("host call exploded")
        }
        fn get_by_index(&self, _obj: &ObjectRef, _indices: &[Value]) -> HostResult<Value> {
            Ok(Value::Unknown)
        }
        fn dump(&self) -> String {
            "FailingContext".to_string()
        }
    }

    #[test]
    fn host_errors_become_unknown() {
        let tree = parse("hp + 1", false).unwrap();
        assert!(tree.try_calc(&FailingContext, true).is_err());
        assert!(matches!(
            tree.calc_checked(&FailingContext, true),
            Err(EvaluationError::Host(_))
        ));
        assert_eq!(tree.calc(&FailingContext, true), Value::Unknown);
        assert_eq!(tree.last_result(), Value::Unknown);
    }

    #[test]
    fn panics_are_contained() {
        let tree = parse("F0()", false).unwrap();
        let before = failure_count();
        assert_eq!(tree.calc(&FailingContext, true), Value::Unknown);
        assert!(failure_count() > before);
        assert!(matches!(
            tree.calc_checked(&FailingContext, true),
            Err(EvaluationError::Panic(message)) if message == "host call exploded"
        ));
        assert!(matches!(
            tree.try_calc(&EmptyContext, true),
            Ok(Value::Unknown)
        ));
    }

    #[test]
    fn guard_tracks_nesting() {
        let outer = EvaluationGuard::enter();
        assert!(outer.outermost);
        {
            let inner = EvaluationGuard::enter();
            assert!(!inner.outermost);
        }
        assert!(EVALUATING.with(|flag| flag.get()));
        drop(outer);
        assert!(!EVALUATING.with(|flag| flag.get()));
    }

    #[test]
    fn counts_evaluations() {
        let tree = parse("1 + 1", false).unwrap();
        let before = evaluation_count();
        assert_eq!(tree.calc(&EmptyContext, true), Value::Int(2));
        assert!(evaluation_count() > before);
    }
}
