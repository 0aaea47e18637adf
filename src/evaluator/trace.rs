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

//! Output of the `@` and `@@` debug operators

use crate::ast::Expression;
use crate::model::{Context, Value};

/// `@expr`
pub(crate) fn log_value(text: &str, value: &Value) {
    log::info!("{text} = {}", value.to_literal());
}

/// `@@expr`: value, host context and the per-node trace of `operand`
pub(crate) fn dump_value(ctx: &dyn Context, operand: &Expression, value: &Value) {
    log::info!(
        "{operand} = {}\ncontext: {}\n{}",
        value.to_literal(),
        ctx.dump(),
        operand.dump("  ", "\n").trim_end()
    );
}
