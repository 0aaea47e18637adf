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

//! Built-in operators

pub mod arithmetic;
pub mod comparison;
pub mod logical;
pub mod structural;

pub use arithmetic::*;
pub use comparison::*;
pub use logical::*;
pub use structural::*;

use super::operator::OperatorRegistry;

/// Register every built-in operator
pub fn register_builtin_operators(registry: &mut OperatorRegistry) {
    // Structural forms
    registry.register(DotOperator);
    registry.register(ParenthesisOperator);
    registry.register(FunctionCallOperator);
    registry.register(MethodCallOperator);
    registry.register(IndexerOperator);

    // Prefix and debug operators
    registry.register(NotOperator);
    registry.register(DumpOperator);
    registry.register(LogOperator);

    // Arithmetic
    registry.register(PowerOperator);
    registry.register(MultiplyOperator);
    registry.register(DivideOperator);
    registry.register(ModuloOperator);
    registry.register(AddOperator);
    registry.register(SubtractOperator);

    // Comparison
    registry.register(OrderingOperator::less_than());
    registry.register(OrderingOperator::less_than_or_equal());
    registry.register(OrderingOperator::greater_than());
    registry.register(OrderingOperator::greater_than_or_equal());
    registry.register(EqualOperator);
    registry.register(NotEqualOperator);

    // Logical
    registry.register(AndOperator);
    registry.register(OrOperator);
}
