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

//! Value model and host capability
//!
//! The engine's universal [`Value`] type, opaque [`ObjectRef`] handles, and the
//! [`Context`] trait through which all host semantics enter an evaluation.

#![warn(missing_docs)]

pub mod context;
pub mod json;
pub mod object;
pub mod value;

pub use context::{Context, EmptyContext, HostResult};
pub use json::{JsonContext, JsonNode};
pub use object::ObjectRef;
pub use value::{NumericPair, Value};
