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

//! Opaque handles to host objects

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Reference to an object living in the host's object graph.
///
/// The engine never looks inside an object: it only carries the handle from
/// one [`Context`](crate::model::Context) call to the next. Hosts recover the
/// concrete type with [`ObjectRef::downcast_ref`].
#[derive(Clone)]
pub struct ObjectRef {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ObjectRef {
    /// Wrap a host value into a new handle
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared host value without cloning it
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: short_type_name(std::any::type_name::<T>()),
        }
    }

    /// Borrow the host value if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Check whether the handle points at a value of type `T`
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Unqualified Rust type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Identity comparison: two handles are equal when they share the same allocation
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.type_name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    // Generic arguments may contain paths too, so only strip the prefix before them
    let head_end = full.find('<').unwrap_or(full.len());
    match full[..head_end].rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
