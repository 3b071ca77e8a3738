//! Opaque identifiers shared by the input and output trees.

use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// A binding identifier. Fresh per binding site; equality is by `id` alone,
/// the `name` is a display hint and two `Id`s with the same name are
/// distinct bindings.
#[derive(Debug, Clone)]
pub struct Id {
    id: u32,
    pub name: String,
    pub mutable: bool,
}

impl Id {
    pub fn fresh(name: impl Into<String>, mutable: bool) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self { id, name: name.into(), mutable }
    }

    pub fn raw(&self) -> u32 {
        self.id
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Id {}

impl std::hash::Hash for Id {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Opaque handle into the metadata store for a type entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// Opaque handle into the metadata store for a method entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub u32);

/// Opaque handle into the metadata store for a constructor entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtorId(pub u32);

/// Opaque handle into the metadata store for a field entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub u32);

/// Sentinel type entity recognized by the translator as a fully dynamic
/// object (§4.1.1): calls through it are resolved structurally rather than
/// through the metadata store.
pub const DYNAMIC_TYPE: TypeId = TypeId(u32::MAX);
