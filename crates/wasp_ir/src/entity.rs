use crate::ids::{CtorId, MethodId, TypeId};

/// A type reference together with the generic arguments it was used at.
/// Generic lists are positional, per the metadata surface's contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteType {
    pub entity: TypeId,
    pub generics: Vec<ConcreteType>,
}

impl ConcreteType {
    pub fn simple(entity: TypeId) -> Self {
        Self { entity, generics: Vec::new() }
    }

    pub fn is_dynamic(&self) -> bool {
        self.entity == crate::ids::DYNAMIC_TYPE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteMethod {
    pub entity: MethodId,
    pub generics: Vec<ConcreteType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteCtor {
    pub entity: CtorId,
}
