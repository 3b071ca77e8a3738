//! `TransformTypeCheck` / `GetTypeCheckKind` (§4.1.6).

use crate::error::{TranslateError, TranslateResult};
use wasp_ir::{BinaryOp, ConcreteType, Expr, Literal, UnaryOp};
use wasp_meta::{ClassAddressOrCustomType, CustomTypeInfo, ErrorKind, MetadataStore, WellKnownType};

/// Classification of a single `TypeCheck` node, mirroring the cases
/// `GetTypeCheckKind` distinguishes.
#[derive(Debug, Clone, PartialEq)]
enum TypeCheckKind {
    TypeOf(&'static str),
    InstanceOf(wasp_ir::Address),
    IsNull,
    PlainObject(CustomTypeInfo),
    Disposable,
    /// A type-parameter test inside an inline body; resolved later by the
    /// inline-resolution engine once generics are substituted (§4.2).
    DeferredToInline,
}

fn classify(store: &dyn MetadataStore, concrete: &ConcreteType, in_inline: bool) -> TranslateResult<TypeCheckKind> {
    if let Some(well_known) = store.well_known(concrete.entity) {
        return match well_known {
            WellKnownType::Number => Ok(TypeCheckKind::TypeOf("number")),
            WellKnownType::StringType => Ok(TypeCheckKind::TypeOf("string")),
            WellKnownType::Boolean => Ok(TypeCheckKind::TypeOf("boolean")),
            WellKnownType::JsFunction => Ok(TypeCheckKind::TypeOf("function")),
            WellKnownType::JsObject => Ok(TypeCheckKind::TypeOf("object")),
            WellKnownType::Void => Ok(TypeCheckKind::TypeOf("undefined")),
            WellKnownType::Unit => Ok(TypeCheckKind::IsNull),
            WellKnownType::ErrorClass => Ok(TypeCheckKind::InstanceOf(wasp_ir::Address::new(["Error"]))),
            WellKnownType::ArrayClass => Ok(TypeCheckKind::InstanceOf(wasp_ir::Address::new(["Array"]))),
            WellKnownType::IDisposable => Ok(TypeCheckKind::Disposable),
            WellKnownType::TypeParameter if in_inline => Ok(TypeCheckKind::DeferredToInline),
            WellKnownType::TypeParameter => {
                Err(TranslateError::source("type parameter used in a type check outside an inline body"))
            }
            WellKnownType::ArrayOrFunctionGeneric => {
                Err(TranslateError::source("generic System.Array/Function type check is not supported"))
            }
        };
    }

    match store.try_lookup_class_address_or_custom_type(concrete.entity) {
        ClassAddressOrCustomType::Address(addr) => Ok(TypeCheckKind::InstanceOf(addr)),
        ClassAddressOrCustomType::CustomType(info) => Ok(TypeCheckKind::PlainObject(info)),
        ClassAddressOrCustomType::None => Err(TranslateError::new(ErrorKind::TypeNotFound)),
    }
}

fn typeof_equals(translated_expr: Expr, tag: &str) -> Expr {
    Expr::Binary {
        left: Box::new(Expr::Unary { op: UnaryOp::TypeOf, expr: Box::new(translated_expr) }),
        op: BinaryOp::Equal,
        right: Box::new(Expr::Literal(Literal::String(tag.to_string()))),
    }
}

/// Lowers `Expr::TypeCheck { expr, concrete_type }`. Returns the rewritten
/// expression plus whether `has_delayed_transform` must be set on the
/// enclosing `TranslatorState` (a type-parameter test that can only be
/// resolved once the inline-resolution engine substitutes generics).
pub fn transform_type_check(
    store: &dyn MetadataStore,
    translated_expr: Expr,
    concrete_type: &ConcreteType,
    in_inline: bool,
) -> TranslateResult<(Expr, bool)> {
    match classify(store, concrete_type, in_inline)? {
        TypeCheckKind::TypeOf(tag) => Ok((typeof_equals(translated_expr, tag), false)),
        TypeCheckKind::InstanceOf(addr) => Ok((
            Expr::InstanceOf { expr: Box::new(translated_expr), ctor: Box::new(Expr::GlobalAccess(addr)) },
            false,
        )),
        TypeCheckKind::IsNull => Ok((
            Expr::StrictEq { left: Box::new(translated_expr), right: Box::new(Expr::Literal(Literal::Null)) },
            false,
        )),
        TypeCheckKind::Disposable => Ok((
            Expr::In {
                key: Box::new(Expr::Literal(Literal::String("Dispose".to_string()))),
                obj: Box::new(translated_expr),
            },
            false,
        )),
        TypeCheckKind::PlainObject(CustomTypeInfo::Union { cases, erased }) => {
            let expr = crate::custom_type::transform_union_case_test_fallthrough(translated_expr, &cases, erased)?;
            Ok((expr, false))
        }
        TypeCheckKind::PlainObject(CustomTypeInfo::UnionCase { union: _, case }) => {
            let expr = crate::custom_type::transform_union_case_test_single(translated_expr, &case)?;
            Ok((expr, false))
        }
        TypeCheckKind::PlainObject(_) => Ok((typeof_equals(translated_expr, "object"), false)),
        TypeCheckKind::DeferredToInline => Ok((
            Expr::TypeCheck { expr: Box::new(translated_expr), concrete_type: concrete_type.clone() },
            true,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasp_ir::{ConcreteType, TypeId};
    use wasp_meta::MemoryMetadataStore;

    #[test]
    fn number_type_check_lowers_to_typeof_equality() {
        let mut store = MemoryMetadataStore::without_graph();
        let number = TypeId(1);
        store.define_well_known(number, WellKnownType::Number);
        let (expr, delayed) =
            transform_type_check(&store, Expr::Var(wasp_ir::Id::fresh("x", false)), &ConcreteType::simple(number), false)
                .unwrap();
        assert!(!delayed);
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::Equal, .. }));
    }

    #[test]
    fn type_parameter_outside_inline_is_an_error() {
        let mut store = MemoryMetadataStore::without_graph();
        let param = TypeId(2);
        store.define_well_known(param, WellKnownType::TypeParameter);
        let result =
            transform_type_check(&store, Expr::Var(wasp_ir::Id::fresh("x", false)), &ConcreteType::simple(param), false);
        assert!(result.is_err());
    }

    #[test]
    fn type_parameter_inside_inline_defers() {
        let mut store = MemoryMetadataStore::without_graph();
        let param = TypeId(2);
        store.define_well_known(param, WellKnownType::TypeParameter);
        let (_, delayed) =
            transform_type_check(&store, Expr::Var(wasp_ir::Id::fresh("x", false)), &ConcreteType::simple(param), true)
                .unwrap();
        assert!(delayed);
    }
}
