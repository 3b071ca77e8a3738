//! Field get/set lowering (§4.1.7) and the static-constructor reference
//! rule (§4.1.8).

use crate::error::{TranslateError, TranslateResult};
use crate::runtime;
use wasp_ir::{ConcreteType, Expr, FieldId, Literal};
use wasp_meta::{ErrorKind, FieldLookup, GraphNode, MetadataStore};

fn item_get(obj: Expr, key: &str) -> Expr {
    Expr::ItemGetString { obj: Box::new(obj), key: Box::new(Expr::Literal(Literal::String(key.to_string()))) }
}

fn item_set(obj: Expr, key: &str, value: Expr) -> Expr {
    Expr::ItemSetString {
        obj: Box::new(obj),
        key: Box::new(Expr::Literal(Literal::String(key.to_string()))),
        value: Box::new(value),
    }
}

/// `obj` is `None` for a static field read/write. Adds the type-dependency
/// edge (on `concrete_type.entity`) before dispatching, matching §4.1.7's
/// "adds a type-dependency edge then dispatches".
pub fn transform_field_get(
    store: &mut dyn MetadataStore,
    current_node: &GraphNode,
    obj: Option<Expr>,
    concrete_type: &ConcreteType,
    field: FieldId,
) -> TranslateResult<Expr> {
    if let Some(graph) = store.graph_mut() {
        graph.add_edge(current_node.clone(), GraphNode::TypeNode(concrete_type.entity));
    }
    match store.lookup_field_info(concrete_type, field) {
        FieldLookup::InstanceField { name, .. } => {
            let obj = obj.ok_or_else(|| TranslateError::source("instance field read needs a receiver"))?;
            Ok(item_get(obj, &name))
        }
        FieldLookup::StaticField { address, has_cctor } => {
            let access = Expr::GlobalAccess(address);
            if has_cctor {
                Ok(Expr::Sequential(vec![Expr::CctorTrigger(concrete_type.clone()), access]))
            } else {
                Ok(access)
            }
        }
        FieldLookup::OptionalField { name } => {
            let obj = obj.ok_or_else(|| TranslateError::source("optional field read needs a receiver"))?;
            Ok(runtime::get_optional(item_get(obj, &name)))
        }
        FieldLookup::IndexedField { index } => {
            let obj = obj.ok_or_else(|| TranslateError::source("indexed field read needs a receiver"))?;
            Ok(Expr::ItemGetInt { obj: Box::new(obj), index: Box::new(Expr::Literal(Literal::Int(index as i64))) })
        }
        FieldLookup::CustomTypeField { js_name, optional } => {
            let obj = obj.ok_or_else(|| TranslateError::source("custom-type field read needs a receiver"))?;
            let raw = item_get(obj, &js_name);
            Ok(if optional { runtime::get_optional(raw) } else { raw })
        }
        FieldLookup::PropertyField { getter: Some(getter), .. } => {
            let obj = obj.ok_or_else(|| TranslateError::source("property field read needs a receiver"))?;
            Ok(Expr::Application { func: Box::new(item_get(obj, &getter)), args: vec![] })
        }
        FieldLookup::PropertyField { getter: None, .. } => {
            Err(TranslateError::new(ErrorKind::MemberNotFound))
        }
        FieldLookup::Error(kind) => Err(TranslateError::new(kind)),
    }
}

pub fn transform_field_set(
    store: &mut dyn MetadataStore,
    current_node: &GraphNode,
    obj: Option<Expr>,
    concrete_type: &ConcreteType,
    field: FieldId,
    value: Expr,
) -> TranslateResult<Expr> {
    if let Some(graph) = store.graph_mut() {
        graph.add_edge(current_node.clone(), GraphNode::TypeNode(concrete_type.entity));
    }
    match store.lookup_field_info(concrete_type, field) {
        FieldLookup::InstanceField { name, readonly } => {
            if readonly {
                return Err(TranslateError::source(format!("field '{name}' is read-only")));
            }
            let obj = obj.ok_or_else(|| TranslateError::source("instance field write needs a receiver"))?;
            Ok(item_set(obj, &name, value))
        }
        FieldLookup::StaticField { address, .. } => Ok(assign_global(address, value)),
        FieldLookup::OptionalField { name } => {
            let obj = obj.ok_or_else(|| TranslateError::source("optional field write needs a receiver"))?;
            Ok(runtime::set_optional(obj, &name, value))
        }
        FieldLookup::IndexedField { index } => {
            let obj = obj.ok_or_else(|| TranslateError::source("indexed field write needs a receiver"))?;
            Ok(Expr::ItemSetInt {
                obj: Box::new(obj),
                index: Box::new(Expr::Literal(Literal::Int(index as i64))),
                value: Box::new(value),
            })
        }
        FieldLookup::CustomTypeField { js_name, optional } => {
            let obj = obj.ok_or_else(|| TranslateError::source("custom-type field write needs a receiver"))?;
            Ok(if optional { runtime::set_optional(obj, &js_name, value) } else { item_set(obj, &js_name, value) })
        }
        FieldLookup::PropertyField { setter: Some(setter), .. } => {
            let obj = obj.ok_or_else(|| TranslateError::source("property field write needs a receiver"))?;
            Ok(Expr::Application { func: Box::new(item_get(obj, &setter)), args: vec![value] })
        }
        FieldLookup::PropertyField { setter: None, .. } => Err(TranslateError::new(ErrorKind::MemberNotFound)),
        FieldLookup::Error(kind) => Err(TranslateError::new(kind)),
    }
}

fn assign_global(address: wasp_ir::Address, value: Expr) -> Expr {
    // A bare global write has no JS "assignment expression" node of its own
    // in this IR; it is represented as an ItemSetString on the address's
    // containing object, with the root container standing in when the
    // address has no parent segment.
    let leaf = address.segments().last().copied().unwrap_or("").to_string();
    let container = address.parent().unwrap_or_else(|| wasp_ir::Address::new(Vec::<String>::new()));
    item_set(Expr::GlobalAccess(container), &leaf, value)
}

/// `TransformCctor` (§4.1.8).
pub fn transform_cctor(
    store: &mut dyn MetadataStore,
    current_node: &GraphNode,
    concrete_type: &ConcreteType,
) -> Expr {
    if let Some(graph) = store.graph_mut() {
        graph.add_edge(current_node.clone(), GraphNode::TypeNode(concrete_type.entity));
    }
    match store.try_lookup_static_constructor_address(concrete_type.entity) {
        Some(address) => Expr::GlobalAccess(address),
        None => Expr::Undefined,
    }
}
