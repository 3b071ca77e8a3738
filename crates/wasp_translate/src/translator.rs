//! The Translator (§4.1): the recursive tree-to-tree dispatch that every
//! other module in this crate bottoms out in. Simple nodes just recurse
//! into their children; the nodes spec.md §4.1.1-§4.1.8 calls out by
//! number are handed to the matching dedicated module.

use crate::context::TranslatorState;
use crate::error::{TranslateError, TranslateResult};
use crate::{call, custom_type, field, runtime, typecheck};
use wasp_ir::{Expr, Id, Stmt};
use wasp_meta::{CustomTypeInfo, ErrorKind, MetadataStore};

/// Translates a single `Expr` node and, recursively, everything beneath
/// it. `state` carries the per-member context (§4.1 "TranslatorState")
/// and is threaded by value into any sub-translation this call spawns
/// (inline expansion, §4.2).
pub fn translate_expr(store: &mut dyn MetadataStore, state: &mut TranslatorState, expr: Expr) -> TranslateResult<Expr> {
    match expr {
        Expr::WithSourcePos(pos, inner) => match translate_expr(store, state, *inner) {
            Ok(translated) => Ok(translated.at(pos)),
            Err(err) => Err(err.at(Some(pos))),
        },

        leaf @ (Expr::Literal(_) | Expr::Var(_) | Expr::GlobalAccess(_) | Expr::This | Expr::Undefined | Expr::ErrorPlaceholder(_)) => {
            Ok(leaf)
        }
        Expr::Hole => Ok(Expr::Hole),

        Expr::Self_ => match &state.self_address {
            Some(addr) => Ok(Expr::GlobalAccess(addr.clone())),
            None => Ok(Expr::This),
        },
        Expr::Base => {
            if state.current_is_inline {
                Ok(Expr::Base)
            } else {
                Err(TranslateError::source("`base` used outside an inline body"))
            }
        }

        Expr::Let { id, value, body } => Ok(Expr::Let {
            id,
            value: Box::new(translate_expr(store, state, *value)?),
            body: Box::new(translate_expr(store, state, *body)?),
        }),
        Expr::LetRec { bindings, body } => {
            let bindings = bindings
                .into_iter()
                .map(|(id, e)| translate_expr(store, state, e).map(|e| (id, e)))
                .collect::<TranslateResult<Vec<_>>>()?;
            Ok(Expr::LetRec { bindings, body: Box::new(translate_expr(store, state, *body)?) })
        }
        Expr::Lambda { params, body } => Ok(Expr::Lambda { params, body: Box::new(translate_expr(store, state, *body)?) }),
        Expr::Application { func, args } => Ok(Expr::Application {
            func: Box::new(translate_expr(store, state, *func)?),
            args: translate_all(store, state, args)?,
        }),
        Expr::Conditional { cond, then_branch, else_branch } => Ok(Expr::Conditional {
            cond: Box::new(translate_expr(store, state, *cond)?),
            then_branch: Box::new(translate_expr(store, state, *then_branch)?),
            else_branch: Box::new(translate_expr(store, state, *else_branch)?),
        }),
        Expr::Sequential(items) => Ok(Expr::Sequential(translate_all(store, state, items)?)),
        Expr::Object(fields) => Ok(Expr::Object(translate_fields(store, state, fields)?)),
        Expr::Array(items) => Ok(Expr::Array(translate_all(store, state, items)?)),

        Expr::ItemGetString { obj, key } => Ok(Expr::ItemGetString {
            obj: Box::new(translate_expr(store, state, *obj)?),
            key: Box::new(translate_expr(store, state, *key)?),
        }),
        Expr::ItemSetString { obj, key, value } => Ok(Expr::ItemSetString {
            obj: Box::new(translate_expr(store, state, *obj)?),
            key: Box::new(translate_expr(store, state, *key)?),
            value: Box::new(translate_expr(store, state, *value)?),
        }),
        Expr::ItemGetInt { obj, index } => Ok(Expr::ItemGetInt {
            obj: Box::new(translate_expr(store, state, *obj)?),
            index: Box::new(translate_expr(store, state, *index)?),
        }),
        Expr::ItemSetInt { obj, index, value } => Ok(Expr::ItemSetInt {
            obj: Box::new(translate_expr(store, state, *obj)?),
            index: Box::new(translate_expr(store, state, *index)?),
            value: Box::new(translate_expr(store, state, *value)?),
        }),

        Expr::Unary { op, expr } => Ok(Expr::Unary { op, expr: Box::new(translate_expr(store, state, *expr)?) }),
        Expr::Binary { left, op, right } => Ok(Expr::Binary {
            left: Box::new(translate_expr(store, state, *left)?),
            op,
            right: Box::new(translate_expr(store, state, *right)?),
        }),
        Expr::InstanceOf { expr, ctor } => Ok(Expr::InstanceOf {
            expr: Box::new(translate_expr(store, state, *expr)?),
            ctor: Box::new(translate_expr(store, state, *ctor)?),
        }),
        Expr::In { key, obj } => Ok(Expr::In {
            key: Box::new(translate_expr(store, state, *key)?),
            obj: Box::new(translate_expr(store, state, *obj)?),
        }),
        Expr::StrictEq { left, right } => Ok(Expr::StrictEq {
            left: Box::new(translate_expr(store, state, *left)?),
            right: Box::new(translate_expr(store, state, *right)?),
        }),

        Expr::New { ctor, args } => Ok(Expr::New {
            ctor: Box::new(translate_expr(store, state, *ctor)?),
            args: translate_all(store, state, args)?,
        }),

        Expr::Call { receiver, concrete_type, concrete_method, args, base_call, dynamic_name } => {
            let receiver = receiver.map(|r| translate_expr(store, state, *r)).transpose()?;
            let args = translate_all(store, state, args)?;
            call::transform_call(store, state, receiver, &concrete_type, &concrete_method, args, base_call, dynamic_name.as_deref())
        }
        Expr::Ctor { concrete_type, concrete_ctor, args } => {
            let args = translate_all(store, state, args)?;
            call::transform_ctor(store, state, &concrete_type, &concrete_ctor, args)
        }
        Expr::BaseCtor { this_expr, concrete_type, concrete_ctor, args } => {
            let this_expr = translate_expr(store, state, *this_expr)?;
            let args = translate_all(store, state, args)?;
            call::transform_base_ctor(store, state, this_expr, &concrete_type, &concrete_ctor, args, state.current_is_inline)
        }
        Expr::NewDelegate { this_expr, concrete_type, concrete_method } => {
            let this_expr = this_expr.map(|e| translate_expr(store, state, *e)).transpose()?;
            call::transform_new_delegate(store, state, this_expr, &concrete_type, &concrete_method)
        }
        Expr::CopyCtor { concrete_type, obj } => {
            Ok(Expr::CopyCtor { concrete_type, obj: Box::new(translate_expr(store, state, *obj)?) })
        }

        Expr::NewRecord { concrete_type, fields } => {
            let values = translate_fields(store, state, fields)?;
            match store.get_custom_type(concrete_type.entity) {
                Some(CustomTypeInfo::Record { js_fields, optional }) => {
                    Ok(custom_type::transform_new_record(&js_fields, &optional, values))
                }
                _ => Err(TranslateError::new(ErrorKind::TypeNotFound)),
            }
        }
        Expr::NewUnionCase { concrete_type, case, args } => {
            let args = translate_all(store, state, args)?;
            match store.get_custom_type(concrete_type.entity) {
                Some(CustomTypeInfo::Union { cases, erased }) => {
                    let info = cases
                        .into_iter()
                        .find(|c| c.name == case)
                        .ok_or_else(|| TranslateError::new(ErrorKind::MemberNotFound))?;
                    let union_address = match store.try_lookup_class_address_or_custom_type(concrete_type.entity) {
                        wasp_meta::ClassAddressOrCustomType::Address(addr) => addr,
                        _ => wasp_ir::Address::new([case.as_str()]),
                    };
                    let case_class = if erased { None } else { Some(&concrete_type) };
                    Ok(custom_type::transform_new_union_case(&union_address, case_class, &info, args))
                }
                _ => Err(TranslateError::new(ErrorKind::TypeNotFound)),
            }
        }
        Expr::UnionCaseTest { expr, concrete_type, case } => {
            let translated = translate_expr(store, state, *expr)?;
            match store.get_custom_type(concrete_type.entity) {
                Some(CustomTypeInfo::Union { cases, .. }) => {
                    let info = cases
                        .into_iter()
                        .find(|c| c.name == case)
                        .ok_or_else(|| TranslateError::new(ErrorKind::MemberNotFound))?;
                    custom_type::transform_union_case_test_single(translated, &info)
                }
                _ => Err(TranslateError::new(ErrorKind::TypeNotFound)),
            }
        }
        Expr::UnionCaseGet { expr, concrete_type, case, field } => {
            let translated = translate_expr(store, state, *expr)?;
            match store.get_custom_type(concrete_type.entity) {
                Some(CustomTypeInfo::Union { cases, .. }) => {
                    let info = cases
                        .into_iter()
                        .find(|c| c.name == case)
                        .ok_or_else(|| TranslateError::new(ErrorKind::MemberNotFound))?;
                    custom_type::transform_union_case_get(translated, &info, &field)
                }
                _ => Err(TranslateError::new(ErrorKind::TypeNotFound)),
            }
        }
        Expr::UnionCaseTag { expr, concrete_type } => {
            let translated = translate_expr(store, state, *expr)?;
            custom_type::transform_union_case_tag(store, translated, &concrete_type)
        }

        Expr::FieldGet { obj, concrete_type, field } => {
            let obj = obj.map(|o| translate_expr(store, state, *o)).transpose()?;
            let node = state.current_node.clone();
            field::transform_field_get(store, &node, obj, &concrete_type, field)
        }
        Expr::FieldSet { obj, concrete_type, field, value } => {
            let obj = obj.map(|o| translate_expr(store, state, *o)).transpose()?;
            let value = translate_expr(store, state, *value)?;
            let node = state.current_node.clone();
            field::transform_field_set(store, &node, obj, &concrete_type, field, value)
        }
        Expr::CctorTrigger(concrete_type) => {
            let node = state.current_node.clone();
            Ok(field::transform_cctor(store, &node, &concrete_type))
        }

        Expr::TypeCheck { expr, concrete_type } => {
            let translated = translate_expr(store, state, *expr)?;
            let (result, delayed) = typecheck::transform_type_check(store, translated, &concrete_type, state.current_is_inline)?;
            if delayed {
                state.has_delayed_transform = true;
            }
            Ok(result)
        }

        Expr::TraitCall { receiver, trait_types, method_name, generics, args } => {
            let receiver = translate_expr(store, state, *receiver)?;
            let args = translate_all(store, state, args)?;
            call::transform_trait_call(store, state, receiver, &trait_types, &method_name, &generics, args)
        }

        // The following forms are produced by an earlier, out-of-scope
        // front-end stage and never carry JS-observable semantics of
        // their own; the Translator resolves them to their plain
        // equivalent rather than ever emitting them (§4.4's invalid-form
        // checker treats all four as defects in a finished body).
        Expr::Await(e) => Ok(runtime::await_value(translate_expr(store, state, *e)?)),
        Expr::NamedParameter { value, .. } => translate_expr(store, state, *value),
        Expr::RefOrOutParameter(e) => translate_expr(store, state, *e),
        Expr::Coalesce { left, right } => {
            let left = translate_expr(store, state, *left)?;
            let right = translate_expr(store, state, *right)?;
            let tmp = Id::fresh("coalesced", false);
            Ok(Expr::Let {
                id: tmp.clone(),
                value: Box::new(left),
                body: Box::new(Expr::Conditional {
                    cond: Box::new(Expr::Binary {
                        left: Box::new(Expr::StrictEq { left: Box::new(Expr::Var(tmp.clone())), right: Box::new(Expr::Undefined) }),
                        op: wasp_ir::BinaryOp::Or,
                        right: Box::new(Expr::StrictEq { left: Box::new(Expr::Var(tmp.clone())), right: Box::new(Expr::Literal(wasp_ir::Literal::Null)) }),
                    }),
                    then_branch: Box::new(right),
                    else_branch: Box::new(Expr::Var(tmp)),
                }),
            })
        }

        Expr::StatementExpr(stmt) => Ok(Expr::StatementExpr(Box::new(translate_stmt(store, state, *stmt)?))),
        Expr::OptimizedFSharpArg { shape, expr } => {
            Ok(Expr::OptimizedFSharpArg { shape, expr: Box::new(translate_expr(store, state, *expr)?) })
        }
    }
}

fn translate_all(store: &mut dyn MetadataStore, state: &mut TranslatorState, items: Vec<Expr>) -> TranslateResult<Vec<Expr>> {
    items.into_iter().map(|e| translate_expr(store, state, e)).collect()
}

fn translate_fields(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    fields: Vec<(String, Expr)>,
) -> TranslateResult<Vec<(String, Expr)>> {
    fields.into_iter().map(|(k, e)| translate_expr(store, state, e).map(|e| (k, e))).collect()
}

/// Translates a statement form, used only for an inline body's embedded
/// control flow (`Expr::StatementExpr`) — a non-inline member's body
/// never contains one, since the Driver hands it down as a pure `Expr`.
pub fn translate_stmt(store: &mut dyn MetadataStore, state: &mut TranslatorState, stmt: Stmt) -> TranslateResult<Stmt> {
    match stmt {
        Stmt::WithSourcePos(pos, inner) => Ok(Stmt::WithSourcePos(pos, Box::new(translate_stmt(store, state, *inner)?))),
        Stmt::Block(stmts) => Ok(Stmt::Block(translate_stmts(store, state, stmts)?)),
        Stmt::Return(e) => Ok(Stmt::Return(e.map(|e| translate_expr(store, state, e)).transpose()?)),
        Stmt::Throw(e) => Ok(Stmt::Throw(translate_expr(store, state, e)?)),
        Stmt::Try { body, catch, finally } => Ok(Stmt::Try {
            body: translate_stmts(store, state, body)?,
            catch: catch.map(|(id, stmts)| translate_stmts(store, state, stmts).map(|s| (id, s))).transpose()?,
            finally: finally.map(|stmts| translate_stmts(store, state, stmts)).transpose()?,
        }),
        Stmt::While { cond, body } => Ok(Stmt::While {
            cond: translate_expr(store, state, cond)?,
            body: Box::new(translate_stmt(store, state, *body)?),
        }),
        Stmt::For { init, cond, update, body } => Ok(Stmt::For {
            init: init.map(|s| translate_stmt(store, state, *s)).transpose()?.map(Box::new),
            cond: cond.map(|e| translate_expr(store, state, e)).transpose()?,
            update: update.map(|e| translate_expr(store, state, e)).transpose()?,
            body: Box::new(translate_stmt(store, state, *body)?),
        }),
        Stmt::If { cond, then_branch, else_branch } => Ok(Stmt::If {
            cond: translate_expr(store, state, cond)?,
            then_branch: Box::new(translate_stmt(store, state, *then_branch)?),
            else_branch: else_branch.map(|s| translate_stmt(store, state, *s)).transpose()?.map(Box::new),
        }),
        Stmt::Switch { discriminant, cases } => Ok(Stmt::Switch {
            discriminant: translate_expr(store, state, discriminant)?,
            cases: cases
                .into_iter()
                .map(|(test, stmts)| {
                    let test = test.map(|e| translate_expr(store, state, e)).transpose()?;
                    let stmts = translate_stmts(store, state, stmts)?;
                    Ok::<_, TranslateError>((test, stmts))
                })
                .collect::<TranslateResult<Vec<_>>>()?,
        }),
        Stmt::Break(label) => Ok(Stmt::Break(label)),
        Stmt::Continue(label) => Ok(Stmt::Continue(label)),
        Stmt::Label { name, stmt } => Ok(Stmt::Label { name, stmt: Box::new(translate_stmt(store, state, *stmt)?) }),
        Stmt::ExprStmt(e) => Ok(Stmt::ExprStmt(translate_expr(store, state, e)?)),
        Stmt::VarDecl { id, init } => Ok(Stmt::VarDecl { id, init: init.map(|e| translate_expr(store, state, e)).transpose()? }),
    }
}

fn translate_stmts(store: &mut dyn MetadataStore, state: &mut TranslatorState, stmts: Vec<Stmt>) -> TranslateResult<Vec<Stmt>> {
    stmts.into_iter().map(|s| translate_stmt(store, state, s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TranslatorState;
    use wasp_ir::{ConcreteType, Literal, TypeId};
    use wasp_meta::{GraphNode, MemoryMetadataStore};

    #[test]
    fn literal_passes_through_unchanged() {
        let mut store = MemoryMetadataStore::without_graph();
        let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
        let result = translate_expr(&mut store, &mut state, Expr::Literal(Literal::Int(3))).unwrap();
        assert_eq!(result, Expr::Literal(Literal::Int(3)));
    }

    #[test]
    fn self_outside_a_substituted_address_becomes_this() {
        let mut store = MemoryMetadataStore::without_graph();
        let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
        let result = translate_expr(&mut store, &mut state, Expr::Self_).unwrap();
        assert_eq!(result, Expr::This);
    }

    #[test]
    fn static_field_with_cctor_sequences_the_trigger() {
        let mut store = MemoryMetadataStore::new();
        let ty = TypeId(10);
        let field = wasp_ir::FieldId(1);
        store.define_field(
            ty,
            field,
            wasp_meta::FieldLookup::StaticField { address: wasp_ir::Address::new(["N", "Counter"]), has_cctor: true },
        );
        let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
        let expr = Expr::FieldGet { obj: None, concrete_type: ConcreteType::simple(ty), field };
        let result = translate_expr(&mut store, &mut state, expr).unwrap();
        assert!(matches!(result, Expr::Sequential(items) if items.len() == 2));
    }
}
