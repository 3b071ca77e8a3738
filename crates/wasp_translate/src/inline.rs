//! Inline-resolution engine (§4.2): generic substitution into an inline
//! body's `Type` occurrences, then formal-parameter/`this` substitution,
//! ahead of retranslating the result through the Translator.

use wasp_ir::{ConcreteType, Expr, Id};

/// `GenericInlineResolver(gs)`: substitutes positional generic arguments
/// into every `ConcreteType` appearing inside `Call`/`Ctor`/`TraitCall`/
/// `TypeCheck` nodes of an inline body. A formal generic position `i` is
/// represented, by convention of the front end producing this IR, as a
/// `ConcreteType` whose `entity` is `DYNAMIC_TYPE` and whose single
/// generic slot at `i` holds the placeholder; callers of this module
/// simply pass the already-resolved `gs` list positionally.
pub fn resolve_generics(expr: Expr, gs: &[ConcreteType]) -> Expr {
    if gs.is_empty() {
        return expr;
    }
    map_expr(expr, &mut |e| rewrite_types_in(e, gs))
}

fn rewrite_types_in(expr: Expr, gs: &[ConcreteType]) -> Expr {
    let substitute = |ct: ConcreteType| -> ConcreteType {
        match gs.get(ct.entity.0 as usize) {
            Some(resolved) if ct.generics.is_empty() => resolved.clone(),
            _ => ct,
        }
    };
    match expr {
        Expr::Call { receiver, concrete_type, concrete_method, args, base_call, dynamic_name } => Expr::Call {
            receiver,
            concrete_type: substitute(concrete_type),
            concrete_method,
            args,
            base_call,
            dynamic_name,
        },
        Expr::Ctor { concrete_type, concrete_ctor, args } => {
            Expr::Ctor { concrete_type: substitute(concrete_type), concrete_ctor, args }
        }
        Expr::TraitCall { receiver, trait_types, method_name, generics, args } => Expr::TraitCall {
            receiver,
            trait_types: trait_types.into_iter().map(substitute).collect(),
            method_name,
            generics,
            args,
        },
        Expr::TypeCheck { expr, concrete_type } => Expr::TypeCheck { expr, concrete_type: substitute(concrete_type) },
        other => other,
    }
}

/// `Substitution(args, thisObj?)`: binds an inline body's formal
/// parameters and (optionally) `This` to the supplied, already-translated
/// expressions.
pub fn substitute(body: Expr, params: &[Id], args: &[Expr], this_obj: Option<&Expr>) -> Expr {
    map_expr(body, &mut |e| match e {
        Expr::Var(id) => match params.iter().position(|p| p == &id) {
            Some(i) => args.get(i).cloned().unwrap_or(Expr::Var(id)),
            None => Expr::Var(id),
        },
        Expr::This => this_obj.cloned().unwrap_or(Expr::This),
        other => other,
    })
}

/// Public door into the structural map below, for other passes (the
/// optimizer) that need the same innermost-first traversal but apply a
/// different rewrite rule.
pub(crate) fn map_expr_pub(expr: Expr, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
    map_expr(expr, f)
}

/// Structural map over every `Expr` node, innermost-first, so a rewrite
/// rule only ever needs to handle the node directly in front of it.
fn map_expr(expr: Expr, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
    let mapped = match expr {
        Expr::Let { id, value, body } => {
            Expr::Let { id, value: Box::new(map_expr(*value, f)), body: Box::new(map_expr(*body, f)) }
        }
        Expr::LetRec { bindings, body } => Expr::LetRec {
            bindings: bindings.into_iter().map(|(id, e)| (id, map_expr(e, f))).collect(),
            body: Box::new(map_expr(*body, f)),
        },
        Expr::Lambda { params, body } => Expr::Lambda { params, body: Box::new(map_expr(*body, f)) },
        Expr::Application { func, args } => Expr::Application {
            func: Box::new(map_expr(*func, f)),
            args: args.into_iter().map(|a| map_expr(a, f)).collect(),
        },
        Expr::Conditional { cond, then_branch, else_branch } => Expr::Conditional {
            cond: Box::new(map_expr(*cond, f)),
            then_branch: Box::new(map_expr(*then_branch, f)),
            else_branch: Box::new(map_expr(*else_branch, f)),
        },
        Expr::Sequential(items) => Expr::Sequential(items.into_iter().map(|e| map_expr(e, f)).collect()),
        Expr::Object(fields) => Expr::Object(fields.into_iter().map(|(k, e)| (k, map_expr(e, f))).collect()),
        Expr::Array(items) => Expr::Array(items.into_iter().map(|e| map_expr(e, f)).collect()),
        Expr::ItemGetString { obj, key } => {
            Expr::ItemGetString { obj: Box::new(map_expr(*obj, f)), key: Box::new(map_expr(*key, f)) }
        }
        Expr::ItemSetString { obj, key, value } => Expr::ItemSetString {
            obj: Box::new(map_expr(*obj, f)),
            key: Box::new(map_expr(*key, f)),
            value: Box::new(map_expr(*value, f)),
        },
        Expr::ItemGetInt { obj, index } => {
            Expr::ItemGetInt { obj: Box::new(map_expr(*obj, f)), index: Box::new(map_expr(*index, f)) }
        }
        Expr::ItemSetInt { obj, index, value } => Expr::ItemSetInt {
            obj: Box::new(map_expr(*obj, f)),
            index: Box::new(map_expr(*index, f)),
            value: Box::new(map_expr(*value, f)),
        },
        Expr::Unary { op, expr } => Expr::Unary { op, expr: Box::new(map_expr(*expr, f)) },
        Expr::Binary { left, op, right } => {
            Expr::Binary { left: Box::new(map_expr(*left, f)), op, right: Box::new(map_expr(*right, f)) }
        }
        Expr::InstanceOf { expr, ctor } => {
            Expr::InstanceOf { expr: Box::new(map_expr(*expr, f)), ctor: Box::new(map_expr(*ctor, f)) }
        }
        Expr::In { key, obj } => Expr::In { key: Box::new(map_expr(*key, f)), obj: Box::new(map_expr(*obj, f)) },
        Expr::StrictEq { left, right } => {
            Expr::StrictEq { left: Box::new(map_expr(*left, f)), right: Box::new(map_expr(*right, f)) }
        }
        Expr::New { ctor, args } => {
            Expr::New { ctor: Box::new(map_expr(*ctor, f)), args: args.into_iter().map(|a| map_expr(a, f)).collect() }
        }
        Expr::Call { receiver, concrete_type, concrete_method, args, base_call, dynamic_name } => Expr::Call {
            receiver: receiver.map(|r| Box::new(map_expr(*r, f))),
            concrete_type,
            concrete_method,
            args: args.into_iter().map(|a| map_expr(a, f)).collect(),
            base_call,
            dynamic_name,
        },
        Expr::Ctor { concrete_type, concrete_ctor, args } => {
            Expr::Ctor { concrete_type, concrete_ctor, args: args.into_iter().map(|a| map_expr(a, f)).collect() }
        }
        Expr::BaseCtor { this_expr, concrete_type, concrete_ctor, args } => Expr::BaseCtor {
            this_expr: Box::new(map_expr(*this_expr, f)),
            concrete_type,
            concrete_ctor,
            args: args.into_iter().map(|a| map_expr(a, f)).collect(),
        },
        Expr::NewDelegate { this_expr, concrete_type, concrete_method } => Expr::NewDelegate {
            this_expr: this_expr.map(|e| Box::new(map_expr(*e, f))),
            concrete_type,
            concrete_method,
        },
        Expr::CopyCtor { concrete_type, obj } => Expr::CopyCtor { concrete_type, obj: Box::new(map_expr(*obj, f)) },
        Expr::NewRecord { concrete_type, fields } => Expr::NewRecord {
            concrete_type,
            fields: fields.into_iter().map(|(k, e)| (k, map_expr(e, f))).collect(),
        },
        Expr::NewUnionCase { concrete_type, case, args } => Expr::NewUnionCase {
            concrete_type,
            case,
            args: args.into_iter().map(|a| map_expr(a, f)).collect(),
        },
        Expr::UnionCaseTest { expr, concrete_type, case } => {
            Expr::UnionCaseTest { expr: Box::new(map_expr(*expr, f)), concrete_type, case }
        }
        Expr::UnionCaseGet { expr, concrete_type, case, field } => {
            Expr::UnionCaseGet { expr: Box::new(map_expr(*expr, f)), concrete_type, case, field }
        }
        Expr::UnionCaseTag { expr, concrete_type } => {
            Expr::UnionCaseTag { expr: Box::new(map_expr(*expr, f)), concrete_type }
        }
        Expr::FieldGet { obj, concrete_type, field } => {
            Expr::FieldGet { obj: obj.map(|o| Box::new(map_expr(*o, f))), concrete_type, field }
        }
        Expr::FieldSet { obj, concrete_type, field, value } => Expr::FieldSet {
            obj: obj.map(|o| Box::new(map_expr(*o, f))),
            concrete_type,
            field,
            value: Box::new(map_expr(*value, f)),
        },
        Expr::TypeCheck { expr, concrete_type } => Expr::TypeCheck { expr: Box::new(map_expr(*expr, f)), concrete_type },
        Expr::TraitCall { receiver, trait_types, method_name, generics, args } => Expr::TraitCall {
            receiver: Box::new(map_expr(*receiver, f)),
            trait_types,
            method_name,
            generics,
            args: args.into_iter().map(|a| map_expr(a, f)).collect(),
        },
        Expr::Await(e) => Expr::Await(Box::new(map_expr(*e, f))),
        Expr::NamedParameter { name, value } => Expr::NamedParameter { name, value: Box::new(map_expr(*value, f)) },
        Expr::RefOrOutParameter(e) => Expr::RefOrOutParameter(Box::new(map_expr(*e, f))),
        Expr::Coalesce { left, right } => {
            Expr::Coalesce { left: Box::new(map_expr(*left, f)), right: Box::new(map_expr(*right, f)) }
        }
        Expr::OptimizedFSharpArg { shape, expr } => Expr::OptimizedFSharpArg { shape, expr: Box::new(map_expr(*expr, f)) },
        Expr::WithSourcePos(pos, e) => Expr::WithSourcePos(pos, Box::new(map_expr(*e, f))),
        leaf @ (Expr::Literal(_)
        | Expr::Var(_)
        | Expr::GlobalAccess(_)
        | Expr::This
        | Expr::Self_
        | Expr::Base
        | Expr::CctorTrigger(_)
        | Expr::StatementExpr(_)
        | Expr::Undefined
        | Expr::ErrorPlaceholder(_)
        | Expr::Hole) => leaf,
    };
    f(mapped)
}
