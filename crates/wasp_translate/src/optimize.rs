//! Optimization chain & invalid-form checker (§4.4).

use crate::error::{TranslateError, TranslateResult};
use crate::inline;
use wasp_ir::{Expr, Id};

/// Applies the non-inline chain: let-removal, runtime-cleaner, statement
/// breaker, runtime-cleaner again, curried-function collector. The
/// curried-function collector skips the outermost lambda when `is_ctor`,
/// since a constructor function's identity matters to the runtime.
pub fn optimize_member(expr: Expr, is_ctor: bool) -> Expr {
    let expr = let_removal(expr);
    let expr = runtime_cleaner(expr);
    let expr = statement_breaker(expr);
    let expr = runtime_cleaner(expr);
    curried_collector(expr, is_ctor)
}

/// Applies the inline chain: let-removal and the inline statement-breaker
/// variant only.
pub fn optimize_inline(expr: Expr) -> Expr {
    let expr = let_removal(expr);
    statement_breaker_inline(expr)
}

/// Inlines a `Let` binding whose value is a variable, literal, or global
/// access — forms cheap and side-effect-free enough to duplicate freely.
fn let_removal(expr: Expr) -> Expr {
    map_bottom_up(expr, &mut |e| match e {
        Expr::Let { id, value, body } if is_trivial(&value) => inline::substitute(*body, &[id], &[*value], None),
        other => other,
    })
}

fn is_trivial(expr: &Expr) -> bool {
    matches!(expr, Expr::Literal(_) | Expr::Var(_) | Expr::GlobalAccess(_) | Expr::This | Expr::Undefined)
}

/// Collapses degenerate `Runtime.*` wrapper shapes and no-op sequencing
/// left behind by field/cctor lowering. Only ever flattens a
/// single-element `Sequential`; a longer one always has a leading
/// side-effecting item (e.g. a `CctorTrigger`, §4.1.7) that must survive.
fn runtime_cleaner(expr: Expr) -> Expr {
    map_bottom_up(expr, &mut |e| match e {
        Expr::Sequential(mut items) if items.len() == 1 => items.remove(0),
        Expr::Conditional { cond, then_branch, else_branch } => match *cond {
            Expr::Literal(wasp_ir::Literal::Bool(true)) => *then_branch,
            Expr::Literal(wasp_ir::Literal::Bool(false)) => *else_branch,
            cond => Expr::Conditional { cond: Box::new(cond), then_branch, else_branch },
        },
        other => other,
    })
}

/// Breaks a non-inline body's top-level `Sequential`/`Application` shapes
/// into statement form (a no-op at the expression-IR level here since
/// statement emission belongs to the writer collaborator; this pass only
/// flattens nested `Sequential`s so the writer sees one flat list).
fn statement_breaker(expr: Expr) -> Expr {
    map_bottom_up(expr, &mut |e| match e {
        Expr::Sequential(items) => Expr::Sequential(flatten_sequential(items)),
        other => other,
    })
}

/// The inline variant of the statement breaker additionally drops
/// trailing `Undefined` results produced by substituting a unit-typed
/// parameter, since an inlined expression's final value is what the call
/// site consumes.
fn statement_breaker_inline(expr: Expr) -> Expr {
    map_bottom_up(expr, &mut |e| match e {
        Expr::Sequential(items) => {
            let mut items = flatten_sequential(items);
            if items.len() > 1 && matches!(items.last(), Some(Expr::Undefined)) {
                items.pop();
            }
            Expr::Sequential(items)
        }
        other => other,
    })
}

fn flatten_sequential(items: Vec<Expr>) -> Vec<Expr> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Expr::Sequential(inner) => out.extend(flatten_sequential(inner)),
            other => out.push(other),
        }
    }
    out
}

/// Curried-function recognition (§4.4): rewrites
/// `λa. λb. … λz. f(x₁…xₙ, a, b, …, z)` to `Runtime.Curried{n}(f)` (or
/// `CurriedA(f, n-m, [x₁…xₘ])` when leading arguments are already
/// supplied). Only ever rewrites the outermost lambda chain of the body;
/// `skip_outer` preserves a constructor function's own identity.
fn curried_collector(expr: Expr, skip_outer: bool) -> Expr {
    if skip_outer {
        return map_top_lambda_chain_children(expr, &mut |e| curried_collector(e, false));
    }
    map_bottom_up(expr, &mut try_collect_curried)
}

fn map_top_lambda_chain_children(expr: Expr, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
    match expr {
        Expr::Lambda { params, body } => Expr::Lambda { params, body: Box::new(map_top_lambda_chain_children(*body, f)) },
        other => f(other),
    }
}

fn try_collect_curried(expr: Expr) -> Expr {
    let mut chain = Vec::new();
    let mut cursor = &expr;
    loop {
        match cursor {
            Expr::Lambda { params, body } if params.len() == 1 => {
                chain.push(params[0].clone());
                cursor = body;
            }
            _ => break,
        }
    }
    if chain.len() < 2 {
        return expr;
    }
    let Expr::Application { func, args } = cursor else { return expr };
    let tail_len = chain.len();
    if args.len() < tail_len {
        return expr;
    }
    let split = args.len() - tail_len;
    let trailing_matches = args[split..]
        .iter()
        .zip(chain.iter())
        .all(|(arg, id)| matches!(arg, Expr::Var(v) if v == id));
    if !trailing_matches {
        return expr;
    }
    let leading: Vec<Expr> = args[..split].to_vec();
    if leading.iter().any(|a| references_any(a, &chain)) {
        return expr;
    }
    crate::runtime::curried((**func).clone(), tail_len, leading)
}

fn references_any(expr: &Expr, ids: &[Id]) -> bool {
    let mut found = false;
    walk(expr, &mut |e| {
        if let Expr::Var(v) = e {
            if ids.contains(v) {
                found = true;
            }
        }
    });
    found
}

/// Rejects any occurrence of a form §4.4 forbids in a compiled (non-inline)
/// body. Intended for debug builds only; production callers should gate
/// this behind `cfg!(debug_assertions)`.
pub fn check_invalid_forms(expr: &Expr, in_inline: bool) -> TranslateResult<()> {
    let mut error = None;
    walk(expr, &mut |e| {
        if error.is_some() {
            return;
        }
        let forbidden = match e {
            Expr::Self_ | Expr::Base => true,
            Expr::Hole if !in_inline => true,
            Expr::FieldGet { .. } | Expr::FieldSet { .. } => true,
            Expr::Let { .. } | Expr::LetRec { .. } if !in_inline => true,
            Expr::StatementExpr(_) if !in_inline => true,
            Expr::Await(_) => true,
            Expr::NamedParameter { .. } => true,
            Expr::RefOrOutParameter(_) => true,
            Expr::Ctor { .. } | Expr::Call { .. } if !in_inline => true,
            Expr::Coalesce { .. } => true,
            Expr::TypeCheck { .. } => true,
            _ => false,
        };
        if forbidden {
            error = Some(TranslateError::source(format!("invalid form survived translation: {e:?}")));
        }
    });
    match error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn walk(expr: &Expr, f: &mut impl FnMut(&Expr)) {
    f(expr);
    match expr {
        Expr::Let { value, body, .. } => {
            walk(value, f);
            walk(body, f);
        }
        Expr::LetRec { bindings, body } => {
            for (_, e) in bindings {
                walk(e, f);
            }
            walk(body, f);
        }
        Expr::Lambda { body, .. } => walk(body, f),
        Expr::Application { func, args } => {
            walk(func, f);
            args.iter().for_each(|a| walk(a, f));
        }
        Expr::Conditional { cond, then_branch, else_branch } => {
            walk(cond, f);
            walk(then_branch, f);
            walk(else_branch, f);
        }
        Expr::Sequential(items) | Expr::Array(items) => items.iter().for_each(|e| walk(e, f)),
        Expr::Object(fields) => fields.iter().for_each(|(_, e)| walk(e, f)),
        Expr::ItemGetString { obj, key } => {
            walk(obj, f);
            walk(key, f);
        }
        Expr::ItemSetString { obj, key, value } => {
            walk(obj, f);
            walk(key, f);
            walk(value, f);
        }
        Expr::ItemGetInt { obj, index } => {
            walk(obj, f);
            walk(index, f);
        }
        Expr::ItemSetInt { obj, index, value } => {
            walk(obj, f);
            walk(index, f);
            walk(value, f);
        }
        Expr::Unary { expr, .. } => walk(expr, f),
        Expr::Binary { left, right, .. } | Expr::Coalesce { left, right } | Expr::StrictEq { left, right } => {
            walk(left, f);
            walk(right, f);
        }
        Expr::InstanceOf { expr, ctor } => {
            walk(expr, f);
            walk(ctor, f);
        }
        Expr::In { key, obj } => {
            walk(key, f);
            walk(obj, f);
        }
        Expr::New { ctor, args } => {
            walk(ctor, f);
            args.iter().for_each(|a| walk(a, f));
        }
        Expr::Call { receiver, args, .. } => {
            if let Some(r) = receiver {
                walk(r, f);
            }
            args.iter().for_each(|a| walk(a, f));
        }
        Expr::Ctor { args, .. } => args.iter().for_each(|a| walk(a, f)),
        Expr::BaseCtor { this_expr, args, .. } => {
            walk(this_expr, f);
            args.iter().for_each(|a| walk(a, f));
        }
        Expr::NewDelegate { this_expr, .. } => {
            if let Some(t) = this_expr {
                walk(t, f);
            }
        }
        Expr::CopyCtor { obj, .. } => walk(obj, f),
        Expr::NewRecord { fields, .. } => fields.iter().for_each(|(_, e)| walk(e, f)),
        Expr::NewUnionCase { args, .. } => args.iter().for_each(|a| walk(a, f)),
        Expr::UnionCaseTest { expr, .. } | Expr::UnionCaseGet { expr, .. } | Expr::UnionCaseTag { expr, .. } => {
            walk(expr, f)
        }
        Expr::FieldGet { obj, .. } => {
            if let Some(o) = obj {
                walk(o, f);
            }
        }
        Expr::FieldSet { obj, value, .. } => {
            if let Some(o) = obj {
                walk(o, f);
            }
            walk(value, f);
        }
        Expr::TypeCheck { expr, .. } => walk(expr, f),
        Expr::TraitCall { receiver, args, .. } => {
            walk(receiver, f);
            args.iter().for_each(|a| walk(a, f));
        }
        Expr::Await(e) | Expr::RefOrOutParameter(e) => walk(e, f),
        Expr::NamedParameter { value, .. } => walk(value, f),
        Expr::OptimizedFSharpArg { expr, .. } => walk(expr, f),
        Expr::WithSourcePos(_, e) => walk(e, f),
        Expr::Literal(_)
        | Expr::Var(_)
        | Expr::GlobalAccess(_)
        | Expr::This
        | Expr::Self_
        | Expr::Base
        | Expr::CctorTrigger(_)
        | Expr::StatementExpr(_)
        | Expr::Undefined
        | Expr::ErrorPlaceholder(_)
        | Expr::Hole => {}
    }
}

/// Bottom-up structural rewrite: children first, then `f` on the
/// resulting node (mirrors `inline::map_expr`'s traversal order).
fn map_bottom_up(expr: Expr, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
    inline::map_expr_pub(expr, f)
}
