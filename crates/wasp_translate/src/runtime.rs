//! Well-known `Runtime.*` helper calls the Translator emits (§4.1.4,
//! §4.1.7, §4.3, §4.4). The runtime library itself belongs to the bundler
//! collaborator; only the addresses it is expected to expose live here.

use wasp_ir::{Address, Expr};

fn runtime_call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Application {
        func: Box::new(Expr::GlobalAccess(Address::new(["Runtime", name]))),
        args,
    }
}

pub fn bind_delegate(method: Expr, this_obj: Expr) -> Expr {
    runtime_call("BindDelegate", vec![method, this_obj])
}

pub fn combine_delegates(delegates: Vec<Expr>) -> Expr {
    runtime_call("CombineDelegates", vec![Expr::Array(delegates)])
}

pub fn delegate_equal(a: Expr, b: Expr) -> Expr {
    runtime_call("DelegateEqual", vec![a, b])
}

/// Wraps an already-resolved raw field read (typically an `ItemGetString`)
/// so a missing optional field reads back as `None` instead of `undefined`.
pub fn get_optional(raw_field_value: Expr) -> Expr {
    runtime_call("GetOptional", vec![raw_field_value])
}

pub fn set_optional(obj: Expr, field: &str, value: Expr) -> Expr {
    runtime_call(
        "SetOptional",
        vec![obj, Expr::Literal(wasp_ir::Literal::String(field.to_string())), value],
    )
}

pub fn delete_empty_fields(obj: Expr, optional_fields: Vec<String>) -> Expr {
    runtime_call(
        "DeleteEmptyFields",
        vec![
            obj,
            Expr::Array(optional_fields.into_iter().map(|f| Expr::Literal(wasp_ir::Literal::String(f))).collect()),
        ],
    )
}

/// Lowers an `await` expression the front end left unresolved. The
/// writer collaborator expects a call it can keep or strip depending on
/// whether the enclosing function ends up marked `async`.
pub fn await_value(expr: Expr) -> Expr {
    runtime_call("Await", vec![expr])
}

/// `Curried`/`Curried2`/`Curried3`/`CurriedA` (§4.4 "Curried-function
/// recognition").
pub fn curried(func: Expr, arity: usize, pre_applied: Vec<Expr>) -> Expr {
    match (arity, pre_applied.len()) {
        (n, 0) if n == 2 => runtime_call("Curried2", vec![func]),
        (n, 0) if n == 3 => runtime_call("Curried3", vec![func]),
        (n, 0) => runtime_call("Curried", vec![func, Expr::Literal(wasp_ir::Literal::Int(n as i64))]),
        (n, k) => runtime_call(
            "CurriedA",
            vec![
                func,
                Expr::Literal(wasp_ir::Literal::Int((n - k) as i64)),
                Expr::Array(pre_applied),
            ],
        ),
    }
}
