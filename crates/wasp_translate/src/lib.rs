//! The Translator, Call/Ctor compiler, Custom-type handler, Optimization
//! passes, Inline-resolution engine, and Macro/generator host of spec.md
//! §4 — the bulk of this system. The Driver (§4.5) lives in
//! `wasp_driver`, one crate up, and depends on this one.

pub mod call;
pub mod context;
pub mod custom_type;
pub mod error;
pub mod field;
pub mod inline;
pub mod macro_host;
pub mod optimize;
pub mod runtime;
pub mod translator;
pub mod typecheck;

pub use context::TranslatorState;
pub use error::{TranslateError, TranslateResult};
pub use translator::{translate_expr, translate_stmt};

use wasp_ir::Expr;
use wasp_meta::{GraphNode, MetadataStore};

/// Translates one member body end to end: the Translator proper, then the
/// non-inline optimization chain, then (in debug builds) the invalid-form
/// sanity check (§4.4). `is_ctor` skips the outermost lambda in the
/// curried-function collector, matching the constructor identity rule.
pub fn translate_member(
    store: &mut dyn MetadataStore,
    node: GraphNode,
    body: Expr,
    is_ctor: bool,
) -> TranslateResult<Expr> {
    let mut state = TranslatorState::new(node, false);
    let translated = translator::translate_expr(store, &mut state, body)?;
    let optimized = optimize::optimize_member(translated, is_ctor);
    if cfg!(debug_assertions) {
        optimize::check_invalid_forms(&optimized, false)?;
    }
    Ok(optimized)
}

/// Translates an inline body on demand (§4.1.1 item 2, §4.2): same
/// Translator pass, but the inline optimization chain instead of the
/// member chain, and the checker runs with `in_inline = true`.
pub fn translate_inline_body(store: &mut dyn MetadataStore, node: GraphNode, body: Expr) -> TranslateResult<Expr> {
    translate_member_as_inline(store, node, body).map(|(expr, _)| expr)
}

/// Same as [`translate_inline_body`] but also reports whether translation
/// left `hasDelayedTransform` set (§4.7) — the Driver uses this to decide
/// whether an `Inline` member it compiled directly (rather than on demand
/// at a call site) must be demoted to `NotCompiledInline`.
pub fn translate_member_as_inline(
    store: &mut dyn MetadataStore,
    node: GraphNode,
    body: Expr,
) -> TranslateResult<(Expr, bool)> {
    let mut state = TranslatorState::new(node, true);
    let translated = translator::translate_expr(store, &mut state, body)?;
    let optimized = optimize::optimize_inline(translated);
    if cfg!(debug_assertions) {
        optimize::check_invalid_forms(&optimized, true)?;
    }
    Ok((optimized, state.has_delayed_transform))
}
