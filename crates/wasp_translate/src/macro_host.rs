//! Macro/generator host (§4.6): invokes a user-supplied `Macro`/
//! `Generator` instance and interprets its result protocol.

use crate::context::TranslatorState;
use crate::error::{TranslateError, TranslateResult};
use crate::translator::translate_expr;
use wasp_ir::{ConcreteCtor, ConcreteMethod, ConcreteType, Expr, Literal};
use wasp_meta::{CompilationKind, Diagnostic, GeneratorResult, MacroRequest, MacroResult, MetadataStore};

#[allow(clippy::too_many_arguments)]
pub fn invoke_macro_call(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    macro_type: &str,
    parameter: Option<&str>,
    fallback: Option<&CompilationKind>,
    receiver: Option<Expr>,
    concrete_type: &ConcreteType,
    method: Option<&ConcreteMethod>,
    ctor: Option<&ConcreteCtor>,
    body: Expr,
    args: Vec<Expr>,
    original: Expr,
) -> TranslateResult<Expr> {
    let request = MacroRequest {
        this: receiver.clone(),
        concrete_type: concrete_type.clone(),
        method: method.cloned(),
        ctor: ctor.cloned(),
        args: args.clone(),
        parameter: parameter.map(str::to_string),
        is_inline: state.current_is_inline,
    };
    let Some(macro_instance) = store.get_macro_instance(macro_type) else {
        return Err(TranslateError::new(wasp_meta::ErrorKind::MacroError));
    };
    let result = if ctor.is_some() { macro_instance.translate_ctor(&request) } else { macro_instance.translate_call(&request) };
    interpret_macro_result(store, state, result, fallback, receiver, body, args, original)
}

#[allow(clippy::too_many_arguments)]
fn interpret_macro_result(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    result: MacroResult,
    fallback: Option<&CompilationKind>,
    receiver: Option<Expr>,
    body: Expr,
    args: Vec<Expr>,
    original: Expr,
) -> TranslateResult<Expr> {
    match result {
        MacroResult::Ok(expr) => translate_expr(store, state, expr),
        MacroResult::Warning(msg, inner) => {
            store.add_warning(Diagnostic::warning("<macro>", None, msg));
            interpret_macro_result(store, state, *inner, fallback, receiver, body, args, original)
        }
        MacroResult::Error(msg) => {
            store.add_error(Diagnostic::error("<macro>", None, wasp_meta::ErrorKind::SourceError(msg)));
            Ok(Expr::ErrorPlaceholder("macro".to_string()))
        }
        MacroResult::Dependencies(nodes, inner) => {
            if let Some(graph) = store.graph_mut() {
                for node in nodes {
                    graph.add_edge(state.current_node.clone(), node);
                }
            }
            interpret_macro_result(store, state, *inner, fallback, receiver, body, args, original)
        }
        MacroResult::Fallback => match fallback {
            Some(kind) => emit_fallback(kind, receiver, body, args),
            None => Err(TranslateError::source("macro requested fallback but no fallback compilation kind was supplied")),
        },
        MacroResult::NeedsResolvedTypeArg(type_arg) => {
            if state.current_is_inline {
                state.has_delayed_transform = true;
                // Keeping the original Call/Ctor node (rather than an
                // error-placeholder) means the NotCompiledInline body this
                // member gets demoted to still carries the macro
                // invocation, so each call site re-resolves it once the
                // type argument is concrete (mirrors TraitCall's own
                // delayed path in call.rs).
                Ok(original)
            } else if type_arg.generics.is_empty() {
                Err(TranslateError::source("macro needs a resolved type argument; mark the member inline"))
            } else {
                Err(TranslateError::new(wasp_meta::ErrorKind::MacroError))
            }
        }
    }
}

/// Emits a call/ctor against a fallback `CompilationKind`. The
/// address-based kinds need no body; `Inline` substitutes the member's own
/// body (which doubles as the inline body when a macro declines to handle
/// a call) the same way `compile_call`'s `Inline` arm does.
fn emit_fallback(kind: &CompilationKind, receiver: Option<Expr>, body: Expr, args: Vec<Expr>) -> TranslateResult<Expr> {
    match kind {
        CompilationKind::Instance(name) => {
            let receiver = receiver.ok_or_else(|| TranslateError::source("fallback instance call needs a receiver"))?;
            Ok(Expr::Application {
                func: Box::new(Expr::ItemGetString {
                    obj: Box::new(receiver),
                    key: Box::new(Expr::Literal(Literal::String(name.clone()))),
                }),
                args,
            })
        }
        CompilationKind::Static(address) | CompilationKind::Constructor(address) => {
            let mut call_args = Vec::new();
            call_args.extend(receiver);
            call_args.extend(args);
            if matches!(kind, CompilationKind::Constructor(_)) {
                Ok(Expr::New { ctor: Box::new(Expr::GlobalAccess(address.clone())), args: call_args })
            } else {
                Ok(Expr::Application { func: Box::new(Expr::GlobalAccess(address.clone())), args: call_args })
            }
        }
        CompilationKind::Inline => {
            let params = crate::call::lambda_params_of(&body);
            Ok(crate::inline::substitute(crate::call::lambda_body(body), &params, &args, receiver.as_ref()))
        }
        _ => Err(TranslateError::source("fallback compilation kind is not supported without a member body")),
    }
}

/// Invokes a `Generator` and interprets its (superset) result protocol
/// (§4.6). Quotations are retranslated like any other body; raw
/// JavaScript/source text passes through for the writer collaborator.
pub fn invoke_generator(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    generator_type: &str,
    parameter: Option<&str>,
    receiver: Option<Expr>,
    concrete_type: &ConcreteType,
    method: Option<&ConcreteMethod>,
    args: Vec<Expr>,
) -> TranslateResult<Expr> {
    let request = MacroRequest {
        this: receiver,
        concrete_type: concrete_type.clone(),
        method: method.cloned(),
        ctor: None,
        args,
        parameter: parameter.map(str::to_string),
        is_inline: state.current_is_inline,
    };
    let Some(generator) = store.get_generator_instance(generator_type) else {
        return Err(TranslateError::new(wasp_meta::ErrorKind::GeneratorError));
    };
    interpret_generator_result(store, state, generator.generate(&request))
}

fn interpret_generator_result(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    result: GeneratorResult,
) -> TranslateResult<Expr> {
    match result {
        GeneratorResult::Ok(expr) | GeneratorResult::Quotation(expr) => translate_expr(store, state, expr),
        GeneratorResult::Warning(msg, inner) => {
            store.add_warning(Diagnostic::warning("<generator>", None, msg));
            interpret_generator_result(store, state, *inner)
        }
        GeneratorResult::Error(msg) => {
            store.add_error(Diagnostic::error("<generator>", None, wasp_meta::ErrorKind::SourceError(msg)));
            Ok(Expr::ErrorPlaceholder("generator".to_string()))
        }
        GeneratorResult::Dependencies(nodes, inner) => {
            if let Some(graph) = store.graph_mut() {
                for node in nodes {
                    graph.add_edge(state.current_node.clone(), node);
                }
            }
            interpret_generator_result(store, state, *inner)
        }
        GeneratorResult::Fallback => Err(TranslateError::source("generator requested fallback with no fallback kind available")),
        GeneratorResult::NeedsResolvedTypeArg(_) => {
            if state.current_is_inline {
                state.has_delayed_transform = true;
                Ok(Expr::ErrorPlaceholder("generator-deferred-to-inline".to_string()))
            } else {
                Err(TranslateError::new(wasp_meta::ErrorKind::GeneratorError))
            }
        }
        GeneratorResult::RawJavaScript(source) => Ok(Expr::ErrorPlaceholder(format!("raw-js:{source}"))),
    }
}

