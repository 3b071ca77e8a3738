//! Call/Ctor compiler (§4.1.1-§4.1.5): lowers a resolved method or
//! constructor reference into its final call shape.

use crate::context::TranslatorState;
use crate::error::{TranslateError, TranslateResult};
use crate::inline;
use crate::runtime;
use crate::translator::translate_expr;
use wasp_ir::{BinaryOp, ConcreteCtor, ConcreteMethod, ConcreteType, Expr, FuncArgShape, Id, Literal, UnaryOp};
use wasp_meta::{
    ClassAddressOrCustomType, CompilationKind, CompileOptions, CtorLookup, ErrorKind, GraphNode, MemberInfo,
    MetadataStore, MethodLookup, RemoteKind,
};

fn dynamic_operator(name: &str, receiver: Expr, mut args: Vec<Expr>) -> TranslateResult<Expr> {
    if let Some(op) = BinaryOp::from_op_name(name) {
        let right = args
            .pop()
            .ok_or_else(|| TranslateError::source(format!("operator '{name}' needs a right-hand operand")))?;
        return Ok(Expr::Binary { left: Box::new(receiver), op, right: Box::new(right) });
    }
    match name {
        "op_Increment" => Ok(Expr::Binary {
            left: Box::new(receiver),
            op: BinaryOp::Add,
            right: Box::new(Expr::Literal(Literal::Int(1))),
        }),
        "op_Decrement" => Ok(Expr::Binary {
            left: Box::new(receiver),
            op: BinaryOp::Subtract,
            right: Box::new(Expr::Literal(Literal::Int(1))),
        }),
        _ => Ok(Expr::Application {
            func: Box::new(Expr::ItemGetString {
                obj: Box::new(receiver),
                key: Box::new(Expr::Literal(Literal::String(name.to_string()))),
            }),
            args,
        }),
    }
}

/// `TransformCall`. `receiver` and `args` are already translated.
pub fn transform_call(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    receiver: Option<Expr>,
    concrete_type: &ConcreteType,
    concrete_method: &ConcreteMethod,
    args: Vec<Expr>,
    base_call: bool,
    dynamic_name: Option<&str>,
) -> TranslateResult<Expr> {
    if concrete_type.is_dynamic() {
        let receiver = receiver.ok_or_else(|| TranslateError::source("a dynamic call needs a receiver"))?;
        let name = dynamic_name.ok_or_else(|| TranslateError::source("a dynamic call has no member name"))?;
        return dynamic_operator(name, receiver, args);
    }

    if let Some(graph) = store.graph_mut() {
        graph.add_edge(state.current_node.clone(), GraphNode::MethodNode(concrete_type.entity, concrete_method.entity));
    }

    let receiver = if base_call { Some(Expr::This) } else { receiver };

    match store.lookup_method_info(&ConcreteType::simple(concrete_type.entity), concrete_method) {
        MethodLookup::Compiled { info, options, body } => {
            compile_call(store, state, &info, &options, body, receiver, concrete_type, concrete_method, args, base_call)
        }
        MethodLookup::Compiling { info, body } => {
            if matches!(info.kind, CompilationKind::Inline | CompilationKind::NotCompiledInline) {
                let node = GraphNode::MethodNode(concrete_type.entity, concrete_method.entity);
                if state.is_in_progress(&node) {
                    return Err(TranslateError::source(format!(
                        "inline cycle detected compiling '{}'",
                        info.name
                    )));
                }
                let mut sub = state.enter(node, true);
                let translated_body = match translate_expr(store, &mut sub, body) {
                    Ok(body) => body,
                    Err(err) => {
                        // The only way this on-demand compilation of a
                        // dependency can fail is a hard translation error
                        // (typically the inline-cycle check above, tripped
                        // by a *different* frame further down the call
                        // chain); per §3's invariant every Compiling entry
                        // must end up Compiled or FailedCompiled*, so this
                        // member is marked failed here rather than left
                        // dangling in Compiling state forever.
                        store.failed_compiled_method(concrete_type.entity, concrete_method.entity);
                        return Err(err);
                    }
                };
                let effective_info = if sub.has_delayed_transform {
                    store.demote_method_to_not_compiled_inline(concrete_type.entity, concrete_method.entity, translated_body.clone());
                    MemberInfo { kind: CompilationKind::NotCompiledInline, ..info.clone() }
                } else {
                    store.add_compiled_method(concrete_type.entity, concrete_method.entity, CompileOptions::default(), translated_body.clone());
                    info.clone()
                };
                compile_call(
                    store,
                    state,
                    &effective_info,
                    &CompileOptions::default(),
                    translated_body,
                    receiver,
                    concrete_type,
                    concrete_method,
                    args,
                    base_call,
                )
            } else {
                compile_call(store, state, &info, &CompileOptions::default(), body, receiver, concrete_type, concrete_method, args, base_call)
            }
        }
        MethodLookup::CustomTypeMember(member) => {
            crate::custom_type::transform_custom_member(store, &member, receiver, args, concrete_type)
        }
        MethodLookup::Error(kind) => {
            store.add_error(wasp_meta::Diagnostic::error("<call>", None, kind.clone()));
            Ok(error_placeholder(receiver, args))
        }
    }
}

fn error_placeholder(receiver: Option<Expr>, args: Vec<Expr>) -> Expr {
    let mut items = Vec::new();
    items.extend(receiver);
    items.extend(args);
    Expr::Application { func: Box::new(Expr::ErrorPlaceholder("call".to_string())), args: items }
}

#[allow(clippy::too_many_arguments)]
fn compile_call(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    info: &MemberInfo,
    options: &CompileOptions,
    body: Expr,
    receiver: Option<Expr>,
    concrete_type: &ConcreteType,
    concrete_method: &ConcreteMethod,
    args: Vec<Expr>,
    base_call: bool,
) -> TranslateResult<Expr> {
    let args = shape_args(options, args);
    match &info.kind {
        CompilationKind::Instance(name) => {
            let receiver = receiver.ok_or_else(|| TranslateError::source("instance call needs a receiver"))?;
            if base_call {
                let prototype = match store.try_lookup_class_address_or_custom_type(concrete_type.entity) {
                    ClassAddressOrCustomType::Address(address) => address.child("prototype"),
                    _ => return Err(TranslateError::source(format!("base call to '{name}' has no prototype address"))),
                };
                let method = Expr::ItemGetString {
                    obj: Box::new(Expr::GlobalAccess(prototype)),
                    key: Box::new(Expr::Literal(Literal::String(name.clone()))),
                };
                let mut call_args = vec![receiver];
                call_args.extend(args);
                Ok(Expr::Application {
                    func: Box::new(Expr::ItemGetString {
                        obj: Box::new(method),
                        key: Box::new(Expr::Literal(Literal::String("call".to_string()))),
                    }),
                    args: call_args,
                })
            } else {
                let method = Expr::ItemGetString {
                    obj: Box::new(receiver),
                    key: Box::new(Expr::Literal(Literal::String(name.clone()))),
                };
                Ok(Expr::Application { func: Box::new(method), args })
            }
        }
        CompilationKind::Static(address) => {
            let mut call_args = Vec::new();
            call_args.extend(receiver);
            call_args.extend(args);
            Ok(Expr::Application { func: Box::new(Expr::GlobalAccess(address.clone())), args: call_args })
        }
        CompilationKind::Inline => {
            let params = lambda_params_of(&body);
            Ok(inline::substitute(lambda_body(body), &params, &args, receiver.as_ref()))
        }
        CompilationKind::NotCompiledInline => {
            let gs: Vec<ConcreteType> = concrete_type.generics.iter().chain(concrete_method.generics.iter()).cloned().collect();
            let body = inline::resolve_generics(body, &gs);
            let params = lambda_params_of(&body);
            let substituted = inline::substitute(lambda_body(body), &params, &args, receiver.as_ref());
            let mut sub = state.enter(state.current_node.clone(), true);
            translate_expr(store, &mut sub, substituted)
        }
        CompilationKind::Macro { macro_type, parameter, fallback } => {
            let original = Expr::Call {
                receiver: receiver.clone().map(Box::new),
                concrete_type: concrete_type.clone(),
                concrete_method: concrete_method.clone(),
                args: args.clone(),
                base_call,
                dynamic_name: None,
            };
            crate::macro_host::invoke_macro_call(
                store,
                state,
                macro_type,
                parameter.as_deref(),
                fallback.as_deref(),
                receiver,
                concrete_type,
                Some(concrete_method),
                None,
                body,
                args,
                original,
            )
        }
        CompilationKind::Remote { kind, handle, provider } => {
            remote_call(store, state, *kind, handle, provider.as_ref(), concrete_type, receiver, args)
        }
        CompilationKind::Constructor(_) => Err(TranslateError::source("a constructor address cannot back a method call")),
    }
}

fn remote_call(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    kind: RemoteKind,
    handle: &str,
    provider: Option<&wasp_ir::Address>,
    concrete_type: &ConcreteType,
    receiver: Option<Expr>,
    args: Vec<Expr>,
) -> TranslateResult<Expr> {
    let method_name = match kind {
        RemoteKind::Sync => "Sync",
        RemoteKind::Async => "Async",
        RemoteKind::Task => "Task",
        RemoteKind::Send => "Send",
    };
    if let Some(graph) = store.graph_mut() {
        graph.add_edge(
            state.current_node.clone(),
            GraphNode::AbstractMethodNode(concrete_type.entity, wasp_ir::MethodId(u32::MAX)),
        );
    }
    let provider_expr = match provider {
        Some(addr) => Expr::GlobalAccess(addr.clone()),
        None => Expr::GlobalAccess(wasp_ir::Address::new(["Runtime", "RemotingProvider"])),
    };
    let mut call_args = vec![Expr::Literal(Literal::String(handle.to_string()))];
    call_args.extend(receiver);
    call_args.push(Expr::Array(args));
    Ok(Expr::Application {
        func: Box::new(Expr::ItemGetString {
            obj: Box::new(provider_expr),
            key: Box::new(Expr::Literal(Literal::String(method_name.to_string()))),
        }),
        args: call_args,
    })
}

pub(crate) fn lambda_params_of(body: &Expr) -> Vec<Id> {
    match body {
        Expr::Lambda { params, .. } => params.clone(),
        Expr::WithSourcePos(_, inner) => lambda_params_of(inner),
        _ => Vec::new(),
    }
}

/// Strips the formal-parameter `Lambda` wrapper an inline member's body is
/// stored under, so substitution reduces a call to the body's value rather
/// than leaving a dead `function(params){ .. }` sitting at the call site. A
/// body with no such wrapper (an inline getter, say) passes through as-is.
pub(crate) fn lambda_body(body: Expr) -> Expr {
    match body {
        Expr::Lambda { body, .. } => *body,
        Expr::WithSourcePos(_, inner) => lambda_body(*inner),
        other => other,
    }
}

fn shape_args(options: &CompileOptions, args: Vec<Expr>) -> Vec<Expr> {
    match &options.func_args {
        None => args,
        Some(shapes) => args
            .into_iter()
            .enumerate()
            .map(|(i, arg)| match shapes.get(i).copied().unwrap_or(FuncArgShape::NotOptimized) {
                FuncArgShape::NotOptimized => arg,
                FuncArgShape::Curried(n) => shape_curried(arg, n),
                FuncArgShape::Tupled(n) => shape_tupled(arg, n),
            })
            .collect(),
    }
}

fn shape_curried(arg: Expr, n: u8) -> Expr {
    if let Expr::OptimizedFSharpArg { shape: FuncArgShape::Curried(already), expr } = &arg {
        if *already == n {
            return (**expr).clone();
        }
    }
    let params: Vec<Id> = (0..n).map(|i| Id::fresh(format!("a{i}"), false)).collect();
    let mut applied = arg;
    for p in &params {
        applied = Expr::Application { func: Box::new(applied), args: vec![Expr::Var(p.clone())] };
    }
    Expr::Lambda { params, body: Box::new(applied) }
}

fn shape_tupled(arg: Expr, n: u8) -> Expr {
    if let Expr::OptimizedFSharpArg { shape: FuncArgShape::Tupled(already), expr } = &arg {
        if *already == n {
            return (**expr).clone();
        }
    }
    if let Expr::Lambda { params, body } = &arg {
        if params.len() == 1 {
            // A tuple-lambda of one bound tuple parameter flattens to an
            // n-ary lambda by binding n fresh names and substituting a
            // synthetic tuple read for the original parameter.
            let fresh: Vec<Id> = (0..n).map(|i| Id::fresh(format!("t{i}"), false)).collect();
            let tuple = Expr::Array(fresh.iter().cloned().map(Expr::Var).collect());
            let substituted = inline::substitute((**body).clone(), params, &[tuple], None);
            return Expr::Lambda { params: fresh, body: Box::new(substituted) };
        }
    }
    let tuple_param = Id::fresh("tupled", false);
    let call_args: Vec<Expr> = (0..n)
        .map(|i| Expr::ItemGetInt { obj: Box::new(Expr::Var(tuple_param.clone())), index: Box::new(Expr::Literal(Literal::Int(i as i64))) })
        .collect();
    Expr::Lambda {
        params: vec![tuple_param],
        body: Box::new(Expr::Application { func: Box::new(arg), args: call_args }),
    }
}

/// `TransformCtor`/`CompileCtor` (§4.1.3). `args` already translated.
#[allow(clippy::too_many_arguments)]
pub fn transform_ctor(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    concrete_type: &ConcreteType,
    concrete_ctor: &ConcreteCtor,
    args: Vec<Expr>,
) -> TranslateResult<Expr> {
    if let Some(graph) = store.graph_mut() {
        graph.add_edge(state.current_node.clone(), GraphNode::TypeNode(concrete_type.entity));
    }
    match store.lookup_constructor_info(&ConcreteType::simple(concrete_type.entity), concrete_ctor) {
        CtorLookup::Compiled { info, options, body } => {
            compile_ctor(store, state, &info, &options, body, concrete_type, concrete_ctor, args)
        }
        CtorLookup::Compiling { info, body } => {
            let node = GraphNode::ConstructorNode(concrete_type.entity, concrete_ctor.entity);
            if matches!(info.kind, CompilationKind::Inline | CompilationKind::NotCompiledInline) {
                if state.is_in_progress(&node) {
                    return Err(TranslateError::source(format!("inline cycle detected compiling '{}'", info.name)));
                }
                let mut sub = state.enter(node, true);
                let translated_body = match translate_expr(store, &mut sub, body) {
                    Ok(body) => body,
                    Err(err) => {
                        store.failed_compiled_constructor(concrete_type.entity, concrete_ctor.entity);
                        return Err(err);
                    }
                };
                let effective_info = if sub.has_delayed_transform {
                    store.demote_constructor_to_not_compiled_inline(concrete_type.entity, concrete_ctor.entity, translated_body.clone());
                    MemberInfo { kind: CompilationKind::NotCompiledInline, ..info.clone() }
                } else {
                    store.add_compiled_constructor(concrete_type.entity, concrete_ctor.entity, CompileOptions::default(), translated_body.clone());
                    info.clone()
                };
                compile_ctor(store, state, &effective_info, &CompileOptions::default(), translated_body, concrete_type, concrete_ctor, args)
            } else {
                compile_ctor(store, state, &info, &CompileOptions::default(), body, concrete_type, concrete_ctor, args)
            }
        }
        CtorLookup::Error(kind) => {
            store.add_error(wasp_meta::Diagnostic::error("<ctor>", None, kind));
            Ok(Expr::New { ctor: Box::new(Expr::ErrorPlaceholder("ctor".to_string())), args })
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn compile_ctor(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    info: &MemberInfo,
    options: &CompileOptions,
    body: Expr,
    concrete_type: &ConcreteType,
    concrete_ctor: &ConcreteCtor,
    args: Vec<Expr>,
) -> TranslateResult<Expr> {
    let args = shape_args(options, args);
    match &info.kind {
        CompilationKind::Constructor(address) => {
            Ok(Expr::New { ctor: Box::new(Expr::GlobalAccess(address.clone())), args })
        }
        CompilationKind::Static(address) => Ok(Expr::Application { func: Box::new(Expr::GlobalAccess(address.clone())), args }),
        CompilationKind::Inline => {
            let params = lambda_params_of(&body);
            Ok(inline::substitute(lambda_body(body), &params, &args, None))
        }
        CompilationKind::NotCompiledInline => {
            let gs = concrete_type.generics.clone();
            let body = inline::resolve_generics(body, &gs);
            let params = lambda_params_of(&body);
            let substituted = inline::substitute(lambda_body(body), &params, &args, None);
            let mut sub = state.enter(state.current_node.clone(), true);
            translate_expr(store, &mut sub, substituted)
        }
        CompilationKind::Macro { macro_type, parameter, fallback } => {
            let original = Expr::Ctor { concrete_type: concrete_type.clone(), concrete_ctor: concrete_ctor.clone(), args: args.clone() };
            crate::macro_host::invoke_macro_call(
                store,
                state,
                macro_type,
                parameter.as_deref(),
                fallback.as_deref(),
                None,
                concrete_type,
                None,
                None,
                body,
                args,
                original,
            )
        }
        CompilationKind::Instance(_) | CompilationKind::Remote { .. } => {
            Err(TranslateError::source(format!("'{}' is not a valid constructor compilation kind", info.name)))
        }
    }
}

/// `TransformBaseCtor`.
pub fn transform_base_ctor(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    this_expr: Expr,
    concrete_type: &ConcreteType,
    concrete_ctor: &ConcreteCtor,
    args: Vec<Expr>,
    in_inline: bool,
) -> TranslateResult<Expr> {
    let compiled = transform_ctor(store, state, concrete_type, concrete_ctor, args)?;
    match &compiled {
        Expr::New { ctor, args } => {
            Ok(Expr::Application {
                func: Box::new(Expr::ItemGetString {
                    obj: Box::new((**ctor).clone()),
                    key: Box::new(Expr::Literal(Literal::String("call".to_string()))),
                }),
                args: std::iter::once(this_expr).chain(args.iter().cloned()).collect(),
            })
        }
        Expr::Let { value, body, .. } => {
            if let Expr::New { ctor, args } = body.as_ref() {
                if args.len() == 1 {
                    return Ok(Expr::Application {
                        func: Box::new(Expr::ItemGetString {
                            obj: Box::new((**ctor).clone()),
                            key: Box::new(Expr::Literal(Literal::String("call".to_string()))),
                        }),
                        args: vec![this_expr, (**value).clone()],
                    });
                }
            }
            if in_inline && matches!(this_expr, Expr::This) {
                Ok(compiled)
            } else {
                Err(TranslateError::source("base constructor call did not reduce to a single `new` expression"))
            }
        }
        _ if in_inline && matches!(this_expr, Expr::This) => Ok(compiled),
        _ => Err(TranslateError::source("base constructor call did not reduce to a single `new` expression")),
    }
}

/// `TransformNewDelegate`.
pub fn transform_new_delegate(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    this_expr: Option<Expr>,
    concrete_type: &ConcreteType,
    concrete_method: &ConcreteMethod,
) -> TranslateResult<Expr> {
    if let Some(graph) = store.graph_mut() {
        graph.add_edge(state.current_node.clone(), GraphNode::MethodNode(concrete_type.entity, concrete_method.entity));
    }
    let lookup = store.lookup_method_info(&ConcreteType::simple(concrete_type.entity), concrete_method);
    match lookup {
        MethodLookup::Compiled { info, .. } | MethodLookup::Compiling { info, .. } => match &info.kind {
            CompilationKind::Static(address) => Ok(Expr::GlobalAccess(address.clone())),
            CompilationKind::Instance(name) => {
                let this_expr = this_expr.ok_or_else(|| TranslateError::source("instance delegate needs a receiver"))?;
                let prototype = match store.try_lookup_class_address_or_custom_type(concrete_type.entity) {
                    ClassAddressOrCustomType::Address(address) => address.child("prototype"),
                    _ => return Err(TranslateError::source(format!("delegate to '{name}' has no prototype address"))),
                };
                let method = Expr::ItemGetString {
                    obj: Box::new(Expr::GlobalAccess(prototype)),
                    key: Box::new(Expr::Literal(Literal::String(name.clone()))),
                };
                Ok(runtime::bind_delegate(method, this_expr))
            }
            _ => {
                store.add_warning(wasp_meta::Diagnostic::warning(
                    &info.name,
                    None,
                    "delegate created from this kind of member does not preserve reference equality",
                ));
                let params: Vec<Id> = (0..concrete_method.generics.len().max(1)).map(|i| Id::fresh(format!("a{i}"), false)).collect();
                let call_args: Vec<Expr> = params.iter().cloned().map(Expr::Var).collect();
                let call = transform_call(
                    store,
                    state,
                    this_expr,
                    concrete_type,
                    concrete_method,
                    call_args,
                    false,
                    None,
                )?;
                Ok(Expr::Lambda { params, body: Box::new(call) })
            }
        },
        MethodLookup::CustomTypeMember(_) => Err(TranslateError::source("cannot create a delegate to a custom-type member")),
        MethodLookup::Error(kind) => Err(TranslateError::new(kind)),
    }
}

fn member_name(store: &dyn MetadataStore, ty: wasp_ir::TypeId, method: wasp_ir::MethodId) -> Option<String> {
    let concrete_method = ConcreteMethod { entity: method, generics: Vec::new() };
    match store.lookup_method_info(&ConcreteType::simple(ty), &concrete_method) {
        MethodLookup::Compiled { info, .. } | MethodLookup::Compiling { info, .. } => Some(info.name),
        _ => None,
    }
}

/// `TransformTraitCall`.
#[allow(clippy::too_many_arguments)]
pub fn transform_trait_call(
    store: &mut dyn MetadataStore,
    state: &mut TranslatorState,
    receiver: Expr,
    trait_types: &[ConcreteType],
    method_name: &str,
    generics: &[ConcreteType],
    args: Vec<Expr>,
) -> TranslateResult<Expr> {
    let candidates: Vec<(&ConcreteType, wasp_ir::MethodId)> = trait_types
        .iter()
        .flat_map(|ct| {
            store
                .get_methods(ct.entity)
                .into_iter()
                .filter(|&m| member_name(store, ct.entity, m).as_deref() == Some(method_name))
                .map(move |m| (ct, m))
        })
        .collect();

    if candidates.len() == 1 {
        let (ct, method) = candidates[0];
        let concrete_method = ConcreteMethod { entity: method, generics: generics.to_vec() };
        return transform_call(store, state, Some(receiver), ct, &concrete_method, args, false, None);
    }

    if state.current_is_inline {
        state.has_delayed_transform = true;
        return Ok(Expr::TraitCall {
            receiver: Box::new(receiver),
            trait_types: trait_types.to_vec(),
            method_name: method_name.to_string(),
            generics: generics.to_vec(),
            args,
        });
    }

    if candidates.is_empty() {
        Err(TranslateError::new(ErrorKind::MemberNotFound))
    } else {
        Err(TranslateError::source(format!("ambiguous trait call to '{method_name}'")))
    }
}
