//! The Driver (§4.5): pulls compiling members from the metadata store,
//! translates each through `wasp_translate`, and hands the result back.
//! Constructors, static constructors, implementations, and the entry
//! point are each drained once up front; methods are drained in a loop
//! that re-opens after `CloseMacros` in case a macro queued new ones.

use wasp_ir::{ConcreteCtor, ConcreteMethod, ConcreteType, CtorId, MethodId, TypeId};
use wasp_meta::{CompilationKind, CompileOptions, CtorLookup, Diagnostic, GraphNode, MemberInfo, MetadataStore, MethodLookup};
use wasp_translate::TranslateError;

/// True for the kinds the Driver must translate with `current_is_inline`
/// set, since their body is a substitution template rather than a
/// directly-callable function (§4.1 "Translator").
fn is_inline_kind(kind: &CompilationKind) -> bool {
    matches!(kind, CompilationKind::Inline | CompilationKind::NotCompiledInline)
}

/// Tally of what one `run` compiled, for the smoke-test CLI and tests to
/// report without re-walking the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriverReport {
    pub constructors_compiled: usize,
    pub constructors_failed: usize,
    pub static_constructors_compiled: usize,
    pub static_constructors_failed: usize,
    pub implementations_compiled: usize,
    pub implementations_failed: usize,
    pub methods_compiled: usize,
    pub methods_failed: usize,
    pub entry_point_compiled: bool,
    /// Number of times the method-draining loop ran (one pass = drain to
    /// empty, then `CloseMacros`).
    pub passes: usize,
}

impl DriverReport {
    pub fn total_failed(&self) -> usize {
        self.constructors_failed + self.static_constructors_failed + self.implementations_failed + self.methods_failed
    }
}

fn member_label(info: &MemberInfo) -> String {
    format!("{} {}", info.name, info.signature)
}

fn report_error(store: &mut dyn MetadataStore, info: &MemberInfo, err: TranslateError) {
    log::error!("failed to compile '{}': {}", member_label(info), err.kind);
    store.add_error(Diagnostic::error(member_label(info), err.position, err.kind));
}

fn translate_one_constructor(store: &mut dyn MetadataStore, ty: TypeId, ctor: CtorId, report: &mut DriverReport) {
    let concrete_type = ConcreteType::simple(ty);
    let concrete_ctor = ConcreteCtor { entity: ctor };
    let (info, body) = match store.lookup_constructor_info(&concrete_type, &concrete_ctor) {
        CtorLookup::Compiling { info, body } => (info, body),
        _ => return,
    };
    log::debug!("translating constructor {}", member_label(&info));
    let node = GraphNode::ConstructorNode(ty, ctor);
    let result = if is_inline_kind(&info.kind) {
        wasp_translate::translate_member_as_inline(store, node, body)
    } else {
        wasp_translate::translate_member(store, node, body, true).map(|expr| (expr, false))
    };
    match result {
        Ok((compiled, delayed)) => {
            if delayed {
                store.demote_constructor_to_not_compiled_inline(ty, ctor, compiled);
            } else {
                store.add_compiled_constructor(ty, ctor, CompileOptions::default(), compiled);
            }
            report.constructors_compiled += 1;
        }
        Err(err) => {
            report_error(store, &info, err);
            store.failed_compiled_constructor(ty, ctor);
            report.constructors_failed += 1;
        }
    }
}

fn translate_one_static_constructor(store: &mut dyn MetadataStore, ty: TypeId, report: &mut DriverReport) {
    let Some((info, body)) = store.compiling_static_constructor_body(ty) else { return };
    log::debug!("translating static constructor {}", member_label(&info));
    let node = GraphNode::TypeNode(ty);
    match wasp_translate::translate_member(store, node, body, false) {
        Ok(compiled) => {
            store.add_compiled_static_constructor(ty, CompileOptions::default(), compiled);
            report.static_constructors_compiled += 1;
        }
        Err(err) => {
            report_error(store, &info, err);
            store.failed_compiled_static_constructor(ty);
            report.static_constructors_failed += 1;
        }
    }
}

fn translate_one_implementation(
    store: &mut dyn MetadataStore,
    ty: TypeId,
    iface: TypeId,
    method: MethodId,
    report: &mut DriverReport,
) {
    let Some((info, body)) = store.compiling_implementation_body(ty, iface, method) else { return };
    log::debug!("translating implementation {}", member_label(&info));
    let node = GraphNode::ImplementationNode(ty, iface, method);
    match wasp_translate::translate_member(store, node, body, false) {
        Ok(compiled) => {
            store.add_compiled_implementation(ty, iface, method, CompileOptions::default(), compiled);
            report.implementations_compiled += 1;
        }
        Err(err) => {
            report_error(store, &info, err);
            store.failed_compiled_implementation(ty, iface, method);
            report.implementations_failed += 1;
        }
    }
}

fn translate_one_method(store: &mut dyn MetadataStore, ty: TypeId, method: MethodId, report: &mut DriverReport) {
    let concrete_type = ConcreteType::simple(ty);
    let concrete_method = ConcreteMethod { entity: method, generics: Vec::new() };
    let (info, body) = match store.lookup_method_info(&concrete_type, &concrete_method) {
        MethodLookup::Compiling { info, body } => (info, body),
        // Already resolved by a nested sub-translator while compiling an
        // unrelated caller (§4.1.1 item 2) — nothing left to do here.
        _ => return,
    };
    log::debug!("translating method {}", member_label(&info));
    let node = GraphNode::MethodNode(ty, method);
    let result = if is_inline_kind(&info.kind) {
        wasp_translate::translate_member_as_inline(store, node, body)
    } else {
        wasp_translate::translate_member(store, node, body, false).map(|expr| (expr, false))
    };
    match result {
        Ok((compiled, delayed)) => {
            if delayed {
                store.demote_method_to_not_compiled_inline(ty, method, compiled);
            } else {
                store.add_compiled_method(ty, method, CompileOptions::default(), compiled);
            }
            report.methods_compiled += 1;
        }
        Err(err) => {
            report_error(store, &info, err);
            store.failed_compiled_method(ty, method);
            report.methods_failed += 1;
        }
    }
}

fn translate_entry_point(store: &mut dyn MetadataStore, body: wasp_ir::Expr, report: &mut DriverReport) {
    log::debug!("translating entry point");
    match wasp_translate::translate_member(store, GraphNode::EntryPointNode, body, false) {
        Ok(_) => report.entry_point_compiled = true,
        Err(err) => {
            let info = MemberInfo {
                name: "<entry point>".to_string(),
                signature: String::new(),
                kind: wasp_meta::CompilationKind::Static(wasp_ir::Address::new(Vec::<String>::new())),
            };
            report_error(store, &info, err);
        }
    }
}

/// Runs the Driver loop of spec.md §4.5 to completion: constructors,
/// static constructors, implementations, and the entry point are each
/// compiled once; methods are drained in a loop that reopens after
/// `CloseMacros` for as long as macros keep enqueueing new ones.
pub fn run(store: &mut dyn MetadataStore) -> DriverReport {
    let mut report = DriverReport::default();

    for (ty, ctor) in store.compiling_constructors() {
        translate_one_constructor(store, ty, ctor, &mut report);
    }
    for ty in store.compiling_static_constructors() {
        translate_one_static_constructor(store, ty, &mut report);
    }
    for (ty, iface, method) in store.compiling_implementations() {
        translate_one_implementation(store, ty, iface, method, &mut report);
    }
    if let Some(body) = store.entry_point() {
        translate_entry_point(store, body, &mut report);
    }

    loop {
        report.passes += 1;
        while let Some((ty, method)) = store.compiling_methods().into_iter().next() {
            translate_one_method(store, ty, method, &mut report);
        }
        log::info!("pass {} drained; closing macros", report.passes);
        store.close_macros();
        if store.compiling_methods().is_empty() {
            break;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasp_ir::{Address, BinaryOp, Expr, FieldId, Literal};
    use wasp_meta::{CompilationKind, MemoryMetadataStore};

    fn info(name: &str, kind: CompilationKind) -> MemberInfo {
        MemberInfo { name: name.to_string(), signature: format!("{name}()"), kind }
    }

    #[test]
    fn drains_a_single_compiling_method() {
        let mut store = MemoryMetadataStore::new();
        let ty = TypeId(1);
        let method = MethodId(1);
        store.queue_method(
            ty,
            method,
            info("M", CompilationKind::Static(Address::new(["N", "M"]))),
            Expr::Binary {
                left: Box::new(Expr::Literal(Literal::Int(1))),
                op: BinaryOp::Add,
                right: Box::new(Expr::Literal(Literal::Int(2))),
            },
        );
        let report = run(&mut store);
        assert_eq!(report.methods_compiled, 1);
        assert_eq!(report.methods_failed, 0);
        assert!(matches!(store.method_state(ty, method), Some(wasp_meta::MemberState::Compiled { .. })));
    }

    #[test]
    fn failed_method_is_marked_failed_and_reported() {
        let mut store = MemoryMetadataStore::new();
        let ty = TypeId(2);
        let method = MethodId(1);
        // `Base` outside an inline body is a source error (§4.1 rule).
        store.queue_method(ty, method, info("Bad", CompilationKind::Static(Address::new(["N", "Bad"]))), Expr::Base);
        let report = run(&mut store);
        assert_eq!(report.methods_failed, 1);
        assert!(matches!(store.method_state(ty, method), Some(wasp_meta::MemberState::Failed { .. })));
        assert_eq!(store.errors().len(), 1);
    }

    #[test]
    fn compiles_constructor_static_ctor_and_entry_point() {
        let mut store = MemoryMetadataStore::new();
        let ty = TypeId(3);
        let ctor = wasp_ir::CtorId(1);
        store.queue_constructor(
            ty,
            ctor,
            info("ctor", CompilationKind::Constructor(Address::new(["N", "T"]))),
            Expr::Literal(Literal::Null),
        );
        store.queue_static_constructor(ty, info("cctor", CompilationKind::Static(Address::new(["N", "T", "cctor"]))), Expr::Undefined);
        store.set_entry_point(Expr::Literal(Literal::Int(0)));
        let field = FieldId(1);
        store.define_field(ty, field, wasp_meta::FieldLookup::InstanceField { name: "x".to_string(), readonly: false });

        let report = run(&mut store);
        assert_eq!(report.constructors_compiled, 1);
        assert_eq!(report.static_constructors_compiled, 1);
        assert!(report.entry_point_compiled);
    }

    #[test]
    fn macro_enqueued_method_is_drained_in_a_second_pass() {
        struct EnqueueOnFirstCall;
        impl wasp_meta::Macro for EnqueueOnFirstCall {
            fn translate_call(&self, request: &wasp_meta::MacroRequest) -> wasp_meta::MacroResult {
                wasp_meta::MacroResult::Ok(request.args.first().cloned().unwrap_or(Expr::Undefined))
            }
            fn translate_ctor(&self, request: &wasp_meta::MacroRequest) -> wasp_meta::MacroResult {
                self.translate_call(request)
            }
        }
        let mut store = MemoryMetadataStore::new();
        store.register_macro("identity", Box::new(EnqueueOnFirstCall));
        let ty = TypeId(4);
        let method = MethodId(1);
        store.queue_method(
            ty,
            method,
            info(
                "M",
                CompilationKind::Macro { macro_type: "identity".to_string(), parameter: None, fallback: None },
            ),
            Expr::Application {
                func: Box::new(Expr::GlobalAccess(Address::new(["Runtime", "noop"]))),
                args: vec![Expr::Literal(Literal::Int(5))],
            },
        );
        let report = run(&mut store);
        assert!(report.passes >= 1);
        assert_eq!(report.methods_compiled, 1);
    }
}
