use crate::custom_type::CustomTypeInfo;
use crate::well_known::WellKnownType;
use crate::diagnostics::Diagnostic;
use crate::graph::{DependencyGraph, GraphNode};
use crate::kind::CompileOptions;
use crate::lookup::{ClassAddressOrCustomType, ClassInfo, CtorLookup, FieldLookup, MemberInfo, MethodLookup};
use crate::macros::{Generator, Macro};
use std::collections::HashMap;
use wasp_ir::{Address, CtorId, Expr, FieldId, MethodId, TypeId};

/// The lifecycle state of a single queued member (§3 "Invariants").
#[derive(Debug, Clone)]
pub enum MemberState {
    Compiling { info: MemberInfo, body: Expr },
    Compiled { info: MemberInfo, options: CompileOptions, body: Expr },
    Failed { info: MemberInfo },
}

impl MemberState {
    pub fn info(&self) -> &MemberInfo {
        match self {
            MemberState::Compiling { info, .. }
            | MemberState::Compiled { info, .. }
            | MemberState::Failed { info } => info,
        }
    }
}

#[derive(Default, Clone)]
struct TypeRecord {
    address: Option<Address>,
    base_address: Option<Address>,
    is_interface: bool,
    custom_type: Option<CustomTypeInfo>,
    static_ctor_address: Option<Address>,
    static_ctor: Option<MemberState>,
    proxied: Option<TypeId>,
    methods: Vec<MethodId>,
    record_ctor: Option<CtorId>,
    exists: bool,
    well_known: Option<WellKnownType>,
}

/// The query/mutation surface of spec.md §3 "Metadata store". The real
/// system's storage engine is out of scope; this is the in-memory stand-in
/// that makes the Translator and Driver exercisable, matching the
/// "expose it as a single capability object" design note in spec.md §9.
pub trait MetadataStore {
    fn lookup_method_info(&self, ty: &wasp_ir::ConcreteType, method: &wasp_ir::ConcreteMethod) -> MethodLookup;
    fn lookup_constructor_info(&self, ty: &wasp_ir::ConcreteType, ctor: &wasp_ir::ConcreteCtor) -> CtorLookup;
    fn lookup_field_info(&self, ty: &wasp_ir::ConcreteType, field: FieldId) -> FieldLookup;

    fn try_lookup_class_info(&self, ty: TypeId) -> Option<ClassInfo>;
    fn try_lookup_static_constructor_address(&self, ty: TypeId) -> Option<Address>;
    fn try_lookup_class_address_or_custom_type(&self, ty: TypeId) -> ClassAddressOrCustomType;
    fn get_custom_type(&self, ty: TypeId) -> Option<CustomTypeInfo>;
    fn get_methods(&self, ty: TypeId) -> Vec<MethodId>;
    fn find_proxied(&self, ty: TypeId) -> Option<TypeId>;
    fn has_type(&self, ty: TypeId) -> bool;
    fn is_interface(&self, ty: TypeId) -> bool;
    fn method_exists_in_metadata(&self, ty: TypeId, method: MethodId) -> bool;
    fn constructor_exists_in_metadata(&self, ty: TypeId, ctor: CtorId) -> bool;
    fn try_get_record_constructor(&self, ty: TypeId) -> Option<CtorId>;
    fn well_known(&self, ty: TypeId) -> Option<WellKnownType>;

    fn compiling_methods(&self) -> Vec<(TypeId, MethodId)>;
    fn compiling_constructors(&self) -> Vec<(TypeId, CtorId)>;
    fn compiling_static_constructors(&self) -> Vec<TypeId>;
    fn compiling_implementations(&self) -> Vec<(TypeId, TypeId, MethodId)>;
    fn entry_point(&self) -> Option<Expr>;

    /// The Driver (§4.5) has no concrete-generics context for a static
    /// constructor or an interface implementation the way `LookupMethodInfo`/
    /// `LookupConstructorInfo` do for calls, so it fetches their queued
    /// bodies directly rather than through those two lookups.
    fn compiling_static_constructor_body(&self, ty: TypeId) -> Option<(MemberInfo, Expr)>;
    fn compiling_implementation_body(&self, ty: TypeId, iface: TypeId, method: MethodId) -> Option<(MemberInfo, Expr)>;

    fn add_compiled_method(&mut self, ty: TypeId, method: MethodId, options: CompileOptions, body: Expr);
    fn add_compiled_constructor(&mut self, ty: TypeId, ctor: CtorId, options: CompileOptions, body: Expr);

    /// Demotes an inline member to `NotCompiledInline` (§4.7 "Delayed
    /// transforms"): stores `body` (the result of the one translation pass
    /// that could not fully resolve, with unresolved nodes left in place)
    /// under a kind that makes every future call site re-run generic
    /// resolution and retranslation at its own call, instead of reusing a
    /// body that baked in one caller's (unresolved) context.
    fn demote_method_to_not_compiled_inline(&mut self, ty: TypeId, method: MethodId, body: Expr);
    fn demote_constructor_to_not_compiled_inline(&mut self, ty: TypeId, ctor: CtorId, body: Expr);
    fn add_compiled_static_constructor(&mut self, ty: TypeId, options: CompileOptions, body: Expr);
    fn add_compiled_implementation(&mut self, ty: TypeId, iface: TypeId, method: MethodId, options: CompileOptions, body: Expr);
    fn failed_compiled_method(&mut self, ty: TypeId, method: MethodId);
    fn failed_compiled_constructor(&mut self, ty: TypeId, ctor: CtorId);
    fn failed_compiled_static_constructor(&mut self, ty: TypeId);
    fn failed_compiled_implementation(&mut self, ty: TypeId, iface: TypeId, method: MethodId);

    fn add_error(&mut self, diagnostic: Diagnostic);
    fn add_warning(&mut self, diagnostic: Diagnostic);

    fn has_graph(&self) -> bool;
    fn graph_mut(&mut self) -> Option<&mut DependencyGraph>;

    fn get_macro_instance(&self, name: &str) -> Option<&dyn Macro>;
    fn get_generator_instance(&self, name: &str) -> Option<&dyn Generator>;
    fn close_macros(&mut self);
    fn use_local_macros(&self) -> bool;
}

/// Default in-memory implementation. Good enough to drive the Driver and
/// the test suite end-to-end; not a persistent store.
#[derive(Default)]
pub struct MemoryMetadataStore {
    types: HashMap<TypeId, TypeRecord>,
    methods: HashMap<(TypeId, MethodId), MemberState>,
    method_names: HashMap<(TypeId, MethodId), String>,
    ctors: HashMap<(TypeId, CtorId), MemberState>,
    fields: HashMap<(TypeId, FieldId), FieldLookup>,
    implementations: HashMap<(TypeId, TypeId, MethodId), MemberState>,
    entry_point: Option<Expr>,
    graph: Option<DependencyGraph>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    macros: HashMap<String, Box<dyn Macro>>,
    generators: HashMap<String, Box<dyn Generator>>,
    macros_closed: bool,
    use_local_macros: bool,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self { graph: Some(DependencyGraph::new()), ..Default::default() }
    }

    pub fn without_graph() -> Self {
        Self { graph: None, ..Default::default() }
    }

    fn type_record_mut(&mut self, ty: TypeId) -> &mut TypeRecord {
        self.types.entry(ty).or_insert_with(|| TypeRecord { exists: true, ..Default::default() })
    }

    pub fn define_class(&mut self, ty: TypeId, address: Option<Address>, base_address: Option<Address>, is_interface: bool) {
        let record = self.type_record_mut(ty);
        record.address = address;
        record.base_address = base_address;
        record.is_interface = is_interface;
    }

    pub fn define_custom_type(&mut self, ty: TypeId, info: CustomTypeInfo) {
        self.type_record_mut(ty).custom_type = Some(info);
    }

    pub fn define_static_ctor_address(&mut self, ty: TypeId, address: Address) {
        self.type_record_mut(ty).static_ctor_address = Some(address);
    }

    pub fn queue_static_constructor(&mut self, ty: TypeId, info: MemberInfo, body: Expr) {
        self.type_record_mut(ty).static_ctor = Some(MemberState::Compiling { info, body });
    }

    pub fn set_proxied(&mut self, ty: TypeId, target: TypeId) {
        self.type_record_mut(ty).proxied = Some(target);
    }

    pub fn set_record_constructor(&mut self, ty: TypeId, ctor: CtorId) {
        self.type_record_mut(ty).record_ctor = Some(ctor);
    }

    pub fn define_well_known(&mut self, ty: TypeId, kind: WellKnownType) {
        self.type_record_mut(ty).well_known = Some(kind);
    }

    pub fn queue_method(&mut self, ty: TypeId, method: MethodId, info: MemberInfo, body: Expr) {
        self.type_record_mut(ty).methods.push(method);
        self.methods.insert((ty, method), MemberState::Compiling { info, body });
    }

    /// Registers the source name of a member of a custom (record/union/
    /// delegate) type so `lookup_method_info` can classify it structurally
    /// (§4.3) instead of through the ordinary compiling/compiled path.
    pub fn define_custom_member_name(&mut self, ty: TypeId, method: MethodId, name: impl Into<String>) {
        self.method_names.insert((ty, method), name.into());
    }

    pub fn queue_constructor(&mut self, ty: TypeId, ctor: CtorId, info: MemberInfo, body: Expr) {
        self.ctors.insert((ty, ctor), MemberState::Compiling { info, body });
    }

    pub fn queue_implementation(&mut self, ty: TypeId, iface: TypeId, method: MethodId, info: MemberInfo, body: Expr) {
        self.implementations.insert((ty, iface, method), MemberState::Compiling { info, body });
    }

    pub fn define_field(&mut self, ty: TypeId, field: FieldId, lookup: FieldLookup) {
        self.fields.insert((ty, field), lookup);
    }

    pub fn set_entry_point(&mut self, body: Expr) {
        self.entry_point = Some(body);
    }

    pub fn register_macro(&mut self, name: impl Into<String>, m: Box<dyn Macro>) {
        self.macros.insert(name.into(), m);
    }

    pub fn register_generator(&mut self, name: impl Into<String>, g: Box<dyn Generator>) {
        self.generators.insert(name.into(), g);
    }

    pub fn set_use_local_macros(&mut self, value: bool) {
        self.use_local_macros = value;
    }

    pub fn method_state(&self, ty: TypeId, method: MethodId) -> Option<&MemberState> {
        self.methods.get(&(ty, method))
    }

    pub fn ctor_state(&self, ty: TypeId, ctor: CtorId) -> Option<&MemberState> {
        self.ctors.get(&(ty, ctor))
    }

    pub fn static_ctor_state(&self, ty: TypeId) -> Option<&MemberState> {
        self.types.get(&ty).and_then(|r| r.static_ctor.as_ref())
    }

    pub fn implementation_state(&self, ty: TypeId, iface: TypeId, method: MethodId) -> Option<&MemberState> {
        self.implementations.get(&(ty, iface, method))
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn lookup_method_info(&self, ty: &wasp_ir::ConcreteType, method: &wasp_ir::ConcreteMethod) -> MethodLookup {
        if let Some(custom) = self.types.get(&ty.entity).and_then(|r| r.custom_type.clone()) {
            if let Some(name) = self.method_names.get(&(ty.entity, method.entity)) {
                if let Some(member) = crate::custom_dispatch::classify_method(&custom, name) {
                    return MethodLookup::CustomTypeMember(member);
                }
            }
        }
        match self.methods.get(&(ty.entity, method.entity)) {
            Some(MemberState::Compiled { info, options, body }) => MethodLookup::Compiled {
                info: info.clone(),
                options: options.clone(),
                body: body.clone(),
            },
            Some(MemberState::Compiling { info, body }) => {
                MethodLookup::Compiling { info: info.clone(), body: body.clone() }
            }
            Some(MemberState::Failed { .. }) | None => {
                MethodLookup::Error(crate::diagnostics::ErrorKind::MemberNotFound)
            }
        }
    }

    fn lookup_constructor_info(&self, ty: &wasp_ir::ConcreteType, ctor: &wasp_ir::ConcreteCtor) -> CtorLookup {
        match self.ctors.get(&(ty.entity, ctor.entity)) {
            Some(MemberState::Compiled { info, options, body }) => CtorLookup::Compiled {
                info: info.clone(),
                options: options.clone(),
                body: body.clone(),
            },
            Some(MemberState::Compiling { info, body }) => {
                CtorLookup::Compiling { info: info.clone(), body: body.clone() }
            }
            Some(MemberState::Failed { .. }) | None => CtorLookup::Error(crate::diagnostics::ErrorKind::MemberNotFound),
        }
    }

    fn lookup_field_info(&self, ty: &wasp_ir::ConcreteType, field: FieldId) -> FieldLookup {
        self.fields
            .get(&(ty.entity, field))
            .cloned()
            .unwrap_or(FieldLookup::Error(crate::diagnostics::ErrorKind::MemberNotFound))
    }

    fn try_lookup_class_info(&self, ty: TypeId) -> Option<ClassInfo> {
        self.types.get(&ty).map(|r| ClassInfo {
            address: r.address.clone(),
            base_address: r.base_address.clone(),
            is_interface: r.is_interface,
        })
    }

    fn try_lookup_static_constructor_address(&self, ty: TypeId) -> Option<Address> {
        self.types.get(&ty).and_then(|r| r.static_ctor_address.clone())
    }

    fn try_lookup_class_address_or_custom_type(&self, ty: TypeId) -> ClassAddressOrCustomType {
        match self.types.get(&ty) {
            Some(r) if r.address.is_some() => ClassAddressOrCustomType::Address(r.address.clone().unwrap()),
            Some(r) if r.custom_type.is_some() => {
                ClassAddressOrCustomType::CustomType(r.custom_type.clone().unwrap())
            }
            _ => ClassAddressOrCustomType::None,
        }
    }

    fn get_custom_type(&self, ty: TypeId) -> Option<CustomTypeInfo> {
        self.types.get(&ty).and_then(|r| r.custom_type.clone())
    }

    fn get_methods(&self, ty: TypeId) -> Vec<MethodId> {
        self.types.get(&ty).map(|r| r.methods.clone()).unwrap_or_default()
    }

    fn find_proxied(&self, ty: TypeId) -> Option<TypeId> {
        self.types.get(&ty).and_then(|r| r.proxied)
    }

    fn has_type(&self, ty: TypeId) -> bool {
        self.types.get(&ty).map(|r| r.exists).unwrap_or(false)
    }

    fn is_interface(&self, ty: TypeId) -> bool {
        self.types.get(&ty).map(|r| r.is_interface).unwrap_or(false)
    }

    fn method_exists_in_metadata(&self, ty: TypeId, method: MethodId) -> bool {
        self.methods.contains_key(&(ty, method))
    }

    fn constructor_exists_in_metadata(&self, ty: TypeId, ctor: CtorId) -> bool {
        self.ctors.contains_key(&(ty, ctor))
    }

    fn try_get_record_constructor(&self, ty: TypeId) -> Option<CtorId> {
        self.types.get(&ty).and_then(|r| r.record_ctor)
    }

    fn well_known(&self, ty: TypeId) -> Option<WellKnownType> {
        self.types.get(&ty).and_then(|r| r.well_known)
    }

    fn compiling_methods(&self) -> Vec<(TypeId, MethodId)> {
        self.methods
            .iter()
            .filter(|(_, s)| matches!(s, MemberState::Compiling { .. }))
            .map(|(k, _)| *k)
            .collect()
    }

    fn compiling_constructors(&self) -> Vec<(TypeId, CtorId)> {
        self.ctors
            .iter()
            .filter(|(_, s)| matches!(s, MemberState::Compiling { .. }))
            .map(|(k, _)| *k)
            .collect()
    }

    fn compiling_static_constructors(&self) -> Vec<TypeId> {
        self.types
            .iter()
            .filter(|(_, r)| matches!(r.static_ctor, Some(MemberState::Compiling { .. })))
            .map(|(k, _)| *k)
            .collect()
    }

    fn compiling_implementations(&self) -> Vec<(TypeId, TypeId, MethodId)> {
        self.implementations
            .iter()
            .filter(|(_, s)| matches!(s, MemberState::Compiling { .. }))
            .map(|(k, _)| *k)
            .collect()
    }

    fn entry_point(&self) -> Option<Expr> {
        self.entry_point.clone()
    }

    fn compiling_static_constructor_body(&self, ty: TypeId) -> Option<(MemberInfo, Expr)> {
        match self.types.get(&ty).and_then(|r| r.static_ctor.as_ref()) {
            Some(MemberState::Compiling { info, body }) => Some((info.clone(), body.clone())),
            _ => None,
        }
    }

    fn compiling_implementation_body(&self, ty: TypeId, iface: TypeId, method: MethodId) -> Option<(MemberInfo, Expr)> {
        match self.implementations.get(&(ty, iface, method)) {
            Some(MemberState::Compiling { info, body }) => Some((info.clone(), body.clone())),
            _ => None,
        }
    }

    fn add_compiled_method(&mut self, ty: TypeId, method: MethodId, options: CompileOptions, body: Expr) {
        if let Some(state) = self.methods.get_mut(&(ty, method)) {
            let info = state.info().clone();
            *state = MemberState::Compiled { info, options, body };
        }
    }

    fn add_compiled_constructor(&mut self, ty: TypeId, ctor: CtorId, options: CompileOptions, body: Expr) {
        if let Some(state) = self.ctors.get_mut(&(ty, ctor)) {
            let info = state.info().clone();
            *state = MemberState::Compiled { info, options, body };
        }
    }

    fn demote_method_to_not_compiled_inline(&mut self, ty: TypeId, method: MethodId, body: Expr) {
        if let Some(state) = self.methods.get_mut(&(ty, method)) {
            let mut info = state.info().clone();
            info.kind = crate::kind::CompilationKind::NotCompiledInline;
            *state = MemberState::Compiled { info, options: CompileOptions::default(), body };
        }
    }

    fn demote_constructor_to_not_compiled_inline(&mut self, ty: TypeId, ctor: CtorId, body: Expr) {
        if let Some(state) = self.ctors.get_mut(&(ty, ctor)) {
            let mut info = state.info().clone();
            info.kind = crate::kind::CompilationKind::NotCompiledInline;
            *state = MemberState::Compiled { info, options: CompileOptions::default(), body };
        }
    }

    fn add_compiled_static_constructor(&mut self, ty: TypeId, options: CompileOptions, body: Expr) {
        if let Some(record) = self.types.get_mut(&ty) {
            if let Some(state) = record.static_ctor.as_mut() {
                let info = state.info().clone();
                *state = MemberState::Compiled { info, options, body };
            }
        }
    }

    fn add_compiled_implementation(&mut self, ty: TypeId, iface: TypeId, method: MethodId, options: CompileOptions, body: Expr) {
        if let Some(state) = self.implementations.get_mut(&(ty, iface, method)) {
            let info = state.info().clone();
            *state = MemberState::Compiled { info, options, body };
        }
    }

    fn failed_compiled_method(&mut self, ty: TypeId, method: MethodId) {
        if let Some(state) = self.methods.get_mut(&(ty, method)) {
            let info = state.info().clone();
            *state = MemberState::Failed { info };
        }
    }

    fn failed_compiled_constructor(&mut self, ty: TypeId, ctor: CtorId) {
        if let Some(state) = self.ctors.get_mut(&(ty, ctor)) {
            let info = state.info().clone();
            *state = MemberState::Failed { info };
        }
    }

    fn failed_compiled_static_constructor(&mut self, ty: TypeId) {
        if let Some(record) = self.types.get_mut(&ty) {
            if let Some(state) = record.static_ctor.as_mut() {
                let info = state.info().clone();
                *state = MemberState::Failed { info };
            }
        }
    }

    fn failed_compiled_implementation(&mut self, ty: TypeId, iface: TypeId, method: MethodId) {
        if let Some(state) = self.implementations.get_mut(&(ty, iface, method)) {
            let info = state.info().clone();
            *state = MemberState::Failed { info };
        }
    }

    fn add_error(&mut self, diagnostic: Diagnostic) {
        log::error!("{diagnostic}");
        self.errors.push(diagnostic);
    }

    fn add_warning(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.warnings.push(diagnostic);
    }

    fn has_graph(&self) -> bool {
        self.graph.is_some()
    }

    fn graph_mut(&mut self) -> Option<&mut DependencyGraph> {
        self.graph.as_mut()
    }

    fn get_macro_instance(&self, name: &str) -> Option<&dyn Macro> {
        self.macros.get(name).map(|b| b.as_ref())
    }

    fn get_generator_instance(&self, name: &str) -> Option<&dyn Generator> {
        self.generators.get(name).map(|b| b.as_ref())
    }

    fn close_macros(&mut self) {
        self.macros_closed = true;
    }

    fn use_local_macros(&self) -> bool {
        self.use_local_macros
    }
}
