use crate::custom_type::CustomTypeMember;
use crate::diagnostics::ErrorKind;
use crate::kind::{CompilationKind, CompileOptions};
use wasp_ir::{Address, Expr};

/// Display name + signature text carried alongside a member so error
/// messages can name "the member's full name and method signature" (§7).
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub name: String,
    pub signature: String,
    pub kind: CompilationKind,
}

/// Result of `LookupMethodInfo`/`LookupConstructorInfo` (§3).
#[derive(Debug, Clone)]
pub enum MethodLookup {
    Compiled { info: MemberInfo, options: CompileOptions, body: Expr },
    Compiling { info: MemberInfo, body: Expr },
    CustomTypeMember(CustomTypeMember),
    Error(ErrorKind),
}

#[derive(Debug, Clone)]
pub enum CtorLookup {
    Compiled { info: MemberInfo, options: CompileOptions, body: Expr },
    Compiling { info: MemberInfo, body: Expr },
    Error(ErrorKind),
}

/// Result of `LookupFieldInfo` (§4.1.7).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldLookup {
    InstanceField { name: String, readonly: bool },
    StaticField { address: Address, has_cctor: bool },
    OptionalField { name: String },
    IndexedField { index: u32 },
    CustomTypeField { js_name: String, optional: bool },
    PropertyField { getter: Option<String>, setter: Option<String> },
    Error(ErrorKind),
}

/// Result of `TryLookupClassAddressOrCustomType` (§3).
#[derive(Debug, Clone)]
pub enum ClassAddressOrCustomType {
    Address(Address),
    CustomType(crate::custom_type::CustomTypeInfo),
    None,
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub address: Option<Address>,
    pub base_address: Option<Address>,
    pub is_interface: bool,
}
