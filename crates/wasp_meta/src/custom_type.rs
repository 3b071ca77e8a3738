use wasp_ir::{Address, Literal};

/// Shape of a compiler-synthesized type, as classified by the front end
/// (§4.3 "Custom-type handler").
#[derive(Debug, Clone, PartialEq)]
pub enum CustomTypeInfo {
    Delegate,
    Record { js_fields: Vec<(String, String)>, optional: Vec<String> },
    Union { cases: Vec<UnionCaseInfo>, erased: bool },
    UnionCase { union: Address, case: UnionCaseInfo },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionCaseInfo {
    pub name: String,
    pub tag: u32,
    pub kind: UnionCaseKind,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnionCaseKind {
    /// A case carrying one or more fields, encoded as `{"$":tag, "$0":..}`.
    FieldBearing,
    /// A case with no fields, materialized as a shared singleton instance.
    Singleton,
    /// A case whose representation is a fixed literal (e.g. a `None`-like
    /// case folded into `null`/`undefined`).
    Constant(Literal),
}

/// Which member of a custom type is being dispatched to (§4.3).
#[derive(Debug, Clone, PartialEq)]
pub enum CustomTypeMember {
    DelegateInvoke,
    DelegateCombine,
    DelegateEqual,
    DelegateToString,
    RecordGet(String),
    RecordSet(String),
    RecordToString,
    UnionIsCase(String),
    UnionGetTag,
    UnionNewCase(String),
    UnionGetCase(String),
    UnionCaseGetField(String),
}
