use std::fmt;
use wasp_ir::{Address, FuncArgShape};

/// The compilation-kind tag attached to every member (§3 "Compilation-kind
/// tag on each member").
#[derive(Debug, Clone, PartialEq)]
pub enum CompilationKind {
    Instance(String),
    Static(Address),
    Constructor(Address),
    Inline,
    NotCompiledInline,
    Macro { macro_type: String, parameter: Option<String>, fallback: Option<Box<CompilationKind>> },
    Remote { kind: RemoteKind, handle: String, provider: Option<Address> },
}

impl fmt::Display for CompilationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilationKind::Instance(name) => write!(f, "instance `{name}`"),
            CompilationKind::Static(addr) => write!(f, "static `{addr}`"),
            CompilationKind::Constructor(addr) => write!(f, "constructor `{addr}`"),
            CompilationKind::Inline => write!(f, "inline"),
            CompilationKind::NotCompiledInline => write!(f, "not-compiled-inline"),
            CompilationKind::Macro { macro_type, .. } => write!(f, "macro `{macro_type}`"),
            CompilationKind::Remote { kind, handle, .. } => write!(f, "remote {kind:?} `{handle}`"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    Sync,
    Async,
    Task,
    Send,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purity {
    Pure,
    Impure,
    Unknown,
}

/// Per-member optimization record (§3 "Optimization record").
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub func_args: Option<Vec<FuncArgShape>>,
    pub purity: Option<Purity>,
    pub is_pure: bool,
    pub warn: Option<String>,
}
