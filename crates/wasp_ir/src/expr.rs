use crate::entity::{ConcreteCtor, ConcreteMethod, ConcreteType};
use crate::func_arg::FuncArgShape;
use crate::ids::Id;
use crate::literal::{BinaryOp, Literal, UnaryOp};
use crate::address::Address;
use crate::pos::SourcePos;
use crate::stmt::Stmt;

/// The shared expression tree. The Translator (`wasp_translate`) consumes
/// and produces values of this same type: translation narrows the set of
/// constructors that can appear (§4.4's invalid-form checker enumerates
/// the ones a *compiled* body must never contain), it does not hop to a
/// different type.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Var(Id),

    Let { id: Id, value: Box<Expr>, body: Box<Expr> },
    LetRec { bindings: Vec<(Id, Expr)>, body: Box<Expr> },

    Lambda { params: Vec<Id>, body: Box<Expr> },
    Application { func: Box<Expr>, args: Vec<Expr> },

    Conditional { cond: Box<Expr>, then_branch: Box<Expr>, else_branch: Box<Expr> },
    Sequential(Vec<Expr>),

    Object(Vec<(String, Expr)>),
    Array(Vec<Expr>),

    ItemGetString { obj: Box<Expr>, key: Box<Expr> },
    ItemSetString { obj: Box<Expr>, key: Box<Expr>, value: Box<Expr> },
    ItemGetInt { obj: Box<Expr>, index: Box<Expr> },
    ItemSetInt { obj: Box<Expr>, index: Box<Expr>, value: Box<Expr> },

    Unary { op: UnaryOp, expr: Box<Expr> },
    Binary { left: Box<Expr>, op: BinaryOp, right: Box<Expr> },

    /// `e instanceof ctor` (§4.1.6).
    InstanceOf { expr: Box<Expr>, ctor: Box<Expr> },
    /// `key in obj` (§4.1.6 `IDisposable`, §4.1.7 sparse-member probes).
    In { key: Box<Expr>, obj: Box<Expr> },
    /// `e === null` / strict equality not covered by `BinaryOp` (§4.1.6).
    StrictEq { left: Box<Expr>, right: Box<Expr> },

    GlobalAccess(Address),

    This,
    Self_,
    Base,

    New { ctor: Box<Expr>, args: Vec<Expr> },

    /// Unresolved call; eliminated by the Translator (§4.1.1/§4.1.2).
    Call {
        receiver: Option<Box<Expr>>,
        concrete_type: ConcreteType,
        concrete_method: ConcreteMethod,
        args: Vec<Expr>,
        base_call: bool,
        /// The member's source name, carried by the front end so a call
        /// through the dynamic-object sentinel (§4.1.1 item 1) can be
        /// dispatched structurally without a metadata lookup.
        dynamic_name: Option<String>,
    },
    /// Unresolved constructor call; eliminated by the Translator (§4.1.3).
    Ctor { concrete_type: ConcreteType, concrete_ctor: ConcreteCtor, args: Vec<Expr> },
    /// Unresolved base-constructor call; eliminated by `TransformBaseCtor`.
    BaseCtor { this_expr: Box<Expr>, concrete_type: ConcreteType, concrete_ctor: ConcreteCtor, args: Vec<Expr> },

    NewDelegate { this_expr: Option<Box<Expr>>, concrete_type: ConcreteType, concrete_method: ConcreteMethod },
    CopyCtor { concrete_type: ConcreteType, obj: Box<Expr> },

    NewRecord { concrete_type: ConcreteType, fields: Vec<(String, Expr)> },
    NewUnionCase { concrete_type: ConcreteType, case: String, args: Vec<Expr> },
    UnionCaseTest { expr: Box<Expr>, concrete_type: ConcreteType, case: String },
    UnionCaseGet { expr: Box<Expr>, concrete_type: ConcreteType, case: String, field: String },
    UnionCaseTag { expr: Box<Expr>, concrete_type: ConcreteType },

    /// Field access not yet resolved through `LookupFieldInfo` (§4.1.7).
    /// Never survives translation (§4.4's invalid-form checker rejects it
    /// unconditionally) — it is always rewritten into an `ItemGetString`,
    /// a `Runtime.GetOptional` call, or a getter-method call.
    FieldGet { obj: Option<Box<Expr>>, concrete_type: ConcreteType, field: crate::ids::FieldId },
    FieldSet { obj: Option<Box<Expr>>, concrete_type: ConcreteType, field: crate::ids::FieldId, value: Box<Expr> },

    CctorTrigger(ConcreteType),

    TypeCheck { expr: Box<Expr>, concrete_type: ConcreteType },

    TraitCall {
        receiver: Box<Expr>,
        trait_types: Vec<ConcreteType>,
        method_name: String,
        generics: Vec<ConcreteType>,
        args: Vec<Expr>,
    },

    Await(Box<Expr>),
    Hole,
    NamedParameter { name: String, value: Box<Expr> },
    RefOrOutParameter(Box<Expr>),
    Coalesce { left: Box<Expr>, right: Box<Expr> },
    StatementExpr(Box<Stmt>),
    OptimizedFSharpArg { shape: FuncArgShape, expr: Box<Expr> },
    Undefined,
    ErrorPlaceholder(String),

    WithSourcePos(SourcePos, Box<Expr>),
}

impl Expr {
    pub fn at(self, pos: SourcePos) -> Expr {
        Expr::WithSourcePos(pos, Box::new(self))
    }

    /// Strip a leading `WithSourcePos` wrapper, if any, returning the
    /// position (if present) and the unwrapped node.
    pub fn strip_pos(&self) -> (Option<SourcePos>, &Expr) {
        match self {
            Expr::WithSourcePos(pos, inner) => (Some(*pos), inner),
            other => (None, other),
        }
    }
}
