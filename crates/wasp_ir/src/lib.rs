//! The shared typed IR: one tree used both as the translator's input
//! (method/constructor bodies handed down by the front end) and as its
//! output (the JavaScript-compatible subset of the same tree).

pub mod address;
pub mod entity;
pub mod expr;
pub mod func_arg;
pub mod ids;
pub mod literal;
pub mod pos;
pub mod stmt;

pub use address::Address;
pub use entity::{ConcreteCtor, ConcreteMethod, ConcreteType};
pub use expr::Expr;
pub use func_arg::FuncArgShape;
pub use ids::{CtorId, FieldId, Id, MethodId, TypeId, DYNAMIC_TYPE};
pub use literal::{BinaryOp, Literal, UnaryOp};
pub use pos::SourcePos;
pub use stmt::Stmt;
