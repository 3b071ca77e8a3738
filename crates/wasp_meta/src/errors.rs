use thiserror::Error;

/// Failures in the metadata store's own bookkeeping — never raised by
/// ordinary lookups (those report `ErrorKind` through `Diagnostic`
/// instead), only by driver-level misuse such as compiling a node twice.
#[derive(Debug, Error)]
pub enum MetaError {
    #[error("no compiling member registered for {0:?}")]
    NotCompiling(crate::graph::GraphNode),
    #[error("macro '{0}' is not registered")]
    UnknownMacro(String),
    #[error("generator '{0}' is not registered")]
    UnknownGenerator(String),
}

pub type Result<T> = std::result::Result<T, MetaError>;
