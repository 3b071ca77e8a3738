use wasp_ir::SourcePos;
use wasp_meta::ErrorKind;

/// Internal control-flow error used while a single node is being
/// translated. It never crosses the crate boundary: every call site that
/// can fail converts it into a diagnostic plus `Expr::ErrorPlaceholder`
/// before returning (§7 "Propagation policy").
#[derive(Debug, Clone)]
pub struct TranslateError {
    pub kind: ErrorKind,
    pub position: Option<SourcePos>,
}

impl TranslateError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, position: None }
    }

    pub fn source(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SourceError(message.into()))
    }

    pub fn at(mut self, position: Option<SourcePos>) -> Self {
        self.position = position;
        self
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;
