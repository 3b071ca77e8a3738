use crate::graph::GraphNode;
use wasp_ir::{ConcreteCtor, ConcreteMethod, ConcreteType, Expr};

/// What the Translator hands a macro or generator instance (§4.6).
#[derive(Debug, Clone)]
pub struct MacroRequest {
    pub this: Option<Expr>,
    pub concrete_type: ConcreteType,
    pub method: Option<ConcreteMethod>,
    pub ctor: Option<ConcreteCtor>,
    pub args: Vec<Expr>,
    pub parameter: Option<String>,
    pub is_inline: bool,
}

/// The macro result protocol (§4.6), one arm per case the Translator must
/// interpret recursively.
#[derive(Debug, Clone)]
pub enum MacroResult {
    Ok(Expr),
    Warning(String, Box<MacroResult>),
    Error(String),
    Dependencies(Vec<GraphNode>, Box<MacroResult>),
    Fallback,
    NeedsResolvedTypeArg(ConcreteType),
}

/// A user-supplied plug-in that customizes translation of particular calls
/// or constructors (§4.6, §GLOSSARY "Macro").
pub trait Macro {
    fn translate_call(&self, request: &MacroRequest) -> MacroResult;
    fn translate_ctor(&self, request: &MacroRequest) -> MacroResult;
}

/// A generator additionally supports emitting a quotation (a source-level
/// expression already read into the IR) or pre-formed JS literal text.
#[derive(Debug, Clone)]
pub enum GeneratorResult {
    Ok(Expr),
    Warning(String, Box<GeneratorResult>),
    Error(String),
    Dependencies(Vec<GraphNode>, Box<GeneratorResult>),
    Fallback,
    NeedsResolvedTypeArg(ConcreteType),
    /// A raw source-language expression tree, read into the IR already and
    /// translated like any other body.
    Quotation(Expr),
    /// Pre-formed JavaScript source, incorporated verbatim by the writer.
    RawJavaScript(String),
}

pub trait Generator {
    fn generate(&self, request: &MacroRequest) -> GeneratorResult;
}

/// Exercises the result protocol end-to-end in tests (§4 "Supplemented
/// features"): always succeeds by returning its sole argument unchanged.
pub struct IdentityMacro;

impl Macro for IdentityMacro {
    fn translate_call(&self, request: &MacroRequest) -> MacroResult {
        match request.args.first() {
            Some(arg) => MacroResult::Ok(arg.clone()),
            None => MacroResult::Error("IdentityMacro requires one argument".to_string()),
        }
    }

    fn translate_ctor(&self, request: &MacroRequest) -> MacroResult {
        self.translate_call(request)
    }
}
