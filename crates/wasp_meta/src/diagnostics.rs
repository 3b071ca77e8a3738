use serde::{Deserialize, Serialize};
use std::fmt;
use wasp_ir::SourcePos;

/// Mirrors the two diagnostics sinks of spec.md §6/§7: every recoverable
/// failure in the translator becomes one of these instead of a panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// The error-kind vocabulary from spec.md §7.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ErrorKind {
    SourceError(String),
    TypeNotFound,
    MemberNotFound,
    MacroError,
    GeneratorError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::SourceError(msg) => write!(f, "{msg}"),
            ErrorKind::TypeNotFound => write!(f, "type not found"),
            ErrorKind::MemberNotFound => write!(f, "member not found"),
            // Reads "TranslateCall" even when the failing lookup came from
            // the ctor compiler; preserved rather than corrected (spec.md §9
            // open question).
            ErrorKind::MacroError => write!(f, "macro error in TranslateCall"),
            ErrorKind::GeneratorError => write!(f, "generator error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub position: Option<SourcePosDto>,
    pub member: String,
    pub text: String,
}

/// `SourcePos` does not derive `Serialize`/`Deserialize` (it lives in
/// `wasp_ir` and stays dependency-free); this DTO is the serializable
/// mirror used only for the diagnostics channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourcePosDto {
    pub file: u32,
    pub line: u32,
    pub column: u32,
}

impl From<SourcePos> for SourcePosDto {
    fn from(p: SourcePos) -> Self {
        Self { file: p.file, line: p.line, column: p.column }
    }
}

impl Diagnostic {
    pub fn error(member: impl Into<String>, position: Option<SourcePos>, kind: ErrorKind) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            position: position.map(Into::into),
            member: member.into(),
            text: kind.to_string(),
        }
    }

    pub fn warning(member: impl Into<String>, position: Option<SourcePos>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            position: position.map(Into::into),
            member: member.into(),
            text: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.member, self.severity, self.text)
    }
}

/// Serializes the two diagnostics sinks to a single JSON document, one
/// array per severity, for a driver caller that wants to hand errors and
/// warnings to a CI reporter rather than read them off stdout.
pub fn diagnostics_to_json(errors: &[Diagnostic], warnings: &[Diagnostic]) -> serde_json::Result<String> {
    #[derive(Serialize)]
    struct Report<'a> {
        errors: &'a [Diagnostic],
        warnings: &'a [Diagnostic],
    }
    serde_json::to_string_pretty(&Report { errors, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_errors_and_warnings_as_json_arrays() {
        let errors = vec![Diagnostic::error("M", None, ErrorKind::MemberNotFound)];
        let warnings = vec![Diagnostic::warning("M", None, "slow path")];
        let json = diagnostics_to_json(&errors, &warnings).unwrap();
        assert!(json.contains("\"errors\""));
        assert!(json.contains("member not found"));
        assert!(json.contains("slow path"));
    }
}
