#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePos {
    pub file: u32,
    pub line: u32,
    pub column: u32,
}
