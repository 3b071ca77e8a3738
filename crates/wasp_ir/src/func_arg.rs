/// Per-argument curried/tupled-function adaptation shape (§3 "Optimization
/// record", §4.1.2 "Argument shaping"). Shared between the metadata layer
/// (which attaches a `Vec<FuncArgShape>` to a compiled member's options)
/// and the IR (`Expr::OptimizedFSharpArg` records which shape an argument
/// has already been adapted to, so a second adaptation can be skipped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncArgShape {
    NotOptimized,
    Curried(u8),
    Tupled(u8),
}
