use wasp_ir::{Address, FuncArgShape};
use wasp_meta::GraphNode;

/// Per-invocation Translator state (§4.1 "Translator"). Threaded by value
/// through sub-translators spawned to compile an inline dependency
/// on-demand (§4.1.1 item 2) rather than held behind a mutable global, so
/// that `current_node` is always the node actually under translation even
/// when translation recurses into a different member.
#[derive(Debug, Clone)]
pub struct TranslatorState {
    pub current_node: GraphNode,
    pub current_is_inline: bool,
    pub self_address: Option<Address>,
    pub has_delayed_transform: bool,
    pub current_func_args: Option<Vec<FuncArgShape>>,
    /// Stack of nodes currently being translated, used to detect inline
    /// recursion (§4.2 "Cycle detection").
    pub in_progress: Vec<GraphNode>,
}

impl TranslatorState {
    pub fn new(current_node: GraphNode, current_is_inline: bool) -> Self {
        Self {
            current_node: current_node.clone(),
            current_is_inline,
            self_address: None,
            has_delayed_transform: false,
            current_func_args: None,
            in_progress: vec![current_node],
        }
    }

    /// Builds the state for a sub-translator entering `node`, inheriting
    /// the cycle-detection stack but starting a fresh delayed-transform
    /// flag and func-arg context (those are per-member).
    pub fn enter(&self, node: GraphNode, is_inline: bool) -> Self {
        let mut in_progress = self.in_progress.clone();
        in_progress.push(node.clone());
        Self {
            current_node: node,
            current_is_inline: is_inline,
            self_address: self.self_address.clone(),
            has_delayed_transform: false,
            current_func_args: None,
            in_progress,
        }
    }

    pub fn is_in_progress(&self, node: &GraphNode) -> bool {
        self.in_progress.contains(node)
    }
}
