use petgraph::graph::DiGraph;
use std::collections::HashMap;
use wasp_ir::{CtorId, MethodId, TypeId};

/// An entity that may participate in the dependency graph (§6 "Dependency
/// graph").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphNode {
    MethodNode(TypeId, MethodId),
    AbstractMethodNode(TypeId, MethodId),
    ConstructorNode(TypeId, CtorId),
    ImplementationNode(TypeId, TypeId, MethodId),
    TypeNode(TypeId),
    AssemblyNode(String, bool),
    EntryPointNode,
}

/// Thin wrapper over `petgraph::DiGraph` giving `AddEdge`/reachability the
/// shape spec.md §3/§6 describes, keyed by [`GraphNode`] rather than
/// `petgraph`'s own index type so callers never see the underlying index.
#[derive(Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, ()>,
    index: HashMap<GraphNode, petgraph::graph::NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, node: GraphNode) -> petgraph::graph::NodeIndex {
        if let Some(idx) = self.index.get(&node) {
            return *idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        idx
    }

    pub fn add_edge(&mut self, from: GraphNode, to: GraphNode) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        self.graph.update_edge(from_idx, to_idx, ());
    }

    pub fn is_reachable(&self, from: &GraphNode, to: &GraphNode) -> bool {
        let (Some(&start), Some(&goal)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        if start == goal {
            return true;
        }
        petgraph::algo::has_path_connecting(&self.graph, start, goal, None)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_is_queryable_by_reachability() {
        let mut g = DependencyGraph::new();
        let a = GraphNode::TypeNode(TypeId(0));
        let b = GraphNode::TypeNode(TypeId(1));
        let c = GraphNode::TypeNode(TypeId(2));
        g.add_edge(a.clone(), b.clone());
        g.add_edge(b.clone(), c.clone());
        assert!(g.is_reachable(&a, &c));
        assert!(!g.is_reachable(&c, &a));
    }
}
