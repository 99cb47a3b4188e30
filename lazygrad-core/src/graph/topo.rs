use crate::graph::{Node, NodeData, NodeKind};
use std::collections::HashSet;
use std::sync::RwLock;

/// Stable identity of a graph node: the address of its shared cell.
///
/// The pointer stays valid for as long as any `Node` handle (or any
/// downstream node holding one as an input) keeps the cell alive, which the
/// traversal below guarantees by collecting the handles themselves.
pub(crate) type NodeId = *const RwLock<NodeData>;

/// Depth-first topological sort of `node`'s ancestor graph.
///
/// Returns the nodes leaves-first, each exactly once; iterate the result in
/// reverse for a backward sweep. A `HashSet` keyed on node identity makes
/// shared subexpressions appear a single time even when several paths reach
/// them.
pub(crate) fn topological_sort(node: &Node) -> Vec<Node> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut sorted: Vec<Node> = Vec::new();
    visit(node, &mut visited, &mut sorted);
    sorted
}

fn visit(node: &Node, visited: &mut HashSet<NodeId>, sorted: &mut Vec<Node>) {
    if !visited.insert(node.id()) {
        return;
    }
    let inputs: Vec<Node> = match &node.read_data().kind {
        NodeKind::Leaf { .. } => Vec::new(),
        NodeKind::Operator { inputs, .. } => inputs.clone(),
    };
    for input in &inputs {
        visit(input, visited, sorted);
    }
    sorted.push(node.clone());
}
