use crate::error::LazyGradError;
use crate::tensor::Tensor;
use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub mod grad_check;
pub mod op;

mod backward;
mod topo;

#[cfg(test)]
mod backward_test;

pub use grad_check::{check_grad, DEFAULT_EPSILON};
pub use op::Op;

use topo::NodeId;

/// What a node computes: either a user-supplied leaf tensor, or an operator
/// applied to upstream nodes.
#[derive(Debug)]
pub(crate) enum NodeKind {
    /// Wraps a tensor supplied (and possibly later mutated) by the caller.
    Leaf { value: Tensor },
    /// Applies `op` to the values of `inputs`.
    Operator {
        op: Arc<dyn Op + Send + Sync>,
        inputs: Vec<Node>,
    },
}

/// Shared state of one graph vertex: its definition plus the cached forward
/// value. The cache is an explicit optional slot so the reset-propagation
/// contract stays auditable; there is no hidden memoization anywhere else.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) cache: Option<Tensor>,
}

/// A vertex in the computation graph.
///
/// `Node` is a cheap-clone handle over `Arc<RwLock<NodeData>>`; clones refer
/// to the same vertex. Node identity (used by every visited set and gradient
/// accumulator) is the address of the shared cell, so a subexpression held
/// by two downstream consumers is one node, not two.
///
/// Evaluation is single-threaded by contract: the lock exists to share the
/// cell safely between handles, not to promise concurrent evaluation of one
/// graph from several threads.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) cell: Arc<RwLock<NodeData>>,
}

impl Node {
    /// Creates a leaf node wrapping a parameter tensor, the unit with
    /// respect to which gradients are requested.
    pub fn parameter(value: Tensor) -> Node {
        Node::leaf(value)
    }

    /// Creates a leaf node wrapping a constant tensor. Evaluation semantics
    /// are identical to `parameter`; the name records intent at call sites.
    pub fn constant(value: Tensor) -> Node {
        Node::leaf(value)
    }

    fn leaf(value: Tensor) -> Node {
        Node {
            cell: Arc::new(RwLock::new(NodeData {
                kind: NodeKind::Leaf { value },
                cache: None,
            })),
        }
    }

    /// Creates an operator node applying `op` to `inputs`.
    ///
    /// This is the extension point used by the constructors in `ops::`;
    /// custom operators go through here as well.
    pub fn from_op(op: Arc<dyn Op + Send + Sync>, inputs: Vec<Node>) -> Node {
        Node {
            cell: Arc::new(RwLock::new(NodeData {
                kind: NodeKind::Operator { op, inputs },
                cache: None,
            })),
        }
    }

    /// True when this node wraps a user-supplied tensor.
    pub fn is_leaf(&self) -> bool {
        matches!(self.read_data().kind, NodeKind::Leaf { .. })
    }

    /// Replaces the wrapped tensor of a leaf node.
    ///
    /// Downstream caches are deliberately left untouched: readers keep
    /// seeing the previously computed values until someone requests
    /// `value(true)`. Fails with `NotALeaf` on operator nodes.
    pub fn set_value(&self, value: Tensor) -> Result<(), LazyGradError> {
        let mut guard = self.write_data();
        match &mut guard.kind {
            NodeKind::Leaf { value: wrapped } => {
                *wrapped = value;
                Ok(())
            }
            NodeKind::Operator { .. } => Err(LazyGradError::NotALeaf),
        }
    }

    /// Reads the wrapped tensor of a leaf node back.
    pub fn leaf_value(&self) -> Result<Tensor, LazyGradError> {
        match &self.read_data().kind {
            NodeKind::Leaf { value } => Ok(value.clone()),
            NodeKind::Operator { .. } => Err(LazyGradError::NotALeaf),
        }
    }

    /// Computes (or returns the cached) forward value of this node.
    ///
    /// With `reset == false` the call is idempotent: a present cache is
    /// returned unchanged, and only nodes that were never evaluated compute.
    /// With `reset == true` this node and every ancestor recompute exactly
    /// once for this call, no matter how many DAG paths reach them; the
    /// single-pass guarantee is enforced by a per-call visited set.
    pub fn value(&self, reset: bool) -> Result<Tensor, LazyGradError> {
        let mut refreshed: HashSet<NodeId> = HashSet::new();
        self.value_inner(reset, &mut refreshed)
    }

    fn value_inner(
        &self,
        reset: bool,
        refreshed: &mut HashSet<NodeId>,
    ) -> Result<Tensor, LazyGradError> {
        // Serve from cache unless this pass still owes the node a refresh.
        if !reset || refreshed.contains(&self.id()) {
            if let Some(cached) = self.read_data().cache.clone() {
                log::trace!("node {:?}: cache hit", self.id());
                return Ok(cached);
            }
        }

        // Snapshot the definition so no lock is held across recursion.
        enum Plan {
            Leaf(Tensor),
            Operator(Arc<dyn Op + Send + Sync>, Vec<Node>),
        }
        let plan = {
            let guard = self.read_data();
            match &guard.kind {
                NodeKind::Leaf { value } => Plan::Leaf(value.clone()),
                NodeKind::Operator { op, inputs } => {
                    Plan::Operator(Arc::clone(op), inputs.clone())
                }
            }
        };

        let value = match plan {
            Plan::Leaf(value) => value,
            Plan::Operator(op, inputs) => {
                let mut input_values = Vec::with_capacity(inputs.len());
                for input in &inputs {
                    input_values.push(input.value_inner(reset, refreshed)?);
                }
                log::trace!("node {:?}: computing {}", self.id(), op.name());
                op.forward(&input_values)?
            }
        };

        self.write_data().cache = Some(value.clone());
        if reset {
            refreshed.insert(self.id());
        }
        Ok(value)
    }

    /// Stable identity of this node: the address of its shared cell.
    pub(crate) fn id(&self) -> NodeId {
        Arc::as_ptr(&self.cell)
    }

    /// Clone of the cached forward value, if one exists.
    pub(crate) fn cached_value(&self) -> Option<Tensor> {
        self.read_data().cache.clone()
    }

    pub(crate) fn read_data(&self) -> RwLockReadGuard<'_, NodeData> {
        self.cell.read().expect("node cell poisoned")
    }

    pub(crate) fn write_data(&self) -> RwLockWriteGuard<'_, NodeData> {
        self.cell.write().expect("node cell poisoned")
    }
}
