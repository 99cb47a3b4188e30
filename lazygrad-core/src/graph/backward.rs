use crate::error::LazyGradError;
use crate::graph::topo::{topological_sort, NodeId};
use crate::graph::{Node, NodeKind};
use crate::tensor::{self, Tensor};
use std::collections::HashMap;
use std::sync::Arc;

impl Node {
    /// Computes d(self)/d(`wrt`) by reverse-mode propagation over the DAG,
    /// evaluated at the currently cached forward values.
    ///
    /// `value(true)` must have run on this node beforehand so every ancestor
    /// cache is populated; a missing cache fails fast with
    /// `MissingForwardValue` instead of differentiating stale state. `wrt`
    /// must be a leaf. The result always has the shape of `wrt`'s wrapped
    /// value, and is all zeros when `wrt` is not an ancestor of this node.
    pub fn grad(&self, wrt: &Node) -> Result<Tensor, LazyGradError> {
        if !wrt.is_leaf() {
            return Err(LazyGradError::NonLeafGradTarget {
                operation: "grad".to_string(),
            });
        }

        let output_value = self.cached_value().ok_or_else(|| {
            LazyGradError::MissingForwardValue {
                operation: "grad".to_string(),
            }
        })?;

        // Adjoint accumulator keyed by node identity. Seeding with ones
        // makes d(self)/d(self) the identity gradient.
        let mut adjoints: HashMap<NodeId, Tensor> = HashMap::new();
        adjoints.insert(self.id(), tensor::ones_like(&output_value));

        let order = topological_sort(self);
        log::debug!(
            "backward sweep over {} nodes from {:?}",
            order.len(),
            self.id()
        );

        // Reverse sweep: by the time a node is visited, every consumer has
        // already deposited its contribution, so the entry is final.
        for node in order.iter().rev() {
            let Some(grad_output) = adjoints.get(&node.id()).cloned() else {
                continue; // no gradient flowed here
            };

            let (op, inputs) = match &node.read_data().kind {
                NodeKind::Leaf { .. } => continue,
                NodeKind::Operator { op, inputs } => (Arc::clone(op), inputs.clone()),
            };

            let mut input_values = Vec::with_capacity(inputs.len());
            for input in &inputs {
                input_values.push(input.cached_value().ok_or_else(|| {
                    LazyGradError::MissingForwardValue {
                        operation: format!("grad ({} input)", op.name()),
                    }
                })?);
            }

            let input_grads = op.backward(&input_values, &grad_output)?;
            if input_grads.len() != inputs.len() {
                return Err(LazyGradError::InternalError(format!(
                    "operator {} returned {} gradients for {} inputs",
                    op.name(),
                    input_grads.len(),
                    inputs.len()
                )));
            }

            for ((input, input_value), grad) in
                inputs.iter().zip(&input_values).zip(input_grads)
            {
                if grad.shape() != input_value.shape() {
                    return Err(LazyGradError::GradientAccumulationShapeMismatch {
                        expected: input_value.shape().to_vec(),
                        actual: grad.shape().to_vec(),
                    });
                }
                // Sum, never overwrite: a shared subexpression collects one
                // contribution per consuming path.
                match adjoints.remove(&input.id()) {
                    Some(existing) => {
                        adjoints.insert(input.id(), existing.add(&grad)?);
                    }
                    None => {
                        adjoints.insert(input.id(), grad);
                    }
                }
            }
        }

        let wrt_shape_source = wrt.leaf_value()?;
        match adjoints.remove(&wrt.id()) {
            Some(grad) => Ok(grad),
            None => Ok(tensor::zeros_like(&wrt_shape_source)),
        }
    }
}
