use crate::error::LazyGradError;
use crate::graph::{Node, Op};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Elementwise addition node with NumPy-style broadcasting.
#[derive(Debug)]
pub(crate) struct AddOp;

impl Op for AddOp {
    fn name(&self) -> &'static str {
        "add"
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Tensor, LazyGradError> {
        inputs[0].add(&inputs[1])
    }

    fn backward(
        &self,
        inputs: &[Tensor],
        grad_output: &Tensor,
    ) -> Result<Vec<Tensor>, LazyGradError> {
        // d(a + b)/da = d(a + b)/db = identity; an operand that was
        // broadcast in the forward pass gets its gradient summed back over
        // the broadcast axes so the shape matches the operand again.
        inputs
            .iter()
            .map(|input| grad_output.reduce_to_shape(input.shape()))
            .collect()
    }
}

/// Builds an elementwise-addition node over two inputs.
///
/// Incompatible shapes are reported by `value()`, when the forward pass
/// first runs.
pub fn add(a: &Node, b: &Node) -> Node {
    Node::from_op(Arc::new(AddOp), vec![a.clone(), b.clone()])
}
