use crate::error::LazyGradError;
use crate::graph::{Node, Op};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Summation node: reduces its single input either to a rank-0 scalar
/// (`axis == None`) or along one axis, removing that axis from the shape.
#[derive(Debug)]
pub(crate) struct SumOp {
    axis: Option<usize>,
}

impl Op for SumOp {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Tensor, LazyGradError> {
        let input = &inputs[0];
        match self.axis {
            None => input.sum_axes(&[], false),
            Some(axis) => input.sum_axes(&[axis], false),
        }
    }

    fn backward(
        &self,
        inputs: &[Tensor],
        grad_output: &Tensor,
    ) -> Result<Vec<Tensor>, LazyGradError> {
        let input = &inputs[0];
        // The local derivative is an all-ones tensor shaped like the input:
        // every element flows into its output slot with unit weight. Chained
        // with dOut, that collapses to broadcasting dOut back across the
        // reduced axis.
        let grad = match self.axis {
            None => grad_output.expand_to(input.shape())?,
            Some(axis) => {
                // Reinsert the reduced axis with extent 1, then stretch it.
                let mut shape = grad_output.shape().to_vec();
                shape.insert(axis, 1);
                Tensor::new(grad_output.to_vec(), shape)?.expand_to(input.shape())?
            }
        };
        Ok(vec![grad])
    }
}

/// Builds a summation node over `input`.
///
/// `axis == None` reduces every element to a scalar; `axis == Some(a)` sums
/// along `a` and removes it from the output shape. An out-of-range axis is
/// reported by `value()`, when the forward pass first runs.
pub fn sum(input: &Node, axis: Option<usize>) -> Node {
    Node::from_op(Arc::new(SumOp { axis }), vec![input.clone()])
}

/// Convenience for the full reduction, `sum(input, None)`.
pub fn sum_all(input: &Node) -> Node {
    sum(input, None)
}
