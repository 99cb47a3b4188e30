use crate::error::LazyGradError;
use crate::tensor::utils::{broadcast_shapes, calculate_strides, coord_to_index_broadcasted, index_to_coord};
use crate::tensor::Tensor;
use num_traits::Zero;

impl Tensor {
    /// Broadcasts this tensor up to `target_shape` by repeating along new or
    /// size-1 axes. The inverse of `reduce_to_shape` for gradient flow.
    pub fn expand_to(&self, target_shape: &[usize]) -> Result<Tensor, LazyGradError> {
        if self.shape() == target_shape {
            return Ok(self.clone());
        }

        // The broadcast of self's shape against the target must be the
        // target itself, otherwise the expansion is ill-formed.
        let combined = broadcast_shapes(&self.shape, target_shape)?;
        if combined != target_shape {
            return Err(LazyGradError::BroadcastError {
                shape1: self.shape.clone(),
                shape2: target_shape.to_vec(),
            });
        }

        let data = expand_kernel(&self.data, &self.shape, &self.strides, target_shape);
        Tensor::new(data, target_shape.to_vec())
    }

    /// Collapses this tensor down to `target_shape` by summing over the axes
    /// that broadcasting introduced or stretched.
    ///
    /// The gradient counterpart of broadcasting: whenever a forward pass
    /// widened an operand, the backward pass must sum the gradient over the
    /// widened axes so its shape matches the operand again.
    pub fn reduce_to_shape(&self, target_shape: &[usize]) -> Result<Tensor, LazyGradError> {
        let current_shape = self.shape();
        if current_shape == target_shape {
            return Ok(self.clone());
        }

        // Reduction to scalar sums everything.
        if target_shape.is_empty() {
            return self.sum_axes(&[], false);
        }

        let current_rank = current_shape.len();
        let target_rank = target_shape.len();
        if current_rank < target_rank {
            return Err(LazyGradError::InternalError(format!(
                "cannot reduce shape {:?} to broader shape {:?}",
                current_shape, target_shape
            )));
        }

        // Leading axes added by broadcasting, then stretched size-1 axes.
        let rank_diff = current_rank - target_rank;
        let mut axes_to_sum: Vec<usize> = (0..rank_diff).collect();
        for i in 0..target_rank {
            if target_shape[i] == 1 && current_shape[rank_diff + i] != 1 {
                axes_to_sum.push(rank_diff + i);
            } else if target_shape[i] != current_shape[rank_diff + i] && target_shape[i] != 1 {
                return Err(LazyGradError::InternalError(format!(
                    "cannot reduce shape {:?} to {:?}: dimension {} is incompatible",
                    current_shape, target_shape, i
                )));
            }
        }

        let reduced = self.sum_axes(&axes_to_sum, true)?;
        if reduced.shape() == target_shape {
            Ok(reduced)
        } else {
            // Same element count, drop the kept size-1 axes.
            Tensor::new(reduced.to_vec(), target_shape.to_vec())
        }
    }
}

/// Materializes a broadcasted copy of `source` at `target_shape`.
///
/// Generic over the element type; the caller has already validated that the
/// shapes are broadcast-compatible.
pub(crate) fn expand_kernel<T>(
    source: &[T],
    source_shape: &[usize],
    source_strides: &[usize],
    target_shape: &[usize],
) -> Vec<T>
where
    T: Copy + Zero,
{
    let target_numel: usize = target_shape.iter().product();
    let target_strides = calculate_strides(target_shape);
    let mut expanded = vec![T::zero(); target_numel];

    for (i, slot) in expanded.iter_mut().enumerate() {
        let coords = index_to_coord(i, &target_strides, target_shape);
        *slot = source[coord_to_index_broadcasted(&coords, source_shape, source_strides)];
    }
    expanded
}
