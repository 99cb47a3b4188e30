use crate::error::LazyGradError;
use std::cmp::max;

/// Calculates row-major (C order) strides for a given shape.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [10, 20] -> strides = [20, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Determines the output shape resulting from broadcasting two input shapes.
///
/// Follows NumPy broadcasting rules:
/// 1. If the shapes have different ranks, prepend 1s to the shorter shape.
/// 2. Compare dimensions right to left; they are compatible if equal or one is 1.
/// 3. The resulting dimension is the larger of the two.
pub fn broadcast_shapes(
    shape_a: &[usize],
    shape_b: &[usize],
) -> Result<Vec<usize>, LazyGradError> {
    let rank_a = shape_a.len();
    let rank_b = shape_b.len();
    let max_rank = max(rank_a, rank_b);
    let mut result = vec![0; max_rank];

    for i in 0..max_rank {
        let dim_a = shape_a.get(rank_a.wrapping_sub(1 + i)).copied().unwrap_or(1);
        let dim_b = shape_b.get(rank_b.wrapping_sub(1 + i)).copied().unwrap_or(1);

        result[max_rank - 1 - i] = if dim_a == dim_b {
            dim_a
        } else if dim_a == 1 {
            dim_b
        } else if dim_b == 1 {
            dim_a
        } else {
            return Err(LazyGradError::BroadcastError {
                shape1: shape_a.to_vec(),
                shape2: shape_b.to_vec(),
            });
        };
    }
    Ok(result)
}

/// Converts a linear (row-major) index into multi-dimensional coordinates.
pub fn index_to_coord(index: usize, strides: &[usize], shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut coord = vec![0; rank];
    let mut remaining = index;
    for i in 0..rank {
        if strides[i] > 0 {
            coord[i] = remaining / strides[i];
            remaining %= strides[i];
        }
    }
    coord
}

/// Maps coordinates in a broadcasted output back to the linear index of the
/// original (narrower) operand. Dimensions of size 1 always map to index 0.
pub fn coord_to_index_broadcasted(
    target_coord: &[usize],
    original_shape: &[usize],
    original_strides: &[usize],
) -> usize {
    if original_shape.is_empty() {
        return 0; // scalar operand
    }
    let rank_diff = target_coord.len().saturating_sub(original_shape.len());
    let mut index = 0;
    for (i, (&dim, &stride)) in original_shape.iter().zip(original_strides).enumerate() {
        let coord = if dim == 1 { 0 } else { target_coord[rank_diff + i] };
        index += coord * stride;
    }
    index
}
