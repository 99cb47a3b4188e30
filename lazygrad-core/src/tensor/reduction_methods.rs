use crate::error::LazyGradError;
use crate::tensor::Tensor;
use num_traits::Zero;
use std::ops::AddAssign;

/// Sums `data` (row-major, shaped `shape`) over the given axes.
///
/// `axes` must be sorted, deduplicated and in range. Returns the reduced
/// buffer together with the reduced shape. Kept generic over the element
/// type so the kernel is reusable independent of the `f64` tensor front-end.
pub(crate) fn reduce_sum_kernel<T>(
    data: &[T],
    shape: &[usize],
    axes: &[usize],
    keep_dims: bool,
) -> (Vec<T>, Vec<usize>)
where
    T: Copy + Zero + AddAssign,
{
    let rank = shape.len();

    let mut output_shape = Vec::new();
    for (dim, &size) in shape.iter().enumerate() {
        if !axes.contains(&dim) {
            output_shape.push(size);
        } else if keep_dims {
            output_shape.push(1);
        }
    }

    let output_numel: usize = output_shape.iter().product();
    let mut result = vec![T::zero(); output_numel];

    // Walk the input with an N-dimensional counter, folding each element
    // into the output slot addressed by its non-reduced coordinates.
    let mut coords = vec![0; rank];
    for &val in data {
        let mut flat = 0;
        let mut stride = 1;
        for dim in (0..rank).rev() {
            if !axes.contains(&dim) {
                flat += coords[dim] * stride;
                stride *= shape[dim];
            }
            // Reduced axes map to output coordinate 0; with keep_dims their
            // output extent is 1, which leaves the stride unchanged anyway.
        }
        result[flat] += val;

        for dim in (0..rank).rev() {
            coords[dim] += 1;
            if coords[dim] < shape[dim] {
                break;
            }
            coords[dim] = 0;
        }
    }

    (result, output_shape)
}

impl Tensor {
    /// Sums along the given axes, removing them from the shape unless
    /// `keep_dims` is set. An empty axis list sums every element down to a
    /// rank-0 scalar tensor.
    pub fn sum_axes(&self, axes: &[usize], keep_dims: bool) -> Result<Tensor, LazyGradError> {
        let rank = self.rank();

        if axes.is_empty() {
            let total: f64 = self.data.iter().sum();
            let shape = if keep_dims { vec![1; rank] } else { vec![] };
            return Tensor::new(vec![total], shape);
        }

        let mut sorted_axes = axes.to_vec();
        sorted_axes.sort_unstable();
        sorted_axes.dedup();
        for &axis in &sorted_axes {
            if axis >= rank {
                return Err(LazyGradError::AxisOutOfRange { axis, rank });
            }
        }

        let (data, shape) = reduce_sum_kernel(&self.data, &self.shape, &sorted_axes, keep_dims);
        Tensor::new(data, shape)
    }

    /// Sums every element into a plain `f64`.
    pub fn sum_all(&self) -> f64 {
        self.data.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::from_vec;
    use approx::assert_relative_eq;

    fn tensor_2x3() -> Tensor {
        from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap()
    }

    #[test]
    fn test_sum_all_elements() {
        let t = tensor_2x3();
        assert_relative_eq!(t.sum_all(), 21.0);

        let reduced = t.sum_axes(&[], false).unwrap();
        assert!(reduced.is_scalar());
        assert_relative_eq!(reduced.item().unwrap(), 21.0);
    }

    #[test]
    fn test_sum_axis_0() {
        let t = tensor_2x3();
        let r = t.sum_axes(&[0], false).unwrap();
        assert_eq!(r.shape(), &[3]);
        assert_eq!(r.data(), &[5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_sum_axis_1() {
        let t = tensor_2x3();
        let r = t.sum_axes(&[1], false).unwrap();
        assert_eq!(r.shape(), &[2]);
        assert_eq!(r.data(), &[6.0, 15.0]);
    }

    #[test]
    fn test_sum_keep_dims() {
        let t = tensor_2x3();
        let r = t.sum_axes(&[0], true).unwrap();
        assert_eq!(r.shape(), &[1, 3]);
        assert_eq!(r.data(), &[5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_sum_multiple_axes() {
        let t = from_vec(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            vec![2, 2, 2],
        )
        .unwrap();
        let r = t.sum_axes(&[0, 2], false).unwrap();
        assert_eq!(r.shape(), &[2]);
        assert_eq!(r.data(), &[14.0, 22.0]);
    }

    #[test]
    fn test_sum_singleton_axis() {
        let t = from_vec(vec![1.0, 2.0, 3.0], vec![1, 3]).unwrap();
        let r = t.sum_axes(&[0], false).unwrap();
        assert_eq!(r.shape(), &[3]);
        assert_eq!(r.data(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sum_axis_out_of_range() {
        let t = from_vec(vec![1.0, 2.0], vec![2]).unwrap();
        assert_eq!(
            t.sum_axes(&[1], false).err().unwrap(),
            LazyGradError::AxisOutOfRange { axis: 1, rank: 1 }
        );
    }
}
