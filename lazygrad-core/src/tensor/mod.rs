use crate::error::LazyGradError;
use crate::tensor::utils::{broadcast_shapes, calculate_strides, coord_to_index_broadcasted, index_to_coord};
use approx::{AbsDiffEq, RelativeEq};
use std::sync::Arc;

pub mod broadcast_utils;
pub mod create;
pub mod reduction_methods;
pub mod utils;

// Re-export creation functions so callers can use `tensor::zeros(..)` etc.
pub use create::{from_vec, full, ones, ones_like, rand, randn, scalar, zeros, zeros_like};

/// A dense, row-major, CPU-resident array of `f64` values.
///
/// The buffer is wrapped in an `Arc` so clones are cheap and share storage.
/// `Tensor` itself is an immutable value: every operation returns a new
/// tensor. A rank-0 tensor (`shape == []`) holds exactly one element and
/// plays the role of a scalar.
#[derive(Debug, Clone)]
pub struct Tensor {
    pub(crate) data: Arc<Vec<f64>>,
    pub(crate) shape: Vec<usize>,
    pub(crate) strides: Vec<usize>,
}

impl Tensor {
    /// Creates a new tensor from flattened row-major data and a shape.
    ///
    /// Fails with `TensorCreationError` if the data length does not match
    /// the number of elements implied by the shape.
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Result<Self, LazyGradError> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(LazyGradError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        let strides = calculate_strides(&shape);
        Ok(Tensor {
            data: Arc::new(data),
            shape,
            strides,
        })
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the tensor's row-major strides.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the number of elements.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// True for rank-0 tensors.
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Returns the flattened row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Copies the flattened data out into a fresh `Vec`.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.as_ref().clone()
    }

    /// Extracts the single element of a scalar (or one-element) tensor.
    pub fn item(&self) -> Result<f64, LazyGradError> {
        if self.numel() != 1 {
            return Err(LazyGradError::NotScalar {
                shape: self.shape.clone(),
            });
        }
        Ok(self.data[0])
    }

    /// Reads the element at the given multi-dimensional coordinates.
    ///
    /// Coordinates must match the tensor's rank and be in bounds; this is an
    /// internal access path, so violations are programming errors.
    pub fn get(&self, coords: &[usize]) -> f64 {
        debug_assert_eq!(coords.len(), self.rank());
        let offset: usize = coords
            .iter()
            .zip(&self.strides)
            .map(|(c, s)| c * s)
            .sum();
        self.data[offset]
    }

    /// Element-wise addition with NumPy-style broadcasting.
    pub fn add(&self, other: &Tensor) -> Result<Tensor, LazyGradError> {
        let result_shape = broadcast_shapes(&self.shape, &other.shape)?;
        let result_strides = calculate_strides(&result_shape);
        let numel: usize = result_shape.iter().product();
        let mut result_data = Vec::with_capacity(numel);

        for i in 0..numel {
            let coords = index_to_coord(i, &result_strides, &result_shape);
            let a = self.data[coord_to_index_broadcasted(&coords, &self.shape, &self.strides)];
            let b = other.data[coord_to_index_broadcasted(&coords, &other.shape, &other.strides)];
            result_data.push(a + b);
        }
        Tensor::new(result_data, result_shape)
    }

    /// Multiplies every element by a scalar factor.
    pub fn scale(&self, factor: f64) -> Tensor {
        let data: Vec<f64> = self.data.iter().map(|v| v * factor).collect();
        Tensor {
            data: Arc::new(data),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
        }
    }

    /// Returns a copy with one element replaced, by flat row-major index.
    /// Used by the gradient checker to perturb single parameter entries.
    pub fn with_element(&self, flat_index: usize, value: f64) -> Result<Tensor, LazyGradError> {
        if flat_index >= self.numel() {
            return Err(LazyGradError::InternalError(format!(
                "flat index {} out of bounds for tensor with {} elements",
                flat_index,
                self.numel()
            )));
        }
        let mut data = self.to_vec();
        data[flat_index] = value;
        Tensor::new(data, self.shape.clone())
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && *self.data == *other.data
    }
}

impl AbsDiffEq for Tensor {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Tensor {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
