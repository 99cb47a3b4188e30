use crate::error::LazyGradError;
use crate::tensor::utils::calculate_strides;
use crate::tensor::Tensor;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use std::sync::Arc;

// Infallible constructor used by the fill-style creators below, which
// derive the data length from the shape.
fn from_parts(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    let strides = calculate_strides(&shape);
    Tensor {
        data: Arc::new(data),
        shape,
        strides,
    }
}

/// Creates a rank-0 tensor holding a single value.
pub fn scalar(value: f64) -> Tensor {
    from_parts(vec![value], vec![])
}

/// Creates a tensor filled with zeros.
pub fn zeros(shape: &[usize]) -> Tensor {
    full(shape, 0.0)
}

/// Creates a tensor filled with ones.
pub fn ones(shape: &[usize]) -> Tensor {
    full(shape, 1.0)
}

/// Creates a tensor filled with a specific value.
pub fn full(shape: &[usize], value: f64) -> Tensor {
    let numel = shape.iter().product();
    from_parts(vec![value; numel], shape.to_vec())
}

/// Creates a zero tensor with the same shape as the given tensor.
pub fn zeros_like(tensor: &Tensor) -> Tensor {
    zeros(tensor.shape())
}

/// Creates an all-ones tensor with the same shape as the given tensor.
pub fn ones_like(tensor: &Tensor) -> Tensor {
    ones(tensor.shape())
}

/// Creates a tensor from flattened row-major data and a shape.
pub fn from_vec(data: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, LazyGradError> {
    Tensor::new(data, shape)
}

/// Creates a tensor of uniform samples from `[0, 1)`.
///
/// The random source is passed in by the caller so test runs stay
/// reproducible with a seeded generator.
pub fn rand<R: Rng>(shape: &[usize], rng: &mut R) -> Tensor {
    let numel = shape.iter().product();
    let data: Vec<f64> = (0..numel).map(|_| rng.gen::<f64>()).collect();
    from_parts(data, shape.to_vec())
}

/// Creates a tensor of standard-normal samples.
pub fn randn<R: Rng>(shape: &[usize], rng: &mut R) -> Tensor {
    let numel = shape.iter().product();
    let data: Vec<f64> = (0..numel).map(|_| StandardNormal.sample(rng)).collect();
    from_parts(data, shape.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zeros_ones_full() {
        let z = zeros(&[2, 3]);
        assert_eq!(z.shape(), &[2, 3]);
        assert!(z.data().iter().all(|&v| v == 0.0));

        let o = ones(&[4]);
        assert!(o.data().iter().all(|&v| v == 1.0));

        let f = full(&[2], 3.5);
        assert_eq!(f.data(), &[3.5, 3.5]);
    }

    #[test]
    fn test_like_constructors() {
        let t = full(&[3, 2], 7.0);
        assert_eq!(zeros_like(&t).shape(), t.shape());
        assert_eq!(ones_like(&t).shape(), t.shape());
    }

    #[test]
    fn test_randn_is_reproducible() {
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = randn(&[5, 5], &mut rng_a);
        let b = randn(&[5, 5], &mut rng_b);
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_rand_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let t = rand(&[100], &mut rng);
        assert!(t.data().iter().all(|&v| (0.0..1.0).contains(&v)));
    }
}
