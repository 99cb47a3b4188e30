//! lazygrad: a lazy, reverse-mode automatic-differentiation engine over
//! dense `f64` tensors.
//!
//! Leaves wrap user-supplied tensors; operator nodes cache their forward
//! value and recompute it only when a reset is requested. Gradients of any
//! node with respect to any leaf are propagated backward over the DAG via
//! the chain rule, and a finite-difference checker validates them.

pub mod error;
pub mod graph;
pub mod ops;
pub mod tensor;
pub mod utils;

pub use error::LazyGradError;
pub use graph::{check_grad, Node, Op, DEFAULT_EPSILON};
pub use tensor::Tensor;
