use thiserror::Error;

/// Custom error type for the lazygrad engine.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq/Clone for easier testing
pub enum LazyGradError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Axis {axis} is out of range for tensor of rank {rank}")]
    AxisOutOfRange { axis: usize, rank: usize },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Expected a scalar tensor, got shape {shape:?}")]
    NotScalar { shape: Vec<usize> },

    #[error("No cached forward value during {operation}: call value(true) before requesting gradients")]
    MissingForwardValue { operation: String },

    #[error("Gradient target must be a leaf node (operation {operation})")]
    NonLeafGradTarget { operation: String },

    #[error("Cannot mutate the value of an operator node")]
    NotALeaf,

    #[error("Shape mismatch during gradient accumulation: expected {expected:?}, got {actual:?}")]
    GradientAccumulationShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Internal error: {0}")]
    InternalError(String),
}
