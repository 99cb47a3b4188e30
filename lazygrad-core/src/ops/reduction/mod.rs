// Reduction operators.

pub mod sum;

pub use sum::{sum, sum_all};
