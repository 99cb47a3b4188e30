use crate::error::LazyGradError;
use crate::graph::Node;

/// Perturbation step used by the finite-difference estimate unless the
/// caller picks its own.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Checks the analytic gradient of `output` with respect to `parameter`
/// against a symmetric finite-difference estimate.
///
/// For every element of the parameter (in row-major order) the element is
/// perturbed by `±epsilon`, the whole graph is re-evaluated with
/// `value(true)`, and the partial derivative of the elementwise-summed
/// output is estimated as `(f(x+ε) − f(x−ε)) / 2ε`. The returned value is
/// the maximum absolute elementwise difference between that estimate and
/// `output.grad(parameter)`. A mismatch is a number for the caller to
/// judge against a tolerance, never an error.
///
/// The perturbation is fully transient: the parameter and every forward
/// cache are restored before returning, so repeated calls are independent.
pub fn check_grad(
    parameter: &Node,
    output: &Node,
    epsilon: f64,
) -> Result<f64, LazyGradError> {
    if !parameter.is_leaf() {
        return Err(LazyGradError::NonLeafGradTarget {
            operation: "check_grad".to_string(),
        });
    }

    let original = parameter.leaf_value()?;

    // Analytic gradient at the unperturbed point.
    output.value(true)?;
    let analytic = output.grad(parameter)?;
    if analytic.shape() != original.shape() {
        return Err(LazyGradError::ShapeMismatch {
            expected: original.shape().to_vec(),
            actual: analytic.shape().to_vec(),
            operation: "check_grad".to_string(),
        });
    }

    let mut numeric = Vec::with_capacity(original.numel());
    for i in 0..original.numel() {
        let center = original.data()[i];

        parameter.set_value(original.with_element(i, center + epsilon)?)?;
        let loss_plus = output.value(true)?.sum_all();

        parameter.set_value(original.with_element(i, center - epsilon)?)?;
        let loss_minus = output.value(true)?.sum_all();

        numeric.push((loss_plus - loss_minus) / (2.0 * epsilon));
    }

    // Restore the parameter and every downstream cache.
    parameter.set_value(original)?;
    output.value(true)?;

    let discrepancy = analytic
        .data()
        .iter()
        .zip(&numeric)
        .map(|(a, n)| (a - n).abs())
        .fold(0.0, f64::max);

    log::debug!(
        "check_grad: {} elements, epsilon {:e}, max abs discrepancy {:e}",
        numeric.len(),
        epsilon,
        discrepancy
    );
    Ok(discrepancy)
}
