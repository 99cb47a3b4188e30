use crate::graph::{check_grad, Node, DEFAULT_EPSILON};
use crate::ops::arithmetic::add;
use crate::ops::reduction::{sum, sum_all};
use crate::tensor::{self, Tensor};
use crate::utils::testing::check_tensor_near;
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_matrix(seed: u64, shape: &[usize]) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    tensor::randn(shape, &mut rng)
}

#[test]
fn test_diamond_contributions_are_summed() {
    // shared feeds both operands of the add; its adjoint must be the sum of
    // the two path contributions, not the last one written.
    let x = Node::parameter(seeded_matrix(13, &[2, 3]));
    let shared = sum(&x, Some(0));
    let z = sum_all(&add(&shared, &shared));

    let expected = 2.0 * x.leaf_value().unwrap().sum_all();
    assert_relative_eq!(
        z.value(true).unwrap().item().unwrap(),
        expected,
        epsilon = 1e-9
    );

    let g = z.grad(&x).unwrap();
    check_tensor_near(&g, &[2, 3], &[2.0; 6], 1e-12);
    assert!(check_grad(&x, &z, DEFAULT_EPSILON).unwrap() < 1e-6);
}

#[test]
fn test_diamond_with_broadcast_join() {
    // z = sum(x + broadcast(colsum(x))): the direct path contributes 1 per
    // element, the reduced path 2 (each column sum is stretched over both
    // rows), so dz/dx is all threes.
    let x = Node::parameter(seeded_matrix(14, &[2, 3]));
    let colsum = sum(&x, Some(0));
    let z = sum_all(&add(&x, &colsum));

    let expected = 3.0 * x.leaf_value().unwrap().sum_all();
    assert_relative_eq!(z.value(true).unwrap().item().unwrap(), expected, epsilon = 1e-9);

    let g = z.grad(&x).unwrap();
    check_tensor_near(&g, &[2, 3], &[3.0; 6], 1e-12);
    assert!(check_grad(&x, &z, DEFAULT_EPSILON).unwrap() < 1e-6);
}

#[test]
fn test_gradient_of_intermediate_node() {
    // grad can be requested from any node, not just the terminal one.
    let x = Node::parameter(seeded_matrix(15, &[4, 5]));
    let y = sum(&x, Some(1));
    let z = sum_all(&y);

    z.value(true).unwrap();
    let gy = y.grad(&x).unwrap();
    check_tensor_near(&gy, &[4, 5], &[1.0; 20], 1e-12);
    let gz = z.grad(&x).unwrap();
    check_tensor_near(&gz, &[4, 5], &[1.0; 20], 1e-12);
}

#[test]
fn test_reduction_order_does_not_change_total_derivative() {
    // Composed-gradient law: axis-reduce then full-reduce matches the
    // direct full reduction, in value and in gradient.
    let x_value = seeded_matrix(16, &[6, 3]);
    let x = Node::parameter(x_value.clone());

    let via_axis0 = sum_all(&sum(&x, Some(0)));
    let via_axis1 = sum_all(&sum(&x, Some(1)));
    let direct = sum_all(&x);

    let total = x_value.sum_all();
    assert_relative_eq!(via_axis0.value(true).unwrap().item().unwrap(), total, epsilon = 1e-9);
    assert_relative_eq!(via_axis1.value(true).unwrap().item().unwrap(), total, epsilon = 1e-9);
    assert_relative_eq!(direct.value(true).unwrap().item().unwrap(), total, epsilon = 1e-9);

    for output in [&via_axis0, &via_axis1, &direct] {
        let g = output.grad(&x).unwrap();
        check_tensor_near(&g, &[6, 3], &[1.0; 18], 1e-12);
    }
}

#[test]
fn test_two_parameter_graph() {
    let x = Node::parameter(seeded_matrix(17, &[3, 2]));
    let b = Node::parameter(seeded_matrix(18, &[2]));
    let z = sum_all(&add(&x, &b));

    z.value(true).unwrap();

    // dz/dx is all ones; dz/db sums over the broadcast rows.
    check_tensor_near(&z.grad(&x).unwrap(), &[3, 2], &[1.0; 6], 1e-12);
    check_tensor_near(&z.grad(&b).unwrap(), &[2], &[3.0; 2], 1e-12);

    assert!(check_grad(&x, &z, DEFAULT_EPSILON).unwrap() < 1e-6);
    assert!(check_grad(&b, &z, DEFAULT_EPSILON).unwrap() < 1e-6);
}

#[test]
fn test_constant_leaf_still_gets_a_gradient_when_asked() {
    // Constants are ordinary leaves; naming is intent, not semantics.
    let x = Node::parameter(seeded_matrix(19, &[2, 2]));
    let c = Node::constant(tensor::full(&[2, 2], 10.0));
    let z = sum_all(&add(&x, &c));

    z.value(true).unwrap();
    check_tensor_near(&z.grad(&c).unwrap(), &[2, 2], &[1.0; 4], 1e-12);
    check_tensor_near(&z.grad(&x).unwrap(), &[2, 2], &[1.0; 4], 1e-12);
}
