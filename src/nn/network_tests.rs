pub(crate) use super::*;
use crate::nn::functional::sigmoid_scalar;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn xor_data() -> (Matrix, Matrix) {
    let ti = Matrix::from_slice(4, 2, &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]).expect("4x2");
    let to = Matrix::from_slice(4, 1, &[0.0, 1.0, 1.0, 0.0]).expect("4x1");
    (ti, to)
}

#[test]
fn test_new_shapes() {
    let nn = Network::new(&[2, 3, 1]).expect("valid");
    assert_eq!(nn.layer_count(), 2);
    assert_eq!(nn.architecture(), &[2, 3, 1]);
    assert_eq!(nn.weights()[0].shape(), (2, 3));
    assert_eq!(nn.weights()[1].shape(), (3, 1));
    assert_eq!(nn.biases()[0].shape(), (1, 3));
    assert_eq!(nn.biases()[1].shape(), (1, 1));
    assert_eq!(nn.input().shape(), (1, 2));
    assert_eq!(nn.output().shape(), (1, 1));
}

#[test]
fn test_new_rejects_bad_architecture() {
    assert!(matches!(
        Network::new(&[3]),
        Err(MatrixError::InvalidShape { .. })
    ));
    assert!(Network::new(&[]).is_err());
    assert!(Network::new(&[2, 0, 1]).is_err());
}

#[test]
fn test_forward_single_neuron() {
    let mut nn = Network::new(&[1, 1]).expect("valid");
    nn.weights_mut()[0].set(0, 0, 2.0).expect("dense");
    nn.biases_mut()[0].set(0, 0, -1.0).expect("dense");
    let x = Matrix::from_slice(1, 1, &[3.0]).expect("1x1");
    nn.forward(&x).expect("width 1");
    let expected = sigmoid_scalar(2.0 * 3.0 - 1.0);
    assert!((nn.output().get(0, 0) - expected).abs() < 1e-6);
}

#[test]
fn test_forward_keeps_view_of_input() {
    let mut nn = Network::new(&[2, 1]).expect("valid");
    let x = Matrix::from_slice(1, 2, &[1.0, 0.0]).expect("1x2");
    nn.forward(&x).expect("width 2");
    assert!(nn.input().shares_buffer(&x));
    assert_eq!(x.ref_count(), Some(2));
}

#[test]
fn test_forward_wrong_width() {
    let mut nn = Network::new(&[2, 1]).expect("valid");
    let x = Matrix::zeros(1, 3).expect("1x3");
    assert!(matches!(
        nn.forward(&x),
        Err(MatrixError::DimensionMismatch { .. })
    ));
    let column = Matrix::zeros(2, 1).expect("2x1");
    assert!(nn.forward(&column).is_err());
}

#[test]
fn test_cost_of_zero_network() {
    let mut nn = Network::new(&[2, 2, 1]).expect("valid");
    let (ti, to) = xor_data();
    // Output is always 0.5, so the squared error is 0.25 on every sample.
    let cost = nn.cost(&ti, &to).expect("shapes agree");
    assert!((cost - 0.25).abs() < 1e-6);
}

#[test]
fn test_cost_shape_checks() {
    let mut nn = Network::new(&[2, 1]).expect("valid");
    let (ti, _) = xor_data();
    let short = Matrix::zeros(3, 1).expect("3x1");
    assert!(matches!(
        nn.cost(&ti, &short),
        Err(MatrixError::DimensionMismatch { .. })
    ));
    let wide = Matrix::zeros(4, 2).expect("4x2");
    assert!(nn.cost(&ti, &wide).is_err());
    let narrow_in = Matrix::zeros(4, 1).expect("4x1");
    let to = Matrix::zeros(4, 1).expect("4x1");
    assert!(nn.cost(&narrow_in, &to).is_err());
}

#[test]
fn test_finite_difference_matches_manual() {
    let mut nn = Network::new(&[1, 1]).expect("valid");
    nn.weights_mut()[0].set(0, 0, 0.5).expect("dense");
    nn.biases_mut()[0].set(0, 0, 0.25).expect("dense");
    let ti = Matrix::from_slice(1, 1, &[1.0]).expect("1x1");
    let to = Matrix::from_slice(1, 1, &[0.0]).expect("1x1");
    let eps = 1e-2;

    let mut grad = nn.zeros_like().expect("same architecture");
    let base = nn
        .finite_difference(&mut grad, eps, &ti, &to)
        .expect("shapes agree");
    assert!((base - sigmoid_scalar(0.75).powi(2)).abs() < 1e-6);

    let cost = |w: Scalar, b: Scalar| sigmoid_scalar(w + b).powi(2);
    let dw = (cost(0.5 + eps, 0.25) - cost(0.5, 0.25)) / eps;
    let db = (cost(0.5, 0.25 + eps) - cost(0.5, 0.25)) / eps;
    assert!((grad.weights()[0].get(0, 0) - dw).abs() < 1e-3);
    assert!((grad.biases()[0].get(0, 0) - db).abs() < 1e-3);

    // Parameters restored after probing.
    assert!((nn.weights()[0].get(0, 0) - 0.5).abs() < 1e-6);
    assert!((nn.biases()[0].get(0, 0) - 0.25).abs() < 1e-6);
}

#[test]
fn test_finite_difference_architecture_mismatch() {
    let mut nn = Network::new(&[2, 1]).expect("valid");
    let mut grad = Network::new(&[2, 2, 1]).expect("valid");
    let (ti, to) = xor_data();
    assert!(matches!(
        nn.finite_difference(&mut grad, 0.1, &ti, &to),
        Err(MatrixError::InvalidMatrix(_))
    ));
}

#[test]
fn test_learn_applies_step() {
    let mut nn = Network::new(&[1, 1]).expect("valid");
    let mut grad = nn.zeros_like().expect("same architecture");
    grad.weights_mut()[0].set(0, 0, 2.0).expect("dense");
    grad.biases_mut()[0].set(0, 0, -1.0).expect("dense");
    nn.learn(&grad, 0.5).expect("same architecture");
    assert!((nn.weights()[0].get(0, 0) + 1.0).abs() < 1e-6);
    assert!((nn.biases()[0].get(0, 0) - 0.5).abs() < 1e-6);
    // The gradient itself is untouched.
    assert!((grad.weights()[0].get(0, 0) - 2.0).abs() < 1e-6);
}

#[test]
fn test_descent_reduces_cost() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut nn = Network::new(&[2, 2, 1]).expect("valid");
    nn.randomize(&mut rng, 0.0, 1.0).expect("valid range");
    let mut grad = nn.zeros_like().expect("same architecture");
    let (ti, to) = xor_data();

    let before = nn.cost(&ti, &to).expect("shapes agree");
    for _ in 0..50 {
        nn.finite_difference(&mut grad, 1e-1, &ti, &to).expect("shapes agree");
        nn.learn(&grad, 1.0).expect("same architecture");
    }
    let after = nn.cost(&ti, &to).expect("shapes agree");
    assert!(after < before, "cost went from {before} to {after}");
}

#[test]
fn test_randomize_range() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut nn = Network::new(&[3, 4, 2]).expect("valid");
    nn.randomize(&mut rng, -0.5, 0.5).expect("valid range");
    for m in nn.weights().iter().chain(nn.biases()) {
        assert!(m.to_vec().iter().all(|&x| (-0.5..=0.5).contains(&x)));
    }
    assert!(nn.randomize(&mut rng, 1.0, -1.0).is_err());
}

#[test]
fn test_render_lists_parameters() {
    let nn = Network::new(&[2, 1]).expect("valid");
    let text = nn.render("nn");
    assert!(text.starts_with("nn = [\n"));
    assert!(text.contains("    ws0=([\n"));
    assert!(text.contains("    bs0=([\n"));
    assert!(text.ends_with("]\n"));
}

#[test]
fn test_serde_round_trip() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut nn = Network::new(&[2, 3, 1]).expect("valid");
    nn.randomize(&mut rng, 0.0, 1.0).expect("valid range");
    let json = serde_json::to_string(&nn).expect("serialize");
    let back: Network = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.architecture(), nn.architecture());
    for (a, b) in back.weights().iter().zip(nn.weights()) {
        assert_eq!(a, b);
    }
    for (a, b) in back.biases().iter().zip(nn.biases()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_deserialize_rejects_wrong_layer_shape() {
    let json = r#"{
        "architecture": [2, 1],
        "weights": [{"rows": 1, "cols": 2, "data": [0.0, 0.0]}],
        "biases": [{"rows": 1, "cols": 1, "data": [0.0]}]
    }"#;
    let result: std::result::Result<Network, _> = serde_json::from_str(json);
    assert!(result.is_err());
}
