//! Property-based tests using proptest.
//!
//! These tests verify invariants of handles, views and the dense kernel.

use proptest::prelude::*;
use stratamx::prelude::*;

// Strategy for generating small matrices of a fixed shape
fn matrix_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Matrix> {
    proptest::collection::vec(-100.0 as Scalar..100.0, rows * cols).prop_map(move |data| {
        Matrix::from_vec(rows, cols, data).expect("Test data should be valid")
    })
}

// Strategy for generating a shape and a matrix of that shape
fn any_matrix() -> impl Strategy<Value = Matrix> {
    (1..6usize, 1..6usize).prop_flat_map(|(r, c)| matrix_strategy(r, c))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn transpose_view_twice_is_identity(m in any_matrix()) {
        let tt = m
            .transpose(TransposeMode::View)
            .and_then(|t| t.transpose(TransposeMode::View))
            .expect("views");
        prop_assert_eq!(tt.layout(), m.layout());
        prop_assert!(tt == m);
    }

    #[test]
    fn transpose_view_matches_copy(m in any_matrix()) {
        let v = m.transpose(TransposeMode::View).expect("view");
        let c = m.transpose(TransposeMode::Copy).expect("copy");
        prop_assert!(v == c);
        prop_assert!(v.shares_buffer(&m));
        prop_assert!(!c.shares_buffer(&m));
    }

    #[test]
    fn views_increment_and_release_decrements(m in any_matrix(), n in 1..8usize) {
        let views: Vec<Matrix> = (0..n).map(|_| m.view()).collect();
        prop_assert_eq!(m.ref_count(), Some(n + 1));
        for v in views {
            prop_assert!(!v.release());
        }
        prop_assert_eq!(m.ref_count(), Some(1));
    }

    #[test]
    fn add_is_commutative(a in matrix_strategy(3, 4), b in matrix_strategy(3, 4)) {
        let ab = a.add(&b).expect("same shape");
        let ba = b.add(&a).expect("same shape");
        prop_assert!(ab == ba);
    }

    #[test]
    fn add_then_sub_round_trips(a in matrix_strategy(3, 3), b in matrix_strategy(3, 3)) {
        let back = a.add(&b).and_then(|s| s.sub(&b)).expect("same shape");
        prop_assert!(back.approx_eq(&a, 1e-3));
    }

    #[test]
    fn dot_transpose_identity(a in matrix_strategy(3, 4), b in matrix_strategy(4, 2)) {
        // (A·B)ᵀ == Bᵀ·Aᵀ
        let lhs = a.dot(&b).expect("3x2").transpose(TransposeMode::View).expect("view");
        let bt = b.transpose(TransposeMode::View).expect("view");
        let at = a.transpose(TransposeMode::View).expect("view");
        let rhs = bt.dot(&at).expect("2x3");
        prop_assert!(lhs.approx_eq(&rhs, 1e-1));
    }

    #[test]
    fn dot_unchecked_is_bit_identical(a in matrix_strategy(4, 5), b in matrix_strategy(5, 3)) {
        let expected = a.dot(&b).expect("4x3");
        let mut out = Matrix::zeros(4, 3).expect("4x3");
        // SAFETY: 4x5 · 5x3 into a fresh 4x3.
        unsafe { Matrix::dot_unchecked(&mut out, &a, &b) };
        prop_assert_eq!(out.to_vec(), expected.to_vec());
    }

    #[test]
    fn scale_scales_sum(m in any_matrix(), k in -10.0 as Scalar..10.0) {
        let scaled = m.scale(k).expect("copy");
        let expected = m.sum() * k;
        prop_assert!((scaled.sum() - expected).abs() < 1e-1 * (1.0 + expected.abs()));
    }

    #[test]
    fn length_is_non_negative(m in any_matrix()) {
        prop_assert!(m.length() >= 0.0);
    }

    #[test]
    fn deep_copy_equals_source(m in any_matrix()) {
        let c = m.deep_copy().expect("copy");
        prop_assert!(c == m);
        prop_assert!(!c.shares_buffer(&m));
    }

    #[test]
    fn slice_equals_slice_view(
        m in matrix_strategy(5, 5),
        r0 in 0..5usize, r1 in 0..5usize,
        c0 in 0..5usize, c1 in 0..5usize,
    ) {
        prop_assume!(r0 <= r1 && c0 <= c1);
        let s = m.slice(r0, r1, c0, c1).expect("in range");
        let v = m.slice_view(r0, r1, c0, c1).expect("in range");
        prop_assert!(s == v);
        prop_assert!(v.shares_buffer(&m));
    }

    #[test]
    fn cosine_is_bounded(a in matrix_strategy(1, 3), b in matrix_strategy(1, 3)) {
        prop_assume!(a.length() > 1e-3 && b.length() > 1e-3);
        let cos = a.cosine_between(&b).expect("same shape");
        prop_assert!(cos.abs() <= 1.0 + 1e-4);
    }

    #[test]
    fn perpendicular_is_orthogonal(v in matrix_strategy(1, 3)) {
        prop_assume!(v.length() > 1e-2);
        let p = v.perpendicular().expect("3-D");
        let cos_num: Scalar = v
            .to_vec()
            .iter()
            .zip(p.to_vec())
            .map(|(a, b)| a * b)
            .sum();
        prop_assert!(cos_num.abs() <= 1e-2 * (1.0 + v.length() * p.length()));
    }
}
