//! The array representation shared by quantities, laws, and states.

use ndarray::{ArrayD, IxDyn};
use smallvec::SmallVec;

/// Numeric value of a quantity: an n-dimensional array of `f64` samples.
///
/// Inside a state every value has shape `domain.shape ++ tensor_shape`.
/// Declarations store initial values with the bare tensor shape.
pub type Value = ArrayD<f64>;

/// An array shape.
///
/// Uses `SmallVec<[usize; 4]>` to keep shapes inline for domains up to
/// three axes carrying a vector-valued quantity.
pub type Shape = SmallVec<[usize; 4]>;

/// Concatenate a domain shape and a tensor shape.
pub fn full_shape(domain_shape: &[usize], tensor_shape: &[usize]) -> Shape {
    domain_shape.iter().chain(tensor_shape).copied().collect()
}

/// Broadcast `value` to `shape` using trailing-axis alignment, returning
/// an owned array.
///
/// Returns `None` when the shapes are not broadcast-compatible.
pub fn broadcast_to(value: &Value, shape: &[usize]) -> Option<Value> {
    if value.shape() == shape {
        return Some(value.clone());
    }
    value.broadcast(IxDyn(shape)).map(|view| view.to_owned())
}

/// Maximum absolute sample of `value`.
///
/// A NaN anywhere poisons the result so callers comparing against a
/// tolerance never treat NaN as converged. An empty array yields `0.0`.
pub fn max_abs(value: &Value) -> f64 {
    value.iter().fold(0.0_f64, |acc, &x| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else {
            acc.max(x.abs())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr0;
    use proptest::prelude::*;

    #[test]
    fn full_shape_concatenates() {
        assert_eq!(full_shape(&[10], &[]).as_slice(), &[10]);
        assert_eq!(full_shape(&[4, 5], &[3]).as_slice(), &[4, 5, 3]);
        assert!(full_shape(&[], &[]).is_empty());
    }

    #[test]
    fn broadcast_scalar_to_domain() {
        let v = arr0(2.5).into_dyn();
        let out = broadcast_to(&v, &[4]).unwrap();
        assert_eq!(out.shape(), &[4]);
        assert!(out.iter().all(|&x| x == 2.5));
    }

    #[test]
    fn broadcast_tensor_to_field() {
        let v = ndarray::arr1(&[1.0, 2.0, 3.0]).into_dyn();
        let out = broadcast_to(&v, &[2, 3]).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out[[1, 2]], 3.0);
    }

    #[test]
    fn broadcast_incompatible_is_none() {
        let v = ndarray::arr1(&[1.0, 2.0, 3.0]).into_dyn();
        assert!(broadcast_to(&v, &[4]).is_none());
    }

    #[test]
    fn max_abs_of_empty_is_zero() {
        let v = Value::zeros(IxDyn(&[0]));
        assert_eq!(max_abs(&v), 0.0);
    }

    #[test]
    fn max_abs_nan_poisons() {
        let v = ndarray::arr1(&[1.0, f64::NAN, -3.0]).into_dyn();
        assert!(max_abs(&v).is_nan());
    }

    proptest! {
        #[test]
        fn max_abs_bounds_every_sample(xs in prop::collection::vec(-1e6f64..1e6, 1..32)) {
            let v = ndarray::Array1::from(xs.clone()).into_dyn();
            let m = max_abs(&v);
            for x in xs {
                prop_assert!(m >= x.abs());
            }
        }
    }
}
