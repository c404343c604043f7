//! Finite-difference operators over a [`Domain`].
//!
//! All operators work lane by lane along a spatial axis, so quantities
//! with a tensor shape are differentiated component-wise. Output arrays
//! never shrink: boundary points reuse a one-sided slope.
//!
//! ```text
//! derivative_on_space:  d[i] = (f[i+1] - f[i]) / (x[i+1] - x[i]),  d[n-1] = d[n-2]
//! gradient (interior):  g[i] = (f[i+1] - f[i-1]) / (x[i+1] - x[i-1])
//! gradient (boundary):  one-sided forward/backward difference
//! ```
//!
//! A single-sample axis has no slope; every operator reports `0.0` there.

use crate::domain::Domain;
use crate::error::SpaceError;
use mpd_core::Value;
use ndarray::{ArrayView1, ArrayViewMut1, Axis, IxDyn};

/// One-dimensional forward-difference derivative along the leading axis.
///
/// `values.shape()[0]` must equal `coordinates.len()` and the coordinates
/// must be finite and strictly increasing. Trailing axes are
/// treated as independent components. The output has the input's shape:
/// the last point repeats the final forward slope, and a single sample
/// yields the degenerate slope `0.0`.
///
/// # Examples
///
/// ```
/// use mpd_space::derivative_on_space;
///
/// let f = ndarray::arr1(&[0.0, 2.0, 4.0, 6.0]).into_dyn();
/// let d = derivative_on_space(&f, &[0.0, 1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(d.as_slice().unwrap(), &[2.0, 2.0, 2.0, 2.0]);
/// ```
pub fn derivative_on_space(values: &Value, coordinates: &[f64]) -> Result<Value, SpaceError> {
    let samples = values.shape().first().copied().unwrap_or(0);
    if values.ndim() == 0 || samples != coordinates.len() {
        return Err(SpaceError::LengthMismatch {
            values: if values.ndim() == 0 { 1 } else { samples },
            coordinates: coordinates.len(),
        });
    }
    for (index, c) in coordinates.iter().enumerate() {
        if !c.is_finite() {
            return Err(SpaceError::NonFiniteCoordinate { axis: 0, index });
        }
        if index > 0 && *c <= coordinates[index - 1] {
            return Err(SpaceError::NonMonotonicAxis { axis: 0, index });
        }
    }
    Ok(difference_along(values, coordinates, 0, forward_difference_lane))
}

/// Central-difference gradient of a field over the domain grid.
///
/// The field's shape must start with the domain shape. For a 1-D domain
/// the result has the field's shape; for an n-D domain a trailing axis
/// of length n holds the partial derivative along each domain axis.
pub fn gradient(field: &Value, domain: &Domain) -> Result<Value, SpaceError> {
    check_spatial_prefix(field, domain)?;
    let ndim = domain.ndim();
    if ndim == 1 {
        return Ok(difference_along(field, &domain.axes()[0], 0, central_difference_lane));
    }

    let mut shape = field.shape().to_vec();
    shape.push(ndim);
    let mut out = Value::zeros(IxDyn(&shape));
    let component_axis = Axis(shape.len() - 1);
    for (k, coords) in domain.axes().iter().enumerate() {
        let partial = difference_along(field, coords, k, central_difference_lane);
        out.index_axis_mut(component_axis, k).assign(&partial);
    }
    Ok(out)
}

/// Central-difference divergence of a vector field over the domain grid.
///
/// For a 1-D domain the field is read as a one-component vector field
/// and the result is its derivative along the axis (same shape). For an
/// n-D domain the field's trailing axis must have length n and the
/// result drops that axis.
pub fn divergence(field: &Value, domain: &Domain) -> Result<Value, SpaceError> {
    check_spatial_prefix(field, domain)?;
    let ndim = domain.ndim();
    if ndim == 1 {
        return Ok(difference_along(field, &domain.axes()[0], 0, central_difference_lane));
    }

    let last = field.ndim() - 1;
    if field.ndim() <= ndim || field.shape()[last] != ndim {
        return Err(SpaceError::ShapeMismatch {
            expected: format!(
                "domain shape {:?} followed by a trailing axis of length {ndim}",
                domain.shape().as_slice()
            ),
            actual: field.shape().to_vec(),
        });
    }

    let mut out = Value::zeros(IxDyn(&field.shape()[..last]));
    for (k, coords) in domain.axes().iter().enumerate() {
        let component = field.index_axis(Axis(last), k).to_owned();
        out += &difference_along(&component, coords, k, central_difference_lane);
    }
    Ok(out)
}

fn check_spatial_prefix(field: &Value, domain: &Domain) -> Result<(), SpaceError> {
    let shape = domain.shape();
    if field.ndim() < shape.len() || field.shape()[..shape.len()] != shape[..] {
        return Err(SpaceError::ShapeMismatch {
            expected: format!("leading shape {:?}", shape.as_slice()),
            actual: field.shape().to_vec(),
        });
    }
    Ok(())
}

/// Apply a per-lane difference scheme along `axis`, returning a new array
/// of the same shape.
fn difference_along(
    values: &Value,
    coordinates: &[f64],
    axis: usize,
    lane_fn: fn(ArrayView1<'_, f64>, &[f64], ArrayViewMut1<'_, f64>),
) -> Value {
    let mut out = Value::zeros(values.raw_dim());
    let ax = Axis(axis);
    for (dst, src) in out.lanes_mut(ax).into_iter().zip(values.lanes(ax)) {
        lane_fn(src, coordinates, dst);
    }
    out
}

fn forward_difference_lane(src: ArrayView1<'_, f64>, x: &[f64], mut dst: ArrayViewMut1<'_, f64>) {
    let n = src.len();
    if n < 2 {
        dst.fill(0.0);
        return;
    }
    for i in 0..n - 1 {
        dst[i] = (src[i + 1] - src[i]) / (x[i + 1] - x[i]);
    }
    dst[n - 1] = dst[n - 2];
}

fn central_difference_lane(src: ArrayView1<'_, f64>, x: &[f64], mut dst: ArrayViewMut1<'_, f64>) {
    let n = src.len();
    if n < 2 {
        dst.fill(0.0);
        return;
    }
    dst[0] = (src[1] - src[0]) / (x[1] - x[0]);
    dst[n - 1] = (src[n - 1] - src[n - 2]) / (x[n - 1] - x[n - 2]);
    for i in 1..n - 1 {
        dst[i] = (src[i + 1] - src[i - 1]) / (x[i + 1] - x[i - 1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array2};
    use proptest::prelude::*;

    fn line(n: usize) -> Domain {
        Domain::linspace(0.0, (n.max(2) - 1) as f64, n).unwrap()
    }

    #[test]
    fn derivative_single_sample_is_degenerate() {
        let f = arr1(&[3.0]).into_dyn();
        let d = derivative_on_space(&f, &[0.25]).unwrap();
        assert_eq!(d.shape(), &[1]);
        assert_eq!(d[[0]], 0.0);
    }

    #[test]
    fn derivative_repeats_last_slope() {
        let f = arr1(&[0.0, 1.0, 4.0, 9.0, 16.0]).into_dyn();
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let d = derivative_on_space(&f, &x).unwrap();
        assert_eq!(d.len(), 5);
        assert_eq!(d.as_slice().unwrap(), &[1.0, 3.0, 5.0, 7.0, 7.0]);
    }

    #[test]
    fn derivative_length_mismatch_rejected() {
        let f = arr1(&[0.0, 1.0]).into_dyn();
        let err = derivative_on_space(&f, &[0.0, 1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            SpaceError::LengthMismatch {
                values: 2,
                coordinates: 3
            }
        );
    }

    #[test]
    fn derivative_requires_increasing_coordinates() {
        let f = arr1(&[0.0, 1.0, 2.0, 3.0]).into_dyn();
        assert_eq!(
            derivative_on_space(&f, &[0.0, 1.0, 1.0, 2.0]).unwrap_err(),
            SpaceError::NonMonotonicAxis { axis: 0, index: 2 }
        );
        assert_eq!(
            derivative_on_space(&f, &[3.0, 2.0, 1.0, 0.0]).unwrap_err(),
            SpaceError::NonMonotonicAxis { axis: 0, index: 1 }
        );
        assert_eq!(
            derivative_on_space(&f, &[0.0, f64::NAN, 2.0, 3.0]).unwrap_err(),
            SpaceError::NonFiniteCoordinate { axis: 0, index: 1 }
        );
    }

    #[test]
    fn derivative_of_vector_field_is_componentwise() {
        // Two components: f0 = x, f1 = -2x.
        let f = Array2::from_shape_fn((4, 2), |(i, c)| if c == 0 { i as f64 } else { -2.0 * i as f64 })
            .into_dyn();
        let d = derivative_on_space(&f, &[0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(d.shape(), &[4, 2]);
        for i in 0..4 {
            assert_eq!(d[[i, 0]], 1.0);
            assert_eq!(d[[i, 1]], -2.0);
        }
    }

    #[test]
    fn gradient_1d_central_interior() {
        let d = line(5);
        let f = arr1(&[0.0, 1.0, 4.0, 9.0, 16.0]).into_dyn();
        let g = gradient(&f, &d).unwrap();
        assert_eq!(g.shape(), &[5]);
        // Interior central differences of x^2 are exact: 2x.
        assert_eq!(g[[1]], 2.0);
        assert_eq!(g[[2]], 4.0);
        assert_eq!(g[[3]], 6.0);
        // One-sided at the boundaries.
        assert_eq!(g[[0]], 1.0);
        assert_eq!(g[[4]], 7.0);
    }

    #[test]
    fn gradient_of_constant_is_zero() {
        let d = line(10);
        let f = Value::from_elem(IxDyn(&[10]), 6.86);
        assert!(gradient(&f, &d).unwrap().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn gradient_2d_appends_component_axis() {
        let d = Domain::new(vec![vec![0.0, 1.0, 2.0], vec![0.0, 0.5, 1.0, 1.5]]).unwrap();
        // f(x, y) = 3x + 4y
        let f = Array2::from_shape_fn((3, 4), |(i, j)| 3.0 * i as f64 + 4.0 * 0.5 * j as f64).into_dyn();
        let g = gradient(&f, &d).unwrap();
        assert_eq!(g.shape(), &[3, 4, 2]);
        for v in g.index_axis(Axis(2), 0).iter() {
            assert!((v - 3.0).abs() < 1e-12);
        }
        for v in g.index_axis(Axis(2), 1).iter() {
            assert!((v - 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn gradient_rejects_wrong_leading_shape() {
        let d = line(4);
        let f = arr1(&[1.0, 2.0, 3.0]).into_dyn();
        assert!(matches!(
            gradient(&f, &d),
            Err(SpaceError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn divergence_2d_of_position_field() {
        let d = Domain::new(vec![vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]]).unwrap();
        // v(x, y) = (x, y) has divergence 2 everywhere.
        let mut v = Value::zeros(IxDyn(&[3, 3, 2]));
        for i in 0..3 {
            for j in 0..3 {
                v[[i, j, 0]] = i as f64;
                v[[i, j, 1]] = j as f64;
            }
        }
        let div = divergence(&v, &d).unwrap();
        assert_eq!(div.shape(), &[3, 3]);
        assert!(div.iter().all(|&x| (x - 2.0).abs() < 1e-12));
    }

    #[test]
    fn divergence_2d_requires_component_axis() {
        let d = Domain::new(vec![vec![0.0, 1.0], vec![0.0, 1.0]]).unwrap();
        let v = Value::zeros(IxDyn(&[2, 2, 3]));
        assert!(matches!(
            divergence(&v, &d),
            Err(SpaceError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn divergence_1d_matches_gradient() {
        let d = line(6);
        let f = arr1(&[1.0, -2.0, 0.5, 3.0, 3.0, 8.0]).into_dyn();
        assert_eq!(divergence(&f, &d).unwrap(), gradient(&f, &d).unwrap());
    }

    proptest! {
        #[test]
        fn derivative_of_affine_is_slope(
            a in -100.0f64..100.0,
            b in -100.0f64..100.0,
            n in 2usize..40,
        ) {
            let domain = Domain::linspace(0.0, 0.5, n).unwrap();
            let x = domain.axis(0).unwrap();
            let f = ndarray::Array1::from_iter(x.iter().map(|xi| a * xi + b)).into_dyn();
            let d = derivative_on_space(&f, x).unwrap();
            prop_assert_eq!(d.len(), n);
            for v in d.iter() {
                prop_assert!((v - a).abs() <= 1e-6 * (1.0 + a.abs()));
            }
            prop_assert_eq!(d[[n - 1]], d[[n - 2]]);
        }
    }
}
