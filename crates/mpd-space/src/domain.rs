//! Rectilinear spatial domains built from ordered coordinate axes.

use crate::error::SpaceError;
use mpd_core::Shape;

/// A rectilinear grid defined by one ordered coordinate sequence per axis.
///
/// The domain shape is the list of axis lengths. Every quantity value in
/// a state starts with this shape, followed by the quantity's own tensor
/// shape.
///
/// # Examples
///
/// ```
/// use mpd_space::Domain;
///
/// let line = Domain::linspace(0.0, 0.5, 10).unwrap();
/// assert_eq!(line.ndim(), 1);
/// assert_eq!(line.shape().as_slice(), &[10]);
/// assert_eq!(line.axis(0).unwrap()[9], 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    axes: Vec<Vec<f64>>,
}

impl Domain {
    /// Create a domain from explicit coordinate axes.
    ///
    /// Every axis must be non-empty, finite, and strictly increasing.
    pub fn new(axes: Vec<Vec<f64>>) -> Result<Self, SpaceError> {
        if axes.is_empty() {
            return Err(SpaceError::EmptyDomain);
        }
        for (axis, coords) in axes.iter().enumerate() {
            if coords.is_empty() {
                return Err(SpaceError::EmptyAxis { axis });
            }
            for (index, c) in coords.iter().enumerate() {
                if !c.is_finite() {
                    return Err(SpaceError::NonFiniteCoordinate { axis, index });
                }
                if index > 0 && *c <= coords[index - 1] {
                    return Err(SpaceError::NonMonotonicAxis { axis, index });
                }
            }
        }
        Ok(Self { axes })
    }

    /// A one-dimensional domain over the given coordinates.
    pub fn line(coordinates: Vec<f64>) -> Result<Self, SpaceError> {
        Self::new(vec![coordinates])
    }

    /// A one-dimensional domain of `n` evenly spaced points over `[start, end]`.
    ///
    /// The final coordinate is exactly `end`.
    pub fn linspace(start: f64, end: f64, n: usize) -> Result<Self, SpaceError> {
        Self::line(linspace(start, end, n))
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Axis lengths.
    pub fn shape(&self) -> Shape {
        self.axes.iter().map(Vec::len).collect()
    }

    /// Total number of grid points.
    pub fn point_count(&self) -> usize {
        self.axes.iter().map(Vec::len).product()
    }

    /// Coordinates of axis `k`.
    pub fn axis(&self, k: usize) -> Option<&[f64]> {
        self.axes.get(k).map(Vec::as_slice)
    }

    /// All coordinate axes in order.
    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }
}

/// `n` evenly spaced samples over `[start, end]`, endpoint included.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut coords: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            coords[n - 1] = end;
            coords
        }
    }
}
