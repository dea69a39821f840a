use super::error::{ClusteringError, Result};
use super::point::Point;

/// Dissimilarity between two positions in the clustering plane
///
/// Implementations must be stateless with respect to clustering runs:
/// any configuration (scaling factors, lookup tables) is fixed at
/// construction. `Sync` is required because candidate evaluation may
/// run on several threads.
pub trait Metric: Sync {
    /// Returns a non-negative distance between `p1` and `p2`
    fn distance(&self, p1: &Point, p2: &Point) -> f64;
}

impl<F> Metric for F
where
    F: Fn(&Point, &Point) -> f64 + Sync,
{
    fn distance(&self, p1: &Point, p2: &Point) -> f64 {
        self(p1, p2)
    }
}

/// Plain Euclidean distance
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Metric for Euclidean {
    fn distance(&self, p1: &Point, p2: &Point) -> f64 {
        let dx = p1.0[0] - p2.0[0];
        let dy = p1.0[1] - p2.0[1];
        (dx * dx + dy * dy).sqrt()
    }
}

/// Euclidean distance with the y axis rescaled
///
/// Used when x and y carry different units, e.g. m/z against retention
/// time: a typical y extent multiplied by `y_scaling` should be
/// comparable to a typical x extent.
#[derive(Debug, Clone, Copy)]
pub struct ScaledEuclidean {
    y_scaling: f64,
}

impl ScaledEuclidean {
    pub fn new(y_scaling: f64) -> Result<Self> {
        if !y_scaling.is_finite() || y_scaling <= 0.0 {
            return Err(ClusteringError::InvalidParameter {
                name: "y_scaling",
                value: y_scaling,
            });
        }
        Ok(ScaledEuclidean { y_scaling })
    }

    /// Scaling so that `x_tolerance` and `y_typical` weigh the same
    pub fn from_tolerances(x_tolerance: f64, y_typical: f64) -> Result<Self> {
        if !y_typical.is_finite() || y_typical <= 0.0 {
            return Err(ClusteringError::InvalidParameter {
                name: "y_typical",
                value: y_typical,
            });
        }
        Self::new(x_tolerance / y_typical)
    }

    pub fn y_scaling(&self) -> f64 {
        self.y_scaling
    }
}

impl Metric for ScaledEuclidean {
    fn distance(&self, p1: &Point, p2: &Point) -> f64 {
        let dx = p1.0[0] - p2.0[0];
        let dy = (p1.0[1] - p2.0[1]) * self.y_scaling;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Evaluates `metric` and rejects NaN or negative results
///
/// `a` and `b` identify the compared items in the error.
pub fn checked_distance<M: Metric + ?Sized>(
    metric: &M,
    p1: &Point,
    p2: &Point,
    a: usize,
    b: usize,
) -> Result<f64> {
    let value = metric.distance(p1, p2);
    if value.is_nan() || value < 0.0 {
        return Err(ClusteringError::InvalidMetricValue { a, b, value });
    }
    Ok(value)
}
