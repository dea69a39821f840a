//! Error types for grid clustering

use thiserror::Error;

/// Result type alias for clustering operations
pub type Result<T> = std::result::Result<T, ClusteringError>;

/// Failures reported to the caller before (or instead of) clustering work
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusteringError {
    /// Fewer points than needed to form a single cluster
    #[error("insufficient input: need at least {required} points, got {provided}")]
    InsufficientInput { required: usize, provided: usize },

    /// Parallel input arrays disagree in length
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Grid lines on one axis are unusable
    #[error("invalid grid boundaries on {axis} axis: {reason}")]
    InvalidBoundaries { axis: char, reason: String },

    /// A data point lies outside the area covered by the grid
    #[error("point {index} at ({x}, {y}) is outside the clustering grid")]
    PointOutsideGrid { index: usize, x: f64, y: f64 },

    /// The distance metric returned NaN or a negative value
    #[error("metric returned {value} for points {a} and {b}")]
    InvalidMetricValue { a: usize, b: usize, value: f64 },

    /// A configuration value is out of range
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Operation called in the wrong engine state
    #[error("cannot {operation} while engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}
