//! Grid-accelerated clustering of 2D points into consensus groups
pub mod distance;
pub mod engine;
pub mod error;
pub mod grid;
pub mod hierarchical;
pub mod input;
pub mod point;
pub mod qt;
pub mod spacing;
pub mod strategy;

#[cfg(test)]
mod grid_test;
#[cfg(test)]
mod point_test;
#[cfg(test)]
mod properties_test;

pub use distance::{Euclidean, Metric, ScaledEuclidean, checked_distance};
pub use engine::{ClusteringEngine, EngineState, PipelineParams};
pub use error::{ClusteringError, Result};
pub use grid::{CellIndex, GridBoundaries, SpatialHashGrid};
pub use hierarchical::Hierarchical;
pub use input::PointSet;
pub use point::{Cluster, Point, PointList, Property, Rectangle, centroid_and_bounds};
pub use qt::GreedyQt;
pub use strategy::{ClusterMap, ClusteringStrategy, Strategy};
