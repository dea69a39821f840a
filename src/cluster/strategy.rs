use std::collections::BTreeMap;

use super::distance::Metric;
use super::error::Result;
use super::grid::GridBoundaries;
use super::hierarchical::Hierarchical;
use super::input::PointSet;
use super::point::{Cluster, Property};
use super::qt::GreedyQt;

/// Cluster map keyed by cluster index
pub type ClusterMap<A, B> = BTreeMap<usize, Cluster<A, B>>;

/// A way of turning a point set into clusters on a spatial hash grid
///
/// Implementations build their own grid from `boundaries`, never return
/// clusters with fewer than two members, and never place one point in two
/// clusters.
pub trait ClusteringStrategy {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    fn extract<M, A, B>(
        &self,
        metric: &M,
        points: &PointSet<'_, A, B>,
        boundaries: &GridBoundaries,
    ) -> Result<ClusterMap<A, B>>
    where
        M: Metric,
        A: Property,
        B: Property;
}

/// Strategy selected at runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    GreedyQt(GreedyQt),
    Hierarchical(Hierarchical),
}

impl ClusteringStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::GreedyQt(s) => s.name(),
            Strategy::Hierarchical(s) => s.name(),
        }
    }

    fn extract<M, A, B>(
        &self,
        metric: &M,
        points: &PointSet<'_, A, B>,
        boundaries: &GridBoundaries,
    ) -> Result<ClusterMap<A, B>>
    where
        M: Metric,
        A: Property,
        B: Property,
    {
        match self {
            Strategy::GreedyQt(s) => s.extract(metric, points, boundaries),
            Strategy::Hierarchical(s) => s.extract(metric, points, boundaries),
        }
    }
}

impl From<GreedyQt> for Strategy {
    fn from(s: GreedyQt) -> Self {
        Strategy::GreedyQt(s)
    }
}

impl From<Hierarchical> for Strategy {
    fn from(s: Hierarchical) -> Self {
        Strategy::Hierarchical(s)
    }
}
