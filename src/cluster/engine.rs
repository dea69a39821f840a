use std::collections::BTreeMap;
use std::fmt;

use bitvec::prelude::*;
use tracing::{debug, info};

use super::distance::Metric;
use super::error::{ClusteringError, Result};
use super::grid::{GridBoundaries, SpatialHashGrid};
use super::input::PointSet;
use super::point::{Cluster, Property};
use super::strategy::{ClusterMap, ClusteringStrategy, Strategy};

/// Lifecycle of a clustering engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Input validated, nothing clustered yet
    Built,
    Clustered,
    Extended,
    Filtered,
}

impl EngineState {
    fn as_str(&self) -> &'static str {
        match self {
            EngineState::Built => "built",
            EngineState::Clustered => "clustered",
            EngineState::Extended => "extended",
            EngineState::Filtered => "filtered",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional passes run after clustering by [`ClusteringEngine::run`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineParams {
    /// Merge clusters adjacent in y, see [`ClusteringEngine::extend_clusters_y`]
    pub extend_y: bool,
    /// Drop clusters whose y-extent is below this value
    pub min_extent_y: Option<f64>,
}

/// Clusters caller-owned points on a spatial hash grid
///
/// The engine borrows the input arrays and only stores point indices.
pub struct ClusteringEngine<'a, M, S = Strategy, A = i32, B = i32> {
    metric: M,
    strategy: S,
    points: PointSet<'a, A, B>,
    boundaries: GridBoundaries,
    state: EngineState,
    results: ClusterMap<A, B>,
}

impl<'a, M, S, A, B> ClusteringEngine<'a, M, S, A, B>
where
    M: Metric,
    S: ClusteringStrategy,
    A: Property,
    B: Property,
{
    /// Validates the input and prepares the engine
    ///
    /// Fails if there are fewer than two points or a point lies outside
    /// the grid; no clustering work is done here.
    pub fn new(
        metric: M,
        strategy: S,
        points: PointSet<'a, A, B>,
        boundaries: GridBoundaries,
    ) -> Result<Self> {
        if points.len() < 2 {
            return Err(ClusteringError::InsufficientInput {
                required: 2,
                provided: points.len(),
            });
        }
        let range = boundaries.range();
        if let Some((index, p)) = points.iter().find(|(_, p)| !range.contains(p)) {
            return Err(ClusteringError::PointOutsideGrid {
                index,
                x: p.0[0],
                y: p.0[1],
            });
        }

        Ok(ClusteringEngine {
            metric,
            strategy,
            points,
            boundaries,
            state: EngineState::Built,
            results: ClusterMap::new(),
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn points(&self) -> &PointSet<'a, A, B> {
        &self.points
    }

    pub fn boundaries(&self) -> &GridBoundaries {
        &self.boundaries
    }

    fn require(&self, operation: &'static str, allowed: &[EngineState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ClusteringError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }

    /// Runs the configured strategy over all points
    pub fn cluster(&mut self) -> Result<()> {
        self.require("cluster", &[EngineState::Built])?;
        self.results = self
            .strategy
            .extract(&self.metric, &self.points, &self.boundaries)?;
        self.state = EngineState::Clustered;
        Ok(())
    }

    /// Merges clusters that follow each other in y
    ///
    /// Clusters are grouped into columns by the x cell of their centre;
    /// centres on the last x line count towards the last column.
    /// Within a column they are ordered by centre y, and each adjacent pair
    /// is merged if the upper cluster's x-extent has an endpoint inside the
    /// lower cluster's x-extent and the merge keeps properties consistent.
    /// Pairs are decided on the clusters as they were before this pass;
    /// merges chain, and the merged cluster keeps the upper cluster's index.
    pub fn extend_clusters_y(&mut self) -> Result<()> {
        self.require("extend clusters", &[EngineState::Clustered])?;
        let before = self.results.len();

        // single band in y
        let columns_grid = SpatialHashGrid::from_points(
            self.boundaries.x_only(),
            self.results.iter().map(|(&id, c)| (id, c.centre())),
        )?;

        // merged groups: pre-extension index -> index now holding its points
        let mut owner: BTreeMap<usize, usize> = BTreeMap::new();
        let mut merged = self.results.clone();

        // a centre on the last x line joins the last column, and a centre on
        // the last y line stays in its x column
        let last_column = self.boundaries.x().len() as isize - 1;
        let mut columns: BTreeMap<isize, Vec<usize>> = BTreeMap::new();
        for cell in columns_grid.non_empty_cells() {
            columns
                .entry(cell.0.min(last_column))
                .or_default()
                .extend_from_slice(columns_grid.members(cell));
        }

        for mut column in columns.into_values() {
            if column.len() < 2 {
                continue;
            }
            column.sort_by(|a, b| self.results[a].cmp_centre_y(&self.results[b]));

            for pair in column.windows(2) {
                let (lower_id, upper_id) = (pair[0], pair[1]);
                let lower = self.results[&lower_id].bounding_box();
                let upper = self.results[&upper_id].bounding_box();

                let overlap = (upper.min_x() <= lower.max_x() && upper.min_x() >= lower.min_x())
                    || (upper.max_x() >= lower.min_x() && upper.max_x() <= lower.max_x());
                if !overlap {
                    continue;
                }

                let lower_group = resolve(&owner, lower_id);
                let upper_group = resolve(&owner, upper_id);
                if lower_group == upper_group {
                    continue;
                }
                let (Some(c_lower), Some(c_upper)) =
                    (merged.get(&lower_group), merged.get(&upper_group))
                else {
                    continue;
                };
                if c_upper.merge_veto(c_lower) {
                    debug!(lower_id, upper_id, "extension vetoed by properties");
                    continue;
                }

                let combined = c_upper.merge(c_lower);
                merged.remove(&lower_group);
                merged.insert(upper_group, combined);
                owner.insert(lower_group, upper_group);
            }
        }

        self.results = merged;
        self.state = EngineState::Extended;
        info!(
            before,
            after = self.results.len(),
            "extended clusters in y"
        );
        Ok(())
    }

    /// Removes clusters whose bounding box is less than `threshold_y` tall
    ///
    /// Surviving clusters are left untouched.
    pub fn remove_small_clusters_y(&mut self, threshold_y: f64) -> Result<()> {
        self.require(
            "remove small clusters",
            &[
                EngineState::Clustered,
                EngineState::Extended,
                EngineState::Filtered,
            ],
        )?;
        if !threshold_y.is_finite() || threshold_y < 0.0 {
            return Err(ClusteringError::InvalidParameter {
                name: "threshold_y",
                value: threshold_y,
            });
        }

        let before = self.results.len();
        self.results
            .retain(|_, c| c.bounding_box().height() >= threshold_y);
        self.state = EngineState::Filtered;
        info!(
            before,
            after = self.results.len(),
            threshold_y,
            "removed small clusters"
        );
        Ok(())
    }

    /// Cluster, then the optional passes in `params`
    pub fn run(&mut self, params: &PipelineParams) -> Result<&ClusterMap<A, B>> {
        self.cluster()?;
        if params.extend_y {
            self.extend_clusters_y()?;
        }
        if let Some(threshold_y) = params.min_extent_y {
            self.remove_small_clusters_y(threshold_y)?;
        }
        Ok(&self.results)
    }

    /// Clusters keyed by cluster index
    pub fn results(&self) -> &ClusterMap<A, B> {
        &self.results
    }

    pub fn into_results(self) -> ClusterMap<A, B> {
        self.results
    }

    /// Clusters ordered by centre y
    pub fn sorted_by_y(&self) -> Vec<(usize, &Cluster<A, B>)> {
        let mut sorted: Vec<(usize, &Cluster<A, B>)> =
            self.results.iter().map(|(&id, c)| (id, c)).collect();
        sorted.sort_by(|a, b| a.1.cmp_centre_y(b.1));
        sorted
    }

    /// Indices of points not contained in any cluster, ascending
    pub fn unclustered(&self) -> Vec<usize> {
        let mut members = bitvec![0; self.points.len()];
        for cluster in self.results.values() {
            for &i in cluster.points() {
                members.set(i, true);
            }
        }
        members.iter_zeros().collect()
    }
}

/// Follows merge links to the index currently holding `id`'s points
fn resolve(owner: &BTreeMap<usize, usize>, mut id: usize) -> usize {
    while let Some(&next) = owner.get(&id) {
        id = next;
    }
    id
}
