//! Grid-restricted agglomerative clustering
//!
//! Optimised for large data sets containing many small clusters, i.e.
//! cluster extent much smaller than the extent of the whole data set. The
//! problem then splits into many local problems, each solved on a few
//! adjacent grid cells; the grid spacing reflects the typical cluster size.
//!
//! Every point starts as its own cluster. The pair of neighbouring clusters
//! with the globally smallest centre distance is merged, until no cluster
//! has a mergeable neighbour in its cell neighbourhood.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use ordered_float::OrderedFloat;
use tracing::{debug, info};

use super::distance::{Metric, checked_distance};
use super::error::{ClusteringError, Result};
use super::grid::{CellIndex, GridBoundaries, SpatialHashGrid};
use super::input::PointSet;
use super::point::{Cluster, Point, Property};
use super::strategy::{ClusterMap, ClusteringStrategy};

/// Nearest-neighbour merging of clusters on a hash grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hierarchical {
    radius: usize,
}

impl Default for Hierarchical {
    fn default() -> Self {
        Hierarchical { radius: 1 }
    }
}

impl Hierarchical {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cell rings searched for a nearest neighbour
    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    pub fn radius(&self) -> usize {
        self.radius
    }
}

/// Distance to the nearest neighbour, ordered by distance then insertion
type DistanceKey = (OrderedFloat<f64>, u64);

#[derive(Debug, Clone, Copy)]
struct MinimumDistance {
    cluster: usize,
    nearest: usize,
}

struct MergeState<'m, M, A, B> {
    metric: &'m M,
    radius: usize,
    grid: SpatialHashGrid,
    /// clusters that may still be merged
    active: BTreeMap<usize, Cluster<A, B>>,
    /// clusters without any mergeable neighbour
    done: ClusterMap<A, B>,
    distances: BTreeMap<DistanceKey, MinimumDistance>,
    /// nearest neighbour -> entries pointing at it
    reverse_nns: HashMap<usize, Vec<DistanceKey>>,
    key_for_cluster: HashMap<usize, DistanceKey>,
    next_seq: u64,
}

impl<'m, M, A, B> MergeState<'m, M, A, B>
where
    M: Metric,
    A: Property,
    B: Property,
{
    fn cell(&self, id: usize, centre: &Point) -> Result<CellIndex> {
        self.grid
            .index_of(centre)
            .ok_or(ClusteringError::PointOutsideGrid {
                index: id,
                x: centre.0[0],
                y: centre.0[1],
            })
    }

    /// Registers the nearest mergeable neighbour of `id`
    ///
    /// A cluster without one is moved to the finished clusters; returns
    /// true in that case.
    fn find_nearest_neighbour(&mut self, id: usize) -> Result<bool> {
        let Some(cluster) = self.active.get(&id) else {
            return Ok(false);
        };
        let centre = cluster.centre();
        let cell = self.cell(id, &centre)?;

        let mut nearest: Option<(f64, usize)> = None;
        for other in self.grid.neighbourhood(cell, self.radius) {
            if other == id {
                continue;
            }
            let Some(candidate) = self.active.get(&other) else {
                continue;
            };
            let d = checked_distance(self.metric, &centre, &candidate.centre(), id, other)?;
            // the first one found wins ties
            if nearest.is_none_or(|(min, _)| d < min) && !cluster.merge_veto(candidate) {
                nearest = Some((d, other));
            }
        }

        match nearest {
            None => {
                self.grid.remove(cell, id);
                if let Some(cluster) = self.active.remove(&id) {
                    self.done.insert(id, cluster);
                }
                Ok(true)
            }
            Some((d, other)) => {
                let key = (OrderedFloat(d), self.next_seq);
                self.next_seq += 1;
                self.distances.insert(
                    key,
                    MinimumDistance {
                        cluster: id,
                        nearest: other,
                    },
                );
                self.reverse_nns.entry(other).or_default().push(key);
                self.key_for_cluster.insert(id, key);
                Ok(false)
            }
        }
    }

    /// Drops the lookup entries belonging to a removed distance
    fn forget(&mut self, key: DistanceKey, entry: MinimumDistance) {
        if let Some(keys) = self.reverse_nns.get_mut(&entry.nearest) {
            keys.retain(|&k| k != key);
            if keys.is_empty() {
                self.reverse_nns.remove(&entry.nearest);
            }
        }
        self.key_for_cluster.remove(&entry.cluster);
    }

    fn merge(&mut self, id1: usize, id2: usize) -> Result<()> {
        let (Some(c1), Some(c2)) = (self.active.remove(&id1), self.active.remove(&id2)) else {
            return Ok(());
        };
        let cell1 = self.cell(id1, &c1.centre())?;
        let cell2 = self.cell(id2, &c2.centre())?;
        self.grid.remove(cell1, id1);
        self.grid.remove(cell2, id2);

        let merged = c1.merge(&c2);
        let cell = self.cell(id1, &merged.centre())?;
        self.grid.insert(cell, id1);
        self.active.insert(id1, merged);

        // id2 no longer exists
        if let Some(key) = self.key_for_cluster.get(&id2).copied() {
            if let Some(entry) = self.distances.remove(&key) {
                self.forget(key, entry);
            }
        }

        let mut to_update = BTreeSet::from([id1]);
        for target in [id1, id2] {
            for key in self.reverse_nns.remove(&target).unwrap_or_default() {
                if let Some(entry) = self.distances.remove(&key) {
                    self.key_for_cluster.remove(&entry.cluster);
                    to_update.insert(entry.cluster);
                }
            }
        }

        for id in to_update {
            self.find_nearest_neighbour(id)?;
        }
        Ok(())
    }
}

impl ClusteringStrategy for Hierarchical {
    fn name(&self) -> &'static str {
        "hierarchical"
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
        // initially each cluster contains a single point
        let grid = SpatialHashGrid::from_points(boundaries.clone(), points.iter())?;
        let active: BTreeMap<usize, Cluster<A, B>> = points
            .iter()
            .map(|(i, p)| {
                (
                    i,
                    Cluster::singleton(i, p, points.property_a(i), points.property_b(i)),
                )
            })
            .collect();

        let mut state = MergeState {
            metric,
            radius: self.radius,
            grid,
            active,
            done: ClusterMap::new(),
            distances: BTreeMap::new(),
            reverse_nns: HashMap::new(),
            key_for_cluster: HashMap::new(),
            next_seq: 0,
        };
        info!(
            points = points.len(),
            cells = state.grid.cell_count(),
            "hierarchical clustering"
        );

        for id in 0..points.len() {
            state.find_nearest_neighbour(id)?;
        }

        let start = state.active.len();
        let mut merges = 0usize;
        while let Some((key, entry)) = state.distances.pop_first() {
            state.forget(key, entry);
            state.merge(entry.cluster, entry.nearest)?;

            merges += 1;
            if merges % 1000 == 0 {
                debug!(
                    merged = merges,
                    remaining = state.active.len(),
                    of = start,
                    "clustering progress"
                );
            }
        }

        // every active cluster has a distance entry, so none should be left
        let mut done = state.done;
        done.append(&mut state.active);

        // points that never found a partner are reported as unclustered
        done.retain(|_, c| c.len() >= 2);
        info!(clusters = done.len(), merges, "hierarchical clustering done");
        Ok(done)
    }
}
