use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use bitvec::prelude::*;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use super::distance::{Metric, checked_distance};
use super::error::{ClusteringError, Result};
use super::grid::{CellIndex, GridBoundaries, SpatialHashGrid};
use super::input::PointSet;
use super::point::{Cluster, Property, centroid_and_bounds};
use super::strategy::{ClusterMap, ClusteringStrategy};

// Greedy QT clustering (Heyer, Kruglyak, Yooseph) restricted to grid
// neighbourhoods:
//
// QT(D, threshold)
//    while D has an admissible cluster of size >= 2
//       for each point P in D
//          C(P) = {P} + all points Q in cells adjacent to P's cell with
//                 dist(P, Q) <= threshold, same property A as P,
//                 at most one Q per property B (the closest one wins)
//       pick best C(P): largest, then smallest mean dist(P, Q), then lowest P
//       emit it, remove its members from D
//
// Removing members only changes C(P) for seeds whose neighbourhood
// contains one of the touched cells, so candidates are cached per seed and
// refreshed locally.

/// Greedy extraction of best quality-threshold clusters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreedyQt {
    threshold: f64,
    radius: usize,
}

impl GreedyQt {
    /// Clusters with a maximum seed-to-member distance of `threshold`,
    /// searching the 8 cells around a seed
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ClusteringError::InvalidParameter {
                name: "threshold",
                value: threshold,
            });
        }
        Ok(GreedyQt {
            threshold,
            radius: 1,
        })
    }

    /// Number of cell rings searched around a seed's cell
    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Best admissible cluster around `seed` among the points left on `grid`
    fn candidate<M, A, B>(
        &self,
        metric: &M,
        points: &PointSet<'_, A, B>,
        grid: &SpatialHashGrid,
        seed: usize,
    ) -> Result<Option<Candidate>>
    where
        M: Metric,
        A: Property,
        B: Property,
    {
        let centre = points.point(seed);
        let cell = cell_of(grid, points, seed)?;
        let seed_a = points.property_a(seed);
        let seed_b = points.property_b(seed);

        let mut closest_per_b: HashMap<B, (f64, usize)> = HashMap::new();
        let mut admitted: Vec<(f64, usize)> = Vec::new();

        for idx in grid.neighbourhood(cell, self.radius) {
            if idx == seed || points.property_a(idx) != seed_a {
                continue;
            }
            let d = checked_distance(metric, &centre, &points.point(idx), seed, idx)?;
            if d > self.threshold {
                continue;
            }
            match points.property_b(idx) {
                // the seed already occupies this slot
                Some(b) if Some(b) == seed_b => {}
                Some(b) => {
                    closest_per_b
                        .entry(b)
                        .and_modify(|best| {
                            if (d, idx) < *best {
                                *best = (d, idx);
                            }
                        })
                        .or_insert((d, idx));
                }
                None => admitted.push((d, idx)),
            }
        }
        admitted.extend(closest_per_b.into_values());

        if admitted.is_empty() {
            return Ok(None);
        }

        admitted.sort_unstable_by_key(|&(_, idx)| idx);
        let mean_distance =
            admitted.iter().map(|&(d, _)| d).sum::<f64>() / admitted.len() as f64;

        let mut members = Vec::with_capacity(admitted.len() + 1);
        members.push(seed);
        members.extend(admitted.iter().map(|&(_, idx)| idx));
        members.sort_unstable();

        Ok(Some(Candidate {
            seed,
            members,
            mean_distance,
        }))
    }
}

/// Cluster that would be extracted around one seed
#[derive(Debug, Clone)]
struct Candidate {
    seed: usize,
    members: Vec<usize>,
    mean_distance: f64,
}

/// Ascending order puts the best candidate first
type ScoreKey = (Reverse<usize>, OrderedFloat<f64>, usize);

impl Candidate {
    fn key(&self) -> ScoreKey {
        (
            Reverse(self.members.len()),
            OrderedFloat(self.mean_distance),
            self.seed,
        )
    }
}

fn cell_of<A: Property, B: Property>(
    grid: &SpatialHashGrid,
    points: &PointSet<'_, A, B>,
    idx: usize,
) -> Result<CellIndex> {
    let p = points.point(idx);
    grid.index_of(&p).ok_or(ClusteringError::PointOutsideGrid {
        index: idx,
        x: p.0[0],
        y: p.0[1],
    })
}

impl ClusteringStrategy for GreedyQt {
    fn name(&self) -> &'static str {
        "greedy-qt"
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
        let n = points.len();
        let mut grid = SpatialHashGrid::from_points(boundaries.clone(), points.iter())?;
        info!(
            points = n,
            cells = grid.cell_count(),
            threshold = self.threshold,
            "greedy QT clustering"
        );

        // seeds are independent of each other until the first extraction
        let mut candidates: Vec<Option<Candidate>> = (0..n)
            .into_par_iter()
            .map(|seed| self.candidate(metric, points, &grid, seed))
            .collect::<Result<_>>()?;
        let mut ranking: BTreeSet<ScoreKey> =
            candidates.iter().flatten().map(Candidate::key).collect();

        let mut clustered = bitvec![0; n];
        let mut results = ClusterMap::new();

        while let Some(best) = ranking.pop_first() {
            let Some(winner) = candidates[best.2].take() else {
                continue;
            };

            let mut touched = BTreeSet::new();
            for &m in &winner.members {
                let cell = cell_of(&grid, points, m)?;
                grid.remove(cell, m);
                clustered.set(m, true);
                if let Some(stale) = candidates[m].take() {
                    ranking.remove(&stale.key());
                }
                touched.insert(cell);
            }

            let Some((centre, bounds)) = centroid_and_bounds(&winner.members, |i| points.point(i))
            else {
                continue;
            };
            let properties_b = winner
                .members
                .iter()
                .map(|&i| points.property_b(i))
                .collect();
            let id = results.len();
            trace!(
                id,
                seed = winner.seed,
                size = winner.members.len(),
                mean_distance = winner.mean_distance,
                "extracted cluster"
            );
            results.insert(
                id,
                Cluster::new(
                    centre,
                    bounds,
                    winner.members,
                    points.property_a(winner.seed),
                    properties_b,
                ),
            );

            // seeds that can see a touched cell
            let affected: BTreeSet<usize> = touched
                .iter()
                .flat_map(|&cell| grid.neighbourhood(cell, self.radius))
                .collect();
            for seed in affected {
                if let Some(stale) = candidates[seed].take() {
                    ranking.remove(&stale.key());
                }
                if let Some(fresh) = self.candidate(metric, points, &grid, seed)? {
                    ranking.insert(fresh.key());
                    candidates[seed] = Some(fresh);
                }
            }

            if results.len() % 1000 == 0 {
                debug!(
                    clusters = results.len(),
                    remaining = grid.len(),
                    "clustering progress"
                );
            }
        }

        info!(
            clusters = results.len(),
            unclustered = clustered.count_zeros(),
            "greedy QT clustering done"
        );
        Ok(results)
    }
}
