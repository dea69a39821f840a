//! Spatial hash grid over (possibly non-uniform) grid lines
//!
//! The grid answers "which items lie near this position" by bucketing items
//! into rectangular cells. A neighbourhood query only looks at the cell of
//! a position and the cells around it, so clustering work is restricted to
//! small local problems. Grid spacing is expected to be at least the typical
//! cluster extent, so that no true neighbour is two cells away.

use std::collections::HashMap;

use super::error::{ClusteringError, Result};
use super::point::{Point, Rectangle};

/// Integer cell coordinates `(cell_x, cell_y)`
pub type CellIndex = (isize, isize);

/// Ascending grid lines on both axes
#[derive(Debug, Clone, PartialEq)]
pub struct GridBoundaries {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl GridBoundaries {
    /// Validates and stores grid lines
    ///
    /// Each axis needs at least two finite, strictly increasing values.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        validate_axis('x', &x)?;
        validate_axis('y', &y)?;
        Ok(GridBoundaries { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Area covered by the grid
    pub fn range(&self) -> Rectangle {
        Rectangle::new(
            Point([self.x[0], self.y[0]]),
            Point([self.x[self.x.len() - 1], self.y[self.y.len() - 1]]),
        )
    }

    /// Same x lines, a single band spanning the whole y range
    pub fn x_only(&self) -> GridBoundaries {
        GridBoundaries {
            x: self.x.clone(),
            y: vec![self.y[0], self.y[self.y.len() - 1]],
        }
    }

    /// Cell containing `p`, or `None` if `p` is outside the grid
    ///
    /// On each axis the index is the number of grid lines `<=` the
    /// coordinate, i.e. `[b[k], b[k+1])` maps to `k + 1`.
    pub fn cell_index(&self, p: &Point) -> Option<CellIndex> {
        if !self.range().contains(p) {
            return None;
        }
        let i = self.x.partition_point(|&b| b <= p.0[0]);
        let j = self.y.partition_point(|&b| b <= p.0[1]);
        Some((i as isize, j as isize))
    }
}

fn validate_axis(axis: char, lines: &[f64]) -> Result<()> {
    if lines.len() < 2 {
        return Err(ClusteringError::InvalidBoundaries {
            axis,
            reason: format!("need at least 2 grid lines, got {}", lines.len()),
        });
    }
    if let Some(v) = lines.iter().find(|v| !v.is_finite()) {
        return Err(ClusteringError::InvalidBoundaries {
            axis,
            reason: format!("grid line {v} is not finite"),
        });
    }
    if let Some(w) = lines.windows(2).find(|w| w[0] >= w[1]) {
        return Err(ClusteringError::InvalidBoundaries {
            axis,
            reason: format!("grid lines not strictly increasing at {} -> {}", w[0], w[1]),
        });
    }
    Ok(())
}

/// Hash grid mapping cells to the item ids registered in them
///
/// Items are plain indices (data points or clusters, depending on the
/// caller). Cells are created on first insertion and dropped once empty,
/// so iterating non-empty cells is proportional to what is left. Within a
/// cell, items keep their insertion order.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    boundaries: GridBoundaries,
    cells: HashMap<CellIndex, Vec<usize>>,
    len: usize,
}

impl SpatialHashGrid {
    pub fn new(boundaries: GridBoundaries) -> Self {
        SpatialHashGrid {
            boundaries,
            cells: HashMap::new(),
            len: 0,
        }
    }

    /// Creates a grid and buckets every `(id, position)` pair
    pub fn from_points<I>(boundaries: GridBoundaries, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, Point)>,
    {
        let mut grid = SpatialHashGrid::new(boundaries);
        for (id, p) in items {
            let cell = grid.index_of(&p).ok_or(ClusteringError::PointOutsideGrid {
                index: id,
                x: p.0[0],
                y: p.0[1],
            })?;
            grid.insert(cell, id);
        }
        Ok(grid)
    }

    pub fn boundaries(&self) -> &GridBoundaries {
        &self.boundaries
    }

    /// Cell containing `p`, `None` outside the grid
    pub fn index_of(&self, p: &Point) -> Option<CellIndex> {
        self.boundaries.cell_index(p)
    }

    pub fn insert(&mut self, cell: CellIndex, id: usize) {
        self.cells.entry(cell).or_default().push(id);
        self.len += 1;
    }

    /// Removes `id` from `cell`, pruning the cell if it becomes empty
    ///
    /// Returns false if `id` was not registered there.
    pub fn remove(&mut self, cell: CellIndex, id: usize) -> bool {
        let Some(ids) = self.cells.get_mut(&cell) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|&x| x == id) else {
            return false;
        };
        ids.remove(pos);
        if ids.is_empty() {
            self.cells.remove(&cell);
        }
        self.len -= 1;
        true
    }

    /// Items registered in `cell`
    pub fn members(&self, cell: CellIndex) -> &[usize] {
        self.cells.get(&cell).map_or(&[], Vec::as_slice)
    }

    pub fn is_non_empty_cell(&self, cell: CellIndex) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Non-empty cells in ascending `(cell_x, cell_y)` order
    pub fn non_empty_cells(&self) -> Vec<CellIndex> {
        let mut cells: Vec<CellIndex> = self.cells.keys().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// `cell` and every cell at most `radius` steps away on both axes,
    /// x-offset major
    pub fn neighbouring_cells(
        &self,
        cell: CellIndex,
        radius: usize,
    ) -> impl Iterator<Item = CellIndex> + use<> {
        let r = radius as isize;
        (-r..=r).flat_map(move |i| (-r..=r).map(move |j| (cell.0 + i, cell.1 + j)))
    }

    /// Items in `cell` and its neighbouring cells
    pub fn neighbourhood(&self, cell: CellIndex, radius: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbouring_cells(cell, radius)
            .flat_map(move |c| self.members(c).iter().copied())
    }

    /// Total number of registered items
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
