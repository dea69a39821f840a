#[cfg(test)]
mod tests {
    use crate::cluster::{ClusteringError, GridBoundaries, Point, SpatialHashGrid};

    fn unit_grid() -> GridBoundaries {
        let lines: Vec<f64> = (0..=10).map(f64::from).collect();
        GridBoundaries::new(lines.clone(), lines).unwrap()
    }

    #[test]
    fn test_boundaries_validation() {
        assert!(matches!(
            GridBoundaries::new(vec![0.0], vec![0.0, 1.0]),
            Err(ClusteringError::InvalidBoundaries { axis: 'x', .. })
        ));
        assert!(matches!(
            GridBoundaries::new(vec![0.0, 1.0], vec![]),
            Err(ClusteringError::InvalidBoundaries { axis: 'y', .. })
        ));
        assert!(GridBoundaries::new(vec![0.0, 1.0, 1.0], vec![0.0, 1.0]).is_err());
        assert!(GridBoundaries::new(vec![0.0, 2.0, 1.0], vec![0.0, 1.0]).is_err());
        assert!(GridBoundaries::new(vec![0.0, f64::NAN], vec![0.0, 1.0]).is_err());
        assert!(GridBoundaries::new(vec![0.0, 0.5, 3.0], vec![-1.0, 1.0]).is_ok());
    }

    #[test]
    fn test_cell_index_half_open() {
        let b = unit_grid();
        assert_eq!(b.cell_index(&Point([0.0, 0.0])), Some((1, 1)));
        assert_eq!(b.cell_index(&Point([0.99, 0.5])), Some((1, 1)));
        assert_eq!(b.cell_index(&Point([1.0, 0.5])), Some((2, 1)));
        assert_eq!(b.cell_index(&Point([9.5, 3.2])), Some((10, 4)));
        // the last line belongs to a cell of its own
        assert_eq!(b.cell_index(&Point([10.0, 10.0])), Some((11, 11)));
    }

    #[test]
    fn test_cell_index_non_uniform() {
        let b = GridBoundaries::new(vec![0.0, 1.0, 5.0, 100.0], vec![0.0, 10.0]).unwrap();
        assert_eq!(b.cell_index(&Point([0.5, 1.0])), Some((1, 1)));
        assert_eq!(b.cell_index(&Point([4.9, 1.0])), Some((2, 1)));
        assert_eq!(b.cell_index(&Point([50.0, 1.0])), Some((3, 1)));
    }

    #[test]
    fn test_cell_index_outside() {
        let b = unit_grid();
        assert_eq!(b.cell_index(&Point([-0.1, 5.0])), None);
        assert_eq!(b.cell_index(&Point([5.0, 10.5])), None);
        assert_eq!(b.cell_index(&Point([f64::NAN, 5.0])), None);
    }

    #[test]
    fn test_x_only() {
        let b = unit_grid().x_only();
        assert_eq!(b.x().len(), 11);
        assert_eq!(b.y(), &[0.0, 10.0]);
        assert_eq!(b.cell_index(&Point([3.5, 7.0])), Some((4, 1)));
    }

    #[test]
    fn test_insert_remove_prunes_cells() {
        let mut grid = SpatialHashGrid::new(unit_grid());
        grid.insert((1, 1), 0);
        grid.insert((1, 1), 1);
        grid.insert((2, 1), 2);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell_count(), 2);
        assert_eq!(grid.members((1, 1)), &[0, 1]);

        assert!(grid.remove((1, 1), 0));
        assert!(!grid.remove((1, 1), 0));
        assert!(!grid.remove((5, 5), 1));
        assert_eq!(grid.members((1, 1)), &[1]);

        assert!(grid.remove((1, 1), 1));
        assert!(!grid.is_non_empty_cell((1, 1)));
        assert_eq!(grid.members((1, 1)), &[] as &[usize]);
        assert_eq!(grid.cell_count(), 1);
        assert_eq!(grid.len(), 1);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_removal_keeps_insertion_order() {
        let mut grid = SpatialHashGrid::new(unit_grid());
        for id in [4, 2, 9, 7] {
            grid.insert((3, 3), id);
        }
        grid.remove((3, 3), 2);
        grid.insert((3, 3), 2);
        assert_eq!(grid.members((3, 3)), &[4, 9, 7, 2]);
    }

    #[test]
    fn test_neighbourhood() {
        let points = [
            Point([0.5, 0.5]), // (1, 1)
            Point([1.5, 1.5]), // (2, 2)
            Point([2.5, 2.5]), // (3, 3)
            Point([3.5, 3.5]), // (4, 4)
            Point([1.5, 0.2]), // (2, 1)
        ];
        let grid = SpatialHashGrid::from_points(
            unit_grid(),
            points.iter().copied().enumerate(),
        )
        .unwrap();
        assert_eq!(grid.non_empty_cells(), vec![(1, 1), (2, 1), (2, 2), (3, 3), (4, 4)]);

        let mut near: Vec<usize> = grid.neighbourhood((2, 2), 1).collect();
        near.sort();
        assert_eq!(near, vec![0, 1, 2, 4]);

        let mut wide: Vec<usize> = grid.neighbourhood((2, 2), 2).collect();
        wide.sort();
        assert_eq!(wide, vec![0, 1, 2, 3, 4]);

        let same_cell: Vec<usize> = grid.neighbourhood((2, 2), 0).collect();
        assert_eq!(same_cell, vec![1]);

        assert_eq!(grid.neighbouring_cells((5, 5), 1).count(), 9);
    }

    #[test]
    fn test_from_points_outside_grid() {
        let points = vec![(0, Point([1.0, 1.0])), (1, Point([11.0, 1.0]))];
        let err = SpatialHashGrid::from_points(unit_grid(), points).unwrap_err();
        assert_eq!(
            err,
            ClusteringError::PointOutsideGrid {
                index: 1,
                x: 11.0,
                y: 1.0
            }
        );
    }
}
