#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_centroid_and_bounds() {
        let points = vec![
            Point([30.244759, 59.955982]),
            Point([30.24472, 59.955975]),
            Point([30.244358, 59.96698]),
        ];

        let (center, bounds) = centroid_and_bounds(&[0, 1, 2], |i| points[i]).unwrap();
        assert_eq!(center.0[0], 30.244612333333333);
        assert_eq!(center.0[1], 59.95964566666667);
        assert_eq!(bounds.min_x(), 30.244358);
        assert_eq!(bounds.min_y(), 59.955975);
        assert_eq!(bounds.max_x(), 30.244759);
        assert_eq!(bounds.max_y(), 59.96698);

        assert!(centroid_and_bounds(&[], |i| points[i]).is_none());
    }

    #[test]
    fn test_rectangle_normalises_corners() {
        let r = Rectangle::new(Point([3.0, 1.0]), Point([1.0, 4.0]));
        assert_eq!(r.min(), Point([1.0, 1.0]));
        assert_eq!(r.max(), Point([3.0, 4.0]));
        assert_eq!(r.width(), 2.0);
        assert_eq!(r.height(), 3.0);
    }

    #[test]
    fn test_rectangle_enlarge_and_union() {
        let mut r = Rectangle::from_point(Point([1.0, 1.0]));
        r.enlarge(&Point([0.5, 2.0]));
        assert_eq!(r, Rectangle::new(Point([0.5, 1.0]), Point([1.0, 2.0])));

        // enlarging with an inner point changes nothing
        r.enlarge(&Point([0.75, 1.5]));
        assert_eq!(r, Rectangle::new(Point([0.5, 1.0]), Point([1.0, 2.0])));

        let other = Rectangle::new(Point([2.0, -1.0]), Point([3.0, 0.0]));
        let u = r.union(&other);
        assert_eq!(u, Rectangle::new(Point([0.5, -1.0]), Point([3.0, 2.0])));
        assert!(u.contains_rect(&r));
        assert!(u.contains_rect(&other));
        assert!(!r.contains_rect(&u));
    }

    #[test]
    fn test_rectangle_contains_is_closed() {
        let r = Rectangle::new(Point([0.0, 0.0]), Point([1.0, 1.0]));
        assert!(r.contains(&Point([0.0, 0.0])));
        assert!(r.contains(&Point([1.0, 1.0])));
        assert!(r.contains(&Point([0.5, 0.25])));
        assert!(!r.contains(&Point([1.0001, 0.5])));
        assert!(!r.contains(&Point([f64::NAN, 0.5])));
    }

    #[test]
    fn test_cluster_merge() {
        let c1: Cluster = Cluster::singleton(0, Point([1.0, 1.0]), Some(2), Some(0));
        let c2: Cluster = Cluster::singleton(3, Point([2.0, 3.0]), Some(2), Some(1));
        let c12 = c1.merge(&c2);
        let c3: Cluster = Cluster::singleton(5, Point([4.0, 1.0]), Some(2), Some(2));

        // centre of c12 counts twice
        let merged = c12.merge(&c3);
        assert_eq!(merged.points(), &[0, 3, 5]);
        assert_eq!(merged.properties_b(), &[Some(0), Some(1), Some(2)]);
        assert_eq!(merged.property_a(), Some(2));
        assert!((merged.centre().x() - 7.0 / 3.0).abs() < 1e-12);
        assert!((merged.centre().y() - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(
            merged.bounding_box(),
            Rectangle::new(Point([1.0, 1.0]), Point([4.0, 3.0]))
        );
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_veto() {
        let a: Cluster = Cluster::singleton(0, Point([1.0, 1.0]), Some(1), Some(7));
        let same_b: Cluster = Cluster::singleton(1, Point([1.0, 1.0]), Some(1), Some(7));
        let other_a: Cluster = Cluster::singleton(2, Point([1.0, 1.0]), Some(2), Some(8));
        let fine: Cluster = Cluster::singleton(3, Point([1.0, 1.0]), Some(1), Some(8));
        let unset: Cluster = Cluster::singleton(4, Point([1.0, 1.0]), None, None);

        assert!(a.merge_veto(&same_b));
        assert!(a.merge_veto(&other_a));
        assert!(!a.merge_veto(&fine));
        assert!(!a.merge_veto(&unset));
        assert!(!unset.merge_veto(&unset.clone()));
    }

    #[test]
    fn test_cmp_centre_y() {
        use std::cmp::Ordering;

        let low: Cluster = Cluster::singleton(0, Point([9.0, 1.0]), None, None);
        let high: Cluster = Cluster::singleton(1, Point([0.0, 2.0]), None, None);
        assert_eq!(low.cmp_centre_y(&high), Ordering::Less);
        assert_eq!(high.cmp_centre_y(&low), Ordering::Greater);
        assert_eq!(low.cmp_centre_y(&low), Ordering::Equal);
    }
}
