//! Geometry primitives and the cluster value type

use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

/// Point represents a position in the 2D clustering plane
///
/// The point is stored as [x, y] where:
/// - `[0]` is x (conventionally m/z)
/// - `[1]` is y (conventionally retention time)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point(pub [f64; 2]);

/// PointList is a collection of Points
pub type PointList = Vec<Point>;

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point([x, y])
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    /// Checks if this point is less than or equal to another point
    /// in both coordinates (a <= b)
    pub fn less_eq(&self, b: &Point) -> bool {
        self.0[0] <= b.0[0] && self.0[1] <= b.0[1]
    }

    /// Checks if this point is greater than or equal to another point
    /// in both coordinates (a >= b)
    pub fn greater_eq(&self, b: &Point) -> bool {
        self.0[0] >= b.0[0] && self.0[1] >= b.0[1]
    }
}

/// Axis-aligned bounding box, `min <= max` in both coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    min: Point,
    max: Point,
}

impl Rectangle {
    /// Creates the smallest rectangle containing both corners
    pub fn new(a: Point, b: Point) -> Self {
        Rectangle {
            min: Point([a.0[0].min(b.0[0]), a.0[1].min(b.0[1])]),
            max: Point([a.0[0].max(b.0[0]), a.0[1].max(b.0[1])]),
        }
    }

    /// Degenerate rectangle covering a single point
    pub fn from_point(p: Point) -> Self {
        Rectangle { min: p, max: p }
    }

    pub fn min(&self) -> Point {
        self.min
    }

    pub fn max(&self) -> Point {
        self.max
    }

    pub fn min_x(&self) -> f64 {
        self.min.0[0]
    }

    pub fn max_x(&self) -> f64 {
        self.max.0[0]
    }

    pub fn min_y(&self) -> f64 {
        self.min.0[1]
    }

    pub fn max_y(&self) -> f64 {
        self.max.0[1]
    }

    pub fn width(&self) -> f64 {
        self.max.0[0] - self.min.0[0]
    }

    pub fn height(&self) -> f64 {
        self.max.0[1] - self.min.0[1]
    }

    /// Grows the rectangle so that it contains `p`
    pub fn enlarge(&mut self, p: &Point) {
        for j in 0..2 {
            if p.0[j] < self.min.0[j] {
                self.min.0[j] = p.0[j];
            }
            if p.0[j] > self.max.0[j] {
                self.max.0[j] = p.0[j];
            }
        }
    }

    /// Smallest rectangle containing both `self` and `other`
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let mut result = *self;
        result.enlarge(&other.min);
        result.enlarge(&other.max);
        result
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.greater_eq(&self.min) && p.less_eq(&self.max)
    }

    /// Checks if `inner` lies completely inside this rectangle
    pub fn contains_rect(&self, inner: &Rectangle) -> bool {
        inner.min.greater_eq(&self.min) && inner.max.less_eq(&self.max)
    }
}

/// Marker for values usable as cluster properties
///
/// Property A is shared by all members of a cluster (e.g. charge state),
/// property B must be distinct between members (e.g. source map id).
pub trait Property: Copy + Eq + Ord + Hash + Debug + Send + Sync {}

impl<T> Property for T where T: Copy + Eq + Ord + Hash + Debug + Send + Sync {}

/// Cluster represents one grouping result
///
/// Created by the clustering engine, read-only afterwards. `properties_b`
/// runs parallel to `points`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster<A = i32, B = i32> {
    centre: Point,
    bounding_box: Rectangle,
    points: Vec<usize>,
    property_a: Option<A>,
    properties_b: Vec<Option<B>>,
}

impl<A: Property, B: Property> Cluster<A, B> {
    pub(crate) fn new(
        centre: Point,
        bounding_box: Rectangle,
        points: Vec<usize>,
        property_a: Option<A>,
        properties_b: Vec<Option<B>>,
    ) -> Self {
        debug_assert_eq!(points.len(), properties_b.len());
        Cluster {
            centre,
            bounding_box,
            points,
            property_a,
            properties_b,
        }
    }

    /// Single-point cluster
    pub(crate) fn singleton(index: usize, position: Point, a: Option<A>, b: Option<B>) -> Self {
        Cluster::new(
            position,
            Rectangle::from_point(position),
            vec![index],
            a,
            vec![b],
        )
    }

    /// Combines two clusters; the centre is the size-weighted mean of both centres
    pub(crate) fn merge(&self, other: &Cluster<A, B>) -> Self {
        let n1 = self.points.len() as f64;
        let n2 = other.points.len() as f64;
        let centre = Point([
            (self.centre.0[0] * n1 + other.centre.0[0] * n2) / (n1 + n2),
            (self.centre.0[1] * n1 + other.centre.0[1] * n2) / (n1 + n2),
        ]);

        let mut points = Vec::with_capacity(self.points.len() + other.points.len());
        points.extend_from_slice(&self.points);
        points.extend_from_slice(&other.points);

        let mut properties_b =
            Vec::with_capacity(self.properties_b.len() + other.properties_b.len());
        properties_b.extend_from_slice(&self.properties_b);
        properties_b.extend_from_slice(&other.properties_b);

        Cluster::new(
            centre,
            self.bounding_box.union(&other.bounding_box),
            points,
            self.property_a.or(other.property_a),
            properties_b,
        )
    }

    /// Returns true if the two clusters must not be merged
    ///
    /// Properties A need to agree and properties B must not intersect.
    /// Unset properties never veto.
    pub fn merge_veto(&self, other: &Cluster<A, B>) -> bool {
        if let (Some(a1), Some(a2)) = (self.property_a, other.property_a) {
            if a1 != a2 {
                return true;
            }
        }
        self.properties_b
            .iter()
            .flatten()
            .any(|b1| other.properties_b.iter().flatten().any(|b2| b1 == b2))
    }

    pub fn centre(&self) -> Point {
        self.centre
    }

    pub fn bounding_box(&self) -> Rectangle {
        self.bounding_box
    }

    /// Indices of the member points
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn property_a(&self) -> Option<A> {
        self.property_a
    }

    pub fn properties_b(&self) -> &[Option<B>] {
        &self.properties_b
    }

    /// Orders clusters by centre y-coordinate
    pub fn cmp_centre_y(&self, other: &Cluster<A, B>) -> Ordering {
        self.centre.0[1].total_cmp(&other.centre.0[1])
    }
}

/// Calculates centre and bounds of a set of points
///
/// Returns `(center, bounds)` where `center` is the centroid of the
/// selected points and `bounds` the tightest box around them. `None` for
/// an empty selection.
pub fn centroid_and_bounds<F>(indices: &[usize], position: F) -> Option<(Point, Rectangle)>
where
    F: Fn(usize) -> Point,
{
    let (&first, rest) = indices.split_first()?;
    let mut center = position(first);
    let mut bounds = Rectangle::from_point(center);

    for &i in rest {
        let pt = position(i);
        for j in 0..2 {
            center.0[j] += pt.0[j];
        }
        bounds.enlarge(&pt);
    }

    for j in 0..2 {
        center.0[j] /= indices.len() as f64;
    }

    Some((center, bounds))
}
