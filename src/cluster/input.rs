use super::error::{ClusteringError, Result};
use super::point::{Point, Property};

/// Borrowed view of caller-owned parallel arrays
///
/// Positions are `(xs[i], ys[i])`. Properties are optional as a pair;
/// without them every point has unset properties and no constraints apply.
#[derive(Debug, Clone, Copy)]
pub struct PointSet<'a, A = i32, B = i32> {
    xs: &'a [f64],
    ys: &'a [f64],
    properties: Option<(&'a [A], &'a [B])>,
}

impl<'a, A: Property, B: Property> PointSet<'a, A, B> {
    /// Points without properties
    pub fn new(xs: &'a [f64], ys: &'a [f64]) -> Result<Self> {
        check_len("y coordinates", xs.len(), ys.len())?;
        Ok(PointSet {
            xs,
            ys,
            properties: None,
        })
    }

    /// Points with property A (shared within a cluster) and property B
    /// (distinct within a cluster)
    pub fn with_properties(
        xs: &'a [f64],
        ys: &'a [f64],
        properties_a: &'a [A],
        properties_b: &'a [B],
    ) -> Result<Self> {
        check_len("y coordinates", xs.len(), ys.len())?;
        check_len("properties A", xs.len(), properties_a.len())?;
        check_len("properties B", xs.len(), properties_b.len())?;
        Ok(PointSet {
            xs,
            ys,
            properties: Some((properties_a, properties_b)),
        })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn has_properties(&self) -> bool {
        self.properties.is_some()
    }

    pub fn point(&self, i: usize) -> Point {
        Point([self.xs[i], self.ys[i]])
    }

    pub fn property_a(&self, i: usize) -> Option<A> {
        self.properties.map(|(a, _)| a[i])
    }

    pub fn property_b(&self, i: usize) -> Option<B> {
        self.properties.map(|(_, b)| b[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Point)> + '_ {
        (0..self.len()).map(move |i| (i, self.point(i)))
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ClusteringError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
