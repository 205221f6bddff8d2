use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box of a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Computes the bounding box of `points`, or `None` if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (
                Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        });
        Some(Self { min, max })
    }

    /// Edge lengths along x, y and z.
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Edge lengths with `padding` added to every axis independently.
    pub fn padded_extent(&self, padding: f64) -> [f64; 3] {
        let extent = self.extent();
        [extent.x + padding, extent.y + padding, extent.z + padding]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_returns_none_for_empty_input() {
        let points: Vec<Point3<f64>> = Vec::new();
        assert!(BoundingBox::from_points(&points).is_none());
    }

    #[test]
    fn from_points_of_single_point_is_degenerate() {
        let points = [Point3::new(1.0, -2.0, 3.0)];
        let bbox = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bbox.min, bbox.max);
        assert_eq!(bbox.extent(), Vector3::zeros());
    }

    #[test]
    fn from_points_tracks_each_axis_independently() {
        let points = [
            Point3::new(0.0, 5.0, -1.0),
            Point3::new(2.0, -3.0, 4.0),
            Point3::new(-1.0, 1.0, 0.5),
        ];
        let bbox = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bbox.min, Point3::new(-1.0, -3.0, -1.0));
        assert_eq!(bbox.max, Point3::new(2.0, 5.0, 4.0));
        assert_eq!(bbox.extent(), Vector3::new(3.0, 8.0, 5.0));
    }

    #[test]
    fn padded_extent_adds_padding_per_axis() {
        let bbox = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.padded_extent(6.0), [7.0, 8.0, 9.0]);
    }
}
