use glam::Vec3;

/// Axis-aligned envelope of the coordinates a geometry actually references.
///
/// `BoundingBox::ZERO` doubles as the "nothing referenced" sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::ZERO;
        };
        points.fold(Self::from_point(first), |bounds, point| bounds.extended(point))
    }

    pub fn extended(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_point_set_is_zero() {
        assert!(BoundingBox::from_points([]).is_zero());
    }

    #[test]
    fn points_expand_componentwise() {
        let bounds = BoundingBox::from_points([
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 4.0, 0.0),
            Vec3::new(0.0, 0.0, 3.0),
        ]);

        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(bounds.center(), Vec3::new(0.0, 1.0, 1.5));
        assert_eq!(bounds.size(), Vec3::new(2.0, 6.0, 3.0));
    }

    #[test]
    fn union_covers_both() {
        let a = BoundingBox::from_point(Vec3::ONE);
        let b = BoundingBox::from_point(-Vec3::ONE);
        assert_eq!(a.union(b).min, -Vec3::ONE);
        assert_eq!(a.union(b).max, Vec3::ONE);
    }
}
