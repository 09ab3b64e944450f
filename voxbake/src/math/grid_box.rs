//! Axis-aligned integer-coordinate boxes ([`GridBox`]).

use core::fmt;

use euclid::size3;

use crate::math::{GridCoordinate, GridPoint, GridSize};

/// An axis-aligned box of lattice cells, given by its inclusive minimum and maximum corners.
///
/// Unlike a half-open range, a [`GridBox`] always contains at least one cell.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct GridBox {
    min: GridPoint,
    /// Constructor checks ensure this is not smaller than `min` on any axis.
    max: GridPoint,
}

impl GridBox {
    /// The box containing only the cell at the origin.
    pub const ORIGIN_CELL: GridBox = GridBox {
        min: GridPoint::new(0, 0, 0),
        max: GridPoint::new(0, 0, 0),
    };

    /// Constructs a [`GridBox`] from its inclusive corners.
    ///
    /// Returns [`None`] if `min` is greater than `max` on any axis.
    pub fn from_min_max(
        min: impl Into<GridPoint>,
        max: impl Into<GridPoint>,
    ) -> Option<Self> {
        let min = min.into();
        let max = max.into();
        if min.x > max.x || min.y > max.y || min.z > max.z {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// Constructs the box containing exactly one cell.
    pub fn single_cell(cell: impl Into<GridPoint>) -> Self {
        let cell = cell.into();
        Self {
            min: cell,
            max: cell,
        }
    }

    /// Returns the smallest box containing all of the given points,
    /// or [`None`] if there are none.
    ///
    /// ```
    /// use voxbake::math::{GridBox, GridPoint};
    ///
    /// let bounds = GridBox::enclosing([[1, 5, -2], [3, 0, 0]].map(GridPoint::from)).unwrap();
    /// assert_eq!(bounds, GridBox::from_min_max([1, 0, -2], [3, 5, 0]).unwrap());
    /// ```
    pub fn enclosing(points: impl IntoIterator<Item = GridPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::single_cell(first), |bounds, p| Self {
            min: bounds.min.min(p),
            max: bounds.max.max(p),
        }))
    }

    /// Inclusive lower corner.
    #[inline]
    pub fn min(&self) -> GridPoint {
        self.min
    }

    /// Inclusive upper corner.
    #[inline]
    pub fn max(&self) -> GridPoint {
        self.max
    }

    /// Number of cells along each axis; `max - min + 1`.
    ///
    /// Computed in 64-bit arithmetic so that no [`GridBox`] can overflow it.
    pub fn size(&self) -> GridSize {
        let axis = |lo: GridCoordinate, hi: GridCoordinate| -> u32 {
            let len = i64::from(hi) - i64::from(lo) + 1;
            u32::try_from(len).unwrap_or(u32::MAX)
        };
        size3(
            axis(self.min.x, self.max.x),
            axis(self.min.y, self.max.y),
            axis(self.min.z, self.max.z),
        )
    }

    /// Whether the cell at `point` is inside this box.
    pub fn contains(&self, point: GridPoint) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }
}

impl fmt::Debug for GridBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { min, max } = self;
        write!(
            f,
            "GridBox({:?}..={:?}, {:?}..={:?}, {:?}..={:?})",
            min.x, max.x, min.y, max.y, min.z, max.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::point3;
    use pretty_assertions::assert_eq;

    #[test]
    fn size_is_inclusive() {
        let b = GridBox::from_min_max([-2, 0, 10], [2, 0, 19]).unwrap();
        assert_eq!(b.size(), size3(5, 1, 10));
        assert_eq!(GridBox::ORIGIN_CELL.size(), size3(1, 1, 1));
    }

    #[test]
    fn size_does_not_overflow() {
        let b = GridBox::from_min_max(
            [GridCoordinate::MIN, 0, 0],
            [GridCoordinate::MAX, 0, 0],
        )
        .unwrap();
        assert_eq!(b.size().width, u32::MAX);
    }

    #[test]
    fn inverted_is_rejected() {
        assert_eq!(GridBox::from_min_max([1, 0, 0], [0, 0, 0]), None);
    }

    #[test]
    fn enclosing_empty() {
        assert_eq!(GridBox::enclosing(Vec::<GridPoint>::new()), None);
    }

    #[test]
    fn contains_corners() {
        let b = GridBox::from_min_max([0, 0, 0], [3, 3, 3]).unwrap();
        assert!(b.contains(point3(0, 0, 0)));
        assert!(b.contains(point3(3, 3, 3)));
        assert!(!b.contains(point3(4, 0, 0)));
        assert!(!b.contains(point3(0, -1, 0)));
    }

    #[test]
    fn debug() {
        assert_eq!(
            format!("{:?}", GridBox::from_min_max([0, 1, 2], [3, 4, 5]).unwrap()),
            "GridBox(0..=3, 1..=4, 2..=5)"
        );
    }
}
