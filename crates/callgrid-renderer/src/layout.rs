use callgrid_core::Orientation;

/// Pixel size of a container or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Row/column split of the grid for a given occupancy.
///
/// One tile is shown full-bleed, two to four share a 2×2 grid, and above
/// four the orientation decides: portrait stacks rows of two, landscape
/// lays out columns of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridShape {
    pub rows: usize,
    pub columns: usize,
}

impl GridShape {
    pub const EMPTY: Self = Self { rows: 0, columns: 0 };

    pub fn for_count(count: usize, orientation: Orientation) -> Self {
        match count {
            0 => Self::EMPTY,
            1 => Self { rows: 1, columns: 1 },
            2..=4 => Self { rows: 2, columns: 2 },
            n => {
                let long_side = n.div_ceil(2);
                match orientation {
                    Orientation::Portrait => Self { rows: long_side, columns: 2 },
                    Orientation::Landscape => Self { rows: 2, columns: long_side },
                }
            }
        }
    }

    pub fn is_full_bleed(&self) -> bool {
        self.rows == 1 && self.columns == 1
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.columns
    }

    /// Size of a single cell inside `container`.
    pub fn cell_extent(&self, container: Extent) -> Extent {
        if self.rows == 0 || self.columns == 0 {
            return Extent::new(0, 0);
        }
        Extent::new(
            container.width / self.columns as u32,
            container.height / self.rows as u32,
        )
    }
}

impl std::fmt::Display for GridShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_grows_with_occupancy() {
        let p = Orientation::Portrait;
        assert_eq!(GridShape::for_count(0, p), GridShape::EMPTY);
        assert!(GridShape::for_count(1, p).is_full_bleed());
        assert_eq!(GridShape::for_count(3, p), GridShape { rows: 2, columns: 2 });
        assert_eq!(GridShape::for_count(4, p).capacity(), 4);
    }

    #[test]
    fn orientation_splits_above_four() {
        assert_eq!(
            GridShape::for_count(5, Orientation::Portrait),
            GridShape { rows: 3, columns: 2 }
        );
        assert_eq!(
            GridShape::for_count(6, Orientation::Landscape),
            GridShape { rows: 2, columns: 3 }
        );
        assert_eq!(
            GridShape::for_count(9, Orientation::Portrait),
            GridShape { rows: 5, columns: 2 }
        );
    }

    #[test]
    fn cell_extent_divides_container() {
        let shape = GridShape { rows: 2, columns: 3 };
        assert_eq!(shape.cell_extent(Extent::new(1920, 1080)), Extent::new(640, 540));
        assert_eq!(GridShape::EMPTY.cell_extent(Extent::new(10, 10)), Extent::new(0, 0));
    }
}
