/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u16;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u32;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(d_row.try_into().ok()?)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(d_col.try_into().ok()?)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterates the up-to-8 in-board neighbors of `center`, row-major.
pub fn neighbors(center: Coord2, bounds: Coord2) -> impl Iterator<Item = Coord2> {
    DISPLACEMENTS
        .iter()
        .filter_map(move |&delta| apply_delta(center, delta, bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn neighbors_clip_at_corners() {
        let found: Vec<_> = neighbors((0, 0), (3, 3)).collect();
        assert_eq!(found, [(0, 1), (1, 0), (1, 1)]);

        let found: Vec<_> = neighbors((2, 2), (3, 3)).collect();
        assert_eq!(found, [(1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn neighbors_full_ring_in_interior() {
        assert_eq!(neighbors((1, 1), (3, 3)).count(), 8);
    }

    #[test]
    fn neighbors_of_single_cell_board_are_empty() {
        assert_eq!(neighbors((0, 0), (1, 1)).count(), 0);
    }

    #[test]
    fn mult_covers_the_full_coord_range() {
        assert_eq!(mult(3, 4), 12);
        assert_eq!(mult(Coord::MAX, Coord::MAX), 4294836225);
    }
}
