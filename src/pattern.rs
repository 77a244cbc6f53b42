//! Fixed patterns that don't come from a goal map.

use crate::model::{GridObject, Position};

/// Default side length of the cross grid.
pub const DEFAULT_CROSS_SIZE: u32 = 11;

/// Distances from the center at which the diagonals carry a polyanet.
const CROSS_ARMS: [u32; 3] = [2, 3, 4];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("cross size must be odd so it has a center cell, got {0}")]
    EvenSize(u32),

    #[error("cross size {0} is too small for arms reaching {1} cells from the center")]
    TooSmall(u32, u32),
}

/// An X of polyanets centered in a `size` × `size` grid.
///
/// Both diagonals get a polyanet at each arm distance, plus one on the
/// center cell. Objects are ordered arm by arm, center last.
pub fn cross(size: u32) -> Result<Vec<GridObject>, PatternError> {
    if size % 2 == 0 {
        return Err(PatternError::EvenSize(size));
    }
    let center = size / 2;
    let reach = CROSS_ARMS.iter().copied().max().unwrap_or(0);
    if center < reach {
        return Err(PatternError::TooSmall(size, reach));
    }

    let at = |row, column| GridObject::Polyanet {
        position: Position::new(row, column),
    };

    let mut objects = Vec::with_capacity(CROSS_ARMS.len() * 4 + 1);
    for d in CROSS_ARMS {
        objects.push(at(center - d, center - d));
        objects.push(at(center + d, center + d));
        objects.push(at(center - d, center + d));
        objects.push(at(center + d, center - d));
    }
    objects.push(at(center, center));
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn default_cross_has_thirteen_polyanets_on_the_diagonals() {
        let objects = cross(DEFAULT_CROSS_SIZE).unwrap();
        assert_eq!(objects.len(), 13);

        let positions: HashSet<(u32, u32)> = objects
            .iter()
            .map(|object| {
                assert!(matches!(object, GridObject::Polyanet { .. }));
                let Position { row, column } = object.position();
                (row, column)
            })
            .collect();

        let diagonal = [1, 2, 3, 5, 7, 8, 9].map(|i| (i, i));
        let anti_diagonal = [1, 2, 3, 7, 8, 9].map(|i| (i, 10 - i));
        let expected: HashSet<(u32, u32)> = diagonal.into_iter().chain(anti_diagonal).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn center_comes_last() {
        let objects = cross(13).unwrap();
        assert_eq!(objects.last().unwrap().position(), Position::new(6, 6));
    }

    #[test]
    fn even_size_is_rejected() {
        assert_eq!(cross(10).unwrap_err(), PatternError::EvenSize(10));
    }

    #[test]
    fn size_too_small_for_arms_is_rejected() {
        assert_eq!(cross(7).unwrap_err(), PatternError::TooSmall(7, 4));
    }
}
