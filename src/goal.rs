//! Goal map parsing.
//!
//! The API describes the target grid as rows of string labels:
//!
//! ```text
//! {"goal": [["SPACE", "POLYANET", "SPACE"],
//!           ["RED_SOLOON", "SPACE", "UP_COMETH"]]}
//! ```
//!
//! Parsing is deliberately permissive. Labels that don't match a known
//! pattern produce nothing rather than an error, so a goal map that grows new
//! vocabulary still yields every object we know how to build.
//!
//! Only the property-first form is understood (`BLUE_SOLOON`, `UP_COMETH`).
//! Suffix-first labels such as `SOLOON_BLUE` are skipped like any other
//! unknown label.

use serde::Deserialize;

use crate::model::{Color, Direction, GridObject, Position};

const SPACE: &str = "SPACE";
const POLYANET: &str = "POLYANET";
const SOLOON_SUFFIX: &str = "_SOLOON";
const COMETH_SUFFIX: &str = "_COMETH";

/// The target grid as returned by `GET /map/{candidateId}/goal`.
///
/// `null` cells are kept as `None` and treated like `SPACE`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GoalMap {
    #[serde(default)]
    pub goal: Vec<Vec<Option<String>>>,
}

impl GoalMap {
    /// Build a goal map from label rows. Mostly useful in tests.
    #[cfg(test)]
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            goal: rows
                .iter()
                .map(|row| row.iter().map(|cell| Some((*cell).to_string())).collect())
                .collect(),
        }
    }
}

/// Flatten a goal map into the objects it asks for, in row-major order.
pub fn parse(map: &GoalMap) -> Vec<GridObject> {
    let mut objects = Vec::new();
    for (row, cells) in (0u32..).zip(&map.goal) {
        for (column, cell) in (0u32..).zip(cells) {
            let Some(label) = cell.as_deref() else {
                continue;
            };
            if let Some(object) = parse_label(label, Position::new(row, column)) {
                objects.push(object);
            }
        }
    }
    objects
}

/// Interpret a single cell label. `None` means "nothing to build here".
fn parse_label(label: &str, position: Position) -> Option<GridObject> {
    if label == SPACE {
        return None;
    }
    if label == POLYANET {
        return Some(GridObject::Polyanet { position });
    }
    if let Some(prefix) = label.strip_suffix(SOLOON_SUFFIX) {
        let color = prefix.parse::<Color>().ok()?;
        return Some(GridObject::Soloon { position, color });
    }
    if let Some(prefix) = label.strip_suffix(COMETH_SUFFIX) {
        let direction = prefix.parse::<Direction>().ok()?;
        return Some(GridObject::Cometh {
            position,
            direction,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polyanet(row: u32, column: u32) -> GridObject {
        GridObject::Polyanet {
            position: Position::new(row, column),
        }
    }

    fn soloon(row: u32, column: u32, color: Color) -> GridObject {
        GridObject::Soloon {
            position: Position::new(row, column),
            color,
        }
    }

    fn cometh(row: u32, column: u32, direction: Direction) -> GridObject {
        GridObject::Cometh {
            position: Position::new(row, column),
            direction,
        }
    }

    #[test]
    fn parses_mixed_grid_in_scan_order() {
        let map = GoalMap::from_rows(&[
            &["SPACE", "POLYANET", "SPACE"],
            &["RED_SOLOON", "SPACE", "UP_COMETH"],
            &["SPACE", "SPACE", "SPACE"],
        ]);

        assert_eq!(
            parse(&map),
            vec![
                polyanet(0, 1),
                soloon(1, 0, Color::Red),
                cometh(1, 2, Direction::Up),
            ]
        );
    }

    #[test]
    fn empty_goal_parses_to_nothing() {
        let map: GoalMap = serde_json::from_str(r#"{"goal": []}"#).unwrap();
        assert!(parse(&map).is_empty());
    }

    #[test]
    fn missing_goal_field_parses_to_nothing() {
        let map: GoalMap = serde_json::from_str("{}").unwrap();
        assert!(parse(&map).is_empty());
    }

    #[test]
    fn null_cells_are_skipped() {
        let map: GoalMap = serde_json::from_str(
            r#"{"goal": [
                ["SPACE", null, "POLYANET"],
                [null, "BLUE_SOLOON", null],
                ["SPACE", "UP_COMETH", "SPACE"]
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            parse(&map),
            vec![
                polyanet(0, 2),
                soloon(1, 1, Color::Blue),
                cometh(2, 1, Direction::Up),
            ]
        );
    }

    #[test]
    fn every_color_is_recognized() {
        let map = GoalMap::from_rows(&[
            &["SPACE", "BLUE_SOLOON", "SPACE"],
            &["RED_SOLOON", "SPACE", "PURPLE_SOLOON"],
            &["SPACE", "WHITE_SOLOON", "SPACE"],
        ]);

        assert_eq!(
            parse(&map),
            vec![
                soloon(0, 1, Color::Blue),
                soloon(1, 0, Color::Red),
                soloon(1, 2, Color::Purple),
                soloon(2, 1, Color::White),
            ]
        );
    }

    #[test]
    fn every_direction_is_recognized() {
        let map = GoalMap::from_rows(&[
            &["SPACE", "UP_COMETH", "SPACE"],
            &["LEFT_COMETH", "SPACE", "RIGHT_COMETH"],
            &["SPACE", "DOWN_COMETH", "SPACE"],
        ]);

        assert_eq!(
            parse(&map),
            vec![
                cometh(0, 1, Direction::Up),
                cometh(1, 0, Direction::Left),
                cometh(1, 2, Direction::Right),
                cometh(2, 1, Direction::Down),
            ]
        );
    }

    #[test]
    fn unknown_labels_are_dropped() {
        let map = GoalMap::from_rows(&[
            &["SPACE", "INVALID_OBJECT", "SPACE"],
            &["UNKNOWN_SOLOON", "SPACE", "WRONG_COMETH"],
            &["polyanet", "_SOLOON", "SOLOON"],
        ]);

        assert!(parse(&map).is_empty());
    }

    #[test]
    fn suffix_first_labels_are_not_supported() {
        let map = GoalMap::from_rows(&[&["SOLOON_BLUE", "COMETH_UP"]]);
        assert!(parse(&map).is_empty());
    }

    #[test]
    fn ragged_rows_keep_their_own_column_indices() {
        let map = GoalMap::from_rows(&[&["POLYANET"], &["SPACE", "SPACE", "POLYANET"]]);
        assert_eq!(parse(&map), vec![polyanet(0, 0), polyanet(1, 2)]);
    }

    #[test]
    fn output_never_exceeds_non_space_cells() {
        let map = GoalMap::from_rows(&[
            &["POLYANET", "GREEN_SOLOON", "SPACE", "LEFT_COMETH"],
            &["SPACE", "SPACE", "WHITE_SOLOON", "???"],
        ]);
        let non_space = map
            .goal
            .iter()
            .flatten()
            .filter(|cell| cell.as_deref().is_some_and(|label| label != SPACE))
            .count();

        let objects = parse(&map);
        assert_eq!(objects.len(), 3);
        assert!(objects.len() <= non_space);
    }
}
