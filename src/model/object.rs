//! Grid objects and their on-disk record form.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Color, Direction, Position};

/// The three kinds of object the megaverse knows about.
///
/// Serialized with the API's names so log lines read the same as the goal map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    /// Basic object, no property.
    Polyanet,
    /// Colored object.
    Soloon,
    /// Directional object.
    Cometh,
}

impl ObjectKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Polyanet => "POLYANET",
            Self::Soloon => "SOLOON",
            Self::Cometh => "COMETH",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An object placed at a grid position.
///
/// Each variant carries exactly the property its kind requires, so a soloon
/// without a color or a polyanet with a direction cannot be built.
/// Serializes as a flat [`CreationRecord`], one line of the creation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CreationRecord", into = "CreationRecord")]
pub enum GridObject {
    Polyanet { position: Position },
    Soloon { position: Position, color: Color },
    Cometh { position: Position, direction: Direction },
}

impl GridObject {
    pub const fn position(&self) -> Position {
        match *self {
            Self::Polyanet { position }
            | Self::Soloon { position, .. }
            | Self::Cometh { position, .. } => position,
        }
    }

    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Polyanet { .. } => ObjectKind::Polyanet,
            Self::Soloon { .. } => ObjectKind::Soloon,
            Self::Cometh { .. } => ObjectKind::Cometh,
        }
    }
}

/// `POLYANET at (0, 1)`, `RED SOLOON at (1, 0)`, `UP COMETH at (1, 2)`.
impl fmt::Display for GridObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polyanet { position } => write!(f, "POLYANET at {position}"),
            Self::Soloon { position, color } => {
                write!(f, "{} SOLOON at {position}", color.as_str().to_uppercase())
            }
            Self::Cometh {
                position,
                direction,
            } => write!(
                f,
                "{} COMETH at {position}",
                direction.as_str().to_uppercase()
            ),
        }
    }
}

/// The flat shape of one creation log line:
/// `{"row": 1, "column": 0, "type": "SOLOON", "color": "red"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationRecord {
    pub row: u32,
    pub column: u32,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

/// A record whose property fields don't match its kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("SOLOON record at ({row}, {column}) has no color")]
    MissingColor { row: u32, column: u32 },

    #[error("COMETH record at ({row}, {column}) has no direction")]
    MissingDirection { row: u32, column: u32 },

    #[error("{kind} record at ({row}, {column}) must not carry a {field}")]
    UnexpectedField {
        kind: ObjectKind,
        field: &'static str,
        row: u32,
        column: u32,
    },
}

impl From<GridObject> for CreationRecord {
    fn from(object: GridObject) -> Self {
        let Position { row, column } = object.position();
        let (color, direction) = match object {
            GridObject::Polyanet { .. } => (None, None),
            GridObject::Soloon { color, .. } => (Some(color), None),
            GridObject::Cometh { direction, .. } => (None, Some(direction)),
        };
        Self {
            row,
            column,
            kind: object.kind(),
            color,
            direction,
        }
    }
}

impl TryFrom<CreationRecord> for GridObject {
    type Error = RecordError;

    fn try_from(record: CreationRecord) -> Result<Self, Self::Error> {
        let CreationRecord {
            row,
            column,
            kind,
            color,
            direction,
        } = record;
        let position = Position::new(row, column);
        let unexpected = |field| RecordError::UnexpectedField {
            kind,
            field,
            row,
            column,
        };

        match kind {
            ObjectKind::Polyanet => {
                if color.is_some() {
                    return Err(unexpected("color"));
                }
                if direction.is_some() {
                    return Err(unexpected("direction"));
                }
                Ok(Self::Polyanet { position })
            }
            ObjectKind::Soloon => {
                if direction.is_some() {
                    return Err(unexpected("direction"));
                }
                let color = color.ok_or(RecordError::MissingColor { row, column })?;
                Ok(Self::Soloon { position, color })
            }
            ObjectKind::Cometh => {
                if color.is_some() {
                    return Err(unexpected("color"));
                }
                let direction = direction.ok_or(RecordError::MissingDirection { row, column })?;
                Ok(Self::Cometh {
                    position,
                    direction,
                })
            }
        }
    }
}
