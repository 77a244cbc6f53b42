//! Core data model for the megaverse.
//!
//! Positions, object properties, and the grid objects built from them.

mod object;
mod position;
mod property;

pub use object::{GridObject, ObjectKind};
pub use position::Position;
pub use property::{Color, Direction};
