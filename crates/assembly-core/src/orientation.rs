//! Conveyor orientation table.
//!
//! Every conveyor tile names the corner it receives from and the corner it
//! delivers to. The isometric corners map onto axis-aligned grid offsets,
//! so each of the twelve tile keys resolves to exactly one
//! (input offset, output offset) pair.

use crate::position::Offset;

/// Isometric tile corner a conveyor connects through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    SouthWest,
    SouthEast,
    NorthWest,
    NorthEast,
}

impl Corner {
    pub fn offset(self) -> Offset {
        match self {
            Corner::SouthWest => Offset::new(-1, 0),
            Corner::NorthEast => Offset::new(1, 0),
            Corner::SouthEast => Offset::new(0, -1),
            Corner::NorthWest => Offset::new(0, 1),
        }
    }
}

/// Input and output corners of one conveyor tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConveyorOrientation {
    pub input: Corner,
    pub output: Corner,
}

impl ConveyorOrientation {
    pub fn input_offset(&self) -> Offset {
        self.input.offset()
    }

    pub fn output_offset(&self) -> Offset {
        self.output.offset()
    }
}

use Corner::*;

/// All conveyor tile keys with their orientation. Constant for the process.
pub static CONVEYOR_ORIENTATIONS: [(&str, ConveyorOrientation); 12] = [
    ("conveyors_anim_swne", ConveyorOrientation { input: SouthWest, output: NorthEast }),
    ("conveyors_anim_swnw", ConveyorOrientation { input: SouthWest, output: NorthWest }),
    ("conveyors_anim_swse", ConveyorOrientation { input: SouthWest, output: SouthEast }),
    ("conveyors_anim_senw", ConveyorOrientation { input: SouthEast, output: NorthWest }),
    ("conveyors_anim_sene", ConveyorOrientation { input: SouthEast, output: NorthEast }),
    ("conveyors_anim_sesw", ConveyorOrientation { input: SouthEast, output: SouthWest }),
    ("conveyors_anim_nwse", ConveyorOrientation { input: NorthWest, output: SouthEast }),
    ("conveyors_anim_nwsw", ConveyorOrientation { input: NorthWest, output: SouthWest }),
    ("conveyors_anim_nwne", ConveyorOrientation { input: NorthWest, output: NorthEast }),
    ("conveyors_anim_nesw", ConveyorOrientation { input: NorthEast, output: SouthWest }),
    ("conveyors_anim_nese", ConveyorOrientation { input: NorthEast, output: SouthEast }),
    ("conveyors_anim_nenw", ConveyorOrientation { input: NorthEast, output: NorthWest }),
];

/// Orientation of the conveyor with this normalized key, if it is one.
pub fn conveyor_orientation(key: &str) -> Option<ConveyorOrientation> {
    CONVEYOR_ORIENTATIONS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, o)| *o)
}

pub fn is_conveyor(key: &str) -> bool {
    conveyor_orientation(key).is_some()
}
