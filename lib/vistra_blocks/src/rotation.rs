//! Quarter-turn rotations about the vertical axis and their action on block states.
use kstring::KString;
use smallvec::SmallVec;

use crate::property::PropertyValue;
use crate::state::{BlockState, StateError};
use crate::tags::{Axis, Direction, EnumValue, RailShape};

/// A rotation about the vertical axis in 90-degree increments.
///
/// Forms a cyclic group of order 4 under [`Self::then`], with [`Rotation::None`] as
/// the identity.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// A 90-degree clockwise turn (viewed from above).
    Clockwise,
    /// A 90-degree counter-clockwise turn.
    CounterClockwise,
    /// A 180-degree turn.
    Flip,
}

impl Rotation {
    /// Every rotation, identity first.
    pub const ALL: &'static [Rotation] = &[
        Rotation::None,
        Rotation::Clockwise,
        Rotation::CounterClockwise,
        Rotation::Flip,
    ];

    /// The composition `other` applied after `self`.
    pub const fn then(self, other: Rotation) -> Rotation {
        match other {
            Rotation::None => self,
            Rotation::Clockwise => match self {
                Rotation::None => Rotation::Clockwise,
                Rotation::Clockwise => Rotation::Flip,
                Rotation::CounterClockwise => Rotation::None,
                Rotation::Flip => Rotation::CounterClockwise,
            },
            Rotation::CounterClockwise => match self {
                Rotation::None => Rotation::CounterClockwise,
                Rotation::Clockwise => Rotation::None,
                Rotation::CounterClockwise => Rotation::Flip,
                Rotation::Flip => Rotation::Clockwise,
            },
            Rotation::Flip => match self {
                Rotation::None => Rotation::Flip,
                Rotation::Clockwise => Rotation::CounterClockwise,
                Rotation::CounterClockwise => Rotation::Clockwise,
                Rotation::Flip => Rotation::None,
            },
        }
    }

    /// The rotation undoing `self`.
    pub const fn inverse(self) -> Rotation {
        match self {
            Rotation::None => Rotation::None,
            Rotation::Clockwise => Rotation::CounterClockwise,
            Rotation::CounterClockwise => Rotation::Clockwise,
            Rotation::Flip => Rotation::Flip,
        }
    }

    /// The rotation expressed in 16ths of a full turn, clockwise.
    const fn sixteenth_steps(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise => 4,
            Rotation::CounterClockwise => 12,
            Rotation::Flip => 8,
        }
    }
}

impl Direction {
    /// The direction after applying `rotation`. Up and down are fixed points.
    pub const fn rotated(self, rotation: Rotation) -> Direction {
        match self {
            Direction::Up | Direction::Down => self,
            _ => match rotation {
                Rotation::None => self,
                Rotation::Flip => self.opposite(),
                Rotation::Clockwise => match self {
                    Direction::North => Direction::East,
                    Direction::East => Direction::South,
                    Direction::South => Direction::West,
                    _ => Direction::North,
                },
                Rotation::CounterClockwise => match self {
                    Direction::North => Direction::West,
                    Direction::West => Direction::South,
                    Direction::South => Direction::East,
                    _ => Direction::North,
                },
            },
        }
    }
}

impl Axis {
    /// The axis after applying `rotation`. The vertical axis is a fixed point, and a
    /// half turn maps every axis to itself.
    pub const fn rotated(self, rotation: Rotation) -> Axis {
        match (self, rotation) {
            (Axis::X, Rotation::Clockwise | Rotation::CounterClockwise) => Axis::Z,
            (Axis::Z, Rotation::Clockwise | Rotation::CounterClockwise) => Axis::X,
            _ => self,
        }
    }
}

impl RailShape {
    /// The rail shape after applying `rotation`. Closed over the full family and
    /// over the straight-only subset separately.
    pub const fn rotated(self, rotation: Rotation) -> RailShape {
        match rotation {
            Rotation::None => self,
            Rotation::Clockwise => match self {
                RailShape::NorthSouth => RailShape::EastWest,
                RailShape::EastWest => RailShape::NorthSouth,
                RailShape::AscendingNorth => RailShape::AscendingEast,
                RailShape::AscendingEast => RailShape::AscendingSouth,
                RailShape::AscendingSouth => RailShape::AscendingWest,
                RailShape::AscendingWest => RailShape::AscendingNorth,
                RailShape::SouthEast => RailShape::SouthWest,
                RailShape::SouthWest => RailShape::NorthWest,
                RailShape::NorthWest => RailShape::NorthEast,
                RailShape::NorthEast => RailShape::SouthEast,
            },
            Rotation::CounterClockwise => match self {
                RailShape::NorthSouth => RailShape::EastWest,
                RailShape::EastWest => RailShape::NorthSouth,
                RailShape::AscendingNorth => RailShape::AscendingWest,
                RailShape::AscendingWest => RailShape::AscendingSouth,
                RailShape::AscendingSouth => RailShape::AscendingEast,
                RailShape::AscendingEast => RailShape::AscendingNorth,
                RailShape::SouthEast => RailShape::NorthEast,
                RailShape::NorthEast => RailShape::NorthWest,
                RailShape::NorthWest => RailShape::SouthWest,
                RailShape::SouthWest => RailShape::SouthEast,
            },
            Rotation::Flip => match self {
                RailShape::NorthSouth => RailShape::NorthSouth,
                RailShape::EastWest => RailShape::EastWest,
                RailShape::AscendingNorth => RailShape::AscendingSouth,
                RailShape::AscendingSouth => RailShape::AscendingNorth,
                RailShape::AscendingEast => RailShape::AscendingWest,
                RailShape::AscendingWest => RailShape::AscendingEast,
                RailShape::SouthEast => RailShape::NorthWest,
                RailShape::NorthWest => RailShape::SouthEast,
                RailShape::SouthWest => RailShape::NorthEast,
                RailShape::NorthEast => RailShape::SouthWest,
            },
        }
    }
}

fn cardinal_key(key: &str) -> Option<Direction> {
    match key {
        "north" => Some(Direction::North),
        "east" => Some(Direction::East),
        "south" => Some(Direction::South),
        "west" => Some(Direction::West),
        _ => None,
    }
}

impl<'r> BlockState<'r> {
    /// The state reached by rotating this one about the vertical axis.
    ///
    /// The transform is table-driven over known property categories: alignment axes,
    /// facing directions, the 16-step `rotation` index, rail shapes, and the
    /// north/east/south/west connection quartet (whose values migrate between the
    /// four sibling properties, provided the full quartet is applied). Properties
    /// outside those categories keep their value; the 12-value `orientation` enum is
    /// refused with [`StateError::UnsupportedRotation`] rather than corrupted.
    pub fn rotate(self, rotation: Rotation) -> Result<Self, StateError> {
        let block = self.block();
        let block_properties = block.properties();
        if rotation == Rotation::None || block_properties.is_empty() {
            return Ok(self);
        }

        let values: SmallVec<[PropertyValue; 4]> = self.data().values.clone();
        let mut target = values.clone();
        // Slots of the north/east/south/west quartet, in that order.
        let mut cardinal_slots: [Option<usize>; 4] = [None; 4];

        for (slot, property) in block_properties.iter().enumerate() {
            let value = values[slot];
            match (property.key(), value) {
                ("axis", PropertyValue::Enum(EnumValue::Axis(axis))) => {
                    target[slot] = axis.rotated(rotation).into();
                }
                (
                    "facing" | "vertical_direction",
                    PropertyValue::Enum(EnumValue::Direction(direction)),
                ) => {
                    target[slot] = direction.rotated(rotation).into();
                }
                ("rotation", PropertyValue::Int(step)) => {
                    target[slot] = PropertyValue::Int((step + rotation.sixteenth_steps()) % 16);
                }
                ("shape", PropertyValue::Enum(EnumValue::RailShape(shape))) => {
                    target[slot] = shape.rotated(rotation).into();
                }
                ("orientation", PropertyValue::Enum(EnumValue::Orientation(_))) => {
                    return Err(StateError::UnsupportedRotation {
                        block: block.key().clone(),
                        property: KString::from_ref(property.key()),
                    });
                }
                (key, _) => {
                    if let Some(direction) = cardinal_key(key) {
                        cardinal_slots[cardinal_index(direction)] = Some(slot);
                    }
                }
            }
        }

        // The connection quartet rotates as a unit: the value now facing `d` is the
        // one that faced `d` before the rotation was applied. Values only migrate
        // when every one of them lands inside its destination property's domain, so
        // a block mixing quartet kinds is left alone instead of failing the walk.
        if let [Some(north), Some(east), Some(south), Some(west)] = cardinal_slots {
            let slots = [north, east, south, west];
            let inverse = rotation.inverse();
            let mut migrated = [PropertyValue::Bool(false); 4];
            let mut compatible = true;
            for (index, &direction) in Direction::CARDINAL.iter().enumerate() {
                let source = cardinal_index(direction.rotated(inverse));
                let value = values[slots[source]];
                if !block_properties[slots[index]].contains(value) {
                    compatible = false;
                    break;
                }
                migrated[index] = value;
            }
            if compatible {
                for (index, &slot) in slots.iter().enumerate() {
                    target[slot] = migrated[index];
                }
            }
        }

        // The state space is closed under single-property substitution, so the
        // target assignment is reachable by stepping one property at a time.
        let mut state = self;
        for (slot, property) in block_properties.iter().enumerate() {
            if target[slot] != values[slot] {
                state = state.set(property, target[slot])?;
            }
        }
        Ok(state)
    }
}

const fn cardinal_index(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
        // Callers only pass cardinal directions.
        Direction::Up | Direction::Down => usize::MAX,
    }
}
