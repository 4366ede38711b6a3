//! Closed tag sets usable as enum-property value domains.
//!
//! Every tag carries a canonical lowercase serialized name; enum properties admit an
//! ordered subset of one family and parse strings against these names.
use std::fmt::{Display, Formatter};

macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $serialized:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every member of this tag family, in canonical order.
            pub const ALL: &'static [$name] = &[ $(Self::$variant),+ ];

            /// The canonical lowercase serialized name of this tag.
            pub const fn serialized_name(self) -> &'static str {
                match self {
                    $( Self::$variant => $serialized, )+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.serialized_name())
            }
        }

        impl From<$name> for EnumValue {
            fn from(value: $name) -> Self {
                EnumValue::$name(value)
            }
        }

        impl From<$name> for crate::property::PropertyValue {
            fn from(value: $name) -> Self {
                Self::Enum(EnumValue::$name(value))
            }
        }
    };
}

tag_enum! {
    /// A block alignment axis.
    Axis {
        /// East-west alignment.
        X => "x",
        /// Vertical alignment.
        Y => "y",
        /// North-south alignment.
        Z => "z",
    }
}

tag_enum! {
    /// A grid-aligned facing direction.
    Direction {
        /// Negative y.
        Down => "down",
        /// Positive y.
        Up => "up",
        /// Negative z.
        North => "north",
        /// Positive z.
        South => "south",
        /// Negative x.
        West => "west",
        /// Positive x.
        East => "east",
    }
}

impl Direction {
    /// The direction with the sign flipped (north -> south etc.).
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// The four horizontal directions in clockwise order starting at north.
    pub const CARDINAL: &'static [Direction] = &[
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

tag_enum! {
    /// The surface a button/lever-like block is attached to.
    AttachFace {
        /// Attached to the floor.
        Floor => "floor",
        /// Attached to a wall.
        Wall => "wall",
        /// Attached to the ceiling.
        Ceiling => "ceiling",
    }
}

tag_enum! {
    /// The vertical half a stair/trapdoor-like block occupies.
    Half {
        /// Upper half of the voxel.
        Top => "top",
        /// Lower half of the voxel.
        Bottom => "bottom",
    }
}

tag_enum! {
    /// Which half of a two-block-tall block this is.
    DoubleBlockHalf {
        /// The upper block.
        Upper => "upper",
        /// The lower block.
        Lower => "lower",
    }
}

tag_enum! {
    /// Wall connection height towards one cardinal direction.
    WallSide {
        /// No connection.
        None => "none",
        /// Low connection.
        Low => "low",
        /// Tall connection.
        Tall => "tall",
    }
}

tag_enum! {
    /// Redstone wire connection shape towards one cardinal direction.
    RedstoneSide {
        /// Climbing up the adjacent block face.
        Up => "up",
        /// Flat connection.
        Side => "side",
        /// No connection.
        None => "none",
    }
}

tag_enum! {
    /// The shape of a rail block.
    RailShape {
        /// Straight along z.
        NorthSouth => "north_south",
        /// Straight along x.
        EastWest => "east_west",
        /// Sloping upwards towards east.
        AscendingEast => "ascending_east",
        /// Sloping upwards towards west.
        AscendingWest => "ascending_west",
        /// Sloping upwards towards north.
        AscendingNorth => "ascending_north",
        /// Sloping upwards towards south.
        AscendingSouth => "ascending_south",
        /// Curve connecting south and east.
        SouthEast => "south_east",
        /// Curve connecting south and west.
        SouthWest => "south_west",
        /// Curve connecting north and west.
        NorthWest => "north_west",
        /// Curve connecting north and east.
        NorthEast => "north_east",
    }
}

impl RailShape {
    /// The straight-only subset admitted by powered/detector/activator rails.
    pub const STRAIGHT: &'static [RailShape] = &[
        RailShape::NorthSouth,
        RailShape::EastWest,
        RailShape::AscendingEast,
        RailShape::AscendingWest,
        RailShape::AscendingNorth,
        RailShape::AscendingSouth,
    ];
}

tag_enum! {
    /// Which part of the voxel a slab occupies.
    SlabType {
        /// Upper half.
        Top => "top",
        /// Lower half.
        Bottom => "bottom",
        /// Both halves.
        Double => "double",
    }
}

tag_enum! {
    /// How a chest is joined with its neighbour.
    ChestType {
        /// Not joined.
        Single => "single",
        /// Left half of a double chest.
        Left => "left",
        /// Right half of a double chest.
        Right => "right",
    }
}

tag_enum! {
    /// Corner shape of a stairs block.
    StairsShape {
        /// No corner.
        Straight => "straight",
        /// Inner corner turning left.
        InnerLeft => "inner_left",
        /// Inner corner turning right.
        InnerRight => "inner_right",
        /// Outer corner turning left.
        OuterLeft => "outer_left",
        /// Outer corner turning right.
        OuterRight => "outer_right",
    }
}

tag_enum! {
    /// Which end of a bed this block is.
    BedPart {
        /// The pillow end.
        Head => "head",
        /// The blanket end.
        Foot => "foot",
    }
}

tag_enum! {
    /// Operating mode of a redstone comparator.
    ComparatorMode {
        /// Signal comparison.
        Compare => "compare",
        /// Signal subtraction.
        Subtract => "subtract",
    }
}

tag_enum! {
    /// Which side a door's hinge is on.
    DoorHinge {
        /// Hinge on the left.
        Left => "left",
        /// Hinge on the right.
        Right => "right",
    }
}

tag_enum! {
    /// The kind of a piston head.
    PistonType {
        /// Regular piston.
        Normal => "normal",
        /// Sticky piston.
        Sticky => "sticky",
    }
}

tag_enum! {
    /// Leaf size on a bamboo stalk.
    BambooLeaves {
        /// No leaves.
        None => "none",
        /// Small leaves.
        Small => "small",
        /// Large leaves.
        Large => "large",
    }
}

tag_enum! {
    /// Tilt stage of a big dripleaf.
    Tilt {
        /// Level.
        None => "none",
        /// About to tilt.
        Unstable => "unstable",
        /// Partially tilted.
        Partial => "partial",
        /// Fully tilted.
        Full => "full",
    }
}

tag_enum! {
    /// Thickness of a dripstone segment.
    DripstoneThickness {
        /// Tip merged with the opposing spike.
        TipMerge => "tip_merge",
        /// Free-standing tip.
        Tip => "tip",
        /// Frustum segment.
        Frustum => "frustum",
        /// Middle segment.
        Middle => "middle",
        /// Base segment.
        Base => "base",
    }
}

tag_enum! {
    /// How a bell is mounted.
    BellAttachment {
        /// Standing on the floor.
        Floor => "floor",
        /// Hanging from the ceiling.
        Ceiling => "ceiling",
        /// Mounted on one wall.
        SingleWall => "single_wall",
        /// Mounted between two walls.
        DoubleWall => "double_wall",
    }
}

tag_enum! {
    /// Instrument of a note block, derived from the block below it.
    NoteBlockInstrument {
        /// Piano.
        Harp => "harp",
        /// Bass drum.
        Basedrum => "basedrum",
        /// Snare drum.
        Snare => "snare",
        /// Hi-hat.
        Hat => "hat",
        /// Double bass.
        Bass => "bass",
        /// Flute.
        Flute => "flute",
        /// Bell.
        Bell => "bell",
        /// Guitar.
        Guitar => "guitar",
        /// Chimes.
        Chime => "chime",
        /// Xylophone.
        Xylophone => "xylophone",
        /// Vibraphone.
        IronXylophone => "iron_xylophone",
        /// Cow bell.
        CowBell => "cow_bell",
        /// Didgeridoo.
        Didgeridoo => "didgeridoo",
        /// Square wave.
        Bit => "bit",
        /// Banjo.
        Banjo => "banjo",
        /// Electric piano.
        Pling => "pling",
    }
}

tag_enum! {
    /// Operating mode of a structure block.
    StructureMode {
        /// Save mode.
        Save => "save",
        /// Load mode.
        Load => "load",
        /// Corner marker mode.
        Corner => "corner",
        /// Data marker mode.
        Data => "data",
    }
}

tag_enum! {
    /// Activation phase of a sculk sensor.
    SculkSensorPhase {
        /// Waiting for vibrations.
        Inactive => "inactive",
        /// Emitting a signal.
        Active => "active",
        /// Cooling down.
        Cooldown => "cooldown",
    }
}

tag_enum! {
    /// One of the twelve jigsaw-style 3D orientations (forward direction + rotation).
    Orientation {
        /// Facing down, handle east.
        DownEast => "down_east",
        /// Facing down, handle north.
        DownNorth => "down_north",
        /// Facing down, handle south.
        DownSouth => "down_south",
        /// Facing down, handle west.
        DownWest => "down_west",
        /// Facing up, handle east.
        UpEast => "up_east",
        /// Facing up, handle north.
        UpNorth => "up_north",
        /// Facing up, handle south.
        UpSouth => "up_south",
        /// Facing up, handle west.
        UpWest => "up_west",
        /// Facing west, handle up.
        WestUp => "west_up",
        /// Facing east, handle up.
        EastUp => "east_up",
        /// Facing north, handle up.
        NorthUp => "north_up",
        /// Facing south, handle up.
        SouthUp => "south_up",
    }
}

/// A value drawn from one of the closed tag families above.
///
/// Enum properties store these; dispatching on the family (and the owning property's
/// key) is what drives the rotation transform.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(missing_docs)] // variant names mirror the wrapped family type
pub enum EnumValue {
    Axis(Axis),
    Direction(Direction),
    AttachFace(AttachFace),
    Half(Half),
    DoubleBlockHalf(DoubleBlockHalf),
    WallSide(WallSide),
    RedstoneSide(RedstoneSide),
    RailShape(RailShape),
    SlabType(SlabType),
    ChestType(ChestType),
    StairsShape(StairsShape),
    BedPart(BedPart),
    ComparatorMode(ComparatorMode),
    DoorHinge(DoorHinge),
    PistonType(PistonType),
    BambooLeaves(BambooLeaves),
    Tilt(Tilt),
    DripstoneThickness(DripstoneThickness),
    BellAttachment(BellAttachment),
    NoteBlockInstrument(NoteBlockInstrument),
    StructureMode(StructureMode),
    SculkSensorPhase(SculkSensorPhase),
    Orientation(Orientation),
}

impl EnumValue {
    /// The canonical lowercase serialized name of the wrapped tag.
    pub const fn serialized_name(self) -> &'static str {
        match self {
            EnumValue::Axis(v) => v.serialized_name(),
            EnumValue::Direction(v) => v.serialized_name(),
            EnumValue::AttachFace(v) => v.serialized_name(),
            EnumValue::Half(v) => v.serialized_name(),
            EnumValue::DoubleBlockHalf(v) => v.serialized_name(),
            EnumValue::WallSide(v) => v.serialized_name(),
            EnumValue::RedstoneSide(v) => v.serialized_name(),
            EnumValue::RailShape(v) => v.serialized_name(),
            EnumValue::SlabType(v) => v.serialized_name(),
            EnumValue::ChestType(v) => v.serialized_name(),
            EnumValue::StairsShape(v) => v.serialized_name(),
            EnumValue::BedPart(v) => v.serialized_name(),
            EnumValue::ComparatorMode(v) => v.serialized_name(),
            EnumValue::DoorHinge(v) => v.serialized_name(),
            EnumValue::PistonType(v) => v.serialized_name(),
            EnumValue::BambooLeaves(v) => v.serialized_name(),
            EnumValue::Tilt(v) => v.serialized_name(),
            EnumValue::DripstoneThickness(v) => v.serialized_name(),
            EnumValue::BellAttachment(v) => v.serialized_name(),
            EnumValue::NoteBlockInstrument(v) => v.serialized_name(),
            EnumValue::StructureMode(v) => v.serialized_name(),
            EnumValue::SculkSensorPhase(v) => v.serialized_name(),
            EnumValue::Orientation(v) => v.serialized_name(),
        }
    }
}

impl Display for EnumValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.serialized_name())
    }
}

#[cfg(test)]
mod test {
    use hashbrown::HashSet;

    use super::*;

    #[test]
    fn serialized_names_are_lowercase_and_unique_per_family() {
        fn check(names: Vec<&'static str>) {
            let mut seen = HashSet::new();
            for name in names {
                assert_eq!(name, name.to_ascii_lowercase());
                assert!(seen.insert(name), "duplicate name {name}");
            }
        }
        check(Direction::ALL.iter().map(|d| d.serialized_name()).collect());
        check(RailShape::ALL.iter().map(|s| s.serialized_name()).collect());
        check(Orientation::ALL.iter().map(|o| o.serialized_name()).collect());
        check(
            NoteBlockInstrument::ALL
                .iter()
                .map(|i| i.serialized_name())
                .collect(),
        );
    }

    #[test]
    fn direction_opposites_are_involutions() {
        for &dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn enum_value_display_matches_tag_display() {
        let value = EnumValue::from(RailShape::AscendingEast);
        assert_eq!(value.to_string(), "ascending_east");
        assert_eq!(value.serialized_name(), RailShape::AscendingEast.serialized_name());
    }
}
