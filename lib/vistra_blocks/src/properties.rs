//! The canonical table of block properties shared by all host-platform blocks.
//!
//! Block documents refer to properties by their SCREAMING_SNAKE table names (e.g.
//! `"HORIZONTAL_FACING"`), not their serialized keys, because several table entries
//! share a key with different value domains (`age` 0..=1 up to 0..=25, two `axis`
//! subsets and so on). [`by_platform_name`] additionally accepts the handful of
//! historical spellings some platform exports still emit.
use std::sync::Arc;

use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::property::Property;
use crate::tags::{
    AttachFace, Axis, BambooLeaves, BedPart, BellAttachment, ChestType, ComparatorMode, Direction,
    DoorHinge, DoubleBlockHalf, DripstoneThickness, Half, NoteBlockInstrument, Orientation,
    PistonType, RailShape, RedstoneSide, SculkSensorPhase, SlabType, StairsShape, StructureMode,
    Tilt, WallSide,
};

/// Platform export names that moved since older data dumps, mapped to their
/// current table names.
pub const NAME_REWRITES: &[(&str, &str)] = &[
    ("ROTATION_16", "ROTATION"),
    ("MODE_COMPARATOR", "COMPARATOR_MODE"),
    ("STRUCTUREBLOCK_MODE", "STRUCTURE_BLOCK_MODE"),
    ("NOTEBLOCK_INSTRUMENT", "NOTE_BLOCK_INSTRUMENT"),
];

fn enum_prop<T: Into<crate::tags::EnumValue> + Copy>(key: &str, values: &[T]) -> Property {
    // The table below only admits values from a single family per property, so the
    // canonical names cannot collide.
    Property::enumerated(key, values.iter().map(|&v| v.into()))
        .expect("canonical property table contains a duplicate value name")
}

static TABLE: Lazy<HashMap<&'static str, Arc<Property>>> = Lazy::new(|| {
    let mut table = HashMap::new();
    let mut put = |name: &'static str, property: Property| {
        let prev = table.insert(name, Arc::new(property));
        debug_assert!(prev.is_none(), "duplicate canonical property {name}");
    };

    put("ATTACHED", Property::boolean("attached"));
    put("BERRIES", Property::boolean("berries"));
    put("BOTTOM", Property::boolean("bottom"));
    put("CONDITIONAL", Property::boolean("conditional"));
    put("DISARMED", Property::boolean("disarmed"));
    put("DRAG", Property::boolean("drag"));
    put("ENABLED", Property::boolean("enabled"));
    put("EXTENDED", Property::boolean("extended"));
    put("EYE", Property::boolean("eye"));
    put("FALLING", Property::boolean("falling"));
    put("HANGING", Property::boolean("hanging"));
    put("HAS_BOOK", Property::boolean("has_book"));
    put("HAS_BOTTLE_0", Property::boolean("has_bottle_0"));
    put("HAS_BOTTLE_1", Property::boolean("has_bottle_1"));
    put("HAS_BOTTLE_2", Property::boolean("has_bottle_2"));
    put("HAS_RECORD", Property::boolean("has_record"));
    put("INVERTED", Property::boolean("inverted"));
    put("IN_WALL", Property::boolean("in_wall"));
    put("LIT", Property::boolean("lit"));
    put("LOCKED", Property::boolean("locked"));
    put("OCCUPIED", Property::boolean("occupied"));
    put("OPEN", Property::boolean("open"));
    put("PERSISTENT", Property::boolean("persistent"));
    put("POWERED", Property::boolean("powered"));
    put("SHORT", Property::boolean("short"));
    put("SIGNAL_FIRE", Property::boolean("signal_fire"));
    put("SNOWY", Property::boolean("snowy"));
    put("TRIGGERED", Property::boolean("triggered"));
    put("UNSTABLE", Property::boolean("unstable"));
    put("VINE_END", Property::boolean("vine_end"));
    put("WATERLOGGED", Property::boolean("waterlogged"));

    // Cardinal connection quartet, boolean flavour (fences, panes, vines...).
    put("UP", Property::boolean("up"));
    put("DOWN", Property::boolean("down"));
    put("NORTH", Property::boolean("north"));
    put("EAST", Property::boolean("east"));
    put("SOUTH", Property::boolean("south"));
    put("WEST", Property::boolean("west"));

    put("AXIS", enum_prop("axis", Axis::ALL));
    put("HORIZONTAL_AXIS", enum_prop("axis", &[Axis::X, Axis::Z]));
    put("FACING", enum_prop("facing", Direction::ALL));
    put(
        "FACING_HOPPER",
        enum_prop(
            "facing",
            &[
                Direction::Down,
                Direction::North,
                Direction::South,
                Direction::West,
                Direction::East,
            ],
        ),
    );
    put("HORIZONTAL_FACING", enum_prop("facing", Direction::CARDINAL));
    put(
        "VERTICAL_DIRECTION",
        enum_prop("vertical_direction", &[Direction::Up, Direction::Down]),
    );
    put("ORIENTATION", enum_prop("orientation", Orientation::ALL));
    put("ATTACH_FACE", enum_prop("face", AttachFace::ALL));
    put("BELL_ATTACHMENT", enum_prop("attachment", BellAttachment::ALL));

    // Cardinal connection quartet, wall flavour.
    put("NORTH_WALL", enum_prop("north", WallSide::ALL));
    put("EAST_WALL", enum_prop("east", WallSide::ALL));
    put("SOUTH_WALL", enum_prop("south", WallSide::ALL));
    put("WEST_WALL", enum_prop("west", WallSide::ALL));

    // Cardinal connection quartet, redstone wire flavour.
    put("NORTH_REDSTONE", enum_prop("north", RedstoneSide::ALL));
    put("EAST_REDSTONE", enum_prop("east", RedstoneSide::ALL));
    put("SOUTH_REDSTONE", enum_prop("south", RedstoneSide::ALL));
    put("WEST_REDSTONE", enum_prop("west", RedstoneSide::ALL));

    put("DOUBLE_BLOCK_HALF", enum_prop("half", DoubleBlockHalf::ALL));
    put("HALF", enum_prop("half", Half::ALL));
    put("RAIL_SHAPE", enum_prop("shape", RailShape::ALL));
    put("RAIL_SHAPE_STRAIGHT", enum_prop("shape", RailShape::STRAIGHT));

    put("AGE_1", Property::integer("age", 0, 1));
    put("AGE_2", Property::integer("age", 0, 2));
    put("AGE_3", Property::integer("age", 0, 3));
    put("AGE_5", Property::integer("age", 0, 5));
    put("AGE_7", Property::integer("age", 0, 7));
    put("AGE_15", Property::integer("age", 0, 15));
    put("AGE_25", Property::integer("age", 0, 25));
    put("BITES", Property::integer("bites", 0, 6));
    put("CANDLES", Property::integer("candles", 1, 4));
    put("DELAY", Property::integer("delay", 1, 4));
    put("DISTANCE", Property::integer("distance", 1, 7));
    put("EGGS", Property::integer("eggs", 1, 4));
    put("HATCH", Property::integer("hatch", 0, 2));
    put("LAYERS", Property::integer("layers", 1, 8));
    put("LEVEL", Property::integer("level", 0, 15));
    put("LEVEL_CAULDRON", Property::integer("level", 1, 3));
    put("LEVEL_COMPOSTER", Property::integer("level", 0, 8));
    put("LEVEL_FLOWING", Property::integer("level", 1, 8));
    put("LEVEL_HONEY", Property::integer("honey_level", 0, 5));
    put("MOISTURE", Property::integer("moisture", 0, 7));
    put("NOTE", Property::integer("note", 0, 24));
    put("PICKLES", Property::integer("pickles", 1, 4));
    put("POWER", Property::integer("power", 0, 15));
    put("RESPAWN_ANCHOR_CHARGES", Property::integer("charges", 0, 4));
    put("ROTATION", Property::integer("rotation", 0, 15));
    put("STABILITY_DISTANCE", Property::integer("distance", 0, 7));
    put("STAGE", Property::integer("stage", 0, 1));

    put("BAMBOO_LEAVES", enum_prop("leaves", BambooLeaves::ALL));
    put("BED_PART", enum_prop("part", BedPart::ALL));
    put("CHEST_TYPE", enum_prop("type", ChestType::ALL));
    put("COMPARATOR_MODE", enum_prop("mode", ComparatorMode::ALL));
    put("DOOR_HINGE", enum_prop("hinge", DoorHinge::ALL));
    put("DRIPSTONE_THICKNESS", enum_prop("thickness", DripstoneThickness::ALL));
    put("NOTE_BLOCK_INSTRUMENT", enum_prop("instrument", NoteBlockInstrument::ALL));
    put("PISTON_TYPE", enum_prop("type", PistonType::ALL));
    put("SCULK_SENSOR_PHASE", enum_prop("sculk_sensor_phase", SculkSensorPhase::ALL));
    put("SLAB_TYPE", enum_prop("type", SlabType::ALL));
    put("STAIRS_SHAPE", enum_prop("shape", StairsShape::ALL));
    put("STRUCTURE_BLOCK_MODE", enum_prop("mode", StructureMode::ALL));
    put("TILT", enum_prop("tilt", Tilt::ALL));

    table
});

/// Looks up a canonical property by its exact table name.
pub fn by_name(name: &str) -> Option<&'static Arc<Property>> {
    TABLE.get(name)
}

/// Looks up a canonical property by its platform export name, applying
/// [`NAME_REWRITES`] for spellings that have since moved.
pub fn by_platform_name(name: &str) -> Option<&'static Arc<Property>> {
    let name = NAME_REWRITES
        .iter()
        .find(|(old, _)| *old == name)
        .map_or(name, |(_, new)| *new);
    by_name(name)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::property::{PropertyKind, PropertyValue};
    use crate::tags::Direction;

    #[test]
    fn table_lookups() {
        let facing = by_name("HORIZONTAL_FACING").unwrap();
        assert_eq!(facing.key(), "facing");
        assert_eq!(facing.value_count(), 4);
        assert!(!facing.contains(PropertyValue::Enum(Direction::Up.into())));
        assert!(by_name("NO_SUCH_PROPERTY").is_none());
    }

    #[test]
    fn rewrites_resolve_old_platform_names() {
        for (old, new) in NAME_REWRITES {
            let via_old = by_platform_name(old).unwrap_or_else(|| panic!("{old} missing"));
            let via_new = by_name(new).unwrap_or_else(|| panic!("{new} missing"));
            assert!(Arc::ptr_eq(via_old, via_new));
        }
        assert_eq!(by_platform_name("ROTATION_16").unwrap().kind(), PropertyKind::Int);
    }

    #[test]
    fn shared_keys_have_distinct_domains() {
        let age_1 = by_name("AGE_1").unwrap();
        let age_25 = by_name("AGE_25").unwrap();
        assert_eq!(age_1.key(), age_25.key());
        assert_eq!(age_1.value_count(), 2);
        assert_eq!(age_25.value_count(), 26);

        let axis = by_name("AXIS").unwrap();
        let horizontal = by_name("HORIZONTAL_AXIS").unwrap();
        assert_eq!(axis.key(), horizontal.key());
        assert_eq!(horizontal.value_count(), 2);
    }

    #[test]
    fn straight_rail_excludes_curves() {
        let straight = by_name("RAIL_SHAPE_STRAIGHT").unwrap();
        assert!(straight.value_from_str("north_south").is_ok());
        assert!(straight.value_from_str("south_east").is_err());
    }
}
