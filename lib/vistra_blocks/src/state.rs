//! Block and block-state flyweight handles over the registry arenas.
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bitflags::bitflags;
use kstring::KString;
use smallvec::SmallVec;
use thiserror::Error;

use crate::key::BlockKey;
use crate::property::{Property, PropertyError, PropertyValue};
use crate::registry::BlockRegistry;

bitflags! {
    /// Fixed per-state classification flags, assigned at load time.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct StateFlags: u8 {
        /// The state is an air-like placeholder.
        const AIR = 0b0000_0001;
        /// The state has a full solid collision volume.
        const SOLID = 0b0000_0010;
        /// The state is a fluid.
        const LIQUID = 0b0000_0100;
        /// The state can catch fire.
        const FLAMMABLE = 0b0000_1000;
        /// The state may be overwritten by placement.
        const REPLACEABLE = 0b0001_0000;
        /// The state has any collision shape at all.
        const COLLIDING = 0b0010_0000;
    }
}

/// Possible errors from block-state queries and transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The property is not applied to the block.
    #[error("block `{block}` has no property `{property}`")]
    UnknownProperty {
        /// The block queried.
        block: BlockKey,
        /// The serialized key of the missing property.
        property: KString,
    },
    /// The value is outside the property's domain.
    #[error("`{value}` is outside the domain of property `{property}`")]
    UnknownValue {
        /// The property whose domain was checked.
        property: KString,
        /// The rejected value, rendered.
        value: String,
    },
    /// The target value assignment names no declared state.
    #[error("block `{block}` declares no state with `{property}={value}`")]
    NoSuchState {
        /// The block whose state space has the gap.
        block: BlockKey,
        /// The substituted property.
        property: KString,
        /// The requested value, rendered.
        value: String,
    },
    /// A value string failed to parse against the property's domain.
    #[error(transparent)]
    InvalidValue(#[from] PropertyError),
    /// The state carries a property whose rotation has no defined remap.
    #[error("cannot rotate block `{block}`: property `{property}` has no rotation rule")]
    UnsupportedRotation {
        /// The block being rotated.
        block: BlockKey,
        /// The property that blocked the rotation.
        property: KString,
    },
}

/// Arena entry for one block type. Lives inside [`BlockRegistry`]; accessed through
/// [`Block`] handles.
pub(crate) struct BlockData {
    pub(crate) key: BlockKey,
    pub(crate) type_id: u32,
    /// Properties applied to this block, in document declaration order.
    pub(crate) properties: SmallVec<[Arc<Property>; 4]>,
    /// Arena index of the default state.
    pub(crate) default_state: u32,
    /// This block's states occupy the contiguous arena range
    /// `first_state..first_state + state_count`.
    pub(crate) first_state: u32,
    pub(crate) state_count: u32,
    pub(crate) has_entity: bool,
}

/// Arena entry for one block state.
pub(crate) struct StateData {
    /// Arena index of the owning block.
    pub(crate) block: u32,
    /// Globally unique serialized state id.
    pub(crate) state_id: u32,
    /// Values in the same order as the owning block's `properties`.
    pub(crate) values: SmallVec<[PropertyValue; 4]>,
    /// Per property (same order again): every alternate value paired with the arena
    /// index of the state reached by substituting it. Built once at load time.
    pub(crate) neighbours: SmallVec<[SmallVec<[(PropertyValue, u32); 4]>; 4]>,
    pub(crate) flags: StateFlags,
}

/// Handle to a block type: a registry reference plus a dense arena index.
///
/// Cheap to copy and compare; all data lives in the registry. Two handles are equal
/// iff they point into the same registry at the same index.
#[derive(Copy, Clone)]
pub struct Block<'r> {
    pub(crate) registry: &'r BlockRegistry,
    pub(crate) index: u32,
}

/// Handle to one block state, see [`Block`] for the handle conventions.
#[derive(Copy, Clone)]
pub struct BlockState<'r> {
    pub(crate) registry: &'r BlockRegistry,
    pub(crate) index: u32,
}

impl<'r> Block<'r> {
    fn data(self) -> &'r BlockData {
        self.registry.block_data(self.index)
    }

    /// The namespaced key of this block.
    pub fn key(self) -> &'r BlockKey {
        &self.data().key
    }

    /// The platform-scoped numeric type id. Not unique across platforms.
    pub fn type_id(self) -> u32 {
        self.data().type_id
    }

    /// The properties applied to this block, in declaration order.
    pub fn properties(self) -> &'r [Arc<Property>] {
        &self.data().properties
    }

    /// Whether the given property is applied to this block.
    pub fn has_property(self, property: &Property) -> bool {
        self.data().properties.iter().any(|p| **p == *property)
    }

    /// The designated default state.
    pub fn default_state(self) -> BlockState<'r> {
        BlockState {
            registry: self.registry,
            index: self.data().default_state,
        }
    }

    /// Iterates over every declared state of this block.
    pub fn states(self) -> impl Iterator<Item = BlockState<'r>> {
        let data = self.data();
        let registry = self.registry;
        (data.first_state..data.first_state + data.state_count)
            .map(move |index| BlockState { registry, index })
    }

    /// The number of declared states.
    pub fn state_count(self) -> usize {
        self.data().state_count as usize
    }

    /// Whether this block carries a block entity on the host platform.
    pub fn has_entity(self) -> bool {
        self.data().has_entity
    }

    /// Whether the default state is air, see [`BlockState::is_air`].
    pub fn is_air(self) -> bool {
        self.default_state().is_air()
    }

    /// Whether the default state is solid, see [`BlockState::is_solid`].
    pub fn is_solid(self) -> bool {
        self.default_state().is_solid()
    }

    /// Whether the default state is a liquid, see [`BlockState::is_liquid`].
    pub fn is_liquid(self) -> bool {
        self.default_state().is_liquid()
    }

    /// Resolves the state reached from the default state by applying the given
    /// `(key, value)` overrides. Keys not applied to this block are skipped.
    pub fn with_properties<'a>(
        self,
        pairs: impl IntoIterator<Item = (&'a str, PropertyValue)>,
    ) -> Result<BlockState<'r>, StateError> {
        let mut state = self.default_state();
        for (key, value) in pairs {
            let Some(property) = self.data().properties.iter().find(|p| p.key() == key) else {
                continue;
            };
            state = state.set(property, value)?;
        }
        Ok(state)
    }

    /// Like [`Self::with_properties`], with values in serialized string form, as
    /// found in block placement data. Keys not applied to this block are skipped.
    pub fn with_properties_str<'a>(
        self,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<BlockState<'r>, StateError> {
        let mut state = self.default_state();
        for (key, value) in pairs {
            let Some(property) = self.data().properties.iter().find(|p| p.key() == key) else {
                continue;
            };
            state = state.set_str(property, value)?;
        }
        Ok(state)
    }
}

impl<'r> BlockState<'r> {
    pub(crate) fn data(self) -> &'r StateData {
        self.registry.state_data(self.index)
    }

    /// The owning block.
    pub fn block(self) -> Block<'r> {
        Block {
            registry: self.registry,
            index: self.data().block,
        }
    }

    /// The globally unique serialized id of this state.
    pub fn state_id(self) -> u32 {
        self.data().state_id
    }

    /// Iterates over `(property, value)` pairs in declaration order.
    pub fn entries(self) -> impl Iterator<Item = (&'r Arc<Property>, PropertyValue)> {
        let block = self.block().data();
        block
            .properties
            .iter()
            .zip(self.data().values.iter().copied())
    }

    /// The value of the given property, if it is applied to the block.
    pub fn get_opt(self, property: &Property) -> Option<PropertyValue> {
        let block = self.block().data();
        let slot = block.properties.iter().position(|p| **p == *property)?;
        Some(self.data().values[slot])
    }

    /// The value of the given property.
    pub fn get(self, property: &Property) -> Result<PropertyValue, StateError> {
        self.get_opt(property)
            .ok_or_else(|| StateError::UnknownProperty {
                block: self.block().key().clone(),
                property: KString::from_ref(property.key()),
            })
    }

    /// The sibling state with `property` substituted to `value`; every other
    /// property keeps its current value. Setting the current value is a no-op.
    pub fn set(self, property: &Property, value: PropertyValue) -> Result<Self, StateError> {
        let block = self.block().data();
        let slot = block
            .properties
            .iter()
            .position(|p| **p == *property)
            .ok_or_else(|| StateError::UnknownProperty {
                block: block.key.clone(),
                property: KString::from_ref(property.key()),
            })?;
        let applied = &block.properties[slot];
        if !applied.contains(value) {
            return Err(StateError::UnknownValue {
                property: KString::from_ref(applied.key()),
                value: value.to_string(),
            });
        }
        let data = self.data();
        if data.values[slot] == value {
            return Ok(self);
        }
        data.neighbours[slot]
            .iter()
            .find(|(v, _)| *v == value)
            .map(|&(_, index)| BlockState {
                registry: self.registry,
                index,
            })
            .ok_or_else(|| StateError::NoSuchState {
                block: block.key.clone(),
                property: KString::from_ref(applied.key()),
                value: value.to_string(),
            })
    }

    /// Like [`Self::set`], with the value given in serialized string form.
    pub fn set_str(self, property: &Property, value: &str) -> Result<Self, StateError> {
        let parsed = property.value_from_str(value)?;
        self.set(property, parsed)
    }

    /// Whether this state is an air-like placeholder.
    pub fn is_air(self) -> bool {
        self.data().flags.contains(StateFlags::AIR)
    }

    /// Whether this state has a full solid collision volume.
    pub fn is_solid(self) -> bool {
        self.data().flags.contains(StateFlags::SOLID)
    }

    /// Whether this state is a fluid.
    pub fn is_liquid(self) -> bool {
        self.data().flags.contains(StateFlags::LIQUID)
    }

    /// Whether this state can catch fire.
    pub fn is_flammable(self) -> bool {
        self.data().flags.contains(StateFlags::FLAMMABLE)
    }

    /// Whether this state may be overwritten by placement.
    pub fn is_replaceable(self) -> bool {
        self.data().flags.contains(StateFlags::REPLACEABLE)
    }

    /// Whether this state has any collision shape.
    pub fn is_colliding(self) -> bool {
        self.data().flags.contains(StateFlags::COLLIDING)
    }
}

impl PartialEq for Block<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.registry, other.registry) && self.index == other.index
    }
}

impl Eq for Block<'_> {}

impl Hash for Block<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.registry as *const BlockRegistry).hash(state);
        self.index.hash(state);
    }
}

impl PartialEq for BlockState<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.registry, other.registry) && self.index == other.index
    }
}

impl Eq for BlockState<'_> {}

impl Hash for BlockState<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.registry as *const BlockRegistry).hash(state);
        self.index.hash(state);
    }
}

impl Debug for Block<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block({})", self.key())
    }
}

impl Display for Block<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.key(), f)
    }
}

impl Debug for BlockState<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlockState({self})")
    }
}

impl Display for BlockState<'_> {
    /// Renders the `key[prop=value,...]` form used by host-platform commands.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.block().key())?;
        let mut entries = self.entries().peekable();
        if entries.peek().is_some() {
            write!(f, "[")?;
            let mut first = true;
            for (property, value) in entries {
                if !first {
                    write!(f, ",")?;
                }
                first = false;
                write!(f, "{}={}", property.key(), value)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::properties;
    use crate::tags::{ChestType, Direction};
    use crate::testutil::sample_registry;

    #[test]
    fn default_state_belongs_to_block() {
        let registry = sample_registry();
        for block in registry.blocks() {
            let default = block.default_state();
            assert_eq!(default.block(), block);
            assert!(block.states().any(|s| s == default));
        }
    }

    #[test]
    fn set_get_roundtrip_over_all_alternates() {
        let registry = sample_registry();
        for block in registry.blocks() {
            for state in block.states() {
                for (property, current) in state.entries() {
                    assert_eq!(state.get(property), Ok(current));
                    for value in property.values() {
                        let moved = state.set(property, value).unwrap();
                        assert_eq!(moved.get(property), Ok(value));
                        // Only the substituted property changes.
                        for (other, original) in state.entries() {
                            if **other != **property {
                                assert_eq!(moved.get(other), Ok(original));
                            }
                        }
                        if value == current {
                            assert_eq!(moved, state);
                        } else {
                            assert_ne!(moved, state);
                        }
                        assert_eq!(moved.set(property, current), Ok(state));
                    }
                }
            }
        }
    }

    #[test]
    fn chest_scenario() {
        let registry = sample_registry();
        let chest = registry.from_key_str("minecraft:chest").unwrap();
        assert!(chest.has_entity());
        let facing = properties::by_name("HORIZONTAL_FACING").unwrap();
        let chest_type = properties::by_name("CHEST_TYPE").unwrap();
        let waterlogged = properties::by_name("WATERLOGGED").unwrap();

        let state = chest
            .with_properties([
                ("facing", Direction::East.into()),
                ("type", ChestType::Left.into()),
            ])
            .unwrap();
        assert_eq!(state.get(facing), Ok(Direction::East.into()));
        assert_eq!(state.get(chest_type), Ok(ChestType::Left.into()));
        assert_eq!(
            state.get(waterlogged),
            chest.default_state().get(waterlogged)
        );
        assert_eq!(state.to_string(), "minecraft:chest[facing=east,type=left,waterlogged=false]");
    }

    #[test]
    fn unknown_keys_in_with_properties_are_skipped() {
        let registry = sample_registry();
        let chest = registry.from_key_str("chest").unwrap();
        let state = chest
            .with_properties([("no_such_key", PropertyValue::Bool(true))])
            .unwrap();
        assert_eq!(state, chest.default_state());
    }

    #[test]
    fn set_rejects_foreign_property_and_value() {
        let registry = sample_registry();
        let wheat = registry.from_key_str("wheat").unwrap();
        let age = properties::by_name("AGE_7").unwrap();
        let lit = properties::by_name("LIT").unwrap();
        let state = wheat.default_state();

        assert!(matches!(
            state.set(lit, PropertyValue::Bool(true)),
            Err(StateError::UnknownProperty { .. })
        ));
        assert!(matches!(
            state.set(age, PropertyValue::Int(8)),
            Err(StateError::UnknownValue { .. })
        ));
        assert!(matches!(
            state.set(age, PropertyValue::Bool(true)),
            Err(StateError::UnknownValue { .. })
        ));
        assert_eq!(
            state.set(age, PropertyValue::Int(7)).unwrap().to_string(),
            "minecraft:wheat[age=7]"
        );
    }

    #[test]
    fn set_str_parses_against_the_applied_domain() {
        let registry = sample_registry();
        let rail = registry.from_key_str("rail").unwrap();
        let shape = properties::by_name("RAIL_SHAPE").unwrap();
        let state = rail.default_state().set_str(shape, "south_east").unwrap();
        assert_eq!(state.to_string(), "minecraft:rail[shape=south_east]");
        assert!(matches!(
            rail.default_state().set_str(shape, "diagonal"),
            Err(StateError::InvalidValue(_))
        ));
    }

    #[test]
    fn get_opt_is_none_for_inapplicable_properties() {
        let registry = sample_registry();
        let chest = registry.from_key_str("chest").unwrap();
        let facing = properties::by_name("HORIZONTAL_FACING").unwrap();
        let lit = properties::by_name("LIT").unwrap();
        let state = chest.default_state();
        assert_eq!(state.get_opt(facing), Some(Direction::North.into()));
        assert_eq!(state.get_opt(lit), None);
        assert!(matches!(
            state.get(lit),
            Err(StateError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn single_boolean_property_block() {
        let registry = sample_registry();
        let basin = registry.from_key_str("vistra:basin").unwrap();
        assert_eq!(basin.state_count(), 2);
        let waterlogged = properties::by_name("WATERLOGGED").unwrap();
        let wet = basin
            .default_state()
            .set_str(waterlogged, "true")
            .unwrap();
        assert_eq!(wet.get(waterlogged), Ok(true.into()));
    }

    #[test]
    fn bounded_age_property() {
        let registry = sample_registry();
        let wart = registry.from_key_str("nether_wart").unwrap();
        let age = properties::by_name("AGE_3").unwrap();
        let state = wart.default_state();
        let grown = state
            .set(age, PropertyValue::Int(0))
            .unwrap()
            .set(age, PropertyValue::Int(3))
            .unwrap();
        assert_eq!(grown.get(age), Ok(PropertyValue::Int(3)));
        assert!(matches!(
            state.set(age, PropertyValue::Int(5)),
            Err(StateError::UnknownValue { .. })
        ));
    }

    #[test]
    fn with_properties_str_parses_and_skips_unknown_keys() {
        let registry = sample_registry();
        let chest = registry.from_key_str("chest").unwrap();
        let state = chest
            .with_properties_str([
                ("facing", "south"),
                ("waterlogged", "true"),
                ("ignored_key", "whatever"),
            ])
            .unwrap();
        assert_eq!(
            state.to_string(),
            "minecraft:chest[facing=south,type=single,waterlogged=true]"
        );
        assert!(matches!(
            chest.with_properties_str([("facing", "up")]),
            Err(StateError::InvalidValue(_))
        ));
    }

    #[test]
    fn classification_flags() {
        let registry = sample_registry();
        let air = registry.from_key_str("air").unwrap();
        assert!(air.is_air());
        assert!(air.default_state().is_replaceable());
        assert!(!air.is_solid());
        let water = registry.from_key_str("water").unwrap();
        assert!(water.is_liquid());
        assert!(!water.is_air());
        let chest = registry.from_key_str("chest").unwrap();
        assert!(chest.default_state().is_colliding());
    }
}
