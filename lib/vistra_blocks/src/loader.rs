//! Declarative block-state document model and the two-pass registry builder.
//!
//! Documents mirror the host platform's block export: per block a numeric type id,
//! the default state id, the list of canonical property names it applies, and every
//! state with its explicit state id, serialized value assignment and classification
//! flags. A structural problem anywhere aborts the whole load; no partially-built
//! registry is ever handed out.
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::key::{BlockKey, KeyParseError};
use crate::properties;
use crate::property::{Property, PropertyError, PropertyValue};
use crate::registry::BlockRegistry;
use crate::state::{BlockData, StateData, StateFlags};

/// Possible errors aborting a document load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document is not valid JSON.
    #[error("malformed block document: {0}")]
    Json(#[from] serde_json::Error),
    /// A block key does not have the `namespace:key` shape.
    #[error(transparent)]
    IllegalKey(#[from] KeyParseError),
    /// Two blocks share a key.
    #[error("duplicate block key `{key}`")]
    DuplicateKey {
        /// The repeated key.
        key: BlockKey,
    },
    /// Two blocks share a numeric type id.
    #[error("blocks `{first}` and `{second}` share type id {id}")]
    DuplicateTypeId {
        /// The repeated id.
        id: u32,
        /// The block that claimed the id first.
        first: BlockKey,
        /// The block that re-claimed it.
        second: BlockKey,
    },
    /// A block references a property name missing from the canonical table.
    #[error("block `{block}` references unknown property `{property}`")]
    UnknownProperty {
        /// The referencing block.
        block: BlockKey,
        /// The unresolved canonical name.
        property: String,
    },
    /// A block applies two canonical properties sharing a serialized key.
    #[error("block `{block}` applies two properties with the serialized key `{property}`")]
    ConflictingPropertyKey {
        /// The referencing block.
        block: BlockKey,
        /// The serialized key claimed twice.
        property: String,
    },
    /// A block declares no states at all.
    #[error("block `{block}` declares no states")]
    EmptyStates {
        /// The offending block.
        block: BlockKey,
    },
    /// A state omits a value for an applied property.
    #[error("state {state_id} of block `{block}` assigns no value to `{property}`")]
    MissingStateValue {
        /// The owning block.
        block: BlockKey,
        /// The incomplete state.
        state_id: u32,
        /// The unassigned property key.
        property: String,
    },
    /// A state's value string failed to parse against the applied property.
    #[error("state {state_id} of block `{block}`: {source}")]
    InvalidStateValue {
        /// The owning block.
        block: BlockKey,
        /// The offending state.
        state_id: u32,
        /// The parse failure.
        #[source]
        source: PropertyError,
    },
    /// Two states of one block declare the same value assignment.
    #[error("states {first} and {second} of block `{block}` declare the same value assignment")]
    DuplicateStateAssignment {
        /// The owning block.
        block: BlockKey,
        /// The state that declared the assignment first.
        first: u32,
        /// The state that re-declared it.
        second: u32,
    },
    /// Two states (of any blocks) share a state id.
    #[error("state id {state_id} is declared more than once")]
    DuplicateStateId {
        /// The repeated id.
        state_id: u32,
    },
    /// No declared state matches the block's default state id.
    #[error("block `{block}` names default state {default_state_id} but declares no such state")]
    MissingDefaultState {
        /// The offending block.
        block: BlockKey,
        /// The dangling id.
        default_state_id: u32,
    },
}

/// A complete block-state export, the unit of loading.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStateDocument {
    /// Every block, in declaration order.
    pub blocks: Vec<BlockEntry>,
}

/// One block type declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEntry {
    /// Namespaced key; bare names resolve into the default namespace.
    pub key: String,
    /// Platform-scoped numeric type id.
    pub id: u32,
    /// State id of the default state, which must appear in `states`.
    pub default_state_id: u32,
    /// Canonical property table names applied to this block.
    #[serde(default)]
    pub properties: Vec<String>,
    /// Every state of the block's property space.
    pub states: Vec<StateEntry>,
    /// Whether the block carries a block entity on the host platform.
    #[serde(default)]
    pub has_entity: bool,
}

/// One block state declaration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateEntry {
    /// Globally unique serialized state id.
    pub state_id: u32,
    /// Serialized property key to serialized value. Keys outside the block's
    /// applied properties are ignored.
    #[serde(default)]
    pub properties: HashMap<String, String>,
    /// Air-like placeholder.
    #[serde(default)]
    pub air: bool,
    /// Full solid collision volume.
    #[serde(default)]
    pub solid: bool,
    /// Fluid.
    #[serde(default)]
    pub liquid: bool,
    /// Can catch fire.
    #[serde(default)]
    pub flammable: bool,
    /// May be overwritten by placement.
    #[serde(default)]
    pub replaceable: bool,
    /// Has any collision shape.
    #[serde(default)]
    pub colliding: bool,
}

impl BlockStateDocument {
    /// Parses a document from its JSON wire form.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}

type Assignment = SmallVec<[PropertyValue; 4]>;

fn entry_flags(entry: &StateEntry) -> StateFlags {
    let mut flags = StateFlags::empty();
    flags.set(StateFlags::AIR, entry.air);
    flags.set(StateFlags::SOLID, entry.solid);
    flags.set(StateFlags::LIQUID, entry.liquid);
    flags.set(StateFlags::FLAMMABLE, entry.flammable);
    flags.set(StateFlags::REPLACEABLE, entry.replaceable);
    flags.set(StateFlags::COLLIDING, entry.colliding);
    flags
}

impl BlockRegistry {
    /// Builds a registry from a parsed document.
    ///
    /// Pass 1 resolves properties and parses every state; pass 2 links each state to
    /// its single-substitution siblings. Structural failures abort with a
    /// [`LoadError`]; state-space gaps (a substitution with no declared target) only
    /// log a warning and surface later as
    /// [`StateError::NoSuchState`](crate::state::StateError::NoSuchState).
    pub fn from_document(document: &BlockStateDocument) -> Result<Self, LoadError> {
        let mut blocks: Vec<BlockData> = Vec::with_capacity(document.blocks.len());
        let mut states: Vec<StateData> = Vec::new();
        let mut key_index: HashMap<BlockKey, u32> = HashMap::with_capacity(document.blocks.len());
        let mut id_index: HashMap<u32, u32> = HashMap::with_capacity(document.blocks.len());
        let mut state_id_index: HashMap<u32, u32> = HashMap::new();
        // Per block: value assignment -> state arena index, kept for pass 2.
        let mut assignment_maps: Vec<HashMap<Assignment, u32>> =
            Vec::with_capacity(document.blocks.len());

        for entry in &document.blocks {
            let key = BlockKey::parse(&entry.key)?;
            let block_index = blocks.len() as u32;
            if key_index.contains_key(&key) {
                return Err(LoadError::DuplicateKey { key });
            }
            key_index.insert(key.clone(), block_index);
            if let Some(&first) = id_index.get(&entry.id) {
                return Err(LoadError::DuplicateTypeId {
                    id: entry.id,
                    first: blocks[first as usize].key.clone(),
                    second: key,
                });
            }
            id_index.insert(entry.id, block_index);

            let block_properties: SmallVec<[Arc<Property>; 4]> = entry
                .properties
                .iter()
                .map(|name| {
                    properties::by_platform_name(name).cloned().ok_or_else(|| {
                        LoadError::UnknownProperty {
                            block: key.clone(),
                            property: name.clone(),
                        }
                    })
                })
                .collect::<Result<_, _>>()?;

            // Several table entries share a serialized key (the `age` variants, the
            // two `axis` subsets...); a single block may only apply one of each,
            // since states address values by key.
            for (i, property) in block_properties.iter().enumerate() {
                if block_properties[..i].iter().any(|p| p.key() == property.key()) {
                    return Err(LoadError::ConflictingPropertyKey {
                        block: key,
                        property: property.key().to_owned(),
                    });
                }
            }

            if entry.states.is_empty() {
                return Err(LoadError::EmptyStates { block: key });
            }

            let first_state = states.len() as u32;
            let mut assignments: HashMap<Assignment, u32> =
                HashMap::with_capacity(entry.states.len());
            let mut default_state = None;
            for state_entry in &entry.states {
                let state_index = states.len() as u32;
                let values = parse_assignment(&key, &block_properties, state_entry)?;
                if let Some(&first) = assignments.get(&values) {
                    return Err(LoadError::DuplicateStateAssignment {
                        block: key.clone(),
                        first: states[first as usize].state_id,
                        second: state_entry.state_id,
                    });
                }
                assignments.insert(values.clone(), state_index);
                if state_id_index
                    .insert(state_entry.state_id, state_index)
                    .is_some()
                {
                    return Err(LoadError::DuplicateStateId {
                        state_id: state_entry.state_id,
                    });
                }
                if state_entry.state_id == entry.default_state_id {
                    default_state = Some(state_index);
                }
                states.push(StateData {
                    block: block_index,
                    state_id: state_entry.state_id,
                    values,
                    neighbours: SmallVec::new(),
                    flags: entry_flags(state_entry),
                });
            }

            let default_state = default_state.ok_or(LoadError::MissingDefaultState {
                block: key.clone(),
                default_state_id: entry.default_state_id,
            })?;
            debug!(block = %key, states = entry.states.len(), "indexed block");
            blocks.push(BlockData {
                key,
                type_id: entry.id,
                properties: block_properties,
                default_state,
                first_state,
                state_count: entry.states.len() as u32,
                has_entity: entry.has_entity,
            });
            assignment_maps.push(assignments);
        }

        link_neighbours(&blocks, &mut states, &assignment_maps);
        info!(
            blocks = blocks.len(),
            states = states.len(),
            "loaded block state document"
        );
        Ok(BlockRegistry {
            blocks,
            states,
            key_index,
            id_index,
            state_id_index,
        })
    }
}

fn parse_assignment(
    key: &BlockKey,
    block_properties: &[Arc<Property>],
    state_entry: &StateEntry,
) -> Result<Assignment, LoadError> {
    block_properties
        .iter()
        .map(|property| {
            let raw = state_entry.properties.get(property.key()).ok_or_else(|| {
                LoadError::MissingStateValue {
                    block: key.clone(),
                    state_id: state_entry.state_id,
                    property: property.key().to_owned(),
                }
            })?;
            property
                .value_from_str(raw)
                .map_err(|source| LoadError::InvalidStateValue {
                    block: key.clone(),
                    state_id: state_entry.state_id,
                    source,
                })
        })
        .collect()
}

/// Pass 2: for every state and every applied property, record the arena index of
/// the state reached by substituting each alternate value.
fn link_neighbours(
    blocks: &[BlockData],
    states: &mut [StateData],
    assignment_maps: &[HashMap<Assignment, u32>],
) {
    for (block, assignments) in blocks.iter().zip(assignment_maps) {
        let mut gaps = 0usize;
        let range = block.first_state as usize..(block.first_state + block.state_count) as usize;
        for state_index in range {
            let mut neighbours: SmallVec<[SmallVec<[(PropertyValue, u32); 4]>; 4]> =
                SmallVec::with_capacity(block.properties.len());
            for (slot, property) in block.properties.iter().enumerate() {
                let current = states[state_index].values[slot];
                let mut links: SmallVec<[(PropertyValue, u32); 4]> =
                    SmallVec::with_capacity(property.value_count() - 1);
                let mut probe = states[state_index].values.clone();
                for value in property.values() {
                    if value == current {
                        continue;
                    }
                    probe[slot] = value;
                    match assignments.get(&probe) {
                        Some(&target) => links.push((value, target)),
                        None => gaps += 1,
                    }
                }
                neighbours.push(links);
            }
            states[state_index].neighbours = neighbours;
        }
        if gaps > 0 {
            warn!(block = %block.key, gaps, "state space is not closed under single-property substitution");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::sample_document;

    #[test]
    fn parses_wire_form() {
        let document = BlockStateDocument::from_json_str(
            r#"{
                "blocks": [
                    {
                        "key": "minecraft:torch",
                        "id": 90,
                        "defaultStateId": 1337,
                        "states": [{"stateId": 1337, "flammable": true}]
                    }
                ]
            }"#,
        )
        .unwrap();
        let registry = BlockRegistry::from_document(&document).unwrap();
        let torch = registry.from_key_str("torch").unwrap();
        assert_eq!(torch.type_id(), 90);
        assert_eq!(torch.default_state().state_id(), 1337);
        assert!(torch.default_state().is_flammable());
        assert!(torch.properties().is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            BlockStateDocument::from_json_str("{"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn sample_document_loads() {
        let registry = BlockRegistry::from_document(&sample_document()).unwrap();
        assert!(registry.len() > 0);
        assert!(registry.state_len() > registry.len());
    }

    #[test]
    fn aborts_on_unknown_property() {
        let mut document = sample_document();
        document.blocks[0].properties.push("NOT_A_PROPERTY".into());
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn aborts_on_duplicate_state_id() {
        let mut document = sample_document();
        let existing = document.blocks[0].states[0].state_id;
        let victim = document
            .blocks
            .iter_mut()
            .flat_map(|b| &mut b.states)
            .find(|s| s.state_id != existing)
            .unwrap();
        victim.state_id = existing;
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::DuplicateStateId { state_id }) if state_id == existing
        ));
    }

    #[test]
    fn aborts_on_missing_default_state() {
        let mut document = sample_document();
        document.blocks[0].default_state_id = u32::MAX;
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::MissingDefaultState { .. })
        ));
    }

    #[test]
    fn aborts_on_conflicting_property_keys() {
        let mut document = sample_document();
        // LEVEL and LEVEL_CAULDRON both serialize as `level`.
        let water = document
            .blocks
            .iter_mut()
            .find(|b| b.key == "minecraft:water")
            .unwrap();
        water.properties.push("LEVEL_CAULDRON".into());
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::ConflictingPropertyKey { property, .. }) if property == "level"
        ));
    }

    #[test]
    fn aborts_on_empty_states() {
        let mut document = sample_document();
        document.blocks[0].states.clear();
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::EmptyStates { .. })
        ));
    }

    #[test]
    fn aborts_on_duplicate_key() {
        let mut document = sample_document();
        let mut copy = document.blocks[0].clone();
        copy.id = 9999;
        let shift = 100_000;
        for state in &mut copy.states {
            state.state_id += shift;
        }
        copy.default_state_id += shift;
        document.blocks.push(copy);
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn aborts_on_illegal_key() {
        let mut document = sample_document();
        document.blocks[0].key = "Not A Key".into();
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::IllegalKey(_))
        ));
    }

    #[test]
    fn aborts_on_duplicate_assignment() {
        let mut document = sample_document();
        let block = document
            .blocks
            .iter_mut()
            .find(|b| b.states.len() >= 2)
            .unwrap();
        let first = block.states[0].properties.clone();
        block.states[1].properties = first;
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::DuplicateStateAssignment { .. })
        ));
    }

    #[test]
    fn aborts_on_missing_state_value() {
        let mut document = sample_document();
        let block = document
            .blocks
            .iter_mut()
            .find(|b| !b.properties.is_empty())
            .unwrap();
        block.states[0].properties.clear();
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::MissingStateValue { .. })
        ));
    }

    #[test]
    fn aborts_on_unparseable_state_value() {
        let mut document = sample_document();
        let block = document
            .blocks
            .iter_mut()
            .find(|b| !b.properties.is_empty())
            .unwrap();
        let key = block.states[0].properties.keys().next().unwrap().clone();
        block.states[0].properties.insert(key, "garbage".into());
        assert!(matches!(
            BlockRegistry::from_document(&document),
            Err(LoadError::InvalidStateValue { .. })
        ));
    }
}
