//! The block registry arena and the process-wide provider façade.
use std::sync::{Mutex, OnceLock, PoisonError};

use hashbrown::HashMap;
use thiserror::Error;
use tracing::warn;

use crate::key::{BlockKey, BlockKeyRef, KeyParseError};
use crate::loader::{BlockStateDocument, LoadError};
use crate::state::{Block, BlockData, BlockState, StateData};

/// Possible errors from registry lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No block is registered under the key.
    #[error("no block registered under key `{key}`")]
    NotFound {
        /// The missing key.
        key: BlockKey,
    },
    /// No block is registered under the numeric type id.
    #[error("no block registered under type id {id}")]
    NoSuchTypeId {
        /// The missing id.
        id: u32,
    },
    /// No state is registered under the state id.
    #[error("no block state registered under state id {state_id}")]
    NoSuchStateId {
        /// The missing id.
        state_id: u32,
    },
    /// The lookup key failed to parse, distinct from a well-formed miss.
    #[error(transparent)]
    InvalidKey(#[from] KeyParseError),
    /// The process-wide provider has not been installed yet.
    #[error("no block provider has been loaded")]
    NotLoaded,
}

/// Owns every block and state loaded from one document, plus the lookup indices.
///
/// All reads go through [`Block`]/[`BlockState`] handles borrowing from this arena;
/// the registry is immutable once built.
pub struct BlockRegistry {
    pub(crate) blocks: Vec<BlockData>,
    pub(crate) states: Vec<StateData>,
    pub(crate) key_index: HashMap<BlockKey, u32>,
    pub(crate) id_index: HashMap<u32, u32>,
    pub(crate) state_id_index: HashMap<u32, u32>,
}

impl BlockRegistry {
    pub(crate) fn block_data(&self, index: u32) -> &BlockData {
        &self.blocks[index as usize]
    }

    pub(crate) fn state_data(&self, index: u32) -> &StateData {
        &self.states[index as usize]
    }

    fn block_at(&self, index: u32) -> Block<'_> {
        Block {
            registry: self,
            index,
        }
    }

    /// Whether a block is registered under the given key.
    pub fn contains_key(&self, key: BlockKeyRef<'_>) -> bool {
        self.key_index.contains_key(&key)
    }

    /// Looks up a block by key.
    pub fn from_key(&self, key: BlockKeyRef<'_>) -> Result<Block<'_>, RegistryError> {
        self.key_index
            .get(&key)
            .map(|&index| self.block_at(index))
            .ok_or_else(|| RegistryError::NotFound {
                key: key.to_owned(),
            })
    }

    /// Looks up a block by a `namespace:key` string; bare names resolve into the
    /// default namespace. Malformed strings fail with
    /// [`RegistryError::InvalidKey`], never with a silent miss.
    pub fn from_key_str(&self, key: &str) -> Result<Block<'_>, RegistryError> {
        let key = BlockKey::parse(key)?;
        self.from_key(key.as_ref())
    }

    /// Looks up a block by its numeric type id.
    pub fn from_id(&self, id: u32) -> Result<Block<'_>, RegistryError> {
        self.id_index
            .get(&id)
            .map(|&index| self.block_at(index))
            .ok_or(RegistryError::NoSuchTypeId { id })
    }

    /// Looks up a state by its globally unique state id.
    pub fn from_state_id(&self, state_id: u32) -> Result<BlockState<'_>, RegistryError> {
        self.state_id_index
            .get(&state_id)
            .map(|&index| BlockState {
                registry: self,
                index,
            })
            .ok_or(RegistryError::NoSuchStateId { state_id })
    }

    /// Iterates over every registered block in declaration order.
    pub fn blocks(&self) -> impl Iterator<Item = Block<'_>> {
        (0..self.blocks.len() as u32).map(|index| self.block_at(index))
    }

    /// Iterates over every registered state in declaration order.
    pub fn states(&self) -> impl Iterator<Item = BlockState<'_>> {
        (0..self.states.len() as u32).map(|index| BlockState {
            registry: self,
            index,
        })
    }

    /// Iterates over every registered block key.
    pub fn keys(&self) -> impl Iterator<Item = &BlockKey> {
        self.blocks.iter().map(|block| &block.key)
    }

    /// The number of registered blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the registry holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The number of registered states across all blocks.
    pub fn state_len(&self) -> usize {
        self.states.len()
    }
}

/// Platform indirection point for block lookups.
///
/// [`BlockRegistry`] implements this for document-driven platforms; an embedding
/// host may supply its own backing store instead.
pub trait BlockProvider: Send + Sync {
    /// Whether a block is registered under the given key.
    fn contains_key(&self, key: BlockKeyRef<'_>) -> bool;
    /// Looks up a block by key.
    fn from_key(&self, key: BlockKeyRef<'_>) -> Result<Block<'_>, RegistryError>;
    /// Looks up a block by a `namespace:key` string, bare names normalized.
    fn from_key_str(&self, key: &str) -> Result<Block<'_>, RegistryError>;
    /// Looks up a block by its numeric type id.
    fn from_id(&self, id: u32) -> Result<Block<'_>, RegistryError>;
    /// Looks up a state by its globally unique state id.
    fn from_state_id(&self, state_id: u32) -> Result<BlockState<'_>, RegistryError>;
    /// Iterates over every registered block.
    fn blocks(&self) -> Box<dyn Iterator<Item = Block<'_>> + '_>;
    /// Iterates over every registered state.
    fn states(&self) -> Box<dyn Iterator<Item = BlockState<'_>> + '_>;
    /// Iterates over every registered block key.
    fn block_keys(&self) -> Box<dyn Iterator<Item = &BlockKey> + '_>;
}

impl BlockProvider for BlockRegistry {
    fn contains_key(&self, key: BlockKeyRef<'_>) -> bool {
        BlockRegistry::contains_key(self, key)
    }

    fn from_key(&self, key: BlockKeyRef<'_>) -> Result<Block<'_>, RegistryError> {
        BlockRegistry::from_key(self, key)
    }

    fn from_key_str(&self, key: &str) -> Result<Block<'_>, RegistryError> {
        BlockRegistry::from_key_str(self, key)
    }

    fn from_id(&self, id: u32) -> Result<Block<'_>, RegistryError> {
        BlockRegistry::from_id(self, id)
    }

    fn from_state_id(&self, state_id: u32) -> Result<BlockState<'_>, RegistryError> {
        BlockRegistry::from_state_id(self, state_id)
    }

    fn blocks(&self) -> Box<dyn Iterator<Item = Block<'_>> + '_> {
        Box::new(BlockRegistry::blocks(self))
    }

    fn states(&self) -> Box<dyn Iterator<Item = BlockState<'_>> + '_> {
        Box::new(BlockRegistry::states(self))
    }

    fn block_keys(&self) -> Box<dyn Iterator<Item = &BlockKey> + '_> {
        Box::new(BlockRegistry::keys(self))
    }
}

/// Lifecycle of the process-wide provider.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LoadState {
    /// No provider installed yet.
    Unloaded,
    /// A load is in progress on some thread.
    Loading,
    /// A provider is installed; further loads are no-ops.
    Loaded,
}

static LOAD_STATE: Mutex<LoadState> = Mutex::new(LoadState::Unloaded);
static GLOBAL: OnceLock<Box<dyn BlockProvider>> = OnceLock::new();

fn load_state_guard() -> std::sync::MutexGuard<'static, LoadState> {
    LOAD_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The current lifecycle state of the process-wide provider.
pub fn load_state() -> LoadState {
    *load_state_guard()
}

/// The installed process-wide provider.
pub fn global() -> Result<&'static dyn BlockProvider, RegistryError> {
    GLOBAL
        .get()
        .map(|provider| provider.as_ref())
        .ok_or(RegistryError::NotLoaded)
}

/// Builds a [`BlockRegistry`] from the document and installs it as the
/// process-wide provider. Loading again once a provider is installed (or while
/// another load is in flight) logs a warning and does nothing.
pub fn load_global(document: &BlockStateDocument) -> Result<(), LoadError> {
    {
        let mut state = load_state_guard();
        match *state {
            LoadState::Loaded | LoadState::Loading => {
                warn!(state = ?*state, "ignoring repeated block document load");
                return Ok(());
            }
            LoadState::Unloaded => *state = LoadState::Loading,
        }
    }
    match BlockRegistry::from_document(document) {
        Ok(registry) => {
            install(Box::new(registry));
            Ok(())
        }
        Err(error) => {
            *load_state_guard() = LoadState::Unloaded;
            Err(error)
        }
    }
}

/// Installs a host-supplied provider directly, bypassing the document loader.
/// A no-op with a warning if a provider is already installed.
pub fn install_global(provider: Box<dyn BlockProvider>) {
    let mut state = load_state_guard();
    match *state {
        LoadState::Loaded => {
            warn!("ignoring repeated block provider installation");
        }
        LoadState::Unloaded | LoadState::Loading => {
            // OnceLock::set only fails when already populated, which the state
            // machine above rules out.
            let _ = GLOBAL.set(provider);
            *state = LoadState::Loaded;
        }
    }
}

fn install(provider: Box<dyn BlockProvider>) {
    let mut state = load_state_guard();
    let _ = GLOBAL.set(provider);
    *state = LoadState::Loaded;
}

impl Block<'static> {
    /// Looks up a block in the process-wide provider by key string.
    pub fn find(key: &str) -> Result<Self, RegistryError> {
        global()?.from_key_str(key)
    }

    /// Looks up a block in the process-wide provider by numeric type id.
    pub fn find_by_id(id: u32) -> Result<Self, RegistryError> {
        global()?.from_id(id)
    }
}

impl BlockState<'static> {
    /// Looks up a state in the process-wide provider by state id.
    pub fn find_by_state_id(state_id: u32) -> Result<Self, RegistryError> {
        global()?.from_state_id(state_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::key::BlockKey;
    use crate::testutil::{sample_document, sample_registry};

    #[test]
    fn lookups_and_misses() {
        let registry = sample_registry();
        let chest = registry.from_key_str("minecraft:chest").unwrap();
        assert_eq!(registry.from_id(chest.type_id()).unwrap(), chest);
        assert!(registry.contains_key(BlockKeyRef::minecraft("chest")));

        assert_eq!(
            registry.from_key_str("nonexistent:block"),
            Err(RegistryError::NotFound {
                key: BlockKey::new("nonexistent", "block"),
            })
        );
        assert!(matches!(
            registry.from_key_str("NOT a key"),
            Err(RegistryError::InvalidKey(_))
        ));
        assert!(matches!(
            registry.from_id(u32::MAX),
            Err(RegistryError::NoSuchTypeId { .. })
        ));
        assert!(matches!(
            registry.from_state_id(u32::MAX),
            Err(RegistryError::NoSuchStateId { .. })
        ));
    }

    #[test]
    fn state_ids_are_globally_unique_and_resolvable() {
        let registry = sample_registry();
        let mut seen = hashbrown::HashSet::new();
        for state in registry.states() {
            assert!(seen.insert(state.state_id()), "state id {} repeats", state.state_id());
            assert_eq!(registry.from_state_id(state.state_id()).unwrap(), state);
        }
        assert_eq!(seen.len(), registry.state_len());
    }

    #[test]
    fn iterators_cover_the_arena() {
        let registry = sample_registry();
        assert_eq!(registry.blocks().count(), registry.len());
        assert_eq!(registry.states().count(), registry.state_len());
        assert_eq!(registry.keys().count(), registry.len());
        for block in registry.blocks() {
            assert_eq!(registry.from_key(block.key().as_ref()).unwrap(), block);
        }
    }

    // The global façade is process-wide, so every assertion about it lives in this
    // one test to keep the ordering deterministic.
    #[test]
    fn global_facade_lifecycle() {
        assert_eq!(Block::find("chest"), Err(RegistryError::NotLoaded));
        assert_eq!(load_state(), LoadState::Unloaded);

        let document = sample_document();
        load_global(&document).unwrap();
        assert_eq!(load_state(), LoadState::Loaded);

        let chest = Block::find("chest").unwrap();
        assert_eq!(chest.key(), &BlockKey::minecraft("chest"));
        let default = chest.default_state();
        assert_eq!(
            BlockState::find_by_state_id(default.state_id()).unwrap(),
            default
        );

        // Repeated loads are no-ops, even with a different document.
        load_global(&BlockStateDocument::default()).unwrap();
        assert_eq!(load_state(), LoadState::Loaded);
        assert!(Block::find("chest").is_ok());
    }
}
