#![warn(missing_docs)]
#![deny(clippy::disallowed_types)]

//! Block, property and block-state definitions for the Vistra world generator.
//!
//! Every placeable block type is a finite set of named, typed properties; every
//! concrete placement is one immutable state out of the block's combinatorial state
//! space. States are flyweights in a registry arena, linked to their
//! single-substitution siblings at load time so `set`/`rotate` walks are cheap
//! lookups rather than searches.

pub mod key;
pub mod loader;
pub mod properties;
pub mod property;
pub mod registry;
pub mod rotation;
pub mod state;
pub mod tags;

/// Re-exported dependencies used in API types
pub mod dependencies {
    pub use bitflags;
    pub use hashbrown;
    pub use itertools;
    pub use kstring;
    pub use once_cell;
    pub use serde;
    pub use serde_json;
    pub use smallvec;
    pub use thiserror;
    pub use tracing;
}
