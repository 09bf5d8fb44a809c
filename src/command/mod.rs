//! Tile reference resolution
//!
//! Free text -> normalize -> TileResolver (SKU, name, keywords, synonyms) -> Tile

pub mod normalize;
pub mod resolver;
pub mod synonyms;

pub use normalize::normalize;
pub use resolver::{MatchReason, TileMatch, TileResolver};
pub use synonyms::{SynonymEntry, SynonymTable};
