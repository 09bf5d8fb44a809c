//! Catalog context for LLM prompts
//!
//! The model only sees tile names and SKUs; hints stay local to the
//! resolver.

use crate::catalog::TileCatalog;

/// A catalog entry as presented to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ListedTile {
    pub name: String,
    pub sku: String,
}

/// Catalog summary used to build the intent prompt
#[derive(Debug, Clone, Default)]
pub struct CatalogContext {
    pub tiles: Vec<ListedTile>,
}

impl CatalogContext {
    /// Build the context from every catalog tile, in catalog order
    pub fn from_catalog(catalog: &TileCatalog) -> Self {
        let tiles = catalog
            .iter()
            .map(|t| ListedTile {
                name: t.name.clone(),
                sku: t.id.clone(),
            })
            .collect();
        Self { tiles }
    }

    /// One `- <name> (SKU: <id>)` line per tile
    pub fn listing(&self) -> String {
        self.tiles
            .iter()
            .map(|t| format!("- {} (SKU: {})", t.name, t.sku))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The task text sent alongside the user's prompt
    pub fn task_prompt(&self, user_prompt: &str) -> String {
        format!(
            "User prompt: \"{}\"\n\nAvailable tiles:\n{}\n\n{}",
            user_prompt,
            self.listing(),
            TASK_INSTRUCTIONS
        )
    }
}

const TASK_INSTRUCTIONS: &str = "Based on the user's prompt, call the 'apply_textures' tool with the correct parameters.
- Identify the tile names and map them to their SKUs.
- If the user specifies a tile for the \"floor\", use its SKU for 'floorTileSku'.
- If the user specifies a tile for the \"wall\", use its SKU for 'wallTileSku'.
- Extract any specified 'groutWidthMm', 'orientationDeg', or 'scaleMetersPerRepeat'.";
