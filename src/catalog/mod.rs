//! Tile catalog
//!
//! The catalog is loaded once at startup and never mutated. Iteration order
//! is the order tiles appear in the source file, and every resolver tier
//! breaks ties by that order.

use crate::core::error::{Result, VisionError};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Catalog shipped with the crate
const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.toml");

/// Surface a tile is meant for, encoded by the id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileCategory {
    Floor,
    Wall,
    Unknown,
}

impl TileCategory {
    /// Derive the category from a `floor-*` / `wall-*` id
    pub fn from_id(id: &str) -> Self {
        if id.starts_with("floor-") {
            Self::Floor
        } else if id.starts_with("wall-") {
            Self::Wall
        } else {
            Self::Unknown
        }
    }
}

/// A catalog tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Unique SKU-like identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-text description used for matching
    #[serde(default)]
    pub hint: String,
    /// Texture image (remote URL or data URI)
    #[serde(default)]
    pub image_url: String,
}

impl Tile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        hint: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hint: hint.into(),
            image_url: image_url.into(),
        }
    }

    pub fn category(&self) -> TileCategory {
        TileCategory::from_id(&self.id)
    }
}

/// Read-only, ordered tile collection
#[derive(Debug, Clone, Default)]
pub struct TileCatalog {
    tiles: Vec<Tile>,
    index: AHashMap<String, usize>,
}

impl TileCatalog {
    /// Build a catalog, rejecting empty names and empty or duplicate ids
    /// (ids differing only in case count as duplicates)
    pub fn from_tiles(tiles: Vec<Tile>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(tiles.len());
        for (i, tile) in tiles.iter().enumerate() {
            if tile.id.trim().is_empty() {
                return Err(VisionError::CatalogError(format!("tile #{} has an empty id", i)));
            }
            if tile.name.trim().is_empty() {
                return Err(VisionError::CatalogError(format!(
                    "tile '{}' has an empty name",
                    tile.id
                )));
            }
            if index.insert(tile.id.to_lowercase(), i).is_some() {
                return Err(VisionError::CatalogError(format!(
                    "duplicate tile id '{}'",
                    tile.id
                )));
            }
        }
        Ok(Self { tiles, index })
    }

    /// The catalog embedded at compile time
    pub fn embedded() -> Result<Self> {
        Self::parse_toml(EMBEDDED_CATALOG)
    }

    /// Load a catalog from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VisionError::CatalogError(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse_toml(&content)
    }

    /// Parse a catalog from TOML text
    pub fn parse_toml(content: &str) -> Result<Self> {
        let toml_data: TomlCatalog =
            toml::from_str(content).map_err(|e| VisionError::CatalogError(e.to_string()))?;
        Self::from_tiles(toml_data.tiles)
    }

    /// Load from `path` when given, otherwise the embedded catalog
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let catalog = match path {
            Some(path) => Self::load_from_toml(path)?,
            None => Self::embedded()?,
        };
        tracing::debug!(tiles = catalog.len(), "tile catalog loaded");
        Ok(catalog)
    }

    /// Get a tile by id, ignoring case
    pub fn get(&self, id: &str) -> Option<&Tile> {
        self.index.get(&id.to_lowercase()).map(|&i| &self.tiles[i])
    }

    /// All tiles in catalog order
    pub fn all(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Tiles of one category, in catalog order
    pub fn by_category(&self, category: TileCategory) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(move |t| t.category() == category)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// TOML representation of a catalog file
#[derive(Debug, Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    tiles: Vec<Tile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = TileCatalog::embedded().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.by_category(TileCategory::Floor).count() > 0);
        assert!(catalog.by_category(TileCategory::Wall).count() > 0);
        assert_eq!(
            catalog.get("floor-calacatta-gold").map(|t| t.name.as_str()),
            Some("Calacatta Gold")
        );
    }

    #[test]
    fn test_category_from_prefix() {
        assert_eq!(TileCategory::from_id("floor-oak"), TileCategory::Floor);
        assert_eq!(TileCategory::from_id("wall-subway"), TileCategory::Wall);
        assert_eq!(TileCategory::from_id("ceiling-panel"), TileCategory::Unknown);
        assert_eq!(TileCategory::from_id("floorless"), TileCategory::Unknown);
    }

    #[test]
    fn test_parse_toml_preserves_order() {
        let catalog = TileCatalog::parse_toml(
            r#"
            [[tiles]]
            id = "wall-b"
            name = "B"

            [[tiles]]
            id = "floor-a"
            name = "A"
            hint = "first floor"
            "#,
        )
        .unwrap();

        let ids: Vec<_> = catalog.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["wall-b", "floor-a"]);
        assert_eq!(catalog.get("wall-b").unwrap().hint, "");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = TileCatalog::from_tiles(vec![
            Tile::new("floor-a", "A", "", ""),
            Tile::new("floor-a", "Again", "", ""),
        ]);
        assert!(matches!(result, Err(VisionError::CatalogError(_))));
    }

    #[test]
    fn test_case_only_duplicate_ids_rejected() {
        let result = TileCatalog::from_tiles(vec![
            Tile::new("floor-A", "A", "", ""),
            Tile::new("floor-a", "Again", "", ""),
        ]);
        assert!(matches!(result, Err(VisionError::CatalogError(_))));

        let catalog = TileCatalog::from_tiles(vec![Tile::new("floor-A", "A", "", "")]).unwrap();
        assert_eq!(catalog.get("floor-a").map(|t| t.name.as_str()), Some("A"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = TileCatalog::from_tiles(vec![Tile::new("floor-a", "  ", "", "")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = TileCatalog::load_from_toml(Path::new("/nonexistent/catalog.toml"));
        assert!(matches!(result, Err(VisionError::CatalogError(_))));
    }
}
