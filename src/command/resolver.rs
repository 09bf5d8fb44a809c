//! Tile resolution - maps free text onto a catalog tile
//!
//! Tiers are tried in strict priority order and the first match wins.
//! There is no scoring across tiers; ties inside a tier go to the tile
//! that appears first in the catalog.

use crate::catalog::{Tile, TileCatalog};
use crate::command::normalize::normalize;
use crate::command::synonyms::SynonymTable;

/// Which tier produced a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    /// Input equals the tile id (case-insensitive)
    Sku,
    /// Normalized input equals the normalized tile name
    ExactName,
    /// Every input word occurs in the tile's name + hint
    Keywords,
    /// An input word is an alternate of a keyword in the tile's name + hint
    Synonym { word: String, canonical: String },
}

/// A resolved tile with the reason it matched
#[derive(Debug, Clone)]
pub struct TileMatch<'a> {
    pub tile: &'a Tile,
    pub reason: MatchReason,
}

/// Resolves user-typed tile references against the catalog
pub struct TileResolver<'a> {
    catalog: &'a TileCatalog,
    synonyms: &'a SynonymTable,
}

impl<'a> TileResolver<'a> {
    pub fn new(catalog: &'a TileCatalog, synonyms: &'a SynonymTable) -> Self {
        Self { catalog, synonyms }
    }

    /// Find the tile `text` refers to
    pub fn find_tile(&self, text: &str) -> Option<&'a Tile> {
        self.resolve(text).map(|m| m.tile)
    }

    /// Find the tile `text` refers to, reporting the matching tier
    pub fn resolve(&self, text: &str) -> Option<TileMatch<'a>> {
        let normalized = normalize(text);
        // An empty word list would satisfy the keyword tier vacuously
        if normalized.is_empty() {
            return None;
        }

        let found = self
            .match_sku(text, &normalized)
            .or_else(|| self.match_name(&normalized))
            .or_else(|| self.match_keywords(&normalized))
            .or_else(|| self.match_synonyms(&normalized));

        match &found {
            Some(m) => tracing::debug!(input = text, tile = %m.tile.id, reason = ?m.reason, "tile resolved"),
            None => tracing::debug!(input = text, "no tile matched"),
        }
        found
    }

    fn match_sku(&self, raw: &str, normalized: &str) -> Option<TileMatch<'a>> {
        // Ids usually carry hyphens, which normalization strips, so the
        // trimmed raw text is compared as well.
        let raw = raw.trim().to_lowercase();
        self.catalog
            .iter()
            .find(|t| {
                let id = t.id.to_lowercase();
                id == raw || id == normalized
            })
            .map(|tile| TileMatch {
                tile,
                reason: MatchReason::Sku,
            })
    }

    fn match_name(&self, normalized: &str) -> Option<TileMatch<'a>> {
        self.catalog
            .iter()
            .find(|t| normalize(&t.name) == normalized)
            .map(|tile| TileMatch {
                tile,
                reason: MatchReason::ExactName,
            })
    }

    fn match_keywords(&self, normalized: &str) -> Option<TileMatch<'a>> {
        let words: Vec<&str> = normalized.split(' ').collect();
        self.catalog
            .iter()
            .find(|t| {
                let text = search_text(t);
                words.iter().all(|w| text.contains(w))
            })
            .map(|tile| TileMatch {
                tile,
                reason: MatchReason::Keywords,
            })
    }

    fn match_synonyms(&self, normalized: &str) -> Option<TileMatch<'a>> {
        for tile in self.catalog.iter() {
            let text = search_text(tile);
            for word in normalized.split(' ') {
                if let Some(canonical) = self
                    .synonyms
                    .canonicals_for(word)
                    .find(|k| text.contains(k))
                {
                    return Some(TileMatch {
                        tile,
                        reason: MatchReason::Synonym {
                            word: word.to_string(),
                            canonical: canonical.to_string(),
                        },
                    });
                }
            }
        }
        None
    }
}

/// Normalized `name + " " + hint`
fn search_text(tile: &Tile) -> String {
    normalize(&format!("{} {}", tile.name, tile.hint))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TileCatalog {
        TileCatalog::from_tiles(vec![
            Tile::new("floor-calacatta-gold", "Calacatta Gold", "polished marble gold veins", ""),
            Tile::new("floor-oak-plank", "Rustic Plank", "brown wood look", ""),
            Tile::new("wall-carrara", "Carrara", "white marble wall", ""),
            Tile::new("wall-SUBWAY", "White Subway", "glossy ceramic", ""),
        ])
        .unwrap()
    }

    #[test]
    fn test_sku_case_insensitive() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        let m = resolver.resolve("FLOOR-CALACATTA-GOLD").unwrap();
        assert_eq!(m.tile.id, "floor-calacatta-gold");
        assert_eq!(m.reason, MatchReason::Sku);

        let m = resolver.resolve("wall-subway").unwrap();
        assert_eq!(m.tile.id, "wall-SUBWAY");
        assert_eq!(m.reason, MatchReason::Sku);
    }

    #[test]
    fn test_exact_name_ignores_punctuation() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        let m = resolver.resolve("calacatta, GOLD!").unwrap();
        assert_eq!(m.tile.id, "floor-calacatta-gold");
        assert_eq!(m.reason, MatchReason::ExactName);
    }

    #[test]
    fn test_keywords_any_order() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        let m = resolver.resolve("glossy subway").unwrap();
        assert_eq!(m.tile.id, "wall-SUBWAY");
        assert_eq!(m.reason, MatchReason::Keywords);

        let m = resolver.resolve("veins gold").unwrap();
        assert_eq!(m.tile.id, "floor-calacatta-gold");
    }

    #[test]
    fn test_keywords_first_in_catalog_order() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        // Both marble tiles contain "marble"; the earlier one wins
        assert_eq!(resolver.find_tile("marble").unwrap().id, "floor-calacatta-gold");
    }

    #[test]
    fn test_keywords_match_substrings() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        assert_eq!(resolver.find_tile("cera").unwrap().id, "wall-SUBWAY");
    }

    #[test]
    fn test_synonym_tier() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        let m = resolver.resolve("oak").unwrap();
        // "oak" is also a substring of the id, but ids are not searched
        assert_eq!(m.tile.id, "floor-oak-plank");
        assert_eq!(
            m.reason,
            MatchReason::Synonym {
                word: "oak".into(),
                canonical: "wood".into()
            }
        );
    }

    #[test]
    fn test_synonym_after_keywords_fail() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        // "granite" matches nothing directly and no tile mentions stone
        assert!(resolver.find_tile("granite").is_none());
    }

    #[test]
    fn test_empty_input_not_found() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        assert!(resolver.find_tile("").is_none());
        assert!(resolver.find_tile("   ").is_none());
        assert!(resolver.find_tile("?!").is_none());
    }

    #[test]
    fn test_unknown_text() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        assert!(resolver.find_tile("purple velvet").is_none());
    }
}
