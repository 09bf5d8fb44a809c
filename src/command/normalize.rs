//! Text normalization shared by every matching tier

/// Lowercase, drop everything that is not a word character or whitespace,
/// collapse whitespace runs to single spaces and trim.
///
/// Total and idempotent.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| is_word_char(c) || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(normalize("Calacatta, Gold!"), "calacatta gold");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  White \t Subway\n tile  "), "white subway tile");
    }

    #[test]
    fn test_keeps_underscores_and_digits() {
        assert_eq!(normalize("Tile_01 (v2)"), "tile_01 v2");
    }

    #[test]
    fn test_hyphen_removed_without_space() {
        assert_eq!(normalize("floor-tile-1"), "floortile1");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" ?! "), "");
    }

    proptest! {
        #[test]
        fn prop_idempotent(s in "[a-zA-Z0-9 _,.!?'\t-]{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn prop_no_edge_or_double_spaces(s in "[a-zA-Z0-9 _,.!?'\t-]{0,40}") {
            let out = normalize(&s);
            prop_assert!(!out.starts_with(' '));
            prop_assert!(!out.ends_with(' '));
            prop_assert!(!out.contains("  "));
        }
    }
}
