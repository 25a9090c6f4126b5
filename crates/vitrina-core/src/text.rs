//! Search-side text normalization shared by ingestion and the query engine.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Folds a string into the token form used for substring matching.
///
/// Lowercases, strips diacritics (NFD decomposition with combining marks
/// dropped), turns every non-alphanumeric character into a space, and
/// collapses runs of whitespace. `"  Lápiz-Óptico  "` becomes
/// `"lapiz optico"`. Applying it twice yields the same result.
#[must_use]
pub fn clean(text: &str) -> String {
    let folded: String = text
        .nfd()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_ascii() {
        assert_eq!(clean("iPhone 13 PRO"), "iphone 13 pro");
    }

    #[test]
    fn strips_spanish_diacritics() {
        assert_eq!(clean("Batería Condición Ñandú"), "bateria condicion nandu");
    }

    #[test]
    fn replaces_punctuation_with_spaces() {
        assert_eq!(clean("USB-C/Lightning (1m)"), "usb c lightning 1m");
    }

    #[test]
    fn collapses_and_trims_whitespace() {
        assert_eq!(clean("  Azul \t  Marino\n"), "azul marino");
    }

    #[test]
    fn empty_and_symbol_only_inputs_become_empty() {
        assert_eq!(clean(""), "");
        assert_eq!(clean(" -- // "), "");
    }

    #[test]
    fn is_idempotent() {
        let once = clean("  Funda Silicóna — MagSafe® ");
        assert_eq!(clean(&once), once);
    }
}
