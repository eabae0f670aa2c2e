use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("valid regex"));

/// Replace every run of non-word characters with a single underscore.
/// An empty input yields `fallback`.
pub fn filename_part(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        return fallback.to_string();
    }
    NON_WORD.replace_all(value, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_collapse_to_single_underscore() {
        assert_eq!(
            filename_part("Pune, Civil and Criminal Court", "complex"),
            "Pune_Civil_and_Criminal_Court"
        );
        assert_eq!(filename_part("a -- b", "x"), "a_b");
    }

    #[test]
    fn test_word_characters_survive() {
        assert_eq!(filename_part("Maharashtra", "state"), "Maharashtra");
        assert_eq!(filename_part("São Tomé", "state"), "São_Tomé");
    }

    #[test]
    fn test_empty_uses_fallback() {
        assert_eq!(filename_part("", "dist"), "dist");
    }
}
