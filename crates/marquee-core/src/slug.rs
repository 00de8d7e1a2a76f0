//! Title normalization
//!
//! Titles travel through URLs as slugs (`Pulp-Fiction`, `Jaws+2`) and are
//! stored with punctuation removed, so that a slug can always be turned back
//! into the stored key.

/// Parse a slug into a space separated string
///
/// Every `-` and every `+` becomes a single space. No trimming, no case
/// folding, and adjacent separators are not collapsed.
pub fn parse_slug(slug: &str) -> String {
    slug.replace(|c: char| c == '-' || c == '+', " ")
}

/// Strip everything except ASCII letters, digits and whitespace from a title
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_slug_separators() {
        assert_eq!(parse_slug("Jaws-2"), "Jaws 2");
        assert_eq!(parse_slug("Jaws+2"), "Jaws 2");
        assert_eq!(parse_slug("The-Big+Lebowski"), "The Big Lebowski");
    }

    #[test]
    fn test_parse_slug_keeps_adjacent_separators() {
        assert_eq!(parse_slug("a--b"), "a  b");
        assert_eq!(parse_slug("-edge+"), " edge ");
    }

    #[test]
    fn test_parse_slug_no_case_folding() {
        assert_eq!(parse_slug("ALIEN-vs-predator"), "ALIEN vs predator");
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Mr. Robot!"), "Mr Robot");
        assert_eq!(sanitize_title("Pulp Fiction!"), "Pulp Fiction");
        assert_eq!(sanitize_title("WALL·E"), "WALLE");
        assert_eq!(sanitize_title(""), "");
    }

    #[test]
    fn test_sanitize_keeps_whitespace() {
        assert_eq!(sanitize_title("a\tb\nc"), "a\tb\nc");
        assert_eq!(sanitize_title("Se7en (1995)"), "Se7en 1995");
    }

    #[test]
    fn test_sanitize_drops_non_ascii_letters() {
        assert_eq!(sanitize_title("Amélie"), "Amlie");
    }

    #[test]
    fn test_sanitized_title_survives_slug_round_trip() {
        let stored = sanitize_title("Jaws 2: The Revenge");
        let slug = stored.replace(' ', "-");
        assert_eq!(parse_slug(&slug), stored);
    }

    proptest! {
        #[test]
        fn test_parse_slug_idempotent_for_any_input(input in any::<String>()) {
            let once = parse_slug(&input);
            prop_assert_eq!(parse_slug(&once), once);
        }

        #[test]
        fn test_parse_slug_leaves_no_separators(input in any::<String>()) {
            let parsed = parse_slug(&input);
            prop_assert!(!parsed.contains('-'));
            prop_assert!(!parsed.contains('+'));
            prop_assert_eq!(parsed.chars().count(), input.chars().count());
        }

        #[test]
        fn test_sanitize_idempotent_for_any_input(input in any::<String>()) {
            let once = sanitize_title(&input);
            prop_assert_eq!(sanitize_title(&once), once);
        }

        #[test]
        fn test_sanitize_keeps_only_alphanumerics_and_whitespace(input in any::<String>()) {
            let sanitized = sanitize_title(&input);
            prop_assert!(sanitized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace()));
        }

        #[test]
        fn test_sanitize_keeps_clean_titles(input in "[a-zA-Z0-9 ]{0,40}") {
            prop_assert_eq!(sanitize_title(&input), input);
        }

        #[test]
        fn test_clean_title_survives_slug_round_trip(input in "[a-zA-Z0-9 ]{0,40}") {
            let slug = input.replace(' ', "-");
            prop_assert_eq!(parse_slug(&slug), input);
        }
    }
}
