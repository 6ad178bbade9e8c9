use regex::Regex;
use std::sync::LazyLock;

pub const SLUG_MIN_LEN: usize = 5;

pub static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static HYPHEN_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("hyphen pattern is valid"));

/// Derive a URL slug from a listing title.
///
/// Lower-cases, keeps ASCII letters, digits, whitespace and hyphens, turns
/// whitespace runs into single hyphens and trims stray hyphens from the ends.
/// The result only ever contains `[a-z0-9-]` and deriving from an already
/// derived slug returns it unchanged. It may be empty when the title has no
/// usable characters.
pub fn derive_slug(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    let hyphenated = WHITESPACE.replace_all(kept.trim(), "-");
    let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Check a non-empty slug against the length and character rules
pub fn check_slug(slug: &str) -> Result<(), &'static str> {
    if slug.chars().count() < SLUG_MIN_LEN {
        return Err("Slug must be at least 5 characters");
    }
    if !SLUG_PATTERN.is_match(slug) {
        return Err("Slug can only contain lowercase letters, numbers, and hyphens");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_from_title() {
        assert_eq!(
            derive_slug("Luxury Apartment Downtown"),
            "luxury-apartment-downtown"
        );
    }

    #[test]
    fn test_derive_strips_punctuation_and_underscores() {
        assert_eq!(
            derive_slug("  Build your 5-Star Resort, Palm_Jumeirah!  "),
            "build-your-5-star-resort-palmjumeirah"
        );
    }

    #[test]
    fn test_derive_collapses_hyphen_runs() {
        assert_eq!(derive_slug("Villa - Sea  View"), "villa-sea-view");
        assert_eq!(derive_slug("--Corner--Plot--"), "corner-plot");
    }

    #[test]
    fn test_derive_can_be_empty() {
        assert_eq!(derive_slug("!!! ???"), "");
    }

    #[test]
    fn test_check_slug() {
        assert!(check_slug("marina-loft-2").is_ok());
        assert_eq!(check_slug("loft"), Err("Slug must be at least 5 characters"));
        assert_eq!(
            check_slug("Marina_Loft"),
            Err("Slug can only contain lowercase letters, numbers, and hyphens")
        );
    }
}
