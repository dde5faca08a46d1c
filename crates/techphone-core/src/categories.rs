//! Category spelling-variant expansion.
//!
//! Product rows were written by several upstream tools that disagreed on
//! singular vs. plural category names (`tablet` / `tablets`, `accessory` /
//! `accessories`). Listing filters therefore match against the full variant
//! set rather than a single normalized string.

/// Expand a category string into its singular/plural spelling variants.
///
/// The input is trimmed and lowercased; the normalized form is always the
/// first element and the result contains no duplicates. Returns an empty
/// vector for blank input so callers can skip the filter entirely.
#[must_use]
pub fn expand_category_variants(category: &str) -> Vec<String> {
    let base = category.trim().to_lowercase();
    if base.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![base.clone()];
    let mut push = |v: String| {
        if !v.is_empty() && !variants.contains(&v) {
            variants.push(v);
        }
    };

    // Singular -> plural.
    if base.ends_with('y') && !ends_with_vowel_y(&base) {
        push(format!("{}ies", &base[..base.len() - 1]));
    } else if base.ends_with('s') || base.ends_with('x') || base.ends_with("ch") {
        push(format!("{base}es"));
    } else {
        push(format!("{base}s"));
    }

    // Plural -> singular.
    if let Some(stem) = base.strip_suffix("ies") {
        push(format!("{stem}y"));
    }
    if let Some(stem) = base.strip_suffix("es") {
        push(stem.to_string());
    }
    if let Some(stem) = base.strip_suffix('s') {
        push(stem.to_string());
    }

    variants
}

/// True when the trailing `y` follows a vowel (e.g. "toy"), so the plural is
/// a plain `-s` rather than `-ies`.
fn ends_with_vowel_y(word: &str) -> bool {
    let mut chars = word.chars().rev();
    let Some('y') = chars.next() else {
        return false;
    };
    matches!(chars.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}
