//! Identifier scanning for source lines.

/// Splits a source line into word tokens.
///
/// A word is a maximal run of Unicode alphanumerics and `_`; everything else
/// separates words. Order and duplicates are kept.
///
/// This is an approximation of the names a line mentions. It misses the
/// member in `module.name` as a unit and yields keywords and numeric
/// literals too; callers only keep tokens that are actually bound.
#[must_use]
pub fn tokens(line: &str) -> Vec<&str> {
    line.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .collect()
}
