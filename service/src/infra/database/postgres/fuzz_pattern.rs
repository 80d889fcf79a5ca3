//! [`FuzzPattern`] definition.

use derive_more::Display;
use itertools::Itertools as _;
use postgres_types::{FromSql, ToSql};

/// `SIMILAR TO` pattern matching any text containing at least one word of a
/// search input.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct FuzzPattern(String);

impl FuzzPattern {
    /// Characters having a special meaning in `SIMILAR TO` patterns.
    const SPECIAL: &'static [char] = &[
        '\\', '%', '_', '|', '*', '+', '?', '{', '}', '(', ')', '[', ']',
    ];

    /// Creates a new [`FuzzPattern`] out of the given `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let words = input.split_whitespace().map(|word| {
            word.chars().fold(String::with_capacity(word.len()), |mut w, c| {
                if Self::SPECIAL.contains(&c) {
                    w.push('\\');
                }
                w.push(c);
                w
            })
        });
        Self(format!("%({})%", words.format("|")))
    }
}

#[cfg(test)]
mod spec {
    use super::FuzzPattern;

    #[test]
    fn matches_any_word() {
        assert_eq!(
            FuzzPattern::new("Sea  Pearl").to_string(),
            "%(Sea|Pearl)%",
        );
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(
            FuzzPattern::new("50% off_[a]").to_string(),
            r"%(50\%|off\_\[a\])%",
        );
    }
}
