//! Literal / regex matchers for the `*Contains` condition fields.

use regex::Regex;

use crate::ConditionalError;

/// One item of a `*Contains` field
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Substring containment of the literal's string form
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    /// Literal from any displayable value (`true`, `42`, `"open"`)
    pub fn literal(value: impl ToString) -> Self {
        Self::Literal(value.to_string())
    }

    /// Compile a regex matcher
    pub fn pattern(pattern: &str) -> Result<Self, ConditionalError> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|source| ConditionalError::Pattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            Self::Literal(needle) => haystack.contains(needle.as_str()),
            Self::Pattern(re) => re.is_match(haystack),
        }
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<bool> for Matcher {
    fn from(value: bool) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<i64> for Matcher {
    fn from(value: i64) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<f64> for Matcher {
    fn from(value: f64) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<Regex> for Matcher {
    fn from(value: Regex) -> Self {
        Self::Pattern(value)
    }
}

/// Alternatives for one field; passes if any item matches
#[derive(Debug, Clone, Default)]
pub struct Matchers(Vec<Matcher>);

impl Matchers {
    pub fn new(items: Vec<Matcher>) -> Self {
        Self(items)
    }

    pub fn any_matches(&self, haystack: &str) -> bool {
        self.0.iter().any(|m| m.matches(haystack))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Matcher> for Matchers {
    fn from(value: Matcher) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<Matcher>> for Matchers {
    fn from(value: Vec<Matcher>) -> Self {
        Self(value)
    }
}

impl From<&str> for Matchers {
    fn from(value: &str) -> Self {
        Self(vec![value.into()])
    }
}

impl From<Regex> for Matchers {
    fn from(value: Regex) -> Self {
        Self(vec![value.into()])
    }
}

impl FromIterator<Matcher> for Matchers {
    fn from_iter<I: IntoIterator<Item = Matcher>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
