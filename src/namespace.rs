//! Namespace tag sets.
//!
//! Tags are used only for filtering. A filter set matches a callback's set
//! when every filter tag is present on the callback.

use std::collections::BTreeSet;
use std::fmt;

/// An unordered set of namespace tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    tags: BTreeSet<String>,
}

impl Namespaces {
    /// An empty set. Matches every callback when used as a filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Adds a tag. Returns false if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// True when every tag of `self` is present on `target`.
    #[must_use]
    pub fn is_subset_of(&self, target: &Self) -> bool {
        self.tags.is_subset(&target.tags)
    }

    #[allow(missing_docs)]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Namespaces {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Namespaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.tags {
            write!(f, ".{tag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matches_everything() {
        let empty = Namespaces::new();
        let tagged: Namespaces = ["x", "y"].into_iter().collect();
        assert!(empty.is_subset_of(&tagged));
        assert!(empty.is_subset_of(&Namespaces::new()));
    }

    #[test]
    fn test_subset_is_order_insensitive() {
        let filter: Namespaces = ["y", "x"].into_iter().collect();
        let target: Namespaces = ["x", "y"].into_iter().collect();
        assert!(filter.is_subset_of(&target));
    }

    #[test]
    fn test_extra_filter_tag_rejects() {
        let filter: Namespaces = ["x", "none"].into_iter().collect();
        let target: Namespaces = ["x", "y"].into_iter().collect();
        assert!(!filter.is_subset_of(&target));
    }

    #[test]
    fn test_display() {
        let set: Namespaces = ["b", "a"].into_iter().collect();
        assert_eq!(set.to_string(), ".a.b");
        assert_eq!(set.len(), 2);
    }
}
