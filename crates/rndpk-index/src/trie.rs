//! Case-insensitive name trie
//!
//! Names are keyed by their lower-cased spelling in a [`radix_trie::Trie`];
//! the value is the display spelling of the first name inserted under that
//! key. Iteration follows the UTF-8 byte order of the keys, which puts a name
//! before every longer name it prefixes and siblings in ascending character
//! order.

use radix_trie::iter::Values;
use radix_trie::{SubTrie, Trie, TrieCommon};

/// Subtree reached by a prefix
#[derive(Debug)]
pub struct TrieNode<'a> {
    inner: SubTrie<'a, String, String>,
    key: String,
}

impl<'a> TrieNode<'a> {
    /// Display name ending exactly at this node
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        // A compressed edge can carry the node past the prefix
        let inner = &self.inner;
        inner
            .key()
            .filter(|key| **key == self.key)
            .and(inner.value())
            .map(String::as_str)
    }

    /// Check if no longer name passes through this node
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        (&self.inner).is_leaf()
    }

    /// Number of names at or below this node
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        (&self.inner).len()
    }

    /// Check if no name is stored below this node
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every name at or below this node
    ///
    /// The iterator is lazy; call again to restart from the first name.
    #[must_use]
    pub fn completions(&self) -> Completions<'a> {
        Completions {
            inner: (&self.inner).values(),
        }
    }
}

/// Lazy walk over the names of a subtree
pub struct Completions<'a> {
    inner: Values<'a, String, String>,
}

impl<'a> Iterator for Completions<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(String::as_str)
    }
}

/// Case-insensitive prefix trie over entity names
#[derive(Debug, Clone, Default)]
pub struct NameTrie {
    trie: Trie<String, String>,
}

fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

impl NameTrie {
    /// Create empty trie
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from names in order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self::new();
        for name in names {
            trie.insert(name.as_ref());
        }
        trie
    }

    /// Insert a name, returning `false` if it was empty or already present
    ///
    /// A name differing only in case keeps the first spelling.
    pub fn insert(&mut self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let key = fold_case(name);
        if self.trie.get(key.as_str()).is_some() {
            return false;
        }
        self.trie.insert(key, name.to_string());
        true
    }

    /// Subtree of names starting with `prefix`
    #[must_use]
    pub fn lookup(&self, prefix: &str) -> Option<TrieNode<'_>> {
        let key = fold_case(prefix);
        self.trie
            .get_raw_descendant(key.as_str())
            .map(|inner| TrieNode { inner, key })
    }

    /// Every name starting with `prefix`, in completion order
    #[must_use]
    pub fn complete(&self, prefix: &str) -> Vec<&str> {
        self.lookup(prefix)
            .map(|node| node.completions().collect())
            .unwrap_or_default()
    }

    /// Display spelling of an exact (case-insensitive) match
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.trie.get(fold_case(name).as_str()).map(String::as_str)
    }

    /// Check for an exact (case-insensitive) match
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Discard every name
    pub fn clear(&mut self) {
        self.trie = Trie::new();
    }

    /// Replace the contents with `names`
    pub fn rebuild<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear();
        for name in names {
            self.insert(name.as_ref());
        }
        tracing::debug!("Rebuilt name index with {} names", self.len());
    }

    /// Number of distinct names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        (&self.trie).len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every name, in completion order
    pub fn iter(&self) -> Completions<'_> {
        Completions {
            inner: (&self.trie).values(),
        }
    }
}
