//! Insertion-ordered buckets keyed by string.
//!
//! Both the directory grouper and the naming engine emit their buckets in
//! first-seen order, and neither reorders the items inside a bucket.

use std::collections::HashMap;

/// Items grouped by key, keys kept in first-seen order
#[derive(Debug, Clone)]
pub struct Buckets<T> {
    entries: Vec<(String, Vec<T>)>,
    index: HashMap<String, usize>,
}

impl<T> Buckets<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append an item to the bucket for `key`, creating it if needed
    pub fn push(&mut self, key: String, item: T) {
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1.push(item),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![item]));
            }
        }
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of items across all buckets
    pub fn item_count(&self) -> usize {
        self.entries.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.index
            .get(key)
            .map(|&position| self.entries[position].1.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries
            .iter()
            .map(|(key, items)| (key.as_str(), items.as_slice()))
    }
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for Buckets<T> {
    type Item = (String, Vec<T>);
    type IntoIter = std::vec::IntoIter<(String, Vec<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
