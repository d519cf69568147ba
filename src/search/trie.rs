//! Character trie mapping title-token prefixes to book ids

use std::collections::{HashMap, HashSet};

use crate::models::BookId;

#[derive(Debug, Clone, Default)]
pub(crate) struct TrieNode {
    pub(crate) children: HashMap<char, TrieNode>,
    pub(crate) ids: HashSet<BookId>,
}

/// Prefix trie over catalog title tokens. Built once per rebuild and
/// immutable afterwards; concurrent readers only ever see a fully built
/// structure.
#[derive(Debug, Clone, Default)]
pub struct PrefixTrie {
    pub(crate) root: TrieNode,
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a word, attaching `id` to its terminal node. The word is
    /// case-folded before insertion.
    pub fn insert(&mut self, word: &str, id: BookId) {
        let mut node = &mut self.root;
        for ch in word.to_lowercase().chars() {
            node = node.children.entry(ch).or_default();
        }
        node.ids.insert(id);
    }

    /// All ids whose indexed words start with `prefix` (case-folded).
    ///
    /// A broken path yields the empty set, not an error. The empty prefix
    /// matches the root and returns every indexed id.
    pub fn search_prefix(&self, prefix: &str) -> HashSet<BookId> {
        let mut node = &self.root;
        for ch in prefix.to_lowercase().chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return HashSet::new(),
            }
        }
        let mut ids = HashSet::new();
        collect_ids(node, &mut ids);
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty() && self.root.ids.is_empty()
    }
}

fn collect_ids(node: &TrieNode, out: &mut HashSet<BookId>) {
    out.extend(node.ids.iter().copied());
    for child in node.children.values() {
        collect_ids(child, out);
    }
}
