//! Versioned wire representation of an index snapshot.
//!
//! The trie is flattened into a node array (node 0 is the root, children
//! reference nodes by array index) so a cached blob is explicit about its
//! layout and carries both a format version and the snapshot generation.
//! A redeployed process refuses blobs from a different format version
//! instead of misreading them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::BookId;

use super::trie::TrieNode;
use super::{IndexSnapshot, InvertedIndex, PrefixTrie};

pub const WIRE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct WireNode {
    pub children: Vec<(char, u32)>,
    pub ids: Vec<BookId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexWire {
    pub version: u32,
    pub generation: u64,
    pub nodes: Vec<WireNode>,
    pub terms: Vec<(String, Vec<BookId>)>,
}

/// Serialize a snapshot into the wire format.
pub fn encode(snapshot: &IndexSnapshot) -> AppResult<Vec<u8>> {
    let mut nodes = Vec::new();
    flatten(&snapshot.trie.root, &mut nodes);

    let mut terms: Vec<(String, Vec<BookId>)> = snapshot
        .inverted
        .postings()
        .map(|(term, ids)| {
            let mut ids: Vec<BookId> = ids.iter().copied().collect();
            ids.sort_unstable();
            (term.clone(), ids)
        })
        .collect();
    terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let wire = IndexWire {
        version: WIRE_VERSION,
        generation: snapshot.generation,
        nodes,
        terms,
    };
    serde_json::to_vec(&wire).map_err(|e| AppError::IndexWire(e.to_string()))
}

/// Decode a wire blob back into a snapshot, validating the format version
/// and node references.
pub fn decode(bytes: &[u8]) -> AppResult<IndexSnapshot> {
    let wire: IndexWire =
        serde_json::from_slice(bytes).map_err(|e| AppError::IndexWire(e.to_string()))?;

    if wire.version != WIRE_VERSION {
        return Err(AppError::IndexWire(format!(
            "unsupported wire version {} (expected {})",
            wire.version, WIRE_VERSION
        )));
    }
    if wire.nodes.is_empty() {
        return Err(AppError::IndexWire("missing root node".to_string()));
    }

    let mut visited = vec![false; wire.nodes.len()];
    let root = unflatten(&wire.nodes, 0, &mut visited)?;

    let mut inverted = InvertedIndex::new();
    for (term, ids) in wire.terms {
        for id in ids {
            inverted.add(term.clone(), id);
        }
    }

    Ok(IndexSnapshot {
        generation: wire.generation,
        trie: PrefixTrie { root },
        inverted,
    })
}

fn flatten(root: &TrieNode, out: &mut Vec<WireNode>) {
    // Children are appended after their parent, so indices always point
    // forwards and decode can validate them cheaply.
    out.push(WireNode {
        children: Vec::new(),
        ids: sorted_ids(&root.ids),
    });
    let mut queue: Vec<(usize, &TrieNode)> = vec![(0, root)];
    while let Some((index, node)) = queue.pop() {
        let mut children: Vec<(char, &TrieNode)> =
            node.children.iter().map(|(c, n)| (*c, n)).collect();
        children.sort_unstable_by_key(|(c, _)| *c);

        for (ch, child) in children {
            let child_index = out.len();
            out.push(WireNode {
                children: Vec::new(),
                ids: sorted_ids(&child.ids),
            });
            out[index].children.push((ch, child_index as u32));
            queue.push((child_index, child));
        }
    }
}

fn unflatten(nodes: &[WireNode], index: usize, visited: &mut [bool]) -> AppResult<TrieNode> {
    if index >= nodes.len() {
        return Err(AppError::IndexWire(format!(
            "node reference {} out of bounds",
            index
        )));
    }
    if visited[index] {
        return Err(AppError::IndexWire(format!(
            "cyclic node reference at {}",
            index
        )));
    }
    visited[index] = true;

    let wire_node = &nodes[index];
    let mut node = TrieNode {
        children: Default::default(),
        ids: wire_node.ids.iter().copied().collect(),
    };
    for (ch, child_index) in &wire_node.children {
        let child = unflatten(nodes, *child_index as usize, visited)?;
        node.children.insert(*ch, child);
    }
    Ok(node)
}

fn sorted_ids(ids: &HashSet<BookId>) -> Vec<BookId> {
    let mut ids: Vec<BookId> = ids.iter().copied().collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> IndexSnapshot {
        let mut trie = PrefixTrie::new();
        trie.insert("wizard", 1);
        trie.insert("wonder", 2);
        trie.insert("cat", 3);
        let mut inverted = InvertedIndex::new();
        inverted.add("wizard".to_string(), 1);
        inverted.add("oz".to_string(), 1);
        IndexSnapshot {
            generation: 5,
            trie,
            inverted,
        }
    }

    #[test]
    fn test_round_trip_preserves_prefix_semantics() {
        let bytes = encode(&snapshot()).unwrap();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.generation, 5);
        assert_eq!(decoded.trie.search_prefix("wo"), HashSet::from([2]));
        assert_eq!(decoded.trie.search_prefix(""), HashSet::from([1, 2, 3]));
        assert_eq!(decoded.inverted.lookup("oz"), HashSet::from([1]));
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let bytes = encode(&snapshot()).unwrap();
        let mut wire: IndexWire = serde_json::from_slice(&bytes).unwrap();
        wire.version = 99;
        let bytes = serde_json::to_vec(&wire).unwrap();

        assert!(matches!(decode(&bytes), Err(AppError::IndexWire(_))));
    }

    #[test]
    fn test_garbage_blob_is_rejected() {
        assert!(matches!(
            decode(b"not an index"),
            Err(AppError::IndexWire(_))
        ));
    }

    #[test]
    fn test_cyclic_node_references_are_rejected() {
        let wire = IndexWire {
            version: WIRE_VERSION,
            generation: 1,
            nodes: vec![WireNode {
                children: vec![('a', 0)],
                ids: vec![],
            }],
            terms: vec![],
        };
        let bytes = serde_json::to_vec(&wire).unwrap();
        assert!(matches!(decode(&bytes), Err(AppError::IndexWire(_))));
    }
}
