//! Local edit source: turns a raw text change into replicated operations.
//!
//! The editor surface only reports "the text is now X". The change is reduced to
//! a single contiguous replacement by stripping the common prefix and suffix,
//! then expressed as deletes followed by inserts against visible positions.

use crate::crdt::{Operation, RGA};

/// One contiguous replacement, in chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff {
    /// Visible position where the change starts
    pub index: usize,
    /// Number of chars removed at `index`
    pub removed: usize,
    /// Text inserted at `index` after the removal
    pub inserted: String,
}

impl TextDiff {
    /// Computes the replacement that turns `old` into `new`, or `None` if they are equal.
    pub fn between(old: &str, new: &str) -> Option<Self> {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();

        let prefix = old
            .iter()
            .zip(&new)
            .take_while(|(a, b)| a == b)
            .count();
        let suffix = old[prefix..]
            .iter()
            .rev()
            .zip(new[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();

        let removed = old.len() - prefix - suffix;
        let inserted: String = new[prefix..new.len() - suffix].iter().collect();
        if removed == 0 && inserted.is_empty() {
            return None;
        }

        Some(TextDiff {
            index: prefix,
            removed,
            inserted,
        })
    }

    /// Applies the replacement to `rga` as local edits and returns the
    /// operations to broadcast, in the order they were applied.
    pub fn apply(&self, rga: &mut RGA) -> Vec<Operation> {
        let mut operations = Vec::with_capacity(self.removed + self.inserted.len());

        for _ in 0..self.removed {
            match rga.delete_local(self.index) {
                Some(id) => operations.push(Operation::Delete(id)),
                None => break,
            }
        }

        for (offset, value) in self.inserted.chars().enumerate() {
            let element = rga.insert_local(self.index + offset, value);
            operations.push(Operation::Insert(element));
        }

        operations
    }
}

/// Brings `rga`'s visible text to `new_text`, returning the operations that did it.
pub fn apply_text(rga: &mut RGA, new_text: &str) -> Vec<Operation> {
    match TextDiff::between(&rga.materialize(), new_text) {
        Some(diff) => diff.apply(rga),
        None => Vec::new(),
    }
}
