use std::collections::BTreeSet;

use crate::model::{Forest, ImageRecord, Slot, TreeId};

/// One visible row of the flattened forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewEntry {
    pub tree: TreeId,
    pub slot: Slot,
    /// Last visible child of its tree (drawn with `└─`).
    pub last_child: bool,
}

impl ViewEntry {
    pub fn root(tree: TreeId) -> Self {
        Self { tree, slot: Slot::Root, last_child: false }
    }

    pub fn is_root(&self) -> bool {
        self.slot == Slot::Root
    }

    pub fn record<'a>(&self, forest: &'a Forest) -> Option<&'a ImageRecord> {
        forest.record(self.tree, self.slot)
    }

    /// Same record, ignoring the connector flag.
    pub fn same_position(&self, other: &ViewEntry) -> bool {
        self.tree == other.tree && self.slot == other.slot
    }
}

/// Derive the visible rows from the forest, the expansion set and the
/// hide-private flag. Private children are hidden under the filter; private
/// roots stay only when they still have a public child.
pub fn flatten(forest: &Forest, expanded: &BTreeSet<TreeId>, hide_private: bool) -> Vec<ViewEntry> {
    let mut view = Vec::new();

    for (idx, tree) in forest.trees().iter().enumerate() {
        let id = TreeId(idx);
        if hide_private && tree.root.is_private() && !tree.has_public_child() {
            continue;
        }
        view.push(ViewEntry::root(id));

        if !expanded.contains(&id) || !tree.has_children() {
            continue;
        }
        let first_child = view.len();
        for (child_idx, child) in tree.children.iter().enumerate() {
            if hide_private && child.is_private() {
                continue;
            }
            view.push(ViewEntry { tree: id, slot: Slot::Child(child_idx), last_child: false });
        }
        if view.len() > first_child {
            if let Some(last) = view.last_mut() {
                last.last_child = true;
            }
        }
    }

    view
}
