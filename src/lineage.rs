//! Reconstructs copy lineage between canonical images and their region copies.
//!
//! Every record from the canonical region becomes a tree root. Every other
//! record is attached by the first rule that matches:
//!
//! 1. a root with exactly the same name;
//! 2. a root whose id equals the record's copied-from reference;
//! 3. the copied-from reference names another record whose name is a root name;
//! 4. a root whose name is a prefix of the record's name, or the reverse.
//!
//! Records matching nothing become single-node orphan trees. Candidate roots
//! are scanned in (name, id) order so that ties resolve the same way on every
//! run, whatever order the provider returned records in.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{Forest, ImageRecord, LineageTree};

/// Which rule attached a record to its tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchRule {
    SameName,
    CopiedFromRoot,
    CopiedFromSibling,
    NamePrefix,
}

pub fn resolve(records: Vec<ImageRecord>, canonical_region: &str) -> Forest {
    let (mut roots, mut others): (Vec<ImageRecord>, Vec<ImageRecord>) =
        records.into_iter().partition(|r| r.region == canonical_region);

    roots.sort_by(by_name_then_id);
    others.sort_by(|a, b| {
        a.region
            .cmp(&b.region)
            .then_with(|| by_name_then_id(a, b))
    });

    // Name of every record by id; first in sorted order wins on duplicates.
    let mut name_by_id: HashMap<String, String> = HashMap::new();
    for record in roots.iter().chain(others.iter()) {
        name_by_id
            .entry(record.id.clone())
            .or_insert_with(|| record.name.clone());
    }

    let mut trees: Vec<LineageTree> = roots.into_iter().map(LineageTree::new).collect();

    let mut tree_by_name: HashMap<String, usize> = HashMap::new();
    for (idx, tree) in trees.iter().enumerate() {
        tree_by_name.entry(tree.root.name.clone()).or_insert(idx);
    }

    let mut orphans = Vec::new();
    for record in others {
        match find_parent(&trees, &tree_by_name, &name_by_id, &record) {
            Some((idx, rule)) => {
                tracing::debug!(image = %record.id, region = %record.region, root = %trees[idx].root.id, ?rule, "attached copy");
                trees[idx].children.push(record);
            }
            None => {
                tracing::debug!(image = %record.id, region = %record.region, "no lineage found");
                orphans.push(record);
            }
        }
    }

    for tree in &mut trees {
        tree.children
            .sort_by(|a, b| a.region.cmp(&b.region).then_with(|| a.id.cmp(&b.id)));
    }

    trees.extend(orphans.into_iter().map(LineageTree::orphan));
    trees.sort_by(|a, b| by_name_then_id(&a.root, &b.root));

    Forest::new(trees)
}

/// Index of the tree `record` belongs to, with the rule that matched.
pub fn find_parent(
    trees: &[LineageTree],
    tree_by_name: &HashMap<String, usize>,
    name_by_id: &HashMap<String, String>,
    record: &ImageRecord,
) -> Option<(usize, MatchRule)> {
    if let Some(&idx) = tree_by_name.get(&record.name) {
        return Some((idx, MatchRule::SameName));
    }

    if let Some(source) = record.copied_from.as_deref() {
        if let Some(idx) = trees.iter().position(|t| t.root.id == source) {
            return Some((idx, MatchRule::CopiedFromRoot));
        }
        if let Some(&idx) = name_by_id
            .get(source)
            .and_then(|source_name| tree_by_name.get(source_name))
        {
            return Some((idx, MatchRule::CopiedFromSibling));
        }
    }

    if record.name.is_empty() {
        return None;
    }
    trees
        .iter()
        .position(|t| {
            !t.root.name.is_empty()
                && (record.name.starts_with(&t.root.name) || t.root.name.starts_with(&record.name))
        })
        .map(|idx| (idx, MatchRule::NamePrefix))
}

fn by_name_then_id(a: &ImageRecord, b: &ImageRecord) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}
