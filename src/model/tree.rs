use super::image::{ImageKey, ImageRecord, ImageStatus};

/// Position of a tree in the forest. Stable for the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub usize);

/// Where a record sits inside its tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Root,
    Child(usize),
}

/// A canonical image and its cross-region copies, or a lone orphan.
#[derive(Clone, Debug)]
pub struct LineageTree {
    pub root: ImageRecord,
    pub children: Vec<ImageRecord>,
    pub orphan: bool,
}

impl LineageTree {
    pub fn new(root: ImageRecord) -> Self {
        Self { root, children: Vec::new(), orphan: false }
    }

    pub fn orphan(root: ImageRecord) -> Self {
        Self { root, children: Vec::new(), orphan: true }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn has_public_child(&self) -> bool {
        self.children.iter().any(ImageRecord::is_public)
    }

    pub fn record(&self, slot: Slot) -> Option<&ImageRecord> {
        match slot {
            Slot::Root => Some(&self.root),
            Slot::Child(i) => self.children.get(i),
        }
    }

    /// Root first, then children in display order.
    pub fn members(&self) -> impl Iterator<Item = &ImageRecord> {
        std::iter::once(&self.root).chain(self.children.iter())
    }

    pub fn members_mut(&mut self) -> impl Iterator<Item = &mut ImageRecord> {
        std::iter::once(&mut self.root).chain(self.children.iter_mut())
    }

    pub fn public_keys(&self) -> Vec<ImageKey> {
        self.members().filter(|r| r.is_public()).map(ImageRecord::key).collect()
    }

    /// (public, private) counts among the copies.
    pub fn copy_counts(&self) -> (usize, usize) {
        let public = self.children.iter().filter(|c| c.is_public()).count();
        let private = self.children.iter().filter(|c| c.is_private()).count();
        (public, private)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusTotals {
    pub total: usize,
    pub public: usize,
    pub private: usize,
}

/// All lineage trees, in display order. Built once, never restructured;
/// only record fields change afterwards.
#[derive(Clone, Debug, Default)]
pub struct Forest {
    trees: Vec<LineageTree>,
}

impl Forest {
    pub fn new(trees: Vec<LineageTree>) -> Self {
        Self { trees }
    }

    pub fn trees(&self) -> &[LineageTree] {
        &self.trees
    }

    pub fn tree(&self, id: TreeId) -> Option<&LineageTree> {
        self.trees.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = TreeId> {
        (0..self.trees.len()).map(TreeId)
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn record(&self, tree: TreeId, slot: Slot) -> Option<&ImageRecord> {
        self.tree(tree)?.record(slot)
    }

    pub fn records(&self) -> impl Iterator<Item = &ImageRecord> {
        self.trees.iter().flat_map(LineageTree::members)
    }

    pub fn orphans(&self) -> impl Iterator<Item = &LineageTree> {
        self.trees.iter().filter(|t| t.orphan)
    }

    pub fn find(&self, key: &ImageKey) -> Option<&ImageRecord> {
        self.records().find(|r| r.has_key(key))
    }

    pub fn status_of(&self, key: &ImageKey) -> Option<ImageStatus> {
        self.find(key).map(|r| r.status)
    }

    /// Apply `f` to every record carrying `key`. Returns how many matched.
    pub fn update_matching(&mut self, key: &ImageKey, mut f: impl FnMut(&mut ImageRecord)) -> usize {
        let mut matched = 0;
        for record in self.trees.iter_mut().flat_map(LineageTree::members_mut) {
            if record.has_key(key) {
                f(record);
                matched += 1;
            }
        }
        matched
    }

    pub fn totals(&self) -> StatusTotals {
        self.records().fold(StatusTotals::default(), |mut acc, r| {
            acc.total += 1;
            match r.status {
                ImageStatus::Public => acc.public += 1,
                ImageStatus::Private => acc.private += 1,
                _ => {}
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, region: &str, status: ImageStatus) -> ImageRecord {
        ImageRecord {
            id: id.into(),
            name: "capa-ami-test".into(),
            region: region.into(),
            created: None,
            status,
            architecture: "x86_64".into(),
            copied_from: None,
            error: None,
        }
    }

    fn sample() -> Forest {
        let mut tree = LineageTree::new(record("ami-root", "us-east-1", ImageStatus::Public));
        tree.children.push(record("ami-c1", "eu-west-1", ImageStatus::Private));
        tree.children.push(record("ami-c2", "us-west-2", ImageStatus::Public));
        Forest::new(vec![tree, LineageTree::orphan(record("ami-o", "ca-central-1", ImageStatus::Error))])
    }

    #[test]
    fn totals_count_public_and_private_only() {
        let totals = sample().totals();
        assert_eq!(totals, StatusTotals { total: 4, public: 2, private: 1 });
    }

    #[test]
    fn update_matching_touches_only_that_key() {
        let mut forest = sample();
        let key = ImageKey::new("us-west-2", "ami-c2");
        let n = forest.update_matching(&key, |r| r.status = ImageStatus::Updating);
        assert_eq!(n, 1);
        assert_eq!(forest.status_of(&key), Some(ImageStatus::Updating));
        assert_eq!(
            forest.status_of(&ImageKey::new("us-east-1", "ami-root")),
            Some(ImageStatus::Public)
        );
    }

    #[test]
    fn tree_helpers() {
        let forest = sample();
        let tree = forest.tree(TreeId(0)).unwrap();
        assert!(tree.has_public_child());
        assert_eq!(tree.copy_counts(), (1, 1));
        assert_eq!(tree.public_keys().len(), 2);
        assert_eq!(forest.orphans().count(), 1);
        assert_eq!(forest.record(TreeId(0), Slot::Child(1)).map(|r| r.id.as_str()), Some("ami-c2"));
        assert!(forest.record(TreeId(0), Slot::Child(5)).is_none());
    }
}
