//! Cursor, viewport, expansion and selection over the flattened forest.
//!
//! `Selector::apply` is the single transition function; `reduce` is the
//! by-value form. Every transition that touches the expansion set or the
//! filter re-derives the view before returning, and keeps the cursor inside
//! the view.

mod view;

use std::collections::BTreeSet;
use std::ops::Range;

pub use view::{flatten, ViewEntry};

use crate::model::{Forest, ImageKey, ImageRecord, Slot, TreeId};

/// Operator intents, already decoded from key presses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    /// Expand/collapse a root with copies, otherwise toggle selection.
    Activate,
    ToggleExpand,
    Expand,
    Collapse,
    ExpandAll,
    CollapseAll,
    ToggleSelect,
    ToggleSubtree,
    ToggleHidePrivate,
    ToggleHelp,
    Confirm,
    /// Number of list rows the screen can show.
    Resize { rows: usize },
}

impl Command {
    /// Commands still honoured while revocations are running.
    fn allowed_while_updating(&self) -> bool {
        matches!(self, Command::ToggleHelp | Command::Resize { .. })
    }
}

/// Side effect requested by a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Revoke public launch permission for these keys.
    Dispatch(Vec<ImageKey>),
}

#[derive(Clone, Debug)]
pub struct Selector {
    cursor: usize,
    viewport: usize,
    page_height: usize,
    expanded: BTreeSet<TreeId>,
    selected: BTreeSet<ImageKey>,
    hide_private: bool,
    show_help: bool,
    updating: bool,
    view: Vec<ViewEntry>,
}

impl Selector {
    /// All trees collapsed, nothing selected, help visible.
    pub fn new(forest: &Forest, page_height: usize) -> Self {
        let mut selector = Self {
            cursor: 0,
            viewport: 0,
            page_height: page_height.max(1),
            expanded: BTreeSet::new(),
            selected: BTreeSet::new(),
            hide_private: false,
            show_help: true,
            updating: false,
            view: Vec::new(),
        };
        selector.rebuild_view(forest);
        selector
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    pub fn page_height(&self) -> usize {
        self.page_height
    }

    pub fn view(&self) -> &[ViewEntry] {
        &self.view
    }

    pub fn selected(&self) -> &BTreeSet<ImageKey> {
        &self.selected
    }

    pub fn is_selected(&self, key: &ImageKey) -> bool {
        self.selected.contains(key)
    }

    pub fn is_expanded(&self, tree: TreeId) -> bool {
        self.expanded.contains(&tree)
    }

    pub fn hide_private(&self) -> bool {
        self.hide_private
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Entry under the cursor; `None` when the view is empty.
    pub fn current(&self) -> Option<&ViewEntry> {
        self.view.get(self.cursor)
    }

    pub fn current_record<'a>(&self, forest: &'a Forest) -> Option<&'a ImageRecord> {
        self.current().and_then(|e| e.record(forest))
    }

    /// Indices of the view rows inside the viewport.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.viewport + self.page_height).min(self.view.len());
        self.viewport.min(end)..end
    }

    pub fn apply(&mut self, forest: &Forest, command: Command) -> Option<Outcome> {
        if self.updating && !command.allowed_while_updating() {
            return None;
        }

        match command {
            Command::Up => self.move_to(self.cursor.saturating_sub(1)),
            Command::Down => self.move_to(self.cursor + 1),
            Command::PageUp => self.move_to(self.cursor.saturating_sub(self.page_height)),
            Command::PageDown => self.move_to(self.cursor + self.page_height),
            Command::Home => self.move_to(0),
            Command::End => self.move_to(self.view.len().saturating_sub(1)),
            Command::Activate => {
                let expandable = self
                    .current()
                    .filter(|e| e.is_root())
                    .and_then(|e| forest.tree(e.tree))
                    .is_some_and(|t| t.has_children());
                if expandable {
                    self.toggle_expand(forest);
                } else {
                    self.toggle_select(forest);
                }
            }
            Command::ToggleExpand => self.toggle_expand(forest),
            Command::Expand => {
                if let Some(tree) = self.current_expandable_root(forest) {
                    if self.expanded.insert(tree) {
                        self.rebuild_view(forest);
                    }
                }
            }
            Command::Collapse => {
                if let Some(entry) = self.current().copied() {
                    if self.expanded.remove(&entry.tree) {
                        self.rebuild_view(forest);
                    }
                }
            }
            Command::ExpandAll => {
                for id in forest.ids() {
                    if forest.tree(id).is_some_and(|t| t.has_children()) {
                        self.expanded.insert(id);
                    }
                }
                self.rebuild_view(forest);
            }
            Command::CollapseAll => {
                self.expanded.clear();
                self.rebuild_view(forest);
            }
            Command::ToggleSelect => self.toggle_select(forest),
            Command::ToggleSubtree => self.toggle_subtree(forest),
            Command::ToggleHidePrivate => {
                self.hide_private = !self.hide_private;
                self.rebuild_view(forest);
            }
            Command::ToggleHelp => self.show_help = !self.show_help,
            Command::Confirm => return self.confirm(forest),
            Command::Resize { rows } => self.set_page_height(rows),
        }
        None
    }

    /// Re-derive the view, keeping the cursor on the same record when it is
    /// still visible, else on its tree root, else clamped.
    pub fn rebuild_view(&mut self, forest: &Forest) {
        let anchor = self.current().copied();
        self.view = flatten(forest, &self.expanded, self.hide_private);

        if self.view.is_empty() {
            self.cursor = 0;
            self.viewport = 0;
            return;
        }

        let last = self.view.len() - 1;
        self.cursor = anchor
            .and_then(|a| {
                self.view
                    .iter()
                    .position(|e| e.same_position(&a))
                    .or_else(|| self.view.iter().position(|e| e.tree == a.tree && e.is_root()))
            })
            .unwrap_or(self.cursor.min(last));
        self.scroll_to_cursor();
    }

    pub fn set_page_height(&mut self, rows: usize) {
        self.page_height = rows.max(1);
        self.scroll_to_cursor();
    }

    /// Drop a key from the selection. Returns whether it was selected.
    pub fn deselect(&mut self, key: &ImageKey) -> bool {
        self.selected.remove(key)
    }

    /// Leave the updating phase.
    pub fn finish_update(&mut self) {
        self.updating = false;
    }

    fn move_to(&mut self, target: usize) {
        if self.view.is_empty() {
            return;
        }
        self.cursor = target.min(self.view.len() - 1);
        self.scroll_to_cursor();
    }

    /// Minimal scroll: move the viewport only as far as needed to show the cursor.
    fn scroll_to_cursor(&mut self) {
        let height = self.page_height.max(1);
        if self.cursor < self.viewport {
            self.viewport = self.cursor;
        } else if self.cursor >= self.viewport + height {
            self.viewport = self.cursor + 1 - height;
        }
        let max_viewport = self.view.len().saturating_sub(height);
        if self.viewport > max_viewport {
            self.viewport = max_viewport;
        }
    }

    fn current_expandable_root(&self, forest: &Forest) -> Option<TreeId> {
        let entry = self.current()?;
        if entry.slot != Slot::Root {
            return None;
        }
        forest
            .tree(entry.tree)
            .filter(|t| t.has_children())
            .map(|_| entry.tree)
    }

    fn toggle_expand(&mut self, forest: &Forest) {
        let Some(tree) = self.current_expandable_root(forest) else { return };
        if !self.expanded.remove(&tree) {
            self.expanded.insert(tree);
        }
        self.rebuild_view(forest);
    }

    /// Public records toggle. Anything else can only leave the selection,
    /// e.g. a key whose revoke failed.
    fn toggle_select(&mut self, forest: &Forest) {
        let Some(record) = self.current_record(forest) else { return };
        let key = record.key();
        if !self.selected.remove(&key) && record.is_public() {
            self.selected.insert(key);
        }
    }

    /// Select every public member of the current tree, or deselect them all
    /// if they are all selected already.
    fn toggle_subtree(&mut self, forest: &Forest) {
        let Some(tree) = self.current().and_then(|e| forest.tree(e.tree)) else { return };
        let keys = tree.public_keys();
        if keys.is_empty() {
            return;
        }
        if keys.iter().all(|k| self.selected.contains(k)) {
            for key in &keys {
                self.selected.remove(key);
            }
        } else {
            self.selected.extend(keys);
        }
    }

    fn confirm(&mut self, forest: &Forest) -> Option<Outcome> {
        if self.selected.is_empty() {
            return None;
        }
        // Keys whose job already failed stay selected but are never retried.
        let keys: Vec<ImageKey> = self
            .selected
            .iter()
            .filter(|k| forest.find(k).is_some_and(ImageRecord::is_public))
            .cloned()
            .collect();
        if keys.is_empty() {
            return None;
        }
        self.updating = true;
        Some(Outcome::Dispatch(keys))
    }
}

/// By-value transition: `(state, command) -> (state, outcome)`.
pub fn reduce(mut selector: Selector, forest: &Forest, command: Command) -> (Selector, Option<Outcome>) {
    let outcome = selector.apply(forest, command);
    (selector, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageStatus, LineageTree};

    fn record(id: &str, region: &str, status: ImageStatus) -> ImageRecord {
        ImageRecord {
            id: id.into(),
            name: format!("capa-ami-{}", id),
            region: region.into(),
            created: None,
            status,
            architecture: "x86_64".into(),
            copied_from: None,
            error: None,
        }
    }

    /// r0 (public) with copies c0a (public), c0b (private);
    /// r1 (private) with copy c1a (private);
    /// r2..r9 public roots without copies.
    fn forest() -> Forest {
        let mut trees = Vec::new();
        let mut t0 = LineageTree::new(record("r0", "us-east-1", ImageStatus::Public));
        t0.children.push(record("c0a", "eu-west-1", ImageStatus::Public));
        t0.children.push(record("c0b", "us-west-2", ImageStatus::Private));
        trees.push(t0);
        let mut t1 = LineageTree::new(record("r1", "us-east-1", ImageStatus::Private));
        t1.children.push(record("c1a", "eu-west-1", ImageStatus::Private));
        trees.push(t1);
        for i in 2..10 {
            trees.push(LineageTree::new(record(&format!("r{}", i), "us-east-1", ImageStatus::Public)));
        }
        Forest::new(trees)
    }

    fn key(id: &str, region: &str) -> ImageKey {
        ImageKey::new(region, id)
    }

    fn current_id(selector: &Selector, forest: &Forest) -> String {
        selector.current_record(forest).unwrap().id.clone()
    }

    #[test]
    fn starts_collapsed_at_top() {
        let forest = forest();
        let selector = Selector::new(&forest, 5);
        assert_eq!(selector.view().len(), 10);
        assert_eq!(selector.cursor(), 0);
        assert!(selector.show_help());
        assert!(selector.selected().is_empty());
    }

    #[test]
    fn navigation_clamps_to_view() {
        let forest = forest();
        let mut s = Selector::new(&forest, 5);
        s.apply(&forest, Command::Up);
        assert_eq!(s.cursor(), 0);
        s.apply(&forest, Command::End);
        assert_eq!(s.cursor(), 9);
        s.apply(&forest, Command::Down);
        assert_eq!(s.cursor(), 9);
        s.apply(&forest, Command::PageDown);
        assert_eq!(s.cursor(), 9);
        s.apply(&forest, Command::PageUp);
        assert_eq!(s.cursor(), 4);
        s.apply(&forest, Command::Home);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn viewport_scrolls_minimally() {
        let forest = forest();
        let mut s = Selector::new(&forest, 3);
        for _ in 0..3 {
            s.apply(&forest, Command::Down);
        }
        assert_eq!(s.cursor(), 3);
        assert_eq!(s.viewport(), 1);
        assert_eq!(s.visible_range(), 1..4);

        s.apply(&forest, Command::Up);
        assert_eq!(s.viewport(), 1);
        s.apply(&forest, Command::Up);
        s.apply(&forest, Command::Up);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.viewport(), 0);

        s.apply(&forest, Command::End);
        assert_eq!(s.viewport(), 7);
    }

    #[test]
    fn resize_keeps_cursor_visible() {
        let forest = forest();
        let mut s = Selector::new(&forest, 10);
        s.apply(&forest, Command::End);
        assert_eq!(s.viewport(), 0);
        s.apply(&forest, Command::Resize { rows: 2 });
        assert_eq!(s.viewport(), 8);
        assert!(s.visible_range().contains(&s.cursor()));
        s.apply(&forest, Command::Resize { rows: 0 });
        assert_eq!(s.page_height(), 1);
    }

    #[test]
    fn toggle_expand_only_on_roots_with_copies() {
        let forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::ToggleExpand);
        assert!(s.is_expanded(TreeId(0)));
        assert_eq!(s.view().len(), 12);
        assert_eq!(s.cursor(), 0);

        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::ToggleExpand);
        assert_eq!(s.view().len(), 12);

        s.apply(&forest, Command::End);
        s.apply(&forest, Command::ToggleExpand);
        assert_eq!(s.view().len(), 12);
    }

    #[test]
    fn activate_expands_or_selects() {
        let forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::Activate);
        assert!(s.is_expanded(TreeId(0)));
        assert!(s.selected().is_empty());

        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::Activate);
        assert!(s.is_selected(&key("c0a", "eu-west-1")));
    }

    #[test]
    fn collapse_from_child_moves_to_root() {
        let forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::Expand);
        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::Down);
        assert_eq!(current_id(&s, &forest), "c0b");
        s.apply(&forest, Command::Collapse);
        assert!(!s.is_expanded(TreeId(0)));
        assert_eq!(current_id(&s, &forest), "r0");
    }

    #[test]
    fn collapse_all_keeps_cursor_in_bounds() {
        let forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::ExpandAll);
        assert_eq!(s.view().len(), 13);
        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::Down);
        assert_eq!(current_id(&s, &forest), "c1a");
        s.apply(&forest, Command::CollapseAll);
        assert_eq!(s.view().len(), 10);
        assert_eq!(current_id(&s, &forest), "r1");
    }

    #[test]
    fn toggle_select_twice_restores_selection() {
        let forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::End);
        let before = s.selected().clone();
        s.apply(&forest, Command::ToggleSelect);
        assert_eq!(s.selected().len(), 1);
        s.apply(&forest, Command::ToggleSelect);
        assert_eq!(s.selected(), &before);
    }

    #[test]
    fn private_entries_cannot_be_selected() {
        let forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::Down);
        assert_eq!(current_id(&s, &forest), "r1");
        s.apply(&forest, Command::ToggleSelect);
        s.apply(&forest, Command::Activate);
        assert!(s.selected().is_empty());
    }

    #[test]
    fn subtree_toggle_selects_then_clears_public_members() {
        let forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::Expand);
        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::ToggleSelect);
        assert_eq!(s.selected().len(), 1);

        s.apply(&forest, Command::ToggleSubtree);
        let expected: BTreeSet<ImageKey> =
            [key("r0", "us-east-1"), key("c0a", "eu-west-1")].into_iter().collect();
        assert_eq!(s.selected(), &expected);

        s.apply(&forest, Command::Home);
        s.apply(&forest, Command::ToggleSubtree);
        assert!(s.selected().is_empty());
    }

    #[test]
    fn subtree_toggle_without_public_members_is_noop() {
        let forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::ToggleSubtree);
        assert!(s.selected().is_empty());
    }

    #[test]
    fn hide_private_filters_and_clamps() {
        let forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::ExpandAll);
        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::Down);
        assert_eq!(current_id(&s, &forest), "c0b");

        s.apply(&forest, Command::ToggleHidePrivate);
        assert!(s.hide_private());
        // r1 and its copy are private, c0b is a private copy.
        assert_eq!(s.view().len(), 10);
        assert_eq!(current_id(&s, &forest), "r0");

        s.apply(&forest, Command::End);
        s.apply(&forest, Command::ToggleHidePrivate);
        assert_eq!(s.view().len(), 13);
        assert_eq!(current_id(&s, &forest), "r9");
    }

    #[test]
    fn empty_view_uses_sentinel_cursor() {
        let forest = Forest::new(vec![LineageTree::new(record("p", "us-east-1", ImageStatus::Private))]);
        let mut s = Selector::new(&forest, 5);
        s.apply(&forest, Command::ToggleHidePrivate);
        assert!(s.view().is_empty());
        assert_eq!(s.cursor(), 0);
        assert!(s.current().is_none());
        for command in [Command::Down, Command::End, Command::Activate, Command::ToggleSubtree, Command::Collapse] {
            s.apply(&forest, command);
        }
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.visible_range(), 0..0);
    }

    #[test]
    fn confirm_requires_selection_and_locks_navigation() {
        let forest = forest();
        let s = Selector::new(&forest, 20);
        let (mut s, outcome) = reduce(s, &forest, Command::Confirm);
        assert!(outcome.is_none());
        assert!(!s.is_updating());

        s.apply(&forest, Command::End);
        s.apply(&forest, Command::ToggleSelect);
        s.apply(&forest, Command::Home);
        s.apply(&forest, Command::ToggleSubtree);

        let (mut s, outcome) = reduce(s, &forest, Command::Confirm);
        assert_eq!(
            outcome,
            Some(Outcome::Dispatch(vec![
                key("c0a", "eu-west-1"),
                key("r0", "us-east-1"),
                key("r9", "us-east-1"),
            ]))
        );
        assert!(s.is_updating());

        s.apply(&forest, Command::Down);
        s.apply(&forest, Command::ToggleHidePrivate);
        assert_eq!(s.cursor(), 0);
        assert!(!s.hide_private());
        assert!(s.apply(&forest, Command::Confirm).is_none());

        s.apply(&forest, Command::ToggleHelp);
        assert!(!s.show_help());

        s.finish_update();
        s.apply(&forest, Command::Down);
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn confirm_skips_keys_that_are_no_longer_public() {
        let mut forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::End);
        s.apply(&forest, Command::ToggleSelect);
        forest.update_matching(&key("r9", "us-east-1"), |r| r.status = ImageStatus::Error);
        assert!(s.apply(&forest, Command::Confirm).is_none());
        assert!(!s.is_updating());
    }

    #[test]
    fn failed_key_can_be_cleared_but_not_reselected() {
        let mut forest = forest();
        let mut s = Selector::new(&forest, 20);
        s.apply(&forest, Command::End);
        s.apply(&forest, Command::ToggleSelect);
        let failed = key("r9", "us-east-1");
        forest.update_matching(&failed, |r| r.status = ImageStatus::Error);
        assert!(s.is_selected(&failed));

        s.apply(&forest, Command::ToggleSelect);
        assert!(s.selected().is_empty());
        s.apply(&forest, Command::ToggleSelect);
        assert!(s.selected().is_empty());
        s.apply(&forest, Command::Activate);
        assert!(s.selected().is_empty());
    }

    #[test]
    fn invariants_hold_over_command_sequences() {
        let forest = forest();
        let commands = [
            Command::Up,
            Command::Down,
            Command::PageUp,
            Command::PageDown,
            Command::Home,
            Command::End,
            Command::Activate,
            Command::ToggleExpand,
            Command::Expand,
            Command::Collapse,
            Command::ExpandAll,
            Command::CollapseAll,
            Command::ToggleSelect,
            Command::ToggleSubtree,
            Command::ToggleHidePrivate,
            Command::ToggleHelp,
        ];
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut s = Selector::new(&forest, 4);
        for _ in 0..2_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let command = commands[(seed % commands.len() as u64) as usize];
            s.apply(&forest, command);

            if s.view().is_empty() {
                assert_eq!(s.cursor(), 0);
            } else {
                assert!(s.cursor() < s.view().len());
                assert!(s.visible_range().contains(&s.cursor()));
            }
            assert_eq!(s.view(), flatten(&forest, &s.expanded, s.hide_private()).as_slice());
            for key in s.selected() {
                assert_eq!(forest.status_of(key), Some(ImageStatus::Public));
            }
        }
    }
}
