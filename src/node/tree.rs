//! The expression tree: an arena of nodes with named branches.
//!
//! Ownership runs downwards through branch child lists; each node also
//! carries a non-owning back-reference to its parent, which is what makes
//! the arena representation preferable to `Rc` cycles. All structural
//! mutation goes through [`Tree`] methods, which keep the branch lists, the
//! back-pointers and the dirty flags consistent with each other.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::error::{Result, TreeError};

use super::kind::{Kind, KindTable, Limits, Mode};
use super::style::Style;

new_key_type! {
    /// Stable handle to a node in a [`Tree`]'s arena.
    pub struct NodeId;
}

/// Addresses one ordered child list of a node. The named branches are
/// ordered; their declaration order defines traversal order. Cell branches
/// address tabular children by (row, column) and share the same storage
/// discipline.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Branch {
    Above,
    Body,
    Below,
    Superscript,
    Subscript,
    Cell(u16, u16),
}

impl Branch {
    pub const NAMED: [Branch; 5] = [
        Branch::Above,
        Branch::Body,
        Branch::Below,
        Branch::Superscript,
        Branch::Subscript,
    ];

    pub fn is_cell(self) -> bool {
        matches!(self, Branch::Cell(_, _))
    }
}

/// Literal content carried by a leaf node.
#[derive(PartialEq, Clone, Debug)]
pub enum Value {
    Symbol(char),
    Number(Decimal),
    Boolean(bool),
    Text(String),
}

/// One elementary typeset unit.
#[derive(PartialEq, Clone, Debug)]
pub struct Node {
    pub kind: Kind,
    pub mode: Mode,
    /// Literal content; mostly exclusive with having children.
    pub value: Option<Value>,
    /// Source command this node was parsed from, e.g. `\frac`.
    pub command: Option<String>,
    pub style: Style,
    pub limits: Limits,
    /// The unit hides its interior from external selection.
    pub captures_selection: bool,
    /// Entering the interior at a boundary auto-skips to the outside.
    pub skip_boundary: bool,
    /// Behaves as an extensible stretchy symbol.
    pub is_extensible_symbol: bool,
    /// Behaves as a function name.
    pub is_function: bool,
    pub selected: bool,
    pub has_caret: bool,
    pub(crate) verbatim_latex: Option<String>,
    pub(crate) dirty: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) tree_branch: Option<Branch>,
    pub(crate) branches: BTreeMap<Branch, Vec<NodeId>>,
    pub(crate) cached_children: Option<Vec<NodeId>>,
    pub(crate) render_id: Option<u64>,
}

impl Node {
    pub fn new(kind: Kind) -> Node {
        Node {
            kind,
            mode: Mode::Math,
            value: None,
            command: None,
            style: Style::default(),
            limits: Limits::Auto,
            captures_selection: false,
            skip_boundary: false,
            is_extensible_symbol: false,
            is_function: false,
            selected: false,
            has_caret: false,
            verbatim_latex: None,
            dirty: false,
            parent: None,
            tree_branch: None,
            branches: BTreeMap::new(),
            cached_children: None,
            render_id: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Which branch of its parent this node lives in.
    pub fn tree_branch(&self) -> Option<Branch> {
        self.tree_branch
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn verbatim_latex(&self) -> Option<&str> {
        self.verbatim_latex.as_deref()
    }

    /// Identifier assigned by the most recent render pass.
    pub fn render_id(&self) -> Option<u64> {
        self.render_id
    }

    pub fn is_digit(&self) -> bool {
        matches!(self.value, Some(Value::Symbol(c)) if c.is_ascii_digit())
    }
}

/// An expression tree. Nodes live in a slotmap arena; a `NodeId` stays
/// valid until the node is discarded.
#[derive(Clone, Debug)]
pub struct Tree {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
    kinds: KindTable,
}

impl Tree {
    pub fn new() -> Tree {
        Tree::with_kinds(KindTable::standard())
    }

    /// A tree using a custom kind-descriptor table, resolved here rather
    /// than through any global registry.
    pub fn with_kinds(kinds: KindTable) -> Tree {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node::new(Kind::Root));
        let mut tree = Tree { arena, root, kinds };
        tree.create_branch(root, Branch::Body);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kinds(&self) -> &KindTable {
        &self.kinds
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    /// Direct mutable access to a node's semantic fields. Callers editing
    /// anything that affects layout or serialization should follow up with
    /// [`Tree::mark_dirty`]; the dedicated setters below do so themselves.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id]
    }

    /// Inserts a fresh detached node into the arena.
    pub fn new_node(&mut self, kind: Kind) -> NodeId {
        self.arena.insert(Node::new(kind))
    }

    /// Inserts a fresh detached symbol node.
    pub fn new_symbol(&mut self, kind: Kind, c: char) -> NodeId {
        let mut node = Node::new(kind);
        node.value = Some(Value::Symbol(c));
        self.arena.insert(node)
    }

    /// Removes a detached node and its whole subtree from the arena.
    pub fn discard(&mut self, id: NodeId) {
        debug_assert!(self.arena[id].parent.is_none(), "discarding an attached node");
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.arena.remove(n) {
                for children in node.branches.values() {
                    stack.extend(children.iter().copied());
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Branch access and mutation
    // ------------------------------------------------------------------

    /// The child sequence of a branch, or `None` if the branch was never
    /// created. A present branch always begins with its sentinel.
    pub fn branch(&self, id: NodeId, branch: Branch) -> Option<&[NodeId]> {
        self.arena[id].branches.get(&branch).map(Vec::as_slice)
    }

    /// The materialized branches of a node, in traversal order.
    pub fn branch_names(&self, id: NodeId) -> Vec<Branch> {
        self.arena[id].branches.keys().copied().collect()
    }

    /// Returns the branch, creating it (seeded with a sentinel) if absent.
    pub fn create_branch(&mut self, id: NodeId, branch: Branch) -> &[NodeId] {
        if !self.arena[id].branches.contains_key(&branch) {
            let mode = self.arena[id].mode;
            let mut sentinel = Node::new(Kind::First);
            sentinel.mode = mode;
            let sentinel = self.arena.insert(sentinel);
            self.arena[sentinel].parent = Some(id);
            self.arena[sentinel].tree_branch = Some(branch);
            self.arena[id].branches.insert(branch, vec![sentinel]);
            self.mark_dirty(id);
        }
        self.arena[id].branches[&branch].as_slice()
    }

    /// True iff the branch is absent or holds only its sentinel.
    pub fn has_empty_branch(&self, id: NodeId, branch: Branch) -> bool {
        match self.branch(id, branch) {
            None => true,
            Some(children) => children.len() == 1,
        }
    }

    /// Replaces a branch's content with `children`. The sentinel is
    /// re-inserted automatically; passing content that already starts with
    /// a sentinel is a contract violation.
    pub fn set_children(&mut self, id: NodeId, branch: Branch, children: Vec<NodeId>) -> Result<()> {
        if let Some(&first) = children.first() {
            if self.arena[first].kind == Kind::First {
                return Err(TreeError::SentinelInContent);
            }
        }
        trace!(?branch, count = children.len(), "set_children");

        // Drop the old content, keeping the sentinel if one exists.
        let old = self.arena[id].branches.remove(&branch);
        let sentinel = match old {
            Some(old_children) => {
                let mut sentinel = None;
                for child in old_children {
                    if self.arena[child].kind == Kind::First && sentinel.is_none() {
                        sentinel = Some(child);
                    } else {
                        self.arena[child].parent = None;
                        self.arena[child].tree_branch = None;
                    }
                }
                sentinel
            }
            None => None,
        };
        let sentinel = sentinel.unwrap_or_else(|| {
            let mode = self.arena[id].mode;
            let mut node = Node::new(Kind::First);
            node.mode = mode;
            let sentinel = self.arena.insert(node);
            self.arena[sentinel].parent = Some(id);
            self.arena[sentinel].tree_branch = Some(branch);
            sentinel
        });

        let mut content = Vec::with_capacity(children.len() + 1);
        content.push(sentinel);
        for child in children {
            self.detach(child);
            self.arena[child].parent = Some(id);
            self.arena[child].tree_branch = Some(branch);
            content.push(child);
        }
        self.arena[id].branches.insert(branch, content);
        self.mark_dirty(id);
        Ok(())
    }

    /// Appends a child at the tail of a branch, creating the branch if
    /// needed. The child is detached from wherever it previously lived.
    pub fn add_child(&mut self, id: NodeId, branch: Branch, child: NodeId) {
        debug_assert!(self.arena[child].kind != Kind::Root, "root nodes cannot be children");
        debug_assert!(self.arena[child].kind != Kind::First, "sentinels are created by the tree");
        self.create_branch(id, branch);
        self.detach(child);
        self.arena[child].parent = Some(id);
        self.arena[child].tree_branch = Some(branch);
        self.arena[id].branches.get_mut(&branch).unwrap().push(child);
        self.mark_dirty(id);
    }

    /// Appends several children at the tail of a branch.
    pub fn add_children(&mut self, id: NodeId, branch: Branch, children: &[NodeId]) {
        for &child in children {
            self.add_child(id, branch, child);
        }
    }

    /// Inserts `child` immediately before `sibling` in the sibling's own
    /// branch.
    pub fn add_child_before(&mut self, child: NodeId, sibling: NodeId) -> Result<()> {
        self.insert_relative(child, sibling, 0)
    }

    /// Inserts `child` immediately after `sibling` in the sibling's own
    /// branch.
    pub fn add_child_after(&mut self, child: NodeId, sibling: NodeId) -> Result<()> {
        self.insert_relative(child, sibling, 1)
    }

    fn insert_relative(&mut self, child: NodeId, sibling: NodeId, offset: usize) -> Result<()> {
        let (parent, branch) = match (self.arena[sibling].parent, self.arena[sibling].tree_branch) {
            (Some(p), Some(b)) => (p, b),
            _ => return Err(TreeError::NotASibling),
        };
        self.detach(child);
        let children = self.arena[parent].branches.get_mut(&branch).unwrap();
        let index = children
            .iter()
            .position(|&c| c == sibling)
            .expect("sibling missing from its recorded branch");
        children.insert(index + offset, child);
        self.arena[child].parent = Some(parent);
        self.arena[child].tree_branch = Some(branch);
        self.mark_dirty(parent);
        Ok(())
    }

    /// Detaches every non-sentinel child of a branch and returns them; the
    /// sentinel is dropped and the branch ceases to exist.
    pub fn remove_branch(&mut self, id: NodeId, branch: Branch) -> Vec<NodeId> {
        let Some(children) = self.arena[id].branches.remove(&branch) else {
            return Vec::new();
        };
        let mut removed = Vec::with_capacity(children.len().saturating_sub(1));
        for child in children {
            if self.arena[child].kind == Kind::First {
                self.arena.remove(child);
            } else {
                self.arena[child].parent = None;
                self.arena[child].tree_branch = None;
                removed.push(child);
            }
        }
        self.mark_dirty(id);
        removed
    }

    /// Splices a node out of its recorded branch. Sentinels are not
    /// removable: the call is a no-op for them.
    pub fn remove_child(&mut self, child: NodeId) -> Result<()> {
        if self.arena[child].kind == Kind::First {
            return Ok(());
        }
        if self.arena[child].parent.is_none() {
            return Err(TreeError::NotAChild);
        }
        self.detach(child);
        Ok(())
    }

    /// Splices `child` out of wherever it currently lives, if anywhere,
    /// marking the old parent dirty.
    fn detach(&mut self, child: NodeId) {
        let (Some(parent), Some(branch)) = (self.arena[child].parent, self.arena[child].tree_branch)
        else {
            return;
        };
        let children = self
            .arena[parent]
            .branches
            .get_mut(&branch)
            .expect("child's recorded branch missing from parent");
        let index = children
            .iter()
            .position(|&c| c == child)
            .expect("child missing from its recorded branch");
        children.remove(index);
        self.arena[child].parent = None;
        self.arena[child].tree_branch = None;
        self.mark_dirty(parent);
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn siblings(&self, id: NodeId) -> Option<&[NodeId]> {
        let parent = self.arena[id].parent?;
        let branch = self.arena[id].tree_branch?;
        self.branch(parent, branch)
    }

    /// First entry of the node's branch (the sentinel). A root node has no
    /// siblings.
    pub fn first_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.siblings(id).and_then(|s| s.first().copied())
    }

    pub fn last_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.siblings(id).and_then(|s| s.last().copied())
    }

    pub fn left_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.siblings(id)?;
        let index = siblings.iter().position(|&c| c == id)?;
        if index == 0 {
            None
        } else {
            Some(siblings[index - 1])
        }
    }

    pub fn right_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.siblings(id)?;
        let index = siblings.iter().position(|&c| c == id)?;
        siblings.get(index + 1).copied()
    }

    pub fn is_first_sibling(&self, id: NodeId) -> bool {
        self.first_sibling(id) == Some(id)
    }

    pub fn is_last_sibling(&self, id: NodeId) -> bool {
        self.last_sibling(id) == Some(id)
    }

    /// The lowest node that is an ancestor of both `a` and `b`, if any.
    /// `common_ancestor(a, a)` is `a`'s parent; two nodes under the same
    /// immediate parent resolve to that parent without a full walk.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        if a == b {
            return self.arena[a].parent;
        }
        if self.arena[a].parent.is_some() && self.arena[a].parent == self.arena[b].parent {
            return self.arena[a].parent;
        }

        let mut seen = FxHashSet::default();
        let mut current = Some(a);
        while let Some(n) = current {
            seen.insert(n);
            current = self.arena[n].parent;
        }
        let mut current = Some(b);
        while let Some(n) = current {
            if seen.contains(&n) {
                return Some(n);
            }
            current = self.arena[n].parent;
        }
        None
    }

    /// The deepest unit reached by descending into `Body` past each leading
    /// sentinel, for as long as a non-empty body exists.
    pub fn initial_base_element(&self, id: NodeId) -> NodeId {
        let mut current = id;
        loop {
            if self.has_empty_branch(current, Branch::Body) {
                return current;
            }
            let body = self.branch(current, Branch::Body).unwrap();
            match body.iter().copied().find(|&c| self.arena[c].kind != Kind::First) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Whether this unit's initial base element is a plain character for
    /// the purposes of script placement. The kind set must match TeX's
    /// definition exactly; it changes numeric output.
    pub fn is_character_box(&self, id: NodeId) -> bool {
        matches!(
            self.arena[self.initial_base_element(id)].kind,
            Kind::Inner
                | Kind::Binary
                | Kind::Relation
                | Kind::Punctuation
                | Kind::Open
                | Kind::Close
                | Kind::Text
        )
    }

    /// Every descendant of a node, deepest first, across all branches in
    /// traversal order. Cached per node; the cache is invalidated by dirty
    /// propagation and refilled here.
    pub fn children(&mut self, id: NodeId) -> Vec<NodeId> {
        if let Some(cached) = &self.arena[id].cached_children {
            return cached.clone();
        }
        let mut result = Vec::new();
        let branches: Vec<Vec<NodeId>> = self.arena[id].branches.values().cloned().collect();
        for children in branches {
            for child in children {
                result.extend(self.children(child));
                result.push(child);
            }
        }
        self.arena[id].cached_children = Some(result.clone());
        result
    }

    // ------------------------------------------------------------------
    // Dirty propagation and cached state
    // ------------------------------------------------------------------

    /// Marks a node and every ancestor dirty, invalidating their cached
    /// flattened-child lists and verbatim markup. Propagation runs upward
    /// only, and is idempotent: once dirty, a node stays dirty until an
    /// external clean pass.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(n) = current {
            let node = &mut self.arena[n];
            node.dirty = true;
            node.cached_children = None;
            node.verbatim_latex = None;
            current = node.parent;
        }
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.arena[id].dirty
    }

    // ------------------------------------------------------------------
    // Semantic setters
    // ------------------------------------------------------------------

    pub fn set_value(&mut self, id: NodeId, value: Option<Value>) {
        self.arena[id].value = value;
        self.mark_dirty(id);
    }

    pub fn set_command(&mut self, id: NodeId, command: Option<String>) {
        self.arena[id].command = command;
        self.mark_dirty(id);
    }

    pub fn set_style(&mut self, id: NodeId, style: Style) {
        self.arena[id].style = style;
        self.mark_dirty(id);
    }

    /// Records the verbatim source text this subtree was parsed from, for
    /// exact round-trip serialization. Does not mark dirty: the parser
    /// records it after building the subtree.
    pub fn set_verbatim_latex(&mut self, id: NodeId, latex: Option<String>) {
        self.arena[id].verbatim_latex = latex;
    }

    /// Selection display state. Not a semantic edit; caches stay valid.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) {
        self.arena[id].selected = selected;
    }

    /// Caret display state. Not a semantic edit; caches stay valid.
    pub fn set_caret(&mut self, id: NodeId, has_caret: bool) {
        self.arena[id].has_caret = has_caret;
    }

    /// The node's effective style: every ancestor's overrides merged from
    /// the root down, the deepest setting for each field winning.
    pub fn computed_style(&self, id: NodeId) -> Style {
        let mut chain = vec![id];
        let mut current = self.arena[id].parent;
        while let Some(n) = current {
            chain.push(n);
            current = self.arena[n].parent;
        }
        let mut computed = Style::default();
        for n in chain.into_iter().rev() {
            computed = computed.overlaid_with(&self.arena[n].style);
        }
        computed
    }
}

impl Default for Tree {
    fn default() -> Tree {
        Tree::new()
    }
}
