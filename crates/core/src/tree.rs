//! In-memory directory tree with upward retention propagation
//!
//! Built once from a flat listing of every directory in a working copy,
//! marked with the directories to keep, then queried for the maximal
//! subtrees that can be purged from history.

use crate::path::{depth_then_lexical, RepoPath};
use ahash::AHashMap;

/// Index of a node inside a [`DirectoryTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

/// One directory in the tree
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    /// Full path from the repository root
    pub path: RepoPath,
    /// Parent node, `None` only for the root
    parent: Option<NodeId>,
    /// Immediate children keyed by last path segment
    children: AHashMap<String, NodeId>,
    /// Kept in the new repository (requested, or ancestor of something requested)
    retained: bool,
    /// Whole subtree kept; the prune walk never descends into it
    pinned: bool,
    /// Seen in the directory listing (as opposed to created on demand)
    listed: bool,
}

impl DirectoryNode {
    fn new(path: RepoPath, parent: Option<NodeId>) -> Self {
        Self {
            path,
            parent,
            children: AHashMap::new(),
            retained: false,
            pinned: false,
            listed: false,
        }
    }

    pub fn is_retained(&self) -> bool {
        self.retained
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn is_listed(&self) -> bool {
        self.listed
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Directory tree of one working-copy snapshot
///
/// Nodes live in an arena and point at their parent, so retention can be
/// pushed upward without searching. The root is always retained.
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    nodes: Vec<DirectoryNode>,
}

impl DirectoryTree {
    /// Create a tree holding only the root
    pub fn new() -> Self {
        let mut root = DirectoryNode::new(RepoPath::root(), None);
        root.retained = true;
        root.listed = true;
        Self { nodes: vec![root] }
    }

    /// Build a tree from an exhaustive directory listing in any order
    ///
    /// A child may arrive before its parent; missing ancestors are created
    /// on demand and flagged as listed once they show up.
    pub fn from_listing<I>(listing: I) -> Self
    where
        I: IntoIterator<Item = RepoPath>,
    {
        let mut tree = Self::new();
        for path in listing {
            tree.insert(&path);
        }
        tree
    }

    /// Insert a listed directory, creating its ancestor chain as needed
    pub fn insert(&mut self, path: &RepoPath) -> NodeId {
        let id = self.ensure(path);
        self.nodes[id.0].listed = true;
        id
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Look up a node without creating it
    pub fn find(&self, path: &RepoPath) -> Option<NodeId> {
        let mut current = ROOT;
        for segment in path.segments() {
            current = *self.nodes[current.0].children.get(segment)?;
        }
        Some(current)
    }

    pub fn node(&self, id: NodeId) -> &DirectoryNode {
        &self.nodes[id.0]
    }

    /// Whether `path` is kept, `None` if the tree has no such node
    pub fn is_retained(&self, path: &RepoPath) -> Option<bool> {
        self.find(path).map(|id| self.is_kept(id))
    }

    /// Mark `path` retained and propagate retention to every ancestor
    ///
    /// A path absent from the listing still gets its node chain so the
    /// ancestors are protected. Returns whether the path was listed.
    pub fn mark_retained(&mut self, path: &RepoPath) -> bool {
        let id = self.ensure(path);
        self.propagate(id);
        self.nodes[id.0].listed
    }

    /// Mark `path` and everything beneath it retained
    pub fn mark_subtree_retained(&mut self, path: &RepoPath) -> bool {
        let id = self.ensure(path);
        self.nodes[id.0].pinned = true;
        self.propagate(id);
        self.nodes[id.0].listed
    }

    /// Unconditionally keep the top-level metadata directory and its contents
    ///
    /// Returns false if no top-level directory has that name.
    pub fn mark_vcs_metadata_retained(&mut self, name: &str) -> bool {
        match self.nodes[ROOT.0].children.get(name).copied() {
            Some(id) => {
                self.nodes[id.0].pinned = true;
                self.propagate(id);
                true
            }
            None => false,
        }
    }

    /// Maximal prunable directories, shallowest first then lexical
    ///
    /// Depth-first walk: a retained node is descended into, an unretained
    /// node is emitted and its subtree skipped, a pinned node is skipped
    /// entirely. Linear in the number of nodes.
    pub fn compute_prune_set(&self) -> Vec<RepoPath> {
        let mut pruned = Vec::new();
        let mut stack = vec![ROOT];

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.pinned {
                continue;
            }
            if !node.retained {
                pruned.push(node.path.clone());
                continue;
            }
            stack.extend(node.children.values().copied());
        }

        pruned.sort_by(depth_then_lexical);
        pruned
    }

    /// Whether the node survives, either directly or under a pinned ancestor
    fn is_kept(&self, id: NodeId) -> bool {
        if self.nodes[id.0].retained {
            return true;
        }
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            if self.nodes[parent.0].pinned {
                return true;
            }
            current = self.nodes[parent.0].parent;
        }
        false
    }

    fn ensure(&mut self, path: &RepoPath) -> NodeId {
        let mut current = ROOT;
        let mut current_path = RepoPath::root();
        for segment in path.segments() {
            current_path = current_path.join(segment);
            let existing = self.nodes[current.0].children.get(segment).copied();
            current = match existing {
                Some(child) => child,
                None => {
                    let child = NodeId(self.nodes.len());
                    self.nodes
                        .push(DirectoryNode::new(current_path.clone(), Some(current)));
                    self.nodes[current.0]
                        .children
                        .insert(segment.to_string(), child);
                    child
                }
            };
        }
        current
    }

    // Every retained node has retained ancestors, so the walk can stop at
    // the first one that is already marked.
    fn propagate(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &mut self.nodes[node_id.0];
            if node.retained && node_id != id {
                break;
            }
            node.retained = true;
            current = node.parent;
        }
    }
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self::new()
    }
}
