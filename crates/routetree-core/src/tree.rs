#![forbid(unsafe_code)]

//! The route tree: node ownership, activation propagation, and change feeds.
//!
//! A [`RouteTree`] owns every node in a generational arena; callers hold
//! copyable [`NodeId`] handles. At any moment exactly one path of "active"
//! children from some node downward describes the selected branch, and the
//! engine's job is to keep that picture consistent while nodes are created,
//! activated, deactivated, and removed.
//!
//! # How activation propagates
//!
//! 1. `set_active(id, true)` stores the flag, publishes it, and reports the
//!    node to its parent as the new active child.
//! 2. The parent forces itself active (recursing toward the root), deactivates
//!    the previously active sibling (which cascades into that sibling's
//!    subtree), records the new active child, and republishes the
//!    active-descendant chain for itself and every ancestor.
//! 3. `set_active(id, false)` first deactivates every child recursively, then
//!    reports the node to its parent as inactive; the parent clears its
//!    active-child pointer and republishes chains upward.
//!
//! All of this happens synchronously inside the triggering call. Recursion is
//! bounded by tree depth; parent/child links form a strict tree, so no cycle
//! detection is needed. The tree is single-owner, single-thread state: there
//! is no internal locking, and interleaved mutation from multiple threads is
//! not supported.
//!
//! Removing a node that lies on the active chain deliberately does *not*
//! repair ancestor state: ancestors keep whatever chain remains, and walking
//! the chain stops at the first stale handle. Restoring a valid active path
//! after such a removal is the caller's responsibility.

use std::collections::HashMap;
use std::fmt;

use routetree_signal::{ChangeSignal, SignalFeed};
use tracing::{debug, trace};

use crate::path::{PathStep, RoutePath, Segment};

/// Handle to a node: arena slot index plus generation.
///
/// Handles stay valid until the node is removed. A handle to a removed node
/// is *stale*: reads through it return absence values, and [`RouteTree`]
/// never confuses it with a later node reusing the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

struct Node {
    generation: u32,
    name: Segment,
    parent: Option<NodeId>,
    children: HashMap<String, NodeId>,
    activation: ChangeSignal<bool>,
    active_child: ChangeSignal<Option<NodeId>>,
    active_descendants: ChangeSignal<Vec<NodeId>>,
}

impl Node {
    fn new(generation: u32, name: Segment, parent: Option<NodeId>) -> Self {
        Self {
            generation,
            name,
            parent,
            children: HashMap::new(),
            activation: ChangeSignal::new(false),
            active_child: ChangeSignal::new(None),
            active_descendants: ChangeSignal::new(Vec::new()),
        }
    }

    /// Release signals in reverse order of creation.
    fn close_signals(&mut self) {
        self.active_descendants.close();
        self.active_child.close();
        self.activation.close();
    }
}

/// An owned tree of named nodes with a single active branch.
///
/// See the [module docs](self) for the propagation model.
pub struct RouteTree {
    slots: Vec<Option<Node>>,
    generations: Vec<u32>,
    free: Vec<usize>,
    root: NodeId,
}

impl fmt::Debug for RouteTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTree")
            .field("nodes_alive", &self.node_count())
            .field("slots_total", &self.slots.len())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl RouteTree {
    /// Create a tree containing a single, inactive root named `root_name`.
    ///
    /// The root's name never appears in active paths or route strings; it
    /// exists so that every node, root included, has a valid identity.
    #[must_use]
    pub fn new(root_name: Segment) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        tree.root = tree.alloc(root_name, None);
        tree
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether `id` refers to a live node.
    ///
    /// A handle is live while its slot holds a node of the same generation;
    /// removal frees the slot and later reuse bumps the generation.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index as usize)
            .and_then(|slot| slot.as_ref())
            .is_some_and(|node| node.generation == id.generation)
    }

    /// Number of live nodes, the root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// The node's name, or `None` for a stale handle.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&Segment> {
        self.get(id).map(|node| &node.name)
    }

    /// The node's parent, or `None` for the root or a stale handle.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// The node's children, in no particular order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|node| node.children.values().copied().collect())
            .unwrap_or_default()
    }

    /// Look up a child by name without creating it.
    #[must_use]
    pub fn child_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.get(id)?.children.get(name).copied()
    }

    /// The node's activation flag; `false` for a stale handle.
    #[must_use]
    pub fn is_active(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|node| *node.activation.get())
    }

    /// The currently active child, or `None`.
    ///
    /// After the active child has been removed this still reports the stale
    /// handle until something overwrites it; check with [`RouteTree::is_alive`].
    #[must_use]
    pub fn active_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| *node.active_child.get())
    }

    /// The active chain below `id`: the active child, its active child, and
    /// so on to the deepest active node.
    ///
    /// This is the pure derived query; it walks the live pointers and stops
    /// at the first stale handle left behind by a removal.
    #[must_use]
    pub fn active_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let Some(mut node) = self.get(id) else {
            return chain;
        };
        while let Some(next) = *node.active_child.get() {
            match self.get(next) {
                Some(child) => {
                    chain.push(next);
                    node = child;
                }
                None => break,
            }
        }
        chain
    }

    /// The active chain below `id`, as names.
    #[must_use]
    pub fn active_path(&self, id: NodeId) -> Vec<Segment> {
        self.active_descendants(id)
            .into_iter()
            .map(|id| self.node(id).name.clone())
            .collect()
    }

    /// Return the child named `name`, creating and registering it if absent.
    ///
    /// Idempotent for existing names.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale: creating children under a removed node is a
    /// programming defect, not a runtime condition.
    pub fn child(&mut self, id: NodeId, name: &Segment) -> NodeId {
        assert!(self.is_alive(id), "dangling NodeId");
        if let Some(&existing) = self.node(id).children.get(name.as_str()) {
            return existing;
        }
        let child = self.alloc(name.clone(), Some(id));
        self.node_mut(id)
            .children
            .insert(name.as_str().to_owned(), child);
        debug!(parent = %self.node(id).name, child = %name, "route node created");
        child
    }

    /// Fold [`RouteTree::child`] over `path`, creating every missing
    /// intermediate node. An empty path returns `id` itself.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn descendant(&mut self, id: NodeId, path: &[Segment]) -> NodeId {
        path.iter().fold(id, |current, name| self.child(current, name))
    }

    /// Set the node's activation flag, propagating the consequences.
    ///
    /// A write equal to the current flag is a complete no-op: nothing is
    /// emitted and no propagation runs. Activating reports the node to its
    /// parent, which cascades activation up to the root. Deactivating first
    /// turns the whole subtree inactive, then reports the node to its parent.
    /// Stale handles are ignored.
    pub fn set_active(&mut self, id: NodeId, active: bool) {
        if !self.is_alive(id) {
            return;
        }
        if *self.node(id).activation.get() == active {
            return;
        }
        trace!(node = %self.node(id).name, active, "activation change");
        self.node_mut(id).activation.set(active);
        let parent = self.node(id).parent;
        if active {
            if let Some(parent) = parent {
                self.child_became_active(parent, id);
            }
        } else {
            let children: Vec<NodeId> = self.node(id).children.values().copied().collect();
            for child in children {
                self.set_active(child, false);
            }
            if let Some(parent) = parent {
                self.child_became_inactive(parent, id);
            }
        }
    }

    /// Replace the active branch below `id` with `path`.
    ///
    /// A non-empty path resolves (creating nodes as needed) and activates the
    /// target, which cascades activation through every intermediate node and
    /// on up to the root. An empty path deactivates the current active child
    /// — the node's own flag is deliberately left untouched, so clearing the
    /// branch does not deactivate the node it hangs from. Stale handles are
    /// ignored.
    pub fn set_active_path(&mut self, id: NodeId, path: &[Segment]) {
        if !self.is_alive(id) {
            return;
        }
        if path.is_empty() {
            if let Some(child) = *self.node(id).active_child.get() {
                self.set_active(child, false);
            }
        } else {
            let target = self.descendant(id, path);
            self.set_active(target, true);
        }
    }

    /// Apply a decomposed path starting from `from`.
    ///
    /// Absolute paths start at the root instead. [`PathStep::Parent`] ascends
    /// one level and clamps at the root; name steps create missing nodes the
    /// way [`RouteTree::child`] does.
    ///
    /// # Panics
    ///
    /// Panics if a stale handle ends up as the node a name step descends
    /// from (in particular, a stale `from` with a relative path).
    pub fn resolve(&mut self, from: NodeId, path: &RoutePath) -> NodeId {
        let mut current = if path.is_absolute { self.root } else { from };
        for step in &path.steps {
            current = match step {
                PathStep::Parent => self.parent(current).unwrap_or(current),
                PathStep::Name(name) => self.child(current, name),
            };
        }
        current
    }

    /// The absolute route string form for a node, or `None` for a stale
    /// handle. The root itself maps to `/`.
    #[must_use]
    pub fn absolute_route(&self, id: NodeId) -> Option<RoutePath> {
        if !self.is_alive(id) {
            return None;
        }
        let mut names = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            names.push(self.node(current).name.clone());
            current = parent;
        }
        names.reverse();
        Some(RoutePath::absolute(names))
    }

    /// Subscribe to the node's activation flag.
    ///
    /// Stale handles yield an already-terminated feed.
    pub fn subscribe_activation(&mut self, id: NodeId) -> SignalFeed<bool> {
        match self.get_mut(id) {
            Some(node) => node.activation.subscribe(),
            None => SignalFeed::terminated(),
        }
    }

    /// Subscribe to the node's active-child pointer.
    pub fn subscribe_active_child(&mut self, id: NodeId) -> SignalFeed<Option<NodeId>> {
        match self.get_mut(id) {
            Some(node) => node.active_child.subscribe(),
            None => SignalFeed::terminated(),
        }
    }

    /// Subscribe to the node's active-descendant chain.
    pub fn subscribe_active_descendants(&mut self, id: NodeId) -> SignalFeed<Vec<NodeId>> {
        match self.get_mut(id) {
            Some(node) => node.active_descendants.subscribe(),
            None => SignalFeed::terminated(),
        }
    }

    /// Tear down `id` and its whole subtree.
    ///
    /// Children are destroyed first (depth-first), then the node deregisters
    /// from its parent, then its signals close without a final value. The
    /// parent's active-child pointer is *not* repaired; see the module docs.
    /// Stale handles are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the root: the tree always has a root.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        assert!(id != self.root, "the root cannot be removed");
        self.teardown(id);
    }

    // --- internals ---

    fn alloc(&mut self, name: Segment, parent: Option<NodeId>) -> NodeId {
        let (index, generation) = if let Some(index) = self.free.pop() {
            let generation = self.generations[index].saturating_add(1);
            self.generations[index] = generation;
            self.slots[index] = Some(Node::new(generation, name, parent));
            (index as u32, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Node::new(generation, name, parent)));
            self.generations.push(generation);
            ((self.slots.len() - 1) as u32, generation)
        };
        NodeId { index, generation }
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        let node = self.slots.get(id.index as usize)?.as_ref()?;
        (node.generation == id.generation).then_some(node)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let node = self.slots.get_mut(id.index as usize)?.as_mut()?;
        (node.generation == id.generation).then_some(node)
    }

    fn node(&self, id: NodeId) -> &Node {
        self.slots[id.index as usize]
            .as_ref()
            .expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.index as usize]
            .as_mut()
            .expect("dangling NodeId")
    }

    /// A child reported itself active. Force this node active, swap out the
    /// previous active child, and republish chains up to the root.
    fn child_became_active(&mut self, parent: NodeId, child: NodeId) {
        if *self.node(parent).active_child.get() == Some(child) {
            return;
        }
        if !*self.node(parent).activation.get() {
            self.set_active(parent, true);
        }
        let previous = *self.node(parent).active_child.get();
        if let Some(previous) = previous {
            self.set_active(previous, false);
        }
        self.node_mut(parent).active_child.set(Some(child));
        self.refresh_active_descendants(parent);
    }

    /// A child reported itself inactive. Superseded reports (the child is no
    /// longer the active child) are ignored.
    fn child_became_inactive(&mut self, parent: NodeId, child: NodeId) {
        if *self.node(parent).active_child.get() != Some(child) {
            return;
        }
        self.node_mut(parent).active_child.set(None);
        self.refresh_active_descendants(parent);
    }

    /// Recompute and republish `active_descendants` for `from` and every
    /// ancestor. The chain view is defined from each node's own vantage
    /// point, so a change anywhere must be republished all the way up.
    fn refresh_active_descendants(&mut self, from: NodeId) {
        let mut current = Some(from);
        while let Some(id) = current {
            let chain = self.active_descendants(id);
            self.node_mut(id).active_descendants.set(chain);
            current = self.node(id).parent;
        }
    }

    fn teardown(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.node(id).children.values().copied().collect();
        for child in children {
            self.teardown(child);
        }
        if let Some(parent) = self.node(id).parent {
            self.detach_child(parent, id);
        }
        let mut node = self.slots[id.index as usize]
            .take()
            .expect("dangling NodeId");
        node.close_signals();
        self.free.push(id.index as usize);
        debug!(node = %node.name, "route node removed");
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId) {
        let name = self.node(child).name.as_str().to_owned();
        let removed = self.node_mut(parent).children.remove(&name);
        assert!(
            removed == Some(child),
            "route tree registry out of sync: {name:?} not registered under its parent",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(name: &str) -> Segment {
        Segment::new(name).unwrap()
    }

    fn segs(names: &[&str]) -> Vec<Segment> {
        names.iter().map(|name| seg(name)).collect()
    }

    fn tree() -> RouteTree {
        RouteTree::new(seg("root"))
    }

    #[test]
    fn child_creates_and_registers() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));
        assert_eq!(tree.name(a).unwrap().as_str(), "a");
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.child_by_name(root, "a"), Some(a));
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn child_is_idempotent_for_existing_names() {
        let mut tree = tree();
        let root = tree.root();
        let first = tree.child(root, &seg("a"));
        let second = tree.child(root, &seg("a"));
        assert_eq!(first, second);
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn descendant_creates_missing_intermediates() {
        let mut tree = tree();
        let root = tree.root();
        let c = tree.descendant(root, &segs(&["a", "b", "c"]));
        assert_eq!(tree.name(c).unwrap().as_str(), "c");
        let a = tree.child_by_name(root, "a").unwrap();
        let b = tree.child_by_name(a, "b").unwrap();
        assert_eq!(tree.parent(c), Some(b));
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn descendant_with_empty_path_returns_receiver() {
        let mut tree = tree();
        let root = tree.root();
        assert_eq!(tree.descendant(root, &[]), root);
    }

    #[test]
    fn activation_cascades_to_all_ancestors() {
        let mut tree = tree();
        let root = tree.root();
        let c = tree.descendant(root, &segs(&["a", "b", "c"]));
        tree.set_active(c, true);

        let a = tree.child_by_name(root, "a").unwrap();
        let b = tree.child_by_name(a, "b").unwrap();
        assert!(tree.is_active(root));
        assert!(tree.is_active(a));
        assert!(tree.is_active(b));
        assert!(tree.is_active(c));
        assert_eq!(tree.active_path(root), segs(&["a", "b", "c"]));
    }

    #[test]
    fn deactivation_cascades_through_subtree() {
        let mut tree = tree();
        let root = tree.root();
        let c = tree.descendant(root, &segs(&["a", "b", "c"]));
        tree.set_active(c, true);

        let a = tree.child_by_name(root, "a").unwrap();
        tree.set_active(a, false);

        let b = tree.child_by_name(a, "b").unwrap();
        assert!(!tree.is_active(a));
        assert!(!tree.is_active(b));
        assert!(!tree.is_active(c));
        assert!(tree.active_path(root).is_empty());
        // Clearing the branch does not deactivate the node it hung from.
        assert!(tree.is_active(root));
        assert_eq!(tree.active_child(root), None);
    }

    #[test]
    fn activating_a_sibling_deactivates_the_previous_branch() {
        let mut tree = tree();
        let root = tree.root();
        let a_leaf = tree.descendant(root, &segs(&["a", "x"]));
        let b = tree.descendant(root, &segs(&["b"]));
        tree.set_active(a_leaf, true);

        tree.set_active(b, true);

        let a = tree.child_by_name(root, "a").unwrap();
        assert!(!tree.is_active(a));
        assert!(!tree.is_active(a_leaf));
        assert!(tree.is_active(b));
        assert_eq!(tree.active_child(root), Some(b));
        assert_eq!(tree.active_path(root), segs(&["b"]));
    }

    #[test]
    fn reactivating_an_active_node_emits_nothing() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));
        tree.set_active(a, true);

        let mut activation = tree.subscribe_activation(a);
        let mut chain = tree.subscribe_active_descendants(root);
        tree.set_active(a, true);
        assert!(activation.drain().is_empty());
        assert!(chain.drain().is_empty());
    }

    #[test]
    fn deactivating_an_inactive_node_emits_nothing() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));

        let mut activation = tree.subscribe_activation(a);
        tree.set_active(a, false);
        assert!(activation.drain().is_empty());
    }

    #[test]
    fn active_child_feed_sees_the_switch_sequence() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));
        let b = tree.child(root, &seg("b"));

        let mut feed = tree.subscribe_active_child(root);
        tree.set_active(a, true);
        tree.set_active(b, true);

        // The previous child deactivates before the new one is recorded, so
        // the pointer passes through None in between.
        assert_eq!(feed.drain(), vec![Some(a), None, Some(b)]);
    }

    #[test]
    fn chain_feed_converges_on_the_full_path() {
        let mut tree = tree();
        let root = tree.root();
        let c = tree.descendant(root, &segs(&["a", "b", "c"]));

        let mut feed = tree.subscribe_active_descendants(root);
        tree.set_active(c, true);

        let published = feed.drain();
        let last = published.last().expect("chain must republish");
        assert_eq!(last, &tree.active_descendants(root));
        assert_eq!(last.len(), 3);
    }

    #[test]
    fn published_chain_matches_derived_walk_per_node() {
        let mut tree = tree();
        let root = tree.root();
        let c = tree.descendant(root, &segs(&["a", "b", "c"]));
        tree.set_active(c, true);
        let a = tree.child_by_name(root, "a").unwrap();
        let b = tree.child_by_name(a, "b").unwrap();

        for id in [root, a, b, c] {
            let cached = tree.node(id).active_descendants.get().clone();
            assert_eq!(cached, tree.active_descendants(id));
        }
    }

    #[test]
    fn set_active_path_round_trips() {
        let mut tree = tree();
        let root = tree.root();
        let path = segs(&["settings", "profile", "avatar"]);
        tree.set_active_path(root, &path);
        assert_eq!(tree.active_path(root), path);
    }

    #[test]
    fn set_active_path_switches_branches() {
        let mut tree = tree();
        let root = tree.root();
        tree.set_active_path(root, &segs(&["a", "x"]));
        tree.set_active_path(root, &segs(&["b"]));
        assert_eq!(tree.active_path(root), segs(&["b"]));
        let a = tree.child_by_name(root, "a").unwrap();
        assert!(!tree.is_active(a));
    }

    #[test]
    fn empty_path_clears_branch_but_not_the_receiver() {
        let mut tree = tree();
        let root = tree.root();
        tree.set_active_path(root, &segs(&["a", "b"]));
        assert!(tree.is_active(root));

        tree.set_active_path(root, &[]);
        assert!(tree.active_path(root).is_empty());
        assert_eq!(tree.active_child(root), None);
        assert!(tree.is_active(root));
    }

    #[test]
    fn empty_path_on_a_bare_node_is_a_no_op() {
        let mut tree = tree();
        let root = tree.root();
        tree.set_active_path(root, &[]);
        assert!(tree.active_path(root).is_empty());
        assert!(!tree.is_active(root));
    }

    #[test]
    fn relative_paths_resolve_from_the_receiver() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));
        let path: RoutePath = "b/c".parse().unwrap();
        let c = tree.resolve(a, &path);
        assert_eq!(
            tree.absolute_route(c).unwrap().to_string(),
            "/a/b/c"
        );
    }

    #[test]
    fn absolute_paths_resolve_from_the_root() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));
        let path: RoutePath = "/x/y".parse().unwrap();
        let y = tree.resolve(a, &path);
        assert_eq!(tree.absolute_route(y).unwrap().to_string(), "/x/y");
    }

    #[test]
    fn parent_steps_ascend_and_clamp_at_the_root() {
        let mut tree = tree();
        let root = tree.root();
        let b = tree.descendant(root, &segs(&["a", "b"]));

        let up: RoutePath = "../c".parse().unwrap();
        let c = tree.resolve(b, &up);
        assert_eq!(tree.absolute_route(c).unwrap().to_string(), "/a/c");

        let past_root: RoutePath = "../../../d".parse().unwrap();
        let d = tree.resolve(b, &past_root);
        assert_eq!(tree.absolute_route(d).unwrap().to_string(), "/d");
    }

    #[test]
    fn root_resolves_to_the_root_with_nothing_left() {
        let mut tree = tree();
        let root = tree.root();
        let b = tree.descendant(root, &segs(&["a", "b"]));
        let path: RoutePath = "/".parse().unwrap();
        assert_eq!(tree.resolve(b, &path), root);
        assert_eq!(tree.absolute_route(root).unwrap().to_string(), "/");
    }

    #[test]
    fn remove_clears_the_registry_and_frees_the_subtree() {
        let mut tree = tree();
        let root = tree.root();
        let c = tree.descendant(root, &segs(&["a", "b", "c"]));
        let a = tree.child_by_name(root, "a").unwrap();
        let b = tree.parent(c).unwrap();

        tree.remove(a);
        assert_eq!(tree.child_by_name(root, "a"), None);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(b));
        assert!(!tree.is_alive(c));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn removed_node_signals_stay_silent() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));
        tree.set_active(a, true);

        let mut activation = tree.subscribe_activation(a);
        let mut chain = tree.subscribe_active_descendants(a);
        tree.remove(a);

        assert!(activation.drain().is_empty());
        assert!(chain.drain().is_empty());
        assert!(activation.is_terminated());
        assert!(chain.is_terminated());
    }

    #[test]
    fn removing_an_active_node_leaves_ancestors_as_they_were() {
        let mut tree = tree();
        let root = tree.root();
        let b = tree.descendant(root, &segs(&["a", "b"]));
        tree.set_active(b, true);
        let a = tree.child_by_name(root, "a").unwrap();

        tree.remove(b);

        // The parent keeps its flag and its (now stale) pointer; the chain
        // walk simply stops where the branch was torn off.
        assert!(tree.is_active(a));
        assert!(tree.is_active(root));
        assert_eq!(tree.active_child(a), Some(b));
        assert!(!tree.is_alive(b));
        assert!(tree.active_descendants(a).is_empty());
        assert_eq!(tree.active_path(root), segs(&["a"]));
    }

    #[test]
    fn subscribing_to_a_stale_handle_yields_a_terminated_feed() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));
        tree.remove(a);

        let mut feed = tree.subscribe_activation(a);
        assert!(feed.is_terminated());
        assert_eq!(feed.try_next(), None);
    }

    #[test]
    fn slot_reuse_bumps_the_generation() {
        let mut tree = tree();
        let root = tree.root();
        let old = tree.child(root, &seg("a"));
        tree.remove(old);
        let new = tree.child(root, &seg("a"));
        assert!(tree.is_alive(new));
        assert!(!tree.is_alive(old));
        assert_ne!(old, new);
    }

    #[test]
    fn stale_handles_read_as_absence() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));
        tree.remove(a);

        assert_eq!(tree.name(a), None);
        assert_eq!(tree.parent(a), None);
        assert!(tree.children(a).is_empty());
        assert!(!tree.is_active(a));
        assert_eq!(tree.active_child(a), None);
        assert!(tree.active_descendants(a).is_empty());
        assert_eq!(tree.absolute_route(a), None);
    }

    #[test]
    fn stale_mutations_are_ignored() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.child(root, &seg("a"));
        tree.remove(a);

        tree.set_active(a, true);
        tree.set_active_path(a, &segs(&["x"]));
        tree.remove(a);
        assert_eq!(tree.node_count(), 1);
        assert!(!tree.is_active(root));
    }

    #[test]
    #[should_panic(expected = "the root cannot be removed")]
    fn removing_the_root_is_a_defect() {
        let mut tree = tree();
        let root = tree.root();
        tree.remove(root);
    }

    #[test]
    fn registry_keys_match_child_names_and_back_pointers() {
        let mut tree = tree();
        let root = tree.root();
        tree.descendant(root, &segs(&["a", "b"]));
        tree.descendant(root, &segs(&["c"]));

        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            for child in tree.children(id) {
                let name = tree.name(child).unwrap().as_str().to_owned();
                assert_eq!(tree.child_by_name(id, &name), Some(child));
                assert_eq!(tree.parent(child), Some(id));
                pending.push(child);
            }
        }
    }

    #[test]
    fn at_most_one_child_is_active_after_a_switch_storm() {
        let mut tree = tree();
        let root = tree.root();
        for name in ["a", "b", "c", "a", "c", "b"] {
            let child = tree.child(root, &seg(name));
            tree.set_active(child, true);
        }
        let active: Vec<NodeId> = tree
            .children(root)
            .into_iter()
            .filter(|&c| tree.is_active(c))
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(tree.active_child(root), Some(active[0]));
        assert_eq!(tree.name(active[0]).unwrap().as_str(), "b");
    }
}
