//! The ordered, balanced container itself.
//!
//! Standard red-black insertion (cases A/B/C) and deletion (cases 1-4), adapted from
//! the textbook parent-pointer formulation to a tree with no sentinel node: absent
//! children are `None`, and deletion's fixup threads the "double-black" position's
//! parent through explicitly since there is no sentinel to hang a parent pointer off.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::alloc::{Allocator, SystemAllocator};
use crate::comparator::Comparator;
use crate::error::InsertError;
use crate::node::{Color, Node, NodeId};

/// An ordered associative container of `R` records, keyed and ordered entirely
/// through a `Comparator<K, R>` supplied at construction.
///
/// `A` is the allocation-failure probe consulted on every insert; it defaults to
/// [`SystemAllocator`], which never refuses.
pub struct Tree<K, R, C, A = SystemAllocator>
where
    C: Comparator<K, R>,
{
    pub(crate) root: Option<NonNull<Node<R>>>,
    pub(crate) len: usize,
    pub(crate) comparator: C,
    allocator: A,
    _key: PhantomData<fn(&K)>,
}

impl<K, R, C> Tree<K, R, C, SystemAllocator>
where
    C: Comparator<K, R>,
{
    /// Builds an empty container using the global allocator.
    pub fn new(comparator: C) -> Self {
        Self::with_allocator(comparator, SystemAllocator)
    }
}

impl<K, R, C, A> Tree<K, R, C, A>
where
    C: Comparator<K, R>,
    A: Allocator,
{
    /// Builds an empty container, consulting `allocator` before every node
    /// allocation.
    pub fn with_allocator(comparator: C, allocator: A) -> Self {
        Self {
            root: None,
            len: 0,
            comparator,
            allocator,
            _key: PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Tears the container down. Permitted only when empty; the caller remains
    /// responsible for every user record, which this container never owned.
    pub fn teardown(self) {
        debug_assert!(
            self.is_empty(),
            "teardown called on a non-empty container; delete every node first"
        );
    }

    pub fn user_record(&self, id: NodeId<R>) -> &R {
        // SAFETY: a `NodeId` is only ever constructed from a node that belongs to
        // this tree and has not been deleted.
        unsafe { &id.0.as_ref().record }
    }

    pub fn user_record_mut(&mut self, id: NodeId<R>) -> &mut R {
        let mut ptr = id.0;
        // SAFETY: see `user_record`. Callers must not mutate fields the comparator
        // reads, or the BST-order invariant breaks silently (invariant 1).
        unsafe { &mut ptr.as_mut().record }
    }

    pub fn find(&self, key: &K) -> Option<NodeId<R>> {
        let mut current = self.root;
        while let Some(n) = current {
            // SAFETY: `current` always names a live node while walking the tree.
            let record = unsafe { &n.as_ref().record };
            current = match self.comparator.cmp_key_record(key, record) {
                Ordering::Equal => return Some(NodeId(n)),
                // SAFETY: see above.
                Ordering::Less => unsafe { n.as_ref().left },
                Ordering::Greater => unsafe { n.as_ref().right },
            };
        }
        None
    }

    /// The node currently at the root, with no descent. Used by callers that empty
    /// the container by repeated root deletion rather than by ordered traversal
    /// (the harness's end-of-input cleanup does this; `min`/`max` stepping is a
    /// distinct, separately exposed strategy).
    pub fn root_handle(&self) -> Option<NodeId<R>> {
        self.root.map(NodeId)
    }

    pub fn min(&self) -> Option<NodeId<R>> {
        self.root.map(|r| NodeId(Self::leftmost(r)))
    }

    pub fn max(&self) -> Option<NodeId<R>> {
        self.root.map(|r| NodeId(Self::rightmost(r)))
    }

    fn leftmost(mut n: NonNull<Node<R>>) -> NonNull<Node<R>> {
        // SAFETY: every node reachable via `left`/`right` from a live node is live.
        while let Some(l) = unsafe { n.as_ref().left } {
            n = l;
        }
        n
    }

    fn rightmost(mut n: NonNull<Node<R>>) -> NonNull<Node<R>> {
        // SAFETY: see `leftmost`.
        while let Some(r) = unsafe { n.as_ref().right } {
            n = r;
        }
        n
    }

    pub fn successor(&self, id: NodeId<R>) -> Option<NodeId<R>> {
        let n = id.0;
        // SAFETY: `id` names a live node of this tree.
        if let Some(r) = unsafe { n.as_ref().right } {
            return Some(NodeId(Self::leftmost(r)));
        }
        let mut child = n;
        // SAFETY: see above.
        let mut parent = unsafe { n.as_ref().parent };
        while let Some(p) = parent {
            // SAFETY: `p` is reached by following live parent links.
            if unsafe { p.as_ref().left } == Some(child) {
                return Some(NodeId(p));
            }
            child = p;
            parent = unsafe { p.as_ref().parent };
        }
        None
    }

    pub fn predecessor(&self, id: NodeId<R>) -> Option<NodeId<R>> {
        let n = id.0;
        // SAFETY: `id` names a live node of this tree.
        if let Some(l) = unsafe { n.as_ref().left } {
            return Some(NodeId(Self::rightmost(l)));
        }
        let mut child = n;
        // SAFETY: see above.
        let mut parent = unsafe { n.as_ref().parent };
        while let Some(p) = parent {
            // SAFETY: `p` is reached by following live parent links.
            if unsafe { p.as_ref().right } == Some(child) {
                return Some(NodeId(p));
            }
            child = p;
            parent = unsafe { p.as_ref().parent };
        }
        None
    }

    /// Inserts `record`, failing if a record comparing equal is already present or
    /// the allocator declines the new node.
    pub fn insert(&mut self, record: R) -> Result<NodeId<R>, InsertError<R>> {
        let mut current = self.root;
        let mut parent: Option<NonNull<Node<R>>> = None;
        let mut go_left = false;

        while let Some(n) = current {
            // SAFETY: `current` always names a live node while walking the tree.
            let existing = unsafe { &n.as_ref().record };
            match self.comparator.cmp_records(&record, existing) {
                Ordering::Equal => return Err(InsertError::Exists(NodeId(n))),
                Ordering::Less => {
                    parent = Some(n);
                    go_left = true;
                    // SAFETY: see above.
                    current = unsafe { n.as_ref().left };
                }
                Ordering::Greater => {
                    parent = Some(n);
                    go_left = false;
                    // SAFETY: see above.
                    current = unsafe { n.as_ref().right };
                }
            }
        }

        if self.allocator.try_reserve_node().is_err() {
            return Err(InsertError::OutOfMemory);
        }

        let mut new_node = Node::new_leaf(record).alloc();
        // SAFETY: `new_node` was just allocated and is not yet reachable from `root`.
        unsafe {
            new_node.as_mut().parent = parent;
        }

        match parent {
            None => self.root = Some(new_node),
            Some(mut p) => {
                // SAFETY: `p` is a live node located by the walk above.
                unsafe {
                    if go_left {
                        p.as_mut().left = Some(new_node);
                    } else {
                        p.as_mut().right = Some(new_node);
                    }
                }
            }
        }

        self.len += 1;
        // SAFETY: `new_node` is freshly linked as a red leaf.
        unsafe { self.insert_fixup(new_node) };
        Ok(NodeId(new_node))
    }

    /// Case A/B/C rebalancing after linking a fresh red leaf.
    ///
    /// SAFETY: `node` must be live, red, and just linked into the tree.
    unsafe fn insert_fixup(&mut self, mut node: NonNull<Node<R>>) {
        while Node::color_of(node.as_ref().parent) == Color::Red {
            let mut parent = node.as_ref().parent.expect("red node always has a parent");
            // parent is red, so it cannot be the root; the grandparent exists.
            let mut grandparent = parent
                .as_ref()
                .parent
                .expect("a red parent is never the root");

            if Some(parent) == grandparent.as_ref().left {
                let uncle = grandparent.as_ref().right;
                if Node::color_of(uncle) == Color::Red {
                    log::debug!("insert rebalance: case A (red uncle)");
                    Node::set_color(Some(parent), Color::Black);
                    Node::set_color(uncle, Color::Black);
                    Node::set_color(Some(grandparent), Color::Red);
                    node = grandparent;
                } else {
                    if Some(node) == parent.as_ref().right {
                        log::debug!("insert rebalance: case B (inner grandchild)");
                        node = parent;
                        self.rotate_left(node);
                        parent = node.as_ref().parent.expect("rotate_left relinked a parent");
                        grandparent = parent
                            .as_ref()
                            .parent
                            .expect("case B preserves a black-or-absent uncle above");
                    }
                    log::debug!("insert rebalance: case C (outer grandchild)");
                    Node::set_color(Some(parent), Color::Black);
                    Node::set_color(Some(grandparent), Color::Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = grandparent.as_ref().left;
                if Node::color_of(uncle) == Color::Red {
                    log::debug!("insert rebalance: case A (red uncle)");
                    Node::set_color(Some(parent), Color::Black);
                    Node::set_color(uncle, Color::Black);
                    Node::set_color(Some(grandparent), Color::Red);
                    node = grandparent;
                } else {
                    if Some(node) == parent.as_ref().left {
                        log::debug!("insert rebalance: case B (inner grandchild)");
                        node = parent;
                        self.rotate_right(node);
                        parent = node.as_ref().parent.expect("rotate_right relinked a parent");
                        grandparent = parent
                            .as_ref()
                            .parent
                            .expect("case B preserves a black-or-absent uncle above");
                    }
                    log::debug!("insert rebalance: case C (outer grandchild)");
                    Node::set_color(Some(parent), Color::Black);
                    Node::set_color(Some(grandparent), Color::Red);
                    self.rotate_left(grandparent);
                }
            }
        }
        Node::set_color(self.root, Color::Black);
    }

    /// SAFETY: `pivot.right` must be `Some`.
    unsafe fn rotate_left(&mut self, mut pivot: NonNull<Node<R>>) {
        let mut right = pivot.as_ref().right.expect("rotate_left requires a right child");
        pivot.as_mut().right = right.as_ref().left;
        if let Some(mut rl) = right.as_ref().left {
            rl.as_mut().parent = Some(pivot);
        }
        right.as_mut().parent = pivot.as_ref().parent;
        match pivot.as_ref().parent {
            None => self.root = Some(right),
            Some(mut p) => {
                if p.as_ref().left == Some(pivot) {
                    p.as_mut().left = Some(right);
                } else {
                    p.as_mut().right = Some(right);
                }
            }
        }
        right.as_mut().left = Some(pivot);
        pivot.as_mut().parent = Some(right);
    }

    /// SAFETY: `pivot.left` must be `Some`.
    unsafe fn rotate_right(&mut self, mut pivot: NonNull<Node<R>>) {
        let mut left = pivot.as_ref().left.expect("rotate_right requires a left child");
        pivot.as_mut().left = left.as_ref().right;
        if let Some(mut lr) = left.as_ref().right {
            lr.as_mut().parent = Some(pivot);
        }
        left.as_mut().parent = pivot.as_ref().parent;
        match pivot.as_ref().parent {
            None => self.root = Some(left),
            Some(mut p) => {
                if p.as_ref().right == Some(pivot) {
                    p.as_mut().right = Some(left);
                } else {
                    p.as_mut().left = Some(left);
                }
            }
        }
        left.as_mut().right = Some(pivot);
        pivot.as_mut().parent = Some(left);
    }

    /// Deletes the node `id` names and returns its record.
    pub fn delete(&mut self, id: NodeId<R>) -> R {
        // SAFETY: `id` names a live node of this tree.
        unsafe { self.delete_node(id.0) }
    }

    /// SAFETY: `z` must be a live node belonging to this tree.
    unsafe fn delete_node(&mut self, z: NonNull<Node<R>>) -> R {
        let mut y = z;
        let mut y_original_color = y.as_ref().color;
        let x: Option<NonNull<Node<R>>>;
        let x_parent: Option<NonNull<Node<R>>>;

        if z.as_ref().left.is_none() {
            x = z.as_ref().right;
            x_parent = z.as_ref().parent;
            self.transplant(z, z.as_ref().right);
        } else if z.as_ref().right.is_none() {
            x = z.as_ref().left;
            x_parent = z.as_ref().parent;
            self.transplant(z, z.as_ref().left);
        } else {
            y = Self::leftmost(z.as_ref().right.expect("checked above"));
            y_original_color = y.as_ref().color;
            x = y.as_ref().right;

            if y.as_ref().parent == Some(z) {
                x_parent = Some(y);
                if let Some(mut xx) = x {
                    xx.as_mut().parent = Some(y);
                }
            } else {
                x_parent = y.as_ref().parent;
                self.transplant(y, y.as_ref().right);
                y.as_mut().right = z.as_ref().right;
                if let Some(mut zr) = y.as_ref().right {
                    zr.as_mut().parent = Some(y);
                }
            }

            self.transplant(z, Some(y));
            y.as_mut().left = z.as_ref().left;
            if let Some(mut zl) = y.as_ref().left {
                zl.as_mut().parent = Some(y);
            }
            y.as_mut().color = z.as_ref().color;
        }

        if y_original_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }

        self.len -= 1;
        Node::reclaim(z)
    }

    /// Replaces the subtree rooted at `u` with the subtree rooted at `v` (or
    /// nothing). Does not touch `v`'s own children.
    ///
    /// SAFETY: `u` must be a live node of this tree.
    unsafe fn transplant(&mut self, u: NonNull<Node<R>>, v: Option<NonNull<Node<R>>>) {
        match u.as_ref().parent {
            None => self.root = v,
            Some(mut p) => {
                if p.as_ref().left == Some(u) {
                    p.as_mut().left = v;
                } else {
                    p.as_mut().right = v;
                }
            }
        }
        if let Some(mut vv) = v {
            vv.as_mut().parent = u.as_ref().parent;
        }
    }

    /// Case 1-4 rebalancing after removing a black node. `x` is the node that now
    /// carries the deficit (possibly absent); `x_parent` is tracked explicitly since
    /// there is no sentinel node to hang a parent pointer off when `x` is `None`.
    unsafe fn delete_fixup(
        &mut self,
        mut x: Option<NonNull<Node<R>>>,
        mut x_parent: Option<NonNull<Node<R>>>,
    ) {
        while x != self.root && Node::color_of(x) == Color::Black {
            let parent = match x_parent {
                Some(p) => p,
                None => break,
            };

            if parent.as_ref().left == x {
                let mut sibling = parent
                    .as_ref()
                    .right
                    .expect("a black deficit always has a non-nil sibling");

                if Node::color_of(Some(sibling)) == Color::Red {
                    log::debug!("delete rebalance: case 1 (red sibling)");
                    Node::set_color(Some(sibling), Color::Black);
                    Node::set_color(Some(parent), Color::Red);
                    self.rotate_left(parent);
                    sibling = parent
                        .as_ref()
                        .right
                        .expect("a black deficit always has a non-nil sibling");
                }

                if Node::color_of(sibling.as_ref().left) == Color::Black
                    && Node::color_of(sibling.as_ref().right) == Color::Black
                {
                    log::debug!("delete rebalance: case 2 (both nephews black)");
                    Node::set_color(Some(sibling), Color::Red);
                    x = Some(parent);
                    x_parent = parent.as_ref().parent;
                } else {
                    if Node::color_of(sibling.as_ref().right) == Color::Black {
                        log::debug!("delete rebalance: case 3 (near nephew red)");
                        Node::set_color(sibling.as_ref().left, Color::Black);
                        Node::set_color(Some(sibling), Color::Red);
                        self.rotate_right(sibling);
                        sibling = parent
                            .as_ref()
                            .right
                            .expect("a black deficit always has a non-nil sibling");
                    }
                    log::debug!("delete rebalance: case 4 (far nephew red)");
                    Node::set_color(Some(sibling), parent.as_ref().color);
                    Node::set_color(Some(parent), Color::Black);
                    Node::set_color(sibling.as_ref().right, Color::Black);
                    self.rotate_left(parent);
                    x = self.root;
                    x_parent = None;
                }
            } else {
                let mut sibling = parent
                    .as_ref()
                    .left
                    .expect("a black deficit always has a non-nil sibling");

                if Node::color_of(Some(sibling)) == Color::Red {
                    log::debug!("delete rebalance: case 1 (red sibling)");
                    Node::set_color(Some(sibling), Color::Black);
                    Node::set_color(Some(parent), Color::Red);
                    self.rotate_right(parent);
                    sibling = parent
                        .as_ref()
                        .left
                        .expect("a black deficit always has a non-nil sibling");
                }

                if Node::color_of(sibling.as_ref().right) == Color::Black
                    && Node::color_of(sibling.as_ref().left) == Color::Black
                {
                    log::debug!("delete rebalance: case 2 (both nephews black)");
                    Node::set_color(Some(sibling), Color::Red);
                    x = Some(parent);
                    x_parent = parent.as_ref().parent;
                } else {
                    if Node::color_of(sibling.as_ref().left) == Color::Black {
                        log::debug!("delete rebalance: case 3 (near nephew red)");
                        Node::set_color(sibling.as_ref().right, Color::Black);
                        Node::set_color(Some(sibling), Color::Red);
                        self.rotate_left(sibling);
                        sibling = parent
                            .as_ref()
                            .left
                            .expect("a black deficit always has a non-nil sibling");
                    }
                    log::debug!("delete rebalance: case 4 (far nephew red)");
                    Node::set_color(Some(sibling), parent.as_ref().color);
                    Node::set_color(Some(parent), Color::Black);
                    Node::set_color(sibling.as_ref().left, Color::Black);
                    self.rotate_right(parent);
                    x = self.root;
                    x_parent = None;
                }
            }
        }
        Node::set_color(x, Color::Black);
    }
}

impl<K, R, C, A> Drop for Tree<K, R, C, A>
where
    C: Comparator<K, R>,
{
    fn drop(&mut self) {
        debug_assert!(
            self.is_empty(),
            "container dropped while non-empty; every node (and the record it \
             references) must be deleted before the container is torn down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::BudgetedAllocator;

    struct ByValue;

    impl Comparator<i64, i64> for ByValue {
        fn cmp_records(&self, a: &i64, b: &i64) -> Ordering {
            a.cmp(b)
        }

        fn cmp_key_record(&self, key: &i64, record: &i64) -> Ordering {
            key.cmp(record)
        }
    }

    fn drain(tree: &mut Tree<i64, i64, ByValue>) {
        while let Some(id) = tree.min() {
            tree.delete(id);
        }
    }

    #[test]
    fn insert_find_delete_roundtrip() {
        let mut tree = Tree::new(ByValue);
        for v in [5, 3, 8, 1, 4, 7, 9, 2, 6, 0] {
            tree.insert(v).unwrap();
        }
        assert_eq!(tree.len(), 10);
        for v in 0..10 {
            let id = tree.find(&v).expect("value should be present");
            assert_eq!(*tree.user_record(id), v);
        }
        tree.validate();

        let id = tree.find(&4).unwrap();
        assert_eq!(tree.delete(id), 4);
        assert!(tree.find(&4).is_none());
        assert_eq!(tree.len(), 9);
        tree.validate();

        drain(&mut tree);
        assert!(tree.is_empty());
        tree.teardown();
    }

    #[test]
    fn insert_rejects_duplicate() {
        let mut tree = Tree::new(ByValue);
        tree.insert(1).unwrap();
        match tree.insert(1) {
            Err(InsertError::Exists(id)) => assert_eq!(*tree.user_record(id), 1),
            other => panic!("expected Exists, got {other:?}"),
        }
        drain(&mut tree);
        tree.teardown();
    }

    #[test]
    fn insert_reports_out_of_memory() {
        let mut tree = Tree::with_allocator(ByValue, BudgetedAllocator::new(1));
        tree.insert(1).unwrap();
        match tree.insert(2) {
            Err(InsertError::OutOfMemory) => {}
            other => panic!("expected OutOfMemory, got {other:?}"),
        }
        drain(&mut tree);
        tree.teardown();
    }

    #[test]
    fn ascending_and_descending_traversal_agree_with_sorted_order() {
        let mut tree = Tree::new(ByValue);
        let values = [42, -7, 13, 0, 99, -100, 5, 5000];
        for v in values {
            tree.insert(v).unwrap();
        }

        let mut forward = Vec::new();
        let mut cur = tree.min();
        while let Some(id) = cur {
            forward.push(*tree.user_record(id));
            cur = tree.successor(id);
        }
        let mut expected = values.to_vec();
        expected.sort_unstable();
        assert_eq!(forward, expected);

        let mut backward = Vec::new();
        let mut cur = tree.max();
        while let Some(id) = cur {
            backward.push(*tree.user_record(id));
            cur = tree.predecessor(id);
        }
        expected.reverse();
        assert_eq!(backward, expected);

        drain(&mut tree);
        tree.teardown();
    }

    #[test]
    fn deleting_a_node_never_invalidates_unrelated_handles() {
        let mut tree = Tree::new(ByValue);
        let ids: Vec<_> = (0..50).map(|v| tree.insert(v).unwrap()).collect();
        tree.validate();

        // delete every third node; the untouched handles must still resolve
        for (i, id) in ids.iter().enumerate() {
            if i % 3 == 0 {
                tree.delete(*id);
            }
        }
        for (i, id) in ids.iter().enumerate() {
            if i % 3 != 0 {
                assert_eq!(*tree.user_record(*id), i as i64);
            }
        }
        tree.validate();

        drain(&mut tree);
        tree.teardown();
    }

    #[test]
    #[cfg_attr(not(debug_assertions), ignore)]
    fn large_random_sequence_stays_balanced() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let mut tree = Tree::new(ByValue);
        let mut present = std::collections::BTreeSet::new();

        for _ in 0..2000 {
            let v: i64 = rng.gen_range(0..500);
            if present.insert(v) {
                tree.insert(v).unwrap();
            } else {
                assert!(matches!(tree.insert(v), Err(InsertError::Exists(_))));
            }
        }
        tree.validate();
        assert_eq!(tree.len(), present.len());

        for v in present.iter().copied().collect::<Vec<_>>() {
            if rng.gen_bool(0.5) {
                let id = tree.find(&v).unwrap();
                tree.delete(id);
            }
        }
        tree.validate();

        drain(&mut tree);
        tree.teardown();
    }
}
