//! The structural validator: walks the whole tree checking every invariant at once.
//!
//! `O(n)` and not cheap - this is debugging and test-support code, not something to
//! call from a hot path. The checks below compile away entirely outside debug builds,
//! so `validate()` is safe to sprinkle after every mutation in a test without paying
//! for it in release.

use std::cmp::Ordering;
use std::ptr::NonNull;

use crate::alloc::Allocator;
use crate::comparator::Comparator;
use crate::node::{Color, Node};
use crate::tree::Tree;

impl<K, R, C, A> Tree<K, R, C, A>
where
    C: Comparator<K, R>,
    A: Allocator,
{
    /// Checks invariants 1-7 (BST order, two-color, leaf-black, red-property,
    /// black-height, root-black, parent-linkage) plus agreement between the
    /// forward and backward traversal orders and the tracked length.
    ///
    /// A no-op in release builds.
    pub fn validate(&self) {
        #[cfg(debug_assertions)]
        self.validate_impl();
    }

    #[cfg(debug_assertions)]
    fn validate_impl(&self) {
        if let Some(root) = self.root {
            assert_eq!(
                Node::color_of(Some(root)),
                Color::Black,
                "invariant violated: root must be black"
            );
            // SAFETY: `root` is the live root of this tree.
            assert_eq!(
                unsafe { root.as_ref() }.parent,
                None,
                "invariant violated: root must have no parent"
            );
        }

        let (count, _black_height) = self.validate_subtree(self.root, None, None);
        assert_eq!(
            count, self.len,
            "invariant violated: recorded length disagrees with the tree's actual node count"
        );

        self.validate_traversals();
    }

    /// Recursively checks a subtree bounded (exclusive) by `lower` and `upper`,
    /// returning `(node count, black height)`. Recursion depth is the subtree's
    /// height, which a red-black tree keeps at `O(log n)`.
    #[cfg(debug_assertions)]
    fn validate_subtree(
        &self,
        node: Option<NonNull<Node<R>>>,
        lower: Option<&R>,
        upper: Option<&R>,
    ) -> (usize, usize) {
        let n = match node {
            None => return (0, 1),
            Some(n) => n,
        };
        // SAFETY: `n` is a live node of this tree.
        let n_ref = unsafe { n.as_ref() };

        if let Some(lo) = lower {
            assert_eq!(
                self.comparator.cmp_records(lo, &n_ref.record),
                Ordering::Less,
                "invariant violated: BST order"
            );
        }
        if let Some(hi) = upper {
            assert_eq!(
                self.comparator.cmp_records(&n_ref.record, hi),
                Ordering::Less,
                "invariant violated: BST order"
            );
        }

        if n_ref.color == Color::Red {
            assert_eq!(
                Node::color_of(n_ref.left),
                Color::Black,
                "invariant violated: red node has a red child"
            );
            assert_eq!(
                Node::color_of(n_ref.right),
                Color::Black,
                "invariant violated: red node has a red child"
            );
        }

        if let Some(l) = n_ref.left {
            // SAFETY: `l` is a live node of this tree.
            assert_eq!(
                unsafe { l.as_ref() }.parent,
                Some(n),
                "invariant violated: parent linkage"
            );
        }
        if let Some(r) = n_ref.right {
            // SAFETY: `r` is a live node of this tree.
            assert_eq!(
                unsafe { r.as_ref() }.parent,
                Some(n),
                "invariant violated: parent linkage"
            );
        }

        let (left_count, left_bh) = self.validate_subtree(n_ref.left, lower, Some(&n_ref.record));
        let (right_count, right_bh) =
            self.validate_subtree(n_ref.right, Some(&n_ref.record), upper);
        assert_eq!(
            left_bh, right_bh,
            "invariant violated: black height differs between subtrees"
        );

        let black_height = left_bh + if n_ref.color == Color::Black { 1 } else { 0 };
        (left_count + right_count + 1, black_height)
    }

    #[cfg(debug_assertions)]
    fn validate_traversals(&self) {
        let mut forward = Vec::with_capacity(self.len);
        let mut cur = self.min();
        while let Some(id) = cur {
            forward.push(id);
            cur = self.successor(id);
        }
        assert_eq!(
            forward.len(),
            self.len,
            "invariant violated: forward traversal did not visit every node"
        );
        for pair in forward.windows(2) {
            let a = self.user_record(pair[0]);
            let b = self.user_record(pair[1]);
            assert_eq!(
                self.comparator.cmp_records(a, b),
                Ordering::Less,
                "invariant violated: forward traversal is not strictly increasing"
            );
        }

        let mut backward = Vec::with_capacity(self.len);
        let mut cur = self.max();
        while let Some(id) = cur {
            backward.push(id);
            cur = self.predecessor(id);
        }
        assert_eq!(
            backward.len(),
            self.len,
            "invariant violated: backward traversal did not visit every node"
        );
        for pair in backward.windows(2) {
            let a = self.user_record(pair[0]);
            let b = self.user_record(pair[1]);
            assert_eq!(
                self.comparator.cmp_records(a, b),
                Ordering::Greater,
                "invariant violated: backward traversal is not strictly decreasing"
            );
        }
    }
}
