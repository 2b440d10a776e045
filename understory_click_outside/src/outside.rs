// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outside test and the sibling redirect escape hatch.
//!
//! A candidate node is *inside* when walking from it up through its ancestors
//! reaches a resolved target. Relocated content (portals, teleports) breaks that
//! walk: the moved node no longer has the logical target among its ancestors.
//! [`SiblingMap`] lets callers register a stand-in that stayed in place; when the
//! walk visits a relocated node whose stand-in is contained in a target, the
//! candidate counts as inside.
//!
//! ```
//! use understory_click_outside::outside::{SiblingMap, is_outside};
//! use understory_click_outside::target::ResolvedNodes;
//! use understory_dom::Document;
//!
//! let doc = Document::new();
//! let menu = doc.create_element("div");
//! let anchor = doc.create_element("span");
//! let popup = doc.create_element("div");
//! doc.append_child(doc.body(), menu).unwrap();
//! doc.append_child(menu, anchor).unwrap();
//! doc.append_child(doc.body(), popup).unwrap();
//!
//! let mut targets = ResolvedNodes::new();
//! targets.insert(menu);
//! let siblings = SiblingMap::new();
//!
//! assert!(is_outside(&doc, &siblings, &targets, Some(popup)));
//! siblings.mark(&doc, popup, anchor);
//! assert!(!is_outside(&doc, &siblings, &targets, Some(popup)));
//! siblings.unmark(popup);
//! assert!(is_outside(&doc, &siblings, &targets, Some(popup)));
//! ```

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use understory_dom::{Document, NodeId};

use crate::target::ResolvedNodes;

/// Associations from relocated nodes to stand-in siblings.
///
/// Clones share the same map. Keys and values are generational [`NodeId`]s, so
/// an entry never keeps either node alive: once either node is removed the entry
/// is ignored, and it is pruned on the next [`SiblingMap::mark`].
#[derive(Clone, Default)]
pub struct SiblingMap {
    inner: Rc<RefCell<HashMap<NodeId, NodeId>>>,
}

impl fmt::Debug for SiblingMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.borrow().iter()).finish()
    }
}

impl SiblingMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `relocated` as structurally co-located with `sibling`.
    ///
    /// Replaces any previous stand-in for `relocated`.
    pub fn mark(&self, document: &Document, relocated: NodeId, sibling: NodeId) {
        let mut map = self.inner.borrow_mut();
        map.retain(|k, v| document.is_alive(*k) && document.is_alive(*v));
        map.insert(relocated, sibling);
    }

    /// Forget the stand-in for `relocated`, returning it if there was one.
    pub fn unmark(&self, relocated: NodeId) -> Option<NodeId> {
        self.inner.borrow_mut().remove(&relocated)
    }

    /// The live stand-in for `node`, if both are alive.
    pub fn sibling_of(&self, document: &Document, node: NodeId) -> Option<NodeId> {
        let sibling = *self.inner.borrow().get(&node)?;
        (document.is_alive(node) && document.is_alive(sibling)).then_some(sibling)
    }

    /// Number of stored entries, including ones whose nodes have since been removed.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

/// Returns `true` if `candidate` lies outside every node in `nodes`.
///
/// Walks from `candidate` through its ancestors. A visited node that is a member
/// of `nodes`, or whose stand-in in `siblings` is contained in a member, makes the
/// candidate inside. An absent or removed candidate is outside.
pub fn is_outside(
    document: &Document,
    siblings: &SiblingMap,
    nodes: &ResolvedNodes,
    candidate: Option<NodeId>,
) -> bool {
    let Some(candidate) = candidate else {
        return true;
    };
    for node in document.ancestors(candidate) {
        if nodes.contains(node) {
            return false;
        }
        if let Some(sibling) = siblings.sibling_of(document, node)
            && nodes.iter().any(|target| document.contains(target, sibling))
        {
            return false;
        }
    }
    true
}
