// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Targets: what a click has to land outside of.
//!
//! A [`Target`] is a logical description (nodes, components, reactive references
//! to either, or lists of those). It is resolved to concrete [`ResolvedNodes`] every
//! time an interaction fires, so conditional rendering and reactive updates
//! between registration and the click are always honored.
//!
//! Resolution rules:
//!
//! - Reactive references are read; an empty reference contributes nothing.
//! - A component contributes every root node it currently renders (fragments and
//!   nested component roots are flattened through the [`ComponentHost`]).
//! - Nodes that are no longer alive contribute nothing.
//! - Lists contribute the union of their entries; duplicates collapse.
//!
//! ```
//! use understory_click_outside::component::NoComponents;
//! use understory_click_outside::reactive::Ref;
//! use understory_click_outside::target::Target;
//! use understory_dom::Document;
//!
//! let doc = Document::new();
//! let a = doc.create_element("div");
//! let later = Ref::new(None);
//!
//! let target = Target::from(vec![Target::Node(a), Target::NodeRef(later.clone())]);
//! assert_eq!(target.resolve(&doc, &NoComponents).as_slice(), &[a]);
//!
//! let b = doc.create_element("div");
//! later.set(Some(b));
//! assert_eq!(target.resolve(&doc, &NoComponents).as_slice(), &[a, b]);
//! ```

use alloc::vec::Vec;

use smallvec::SmallVec;
use understory_dom::{Document, NodeId};

use crate::component::{ComponentHandle, ComponentHost, instance_to_nodes};
use crate::reactive::Ref;

/// A logical click-outside target.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// A node.
    Node(NodeId),
    /// A component instance; resolves to its rendered root nodes. This is also
    /// what the hook form uses for the current component instance.
    Component(ComponentHandle),
    /// A reactive reference to a node.
    NodeRef(Ref<Option<NodeId>>),
    /// A reactive reference to a component instance.
    ComponentRef(Ref<Option<ComponentHandle>>),
    /// Several targets.
    List(Vec<Target>),
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<ComponentHandle> for Target {
    fn from(component: ComponentHandle) -> Self {
        Self::Component(component)
    }
}

impl From<Ref<Option<NodeId>>> for Target {
    fn from(node: Ref<Option<NodeId>>) -> Self {
        Self::NodeRef(node)
    }
}

impl From<Ref<Option<ComponentHandle>>> for Target {
    fn from(component: Ref<Option<ComponentHandle>>) -> Self {
        Self::ComponentRef(component)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Target {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> FromIterator<T> for Target {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}

impl Target {
    /// Resolve to the nodes this target denotes right now.
    pub fn resolve(&self, document: &Document, host: &dyn ComponentHost) -> ResolvedNodes {
        let mut out = ResolvedNodes::new();
        self.resolve_into(document, host, &mut out);
        out
    }

    /// Add the nodes this target denotes right now to `out`.
    pub fn resolve_into(
        &self,
        document: &Document,
        host: &dyn ComponentHost,
        out: &mut ResolvedNodes,
    ) {
        match self {
            Self::Node(node) => out.insert_alive(document, *node),
            Self::Component(component) => out.insert_component(document, host, *component),
            Self::NodeRef(node) => {
                if let Some(node) = node.get() {
                    out.insert_alive(document, node);
                }
            }
            Self::ComponentRef(component) => {
                if let Some(component) = component.get() {
                    out.insert_component(document, host, component);
                }
            }
            Self::List(items) => {
                for item in items {
                    item.resolve_into(document, host, out);
                }
            }
        }
    }
}

/// The concrete nodes a [`Target`] denotes at one moment.
///
/// Keeps first-seen order and never holds duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedNodes {
    nodes: SmallVec<[NodeId; 4]>,
}

impl ResolvedNodes {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node`; returns `false` if it was already present.
    pub fn insert(&mut self, node: NodeId) -> bool {
        if self.nodes.contains(&node) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    fn insert_alive(&mut self, document: &Document, node: NodeId) {
        if document.is_alive(node) {
            self.insert(node);
        }
    }

    fn insert_component(
        &mut self,
        document: &Document,
        host: &dyn ComponentHost,
        component: ComponentHandle,
    ) {
        for node in instance_to_nodes(host, component) {
            self.insert_alive(document, node);
        }
    }

    /// Returns `true` if `node` is a member.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns `true` if there are no members.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Members in first-seen order.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Iterate members in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }
}

impl Extend<NodeId> for ResolvedNodes {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        for node in iter {
            self.insert(node);
        }
    }
}
