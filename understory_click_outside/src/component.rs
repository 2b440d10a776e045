// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam to a component framework.
//!
//! Click-outside targets may name framework components rather than nodes. The
//! engine never walks a framework's instance tree itself; it asks a
//! [`ComponentHost`] what a component currently renders as a [`RenderedRoot`] and
//! flattens that with [`instance_to_nodes`].
//!
//! [`ComponentTree`] is a small in-memory host, useful for adapters that keep
//! their own bookkeeping and for tests that need components without a framework.
//!
//! ```
//! use understory_click_outside::component::{ComponentTree, RenderedRoot, instance_to_nodes};
//! use understory_dom::Document;
//!
//! let doc = Document::new();
//! let (a, b) = (doc.create_element("li"), doc.create_element("li"));
//!
//! let tree = ComponentTree::new();
//! let list = tree.create();
//! tree.set_rendered(list, RenderedRoot::Fragment(vec![
//!     RenderedRoot::Node(a),
//!     RenderedRoot::Empty,
//!     RenderedRoot::Node(b),
//! ]));
//!
//! assert_eq!(instance_to_nodes(&tree, list).as_slice(), &[a, b]);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;
use understory_dom::NodeId;

/// Opaque handle of a component instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentHandle(u64);

impl ComponentHandle {
    /// Wrap a host-defined identifier.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-defined identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// What a component currently renders at its root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RenderedRoot {
    /// Nothing is mounted (not rendered yet, conditionally hidden, or unmounted).
    #[default]
    Empty,
    /// A single root node.
    Node(NodeId),
    /// Several sibling roots. Entries may themselves be fragments.
    Fragment(Vec<RenderedRoot>),
    /// The root is another component.
    Component(ComponentHandle),
}

/// Framework adapter consulted by the engine.
pub trait ComponentHost {
    /// What `component` renders right now. Unknown handles render [`RenderedRoot::Empty`].
    fn rendered_root(&self, component: ComponentHandle) -> RenderedRoot;

    /// The component whose setup is currently running, if any.
    fn current_instance(&self) -> Option<ComponentHandle>;

    /// Run `callback` once after `component` unmounts.
    fn on_unmounted(&self, component: ComponentHandle, callback: Box<dyn FnOnce()>);
}

/// Flatten what `component` renders into genuine nodes, in render order.
///
/// Nested fragments and component roots are expanded recursively; empty entries
/// are dropped. A component that (directly or indirectly) renders itself stops
/// the expansion at the repeated handle.
pub fn instance_to_nodes(
    host: &dyn ComponentHost,
    component: ComponentHandle,
) -> SmallVec<[NodeId; 4]> {
    let mut out = SmallVec::new();
    let mut visiting: SmallVec<[ComponentHandle; 4]> = SmallVec::new();
    expand_component(host, component, &mut visiting, &mut out);
    out
}

fn expand_component(
    host: &dyn ComponentHost,
    component: ComponentHandle,
    visiting: &mut SmallVec<[ComponentHandle; 4]>,
    out: &mut SmallVec<[NodeId; 4]>,
) {
    if visiting.contains(&component) {
        return;
    }
    visiting.push(component);
    let root = host.rendered_root(component);
    expand_root(host, &root, visiting, out);
    visiting.pop();
}

fn expand_root(
    host: &dyn ComponentHost,
    root: &RenderedRoot,
    visiting: &mut SmallVec<[ComponentHandle; 4]>,
    out: &mut SmallVec<[NodeId; 4]>,
) {
    match root {
        RenderedRoot::Empty => {}
        RenderedRoot::Node(node) => out.push(*node),
        RenderedRoot::Fragment(children) => {
            for child in children {
                expand_root(host, child, visiting, out);
            }
        }
        RenderedRoot::Component(inner) => expand_component(host, *inner, visiting, out),
    }
}

/// Host for callers without a component framework.
///
/// Every component renders nothing and there is never a current instance.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoComponents;

impl ComponentHost for NoComponents {
    fn rendered_root(&self, _component: ComponentHandle) -> RenderedRoot {
        RenderedRoot::Empty
    }

    fn current_instance(&self) -> Option<ComponentHandle> {
        None
    }

    fn on_unmounted(&self, _component: ComponentHandle, _callback: Box<dyn FnOnce()>) {}
}

type UnmountCallback = Box<dyn FnOnce()>;

/// An in-memory [`ComponentHost`].
///
/// Components are created with [`ComponentTree::create`], given render output with
/// [`ComponentTree::set_rendered`], and torn down with [`ComponentTree::unmount`].
/// [`ComponentTree::setup`] marks a component as the current instance while a
/// closure runs, mirroring a framework's setup phase.
#[derive(Default)]
pub struct ComponentTree {
    next: Cell<u64>,
    rendered: RefCell<HashMap<ComponentHandle, RenderedRoot>>,
    setup_stack: RefCell<Vec<ComponentHandle>>,
    unmount_callbacks: RefCell<HashMap<ComponentHandle, Vec<UnmountCallback>>>,
}

impl fmt::Debug for ComponentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTree")
            .field("rendered", &self.rendered.borrow())
            .field("setup_stack", &self.setup_stack.borrow())
            .finish_non_exhaustive()
    }
}

impl ComponentTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a component that renders nothing yet.
    pub fn create(&self) -> ComponentHandle {
        let id = self.next.get() + 1;
        self.next.set(id);
        let handle = ComponentHandle(id);
        self.rendered.borrow_mut().insert(handle, RenderedRoot::Empty);
        handle
    }

    /// Replace what `component` renders.
    pub fn set_rendered(&self, component: ComponentHandle, root: RenderedRoot) {
        self.rendered.borrow_mut().insert(component, root);
    }

    /// Run `f` with `component` as the current instance.
    ///
    /// Setups nest: the innermost running setup is the current instance.
    pub fn setup<R>(&self, component: ComponentHandle, f: impl FnOnce() -> R) -> R {
        self.setup_stack.borrow_mut().push(component);
        let out = f();
        self.setup_stack.borrow_mut().pop();
        out
    }

    /// Returns `true` if `component` was created and not yet unmounted.
    pub fn is_mounted(&self, component: ComponentHandle) -> bool {
        self.rendered.borrow().contains_key(&component)
    }

    /// Unmount `component`: forget its render output, then run its unmount
    /// callbacks in registration order.
    pub fn unmount(&self, component: ComponentHandle) {
        self.rendered.borrow_mut().remove(&component);
        let callbacks = self
            .unmount_callbacks
            .borrow_mut()
            .remove(&component)
            .unwrap_or_default();
        for callback in callbacks {
            callback();
        }
    }
}

impl ComponentHost for ComponentTree {
    fn rendered_root(&self, component: ComponentHandle) -> RenderedRoot {
        self.rendered
            .borrow()
            .get(&component)
            .cloned()
            .unwrap_or_default()
    }

    fn current_instance(&self) -> Option<ComponentHandle> {
        self.setup_stack.borrow().last().copied()
    }

    fn on_unmounted(&self, component: ComponentHandle, callback: Box<dyn FnOnce()>) {
        self.unmount_callbacks
            .borrow_mut()
            .entry(component)
            .or_default()
            .push(callback);
    }
}
