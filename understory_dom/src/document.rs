// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document: element arena, listener table, and event dispatch.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::dispatch::{self, Dispatch, Outcome, Phase};
use crate::error::DomError;
use crate::event::{EventType, MouseButton, MouseEvent};
use crate::types::NodeId;

/// A listener callback.
///
/// Listeners receive the document that is dispatching, so they can inspect
/// ancestry without holding a strong reference to it.
pub type Listener = Rc<dyn Fn(&Document, &MouseEvent) -> Outcome>;

/// Identifier of one listener registration, returned by
/// [`Document::add_event_listener`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Slot {
    generation: u32,
    element: Option<Element>,
}

struct Registration {
    id: ListenerId,
    event_type: EventType,
    capture: bool,
    listener: Listener,
}

struct Tree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    body: NodeId,
    listeners: HashMap<NodeId, SmallVec<[Registration; 2]>>,
    next_listener: u64,
}

impl Tree {
    fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 1),
            body: NodeId::new(0, 1),
            listeners: HashMap::new(),
            next_listener: 0,
        };
        let root = tree.alloc("html");
        let body = tree.alloc("body");
        tree.root = root;
        tree.body = body;
        tree.link(root, body);
        tree
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let element = Element {
            tag: tag.into(),
            parent: None,
            children: Vec::new(),
        };
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.element = Some(element);
            NodeId::new(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).expect("document slot count overflow");
            self.slots.push(Slot {
                generation: 1,
                element: Some(element),
            });
            NodeId::new(idx, 1)
        }
    }

    fn get(&self, id: NodeId) -> Option<&Element> {
        self.slots
            .get(id.idx())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.element.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.idx())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.element.as_mut())
    }

    fn alive(&self, id: NodeId) -> Result<&Element, DomError> {
        self.get(id).ok_or(DomError::StaleNode(id))
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|el| el.parent)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if self.get(ancestor).is_none() {
            return false;
        }
        let mut cursor = self.get(node).map(|_| node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.get_mut(parent) {
            el.children.push(child);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(el) = self.get_mut(parent) {
            el.children.retain(|c| *c != child);
        }
        if let Some(el) = self.get_mut(child) {
            el.parent = None;
        }
    }

    fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![node];
        while let Some(current) = stack.pop() {
            if let Some(el) = self.get(current) {
                out.push(current);
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    fn free_slot(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.idx()) {
            if slot.generation == id.generation() && slot.element.take().is_some() {
                self.free.push(id.0);
            }
        }
        self.listeners.remove(&id);
    }

    fn has_listener(&self, node: NodeId, id: ListenerId) -> bool {
        self.listeners
            .get(&node)
            .is_some_and(|list| list.iter().any(|r| r.id == id))
    }
}

/// A document tree with DOM-style mouse event dispatch.
///
/// `Document` is a cheap, clonable handle: clones share the same tree.
/// It is single-threaded by construction (`Rc` inside).
///
/// Listeners may freely call back into the document during dispatch (query
/// ancestry, add or remove listeners, mutate the tree). The route of an event is
/// fixed when dispatch begins; listeners removed mid-dispatch are skipped.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<Tree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.inner.borrow();
        let live = tree.slots.iter().filter(|s| s.element.is_some()).count();
        f.debug_struct("Document")
            .field("root", &tree.root)
            .field("live_nodes", &live)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Create a document containing a document element (`html`) with a `body` child.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Tree::new())),
        }
    }

    /// Returns `true` if both handles refer to the same document.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The document element (the root of the tree).
    pub fn document_element(&self) -> NodeId {
        self.inner.borrow().root
    }

    /// The `body` element created with the document.
    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.borrow_mut().alloc(tag)
    }

    /// Append `child` as the last child of `parent`, moving it if it is already attached.
    ///
    /// Fails if either handle is stale, if `child` is the document element, or if
    /// `child` is `parent` or one of its ancestors.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let mut tree = self.inner.borrow_mut();
        tree.alive(parent)?;
        tree.alive(child)?;
        if child == tree.root || tree.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        tree.unlink(child);
        tree.link(parent, child);
        Ok(())
    }

    /// Unlink `node` from its parent, keeping it (and its subtree) alive.
    ///
    /// Detaching the document element or an already detached element does nothing.
    pub fn detach(&self, node: NodeId) -> Result<(), DomError> {
        let mut tree = self.inner.borrow_mut();
        tree.alive(node)?;
        tree.unlink(node);
        Ok(())
    }

    /// Remove `node` and its whole subtree from the document.
    ///
    /// All handles into the subtree become stale and their listeners are dropped.
    pub fn remove(&self, node: NodeId) -> Result<(), DomError> {
        // Listeners are dropped after the borrow ends, since a listener's captures
        // may own other documents' handles.
        let dropped = {
            let mut tree = self.inner.borrow_mut();
            tree.alive(node)?;
            if node == tree.root {
                return Err(DomError::HierarchyRequest {
                    parent: node,
                    child: node,
                });
            }
            tree.unlink(node);
            let doomed = tree.subtree(node);
            let mut dropped = Vec::new();
            for id in doomed {
                if let Some(list) = tree.listeners.remove(&id) {
                    dropped.push(list);
                }
                tree.free_slot(id);
            }
            dropped
        };
        tracing::trace!(node = ?node, listeners = dropped.len(), "removed subtree");
        drop(dropped);
        Ok(())
    }

    /// Returns `true` if `node` refers to a live element.
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.inner.borrow().get(node).is_some()
    }

    /// Returns `true` if `node` is alive and its top-most ancestor is the document element.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let tree = self.inner.borrow();
        tree.contains(tree.root, node)
    }

    /// The tag name `node` was created with.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().get(node).map(|el| el.tag.clone())
    }

    /// The structural parent of `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().parent(node)
    }

    /// The children of `node`, in document order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .get(node)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    /// Returns `true` if `node` is `ancestor` or one of its descendants.
    ///
    /// Stale handles are never contained and never contain anything.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inner.borrow().contains(ancestor, node)
    }

    /// `node` followed by each of its ancestors up to the top of its tree.
    ///
    /// Empty if `node` is stale.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.inner.borrow();
        let mut out = Vec::new();
        let mut cursor = tree.get(node).map(|_| node);
        while let Some(current) = cursor {
            out.push(current);
            cursor = tree.parent(current);
        }
        out
    }

    /// Subscribe `listener` to `event_type` events visiting `target`.
    ///
    /// With `capture` set, the listener runs on the way down (and first at the
    /// target); otherwise it runs at the target and on the way up.
    pub fn add_event_listener(
        &self,
        target: NodeId,
        event_type: EventType,
        capture: bool,
        listener: impl Fn(&Self, &MouseEvent) -> Outcome + 'static,
    ) -> Result<ListenerId, DomError> {
        let mut tree = self.inner.borrow_mut();
        tree.alive(target)?;
        tree.next_listener += 1;
        let id = ListenerId(tree.next_listener);
        tree.listeners.entry(target).or_default().push(Registration {
            id,
            event_type,
            capture,
            listener: Rc::new(listener),
        });
        Ok(id)
    }

    /// Remove a listener added with the same `target`, `event_type` and `capture` flag.
    ///
    /// Returns `true` if a listener was removed.
    pub fn remove_event_listener(
        &self,
        target: NodeId,
        event_type: EventType,
        id: ListenerId,
        capture: bool,
    ) -> bool {
        let removed = {
            let mut tree = self.inner.borrow_mut();
            let Some(list) = tree.listeners.get_mut(&target) else {
                return false;
            };
            let Some(pos) = list
                .iter()
                .position(|r| r.id == id && r.event_type == event_type && r.capture == capture)
            else {
                return false;
            };
            let removed = list.remove(pos);
            if list.is_empty() {
                tree.listeners.remove(&target);
            }
            removed
        };
        drop(removed);
        true
    }

    /// Number of listeners registered on `target`.
    pub fn listener_count(&self, target: NodeId) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&target)
            .map_or(0, |list| list.len())
    }

    /// `(event type, capture)` for each listener on `target`, in registration order.
    pub fn listeners(&self, target: NodeId) -> Vec<(EventType, bool)> {
        self.inner
            .borrow()
            .listeners
            .get(&target)
            .map(|list| list.iter().map(|r| (r.event_type, r.capture)).collect())
            .unwrap_or_default()
    }

    /// Dispatch `event` to its target.
    ///
    /// Returns `true` if a listener stopped propagation.
    pub fn dispatch(&self, event: &MouseEvent) -> Result<bool, DomError> {
        let mut path = self.ancestors(event.target);
        if path.is_empty() {
            return Err(DomError::StaleNode(event.target));
        }
        path.reverse();
        let seq = dispatch::route(&path);
        let stopped = dispatch::run(&seq, &mut (), |d, _| self.invoke(d, event));
        tracing::trace!(
            event = %event.event_type,
            target = ?event.target,
            stopped,
            "dispatched"
        );
        Ok(stopped)
    }

    fn invoke(&self, d: &Dispatch<NodeId>, event: &MouseEvent) -> Outcome {
        let snapshot: SmallVec<[(ListenerId, Listener); 4]> = {
            let tree = self.inner.borrow();
            let Some(list) = tree.listeners.get(&d.node) else {
                return Outcome::Continue;
            };
            let matching = move |capture: bool| {
                list.iter()
                    .filter(move |r| r.event_type == event.event_type && r.capture == capture)
                    .map(|r| (r.id, r.listener.clone()))
            };
            match d.phase {
                Phase::Capture => matching(true).collect(),
                Phase::Bubble => matching(false).collect(),
                Phase::Target => matching(true).chain(matching(false)).collect(),
            }
        };

        let mut outcome = Outcome::Continue;
        for (id, listener) in snapshot {
            if !self.inner.borrow().has_listener(d.node, id) {
                continue;
            }
            let result = listener(self, event);
            outcome = outcome.max(result);
            if result == Outcome::StopImmediate {
                break;
            }
        }
        outcome
    }

    /// Dispatch a freshly built event of `event_type` with `button` at `target`.
    pub fn fire(
        &self,
        target: NodeId,
        event_type: EventType,
        button: MouseButton,
    ) -> Result<bool, DomError> {
        self.dispatch(&MouseEvent::new(event_type, button, target))
    }

    /// Dispatch a `mousedown` for `button` at `target`.
    pub fn mouse_down(&self, target: NodeId, button: MouseButton) -> Result<bool, DomError> {
        self.fire(target, EventType::MouseDown, button)
    }

    /// Dispatch a `mouseup` for `button` at `target`.
    pub fn mouse_up(&self, target: NodeId, button: MouseButton) -> Result<bool, DomError> {
        self.fire(target, EventType::MouseUp, button)
    }

    /// Dispatch a primary-button `click` at `target`.
    pub fn click(&self, target: NodeId) -> Result<bool, DomError> {
        self.fire(target, EventType::Click, MouseButton::Left)
    }

    /// Dispatch a secondary-button `contextmenu` at `target`.
    pub fn context_menu(&self, target: NodeId) -> Result<bool, DomError> {
        self.fire(target, EventType::ContextMenu, MouseButton::Right)
    }

    /// Dispatch a primary-button `dblclick` at `target`.
    pub fn double_click(&self, target: NodeId) -> Result<bool, DomError> {
        self.fire(target, EventType::DoubleClick, MouseButton::Left)
    }
}
