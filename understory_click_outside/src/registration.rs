// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registrations: tie a target, a handler and options to a pointer listener.
//!
//! [`listen_click_outside`] starts a [`PointerListener`] and, for every interaction
//! it reports:
//!
//! 1) resolves the target (skipping the interaction if it resolves to nothing),
//! 2) adds the resolved `exclude` target to the set,
//! 3) checks that every candidate node of the interaction is outside the set,
//! 4) asks the `before` predicate, if any,
//! 5) calls the handler.
//!
//! Options are read through an [`OptionsSource`]. Interaction-time options
//! (`exclude`, `before`) are read on every interaction. Subscription options
//! (`kind`, `button`, `background`, `capture`) only take effect when the
//! registration is refreshed with [`ClickOutside::refresh`] or
//! [`ClickOutsideContext::flush`], which a host calls from its post-render tick.
//! A refresh resubscribes only when the effective [`ListenerConfig`] differs by
//! value from the live one.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use understory_dom::{Document, NodeId};

use crate::component::{ComponentHost, NoComponents};
use crate::error::Error;
use crate::listener::{Interaction, ListenerConfig, PointerListener};
use crate::options::{ClickOutsideOptions, Handler, OptionsSource};
use crate::outside::{SiblingMap, is_outside};
use crate::target::{ResolvedNodes, Target};

/// Shared state for a family of registrations on one document.
///
/// Holds the document, the component host used to expand component targets, the
/// sibling redirect map, and the registrations that have not been stopped yet.
/// Clones share all of it.
#[derive(Clone)]
pub struct ClickOutsideContext {
    document: Document,
    components: Rc<dyn ComponentHost>,
    siblings: SiblingMap,
    registrations: Rc<RefCell<Vec<ClickOutside>>>,
}

impl fmt::Debug for ClickOutsideContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickOutsideContext")
            .field("document", &self.document)
            .field("siblings", &self.siblings)
            .field("registrations", &self.registrations.borrow().len())
            .finish_non_exhaustive()
    }
}

impl ClickOutsideContext {
    /// A context without a component framework.
    pub fn new(document: Document) -> Self {
        Self::with_components(document, Rc::new(NoComponents))
    }

    /// A context that expands component targets through `components`.
    pub fn with_components(document: Document, components: Rc<dyn ComponentHost>) -> Self {
        Self {
            document,
            components,
            siblings: SiblingMap::new(),
            registrations: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// The document registrations listen on.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The component host.
    pub fn components(&self) -> &dyn ComponentHost {
        &*self.components
    }

    /// The sibling redirect map shared by every registration of this context.
    pub fn siblings(&self) -> &SiblingMap {
        &self.siblings
    }

    /// Treat `relocated` as if it were where `sibling` is, for outside tests.
    pub fn mark_sibling(&self, relocated: NodeId, sibling: NodeId) {
        self.siblings.mark(&self.document, relocated, sibling);
    }

    /// Undo [`ClickOutsideContext::mark_sibling`] for `relocated`.
    pub fn unmark_sibling(&self, relocated: NodeId) {
        self.siblings.unmark(relocated);
    }

    /// The live stand-in registered for `node`.
    pub fn sibling_of(&self, node: NodeId) -> Option<NodeId> {
        self.siblings.sibling_of(&self.document, node)
    }

    /// Resolve `target` against this context's document and component host.
    pub fn resolve(&self, target: &Target) -> ResolvedNodes {
        target.resolve(&self.document, &*self.components)
    }

    /// The listener configuration `options` asks for on this document.
    pub fn listener_config(&self, options: &ClickOutsideOptions) -> ListenerConfig {
        listener_config(&self.document, options)
    }

    /// Number of registrations that have not been stopped.
    pub fn active_registrations(&self) -> usize {
        self.registrations.borrow().len()
    }

    /// Refresh every live registration; returns how many resubscribed.
    ///
    /// Every registration is refreshed even if some fail; the first failure is
    /// returned afterwards. A registration that fails keeps its previous
    /// subscription and is retried on the next flush.
    pub fn flush(&self) -> Result<usize, Error> {
        let live: Vec<ClickOutside> = self.registrations.borrow().clone();
        let mut resubscribed = 0;
        let mut first_error = None;
        for registration in live {
            match registration.refresh() {
                Ok(true) => resubscribed += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::debug!(error = %err, "click outside refresh failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(resubscribed),
        }
    }
}

fn listener_config(document: &Document, options: &ClickOutsideOptions) -> ListenerConfig {
    ListenerConfig {
        kind: options.kind,
        button: options.button,
        background: options
            .background
            .unwrap_or_else(|| document.document_element()),
        capture: options.capture,
    }
}

/// What runs inside the raw listener. Holds no document handle, so the document's
/// listener table never owns a path back to itself.
struct Responder {
    target: Target,
    handler: Handler,
    options: OptionsSource,
    siblings: SiblingMap,
    components: Rc<dyn ComponentHost>,
}

impl Responder {
    fn respond(&self, document: &Document, interaction: &Interaction) {
        let mut nodes = self.target.resolve(document, &*self.components);
        if nodes.is_empty() {
            tracing::trace!("click outside target resolved to no nodes");
            return;
        }
        let options = self.options.get();
        if let Some(exclude) = &options.exclude {
            exclude.resolve_into(document, &*self.components, &mut nodes);
        }
        let outside = interaction
            .candidates()
            .into_iter()
            .all(|candidate| is_outside(document, &self.siblings, &nodes, candidate));
        if !outside {
            tracing::trace!(kind = %interaction.kind(), "interaction landed inside target");
            return;
        }
        if let Some(before) = &options.before
            && !before.test(interaction)
        {
            tracing::debug!(kind = %interaction.kind(), "click outside handler gated by before");
            return;
        }
        self.handler.call(interaction);
    }
}

#[derive(Default)]
struct State {
    listener: Option<PointerListener>,
    seen_revision: Option<u64>,
    stopped: bool,
}

struct Registration {
    document: Document,
    // Weak, so a context and its registrations never keep each other alive.
    registry: Weak<RefCell<Vec<ClickOutside>>>,
    responder: Rc<Responder>,
    state: RefCell<State>,
}

/// A live click-outside registration.
///
/// Clones refer to the same registration. The registration stays subscribed until
/// [`ClickOutside::stop`] is called, even if every handle is dropped: its context
/// keeps it. Once the context and every handle are gone as well, the registration
/// is freed and its subscriptions live on in the document until the document
/// itself is dropped.
#[derive(Clone)]
pub struct ClickOutside {
    inner: Rc<Registration>,
}

impl fmt::Debug for ClickOutside {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ClickOutside")
            .field("target", &self.inner.responder.target)
            .field("listener", &state.listener)
            .field("stopped", &state.stopped)
            .finish_non_exhaustive()
    }
}

impl ClickOutside {
    /// Re-read the options and resubscribe if the listener configuration changed.
    ///
    /// Returns `true` if the pointer listener was (re)created. Stopped registrations
    /// never resubscribe.
    ///
    /// If the new listener cannot start, the previous subscription stays in place
    /// and the next refresh tries again.
    pub fn refresh(&self) -> Result<bool, Error> {
        let inner = &self.inner;
        let mut state = inner.state.borrow_mut();
        if state.stopped {
            return Ok(false);
        }
        let revision = inner.responder.options.revision();
        if state.listener.is_some() && state.seen_revision == Some(revision) {
            return Ok(false);
        }
        let config = listener_config(&inner.document, &inner.responder.options.get());
        if state
            .listener
            .as_ref()
            .is_some_and(|listener| listener.config() == config)
        {
            state.seen_revision = Some(revision);
            return Ok(false);
        }

        // The old subscription stays in place unless the new one starts.
        let responder = inner.responder.clone();
        let listener = PointerListener::start(&inner.document, config, move |doc, i| {
            responder.respond(doc, i);
        })?;
        if let Some(old) = state.listener.replace(listener) {
            old.stop();
        }
        state.seen_revision = Some(revision);
        Ok(true)
    }

    /// Remove the pointer listener. Later calls do nothing.
    pub fn stop(&self) {
        let listener = {
            let mut state = self.inner.state.borrow_mut();
            if state.stopped {
                return;
            }
            state.stopped = true;
            state.listener.take()
        };
        if let Some(listener) = listener {
            listener.stop();
        }
        if let Some(registry) = self.inner.registry.upgrade() {
            registry.borrow_mut().retain(|r| !r.ptr_eq(self));
        }
    }

    /// Returns `true` while a pointer listener is subscribed.
    pub fn is_active(&self) -> bool {
        self.inner.state.borrow().listener.is_some()
    }

    /// The configuration of the subscribed pointer listener, if any.
    pub fn config(&self) -> Option<ListenerConfig> {
        self.inner
            .state
            .borrow()
            .listener
            .as_ref()
            .map(PointerListener::config)
    }

    /// The target this registration watches.
    pub fn target(&self) -> &Target {
        &self.inner.responder.target
    }

    /// Returns `true` if both handles refer to the same registration.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakClickOutside {
        WeakClickOutside(Rc::downgrade(&self.inner))
    }
}

/// A handle that does not keep a registration alive.
pub(crate) struct WeakClickOutside(Weak<Registration>);

impl WeakClickOutside {
    pub(crate) fn upgrade(&self) -> Option<ClickOutside> {
        self.0.upgrade().map(|inner| ClickOutside { inner })
    }
}

/// Call `handler` whenever an interaction happens outside `target`.
///
/// Subscribes immediately using the current options; fails without subscribing if
/// the background node is not alive.
///
/// ```
/// use core::cell::Cell;
/// use std::rc::Rc;
/// use understory_click_outside::{
///     ClickOutsideContext, ClickOutsideOptions, Handler, listen_click_outside,
/// };
/// use understory_dom::{Document, MouseButton};
///
/// let doc = Document::new();
/// let menu = doc.create_element("div");
/// let elsewhere = doc.create_element("div");
/// doc.append_child(doc.body(), menu).unwrap();
/// doc.append_child(doc.body(), elsewhere).unwrap();
///
/// let ctx = ClickOutsideContext::new(doc.clone());
/// let closed = Rc::new(Cell::new(0));
/// let counter = closed.clone();
/// let registration = listen_click_outside(
///     &ctx,
///     menu,
///     Handler::new(move |_| counter.set(counter.get() + 1)),
///     ClickOutsideOptions::new(),
/// )
/// .unwrap();
///
/// doc.mouse_down(menu, MouseButton::Left).unwrap();
/// doc.mouse_up(menu, MouseButton::Left).unwrap();
/// assert_eq!(closed.get(), 0);
///
/// doc.mouse_down(elsewhere, MouseButton::Left).unwrap();
/// doc.mouse_up(elsewhere, MouseButton::Left).unwrap();
/// assert_eq!(closed.get(), 1);
///
/// registration.stop();
/// ```
pub fn listen_click_outside(
    context: &ClickOutsideContext,
    target: impl Into<Target>,
    handler: Handler,
    options: impl Into<OptionsSource>,
) -> Result<ClickOutside, Error> {
    let registration = ClickOutside {
        inner: Rc::new(Registration {
            document: context.document.clone(),
            registry: Rc::downgrade(&context.registrations),
            responder: Rc::new(Responder {
                target: target.into(),
                handler,
                options: options.into(),
                siblings: context.siblings.clone(),
                components: context.components.clone(),
            }),
            state: RefCell::new(State::default()),
        }),
    };
    registration.refresh()?;
    context
        .registrations
        .borrow_mut()
        .push(registration.clone());
    Ok(registration)
}
