// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directive form: bind a handler to an element through its lifecycle.
//!
//! A template engine drives [`ClickOutsideDirective`] with the element's
//! `mounted`, `updated` and `unmounted` hooks. Each bound element has at most one
//! registration; an update only re-registers when the bound value differs.
//!
//! ```
//! use std::rc::Rc;
//! use understory_click_outside::directive::{BindingValue, ClickOutsideDirective};
//! use understory_click_outside::{ClickOutsideContext, Handler};
//! use understory_dom::Document;
//!
//! let doc = Document::new();
//! let el = doc.create_element("div");
//! doc.append_child(doc.body(), el).unwrap();
//!
//! let directive = ClickOutsideDirective::new(ClickOutsideContext::new(doc.clone()));
//! let value = BindingValue::from(Handler::new(|_| {}));
//!
//! directive.mounted(el, &value).unwrap();
//! assert!(!directive.updated(el, &value).unwrap());
//! assert!(directive.unmounted(el));
//! assert!(!directive.is_bound(el));
//! ```

use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use understory_dom::NodeId;

use crate::error::Error;
use crate::options::{ClickOutsideOptions, Handler};
use crate::registration::{ClickOutside, ClickOutsideContext, listen_click_outside};

/// What an element binds the directive to.
#[derive(Clone, Debug, PartialEq)]
pub enum BindingValue {
    /// A bare handler, optionally with options given alongside it.
    Handler {
        /// The handler.
        handler: Handler,
        /// Options for the registration.
        options: ClickOutsideOptions,
    },
    /// An options object that carries the handler as one of its fields.
    Object {
        /// The handler. Binding an object without one is an error.
        handler: Option<Handler>,
        /// Everything else.
        options: ClickOutsideOptions,
    },
}

impl BindingValue {
    /// A handler with explicit options.
    pub fn with_options(handler: Handler, options: ClickOutsideOptions) -> Self {
        Self::Handler { handler, options }
    }

    fn parts(&self) -> Result<(Handler, ClickOutsideOptions), Error> {
        match self {
            Self::Handler { handler, options } => Ok((handler.clone(), options.clone())),
            Self::Object {
                handler: Some(handler),
                options,
            } => Ok((handler.clone(), options.clone())),
            Self::Object { handler: None, .. } => Err(Error::InvalidBindingValue),
        }
    }
}

impl From<Handler> for BindingValue {
    fn from(handler: Handler) -> Self {
        Self::with_options(handler, ClickOutsideOptions::default())
    }
}

struct Binding {
    value: BindingValue,
    registration: ClickOutside,
}

/// Per-element click-outside registrations driven by element lifecycle hooks.
pub struct ClickOutsideDirective {
    context: ClickOutsideContext,
    bindings: RefCell<HashMap<NodeId, Binding>>,
}

impl fmt::Debug for ClickOutsideDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickOutsideDirective")
            .field("bound", &self.bindings.borrow().len())
            .finish_non_exhaustive()
    }
}

impl ClickOutsideDirective {
    /// Name the directive is registered under.
    pub const NAME: &'static str = "click-outside";

    /// A directive with no bound elements.
    pub fn new(context: ClickOutsideContext) -> Self {
        Self {
            context,
            bindings: RefCell::new(HashMap::new()),
        }
    }

    /// The element was mounted with `value`.
    ///
    /// An invalid value leaves the element unbound. Mounting an element that is
    /// already bound replaces its registration.
    pub fn mounted(&self, element: NodeId, value: &BindingValue) -> Result<(), Error> {
        let registration = self.register(element, value)?;
        let previous = self.bindings.borrow_mut().insert(
            element,
            Binding {
                value: value.clone(),
                registration,
            },
        );
        if let Some(previous) = previous {
            previous.registration.stop();
        }
        Ok(())
    }

    /// The element was updated with `value`.
    ///
    /// Returns `true` if the element was re-registered. A value equal to the bound
    /// one keeps the existing registration; an invalid value keeps it as well and
    /// returns the error.
    pub fn updated(&self, element: NodeId, value: &BindingValue) -> Result<bool, Error> {
        let unchanged = self
            .bindings
            .borrow()
            .get(&element)
            .is_some_and(|binding| binding.value == *value);
        if unchanged {
            return Ok(false);
        }
        self.mounted(element, value)?;
        Ok(true)
    }

    /// The element was unmounted. Returns `true` if it had a registration.
    pub fn unmounted(&self, element: NodeId) -> bool {
        let binding = self.bindings.borrow_mut().remove(&element);
        match binding {
            Some(binding) => {
                binding.registration.stop();
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `element` currently has a registration.
    pub fn is_bound(&self, element: NodeId) -> bool {
        self.bindings.borrow().contains_key(&element)
    }

    /// The registration bound to `element`, if any.
    pub fn registration(&self, element: NodeId) -> Option<ClickOutside> {
        self.bindings
            .borrow()
            .get(&element)
            .map(|binding| binding.registration.clone())
    }

    fn register(&self, element: NodeId, value: &BindingValue) -> Result<ClickOutside, Error> {
        let (handler, options) = value.parts()?;
        listen_click_outside(&self.context, element, handler, options)
    }
}
