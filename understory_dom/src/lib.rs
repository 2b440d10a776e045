// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dom --heading-base-level=0

//! Understory DOM: a small document tree with DOM-style mouse event dispatch.
//!
//! This crate models the part of a browser document that pointer-driven UI logic
//! actually consumes: element identity, structural ancestry, and listeners that
//! observe mouse events as they travel capture → target → bubble.
//! It does not lay out, style, or render anything.
//!
//! ## Nodes
//!
//! A [`Document`] owns a generational arena of elements.
//! Each element is addressed by a [`NodeId`], a small copyable handle that becomes
//! stale once the element is removed. Stale handles never alias a newer element,
//! so maps keyed by [`NodeId`] never keep an element alive and never confuse a
//! removed element with its replacement.
//!
//! Every document starts with a document element (`html`) and a `body` child.
//! Use [`Document::create_element`] and [`Document::append_child`] to build the
//! rest. Appending an attached element moves it, which is how relocated content
//! (portals, teleports) is expressed.
//!
//! ## Listeners and dispatch
//!
//! [`Document::add_event_listener`] subscribes a callback on a node for one
//! [`EventType`] in either the capture or the bubble position.
//! [`Document::dispatch`] routes a [`MouseEvent`] from the document element to the
//! target and back, invoking listeners in DOM order. Listeners return an
//! [`Outcome`] to stop propagation.
//!
//! ```
//! use core::cell::Cell;
//! use std::rc::Rc;
//! use understory_dom::{Document, EventType, MouseButton, Outcome};
//!
//! let doc = Document::new();
//! let panel = doc.create_element("div");
//! doc.append_child(doc.body(), panel).unwrap();
//!
//! let seen = Rc::new(Cell::new(0));
//! let counter = seen.clone();
//! let id = doc
//!     .add_event_listener(doc.document_element(), EventType::MouseDown, false, move |_, ev| {
//!         assert_eq!(ev.button, MouseButton::Left);
//!         counter.set(counter.get() + 1);
//!         Outcome::Continue
//!     })
//!     .unwrap();
//!
//! doc.mouse_down(panel, MouseButton::Left).unwrap();
//! assert_eq!(seen.get(), 1);
//!
//! assert!(doc.remove_event_listener(doc.document_element(), EventType::MouseDown, id, false));
//! doc.mouse_down(panel, MouseButton::Left).unwrap();
//! assert_eq!(seen.get(), 1);
//! ```
//!
//! The dispatch routing itself is exposed in [`dispatch`] for callers that want to
//! drive their own handlers over a capture → target → bubble sequence.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatch;
mod document;
mod error;
mod event;
mod types;

pub use dispatch::{Dispatch, Outcome, Phase};
pub use document::{Document, Listener, ListenerId};
pub use error::DomError;
pub use event::{EventMask, EventType, MouseButton, MouseEvent};
pub use types::NodeId;
