// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_click_outside --heading-base-level=0

//! Understory Click Outside: run a handler when the user interacts outside a target.
//!
//! The crate is layered:
//!
//! - [`listener`]: normalizes raw mouse events on a background node into
//!   [`Interaction`]s (press/release pairs tracked per button, single clicks, or
//!   double clicks).
//! - [`target`]: describes *what* to stay inside of ([`Target`]) and resolves it to
//!   concrete nodes at interaction time, expanding components through a
//!   [`component::ComponentHost`].
//! - [`outside`]: decides containment, including the [`outside::SiblingMap`] escape
//!   hatch for content relocated elsewhere in the tree.
//! - [`registration`]: ties the three together in [`listen_click_outside`], with
//!   live options ([`options::OptionsSource`]) that can change after registration.
//! - [`hook`] and [`directive`]: the two framework-facing entry points.
//!
//! ## Example
//!
//! ```
//! use core::cell::Cell;
//! use std::rc::Rc;
//! use understory_click_outside::{
//!     ClickOutsideContext, ClickOutsideOptions, Handler, listen_click_outside,
//! };
//! use understory_dom::{Document, MouseButton};
//!
//! let doc = Document::new();
//! let menu = doc.create_element("div");
//! let item = doc.create_element("button");
//! let page = doc.create_element("main");
//! doc.append_child(doc.body(), menu).unwrap();
//! doc.append_child(menu, item).unwrap();
//! doc.append_child(doc.body(), page).unwrap();
//!
//! let ctx = ClickOutsideContext::new(doc.clone());
//! let open = Rc::new(Cell::new(true));
//! let flag = open.clone();
//! let _registration = listen_click_outside(
//!     &ctx,
//!     menu,
//!     Handler::new(move |_| flag.set(false)),
//!     ClickOutsideOptions::new(),
//! )
//! .unwrap();
//!
//! // Pressing inside and releasing outside is not an outside click.
//! doc.mouse_down(item, MouseButton::Left).unwrap();
//! doc.mouse_up(page, MouseButton::Left).unwrap();
//! assert!(open.get());
//!
//! doc.mouse_down(page, MouseButton::Left).unwrap();
//! doc.mouse_up(page, MouseButton::Left).unwrap();
//! assert!(!open.get());
//! ```
//!
//! ## Reactive options
//!
//! Options passed as a [`reactive::Ref`] are read at interaction time, so `exclude`
//! and `before` changes apply immediately. Changes that affect subscriptions
//! (`kind`, `button`, `background`, `capture`) apply on the next
//! [`ClickOutsideContext::flush`].
//!
//! ## Logging
//!
//! Subscriptions are logged with `tracing` at `debug`; per-interaction decisions at
//! `trace`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod component;
pub mod directive;
mod error;
pub mod hook;
pub mod listener;
pub mod options;
pub mod outside;
pub mod reactive;
pub mod registration;
pub mod target;

pub use directive::{BindingValue, ClickOutsideDirective};
pub use error::Error;
pub use hook::on_click_outside;
pub use listener::{ButtonFilter, Interaction, InteractionKind, ListenerConfig, PointerListener};
pub use options::{ClickOutsideOptions, Handler, OptionsSource, Predicate};
pub use registration::{ClickOutside, ClickOutsideContext, listen_click_outside};
pub use target::{ResolvedNodes, Target};
