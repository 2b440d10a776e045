// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hook form: register from inside a component's setup.

use alloc::boxed::Box;

use crate::error::Error;
use crate::options::{Handler, OptionsSource};
use crate::registration::{ClickOutside, ClickOutsideContext, listen_click_outside};
use crate::target::Target;

/// Register `handler` for the current component.
///
/// With no explicit `target`, the current component instance is the target and is
/// resolved to its rendered roots at interaction time. When a current instance
/// exists, the registration stops automatically once that instance unmounts.
///
/// Returns [`Error::MissingComponentContext`] when `target` is `None` and no
/// component setup is running.
///
/// ```
/// use std::rc::Rc;
/// use understory_click_outside::component::{ComponentTree, RenderedRoot};
/// use understory_click_outside::{ClickOutsideContext, ClickOutsideOptions, Handler, on_click_outside};
/// use understory_dom::Document;
///
/// let doc = Document::new();
/// let tree = Rc::new(ComponentTree::new());
/// let ctx = ClickOutsideContext::with_components(doc.clone(), tree.clone());
///
/// let dropdown = tree.create();
/// let registration = tree
///     .setup(dropdown, || {
///         on_click_outside(&ctx, Handler::new(|_| {}), None, ClickOutsideOptions::new())
///     })
///     .unwrap();
/// tree.set_rendered(dropdown, RenderedRoot::Node(doc.create_element("div")));
/// assert!(registration.is_active());
///
/// tree.unmount(dropdown);
/// assert!(!registration.is_active());
/// ```
pub fn on_click_outside(
    context: &ClickOutsideContext,
    handler: Handler,
    target: Option<Target>,
    options: impl Into<OptionsSource>,
) -> Result<ClickOutside, Error> {
    let current = context.components().current_instance();
    let target = match target {
        Some(target) => target,
        None => Target::Component(current.ok_or(Error::MissingComponentContext)?),
    };
    let registration = listen_click_outside(context, target, handler, options)?;
    if let Some(instance) = current {
        let weak = registration.downgrade();
        context.components().on_unmounted(
            instance,
            Box::new(move || {
                if let Some(registration) = weak.upgrade() {
                    registration.stop();
                }
            }),
        );
    }
    Ok(registration)
}
