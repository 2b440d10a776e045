// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests for the `understory_click_outside` crate.
//!
//! Each test builds a small document, registers a handler, and drives it with raw
//! mouse events dispatched through the document.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;
use understory_click_outside::component::{ComponentTree, RenderedRoot};
use understory_click_outside::reactive::Ref;
use understory_click_outside::{
    ButtonFilter, ClickOutside, ClickOutsideContext, ClickOutsideOptions, Error, Handler,
    Interaction, InteractionKind, Target, listen_click_outside,
};
use understory_dom::{Document, DomError, EventType, MouseButton, MouseEvent, NodeId, Outcome};

struct Page {
    doc: Document,
    ctx: ClickOutsideContext,
    target: NodeId,
    inner: NodeId,
    sibling: NodeId,
}

/// `body > [target > inner, sibling]`
fn page() -> Page {
    let doc = Document::new();
    let target = doc.create_element("div");
    let inner = doc.create_element("span");
    let sibling = doc.create_element("div");
    doc.append_child(doc.body(), target).unwrap();
    doc.append_child(target, inner).unwrap();
    doc.append_child(doc.body(), sibling).unwrap();
    Page {
        ctx: ClickOutsideContext::new(doc.clone()),
        doc,
        target,
        inner,
        sibling,
    }
}

type Log = Rc<RefCell<Vec<Interaction>>>;

fn recording() -> (Log, Handler) {
    let log: Log = Rc::default();
    let sink = log.clone();
    (log, Handler::new(move |i| sink.borrow_mut().push(i.clone())))
}

fn register(
    p: &Page,
    target: impl Into<Target>,
    options: ClickOutsideOptions,
) -> (Log, ClickOutside) {
    let (log, handler) = recording();
    let registration = listen_click_outside(&p.ctx, target, handler, options).unwrap();
    (log, registration)
}

fn press_release(doc: &Document, node: NodeId, button: MouseButton) {
    doc.mouse_down(node, button).unwrap();
    doc.mouse_up(node, button).unwrap();
}

fn ev(event_type: EventType, button: MouseButton, target: NodeId) -> MouseEvent {
    MouseEvent::new(event_type, button, target)
}

#[test]
fn press_release_outside_fires_once_with_both_events() {
    let p = page();
    let (log, _reg) = register(&p, p.target, ClickOutsideOptions::new());

    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!(
        *log.borrow(),
        vec![Interaction::PressRelease {
            press: Some(ev(EventType::MouseDown, MouseButton::Left, p.sibling)),
            release: ev(EventType::MouseUp, MouseButton::Left, p.sibling),
        }]
    );

    press_release(&p.doc, p.target, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn release_without_press_reports_missing_press() {
    let p = page();
    let (log, _reg) = register(&p, p.target, ClickOutsideOptions::new());

    p.doc.mouse_up(p.sibling, MouseButton::Left).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![Interaction::PressRelease {
            press: None,
            release: ev(EventType::MouseUp, MouseButton::Left, p.sibling),
        }]
    );
}

#[test]
fn press_inside_release_outside_is_not_outside() {
    let p = page();
    let (log, _reg) = register(&p, p.target, ClickOutsideOptions::new());

    p.doc.mouse_down(p.inner, MouseButton::Left).unwrap();
    p.doc.mouse_up(p.sibling, MouseButton::Left).unwrap();
    p.doc.mouse_down(p.sibling, MouseButton::Left).unwrap();
    p.doc.mouse_up(p.inner, MouseButton::Left).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn interleaved_buttons_pair_with_their_own_press() {
    let p = page();
    let other = p.doc.create_element("p");
    p.doc.append_child(p.doc.body(), other).unwrap();
    let (log, _reg) = register(&p, p.target, ClickOutsideOptions::new());

    p.doc.mouse_down(p.sibling, MouseButton::Left).unwrap();
    p.doc.mouse_down(other, MouseButton::Right).unwrap();
    p.doc.mouse_up(other, MouseButton::Right).unwrap();
    p.doc.mouse_up(p.sibling, MouseButton::Left).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            Interaction::PressRelease {
                press: Some(ev(EventType::MouseDown, MouseButton::Right, other)),
                release: ev(EventType::MouseUp, MouseButton::Right, other),
            },
            Interaction::PressRelease {
                press: Some(ev(EventType::MouseDown, MouseButton::Left, p.sibling)),
                release: ev(EventType::MouseUp, MouseButton::Left, p.sibling),
            },
        ]
    );
}

#[test]
fn press_release_button_filters_are_exclusive() {
    let p = page();
    let (left, _l) = register(
        &p,
        p.target,
        ClickOutsideOptions::new().with_button(ButtonFilter::Left),
    );
    let (right, _r) = register(
        &p,
        p.target,
        ClickOutsideOptions::new().with_button(ButtonFilter::Right),
    );

    press_release(&p.doc, p.sibling, MouseButton::Right);
    assert_eq!((left.borrow().len(), right.borrow().len()), (0, 1));
    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!((left.borrow().len(), right.borrow().len()), (1, 1));
    press_release(&p.doc, p.sibling, MouseButton::Middle);
    assert_eq!((left.borrow().len(), right.borrow().len()), (1, 1));
}

#[test]
fn single_click_follows_button_filter() {
    let p = page();
    let click = |button| {
        ClickOutsideOptions::new()
            .with_kind(InteractionKind::SingleClick)
            .with_button(button)
    };
    let (all, _a) = register(&p, p.target, click(ButtonFilter::All));
    let (left, _l) = register(&p, p.target, click(ButtonFilter::Left));
    let (right, _r) = register(&p, p.target, click(ButtonFilter::Right));

    p.doc.click(p.sibling).unwrap();
    p.doc.context_menu(p.sibling).unwrap();
    press_release(&p.doc, p.sibling, MouseButton::Left);

    let types = |log: &Log| -> Vec<EventType> {
        log.borrow()
            .iter()
            .map(|i| i.last_event().event_type)
            .collect()
    };
    assert_eq!(types(&all), vec![EventType::Click, EventType::ContextMenu]);
    assert_eq!(types(&left), vec![EventType::Click]);
    assert_eq!(types(&right), vec![EventType::ContextMenu]);
}

#[test]
fn double_click_only_reacts_to_double_clicks() {
    let p = page();
    let (log, _reg) = register(
        &p,
        p.target,
        ClickOutsideOptions::new().with_type_name("dblclick").unwrap(),
    );
    p.doc.click(p.sibling).unwrap();
    p.doc.double_click(p.inner).unwrap();
    assert!(log.borrow().is_empty());
    p.doc.double_click(p.sibling).unwrap();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn descendants_of_any_target_are_inside() {
    let p = page();
    let second = p.doc.create_element("aside");
    let deep = p.doc.create_element("b");
    p.doc.append_child(p.doc.body(), second).unwrap();
    p.doc.append_child(second, deep).unwrap();
    let (log, _reg) = register(&p, vec![p.target, second], ClickOutsideOptions::new());

    for node in [p.target, p.inner, second, deep] {
        press_release(&p.doc, node, MouseButton::Left);
    }
    assert!(log.borrow().is_empty());

    press_release(&p.doc, p.sibling, MouseButton::Left);
    press_release(&p.doc, p.doc.body(), MouseButton::Left);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn sibling_redirect_treats_relocated_content_as_inside() {
    let p = page();
    let portal = p.doc.create_element("div");
    let item = p.doc.create_element("li");
    p.doc.append_child(p.doc.body(), portal).unwrap();
    p.doc.append_child(portal, item).unwrap();
    let (log, _reg) = register(&p, p.target, ClickOutsideOptions::new());

    p.ctx.mark_sibling(portal, p.inner);
    press_release(&p.doc, item, MouseButton::Left);
    assert!(log.borrow().is_empty());

    p.ctx.unmark_sibling(portal);
    press_release(&p.doc, item, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn empty_target_never_fires_until_it_resolves_again() {
    let p = page();
    let node: Ref<Option<NodeId>> = Ref::new(None);
    let (log, _reg) = register(&p, node.clone(), ClickOutsideOptions::new());

    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert!(log.borrow().is_empty());

    node.set(Some(p.target));
    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);

    // A removed target resolves to nothing as well.
    p.doc.remove(p.target).unwrap();
    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn component_targets_follow_conditional_rendering() {
    let doc = Document::new();
    let tree = Rc::new(ComponentTree::new());
    let ctx = ClickOutsideContext::with_components(doc.clone(), tree.clone());
    let (a, b, outside) = (
        doc.create_element("div"),
        doc.create_element("div"),
        doc.create_element("div"),
    );
    for n in [a, b, outside] {
        doc.append_child(doc.body(), n).unwrap();
    }
    let c = tree.create();
    let (log, handler) = recording();
    let _reg = listen_click_outside(&ctx, c, handler, ClickOutsideOptions::new()).unwrap();

    press_release(&doc, outside, MouseButton::Left);
    assert!(log.borrow().is_empty());

    tree.set_rendered(
        c,
        RenderedRoot::Fragment(vec![RenderedRoot::Node(a), RenderedRoot::Node(b)]),
    );
    press_release(&doc, b, MouseButton::Left);
    assert!(log.borrow().is_empty());
    press_release(&doc, outside, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn exclude_extends_the_inside_set() {
    let p = page();
    let trigger = p.doc.create_element("button");
    p.doc.append_child(p.doc.body(), trigger).unwrap();
    let (log, _reg) = register(
        &p,
        p.target,
        ClickOutsideOptions::new().with_exclude(trigger),
    );
    press_release(&p.doc, trigger, MouseButton::Left);
    assert!(log.borrow().is_empty());
    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn before_gates_each_interaction() {
    let p = page();
    let allow = Rc::new(std::cell::Cell::new(false));
    let gate = allow.clone();
    let (log, _reg) = register(
        &p,
        p.target,
        ClickOutsideOptions::new().with_before(move |_| gate.get()),
    );

    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert!(log.borrow().is_empty());
    allow.set(true);
    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);
    allow.set(false);
    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn stop_removes_every_subscription() {
    let p = page();
    let root = p.doc.document_element();
    let (log, reg) = register(&p, p.target, ClickOutsideOptions::new());
    assert_eq!(p.doc.listener_count(root), 2);
    assert!(reg.is_active());

    reg.stop();
    reg.stop();
    assert!(!reg.is_active());
    assert_eq!(p.doc.listener_count(root), 0);
    assert_eq!(p.ctx.active_registrations(), 0);
    assert_eq!(reg.refresh(), Ok(false));

    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert!(log.borrow().is_empty());
}

#[test]
fn unknown_interaction_type_adds_no_subscriptions() {
    let p = page();
    let root = p.doc.document_element();
    let registered = ClickOutsideOptions::new()
        .with_type_name("hover")
        .and_then(|options| {
            listen_click_outside(&p.ctx, p.target, Handler::new(|_| {}), options)
        });
    assert_eq!(
        registered.unwrap_err(),
        Error::InvalidInteractionType("hover".into())
    );
    assert_eq!(p.doc.listener_count(root), 0);
    assert_eq!(p.ctx.active_registrations(), 0);
}

#[test]
fn removed_background_fails_to_register() {
    let p = page();
    let background = p.doc.create_element("div");
    p.doc.remove(background).unwrap();
    let (_, handler) = recording();
    let err = listen_click_outside(
        &p.ctx,
        p.target,
        handler,
        ClickOutsideOptions::new().with_background(background),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Dom(_)));
    assert_eq!(p.ctx.active_registrations(), 0);
}

#[test]
fn capture_sees_clicks_that_stop_propagation() {
    let p = page();
    p.doc
        .add_event_listener(p.sibling, EventType::MouseUp, false, |_, _| Outcome::Stop)
        .unwrap();
    let (bubble, _b) = register(&p, p.target, ClickOutsideOptions::new());
    let (capture, _c) = register(
        &p,
        p.target,
        ClickOutsideOptions::new().with_capture(true),
    );

    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!((bubble.borrow().len(), capture.borrow().len()), (0, 1));
}

#[test]
fn reactive_options_resubscribe_only_when_config_changes() {
    let p = page();
    let root = p.doc.document_element();
    let options = Ref::new(ClickOutsideOptions::new());
    let (log, handler) = recording();
    let reg = listen_click_outside(&p.ctx, p.target, handler, options.clone()).unwrap();
    assert_eq!(reg.config().map(|c| c.kind), Some(InteractionKind::PressRelease));

    // Nothing changed.
    assert_eq!(p.ctx.flush(), Ok(0));

    // Written, but the subscription-relevant fields are equal.
    options.update(|o| o.exclude = Some(p.sibling.into()));
    assert_eq!(p.ctx.flush(), Ok(0));
    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert!(log.borrow().is_empty());

    options.update(|o| {
        o.kind = InteractionKind::SingleClick;
        o.exclude = None;
    });
    assert_eq!(p.ctx.flush(), Ok(1));
    assert_eq!(reg.config().map(|c| c.kind), Some(InteractionKind::SingleClick));
    assert_eq!(p.doc.listeners(root), vec![
        (EventType::Click, false),
        (EventType::ContextMenu, false),
    ]);

    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert!(log.borrow().is_empty());
    p.doc.click(p.sibling).unwrap();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn background_limits_where_interactions_are_observed() {
    let p = page();
    let region = p.doc.create_element("section");
    let inside_region = p.doc.create_element("p");
    p.doc.append_child(p.doc.body(), region).unwrap();
    p.doc.append_child(region, inside_region).unwrap();
    let (log, _reg) = register(
        &p,
        p.target,
        ClickOutsideOptions::new().with_background(region),
    );

    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert!(log.borrow().is_empty());
    press_release(&p.doc, inside_region, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn handler_may_stop_its_own_registration() {
    let p = page();
    let slot: Rc<RefCell<Option<ClickOutside>>> = Rc::default();
    let hits = Rc::new(std::cell::Cell::new(0));
    let (own_slot, counter) = (slot.clone(), hits.clone());
    let reg = listen_click_outside(
        &p.ctx,
        p.target,
        Handler::new(move |_| {
            counter.set(counter.get() + 1);
            if let Some(reg) = own_slot.borrow().as_ref() {
                reg.stop();
            }
        }),
        ClickOutsideOptions::new(),
    )
    .unwrap();
    *slot.borrow_mut() = Some(reg);

    press_release(&p.doc, p.sibling, MouseButton::Left);
    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!(hits.get(), 1);
    assert_eq!(p.doc.listener_count(p.doc.document_element()), 0);
}

#[test]
fn failed_refresh_keeps_old_subscription_and_refreshes_the_rest() {
    let p = page();
    let gone = p.doc.create_element("div");
    p.doc.remove(gone).unwrap();

    let a_options = Ref::new(ClickOutsideOptions::new());
    let b_options = Ref::new(ClickOutsideOptions::new());
    let (a_log, a_handler) = recording();
    let (b_log, b_handler) = recording();
    let a = listen_click_outside(&p.ctx, p.target, a_handler, a_options.clone()).unwrap();
    let b = listen_click_outside(&p.ctx, p.target, b_handler, b_options.clone()).unwrap();

    a_options.update(|o| o.background = Some(gone));
    b_options.update(|o| o.button = ButtonFilter::Left);
    assert_eq!(p.ctx.flush(), Err(Error::Dom(DomError::StaleNode(gone))));

    assert!(a.is_active());
    assert_eq!(a.config().map(|c| c.background), Some(p.doc.document_element()));
    assert_eq!(b.config().map(|c| c.button), Some(ButtonFilter::Left));
    assert_eq!(p.ctx.active_registrations(), 2);

    press_release(&p.doc, p.sibling, MouseButton::Left);
    assert_eq!((a_log.borrow().len(), b_log.borrow().len()), (1, 1));

    // Still failing on the next tick; once fixed, the retry goes through.
    assert!(p.ctx.flush().is_err());
    a_options.update(|o| o.background = Some(p.doc.body()));
    assert_eq!(p.ctx.flush(), Ok(1));
    assert_eq!(a.config().map(|c| c.background), Some(p.doc.body()));
}

#[test]
fn replacing_options_with_an_equal_value_keeps_the_subscription() {
    let p = page();
    let options = Ref::new(ClickOutsideOptions::new().with_button(ButtonFilter::Right));
    let (_, handler) = recording();
    let reg = listen_click_outside(&p.ctx, p.target, handler, options.clone()).unwrap();
    let before = options.revision();

    options.set(ClickOutsideOptions::new().with_button(ButtonFilter::Right));
    assert!(options.revision() > before);
    assert_eq!(p.ctx.flush(), Ok(0));
    assert_eq!(reg.config().map(|c| c.button), Some(ButtonFilter::Right));

    options.set(ClickOutsideOptions::new());
    assert_eq!(p.ctx.flush(), Ok(1));
    assert_eq!(reg.config().map(|c| c.button), Some(ButtonFilter::All));
}

#[test]
fn sibling_redirect_into_an_excluded_node_is_inside() {
    let p = page();
    let trigger = p.doc.create_element("button");
    let popup = p.doc.create_element("div");
    p.doc.append_child(p.doc.body(), trigger).unwrap();
    p.doc.append_child(p.doc.body(), popup).unwrap();
    let (log, _reg) = register(
        &p,
        p.target,
        ClickOutsideOptions::new().with_exclude(trigger),
    );

    press_release(&p.doc, popup, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);

    p.ctx.mark_sibling(popup, trigger);
    press_release(&p.doc, popup, MouseButton::Left);
    assert_eq!(log.borrow().len(), 1);

    p.ctx.unmark_sibling(popup);
    press_release(&p.doc, popup, MouseButton::Left);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn interactions_carry_pointer_positions() {
    let p = page();
    let (log, _reg) = register(&p, p.target, ClickOutsideOptions::new());

    let down = ev(EventType::MouseDown, MouseButton::Left, p.sibling)
        .with_position(Point::new(12.0, 40.0));
    let up = ev(EventType::MouseUp, MouseButton::Left, p.sibling)
        .with_position(Point::new(14.5, 41.0));
    p.doc.dispatch(&down).unwrap();
    p.doc.dispatch(&up).unwrap();

    let log = log.borrow();
    let Interaction::PressRelease { press, release } = &log[0] else {
        panic!("expected a press/release interaction, got {:?}", log[0]);
    };
    assert_eq!(press.as_ref().map(|e| e.position), Some(Point::new(12.0, 40.0)));
    assert_eq!(release.position, Point::new(14.5, 41.0));
}
