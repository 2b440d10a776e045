// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer listener: normalize raw mouse events into click interactions.
//!
//! A [`PointerListener`] subscribes to raw mouse events on one background node and
//! reports each completed [`Interaction`]:
//!
//! - [`InteractionKind::PressRelease`]: `mousedown` + `mouseup`. Presses are kept
//!   per button in [`PressSlots`]; a release reports the pending press for its own
//!   button (or `None` when the press happened before the listener existed).
//! - [`InteractionKind::SingleClick`]: `click` unless the filter is
//!   [`ButtonFilter::Right`], and `contextmenu` unless it is [`ButtonFilter::Left`].
//! - [`InteractionKind::DoubleClick`]: `dblclick`; the button filter has no effect.
//!
//! ## Minimal example
//!
//! ```
//! use core::cell::RefCell;
//! use std::rc::Rc;
//! use understory_click_outside::listener::{
//!     ButtonFilter, Interaction, InteractionKind, ListenerConfig, PointerListener,
//! };
//! use understory_dom::{Document, MouseButton};
//!
//! let doc = Document::new();
//! let config = ListenerConfig::new(InteractionKind::PressRelease, doc.document_element())
//!     .with_button(ButtonFilter::Left);
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = seen.clone();
//! let listener = PointerListener::start(&doc, config, move |_, interaction| {
//!     log.borrow_mut().push(interaction.clone());
//! })
//! .unwrap();
//!
//! doc.mouse_down(doc.body(), MouseButton::Left).unwrap();
//! doc.mouse_up(doc.body(), MouseButton::Left).unwrap();
//! assert!(matches!(
//!     seen.borrow()[0],
//!     Interaction::PressRelease { press: Some(_), .. }
//! ));
//!
//! listener.stop();
//! assert_eq!(doc.listener_count(doc.document_element()), 0);
//! ```

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;
use core::str::FromStr;

use smallvec::SmallVec;
use understory_dom::{
    Document, DomError, EventMask, EventType, ListenerId, MouseButton, MouseEvent, NodeId,
    Outcome,
};

use crate::error::Error;

/// Which raw event pattern counts as one interaction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// A press followed by a release of the same button.
    #[default]
    PressRelease,
    /// A single click (`click`, and `contextmenu` for the secondary button).
    SingleClick,
    /// A double click.
    DoubleClick,
}

impl InteractionKind {
    /// The canonical name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::PressRelease => "pressRelease",
            Self::SingleClick => "singleClick",
            Self::DoubleClick => "doubleClick",
        }
    }

    /// The raw events a listener of this kind subscribes to under `button`.
    pub fn raw_events(self, button: ButtonFilter) -> EventMask {
        match self {
            Self::PressRelease => EventMask::MOUSE_DOWN | EventMask::MOUSE_UP,
            Self::SingleClick => {
                let mut mask = EventMask::empty();
                if button.tracks_left() {
                    mask |= EventMask::CLICK;
                }
                if button.tracks_right() {
                    mask |= EventMask::CONTEXT_MENU;
                }
                mask
            }
            Self::DoubleClick => EventMask::DOUBLE_CLICK,
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InteractionKind {
    type Err = Error;

    /// Accepts the canonical names as well as the raw DOM-flavored aliases
    /// `downUp`, `click` and `dblclick`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pressRelease" | "downUp" => Ok(Self::PressRelease),
            "singleClick" | "click" => Ok(Self::SingleClick),
            "doubleClick" | "dblclick" => Ok(Self::DoubleClick),
            other => Err(Error::InvalidInteractionType(other.into())),
        }
    }
}

/// Which mouse buttons an interaction may come from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ButtonFilter {
    /// Primary button only.
    Left,
    /// Secondary button only.
    Right,
    /// Primary and secondary buttons, tracked independently.
    #[default]
    All,
}

impl ButtonFilter {
    /// The canonical name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::All => "all",
        }
    }

    /// Returns `true` unless the filter is [`ButtonFilter::Right`].
    pub const fn tracks_left(self) -> bool {
        !matches!(self, Self::Right)
    }

    /// Returns `true` unless the filter is [`ButtonFilter::Left`].
    pub const fn tracks_right(self) -> bool {
        !matches!(self, Self::Left)
    }
}

impl fmt::Display for ButtonFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ButtonFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "all" => Ok(Self::All),
            other => Err(Error::InvalidButton(other.into())),
        }
    }
}

/// Everything that determines which raw subscriptions a listener holds.
///
/// Two configs that compare equal produce identical subscriptions, which is what
/// lets registrations skip redundant resubscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerConfig {
    /// Interaction pattern.
    pub kind: InteractionKind,
    /// Button filter.
    pub button: ButtonFilter,
    /// Node the raw listeners are attached to.
    pub background: NodeId,
    /// Whether raw listeners run in the capture position.
    pub capture: bool,
}

impl ListenerConfig {
    /// A bubble-position config for all buttons.
    pub fn new(kind: InteractionKind, background: NodeId) -> Self {
        Self {
            kind,
            button: ButtonFilter::All,
            background,
            capture: false,
        }
    }

    /// Set the button filter.
    #[must_use]
    pub fn with_button(mut self, button: ButtonFilter) -> Self {
        self.button = button;
        self
    }

    /// Set the capture flag.
    #[must_use]
    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }
}

/// A normalized interaction, as delivered to handlers.
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    /// A release, with the matching press if one was observed.
    PressRelease {
        /// The press for the same button, or `None` if it happened before the
        /// listener was attached.
        press: Option<MouseEvent>,
        /// The release.
        release: MouseEvent,
    },
    /// A `click` or `contextmenu`.
    Click(MouseEvent),
    /// A `dblclick`.
    DoubleClick(MouseEvent),
}

impl Interaction {
    /// The kind of interaction.
    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::PressRelease { .. } => InteractionKind::PressRelease,
            Self::Click(_) => InteractionKind::SingleClick,
            Self::DoubleClick(_) => InteractionKind::DoubleClick,
        }
    }

    /// The event that completed the interaction.
    pub fn last_event(&self) -> &MouseEvent {
        match self {
            Self::PressRelease { release, .. } => release,
            Self::Click(ev) | Self::DoubleClick(ev) => ev,
        }
    }

    /// The nodes an outside test has to consider.
    ///
    /// For press/release this is the press target (if any) and the release target;
    /// for clicks it is the event target and `None`. An absent candidate counts as
    /// outside.
    pub fn candidates(&self) -> [Option<NodeId>; 2] {
        match self {
            Self::PressRelease { press, release } => {
                [press.as_ref().map(|ev| ev.target), Some(release.target)]
            }
            Self::Click(ev) | Self::DoubleClick(ev) => [Some(ev.target), None],
        }
    }
}

/// Pending presses for a press/release listener.
///
/// Each button has its own slot. A release consumes and clears exactly the slot of
/// its own button; the other slot is left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PressSlots {
    /// Most recent unmatched primary press.
    pub left: Option<MouseEvent>,
    /// Most recent unmatched secondary press.
    pub right: Option<MouseEvent>,
}

impl PressSlots {
    /// Record a press, if `filter` tracks its button. Other buttons are ignored.
    pub fn press(&mut self, event: &MouseEvent, filter: ButtonFilter) {
        match event.button {
            MouseButton::Left if filter.tracks_left() => self.left = Some(event.clone()),
            MouseButton::Right if filter.tracks_right() => self.right = Some(event.clone()),
            _ => {}
        }
    }

    /// Consume the pending press for the released button.
    ///
    /// Returns `None` if the release should be ignored (untracked button), otherwise
    /// `Some(press)` where `press` may itself be `None`.
    pub fn release(
        &mut self,
        event: &MouseEvent,
        filter: ButtonFilter,
    ) -> Option<Option<MouseEvent>> {
        match event.button {
            MouseButton::Left if filter.tracks_left() => Some(self.left.take()),
            MouseButton::Right if filter.tracks_right() => Some(self.right.take()),
            _ => None,
        }
    }
}

type InteractionCallback = Rc<dyn Fn(&Document, &Interaction)>;

/// A live set of raw subscriptions on a background node.
///
/// Call [`PointerListener::stop`] to remove them. Dropping the listener without
/// stopping it leaves the subscriptions in place.
pub struct PointerListener {
    document: Document,
    config: ListenerConfig,
    subscriptions: SmallVec<[(EventType, ListenerId); 2]>,
}

impl fmt::Debug for PointerListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerListener")
            .field("config", &self.config)
            .field("subscriptions", &self.subscriptions)
            .finish_non_exhaustive()
    }
}

impl PointerListener {
    /// Subscribe on `config.background` and report interactions to `on_interaction`.
    ///
    /// Fails before subscribing anything if the background node is not alive.
    pub fn start(
        document: &Document,
        config: ListenerConfig,
        on_interaction: impl Fn(&Document, &Interaction) + 'static,
    ) -> Result<Self, Error> {
        if !document.is_alive(config.background) {
            return Err(DomError::StaleNode(config.background).into());
        }
        let callback: InteractionCallback = Rc::new(on_interaction);
        let mut listener = Self {
            document: document.clone(),
            config,
            subscriptions: SmallVec::new(),
        };

        match config.kind {
            InteractionKind::PressRelease => {
                let slots = Rc::new(RefCell::new(PressSlots::default()));
                let filter = config.button;

                let pending = slots.clone();
                listener.subscribe(EventType::MouseDown, move |_, ev| {
                    pending.borrow_mut().press(ev, filter);
                    tracing::trace!(button = ?ev.button, target = ?ev.target, "press recorded");
                })?;

                let callback = callback.clone();
                listener.subscribe(EventType::MouseUp, move |doc, ev| {
                    // The slot borrow ends before the callback runs, so handlers may
                    // dispatch further events through the same background.
                    let press = slots.borrow_mut().release(ev, filter);
                    if let Some(press) = press {
                        callback(
                            doc,
                            &Interaction::PressRelease {
                                press,
                                release: ev.clone(),
                            },
                        );
                    }
                })?;
            }
            InteractionKind::SingleClick | InteractionKind::DoubleClick => {
                let kind = config.kind;
                for event_type in kind.raw_events(config.button).event_types() {
                    let callback = callback.clone();
                    listener.subscribe(event_type, move |doc, ev| {
                        let interaction = if kind == InteractionKind::DoubleClick {
                            Interaction::DoubleClick(ev.clone())
                        } else {
                            Interaction::Click(ev.clone())
                        };
                        callback(doc, &interaction);
                    })?;
                }
            }
        }

        tracing::debug!(
            kind = %config.kind,
            button = %config.button,
            background = ?config.background,
            capture = config.capture,
            "pointer listener started"
        );
        Ok(listener)
    }

    fn subscribe(
        &mut self,
        event_type: EventType,
        handler: impl Fn(&Document, &MouseEvent) + 'static,
    ) -> Result<(), Error> {
        let added = self.document.add_event_listener(
            self.config.background,
            event_type,
            self.config.capture,
            move |doc, ev| {
                handler(doc, ev);
                Outcome::Continue
            },
        );
        match added {
            Ok(id) => {
                self.subscriptions.push((event_type, id));
                Ok(())
            }
            Err(err) => {
                self.remove_all();
                Err(err.into())
            }
        }
    }

    fn remove_all(&mut self) {
        for (event_type, id) in self.subscriptions.drain(..) {
            self.document.remove_event_listener(
                self.config.background,
                event_type,
                id,
                self.config.capture,
            );
        }
    }

    /// The configuration this listener was started with.
    pub fn config(&self) -> ListenerConfig {
        self.config
    }

    /// The raw events currently subscribed.
    pub fn raw_events(&self) -> EventMask {
        self.subscriptions
            .iter()
            .fold(EventMask::empty(), |mask, (ty, _)| mask | ty.mask())
    }

    /// Remove exactly the raw subscriptions this listener added.
    pub fn stop(mut self) {
        self.remove_all();
        tracing::debug!(background = ?self.config.background, "pointer listener stopped");
    }
}
