// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handlers and registration options.

use alloc::rc::Rc;
use core::fmt;

use understory_dom::NodeId;

use crate::error::Error;
use crate::listener::{ButtonFilter, Interaction, InteractionKind};
use crate::reactive::Ref;
use crate::target::Target;

/// A click-outside handler.
///
/// Handlers are shared (`Rc`) and compare by identity, so re-binding the same
/// handler is recognized as "unchanged".
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Interaction)>);

impl Handler {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&Interaction) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the handler.
    pub fn call(&self, interaction: &Interaction) {
        (self.0)(interaction);
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&Rc::as_ptr(&self.0)).finish()
    }
}

/// A `before` predicate; returning `false` suppresses the handler for one interaction.
///
/// Compares by identity, like [`Handler`].
#[derive(Clone)]
pub struct Predicate(Rc<dyn Fn(&Interaction) -> bool>);

impl Predicate {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&Interaction) -> bool + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Evaluate the predicate.
    pub fn test(&self, interaction: &Interaction) -> bool {
        (self.0)(interaction)
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&Rc::as_ptr(&self.0)).finish()
    }
}

/// Options for a click-outside registration.
///
/// | field        | default                          |
/// |--------------|----------------------------------|
/// | `kind`       | [`InteractionKind::PressRelease`] |
/// | `button`     | [`ButtonFilter::All`]            |
/// | `exclude`    | none                             |
/// | `before`     | none                             |
/// | `background` | the document element             |
/// | `capture`    | `false`                          |
///
/// ```
/// use understory_click_outside::listener::{ButtonFilter, InteractionKind};
/// use understory_click_outside::options::ClickOutsideOptions;
///
/// let options = ClickOutsideOptions::new()
///     .with_type_name("click")
///     .unwrap()
///     .with_button(ButtonFilter::Left);
/// assert_eq!(options.kind, InteractionKind::SingleClick);
///
/// assert!(ClickOutsideOptions::new().with_type_name("hover").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClickOutsideOptions {
    /// Which interaction triggers the handler.
    pub kind: InteractionKind,
    /// Which buttons count. Ignored for double clicks.
    pub button: ButtonFilter,
    /// Extra targets that also suppress the handler when clicked.
    pub exclude: Option<Target>,
    /// Called with the handler's arguments before the handler; `false` suppresses it.
    pub before: Option<Predicate>,
    /// Node the raw listeners are attached to; `None` means the document element.
    pub background: Option<NodeId>,
    /// Whether raw listeners run in the capture position, so that handlers which
    /// stop propagation inside the page cannot hide clicks from this registration.
    pub capture: bool,
}

impl ClickOutsideOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interaction kind.
    #[must_use]
    pub fn with_kind(mut self, kind: InteractionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the interaction kind from its name (`pressRelease`/`downUp`,
    /// `singleClick`/`click`, `doubleClick`/`dblclick`).
    pub fn with_type_name(self, name: &str) -> Result<Self, Error> {
        Ok(self.with_kind(name.parse()?))
    }

    /// Set the button filter.
    #[must_use]
    pub fn with_button(mut self, button: ButtonFilter) -> Self {
        self.button = button;
        self
    }

    /// Set the button filter from its name (`left`, `right`, `all`).
    pub fn with_button_name(self, name: &str) -> Result<Self, Error> {
        Ok(self.with_button(name.parse()?))
    }

    /// Set the exclusion target.
    #[must_use]
    pub fn with_exclude(mut self, exclude: impl Into<Target>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    /// Set the `before` predicate.
    #[must_use]
    pub fn with_before(mut self, before: impl Fn(&Interaction) -> bool + 'static) -> Self {
        self.before = Some(Predicate::new(before));
        self
    }

    /// Set the background node.
    #[must_use]
    pub fn with_background(mut self, background: NodeId) -> Self {
        self.background = Some(background);
        self
    }

    /// Set the capture flag.
    #[must_use]
    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }
}

/// Where a registration reads its options from.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionsSource {
    /// Options that never change.
    Fixed(ClickOutsideOptions),
    /// Options that may be replaced or mutated in place.
    Reactive(Ref<ClickOutsideOptions>),
}

impl OptionsSource {
    /// The current options.
    pub fn get(&self) -> ClickOutsideOptions {
        match self {
            Self::Fixed(options) => options.clone(),
            Self::Reactive(options) => options.get(),
        }
    }

    /// A revision that changes whenever the options may have changed.
    ///
    /// Fixed options always report `0`.
    pub fn revision(&self) -> u64 {
        match self {
            Self::Fixed(_) => 0,
            Self::Reactive(options) => options.revision(),
        }
    }
}

impl Default for OptionsSource {
    fn default() -> Self {
        Self::Fixed(ClickOutsideOptions::default())
    }
}

impl From<ClickOutsideOptions> for OptionsSource {
    fn from(options: ClickOutsideOptions) -> Self {
        Self::Fixed(options)
    }
}

impl From<Ref<ClickOutsideOptions>> for OptionsSource {
    fn from(options: Ref<ClickOutsideOptions>) -> Self {
        Self::Reactive(options)
    }
}
