// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mouse events: raw event names, buttons, and the event payload.

use core::fmt;
use core::str::FromStr;

use kurbo::Point;

use crate::error::DomError;
use crate::types::NodeId;

/// Raw mouse event names understood by the document.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// `mousedown`: a button was pressed.
    MouseDown,
    /// `mouseup`: a button was released.
    MouseUp,
    /// `click`: primary button press and release on the same element.
    Click,
    /// `contextmenu`: secondary button click.
    ContextMenu,
    /// `dblclick`: two primary clicks in quick succession.
    DoubleClick,
}

impl EventType {
    /// All event types, in a stable order.
    pub const ALL: [Self; 5] = [
        Self::MouseDown,
        Self::MouseUp,
        Self::Click,
        Self::ContextMenu,
        Self::DoubleClick,
    ];

    /// The DOM name of this event type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::Click => "click",
            Self::ContextMenu => "contextmenu",
            Self::DoubleClick => "dblclick",
        }
    }

    /// The single-bit mask for this event type.
    pub const fn mask(self) -> EventMask {
        match self {
            Self::MouseDown => EventMask::MOUSE_DOWN,
            Self::MouseUp => EventMask::MOUSE_UP,
            Self::Click => EventMask::CLICK,
            Self::ContextMenu => EventMask::CONTEXT_MENU,
            Self::DoubleClick => EventMask::DOUBLE_CLICK,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventType {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| DomError::UnknownEventType(s.into()))
    }
}

bitflags::bitflags! {
    /// A set of [`EventType`]s.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u8 {
        /// `mousedown`.
        const MOUSE_DOWN   = 0b0000_0001;
        /// `mouseup`.
        const MOUSE_UP     = 0b0000_0010;
        /// `click`.
        const CLICK        = 0b0000_0100;
        /// `contextmenu`.
        const CONTEXT_MENU = 0b0000_1000;
        /// `dblclick`.
        const DOUBLE_CLICK = 0b0001_0000;
    }
}

impl EventMask {
    /// Iterate the event types contained in this mask, in [`EventType::ALL`] order.
    pub fn event_types(self) -> impl Iterator<Item = EventType> {
        EventType::ALL
            .into_iter()
            .filter(move |ty| self.contains(ty.mask()))
    }
}

impl From<EventType> for EventMask {
    fn from(ty: EventType) -> Self {
        ty.mask()
    }
}

/// The mouse button that caused an event.
///
/// Mirrors the DOM `MouseEvent.button` codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (code `0`).
    Left,
    /// Auxiliary button, usually the wheel (code `1`).
    Middle,
    /// Secondary button (code `2`).
    Right,
    /// Browser back button (code `3`).
    Back,
    /// Browser forward button (code `4`).
    Forward,
    /// Any other button code.
    Other(u16),
}

impl MouseButton {
    /// Convert a DOM `button` code.
    pub const fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            3 => Self::Back,
            4 => Self::Forward,
            other => Self::Other(other),
        }
    }

    /// The DOM `button` code.
    pub const fn code(self) -> u16 {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
            Self::Back => 3,
            Self::Forward => 4,
            Self::Other(code) => code,
        }
    }
}

/// A mouse event travelling through a [`Document`](crate::Document).
#[derive(Clone, Debug, PartialEq)]
pub struct MouseEvent {
    /// Which raw event this is.
    pub event_type: EventType,
    /// The button that changed state (or `Left` for clicks).
    pub button: MouseButton,
    /// The innermost element the event was dispatched to.
    pub target: NodeId,
    /// Pointer position in document coordinates.
    pub position: Point,
}

impl MouseEvent {
    /// Create an event at the origin.
    pub fn new(event_type: EventType, button: MouseButton, target: NodeId) -> Self {
        Self {
            event_type,
            button,
            target,
            position: Point::ZERO,
        }
    }

    /// Set the pointer position.
    #[must_use]
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn event_names_round_trip_through_from_str() {
        for ty in EventType::ALL {
            assert_eq!(ty.name().parse::<EventType>().unwrap(), ty);
        }
        assert_eq!(
            "pointerdown".parse::<EventType>(),
            Err(DomError::UnknownEventType("pointerdown".into()))
        );
    }

    #[test]
    fn mask_iterates_in_stable_order() {
        let mask = EventMask::CONTEXT_MENU | EventMask::CLICK;
        let types: Vec<_> = mask.event_types().collect();
        assert_eq!(types, [EventType::Click, EventType::ContextMenu]);
        assert_eq!(EventMask::empty().event_types().count(), 0);
    }

    #[test]
    fn button_codes_follow_dom() {
        assert_eq!(MouseButton::from_code(0), MouseButton::Left);
        assert_eq!(MouseButton::from_code(2), MouseButton::Right);
        assert_eq!(MouseButton::from_code(7), MouseButton::Other(7));
        assert_eq!(MouseButton::Other(7).code(), 7);
        assert_eq!(MouseButton::Middle.code(), 1);
    }
}
