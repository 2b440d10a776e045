// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch routing: build a capture → target → bubble sequence and walk it.
//!
//! [`route`] turns a root→target path into the ordered list of [`Dispatch`]
//! entries a DOM event visits, and [`run`] executes a handler over that list
//! while honoring [`Outcome`]s:
//!
//! - Process entries in order.
//! - [`Outcome::Stop`] and [`Outcome::StopImmediate`] abort propagation after the
//!   current entry (no target/bubble if raised in capture).
//! - Returns `true` if propagation was stopped.
//!
//! The difference between the two stop flavors only matters inside one entry,
//! where several listeners may share a node and phase; the document uses it to
//! decide whether the remaining listeners on that node still run.
//!
//! ## Minimal example
//!
//! ```
//! use understory_dom::dispatch::{self, Outcome, Phase};
//!
//! let seq = dispatch::route(&[1_u32, 2]);
//!
//! let mut handled: Vec<(Phase, u32)> = Vec::new();
//! let stopped = dispatch::run(&seq, &mut (), |d, _| {
//!     handled.push((d.phase, d.node));
//!     Outcome::Continue
//! });
//!
//! assert!(!stopped);
//! assert_eq!(handled, vec![
//!     (Phase::Capture, 1),
//!     (Phase::Target, 2),
//!     (Phase::Bubble, 1),
//! ]);
//! ```

use alloc::vec::Vec;

/// Which leg of the route an entry belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Root → parent of target, before the target sees the event.
    Capture,
    /// The target itself.
    Target,
    /// Parent of target → root, after the target saw the event.
    Bubble,
}

/// One step of a dispatch sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dispatch<K> {
    /// Phase of this step.
    pub phase: Phase,
    /// Node visited by this step.
    pub node: K,
}

impl<K> Dispatch<K> {
    /// A capture-phase entry.
    pub const fn capture(node: K) -> Self {
        Self {
            phase: Phase::Capture,
            node,
        }
    }

    /// A target-phase entry.
    pub const fn target(node: K) -> Self {
        Self {
            phase: Phase::Target,
            node,
        }
    }

    /// A bubble-phase entry.
    pub const fn bubble(node: K) -> Self {
        Self {
            phase: Phase::Bubble,
            node,
        }
    }
}

/// What a handler wants to happen after it ran.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Keep propagating.
    #[default]
    Continue,
    /// Stop propagation: remaining listeners on the current node still run,
    /// later nodes do not.
    Stop,
    /// Stop propagation and skip the remaining listeners on the current node.
    StopImmediate,
}

impl Outcome {
    /// Returns `true` for either stop flavor.
    pub const fn is_stop(self) -> bool {
        !matches!(self, Self::Continue)
    }

    /// Combine two outcomes from the same entry, keeping the strongest.
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        match (self, other) {
            (Self::StopImmediate, _) | (_, Self::StopImmediate) => Self::StopImmediate,
            (Self::Stop, _) | (_, Self::Stop) => Self::Stop,
            _ => Self::Continue,
        }
    }
}

/// Build the capture → target → bubble sequence for a root→target `path`.
///
/// The last element of `path` is the target. An empty path yields an empty sequence.
pub fn route<K: Copy>(path: &[K]) -> Vec<Dispatch<K>> {
    let Some((&target, ancestors)) = path.split_last() else {
        return Vec::new();
    };
    let mut seq = Vec::with_capacity(ancestors.len() * 2 + 1);
    seq.extend(ancestors.iter().copied().map(Dispatch::capture));
    seq.push(Dispatch::target(target));
    seq.extend(ancestors.iter().rev().copied().map(Dispatch::bubble));
    seq
}

/// Run a handler over a dispatch sequence and honor stop outcomes.
///
/// - `seq`: a sequence produced by [`route`], or built by hand in the same order.
/// - `event`: a mutable payload carried across handler calls; you own its shape.
/// - `handler`: per-entry callback; return an [`Outcome`] to control propagation.
///
/// Returns `true` if a handler stopped propagation.
pub fn run<K, E>(
    seq: &[Dispatch<K>],
    event: &mut E,
    mut handler: impl FnMut(&Dispatch<K>, &mut E) -> Outcome,
) -> bool {
    for d in seq {
        if handler(d, event).is_stop() {
            return true;
        }
    }
    false
}
