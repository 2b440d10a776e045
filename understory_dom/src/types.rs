// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identifiers.

use core::fmt;

/// Identifier for an element in a [`Document`](crate::Document).
///
/// This is a small, copyable handle that stays stable while the element is alive
/// and becomes stale when the element is removed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On removal, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Use [`Document::is_alive`](crate::Document::is_alive) to check liveness.
/// Holding a `NodeId` never keeps an element alive, so a map keyed by `NodeId`
/// behaves like a weak-keyed map: once the element is gone, lookups through the
/// document treat the entry as absent.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// The generation of the slot this handle was issued for.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.0, self.1)
    }
}
