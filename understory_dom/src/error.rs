// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use crate::types::NodeId;

/// Errors reported by [`Document`](crate::Document) operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The handle refers to an element that has been removed.
    #[error("node {0:?} is not alive in this document")]
    StaleNode(NodeId),
    /// Appending `child` under `parent` would make an element its own ancestor,
    /// or would move the document element.
    #[error("cannot append {child:?} under {parent:?}")]
    HierarchyRequest {
        /// The requested parent.
        parent: NodeId,
        /// The element being appended.
        child: NodeId,
    },
    /// An event name that the document does not know.
    #[error("unknown event type `{0}`")]
    UnknownEventType(String),
}
