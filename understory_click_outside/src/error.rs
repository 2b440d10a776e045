// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use understory_dom::DomError;

/// Errors raised while registering click-outside handlers.
///
/// All of these are usage errors surfaced synchronously to the caller; none are
/// retried or recovered from internally. An empty target or a handler gated by a
/// `before` predicate is not an error: the handler simply does not run.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The interaction type name is not one of the recognized types.
    #[error("unexpected click listen type `{0}`")]
    InvalidInteractionType(String),
    /// The button filter name is not `left`, `right` or `all`.
    #[error("unexpected click listen button `{0}`")]
    InvalidButton(String),
    /// The hook form was used without a target outside of any component setup.
    #[error(
        "click outside hook needs an explicit target when no component instance is active; \
         without a target it can only be used during component setup"
    )]
    MissingComponentContext,
    /// The directive binding carries no handler.
    #[error("click-outside binding value must be a handler or an object with a handler")]
    InvalidBindingValue,
    /// The document refused an operation, typically because the background node is gone.
    #[error(transparent)]
    Dom(#[from] DomError),
}
