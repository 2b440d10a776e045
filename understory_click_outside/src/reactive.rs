// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reactive references: shared cells with a revision counter.
//!
//! A [`Ref`] is the single-threaded equivalent of a framework's reactive reference.
//! Every write bumps a monotonically increasing revision, so a consumer that
//! remembers the revision it last read can tell cheaply whether anything changed.
//! Consumers still compare the values they derive from a `Ref` by value before
//! acting, so writing an equal value is harmless.
//!
//! ```
//! use understory_click_outside::reactive::Ref;
//!
//! let width = Ref::new(10);
//! let observer = width.clone();
//! let seen = observer.revision();
//!
//! width.set(20);
//! assert_eq!(observer.get(), 20);
//! assert!(observer.revision() > seen);
//! ```

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

struct RefInner<T> {
    value: RefCell<T>,
    revision: Cell<u64>,
}

/// A shared, versioned value.
///
/// Clones share the same value. Equality ([`PartialEq`]) is identity: two `Ref`s
/// are equal when they are clones of each other.
pub struct Ref<T> {
    inner: Rc<RefInner<T>>,
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("value", &self.inner.value)
            .field("revision", &self.inner.revision.get())
            .finish()
    }
}

impl<T: Default> Default for Ref<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Ref<T> {
    /// Create a reference holding `value` at revision `0`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefInner {
                value: RefCell::new(value),
                revision: Cell::new(0),
            }),
        }
    }

    /// Read the value through a closure.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.bump();
    }

    /// Mutate the value in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.inner.value.borrow_mut());
        self.bump();
        out
    }

    /// The number of writes so far.
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Returns `true` if both handles share the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn bump(&self) {
        self.inner.revision.set(self.inner.revision.get() + 1);
    }
}

impl<T: Clone> Ref<T> {
    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }
}
