//! Reference-counted element storage shared by matrix handles.
//!
//! A [`Buffer`] is the only owner of element memory. Every handle that
//! aliases the storage holds one strong reference; the storage is freed when
//! the last reference is released. Releasing consumes the value, so a buffer
//! can never be released twice.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use super::Scalar;
use crate::error::{MatrixError, Result};

/// Contiguous, zero-initialized, shared element storage.
pub struct Buffer {
    inner: Rc<RefCell<Vec<Scalar>>>,
}

impl Buffer {
    /// Allocates `len` zeroed elements with a reference count of 1.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Allocation`] if `len == 0` or the allocator
    /// cannot satisfy the request.
    pub fn allocate(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(MatrixError::Allocation { elements: 0 });
        }
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MatrixError::Allocation { elements: len })?;
        data.resize(len, 0.0);
        Ok(Self::wrap(data))
    }

    /// Takes ownership of already-initialized elements.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Allocation`] if `data` is empty.
    pub fn from_vec(data: Vec<Scalar>) -> Result<Self> {
        if data.is_empty() {
            return Err(MatrixError::Allocation { elements: 0 });
        }
        Ok(Self::wrap(data))
    }

    fn wrap(data: Vec<Scalar>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(data)),
        }
    }

    /// Creates another reference to the same storage.
    #[must_use]
    pub fn retain(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Drops this reference. Returns `true` if it was the last one and the
    /// storage has been destroyed.
    pub fn release(self) -> bool {
        let last = Rc::strong_count(&self.inner) == 1;
        drop(self);
        last
    }

    /// Number of live references to the storage.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Number of elements in the storage.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Always `false`; empty buffers cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Returns `true` if both references point at the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// An observer that does not keep the storage alive.
    #[must_use]
    pub fn probe(&self) -> BufferProbe {
        BufferProbe {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn borrow(&self) -> Ref<'_, Vec<Scalar>> {
        self.inner.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, Vec<Scalar>> {
        self.inner.borrow_mut()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if Rc::strong_count(&self.inner) == 1 {
            trace!(elements = self.inner.borrow().len(), "last reference released, buffer freed");
        }
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

/// Weak observer of a [`Buffer`], used to check reference counts after
/// handles have been released.
#[derive(Debug, Clone)]
pub struct BufferProbe {
    inner: Weak<RefCell<Vec<Scalar>>>,
}

impl BufferProbe {
    /// Live references; 0 once the storage has been destroyed.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.inner.strong_count()
    }

    /// Returns `true` while at least one handle still references the storage.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.ref_count() > 0
    }
}
