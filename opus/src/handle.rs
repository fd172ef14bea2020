//! Owning wrapper around one native codec state.

use std::os::raw::c_int;
use std::ptr;

use crate::error::{self, Error, Result};

/// Exclusive owner of a native `OpusEncoder` / `OpusDecoder` pointer.
///
/// The pointer is destroyed at most once: either by [`Handle::release`] or,
/// if the owner never released it, when the handle is dropped. A released
/// handle keeps a null pointer and refuses to hand it out again.
pub(crate) struct Handle<T> {
    raw: *mut T,
    destroy: unsafe fn(*mut T),
    kind: &'static str,
}

// Safety: the pointer is owned by exactly one Handle and is only reached
// through `&mut` access on the owning façade.
unsafe impl<T> Send for Handle<T> {}

impl<T> Handle<T> {
    /// Runs a native create routine and wraps its result.
    ///
    /// `factory` receives the out-of-band status slot. A negative status or a
    /// null pointer yields the mapped error and no handle.
    ///
    /// # Safety
    ///
    /// `destroy` must be the routine that frees pointers produced by
    /// `factory`.
    pub(crate) unsafe fn create<F>(
        kind: &'static str,
        factory: F,
        destroy: unsafe fn(*mut T),
    ) -> Result<Self>
    where
        F: FnOnce(*mut c_int) -> *mut T,
    {
        let mut status: c_int = 0;
        let raw = factory(&mut status);

        if let Err(err) = error::check(status) {
            if !raw.is_null() {
                unsafe { destroy(raw) };
            }
            tracing::debug!("opus {} create failed: {}", kind, err);
            return Err(err);
        }
        if raw.is_null() {
            tracing::debug!("opus {} create returned null", kind);
            return Err(Error::AllocationFailure);
        }

        tracing::debug!("opus {} created", kind);
        Ok(Self { raw, destroy, kind })
    }

    /// Returns true once the native state has been released.
    pub(crate) fn is_closed(&self) -> bool {
        self.raw.is_null()
    }

    /// Returns the live pointer, or `Error::Disposed` once released.
    ///
    /// This is the single guarded entry every native call goes through.
    pub(crate) fn as_ptr(&self) -> Result<*mut T> {
        if self.raw.is_null() {
            return Err(Error::Disposed);
        }
        Ok(self.raw)
    }

    /// Runs one native call against the live pointer and checks its result.
    ///
    /// The disposal check happens before `f` runs, so a closed handle never
    /// reaches native code. `f` may reject its arguments before calling out.
    pub(crate) fn call<F>(&self, f: F) -> Result<i32>
    where
        F: FnOnce(*mut T) -> Result<c_int>,
    {
        let raw = self.as_ptr()?;
        error::check(f(raw)?)
    }

    /// Frees the native state. Releasing a closed handle does nothing.
    pub(crate) fn release(&mut self) {
        if self.raw.is_null() {
            return;
        }
        let raw = std::mem::replace(&mut self.raw, ptr::null_mut());
        unsafe { (self.destroy)(raw) };
        tracing::debug!("opus {} released", self.kind);
    }
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            tracing::warn!("opus {} dropped without dispose, releasing", self.kind);
            let raw = std::mem::replace(&mut self.raw, ptr::null_mut());
            unsafe { (self.destroy)(raw) };
        }
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &self.kind)
            .field("closed", &self.is_closed())
            .finish()
    }
}
