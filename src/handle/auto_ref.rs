use std::fmt;

use crate::handle::policy::Release;

/// Scoped owner of at most one handle of kind `H`.
///
/// The kind's [`Release`] entry runs exactly once for every non-null value the wrapper has owned:
/// when the value is replaced through [`AutoRef::set`], dropped through [`AutoRef::reset`], or
/// when the wrapper goes out of scope (including early returns and unwinding).
///
/// Only registered kinds can be wrapped:
///
/// ```compile_fail
/// use grhandle::AutoRef;
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// struct Unregistered(u32);
///
/// let _w: AutoRef<Unregistered> = AutoRef::empty();
/// ```
pub struct AutoRef<H: Release> {
    slot: Option<H>,
}

impl<H: Release> AutoRef<H> {
    /// Take ownership of `handle`. Owning `None` is the same as [`AutoRef::empty`].
    pub fn new(handle: impl Into<Option<H>>) -> Self {
        Self {
            slot: handle.into(),
        }
    }

    /// A wrapper with nothing to release.
    pub fn empty() -> Self {
        Self { slot: None }
    }

    /// The held handle, without transferring ownership.
    pub fn get(&self) -> Option<H> {
        self.slot
    }

    pub fn is_null(&self) -> bool {
        self.slot.is_none()
    }

    /// Out-parameter slot for APIs that fill in a handle.
    ///
    /// Any currently held value is released first, so writing through the slot cannot leak it.
    /// Whatever is left in the slot afterwards is owned by this wrapper.
    pub fn addr(&mut self) -> &mut Option<H> {
        self.reset();
        &mut self.slot
    }

    /// Release the held value (if any), then own `handle`.
    ///
    /// Storing the value that is already held still releases it first; the wrapper does not
    /// compare old and new values.
    pub fn set(&mut self, handle: impl Into<Option<H>>) {
        if let Some(old) = self.slot.take() {
            tracing::trace!(handle = ?old, policy = ?H::POLICY, "release");
            old.release();
        }
        self.slot = handle.into();
    }

    /// Release the held value (if any) and become empty.
    pub fn reset(&mut self) {
        self.set(None);
    }

    /// Give up ownership without releasing. The caller becomes responsible for the value.
    #[must_use = "the returned handle is no longer released by the wrapper"]
    pub fn take(&mut self) -> Option<H> {
        self.slot.take()
    }
}

impl<H: Release> Default for AutoRef<H> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<H: Release> Drop for AutoRef<H> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<H: Release> From<H> for AutoRef<H> {
    fn from(handle: H) -> Self {
        Self::new(handle)
    }
}

impl<H: Release> From<Option<H>> for AutoRef<H> {
    fn from(handle: Option<H>) -> Self {
        Self::new(handle)
    }
}

impl<H: Release> PartialEq<H> for AutoRef<H> {
    fn eq(&self, other: &H) -> bool {
        self.slot == Some(*other)
    }
}

impl<H: Release> PartialEq<Option<H>> for AutoRef<H> {
    fn eq(&self, other: &Option<H>) -> bool {
        self.slot == *other
    }
}

impl<H: Release> fmt::Debug for AutoRef<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AutoRef").field(&self.slot).finish()
    }
}

/// Borrow a raw handle out of anything that holds one.
///
/// Functions that consume handles take `impl AsHandle<H>`, so callers can pass a raw handle, an
/// `Option` of one, or `&AutoRef<H>` without giving up ownership.
pub trait AsHandle<H> {
    fn as_handle(&self) -> Option<H>;
}

impl<H: Release> AsHandle<H> for &AutoRef<H> {
    fn as_handle(&self) -> Option<H> {
        self.slot
    }
}

impl<H: Release> AsHandle<H> for &mut AutoRef<H> {
    fn as_handle(&self) -> Option<H> {
        self.slot
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handle/auto_ref.rs"]
mod tests;
