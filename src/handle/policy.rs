//! Release-policy registry.
//!
//! Every handle kind that may be owned by an [`AutoRef`](crate::AutoRef) carries exactly one
//! [`Release`] implementation. The binding is resolved by trait dispatch, so wrapping a kind
//! without an entry here is a type error rather than a runtime surprise.

use std::fmt::Debug;

use crate::native::{
    self, ColorRef, ColorSpaceRef, ContextRef, DataProviderRef, DestinationRef, ImageRef,
    StringRef, UrlRef,
};

/// The release action bound to a handle kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReleasePolicy {
    /// Drop one reference through the generic release entry point.
    Generic,
    /// Graphics-context release (distinct entry point from [`ReleasePolicy::Generic`]).
    Context,
    /// Flush pending output and close the session.
    Finalize,
    /// Data-provider release.
    DataProvider,
    /// Color release.
    Color,
}

/// An opaque, freely copyable handle value.
///
/// Copying a handle never implies ownership; only an [`AutoRef`](crate::AutoRef) slot does.
pub trait RawHandle: Copy + Eq + Debug {}

/// Registry entry: the one release operation for a handle kind.
pub trait Release: RawHandle {
    /// Which action [`Release::release`] performs, for diagnostics.
    const POLICY: ReleasePolicy;

    /// Relinquish the reference represented by `self`.
    ///
    /// Infallible from the caller's point of view; a release that cannot complete is logged and
    /// otherwise treated as fatal by the object layer.
    fn release(self);
}

impl Release for StringRef {
    const POLICY: ReleasePolicy = ReleasePolicy::Generic;

    fn release(self) {
        native::release(self);
    }
}

impl Release for ColorSpaceRef {
    const POLICY: ReleasePolicy = ReleasePolicy::Generic;

    fn release(self) {
        native::release(self);
    }
}

impl Release for ContextRef {
    const POLICY: ReleasePolicy = ReleasePolicy::Context;

    fn release(self) {
        native::context_release(self);
    }
}

impl Release for UrlRef {
    const POLICY: ReleasePolicy = ReleasePolicy::Generic;

    fn release(self) {
        native::release(self);
    }
}

impl Release for ImageRef {
    const POLICY: ReleasePolicy = ReleasePolicy::Generic;

    fn release(self) {
        native::release(self);
    }
}

impl Release for DestinationRef {
    const POLICY: ReleasePolicy = ReleasePolicy::Finalize;

    fn release(self) {
        if let Err(err) = native::destination_finalize(self) {
            tracing::warn!(handle = ?self, error = %err, "image destination finalize failed");
        }
    }
}

impl Release for DataProviderRef {
    const POLICY: ReleasePolicy = ReleasePolicy::DataProvider;

    fn release(self) {
        native::data_provider_release(self);
    }
}

impl Release for ColorRef {
    const POLICY: ReleasePolicy = ReleasePolicy::Color;

    fn release(self) {
        native::color_release(self);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handle/policy.rs"]
mod tests;
