use std::num::NonZeroU64;

use crate::handle::auto_ref::AsHandle;
use crate::handle::policy::RawHandle;
use crate::native::table::ObjectKind;

/// A handle into the native object table.
pub trait NativeHandle: RawHandle {
    /// Object kind the handle refers to.
    const KIND: ObjectKind;

    /// Table id behind the handle.
    fn id(self) -> NonZeroU64;

    #[doc(hidden)]
    fn from_id(id: NonZeroU64) -> Self;
}

macro_rules! native_handles {
    ($($(#[$meta:meta])* $name:ident => $kind:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
            pub struct $name(NonZeroU64);

            impl RawHandle for $name {}

            impl NativeHandle for $name {
                const KIND: ObjectKind = ObjectKind::$kind;

                fn id(self) -> NonZeroU64 {
                    self.0
                }

                fn from_id(id: NonZeroU64) -> Self {
                    Self(id)
                }
            }

            impl AsHandle<$name> for $name {
                fn as_handle(&self) -> Option<$name> {
                    Some(*self)
                }
            }

            impl AsHandle<$name> for Option<$name> {
                fn as_handle(&self) -> Option<$name> {
                    *self
                }
            }
        )*
    };
}

native_handles! {
    /// Immutable string object; the generic reference-counted kind.
    StringRef => String;
    /// Color space (device RGB or device gray).
    ColorSpaceRef => ColorSpace;
    /// Bitmap drawing context.
    ContextRef => Context;
    /// Resource locator (`file://` or `http://`).
    UrlRef => Url;
    /// Decoded, immutable image.
    ImageRef => Image;
    /// Image encoder session writing to a URL.
    DestinationRef => Destination;
    /// Byte source for image decoding.
    DataProviderRef => DataProvider;
    /// Color value bound to a color space.
    ColorRef => Color;
}

/// Resolve a handle argument, mapping null to [`GrError::NullHandle`](crate::GrError::NullHandle).
pub(crate) fn require<H: NativeHandle>(h: impl AsHandle<H>) -> crate::GrResult<H> {
    h.as_handle()
        .ok_or(crate::GrError::NullHandle(H::KIND.type_name()))
}
