use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use crate::foundation::error::{GrError, GrResult};
use crate::native::color::{ColorModel, ColorValue};
use crate::native::context::BitmapContext;
use crate::native::destination::Destination;
use crate::native::image::BitmapImage;
use crate::native::types::NativeHandle;
use crate::native::url::Locator;

/// Closed set of object kinds the table can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    String,
    ColorSpace,
    Context,
    Url,
    Image,
    Destination,
    DataProvider,
    Color,
}

impl ObjectKind {
    pub(crate) fn type_name(self) -> &'static str {
        match self {
            Self::String => "StringRef",
            Self::ColorSpace => "ColorSpaceRef",
            Self::Context => "ContextRef",
            Self::Url => "UrlRef",
            Self::Image => "ImageRef",
            Self::Destination => "DestinationRef",
            Self::DataProvider => "DataProviderRef",
            Self::Color => "ColorRef",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

pub(crate) enum Object {
    String(String),
    ColorSpace(ColorModel),
    Context(BitmapContext),
    Url(Locator),
    Image(BitmapImage),
    Destination(Destination),
    DataProvider(Arc<[u8]>),
    Color(ColorValue),
}

impl Object {
    pub(crate) fn kind(&self) -> ObjectKind {
        match self {
            Self::String(_) => ObjectKind::String,
            Self::ColorSpace(_) => ObjectKind::ColorSpace,
            Self::Context(_) => ObjectKind::Context,
            Self::Url(_) => ObjectKind::Url,
            Self::Image(_) => ObjectKind::Image,
            Self::Destination(_) => ObjectKind::Destination,
            Self::DataProvider(_) => ObjectKind::DataProvider,
            Self::Color(_) => ObjectKind::Color,
        }
    }

    /// Ids this object holds a reference to; released when the object is freed.
    fn retained(&self) -> Vec<NonZeroU64> {
        match self {
            Self::Color(c) => vec![c.space.id()],
            Self::Context(c) => vec![c.space.id()],
            Self::Image(i) => i.provider.map(|p| p.id()).into_iter().collect(),
            Self::Destination(d) => d.retained(),
            Self::String(_) | Self::ColorSpace(_) | Self::Url(_) | Self::DataProvider(_) => {
                Vec::new()
            }
        }
    }
}

struct Entry {
    retain_count: usize,
    object: Object,
}

#[derive(Default)]
pub(crate) struct Table {
    issued: u64,
    entries: HashMap<NonZeroU64, Entry>,
}

static TABLE: LazyLock<Mutex<Table>> = LazyLock::new(Mutex::default);

/// Run `f` with exclusive access to the process-wide object table.
pub(crate) fn with_table<R>(f: impl FnOnce(&mut Table) -> R) -> R {
    let mut table = TABLE.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut table)
}

impl Table {
    /// Store `object` with a retain count of one.
    pub(crate) fn insert<H: NativeHandle>(&mut self, object: Object) -> H {
        debug_assert_eq!(object.kind(), H::KIND);
        let id = NonZeroU64::MIN.saturating_add(self.issued);
        self.issued += 1;
        self.entries.insert(
            id,
            Entry {
                retain_count: 1,
                object,
            },
        );
        H::from_id(id)
    }

    pub(crate) fn get<H: NativeHandle>(&self, h: H) -> GrResult<&Object> {
        match self.entries.get(&h.id()) {
            Some(e) if e.object.kind() == H::KIND => Ok(&e.object),
            Some(e) => Err(GrError::invalid_handle(format!(
                "{h:?} refers to a {}",
                e.object.kind()
            ))),
            None => Err(GrError::invalid_handle(format!("{h:?} is not live"))),
        }
    }

    pub(crate) fn get_mut<H: NativeHandle>(&mut self, h: H) -> GrResult<&mut Object> {
        match self.entries.get_mut(&h.id()) {
            Some(e) if e.object.kind() == H::KIND => Ok(&mut e.object),
            Some(e) => Err(GrError::invalid_handle(format!(
                "{h:?} refers to a {}",
                e.object.kind()
            ))),
            None => Err(GrError::invalid_handle(format!("{h:?} is not live"))),
        }
    }

    fn retain_id(&mut self, id: NonZeroU64) -> bool {
        match self.entries.get_mut(&id) {
            Some(e) => {
                e.retain_count += 1;
                true
            }
            None => false,
        }
    }

    /// Drop one reference to `id`, freeing it (and what it retains) at zero.
    ///
    /// Returns `false` if `id` was not live.
    fn release_id(&mut self, id: NonZeroU64) -> bool {
        if !self.entries.contains_key(&id) {
            return false;
        }
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let Some(entry) = self.entries.get_mut(&id) else {
                tracing::error!(id = id.get(), "retained object vanished before its owner");
                continue;
            };
            entry.retain_count -= 1;
            if entry.retain_count == 0 {
                if let Some(freed) = self.entries.remove(&id) {
                    tracing::trace!(id = id.get(), kind = %freed.object.kind(), "free");
                    pending.extend(freed.object.retained());
                }
            }
        }
        true
    }
}

/// Add one reference to `h` and return it.
pub fn retain<H: NativeHandle>(h: H) -> GrResult<H> {
    if with_table(|t| t.retain_id(h.id())) {
        Ok(h)
    } else {
        Err(GrError::invalid_handle(format!("{h:?} is not live")))
    }
}

/// Generic release: drop one reference to `h`.
///
/// # Panics
///
/// Releasing a handle that is no longer live is an over-release and aborts the caller.
pub fn release<H: NativeHandle>(h: H) {
    if !with_table(|t| t.release_id(h.id())) {
        panic!("over-release of {h:?}");
    }
}

/// Current retain count, or `None` once the object has been freed.
pub fn retain_count<H: NativeHandle>(h: H) -> Option<usize> {
    with_table(|t| t.entries.get(&h.id()).map(|e| e.retain_count))
}

pub fn is_live<H: NativeHandle>(h: H) -> bool {
    retain_count(h).is_some()
}

/// [`retain`] for callers already holding the table.
pub(crate) fn retain_in<H: NativeHandle>(table: &mut Table, h: H) -> GrResult<H> {
    table.get(h)?;
    table.retain_id(h.id());
    Ok(h)
}

#[cfg(test)]
#[path = "../../tests/unit/native/table.rs"]
mod tests;
