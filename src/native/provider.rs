use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{GrError, GrResult};
use crate::handle::auto_ref::AsHandle;
use crate::native::table::{self, Object, with_table};
use crate::native::types::{DataProviderRef, UrlRef, require};
use crate::native::url::locator_of;

pub fn data_provider_create_with_data(bytes: Vec<u8>) -> DataProviderRef {
    with_table(|t| t.insert(Object::DataProvider(Arc::from(bytes))))
}

/// Read `path` eagerly; fails if the file cannot be read.
pub fn data_provider_create_with_filename(path: impl AsRef<Path>) -> GrResult<DataProviderRef> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    Ok(data_provider_create_with_data(bytes))
}

/// Fetch the resource behind `url` (file or plain HTTP).
pub fn data_provider_create_with_url(url: impl AsHandle<UrlRef>) -> GrResult<DataProviderRef> {
    let locator = locator_of(url)?;
    let bytes = locator.fetch()?;
    Ok(data_provider_create_with_data(bytes))
}

pub fn data_provider_len(provider: impl AsHandle<DataProviderRef>) -> GrResult<usize> {
    provider_bytes(provider).map(|b| b.len())
}

pub(crate) fn provider_bytes(provider: impl AsHandle<DataProviderRef>) -> GrResult<Arc<[u8]>> {
    let provider = require(provider)?;
    with_table(|t| match t.get(provider)? {
        Object::DataProvider(bytes) => Ok(Arc::clone(bytes)),
        _ => Err(GrError::invalid_handle("expected a data provider")),
    })
}

/// Data-provider-specific release.
pub fn data_provider_release(provider: DataProviderRef) {
    tracing::trace!(handle = ?provider, "data provider release");
    table::release(provider);
}
