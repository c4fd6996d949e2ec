use crate::foundation::error::{GrError, GrResult};
use crate::handle::auto_ref::AsHandle;
use crate::native::table::{Object, with_table};
use crate::native::types::{StringRef, require};

pub fn string_create(s: &str) -> StringRef {
    with_table(|t| t.insert(Object::String(s.to_owned())))
}

pub fn string_value(s: impl AsHandle<StringRef>) -> GrResult<String> {
    let s = require(s)?;
    with_table(|t| match t.get(s)? {
        Object::String(v) => Ok(v.clone()),
        _ => Err(GrError::invalid_handle("expected a string")),
    })
}
