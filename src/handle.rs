pub(crate) mod auto_ref;
pub(crate) mod policy;
