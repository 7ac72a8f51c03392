//! Minimal columnar data model used for relation data.
pub mod array;
pub mod batch;
pub mod datatype;
pub mod field;
pub mod format;
pub mod scalar;
