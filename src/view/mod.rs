//! View models. They hold only transient UI state; task data lives in the store.

pub mod detail;
pub mod form;
pub mod format;
pub mod list;
