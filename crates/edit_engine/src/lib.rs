//! Edit Engine - Undo/redo action log
//!
//! This crate implements the two-stack undo history used by editors built on
//! top of it. Actions are opaque to the log: it only knows how to group them,
//! replay them through an executor, and notify listeners when undo or redo
//! availability changes.

mod error;
mod undo;

pub use error::*;
pub use undo::*;
