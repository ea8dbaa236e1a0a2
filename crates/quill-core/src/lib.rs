//! Quill Core
//!
//! Shared vocabulary for the Quill compiler crates:
//!
//! - [`DataType`] and [`CastKind`] - the value types of the language
//! - [`ast`] - the syntax tree handed over by the (external) parser
//! - [`DeclId`] / [`FuncId`] - stable indices into the scope ledger
//! - [`error`] - diagnostics, internal errors, and decode errors

pub mod ast;
mod data_type;
pub mod error;
mod ids;

pub use data_type::{CastKind, DataType};
pub use error::{
    CompilationError, DecodeError, Diagnostics, InternalError, QuillError,
};
pub use ids::{DeclId, FuncId};
