//! Client-side services for Cura Engine slicing profiles.
//!
//! The crate keeps a local, sorted projection of the server's slicing
//! profiles in sync with the remote, renders the schema-driven profile
//! editor, checks the configured engine executable and stages profile
//! imports.

pub mod error;
pub mod services;

pub use error::{CuraEngineError, ErrorKind, FieldError, FieldErrors, Result, ValidationError};
