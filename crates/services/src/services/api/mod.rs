//! HTTP access to the slicing server.
//!
//! Wraps the server's slicing-profile API, the plugin endpoints of the Cura
//! Engine plugin and the utility/settings endpoints used by the plugin's
//! configuration dialog.

pub mod client;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{CuraEngineClient, Session, StaticSession};
pub use types::*;
