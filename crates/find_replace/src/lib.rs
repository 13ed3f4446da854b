//! Find/Replace - Search controller for editable text targets
//!
//! This crate implements the find/replace workflow of an editor: option
//! handling, directional and incremental search with wraparound, bulk
//! select-all and replace-all, and search scopes. The controller drives any
//! buffer implementing [`FindReplaceTarget`]; [`TextBuffer`] is an in-memory one.

mod buffer;
mod cancel;
mod controller;
mod error;
mod options;
mod session;
mod settings;
mod status;
mod target;

pub use buffer::*;
pub use cancel::*;
pub use controller::*;
pub use error::*;
pub use options::*;
pub use session::*;
pub use settings::*;
pub use status::{Severity, Status};
pub use target::*;
