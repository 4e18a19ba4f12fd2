//! imgtag - assign labels to a folder of images
//!
//! This crate provides the core functionality for the `imgtag` CLI tool.
//!
//! # Architecture
//!
//! - [`model`] - Data types (Catalog, Item, SyncPolicy)
//! - [`store`] - Per-item label assignments and the one-hot row codec
//! - [`sync`] - Folder-tree side effects and table import/export
//! - [`session`] - Cursor, toggles and command dispatch
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Configuration management
//! - [`validate`] - Label and mode validation
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod store;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};
pub use session::Session;
