//! Command implementations.

pub mod completions;
pub mod new;
pub mod open;
pub mod scan;
pub mod shell;
pub mod show;
pub mod version;
