//! Data models for imgtag.
//!
//! This module contains the domain types shared by the store, the sync
//! engine and the session:
//! - Catalog (the fixed, ordered label set)
//! - Item (one image in the collection)
//! - SyncPolicy (record-only, duplicate, relocate)
//! - ToggleAction (what a toggle did)

pub mod catalog;
pub mod item;
pub mod policy;

pub use catalog::Catalog;
pub use item::Item;
pub use policy::{SyncPolicy, ToggleAction};
