//! Label catalog.
//!
//! The catalog is decided once at session configuration time. Its order
//! defines the column order of the table and the position of each digit
//! in a one-hot vector.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::validate::{find_similar, validate_labels};

/// The fixed, ordered set of labels for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    labels: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from labels in their significant order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the list is empty, has duplicates, or
    /// contains a name that cannot be used as a folder.
    pub fn new(labels: Vec<String>) -> Result<Self> {
        validate_labels(&labels).map_err(Error::InvalidArgument)?;

        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();

        Ok(Self { labels, index })
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Catalog position of a label.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Catalog position of a label, or `InvalidLabel` with suggestions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLabel` if the label is not in the catalog.
    pub fn require(&self, label: &str) -> Result<usize> {
        self.position(label).ok_or_else(|| Error::InvalidLabel {
            label: label.to_string(),
            similar: find_similar(label, self.iter(), 3),
        })
    }

    /// Label at a catalog position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&str> {
        self.labels.get(position).map(String::as_str)
    }

    /// Labels in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Labels in catalog order, as a slice.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
