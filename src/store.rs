//! Assignment store.
//!
//! Maps each item to the ordered list of labels assigned to it. Order is
//! assignment (insertion) order, not catalog order. An item with no labels
//! has no entry at all: removing the last label removes the entry.
//!
//! The store never touches the file system. The sync engine reacts to the
//! [`ToggleAction`] returned by [`AssignmentStore::toggle`].

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::model::{Catalog, ToggleAction};

// ── One-hot digits ───────────────────────────────────────────

/// One digit per catalog position: `true` iff that label is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHot(Vec<bool>);

impl OneHot {
    /// Parse table digits, each of which must be `"0"` or `"1"`.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns a reason string when the count or a digit is invalid.
    pub fn parse<S: AsRef<str>>(digits: &[S], expected: usize) -> std::result::Result<Self, String> {
        if digits.len() != expected {
            return Err(format!(
                "expected {expected} digits, got {}",
                digits.len()
            ));
        }

        digits
            .iter()
            .enumerate()
            .map(|(i, d)| match d.as_ref().trim() {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(format!("digit {} is '{other}', expected 0 or 1", i + 1)),
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Digits as table strings.
    pub fn digits(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|&b| if b { "1" } else { "0" })
    }

    /// Per-position flags.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Number of assigned labels.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

impl fmt::Display for OneHot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.digits().collect();
        f.write_str(&joined.join(","))
    }
}

// ── Assignment ───────────────────────────────────────────────

/// Labels of one item: insertion order plus a membership mask.
#[derive(Debug, Clone)]
struct Assignment {
    order: Vec<usize>,
    present: Vec<bool>,
}

impl Assignment {
    fn new(catalog_len: usize) -> Self {
        Self {
            order: Vec::new(),
            present: vec![false; catalog_len],
        }
    }
}

// ── Store ────────────────────────────────────────────────────

/// In-memory mapping from item name to its assigned labels.
#[derive(Debug, Clone)]
pub struct AssignmentStore {
    catalog: Catalog,
    items: Vec<String>,
    positions: HashMap<String, usize>,
    assignments: HashMap<String, Assignment>,
}

impl AssignmentStore {
    /// Create an empty store over a catalog and an item sequence.
    ///
    /// The item sequence fixes the row order of [`Self::export_rows`].
    /// Repeated names keep their first position.
    pub fn new(catalog: Catalog, items: impl IntoIterator<Item = String>) -> Self {
        let mut names = Vec::new();
        let mut positions = HashMap::new();
        for name in items {
            if !positions.contains_key(&name) {
                positions.insert(name.clone(), names.len());
                names.push(name);
            }
        }

        Self {
            catalog,
            items: names,
            positions,
            assignments: HashMap::new(),
        }
    }

    /// The session catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Item names in sequence order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Whether the item is part of the sequence.
    #[must_use]
    pub fn contains_item(&self, item: &str) -> bool {
        self.positions.contains_key(item)
    }

    fn require_item(&self, item: &str) -> Result<()> {
        if self.contains_item(item) {
            Ok(())
        } else {
            Err(Error::UnknownItem {
                item: item.to_string(),
            })
        }
    }

    /// Toggle a label on an item.
    ///
    /// Removes the label if it is assigned (dropping the entry when it was
    /// the last one), otherwise appends it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLabel` for labels outside the catalog and
    /// `UnknownItem` for items outside the sequence.
    pub fn toggle(&mut self, item: &str, label: &str) -> Result<ToggleAction> {
        let pos = self.catalog.require(label)?;
        self.require_item(item)?;

        if let Some(assignment) = self.assignments.get_mut(item) {
            if assignment.present[pos] {
                assignment.present[pos] = false;
                assignment.order.retain(|&p| p != pos);
                if assignment.order.is_empty() {
                    self.assignments.remove(item);
                }
                return Ok(ToggleAction::Removed);
            }
            assignment.present[pos] = true;
            assignment.order.push(pos);
            return Ok(ToggleAction::Added);
        }

        let mut assignment = Assignment::new(self.catalog.len());
        assignment.present[pos] = true;
        assignment.order.push(pos);
        self.assignments.insert(item.to_string(), assignment);
        Ok(ToggleAction::Added)
    }

    /// Labels assigned to an item, in assignment order. Empty if none.
    #[must_use]
    pub fn labels_for(&self, item: &str) -> Vec<&str> {
        self.assignments
            .get(item)
            .map(|a| {
                a.order
                    .iter()
                    .filter_map(|&p| self.catalog.get(p))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The first-assigned label of an item, if any.
    #[must_use]
    pub fn first_label(&self, item: &str) -> Option<&str> {
        self.assignments
            .get(item)
            .and_then(|a| a.order.first())
            .and_then(|&p| self.catalog.get(p))
    }

    /// Whether `label` is assigned to `item`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLabel` for labels outside the catalog.
    pub fn is_assigned(&self, item: &str, label: &str) -> Result<bool> {
        let pos = self.catalog.require(label)?;
        Ok(self.assignments.get(item).is_some_and(|a| a.present[pos]))
    }

    /// Whether the item has at least one label.
    #[must_use]
    pub fn is_labeled(&self, item: &str) -> bool {
        self.assignments.contains_key(item)
    }

    /// Number of items with at least one label.
    #[must_use]
    pub fn labeled_count(&self) -> usize {
        self.assignments.len()
    }

    /// Every catalog label with its assignment state for an item.
    ///
    /// This is what the presentation layer highlights.
    #[must_use]
    pub fn label_states(&self, item: &str) -> Vec<(&str, bool)> {
        let assignment = self.assignments.get(item);
        self.catalog
            .iter()
            .enumerate()
            .map(|(i, label)| (label, assignment.is_some_and(|a| a.present[i])))
            .collect()
    }

    /// Set an item's labels from a table row, bypassing toggle side effects.
    ///
    /// The resulting order is catalog order. An all-zero row clears the item.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRow` (carrying `row`) if the digit count does not
    /// match the catalog or a digit is not `0`/`1`, and `UnknownItem` if the
    /// item is not in the sequence.
    pub fn import_row<S: AsRef<str>>(&mut self, row: usize, item: &str, digits: &[S]) -> Result<()> {
        let one_hot = OneHot::parse(digits, self.catalog.len())
            .map_err(|reason| Error::MalformedRow { row, reason })?;
        self.require_item(item)?;

        if one_hot.count_ones() == 0 {
            self.assignments.remove(item);
            return Ok(());
        }

        let order = one_hot
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect();
        self.assignments.insert(
            item.to_string(),
            Assignment {
                order,
                present: one_hot.0,
            },
        );
        Ok(())
    }

    /// One-hot digits for an item, independent of insertion order.
    #[must_use]
    pub fn one_hot(&self, item: &str) -> OneHot {
        self.assignments.get(item).map_or_else(
            || OneHot(vec![false; self.catalog.len()]),
            |a| OneHot(a.present.clone()),
        )
    }

    /// Every item with its one-hot digits, in item-sequence order.
    ///
    /// The iterator borrows the store; call again to restart.
    pub fn export_rows(&self) -> impl Iterator<Item = (&str, OneHot)> + '_ {
        self.items
            .iter()
            .map(move |name| (name.as_str(), self.one_hot(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(labels: &[&str], items: &[&str]) -> AssignmentStore {
        let catalog = Catalog::new(labels.iter().map(|s| (*s).to_string()).collect()).unwrap();
        AssignmentStore::new(catalog, items.iter().map(|s| (*s).to_string()))
    }

    fn row_for(store: &AssignmentStore, item: &str) -> Option<String> {
        store
            .export_rows()
            .find(|(name, _)| *name == item)
            .map(|(_, digits)| digits.to_string())
    }

    #[test]
    fn test_toggle_sequence_scenario() {
        let mut s = store(&["cat", "dog"], &["a.jpg"]);

        assert_eq!(s.toggle("a.jpg", "dog").unwrap(), ToggleAction::Added);
        assert_eq!(s.labels_for("a.jpg"), vec!["dog"]);
        assert_eq!(row_for(&s, "a.jpg").unwrap(), "0,1");

        assert_eq!(s.toggle("a.jpg", "cat").unwrap(), ToggleAction::Added);
        assert_eq!(s.labels_for("a.jpg"), vec!["dog", "cat"]);
        assert_eq!(row_for(&s, "a.jpg").unwrap(), "1,1");

        assert_eq!(s.toggle("a.jpg", "dog").unwrap(), ToggleAction::Removed);
        assert_eq!(s.labels_for("a.jpg"), vec!["cat"]);
        assert_eq!(row_for(&s, "a.jpg").unwrap(), "1,0");

        assert_eq!(s.toggle("a.jpg", "cat").unwrap(), ToggleAction::Removed);
        assert!(s.labels_for("a.jpg").is_empty());
        assert!(!s.is_labeled("a.jpg"));
        assert_eq!(s.labeled_count(), 0);
    }

    #[test]
    fn test_toggle_twice_restores_prior_labels() {
        let mut s = store(&["cat", "dog", "bird"], &["a.jpg"]);
        s.toggle("a.jpg", "bird").unwrap();
        s.toggle("a.jpg", "cat").unwrap();
        let before: Vec<String> = s.labels_for("a.jpg").iter().map(|l| (*l).to_string()).collect();

        s.toggle("a.jpg", "dog").unwrap();
        s.toggle("a.jpg", "dog").unwrap();

        assert_eq!(s.labels_for("a.jpg"), before);
    }

    #[test]
    fn test_toggle_rejects_unknown_label_without_change() {
        let mut s = store(&["cat", "dog"], &["a.jpg"]);
        let err = s.toggle("a.jpg", "bird").unwrap_err();
        assert!(matches!(err, Error::InvalidLabel { .. }));
        assert!(!s.is_labeled("a.jpg"));
    }

    #[test]
    fn test_toggle_rejects_unknown_item() {
        let mut s = store(&["cat"], &["a.jpg"]);
        assert!(matches!(
            s.toggle("zzz.jpg", "cat"),
            Err(Error::UnknownItem { .. })
        ));
    }

    #[test]
    fn test_is_assigned() {
        let mut s = store(&["cat", "dog"], &["a.jpg"]);
        s.toggle("a.jpg", "dog").unwrap();
        assert!(s.is_assigned("a.jpg", "dog").unwrap());
        assert!(!s.is_assigned("a.jpg", "cat").unwrap());
        assert!(!s.is_assigned("missing.jpg", "cat").unwrap());
        assert!(s.is_assigned("a.jpg", "bird").is_err());
    }

    #[test]
    fn test_first_label_tracks_assignment_order() {
        let mut s = store(&["cat", "dog"], &["a.jpg"]);
        assert_eq!(s.first_label("a.jpg"), None);
        s.toggle("a.jpg", "dog").unwrap();
        s.toggle("a.jpg", "cat").unwrap();
        assert_eq!(s.first_label("a.jpg"), Some("dog"));
        s.toggle("a.jpg", "dog").unwrap();
        assert_eq!(s.first_label("a.jpg"), Some("cat"));
    }

    #[test]
    fn test_import_row_sets_catalog_order() {
        let mut s = store(&["cat", "dog", "bird"], &["b.jpg"]);
        s.import_row(2, "b.jpg", &["1", "0", "1"]).unwrap();
        assert_eq!(s.labels_for("b.jpg"), vec!["cat", "bird"]);
    }

    #[test]
    fn test_import_row_replaces_existing_labels() {
        let mut s = store(&["cat", "dog"], &["b.jpg"]);
        s.toggle("b.jpg", "dog").unwrap();
        s.import_row(2, "b.jpg", &["1", "0"]).unwrap();
        assert_eq!(s.labels_for("b.jpg"), vec!["cat"]);

        s.import_row(3, "b.jpg", &["0", "0"]).unwrap();
        assert!(!s.is_labeled("b.jpg"));
    }

    #[test]
    fn test_import_row_malformed() {
        let mut s = store(&["cat", "dog"], &["b.jpg"]);

        match s.import_row(4, "b.jpg", &["1"]) {
            Err(Error::MalformedRow { row, reason }) => {
                assert_eq!(row, 4);
                assert!(reason.contains("expected 2"));
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }

        assert!(matches!(
            s.import_row(5, "b.jpg", &["1", "2"]),
            Err(Error::MalformedRow { row: 5, .. })
        ));
        assert!(!s.is_labeled("b.jpg"));
    }

    #[test]
    fn test_one_hot_reimport_is_canonical() {
        let labels = ["a", "b", "c", "d"];
        let mut s = store(&labels, &["x.png"]);
        s.toggle("x.png", "d").unwrap();
        s.toggle("x.png", "a").unwrap();
        s.toggle("x.png", "c").unwrap();

        let (_, digits) = s.export_rows().next().unwrap();
        let digits: Vec<&str> = digits.digits().collect();

        let mut fresh = store(&labels, &["x.png"]);
        fresh.import_row(2, "x.png", digits.as_slice()).unwrap();
        assert_eq!(fresh.labels_for("x.png"), vec!["a", "c", "d"]);
        assert_eq!(fresh.one_hot("x.png"), s.one_hot("x.png"));
    }

    #[test]
    fn test_export_rows_follow_item_sequence_and_restart() {
        let mut s = store(&["cat", "dog"], &["c.jpg", "a.jpg", "b.jpg"]);
        s.toggle("b.jpg", "cat").unwrap();

        let names: Vec<&str> = s.export_rows().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["c.jpg", "a.jpg", "b.jpg"]);

        let again: Vec<String> = s.export_rows().map(|(_, d)| d.to_string()).collect();
        assert_eq!(again, vec!["0,0", "0,0", "1,0"]);
    }

    #[test]
    fn test_label_states_in_catalog_order() {
        let mut s = store(&["cat", "dog", "bird"], &["a.jpg"]);
        s.toggle("a.jpg", "bird").unwrap();
        s.toggle("a.jpg", "cat").unwrap();
        assert_eq!(
            s.label_states("a.jpg"),
            vec![("cat", true), ("dog", false), ("bird", true)]
        );
    }

    #[test]
    fn test_one_hot_parse_trims_whitespace() {
        let parsed = OneHot::parse(&[" 1", "0\r"], 2).unwrap();
        assert_eq!(parsed.as_slice(), &[true, false]);
        assert!(OneHot::parse(&["yes", "0"], 2).is_err());
    }
}
