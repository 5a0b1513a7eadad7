//! Field-driven, stable, tri-state sorting.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    /// Upstream order is kept as is
    #[default]
    Unordered,
    Ascending,
    Descending,
}

impl SortDirection {
    /// unordered -> ascending -> descending -> unordered
    pub fn next(self) -> Self {
        match self {
            Self::Unordered => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Unordered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState<F> {
    pub field: Option<F>,
    pub direction: SortDirection,
}

impl<F> Default for SortState<F> {
    fn default() -> Self {
        Self {
            field: None,
            direction: SortDirection::Unordered,
        }
    }
}

impl<F: Copy + PartialEq> SortState<F> {
    /// Header click. The same field advances its cycle; a different field
    /// starts over at ascending.
    pub fn select(&mut self, field: F) {
        if self.field == Some(field) {
            self.direction = self.direction.next();
        } else {
            self.field = Some(field);
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn set(&mut self, field: F, direction: SortDirection) {
        self.field = Some(field);
        self.direction = direction;
    }
}

/// Comparable projection of one field. Text compares case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Missing,
    Text(String),
    Int(i64),
    Date(NaiveDate),
}

impl SortKey {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_lowercase())
    }
}

pub trait Sortable<F> {
    fn sort_key(&self, field: F) -> SortKey;
}

/// Stable sort on `field`. Descending flips the comparison, not the output,
/// so equal keys keep their input order either way.
pub fn sort<T: Sortable<F>, F: Copy>(mut records: Vec<T>, field: F, direction: SortDirection) -> Vec<T> {
    let flip = match direction {
        SortDirection::Unordered => return records,
        SortDirection::Ascending => false,
        SortDirection::Descending => true,
    };
    records.sort_by(|a, b| {
        let ord: Ordering = a.sort_key(field).cmp(&b.sort_key(field));
        if flip { ord.reverse() } else { ord }
    });
    records
}

/// Applies `state`, leaving the records untouched when nothing is selected.
pub fn sort_by_state<T: Sortable<F>, F: Copy>(records: Vec<T>, state: &SortState<F>) -> Vec<T> {
    match state.field {
        Some(field) => sort(records, field, state.direction),
        None => records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(&'static str, i64);

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Col {
        Name,
        Score,
    }

    impl Sortable<Col> for Row {
        fn sort_key(&self, field: Col) -> SortKey {
            match field {
                Col::Name => SortKey::text(self.0),
                Col::Score => SortKey::Int(self.1),
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![Row("beta", 2), Row("Alpha", 1), Row("gamma", 2), Row("alpha", 3)]
    }

    #[test]
    fn names_compare_case_insensitively_and_stably() {
        let sorted = sort(rows(), Col::Name, SortDirection::Ascending);
        let names: Vec<_> = sorted.iter().map(|r| r.0).collect();
        assert_eq!(names, vec!["Alpha", "alpha", "beta", "gamma"]);

        let sorted = sort(rows(), Col::Name, SortDirection::Descending);
        let names: Vec<_> = sorted.iter().map(|r| r.0).collect();
        assert_eq!(names, vec!["gamma", "beta", "Alpha", "alpha"]);
    }

    #[test]
    fn unordered_keeps_input() {
        assert_eq!(sort(rows(), Col::Score, SortDirection::Unordered), rows());
    }

    #[test]
    fn select_cycles_and_resets_on_field_change() {
        let mut state = SortState::default();
        state.select(Col::Name);
        assert_eq!(state.direction, SortDirection::Ascending);
        state.select(Col::Name);
        assert_eq!(state.direction, SortDirection::Descending);

        state.select(Col::Score);
        assert_eq!(state.field, Some(Col::Score));
        assert_eq!(state.direction, SortDirection::Ascending);

        state.select(Col::Score);
        state.select(Col::Score);
        assert_eq!(state.direction, SortDirection::Unordered);
        assert_eq!(sort_by_state(rows(), &state), rows());
    }
}
