use std::collections::{BTreeSet, HashSet};

use super::model::{CellValue, Dataset, View};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Equality selection for the group column; `All` means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(CellValue),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Keep rows whose value equals the selection.
    Equals { column: String, selection: Selection },
    /// Keep rows whose value is in `values`. An empty set keeps every row.
    OneOf {
        column: String,
        values: BTreeSet<CellValue>,
    },
}

/// Ordered chain of predicates, each narrowing the previous result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub predicates: Vec<Predicate>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, column: impl Into<String>, selection: Selection) -> Self {
        self.predicates.push(Predicate::Equals {
            column: column.into(),
            selection,
        });
        self
    }

    pub fn one_of(mut self, column: impl Into<String>, values: BTreeSet<CellValue>) -> Self {
        self.predicates.push(Predicate::OneOf {
            column: column.into(),
            values,
        });
        self
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Return the rows of `view` that pass every predicate of `spec`.
///
/// A predicate is a passthrough when:
/// * its column does not exist in the dataset
/// * it is `Equals` with [`Selection::All`]
/// * it is `OneOf` with an empty value set (nothing picked yet)
pub fn apply(dataset: &Dataset, view: &View, spec: &FilterSpec) -> View {
    let mut current = view.clone();
    for predicate in &spec.predicates {
        current = apply_one(dataset, &current, predicate);
    }
    log::debug!(
        "filter: {} predicates, {} -> {} rows",
        spec.predicates.len(),
        view.len(),
        current.len()
    );
    current
}

fn apply_one(dataset: &Dataset, view: &View, predicate: &Predicate) -> View {
    let column_name = match predicate {
        Predicate::Equals { column, .. } | Predicate::OneOf { column, .. } => column,
    };
    let Some(column) = dataset.column(column_name) else {
        log::warn!("filter on unknown column {column_name:?} ignored");
        return view.clone();
    };

    match predicate {
        Predicate::Equals {
            selection: Selection::All,
            ..
        } => view.clone(),
        Predicate::Equals {
            selection: Selection::Only(wanted),
            ..
        } => view.retain(|row| !wanted.is_null() && column.values[row] == *wanted),
        Predicate::OneOf { values, .. } if values.is_empty() => view.clone(),
        Predicate::OneOf { values, .. } => view.retain(|row| {
            let cell = &column.values[row];
            !cell.is_null() && values.contains(cell)
        }),
    }
}

// ---------------------------------------------------------------------------
// Selector options
// ---------------------------------------------------------------------------

/// Options for the group selector: sorted distinct non-null values.
pub fn group_options(dataset: &Dataset, column: &str) -> Vec<CellValue> {
    dataset
        .sorted_distinct(column, &View::all(dataset))
        .into_iter()
        .collect()
}

/// Distinct non-null values of `column` within `view`, in first-seen order.
pub fn distinct_values(dataset: &Dataset, view: &View, column: &str) -> Vec<CellValue> {
    let Some(col) = dataset.column(column) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    view.iter()
        .map(|row| &col.values[row])
        .filter(|v| !v.is_null() && seen.insert(*v))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind};

    fn routes() -> Dataset {
        Dataset::from_columns(vec![
            Column {
                name: "Operadora".into(),
                kind: ColumnKind::Text,
                values: ["A", "B", "A"]
                    .iter()
                    .map(|s| CellValue::Text(s.to_string()))
                    .collect(),
            },
            Column {
                name: "Km".into(),
                kind: ColumnKind::Integer,
                values: vec![
                    CellValue::Integer(10),
                    CellValue::Integer(20),
                    CellValue::Integer(30),
                ],
            },
        ])
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn empty_inclusion_set_is_passthrough() {
        let ds = routes();
        let all = View::all(&ds);
        let spec = FilterSpec::new().one_of("Operadora", BTreeSet::new());
        assert_eq!(apply(&ds, &all, &spec), all);
    }

    #[test]
    fn inclusion_keeps_members() {
        let ds = routes();
        let spec = FilterSpec::new().one_of("Operadora", BTreeSet::from([text("A")]));
        let view = apply(&ds, &View::all(&ds), &spec);
        assert_eq!(view.rows(), &[0, 2]);
        let km: f64 = view
            .iter()
            .filter_map(|r| ds.column("Km").unwrap().values[r].as_f64())
            .sum();
        assert_eq!(km, 40.0);
    }

    #[test]
    fn all_sentinel_is_noop() {
        let ds = routes();
        let spec = FilterSpec::new().equals("Operadora", Selection::All);
        assert_eq!(apply(&ds, &View::all(&ds), &spec).len(), 3);
    }

    #[test]
    fn predicates_chain() {
        let ds = routes();
        let spec = FilterSpec::new()
            .equals("Operadora", Selection::Only(text("A")))
            .one_of("Km", BTreeSet::from([CellValue::Integer(30), CellValue::Integer(20)]));
        assert_eq!(apply(&ds, &View::all(&ds), &spec).rows(), &[2]);
    }

    #[test]
    fn unknown_column_is_ignored() {
        let ds = routes();
        let spec = FilterSpec::new().equals("Localidade", Selection::Only(text("SP")));
        assert_eq!(apply(&ds, &View::all(&ds), &spec).len(), 3);
    }

    #[test]
    fn options() {
        let ds = routes();
        assert_eq!(group_options(&ds, "Operadora"), vec![text("A"), text("B")]);
        let view = View::all(&ds).retain(|r| r > 0);
        assert_eq!(
            distinct_values(&ds, &view, "Operadora"),
            vec![text("B"), text("A")]
        );
    }
}
