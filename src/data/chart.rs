//! Descriptive statistics and chart data preparation over a filtered view.

use std::collections::BTreeMap;

use super::model::{CellValue, Column, Dataset, View};
use super::notice::IncompleteRequest;

/// Descriptive statistics of the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub row_count: usize,
}

pub fn summarize(view: &View) -> Summary {
    Summary {
        row_count: view.len(),
    }
}

/// Dataset columns split by chart-axis eligibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnClasses {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnClasses {
    pub fn of(dataset: &Dataset) -> Self {
        let (numeric, categorical): (Vec<&Column>, Vec<&Column>) =
            dataset.columns().iter().partition(|c| c.kind.is_numeric());
        ColumnClasses {
            numeric: numeric.into_iter().map(|c| c.name.clone()).collect(),
            categorical: categorical.into_iter().map(|c| c.name.clone()).collect(),
        }
    }

    /// Columns allowed on the X axis of `kind`.
    ///
    /// Category charts fall back to every column when the sheet has no
    /// categorical column at all.
    pub fn x_candidates(&self, kind: ChartKind) -> Vec<String> {
        if kind.numeric_x() || self.categorical.is_empty() {
            self.numeric.clone()
        } else {
            self.categorical.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Scatter,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Pie,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar",
            ChartKind::Line => "Line",
            ChartKind::Scatter => "Scatter",
            ChartKind::Pie => "Pie",
        }
    }

    /// Scatter plots numbers against numbers; the others plot categories.
    pub fn numeric_x(self) -> bool {
        matches!(self, ChartKind::Scatter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x: String,
    pub y: String,
}

impl ChartSpec {
    pub fn title(&self) -> String {
        match self.kind {
            ChartKind::Bar | ChartKind::Line => format!("{} by {}", self.y, self.x),
            ChartKind::Scatter => format!("{} vs {}", self.y, self.x),
            ChartKind::Pie => format!("Distribution of {} by {}", self.y, self.x),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// Bar / line: one point per row, categories may repeat.
    Categorical {
        kind: ChartKind,
        points: Vec<(String, f64)>,
    },
    Scatter { points: Vec<[f64; 2]> },
    /// One slice per distinct category, sorted by category.
    Pie { slices: Vec<(String, f64)> },
}

/// Build the data for `spec` from the rows of `view`.
///
/// * bar/line: rows with a null Y are dropped
/// * scatter: rows where either axis is null are dropped
/// * pie: rows with a null X are dropped, null Y counts as zero
pub fn prepare(dataset: &Dataset, view: &View, spec: &ChartSpec) -> Result<ChartData, IncompleteRequest> {
    let classes = ColumnClasses::of(dataset);
    if classes.numeric.is_empty() {
        return Err(IncompleteRequest::NoNumericColumns);
    }
    let x = dataset
        .column(&spec.x)
        .ok_or_else(|| IncompleteRequest::UnknownColumn(spec.x.clone()))?;
    let y = dataset
        .column(&spec.y)
        .ok_or_else(|| IncompleteRequest::UnknownColumn(spec.y.clone()))?;
    if !y.kind.is_numeric() {
        return Err(IncompleteRequest::NonNumericY(y.name.clone()));
    }
    if !classes.x_candidates(spec.kind).contains(&x.name) {
        return Err(IncompleteRequest::IneligibleX {
            column: x.name.clone(),
            chart: spec.kind.label(),
        });
    }

    let data = match spec.kind {
        ChartKind::Bar | ChartKind::Line => ChartData::Categorical {
            kind: spec.kind,
            points: view
                .iter()
                .filter_map(|row| Some((x.values[row].to_string(), y.values[row].as_f64()?)))
                .collect(),
        },
        ChartKind::Scatter => ChartData::Scatter {
            points: view
                .iter()
                .filter_map(|row| Some([x.values[row].as_f64()?, y.values[row].as_f64()?]))
                .collect(),
        },
        ChartKind::Pie => ChartData::Pie {
            slices: pie_slices(x, y, view),
        },
    };
    log::debug!("chart {:?} prepared from {} rows", spec.kind, view.len());
    Ok(data)
}

fn pie_slices(x: &Column, y: &Column, view: &View) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<&CellValue, f64> = BTreeMap::new();
    for row in view.iter() {
        let key = &x.values[row];
        if key.is_null() {
            continue;
        }
        *groups.entry(key).or_default() += y.values[row].as_f64().unwrap_or(0.0);
    }
    groups
        .into_iter()
        .map(|(key, sum)| (key.to_string(), sum))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{self, FilterSpec};
    use crate::data::model::ColumnKind;
    use std::collections::BTreeSet;

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
            Column {
                name: "Custo".into(),
                kind: ColumnKind::Float,
                values: vec![CellValue::Float(1.5), CellValue::Null, CellValue::Float(2.5)],
            },
        ])
    }

    fn chart(kind: ChartKind, x: &str, y: &str) -> ChartSpec {
        ChartSpec {
            kind,
            x: x.into(),
            y: y.into(),
        }
    }

    #[test]
    fn classifies_columns() {
        let classes = ColumnClasses::of(&routes());
        assert_eq!(classes.numeric, vec!["Km", "Custo"]);
        assert_eq!(classes.categorical, vec!["Operadora"]);
        assert_eq!(classes.x_candidates(ChartKind::Scatter), vec!["Km", "Custo"]);
        assert_eq!(classes.x_candidates(ChartKind::Pie), vec!["Operadora"]);
    }

    #[test]
    fn category_charts_fall_back_to_all_columns() {
        let ds = Dataset::from_columns(vec![Column {
            name: "Km".into(),
            kind: ColumnKind::Integer,
            values: vec![CellValue::Integer(1)],
        }]);
        let classes = ColumnClasses::of(&ds);
        assert_eq!(classes.x_candidates(ChartKind::Bar), vec!["Km"]);
        assert!(prepare(&ds, &View::all(&ds), &chart(ChartKind::Bar, "Km", "Km")).is_ok());
    }

    #[test]
    fn pie_groups_sorted_by_category() {
        let ds = routes();
        let data = prepare(&ds, &View::all(&ds), &chart(ChartKind::Pie, "Operadora", "Km")).unwrap();
        assert_eq!(
            data,
            ChartData::Pie {
                slices: vec![("A".into(), 40.0), ("B".into(), 20.0)]
            }
        );
    }

    #[test]
    fn pie_conserves_total() {
        let ds = routes();
        let view = View::all(&ds);
        let ChartData::Pie { slices } =
            prepare(&ds, &view, &chart(ChartKind::Pie, "Operadora", "Custo")).unwrap()
        else {
            panic!("expected pie data");
        };
        let total: f64 = slices.iter().map(|(_, v)| v).sum();
        let expected: f64 = view
            .iter()
            .filter_map(|r| ds.column("Custo").unwrap().values[r].as_f64())
            .sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn operadora_scenario() {
        let ds = routes();
        let spec = FilterSpec::new().one_of(
            "Operadora",
            BTreeSet::from([CellValue::Text("A".into())]),
        );
        let view = filter::apply(&ds, &View::all(&ds), &spec);
        assert_eq!(summarize(&view).row_count, 2);
        let ChartData::Pie { slices } =
            prepare(&ds, &view, &chart(ChartKind::Pie, "Operadora", "Km")).unwrap()
        else {
            panic!("expected pie data");
        };
        assert_eq!(slices, vec![("A".to_string(), 40.0)]);
    }

    #[test]
    fn bar_passes_duplicates_through() {
        let ds = routes();
        let data = prepare(&ds, &View::all(&ds), &chart(ChartKind::Bar, "Operadora", "Custo")).unwrap();
        assert_eq!(
            data,
            ChartData::Categorical {
                kind: ChartKind::Bar,
                points: vec![("A".into(), 1.5), ("A".into(), 2.5)]
            }
        );
    }

    #[test]
    fn scatter_pairs() {
        let ds = routes();
        let data = prepare(&ds, &View::all(&ds), &chart(ChartKind::Scatter, "Km", "Custo")).unwrap();
        assert_eq!(
            data,
            ChartData::Scatter {
                points: vec![[10.0, 1.5], [30.0, 2.5]]
            }
        );
    }

    #[test]
    fn rejects_bad_axes() {
        let ds = routes();
        let all = View::all(&ds);
        assert_eq!(
            prepare(&ds, &all, &chart(ChartKind::Bar, "Operadora", "Operadora")).unwrap_err(),
            IncompleteRequest::NonNumericY("Operadora".into())
        );
        assert!(matches!(
            prepare(&ds, &all, &chart(ChartKind::Scatter, "Operadora", "Km")).unwrap_err(),
            IncompleteRequest::IneligibleX { .. }
        ));
        assert_eq!(
            prepare(&ds, &all, &chart(ChartKind::Line, "Rota", "Km")).unwrap_err(),
            IncompleteRequest::UnknownColumn("Rota".into())
        );
    }

    #[test]
    fn no_numeric_columns_is_incomplete() {
        let ds = Dataset::from_columns(vec![Column {
            name: "Operadora".into(),
            kind: ColumnKind::Text,
            values: vec![CellValue::Text("A".into())],
        }]);
        assert_eq!(
            prepare(&ds, &View::all(&ds), &chart(ChartKind::Pie, "Operadora", "Km")).unwrap_err(),
            IncompleteRequest::NoNumericColumns
        );
    }

    #[test]
    fn titles() {
        assert_eq!(chart(ChartKind::Bar, "Operadora", "Km").title(), "Km by Operadora");
        assert_eq!(chart(ChartKind::Scatter, "Jan", "Km").title(), "Km vs Jan");
    }
}
