use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the uploaded sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Kept in `BTreeSet`s downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDateTime),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

/// Display form used for tables, search matching and CSV export.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{v:.1}")
            }
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Date(d) if d.time() == NaiveTime::MIN => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for charting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Parse an ISO-style date or datetime string.
    pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    }
}

// ---------------------------------------------------------------------------
// Column – a named, typed sequence of cells
// ---------------------------------------------------------------------------

/// Column type inferred once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Date,
    Text,
    /// Every cell is null.
    Empty,
}

impl ColumnKind {
    /// Numeric columns are eligible as chart Y axes (and scatter X axes).
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded sheet
// ---------------------------------------------------------------------------

/// The full parsed sheet: ordered columns of equal length.
/// Never mutated after load; filters and search produce [`View`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
    by_name: HashMap<String, usize>,
}

impl Dataset {
    /// Build a dataset, padding short columns with nulls.
    pub fn from_columns(mut columns: Vec<Column>) -> Self {
        let n_rows = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for col in &mut columns {
            col.values.resize(n_rows, CellValue::Null);
        }
        let by_name = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Dataset {
            columns,
            n_rows,
            by_name,
        }
    }

    /// The record layout shown before any file is opened.
    pub fn example() -> Self {
        let text = |vals: &[&str]| -> Vec<CellValue> {
            vals.iter().map(|v| CellValue::Text(v.to_string())).collect()
        };
        let ints = |vals: &[i64]| -> Vec<CellValue> {
            vals.iter().map(|v| CellValue::Integer(*v)).collect()
        };
        Dataset::from_columns(vec![
            Column {
                name: "Km".into(),
                kind: ColumnKind::Float,
                values: [80.3, 127.6, 26.0, 238.3, 208.9]
                    .iter()
                    .map(|v| CellValue::Float(*v))
                    .collect(),
            },
            Column {
                name: "Operadora".into(),
                kind: ColumnKind::Text,
                values: text(&[
                    "OMEGA NET",
                    "ALFA TELECOM",
                    "ALFA TELECOM",
                    "BETA FIBRA",
                    "OMEGA NET",
                ]),
            },
            Column {
                name: "Rota".into(),
                kind: ColumnKind::Text,
                values: text(&[
                    "CIDADE 6 - CIDADE 1",
                    "CIDADE 1 - CIDADE 2",
                    "CIDADE 2 - CIDADE 3",
                    "CIDADE 3 - CIDADE 4",
                    "CIDADE 4 - CIDADE 5",
                ]),
            },
            Column {
                name: "Instalacao".into(),
                kind: ColumnKind::Text,
                values: text(&[
                    "RODOVIÁRIO (ENTERRADO)",
                    "RODOVIÁRIO (AÉREO)",
                    "RODOVIÁRIO (AÉREO)",
                    "FERROVIÁRIO",
                    "FERROVIÁRIO",
                ]),
            },
            Column {
                name: "Jan".into(),
                kind: ColumnKind::Integer,
                values: ints(&[0, 0, 0, 1, 0]),
            },
            Column {
                name: "Fev".into(),
                kind: ColumnKind::Integer,
                values: ints(&[0, 0, 0, 0, 1]),
            },
        ])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column-by-name lookup.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.by_name.get(name).map(|&i| &self.columns[i])
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Sorted distinct non-null values of `column` among the rows of `view`.
    pub fn sorted_distinct(&self, column: &str, view: &View) -> BTreeSet<CellValue> {
        let Some(col) = self.column(column) else {
            return BTreeSet::new();
        };
        view.iter()
            .map(|row| &col.values[row])
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// View – a row subset of a Dataset
// ---------------------------------------------------------------------------

/// Ascending, duplicate-free row indices into a [`Dataset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    rows: Vec<usize>,
}

impl View {
    /// Every row of the dataset.
    pub fn all(dataset: &Dataset) -> Self {
        View {
            rows: (0..dataset.len()).collect(),
        }
    }

    /// Keep the rows of `self` for which `keep` holds.
    pub fn retain(&self, mut keep: impl FnMut(usize) -> bool) -> Self {
        View {
            rows: self.rows.iter().copied().filter(|&r| keep(r)).collect(),
        }
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
