use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use thiserror::Error;

use super::model::{CellValue, Column, ColumnKind, Dataset};

/// Extensions accepted by [`load_bytes`], for file dialogs.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "xlsb", "ods", "csv"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file type: .{0}")]
    UnsupportedFormat(String),
    #[error("cannot read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("cannot read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook has no worksheets")]
    NoSheet,
    #[error("sheet has no header row")]
    Empty,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from uploaded bytes.  Dispatch by the file name's extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet only
/// * `.csv` – comma separated, header row (re-import of exported results)
pub fn load_bytes(file_name: &str, bytes: &[u8]) -> Result<Dataset, LoadError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(bytes)?,
        "csv" => load_csv(bytes)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    log::info!(
        "Loaded {file_name}: {} rows, {} columns",
        dataset.len(),
        dataset.columns().len()
    );
    for col in dataset.columns() {
        log::debug!("column {:?} inferred as {:?}", col.name, col.kind);
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoSheet)??;

    let mut rows = range.rows();
    let header = rows.next().ok_or(LoadError::Empty)?;
    let headers: Vec<String> = header
        .iter()
        .map(|c| c.as_string().unwrap_or_else(|| c.to_string()))
        .collect();

    let body: Vec<Vec<CellValue>> = rows
        .map(|r| r.iter().map(workbook_cell).collect())
        .collect();

    Ok(build_dataset(headers, body, true))
}

/// Convert one calamine cell. Error cells (`#N/A`, `#DIV/0!`) read as null.
fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) => CellValue::parse_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut body = Vec::new();
    for result in reader.records() {
        let record = result?;
        body.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(build_dataset(headers, body, false))
}

/// A cell is typed only when the typed value prints back as exactly the same
/// text, so IDs like `001` and words like `INF` stay text.
fn guess_cell_type(s: &str) -> CellValue {
    if s.trim().is_empty() {
        return CellValue::Null;
    }
    let typed = if let Ok(i) = s.parse::<i64>() {
        CellValue::Integer(i)
    } else if let Some(f) = s.parse::<f64>().ok().filter(|f| f.is_finite()) {
        CellValue::Float(f)
    } else {
        match s {
            "True" => CellValue::Bool(true),
            "False" => CellValue::Bool(false),
            _ => return CellValue::Text(s.to_string()),
        }
    };
    if typed.to_string() == s {
        typed
    } else {
        CellValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Shared: header cleanup + column type inference
// ---------------------------------------------------------------------------

/// `whole_floats_as_int`: workbooks store every number as a float, so a
/// column of whole floats is really an integer column.
fn build_dataset(headers: Vec<String>, body: Vec<Vec<CellValue>>, whole_floats_as_int: bool) -> Dataset {
    let body: Vec<Vec<CellValue>> = body
        .into_iter()
        .filter(|row| row.iter().any(|c| !c.is_null()))
        .collect();

    let n_cols = body
        .iter()
        .map(|r| r.len())
        .max()
        .unwrap_or(0)
        .max(headers.len());
    let names = column_names(&headers, n_cols);

    let columns = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<CellValue> = body
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(CellValue::Null))
                .collect();
            infer_column(name, cells, whole_floats_as_int)
        })
        .collect();

    Dataset::from_columns(columns)
}

/// Blank headers become `Unnamed: {idx}`; repeats get a `.1`, `.2`, … suffix.
fn column_names(headers: &[String], n_cols: usize) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    (0..n_cols)
        .map(|idx| {
            let raw = headers.get(idx).map(|h| h.trim()).unwrap_or("");
            let base = if raw.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                raw.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

fn infer_column(name: String, cells: Vec<CellValue>, whole_floats_as_int: bool) -> Column {
    let mut has_text = false;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    let mut has_date = false;
    for cell in &cells {
        match cell {
            CellValue::Text(_) => has_text = true,
            CellValue::Float(_) => has_float = true,
            CellValue::Integer(_) => has_int = true,
            CellValue::Bool(_) => has_bool = true,
            CellValue::Date(_) => has_date = true,
            CellValue::Null => {}
        }
    }
    let has_number = has_int || has_float;

    let kind = if has_text {
        let all_dates = !has_number
            && !has_bool
            && cells.iter().all(|c| match c {
                CellValue::Text(s) => CellValue::parse_datetime(s).is_some(),
                _ => true,
            });
        if all_dates {
            ColumnKind::Date
        } else {
            ColumnKind::Text
        }
    } else if has_date {
        if has_number || has_bool {
            ColumnKind::Text
        } else {
            ColumnKind::Date
        }
    } else if has_bool {
        if has_number {
            ColumnKind::Text
        } else {
            ColumnKind::Boolean
        }
    } else if has_float {
        let all_whole = cells.iter().all(|c| match c {
            CellValue::Float(f) => fits_i64(*f) && f.fract() == 0.0,
            _ => true,
        });
        if whole_floats_as_int && all_whole {
            ColumnKind::Integer
        } else {
            ColumnKind::Float
        }
    } else if has_int {
        ColumnKind::Integer
    } else {
        ColumnKind::Empty
    };

    let values = cells
        .into_iter()
        .map(|cell| coerce(cell, kind))
        .collect();
    Column { name, kind, values }
}

/// `i64::MAX as f64` rounds up to 2^63, which is already out of range.
fn fits_i64(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

/// Normalise a cell to its column's kind.
fn coerce(cell: CellValue, kind: ColumnKind) -> CellValue {
    match (kind, cell) {
        (_, CellValue::Null) => CellValue::Null,
        (ColumnKind::Integer, CellValue::Float(f)) if fits_i64(f) => CellValue::Integer(f as i64),
        (ColumnKind::Float, CellValue::Integer(i)) => CellValue::Float(i as f64),
        (ColumnKind::Date, CellValue::Text(s)) => CellValue::parse_datetime(&s)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Text(s)),
        (ColumnKind::Text, CellValue::Text(s)) => CellValue::Text(s),
        (ColumnKind::Text, other) => CellValue::Text(other.to_string()),
        (_, other) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn routes_xlsx() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["Km", "Operadora", "Rota", "", "Jan"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        let rows = [
            (80.3, "OMEGA NET", "CIDADE 6 - CIDADE 1", 0.0),
            (127.6, "ALFA TELECOM", "CIDADE 1 - CIDADE 2", 2.0),
            (26.0, "ALFA TELECOM", "CIDADE 2 - CIDADE 3", 1.0),
        ];
        for (i, (km, op, rota, jan)) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_number(r, 0, *km).unwrap();
            sheet.write_string(r, 1, *op).unwrap();
            sheet.write_string(r, 2, *rota).unwrap();
            sheet.write_number(r, 4, *jan).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn loads_first_sheet_with_inferred_kinds() {
        let ds = load_bytes("rotas.xlsx", &routes_xlsx()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.column_names(),
            vec!["Km", "Operadora", "Rota", "Unnamed: 3", "Jan"]
        );
        assert_eq!(ds.column("Km").unwrap().kind, ColumnKind::Float);
        assert_eq!(ds.column("Operadora").unwrap().kind, ColumnKind::Text);
        assert_eq!(ds.column("Unnamed: 3").unwrap().kind, ColumnKind::Empty);
        let jan = ds.column("Jan").unwrap();
        assert_eq!(jan.kind, ColumnKind::Integer);
        assert_eq!(jan.values[1], CellValue::Integer(2));
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert!(load_bytes("ROTAS.XLSX", &routes_xlsx()).is_ok());
    }

    #[test]
    fn rejects_unsupported_extension() {
        let err = load_bytes("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn rejects_malformed_workbook() {
        let err = load_bytes("broken.xlsx", b"definitely not a zip").unwrap_err();
        assert!(matches!(err, LoadError::Workbook(_)));
    }

    #[test]
    fn csv_inference() {
        let csv = "Operadora,Km,Ativo,Data,Codigo\n\
                   A,10,True,2024-01-05,7\n\
                   B,20.5,False,2024-02-10,X9\n\
                   ,,,,\n\
                   A,,True,2024-03-01,12\n";
        let ds = load_bytes("export.csv", csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        let km = ds.column("Km").unwrap();
        assert_eq!(km.kind, ColumnKind::Float);
        assert_eq!(km.values[0], CellValue::Float(10.0));
        assert_eq!(km.values[2], CellValue::Null);
        assert_eq!(ds.column("Ativo").unwrap().kind, ColumnKind::Boolean);
        assert_eq!(ds.column("Data").unwrap().kind, ColumnKind::Date);
        let codigo = ds.column("Codigo").unwrap();
        assert_eq!(codigo.kind, ColumnKind::Text);
        assert_eq!(codigo.values[0], CellValue::Text("7".into()));
    }

    #[test]
    fn csv_keeps_text_that_only_looks_numeric() {
        let csv = "Circuito,Rota,Km,Ativo\n\
                   001,INF,1e3,true\n\
                   002,NaN,+5,TRUE\n\
                   010,CIDADE 3,7,False\n";
        let ds = load_bytes("resultados_filtrados.csv", csv.as_bytes()).unwrap();
        let text = |name: &str| -> Vec<CellValue> {
            let col = ds.column(name).unwrap();
            assert_eq!(col.kind, ColumnKind::Text, "column {name}");
            col.values.clone()
        };
        assert_eq!(
            text("Circuito"),
            vec![
                CellValue::Text("001".into()),
                CellValue::Text("002".into()),
                CellValue::Text("010".into()),
            ]
        );
        assert_eq!(
            text("Rota"),
            vec![
                CellValue::Text("INF".into()),
                CellValue::Text("NaN".into()),
                CellValue::Text("CIDADE 3".into()),
            ]
        );
        assert_eq!(text("Km")[0], CellValue::Text("1e3".into()));
        assert_eq!(text("Ativo")[1], CellValue::Text("TRUE".into()));
    }

    #[test]
    fn non_finite_floats_stay_text() {
        for raw in ["inf", "INF", "-inf", "NaN", "nan", "infinity"] {
            assert_eq!(guess_cell_type(raw), CellValue::Text(raw.into()), "{raw}");
        }
    }

    #[test]
    fn whitespace_only_csv_cells_are_null() {
        let csv = "Operadora,Km\n\
                   A,  \n\
                   \t ,   \n\
                   B,3\n";
        let ds = load_bytes("rotas.csv", csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        let km = ds.column("Km").unwrap();
        assert_eq!(km.kind, ColumnKind::Integer);
        assert_eq!(km.values, vec![CellValue::Null, CellValue::Integer(3)]);
    }

    #[test]
    fn whole_floats_beyond_i64_keep_float_column() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Km").unwrap();
        sheet.write_number(1, 0, 1e20).unwrap();
        sheet.write_number(2, 0, 1.0).unwrap();
        sheet.write_number(3, 0, 9_223_372_036_854_775_808.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let ds = load_bytes("rotas.xlsx", &bytes).unwrap();
        let km = ds.column("Km").unwrap();
        assert_eq!(km.kind, ColumnKind::Float);
        assert_eq!(
            km.values,
            vec![
                CellValue::Float(1e20),
                CellValue::Float(1.0),
                CellValue::Float(9_223_372_036_854_775_808.0),
            ]
        );
    }

    #[test]
    fn out_of_range_float_is_not_clamped() {
        assert_eq!(coerce(CellValue::Float(1e20), ColumnKind::Integer), CellValue::Float(1e20));
        assert_eq!(coerce(CellValue::Float(42.0), ColumnKind::Integer), CellValue::Integer(42));
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let names = column_names(&["Km".into(), "Km".into(), "".into(), "Km".into()], 5);
        assert_eq!(names, vec!["Km", "Km.1", "Unnamed: 2", "Km.2", "Unnamed: 4"]);
    }
}
