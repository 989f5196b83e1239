use super::model::{Column, Dataset, View};
use super::notice::IncompleteRequest;

/// Free-text search over a chosen set of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSpec {
    pub columns: Vec<String>,
    pub term: String,
}

/// Rows of `view` where at least one chosen column contains `spec.term`,
/// ignoring case. Each matching row appears once, in dataset order.
///
/// An empty term or column selection is reported as [`IncompleteRequest`]
/// rather than returning the whole view. Chosen columns missing from the
/// dataset are skipped.
pub fn search(dataset: &Dataset, view: &View, spec: &SearchSpec) -> Result<View, IncompleteRequest> {
    if spec.term.is_empty() {
        return Err(IncompleteRequest::MissingSearchTerm);
    }
    let columns: Vec<&Column> = spec
        .columns
        .iter()
        .filter_map(|name| dataset.column(name))
        .collect();
    if columns.is_empty() {
        return Err(IncompleteRequest::MissingSearchColumns);
    }

    let needle = spec.term.to_lowercase();
    let result = view.retain(|row| {
        columns.iter().any(|col| {
            let cell = &col.values[row];
            !cell.is_null() && cell.to_string().to_lowercase().contains(&needle)
        })
    });
    log::info!(
        "search {:?} over {} columns: {} of {} rows",
        spec.term,
        columns.len(),
        result.len(),
        view.len()
    );
    Ok(result)
}
