use thiserror::Error;

/// A request the engine could not act on. Shown to the user as a notice;
/// whatever was displayed before stays on screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncompleteRequest {
    #[error("type a search term")]
    MissingSearchTerm,
    #[error("select at least one column to search")]
    MissingSearchColumns,
    #[error("no numeric columns available for charting")]
    NoNumericColumns,
    #[error("select both chart axes")]
    MissingAxis,
    #[error("column {0:?} does not exist")]
    UnknownColumn(String),
    #[error("column {0:?} is not numeric and cannot be used as Y")]
    NonNumericY(String),
    #[error("column {column:?} cannot be the X axis of a {chart} chart")]
    IneligibleX { column: String, chart: &'static str },
}
