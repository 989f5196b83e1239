use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::data::cache::DatasetCache;
use crate::data::chart::{self, ChartData, ChartKind, ChartSpec, ColumnClasses};
use crate::data::filter::{self, FilterSpec, Selection};
use crate::data::model::{CellValue, Dataset, View};
use crate::data::notice::IncompleteRequest;
use crate::data::search::{self, SearchSpec};

// ---------------------------------------------------------------------------
// Per-section form state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SearchForm {
    pub columns: Vec<String>,
    pub term: String,
    /// Last successful search and the term it ran with.
    pub results: Option<(String, View)>,
    pub notice: Option<IncompleteRequest>,
}

#[derive(Debug, Default)]
pub struct IncludeForm {
    pub column: Option<String>,
    pub selected: BTreeSet<CellValue>,
    /// Rows passing the inclusion filter (all rows while nothing is selected).
    pub view: View,
}

#[derive(Debug, Default)]
pub struct ChartForm {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
    pub output: Option<(ChartSpec, ChartData)>,
    pub notice: Option<IncompleteRequest>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The session: loaded dataset plus every user selection, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub config: AppConfig,

    cache: DatasetCache,

    /// Loaded dataset (None until a file is opened successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Name of the file the dataset came from.
    pub source_name: Option<String>,

    /// Side-panel equality filter on `config.group_column`.
    pub group_selection: Selection,

    /// Rows passing the group filter; search, inclusion filter and charts start here.
    pub filtered: View,

    pub column_classes: ColumnClasses,

    pub search: SearchForm,
    pub include: IncludeForm,
    pub chart: ChartForm,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Ingest an uploaded file. A repeat of the current upload is served from the cache.
    pub fn upload(&mut self, name: &str, bytes: &[u8]) {
        match self.cache.get_or_load(name, bytes) {
            Ok(dataset) => {
                self.source_name = Some(name.to_string());
                self.set_dataset(dataset);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                self.dataset = None;
                self.source_name = None;
                self.status_message = Some(format!("Error loading {name}: {e}"));
            }
        }
    }

    /// Install a dataset and reset every selection to its default.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        let names = dataset.column_names();
        self.column_classes = ColumnClasses::of(&dataset);
        self.group_selection = Selection::All;
        self.search = SearchForm {
            columns: names
                .iter()
                .take(self.config.default_search_columns)
                .cloned()
                .collect(),
            ..Default::default()
        };
        self.include = IncludeForm {
            column: names.first().cloned(),
            ..Default::default()
        };
        self.chart = ChartForm {
            y: self.column_classes.numeric.first().cloned(),
            ..Default::default()
        };
        self.dataset = Some(dataset);
        self.chart.x = self.default_x(self.chart.kind);
        self.refilter();
    }

    /// Whether the dataset has the configured group column.
    pub fn has_group_column(&self) -> bool {
        self.dataset
            .as_ref()
            .is_some_and(|ds| ds.column(&self.config.group_column).is_some())
    }

    /// Sorted values offered by the group selector (excluding the "All" entry).
    pub fn group_options(&self) -> Vec<CellValue> {
        match &self.dataset {
            Some(ds) => filter::group_options(ds, &self.config.group_column),
            None => Vec::new(),
        }
    }

    pub fn set_group_selection(&mut self, selection: Selection) {
        self.group_selection = selection;
        self.refilter();
    }

    /// Recompute `filtered` and the inclusion view after a selection change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let spec = FilterSpec::new().equals(&self.config.group_column, self.group_selection.clone());
        self.filtered = filter::apply(ds, &View::all(ds), &spec);

        // Drop picks that no longer occur in the narrowed view.
        if let Some(column) = &self.include.column {
            let available: BTreeSet<CellValue> = ds.sorted_distinct(column, &self.filtered);
            self.include.selected.retain(|v| available.contains(v));
        }
        self.apply_include();
    }

    fn apply_include(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.include.view = match &self.include.column {
            Some(column) => filter::apply(
                ds,
                &self.filtered,
                &FilterSpec::new().one_of(column, self.include.selected.clone()),
            ),
            None => self.filtered.clone(),
        };
    }

    // -- Search --

    /// Run the search form against the group-filtered rows.
    /// An incomplete request keeps the previous results on screen.
    pub fn run_search(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let spec = SearchSpec {
            columns: self.search.columns.clone(),
            term: self.search.term.clone(),
        };
        match search::search(ds, &self.filtered, &spec) {
            Ok(view) => {
                self.search.results = Some((spec.term, view));
                self.search.notice = None;
            }
            Err(notice) => {
                log::debug!("search not run: {notice}");
                self.search.notice = Some(notice);
            }
        }
    }

    pub fn toggle_search_column(&mut self, column: &str) {
        if let Some(pos) = self.search.columns.iter().position(|c| c == column) {
            self.search.columns.remove(pos);
        } else {
            self.search.columns.push(column.to_string());
        }
    }

    // -- Inclusion filter --

    /// Values offered for the inclusion filter, first-seen order.
    pub fn include_options(&self) -> Vec<CellValue> {
        match (&self.dataset, &self.include.column) {
            (Some(ds), Some(column)) => filter::distinct_values(ds, &self.filtered, column),
            _ => Vec::new(),
        }
    }

    pub fn set_include_column(&mut self, column: String) {
        if self.include.column.as_deref() != Some(column.as_str()) {
            self.include.column = Some(column);
            self.include.selected.clear();
            self.apply_include();
        }
    }

    pub fn toggle_include_value(&mut self, value: &CellValue) {
        if !self.include.selected.remove(value) {
            self.include.selected.insert(value.clone());
        }
        self.apply_include();
    }

    // -- Charts --

    fn default_x(&self, kind: ChartKind) -> Option<String> {
        self.column_classes.x_candidates(kind).first().cloned()
    }

    /// Change chart kind, resetting X when it is not valid for the new kind.
    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart.kind = kind;
        let candidates = self.column_classes.x_candidates(kind);
        let keep = self
            .chart
            .x
            .as_ref()
            .is_some_and(|x| candidates.contains(x));
        if !keep {
            self.chart.x = candidates.first().cloned();
        }
    }

    /// Build chart data over the group-filtered rows.
    pub fn build_chart(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let result = match (&self.chart.x, &self.chart.y) {
            _ if self.column_classes.numeric.is_empty() => Err(IncompleteRequest::NoNumericColumns),
            (Some(x), Some(y)) => {
                let spec = ChartSpec {
                    kind: self.chart.kind,
                    x: x.clone(),
                    y: y.clone(),
                };
                chart::prepare(ds, &self.filtered, &spec).map(|data| (spec, data))
            }
            _ => Err(IncompleteRequest::MissingAxis),
        };
        match result {
            Ok(output) => {
                self.chart.output = Some(output);
                self.chart.notice = None;
            }
            Err(notice) => {
                log::debug!("chart not built: {notice}");
                self.chart.notice = Some(notice);
            }
        }
    }

    /// Summary of the group-filtered rows.
    pub fn summary(&self) -> chart::Summary {
        chart::summarize(&self.filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTES: &str = "Km,Operadora,Rota,Jan\n\
                          10,A,CIDADE 1 - CIDADE 2,0\n\
                          20,B,CIDADE 2 - CIDADE 3,1\n\
                          30,A,CIDADE 3 - CIDADE 4,0\n";

    fn loaded() -> AppState {
        let mut state = AppState::new(AppConfig::default());
        state.upload("rotas.csv", ROUTES.as_bytes());
        state
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn upload_sets_defaults() {
        let state = loaded();
        assert!(state.status_message.is_none());
        assert_eq!(state.filtered.len(), 3);
        assert_eq!(state.include.view.len(), 3);
        assert_eq!(state.search.columns, vec!["Km", "Operadora", "Rota"]);
        assert_eq!(state.chart.y.as_deref(), Some("Km"));
        assert_eq!(state.chart.x.as_deref(), Some("Operadora"));
        assert_eq!(state.group_options(), vec![text("A"), text("B")]);
    }

    #[test]
    fn failed_upload_leaves_no_dataset() {
        let mut state = loaded();
        state.upload("rotas.pdf", b"%PDF-1.4");
        assert!(state.dataset.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn group_selection_narrows_everything() {
        let mut state = loaded();
        state.set_group_selection(Selection::Only(text("A")));
        assert_eq!(state.summary().row_count, 2);

        state.search.term = "cidade".into();
        state.run_search();
        let (_, view) = state.search.results.as_ref().unwrap();
        assert_eq!(view.rows(), &[0, 2]);

        state.set_group_selection(Selection::All);
        assert_eq!(state.summary().row_count, 3);
    }

    #[test]
    fn incomplete_search_keeps_previous_results() {
        let mut state = loaded();
        state.search.term = "cidade 2".into();
        state.run_search();
        assert_eq!(state.search.results.as_ref().unwrap().1.rows(), &[0, 1]);

        state.search.term.clear();
        state.run_search();
        assert_eq!(state.search.notice, Some(IncompleteRequest::MissingSearchTerm));
        assert_eq!(state.search.results.as_ref().unwrap().1.rows(), &[0, 1]);
    }

    #[test]
    fn inclusion_toggle() {
        let mut state = loaded();
        state.set_include_column("Operadora".into());
        assert_eq!(state.include_options(), vec![text("A"), text("B")]);
        state.toggle_include_value(&text("B"));
        assert_eq!(state.include.view.rows(), &[1]);
        state.toggle_include_value(&text("B"));
        assert_eq!(state.include.view.len(), 3);
    }

    #[test]
    fn group_change_drops_unavailable_picks() {
        let mut state = loaded();
        state.set_include_column("Operadora".into());
        state.toggle_include_value(&text("B"));
        state.set_group_selection(Selection::Only(text("A")));
        assert!(state.include.selected.is_empty());
        assert_eq!(state.include.view.rows(), &[0, 2]);
    }

    #[test]
    fn pie_chart_over_filtered_rows() {
        let mut state = loaded();
        state.set_chart_kind(ChartKind::Pie);
        state.build_chart();
        let (spec, data) = state.chart.output.as_ref().unwrap();
        assert_eq!(spec.title(), "Distribution of Km by Operadora");
        assert_eq!(
            *data,
            ChartData::Pie {
                slices: vec![("A".into(), 40.0), ("B".into(), 20.0)]
            }
        );
    }

    #[test]
    fn switching_to_scatter_picks_numeric_x() {
        let mut state = loaded();
        state.set_chart_kind(ChartKind::Scatter);
        assert_eq!(state.chart.x.as_deref(), Some("Km"));
    }

    #[test]
    fn no_numeric_columns_gives_notice() {
        let mut state = AppState::new(AppConfig::default());
        state.upload("ops.csv", b"Operadora,Rota\nA,X\n");
        state.build_chart();
        assert_eq!(state.chart.notice, Some(IncompleteRequest::NoNumericColumns));
        assert!(state.chart.output.is_none());
    }
}
