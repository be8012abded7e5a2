use std::path::PathBuf;

use solar_dashboard::{
    all_countries, cleaning_impact, distribution_summary, filter_by_country, rank_by_metric_mean,
    time_series, CleaningImpact, Country, CountryMean, CountrySelection, CountrySeries,
    DashboardConfig, DatasetCache, DistributionSummary, FilteredView, LoadError, Metric,
};

use crate::color::CountryColors;

// ---------------------------------------------------------------------------
// Derived views for the current selection
// ---------------------------------------------------------------------------

/// Everything the charts need, computed from one filtered view. The view
/// itself is dropped once these are built.
#[derive(Debug, Clone)]
pub struct DerivedViews {
    pub rows: usize,
    pub distribution: Vec<DistributionSummary>,
    pub series: Vec<CountrySeries>,
    pub ranking: Vec<CountryMean>,
    pub cleaning: CleaningImpact,
}

impl DerivedViews {
    fn compute(view: &FilteredView<'_>, metric: Metric, ranking_metric: Metric) -> Self {
        Self {
            rows: view.len(),
            distribution: distribution_summary(view, metric),
            series: time_series(view, metric),
            ranking: rank_by_metric_mean(view, ranking_metric),
            cleaning: cleaning_impact(view),
        }
    }
}

/// Why there is no dataset to show.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadProblem {
    MissingFile { country: Country, path: PathBuf },
    Other(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Memoized dataset for this run.
    pub cache: DatasetCache,

    /// Countries ticked in the side panel.
    pub selection: CountrySelection,

    /// Metric for the box plot and time series.
    pub metric: Metric,

    /// Metric the ranking table averages.
    pub ranking_metric: Metric,

    pub colors: CountryColors,

    /// `None` when nothing is selected or the selection has no rows.
    pub views: Option<DerivedViews>,

    pub load_problem: Option<LoadProblem>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = Self {
            cache: DatasetCache::new(config.sources()),
            metric: config.default_metric,
            ranking_metric: Metric::Ghi,
            config,
            selection: CountrySelection::new(),
            colors: CountryColors::default(),
            views: None,
            load_problem: None,
            status_message: None,
        };
        state.ensure_loaded();
        state
    }

    /// Load the dataset if the cache is empty and reset the selection to
    /// every country.
    pub fn ensure_loaded(&mut self) {
        if self.cache.is_loaded() {
            return;
        }
        match self.cache.get_or_load() {
            Ok(dataset) => {
                self.selection = all_countries(dataset);
                self.colors = CountryColors::new(dataset.countries());
                self.load_problem = None;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                self.status_message = Some(format!("Error: {e}"));
                self.load_problem = Some(match e {
                    LoadError::MissingFile { country, path } => LoadProblem::MissingFile { country, path },
                    other => LoadProblem::Other(other.to_string()),
                });
                self.selection.clear();
            }
        }
        self.refresh();
    }

    /// Drop the cached dataset and read the files again.
    pub fn reload(&mut self) {
        self.cache.reset();
        self.ensure_loaded();
    }

    /// Read the configured file names from another directory.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("Switching data directory to {}", dir.display());
        self.config = self.config.with_data_dir(dir);
        self.cache.set_sources(self.config.sources());
        self.ensure_loaded();
    }

    /// Recompute the derived views after a selection or metric change.
    pub fn refresh(&mut self) {
        let Some(dataset) = self.cache.get() else {
            self.views = None;
            return;
        };
        let view = filter_by_country(dataset, &self.selection);
        self.views = if view.is_empty() {
            None
        } else {
            Some(DerivedViews::compute(&view, self.metric, self.ranking_metric))
        };
    }

    pub fn toggle_country(&mut self, country: &Country) {
        if !self.selection.remove(country) {
            self.selection.insert(country.clone());
        }
        self.refresh();
    }

    pub fn select_all(&mut self) {
        if let Some(dataset) = self.cache.get() {
            self.selection = all_countries(dataset);
            self.refresh();
        }
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
        self.refresh();
    }

    pub fn set_metric(&mut self, metric: Metric) {
        if self.metric != metric {
            self.metric = metric;
            self.refresh();
        }
    }

    pub fn set_ranking_metric(&mut self, metric: Metric) {
        if self.ranking_metric != metric {
            self.ranking_metric = metric;
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_default_files(dir: &TempDir) {
        let rows = [
            ("benin_clean.csv", "500", "0"),
            ("sierra_leone_clean.csv", "300", "0"),
            ("togo_clean.csv", "400", "1"),
        ];
        for (file, ghi, cleaning) in rows {
            fs::write(
                dir.path().join(file),
                format!(
                    "Timestamp,GHI,DNI,DHI,ModA,ModB,Tamb,RH,WS,BP,Cleaning\n\
                     2023-01-01T00:00,{ghi},1,1,10,11,25,80,2,998,{cleaning}\n"
                ),
            )
            .unwrap();
        }
    }

    fn state_in(dir: &TempDir) -> AppState {
        AppState::new(DashboardConfig::default().with_data_dir(dir.path()))
    }

    #[test]
    fn loads_everything_selected() {
        let dir = TempDir::new().unwrap();
        write_default_files(&dir);
        let state = state_in(&dir);

        assert!(state.load_problem.is_none());
        assert_eq!(state.selection.len(), 3);
        let views = state.views.as_ref().unwrap();
        assert_eq!(views.rows, 3);
        assert_eq!(views.ranking[0].country.name(), "Benin");
        assert!(views.cleaning.is_applicable());
    }

    #[test]
    fn empty_selection_clears_views() {
        let dir = TempDir::new().unwrap();
        write_default_files(&dir);
        let mut state = state_in(&dir);

        state.select_none();
        assert!(state.views.is_none());

        state.toggle_country(&Country::from("Togo"));
        let views = state.views.as_ref().unwrap();
        assert_eq!(views.ranking.len(), 1);
        assert!(!views.cleaning.is_applicable());
    }

    #[test]
    fn missing_file_is_reported_by_country() {
        let dir = TempDir::new().unwrap();
        write_default_files(&dir);
        fs::remove_file(dir.path().join("togo_clean.csv")).unwrap();
        let state = state_in(&dir);

        assert!(state.views.is_none());
        assert!(matches!(
            state.load_problem,
            Some(LoadProblem::MissingFile { ref country, .. }) if country.name() == "Togo"
        ));
    }

    #[test]
    fn reload_picks_up_fixed_files() {
        let dir = TempDir::new().unwrap();
        write_default_files(&dir);
        fs::remove_file(dir.path().join("benin_clean.csv")).unwrap();
        let mut state = state_in(&dir);
        assert!(state.load_problem.is_some());

        write_default_files(&dir);
        state.reload();
        assert!(state.load_problem.is_none());
        assert_eq!(state.views.as_ref().unwrap().rows, 3);
    }

    #[test]
    fn ranking_metric_is_independent_of_plot_metric() {
        let dir = TempDir::new().unwrap();
        write_default_files(&dir);
        let mut state = state_in(&dir);

        state.set_metric(Metric::Tamb);
        let views = state.views.as_ref().unwrap();
        assert_eq!(views.ranking[0].mean, 500.0);
        assert_eq!(views.distribution[0].median, 25.0);
    }
}
