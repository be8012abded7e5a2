//! Cross-country solar dashboard: the data aggregator behind the UI.
//!
//! Load the cleaned per-country files once through [`cache::DatasetCache`],
//! filter with [`data::filter::filter_by_country`], then ask
//! [`data::views`] for rankings, cleaning impact, distributions and series.

pub mod cache;
pub mod config;
pub mod data;

pub use cache::DatasetCache;
pub use config::DashboardConfig;
pub use data::error::{LoadError, UnknownMetric};
pub use data::filter::{all_countries, filter_by_country, CountrySelection, FilteredView};
pub use data::loader::{load, merge, parse_csv, tag_country, CountrySource};
pub use data::model::{CleaningStatus, Country, Dataset, Metric, Reading, Record};
pub use data::views::{
    cleaning_impact, distribution_summary, rank_by_metric_mean, time_series, CleaningImpact,
    CleaningImpactRow, CountryMean, CountrySeries, DistributionSummary,
};
