/// Data layer: core types, loading, filtering and derived views.
///
/// Architecture:
/// ```text
///  benin_clean.csv  sierra_leone_clean.csv  togo_clean.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → tag with country → merge
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, countries in load order
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  country selection → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  views    │  ranking, cleaning impact, distribution, time series
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod views;
