use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::CountrySource;
use crate::data::model::{Country, Metric};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "SOLAR_DASHBOARD_CONFIG";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Which cleaned file belongs to which country.
///
/// ```json
/// {
///   "data_dir": "data",
///   "countries": [
///     { "name": "Benin", "file": "benin_clean.csv" },
///     { "name": "Togo",  "file": "togo_clean.csv" }
///   ],
///   "default_metric": "GHI"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub countries: Vec<CountryFile>,
    #[serde(default = "default_metric")]
    pub default_metric: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryFile {
    pub name: String,
    /// Relative paths are resolved against `data_dir`.
    pub file: PathBuf,
}

fn default_metric() -> Metric {
    Metric::Ghi
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let entry = |name: &str, file: &str| CountryFile {
            name: name.to_string(),
            file: PathBuf::from(file),
        };
        Self {
            data_dir: PathBuf::from("data"),
            countries: vec![
                entry("Benin", "benin_clean.csv"),
                entry("Sierra Leone", "sierra_leone_clean.csv"),
                entry("Togo", "togo_clean.csv"),
            ],
            default_metric: default_metric(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Config from an explicit path, else from `$SOLAR_DASHBOARD_CONFIG`,
    /// else the built-in defaults.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let path = explicit.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(path) => {
                log::info!("Using config {}", path.display());
                Self::from_file(&path)
            }
            None => {
                log::info!("No config given, using default country files");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.countries.is_empty() {
            bail!("config lists no countries");
        }
        let mut seen = BTreeSet::new();
        for entry in &self.countries {
            if entry.name.trim().is_empty() {
                bail!("config has a country with an empty name");
            }
            if !seen.insert(entry.name.as_str()) {
                bail!("country '{}' is listed twice", entry.name);
            }
        }
        Ok(())
    }

    /// The same config reading from another directory.
    pub fn with_data_dir(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..self.clone()
        }
    }

    /// Country sources in configured order, paths resolved.
    pub fn sources(&self) -> Vec<CountrySource> {
        self.countries
            .iter()
            .map(|c| CountrySource::new(Country::new(c.name.clone()), self.data_dir.join(&c.file)))
            .collect()
    }
}
