use log::{debug, info};
use once_cell::unsync::OnceCell;

use crate::data::error::LoadError;
use crate::data::loader::{self, CountrySource};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// DatasetCache – load once per run, reload on request
// ---------------------------------------------------------------------------

/// Holds the merged dataset for the lifetime of the application context.
///
/// The first successful [`get_or_load`](Self::get_or_load) reads the files;
/// later calls return the same dataset without touching the filesystem until
/// [`reset`](Self::reset) is called. A failed load is not remembered.
#[derive(Debug)]
pub struct DatasetCache {
    sources: Vec<CountrySource>,
    dataset: OnceCell<Dataset>,
}

impl DatasetCache {
    pub fn new(sources: Vec<CountrySource>) -> Self {
        Self {
            sources,
            dataset: OnceCell::new(),
        }
    }

    pub fn sources(&self) -> &[CountrySource] {
        &self.sources
    }

    pub fn get_or_load(&self) -> Result<&Dataset, LoadError> {
        self.dataset.get_or_try_init(|| {
            debug!("Dataset cache miss, loading {} sources", self.sources.len());
            loader::load(&self.sources)
        })
    }

    /// The cached dataset, if one has been loaded.
    pub fn get(&self) -> Option<&Dataset> {
        self.dataset.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }

    /// Drop the cached dataset so the next access re-reads the files.
    pub fn reset(&mut self) {
        if self.dataset.take().is_some() {
            info!("Dataset cache cleared");
        }
    }

    /// Point the cache at new files. Clears any cached dataset.
    pub fn set_sources(&mut self, sources: Vec<CountrySource>) {
        self.sources = sources;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, ghi: &[f64]) -> CountrySource {
        let path = dir.join(name);
        let mut text = String::from("Timestamp,GHI,DNI,DHI,ModA,ModB,Tamb,RH,WS,BP,Cleaning\n");
        for (i, g) in ghi.iter().enumerate() {
            text.push_str(&format!("2023-01-01 00:{i:02},{g},0,0,0,0,25,80,1,998,0\n"));
        }
        fs::write(&path, text).unwrap();
        CountrySource::new(name.trim_end_matches("_clean.csv"), path)
    }

    #[test]
    fn loads_once_and_serves_from_memory() {
        let dir = TempDir::new().unwrap();
        let source = write(dir.path(), "benin_clean.csv", &[1.0, 2.0]);
        let path = source.path.clone();
        let cache = DatasetCache::new(vec![source]);

        assert!(!cache.is_loaded());
        assert_eq!(cache.get_or_load().unwrap().len(), 2);

        // files are not read again once cached
        fs::remove_file(&path).unwrap();
        assert_eq!(cache.get_or_load().unwrap().len(), 2);
        assert!(cache.get().is_some());
    }

    #[test]
    fn reset_forces_a_reload() {
        let dir = TempDir::new().unwrap();
        let source = write(dir.path(), "togo_clean.csv", &[1.0]);
        let mut cache = DatasetCache::new(vec![source]);
        assert_eq!(cache.get_or_load().unwrap().len(), 1);

        write(dir.path(), "togo_clean.csv", &[1.0, 2.0, 3.0]);
        assert_eq!(cache.get_or_load().unwrap().len(), 1);

        cache.reset();
        assert!(!cache.is_loaded());
        assert_eq!(cache.get_or_load().unwrap().len(), 3);
    }

    #[test]
    fn failures_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("benin_clean.csv");
        let cache = DatasetCache::new(vec![CountrySource::new("benin", path)]);

        let err = cache.get_or_load().unwrap_err();
        assert!(matches!(err, LoadError::MissingFile { .. }));
        assert!(!cache.is_loaded());

        write(dir.path(), "benin_clean.csv", &[4.0]);
        assert_eq!(cache.get_or_load().unwrap().len(), 1);
    }

    #[test]
    fn set_sources_clears_the_cache() {
        let dir = TempDir::new().unwrap();
        let benin = write(dir.path(), "benin_clean.csv", &[1.0]);
        let togo = write(dir.path(), "togo_clean.csv", &[1.0, 2.0]);
        let mut cache = DatasetCache::new(vec![benin]);
        cache.get_or_load().unwrap();

        cache.set_sources(vec![togo.clone()]);
        assert!(!cache.is_loaded());
        assert_eq!(cache.sources(), &[togo]);
        assert_eq!(cache.get_or_load().unwrap().len(), 2);
    }
}
