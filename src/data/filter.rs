use std::collections::BTreeSet;

use super::model::{Country, Dataset, Record};

// ---------------------------------------------------------------------------
// Country selection
// ---------------------------------------------------------------------------

/// The set of countries the user has ticked. Empty means nothing selected.
pub type CountrySelection = BTreeSet<Country>;

/// Initialise a [`CountrySelection`] with every loaded country selected.
pub fn all_countries(dataset: &Dataset) -> CountrySelection {
    dataset.countries().iter().cloned().collect()
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Records of a dataset whose country is selected, in dataset order.
///
/// Borrowed from the dataset and rebuilt on every selection change.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is selected (or the selected countries have no
    /// rows). Callers show a neutral "nothing to display" state.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Return the records whose country is in `selected`.
pub fn filter_by_country<'a>(dataset: &'a Dataset, selected: &CountrySelection) -> FilteredView<'a> {
    if selected.is_empty() {
        return FilteredView { records: Vec::new() };
    }
    let records = dataset
        .records()
        .iter()
        .filter(|r| selected.contains(&r.country))
        .collect();
    FilteredView { records }
}
