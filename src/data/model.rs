use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::UnknownMetric;

// ---------------------------------------------------------------------------
// Country – the label attached to every record by the loader
// ---------------------------------------------------------------------------

/// A configured country name, e.g. `"Sierra Leone"`.
/// Ordered by name so it can key `BTreeMap` / `BTreeSet` selections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Country(String);

impl Country {
    pub fn new(name: impl Into<String>) -> Self {
        Country(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Country {
    fn from(name: &str) -> Self {
        Country::new(name)
    }
}

// ---------------------------------------------------------------------------
// Metric – the closed set of analysable sensor fields
// ---------------------------------------------------------------------------

/// A numeric sensor field that can be selected for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "GHI")]
    Ghi,
    #[serde(rename = "DNI")]
    Dni,
    #[serde(rename = "DHI")]
    Dhi,
    Tamb,
    #[serde(rename = "RH")]
    Rh,
    #[serde(rename = "WS")]
    Ws,
    #[serde(rename = "BP")]
    Bp,
}

impl Metric {
    /// All metrics in the order the selector lists them.
    pub const ALL: [Metric; 7] = [
        Metric::Ghi,
        Metric::Dni,
        Metric::Dhi,
        Metric::Tamb,
        Metric::Rh,
        Metric::Ws,
        Metric::Bp,
    ];

    /// Column name as it appears in the cleaned CSV header.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Ghi => "GHI",
            Metric::Dni => "DNI",
            Metric::Dhi => "DHI",
            Metric::Tamb => "Tamb",
            Metric::Rh => "RH",
            Metric::Ws => "WS",
            Metric::Bp => "BP",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Ghi | Metric::Dni | Metric::Dhi => "W/m²",
            Metric::Tamb => "°C",
            Metric::Rh => "%",
            Metric::Ws => "m/s",
            Metric::Bp => "hPa",
        }
    }

    /// Axis / table label, e.g. `GHI (W/m²)`.
    pub fn label(self) -> String {
        format!("{} ({})", self.column(), self.unit())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.column().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CleaningStatus – the optional binary `Cleaning` flag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CleaningStatus {
    NoCleaning,
    CleaningOccurred,
}

impl CleaningStatus {
    /// Map the raw `0` / `1` flag; anything else is not a cleaning flag.
    pub fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            0 => Some(CleaningStatus::NoCleaning),
            1 => Some(CleaningStatus::CleaningOccurred),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CleaningStatus::NoCleaning => "No Cleaning",
            CleaningStatus::CleaningOccurred => "Cleaning Occurred",
        }
    }
}

impl fmt::Display for CleaningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Reading / Record – one observation row
// ---------------------------------------------------------------------------

/// A parsed CSV row before it is tagged with its country.
/// Empty sensor cells are `None` and are skipped by every aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub ghi: Option<f64>,
    pub dni: Option<f64>,
    pub dhi: Option<f64>,
    pub tamb: Option<f64>,
    pub rh: Option<f64>,
    pub ws: Option<f64>,
    pub bp: Option<f64>,
    pub mod_a: Option<f64>,
    pub mod_b: Option<f64>,
    pub cleaning: Option<CleaningStatus>,
}

impl Reading {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Ghi => self.ghi,
            Metric::Dni => self.dni,
            Metric::Dhi => self.dhi,
            Metric::Tamb => self.tamb,
            Metric::Rh => self.rh,
            Metric::Ws => self.ws,
            Metric::Bp => self.bp,
        }
    }
}

/// A reading tagged with the country of the file it came from.
///
/// Only [`super::loader::tag_country`] builds records, so `country` always
/// matches the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: Country,
    pub reading: Reading,
}

impl Record {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.reading.timestamp
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.reading.metric(metric)
    }

    pub fn cleaning(&self) -> Option<CleaningStatus> {
        self.reading.cleaning
    }
}

// ---------------------------------------------------------------------------
// Dataset – every configured country, unioned
// ---------------------------------------------------------------------------

/// The merged dataset: records grouped by country in the order the countries
/// were supplied, each group in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    countries: Vec<Country>,
}

impl Dataset {
    pub(crate) fn from_parts(records: Vec<Record>, countries: Vec<Country>) -> Self {
        Dataset { records, countries }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Countries in load order (including ones whose file had no rows).
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Number of records for one country.
    pub fn rows_for(&self, country: &Country) -> usize {
        self.records.iter().filter(|r| &r.country == country).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_parses_case_insensitively() {
        assert_eq!("GHI".parse::<Metric>().unwrap(), Metric::Ghi);
        assert_eq!("tamb".parse::<Metric>().unwrap(), Metric::Tamb);
        assert_eq!(" ws ".parse::<Metric>().unwrap(), Metric::Ws);
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let err = "ModA".parse::<Metric>().unwrap_err();
        assert_eq!(err, UnknownMetric("ModA".to_string()));
        assert!("".parse::<Metric>().is_err());
    }

    #[test]
    fn metric_columns_round_trip_through_from_str() {
        for m in Metric::ALL {
            assert_eq!(m.column().parse::<Metric>().unwrap(), m);
        }
    }

    #[test]
    fn cleaning_flag_only_accepts_zero_and_one() {
        assert_eq!(CleaningStatus::from_flag(0), Some(CleaningStatus::NoCleaning));
        assert_eq!(CleaningStatus::from_flag(1), Some(CleaningStatus::CleaningOccurred));
        assert_eq!(CleaningStatus::from_flag(2), None);
        assert_eq!(CleaningStatus::CleaningOccurred.to_string(), "Cleaning Occurred");
    }

    #[test]
    fn countries_order_by_name() {
        let mut v = vec![Country::from("Togo"), Country::from("Benin"), Country::from("Sierra Leone")];
        v.sort();
        let names: Vec<&str> = v.iter().map(Country::name).collect();
        assert_eq!(names, ["Benin", "Sierra Leone", "Togo"]);
    }
}
