use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};
use serde::Deserialize;

use super::error::LoadError;
use super::model::{CleaningStatus, Country, Dataset, Reading, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// One configured input: the country label and the cleaned CSV that holds
/// its observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySource {
    pub country: Country,
    pub path: PathBuf,
}

impl CountrySource {
    pub fn new(country: impl Into<Country>, path: impl Into<PathBuf>) -> Self {
        CountrySource {
            country: country.into(),
            path: path.into(),
        }
    }
}

/// Load every configured country file and merge them into one [`Dataset`].
///
/// All-or-nothing: if any file is missing the error names that country and
/// path, and nothing is parsed. A parse failure in any file also fails the
/// whole load.
pub fn load(sources: &[CountrySource]) -> Result<Dataset, LoadError> {
    if let Some(missing) = sources.iter().find(|s| !s.path.exists()) {
        return Err(LoadError::MissingFile {
            country: missing.country.clone(),
            path: missing.path.clone(),
        });
    }

    let mut groups = Vec::with_capacity(sources.len());
    for source in sources {
        let readings = parse_csv(&source.path)?;
        info!(
            "Loaded {} rows for {} from {}",
            readings.len(),
            source.country,
            source.path.display()
        );
        groups.push((source.country.clone(), tag_country(readings, &source.country)));
    }

    let dataset = merge(groups);
    info!(
        "Dataset ready: {} records across {} countries",
        dataset.len(),
        dataset.countries().len()
    );
    Ok(dataset)
}

/// Attach `country` to every reading.
pub fn tag_country(readings: Vec<Reading>, country: &Country) -> Vec<Record> {
    readings
        .into_iter()
        .map(|reading| Record {
            country: country.clone(),
            reading,
        })
        .collect()
}

/// Concatenate per-country groups in the order given, keeping each group's
/// row order.
pub fn merge(groups: Vec<(Country, Vec<Record>)>) -> Dataset {
    let total = groups.iter().map(|(_, records)| records.len()).sum();
    let mut records = Vec::with_capacity(total);
    let mut countries = Vec::with_capacity(groups.len());

    for (country, group) in groups {
        records.extend(group);
        if !countries.contains(&country) {
            countries.push(country);
        }
    }

    Dataset::from_parts(records, countries)
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

const TIMESTAMP: &str = "Timestamp";

/// Row layout of a cleaned file. Only `Timestamp` is required; a sensor
/// column that is absent or an empty cell becomes `None`. Extra columns
/// (`WD`, `Comments`, …) are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "GHI")]
    ghi: Option<f64>,
    #[serde(rename = "DNI")]
    dni: Option<f64>,
    #[serde(rename = "DHI")]
    dhi: Option<f64>,
    #[serde(rename = "Tamb")]
    tamb: Option<f64>,
    #[serde(rename = "RH")]
    rh: Option<f64>,
    #[serde(rename = "WS")]
    ws: Option<f64>,
    #[serde(rename = "BP")]
    bp: Option<f64>,
    #[serde(rename = "ModA")]
    mod_a: Option<f64>,
    #[serde(rename = "ModB")]
    mod_b: Option<f64>,
    #[serde(rename = "Cleaning", default)]
    cleaning: Option<f64>,
}

/// Parse one cleaned CSV file.
///
/// Fail-fast: the first row that does not parse fails the whole file with
/// its 1-based data row and column name. Nothing is skipped silently.
pub fn parse_csv(path: &Path) -> Result<Vec<Reading>, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();

    if !headers.iter().any(|h| h == TIMESTAMP) {
        return Err(LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: TIMESTAMP.to_string(),
        });
    }

    let mut readings = Vec::new();
    for (idx, result) in reader.deserialize::<RawRow>().enumerate() {
        let row = idx + 1;
        let raw = result.map_err(|e| match e.kind() {
            csv::ErrorKind::Deserialize { err, .. } => LoadError::Parse {
                path: path.to_path_buf(),
                row,
                column: err
                    .field()
                    .and_then(|f| headers.get(f as usize))
                    .unwrap_or("?")
                    .to_string(),
                message: err.kind().to_string(),
            },
            _ => csv_err(e),
        })?;
        readings.push(into_reading(raw, path, row)?);
    }

    debug!("Parsed {} rows from {}", readings.len(), path.display());
    Ok(readings)
}

fn into_reading(raw: RawRow, path: &Path, row: usize) -> Result<Reading, LoadError> {
    let parse_err = |column: &str, message: String| LoadError::Parse {
        path: path.to_path_buf(),
        row,
        column: column.to_string(),
        message,
    };

    let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| {
        parse_err(
            TIMESTAMP,
            format!("'{}' is not a date-time", raw.timestamp),
        )
    })?;

    let cleaning = match raw.cleaning.filter(|v| !v.is_nan()) {
        None => None,
        Some(flag) if flag.fract() == 0.0 => Some(
            CleaningStatus::from_flag(flag as i64)
                .ok_or_else(|| parse_err("Cleaning", format!("'{flag}' is not 0 or 1")))?,
        ),
        Some(flag) => return Err(parse_err("Cleaning", format!("'{flag}' is not 0 or 1"))),
    };

    let present = |v: Option<f64>| v.filter(|x| !x.is_nan());
    Ok(Reading {
        timestamp,
        ghi: present(raw.ghi),
        dni: present(raw.dni),
        dhi: present(raw.dhi),
        tamb: present(raw.tamb),
        rh: present(raw.rh),
        ws: present(raw.ws),
        bp: present(raw.bp),
        mod_a: present(raw.mod_a),
        mod_b: present(raw.mod_b),
        cleaning,
    })
}

/// Naive date-time layouts seen in cleaned exports, most common first.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-8601-style timestamp. Offsets are normalised to UTC and a
/// bare date means midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
