//! Derived views computed from a [`FilteredView`]: distribution summaries,
//! time series, the per-country ranking and the cleaning-impact table.
//!
//! All functions are pure; they read the view and allocate their result.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::filter::FilteredView;
use super::model::{CleaningStatus, Country, Metric};

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CountryMean {
    pub country: Country,
    pub mean: f64,
}

/// Mean of `metric` per country, highest first. Equal means fall back to
/// country name ascending. Countries with no value for `metric` are left out.
pub fn rank_by_metric_mean(view: &FilteredView<'_>, metric: Metric) -> Vec<CountryMean> {
    let mut sums: BTreeMap<&Country, (f64, usize)> = BTreeMap::new();
    for record in view.iter() {
        if let Some(v) = record.metric(metric) {
            let entry = sums.entry(&record.country).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }

    let mut ranking: Vec<CountryMean> = sums
        .into_iter()
        .map(|(country, (sum, n))| CountryMean {
            country: country.clone(),
            mean: sum / n as f64,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.mean
            .total_cmp(&a.mean)
            .then_with(|| a.country.cmp(&b.country))
    });
    ranking
}

// ---------------------------------------------------------------------------
// Cleaning impact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningImpactRow {
    pub country: Country,
    pub status: CleaningStatus,
    /// NaN when the group has no ModA readings.
    pub mean_mod_a: f64,
    pub mean_mod_b: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CleaningImpact {
    /// Rows ordered by country name, then "No Cleaning" before "Cleaning Occurred".
    Applicable(Vec<CleaningImpactRow>),
    /// The view holds fewer than two distinct cleaning flags, so there is
    /// nothing to compare.
    NotApplicable { distinct: usize },
}

impl CleaningImpact {
    pub fn rows(&self) -> Option<&[CleaningImpactRow]> {
        match self {
            CleaningImpact::Applicable(rows) => Some(rows),
            CleaningImpact::NotApplicable { .. } => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, CleaningImpact::Applicable(_))
    }
}

#[derive(Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl MeanAcc {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.sum += v;
            self.n += 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.n == 0 {
            f64::NAN
        } else {
            self.sum / self.n as f64
        }
    }
}

/// Mean ModA / ModB grouped by (country, cleaning flag). Rows without a
/// cleaning flag take no part.
pub fn cleaning_impact(view: &FilteredView<'_>) -> CleaningImpact {
    let mut groups: BTreeMap<(&Country, CleaningStatus), (MeanAcc, MeanAcc, usize)> = BTreeMap::new();
    for record in view.iter() {
        let Some(status) = record.cleaning() else {
            continue;
        };
        let (a, b, count) = groups.entry((&record.country, status)).or_default();
        a.push(record.reading.mod_a);
        b.push(record.reading.mod_b);
        *count += 1;
    }

    let distinct = {
        let mut seen: Vec<CleaningStatus> = groups.keys().map(|(_, s)| *s).collect();
        seen.sort();
        seen.dedup();
        seen.len()
    };
    if distinct < 2 {
        return CleaningImpact::NotApplicable { distinct };
    }

    let rows = groups
        .into_iter()
        .map(|((country, status), (a, b, count))| CleaningImpactRow {
            country: country.clone(),
            status,
            mean_mod_a: a.mean(),
            mean_mod_b: b.mean(),
            count,
        })
        .collect();
    CleaningImpact::Applicable(rows)
}

// ---------------------------------------------------------------------------
// Distribution summary (box plot)
// ---------------------------------------------------------------------------

/// Five-number summary of one country's values, with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSummary {
    pub country: Country,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
}

/// Per-country summary of `metric`, countries in the order they first appear
/// in the view. Countries with no values are skipped.
pub fn distribution_summary(view: &FilteredView<'_>, metric: Metric) -> Vec<DistributionSummary> {
    group_in_view_order(view, metric)
        .into_iter()
        .filter_map(|(country, values)| summarize(country.clone(), values.into_iter().map(|(_, v)| v).collect()))
        .collect()
}

fn summarize(country: Country, mut values: Vec<f64>) -> Option<DistributionSummary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();

    let q1 = percentile(&values, 25.0);
    let median = percentile(&values, 50.0);
    let q3 = percentile(&values, 75.0);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let lower_whisker = values.iter().copied().find(|v| *v >= low_fence).unwrap_or(values[0]);
    let upper_whisker = values
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= high_fence)
        .unwrap_or(values[n - 1]);

    Some(DistributionSummary {
        country,
        count: n,
        min: values[0],
        q1,
        median,
        q3,
        max: values[n - 1],
        mean: values.iter().sum::<f64>() / n as f64,
        lower_whisker,
        upper_whisker,
    })
}

/// Percentile by linear interpolation between closest ranks (NumPy default).
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CountrySeries {
    pub country: Country,
    /// Sorted by timestamp.
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// One series of `metric` per country, in the order countries first appear
/// in the view. Missing values are skipped.
pub fn time_series(view: &FilteredView<'_>, metric: Metric) -> Vec<CountrySeries> {
    group_in_view_order(view, metric)
        .into_iter()
        .map(|(country, mut points)| {
            points.sort_by_key(|(t, _)| *t);
            CountrySeries {
                country: country.clone(),
                points,
            }
        })
        .collect()
}

fn group_in_view_order<'a>(
    view: &FilteredView<'a>,
    metric: Metric,
) -> Vec<(&'a Country, Vec<(NaiveDateTime, f64)>)> {
    let mut groups: Vec<(&'a Country, Vec<(NaiveDateTime, f64)>)> = Vec::new();
    for record in view.iter() {
        let idx = match groups.iter().position(|(c, _)| *c == &record.country) {
            Some(idx) => idx,
            None => {
                groups.push((&record.country, Vec::new()));
                groups.len() - 1
            }
        };
        if let Some(v) = record.metric(metric) {
            groups[idx].1.push((record.timestamp(), v));
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{all_countries, filter_by_country, CountrySelection};
    use crate::data::loader::{merge, tag_country};
    use crate::data::model::{Dataset, Reading};
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, minute, 0)
            .unwrap()
    }

    fn reading(minute: u32, ghi: f64, cleaning: Option<CleaningStatus>, mod_a: f64, mod_b: f64) -> Reading {
        Reading {
            timestamp: at(minute),
            ghi: Some(ghi),
            mod_a: Some(mod_a),
            mod_b: Some(mod_b),
            cleaning,
            ..Reading::default()
        }
    }

    fn dataset(groups: Vec<(&str, Vec<Reading>)>) -> Dataset {
        merge(
            groups
                .into_iter()
                .map(|(name, readings)| {
                    let country = Country::from(name);
                    let records = tag_country(readings, &country);
                    (country, records)
                })
                .collect(),
        )
    }

    fn one_row_each() -> Dataset {
        dataset(vec![
            ("Benin", vec![reading(0, 500.0, None, 0.0, 0.0)]),
            ("Sierra Leone", vec![reading(0, 300.0, None, 0.0, 0.0)]),
            ("Togo", vec![reading(0, 400.0, None, 0.0, 0.0)]),
        ])
    }

    fn ranked(ranking: &[CountryMean]) -> Vec<(&str, f64)> {
        ranking.iter().map(|r| (r.country.name(), r.mean)).collect()
    }

    #[test]
    fn ranks_all_countries_by_mean_ghi() {
        let ds = one_row_each();
        let view = filter_by_country(&ds, &all_countries(&ds));
        let ranking = rank_by_metric_mean(&view, Metric::Ghi);
        assert_eq!(ranked(&ranking), [("Benin", 500.0), ("Togo", 400.0), ("Sierra Leone", 300.0)]);
    }

    #[test]
    fn ranks_single_selected_country() {
        let ds = one_row_each();
        let selected: CountrySelection = [Country::from("Togo")].into();
        let view = filter_by_country(&ds, &selected);
        assert_eq!(ranked(&rank_by_metric_mean(&view, Metric::Ghi)), [("Togo", 400.0)]);
    }

    #[test]
    fn ranking_is_descending_and_breaks_ties_by_name() {
        let ds = dataset(vec![
            ("Togo", vec![reading(0, 100.0, None, 0.0, 0.0), reading(1, 300.0, None, 0.0, 0.0)]),
            ("Benin", vec![reading(0, 200.0, None, 0.0, 0.0)]),
            ("Niger", vec![reading(0, 50.0, None, 0.0, 0.0), reading(1, 450.0, None, 0.0, 0.0)]),
        ]);
        let view = filter_by_country(&ds, &all_countries(&ds));
        let ranking = rank_by_metric_mean(&view, Metric::Ghi);
        assert_eq!(ranked(&ranking), [("Niger", 250.0), ("Benin", 200.0), ("Togo", 200.0)]);
        assert!(ranking.windows(2).all(|w| w[0].mean >= w[1].mean));
    }

    #[test]
    fn ranking_skips_missing_values_and_empty_groups() {
        let mut sparse = reading(1, 0.0, None, 0.0, 0.0);
        sparse.ghi = None;
        let mut no_ghi = reading(0, 0.0, None, 0.0, 0.0);
        no_ghi.ghi = None;
        let ds = dataset(vec![
            ("Benin", vec![reading(0, 10.0, None, 0.0, 0.0), sparse]),
            ("Togo", vec![no_ghi]),
        ]);
        let view = filter_by_country(&ds, &all_countries(&ds));
        assert_eq!(ranked(&rank_by_metric_mean(&view, Metric::Ghi)), [("Benin", 10.0)]);
        assert!(rank_by_metric_mean(&filter_by_country(&ds, &CountrySelection::new()), Metric::Ghi).is_empty());
    }

    #[test]
    fn cleaning_impact_not_applicable_when_flag_is_constant() {
        let no = Some(CleaningStatus::NoCleaning);
        let ds = dataset(vec![
            ("Benin", vec![reading(0, 1.0, no, 1.0, 1.0), reading(1, 1.0, no, 2.0, 2.0)]),
            ("Togo", vec![reading(0, 1.0, no, 3.0, 3.0)]),
        ]);
        let view = filter_by_country(&ds, &all_countries(&ds));
        assert_eq!(cleaning_impact(&view), CleaningImpact::NotApplicable { distinct: 1 });
    }

    #[test]
    fn cleaning_impact_not_applicable_without_flags() {
        let ds = one_row_each();
        let view = filter_by_country(&ds, &all_countries(&ds));
        let impact = cleaning_impact(&view);
        assert!(!impact.is_applicable());
        assert!(impact.rows().is_none());
    }

    #[test]
    fn cleaning_impact_groups_by_country_then_status() {
        let no = Some(CleaningStatus::NoCleaning);
        let yes = Some(CleaningStatus::CleaningOccurred);
        let ds = dataset(vec![
            ("Togo", vec![reading(0, 1.0, no, 100.0, 90.0), reading(1, 1.0, yes, 120.0, 110.0)]),
            (
                "Benin",
                vec![
                    reading(0, 1.0, yes, 200.0, 190.0),
                    reading(1, 1.0, no, 150.0, 140.0),
                    reading(2, 1.0, no, 170.0, 160.0),
                ],
            ),
        ]);
        let view = filter_by_country(&ds, &all_countries(&ds));
        let impact = cleaning_impact(&view);
        let rows = impact.rows().expect("two flags present");

        let keys: Vec<(&str, CleaningStatus)> = rows.iter().map(|r| (r.country.name(), r.status)).collect();
        assert_eq!(
            keys,
            [
                ("Benin", CleaningStatus::NoCleaning),
                ("Benin", CleaningStatus::CleaningOccurred),
                ("Togo", CleaningStatus::NoCleaning),
                ("Togo", CleaningStatus::CleaningOccurred),
            ]
        );
        assert_eq!(rows[0].mean_mod_a, 160.0);
        assert_eq!(rows[0].mean_mod_b, 150.0);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[3].mean_mod_a, 120.0);
    }

    #[test]
    fn cleaning_impact_follows_the_selection() {
        let no = Some(CleaningStatus::NoCleaning);
        let yes = Some(CleaningStatus::CleaningOccurred);
        let ds = dataset(vec![
            ("Benin", vec![reading(0, 1.0, no, 1.0, 1.0)]),
            ("Togo", vec![reading(0, 1.0, yes, 1.0, 1.0)]),
        ]);
        let both = filter_by_country(&ds, &all_countries(&ds));
        assert!(cleaning_impact(&both).is_applicable());

        let benin: CountrySelection = [Country::from("Benin")].into();
        assert!(!cleaning_impact(&filter_by_country(&ds, &benin)).is_applicable());
    }

    #[test]
    fn distribution_summary_quartiles_and_whiskers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let readings = values
            .iter()
            .enumerate()
            .map(|(i, v)| reading(i as u32, *v, None, 0.0, 0.0))
            .collect();
        let ds = dataset(vec![("Benin", readings)]);
        let view = filter_by_country(&ds, &all_countries(&ds));
        let summary = &distribution_summary(&view, Metric::Ghi)[0];

        assert_eq!(summary.count, 9);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.q3, 7.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.lower_whisker, 1.0);
        // 100 lies beyond q3 + 1.5 * IQR = 13
        assert_eq!(summary.upper_whisker, 8.0);
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 50.0), 25.0);
        assert_eq!(percentile(&sorted, 25.0), 17.5);
        assert_eq!(percentile(&[7.0], 75.0), 7.0);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn time_series_sorts_points_per_country() {
        let ds = dataset(vec![
            ("Benin", vec![reading(5, 50.0, None, 0.0, 0.0), reading(1, 10.0, None, 0.0, 0.0)]),
            ("Togo", vec![reading(2, 20.0, None, 0.0, 0.0)]),
        ]);
        let view = filter_by_country(&ds, &all_countries(&ds));
        let series = time_series(&view, Metric::Ghi);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].country.name(), "Benin");
        assert_eq!(series[0].points, vec![(at(1), 10.0), (at(5), 50.0)]);
        assert_eq!(series[1].points, vec![(at(2), 20.0)]);
    }
}
