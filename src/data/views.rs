//! The catalog of chart-ready aggregations.
//!
//! Every view is a pure function of a [`Subset`]; [`evaluate`] wraps them
//! with the shared empty-subset and insufficient-data handling.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use super::filter::Subset;
use super::model::{Record, RemoteKind};
use super::stats::{self, BoxStats};

/// Rows kept by the top-N rankings.
pub const TOP_N: usize = 10;
/// Equal-width bins in the salary histogram.
pub const HISTOGRAM_BINS: usize = 30;
/// Job titles shown in the heatmap (most frequent first).
pub const HEATMAP_JOBS: usize = 8;
/// Countries with fewer records are dropped from the country ranking.
pub const MIN_COUNTRY_RECORDS: usize = 2;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// How a view is meant to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    HorizontalBar,
    Histogram,
    BoxPlot,
    Scatter,
    Line,
    Donut,
    Heatmap,
    GroupedBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewKind {
    TopJobs,
    SalaryDistribution,
    SalaryBySeniority,
    SeniorityScatter,
    YearlyEvolution,
    CompanySize,
    TopCountries,
    JobSeniorityHeatmap,
    RemoteProportion,
    RemoteSalary,
}

impl ViewKind {
    pub const ALL: [ViewKind; 10] = [
        ViewKind::TopJobs,
        ViewKind::SalaryDistribution,
        ViewKind::SalaryBySeniority,
        ViewKind::SeniorityScatter,
        ViewKind::YearlyEvolution,
        ViewKind::CompanySize,
        ViewKind::TopCountries,
        ViewKind::JobSeniorityHeatmap,
        ViewKind::RemoteProportion,
        ViewKind::RemoteSalary,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::TopJobs => "Top 10 job titles by mean salary",
            ViewKind::SalaryDistribution => "Annual salary distribution",
            ViewKind::SalaryBySeniority => "Salary distribution by seniority",
            ViewKind::SeniorityScatter => "Salaries by seniority",
            ViewKind::YearlyEvolution => "Salary evolution by year",
            ViewKind::CompanySize => "Records by company size",
            ViewKind::TopCountries => "Top 10 countries by mean salary",
            ViewKind::JobSeniorityHeatmap => "Mean salary: job title vs seniority",
            ViewKind::RemoteProportion => "Share of work types",
            ViewKind::RemoteSalary => "Salary by work type",
        }
    }

    pub fn chart(self) -> ChartKind {
        match self {
            ViewKind::TopJobs | ViewKind::TopCountries => ChartKind::HorizontalBar,
            ViewKind::SalaryDistribution => ChartKind::Histogram,
            ViewKind::SalaryBySeniority => ChartKind::BoxPlot,
            ViewKind::SeniorityScatter => ChartKind::Scatter,
            ViewKind::YearlyEvolution => ChartKind::Line,
            ViewKind::CompanySize | ViewKind::RemoteProportion => ChartKind::Donut,
            ViewKind::JobSeniorityHeatmap => ChartKind::Heatmap,
            ViewKind::RemoteSalary => ChartKind::GroupedBar,
        }
    }
}

// ---------------------------------------------------------------------------
// Result shapes
// ---------------------------------------------------------------------------

/// Mean salary of one group (job title or country).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub key: String,
    pub mean: f64,
    pub count: usize,
}

/// Mean and median salary of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCenter {
    pub label: String,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyPoint {
    pub year: i32,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub seniority: String,
    pub salary: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeniorityDistribution {
    pub seniority: String,
    pub stats: BoxStats,
}

/// Equal-width salary histogram. Bin `i` covers
/// `[min + i·width, min + (i+1)·width)`, the last bin is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_range(&self, i: usize) -> (f64, f64) {
        let lo = self.min + i as f64 * self.bin_width;
        (lo, lo + self.bin_width)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Mean salary per (job title, seniority). `cells[row][col]` is `None` where
/// the combination has no records.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub jobs: Vec<String>,
    pub seniorities: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row)?.get(col).copied().flatten()
    }

    /// Smallest and largest populated cell.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Ranking(Vec<GroupMean>),
    Histogram(Histogram),
    Distributions(Vec<SeniorityDistribution>),
    Scatter(Vec<ScatterPoint>),
    Yearly(Vec<YearlyPoint>),
    Counts(Vec<CategoryCount>),
    Heatmap(Heatmap),
    Centers(Vec<GroupCenter>),
}

/// What the presentation layer receives for one view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutput {
    Ready(ViewData),
    /// The subset is empty.
    NoData,
    /// The subset has rows but not enough to draw this view meaningfully.
    InsufficientData(&'static str),
}

/// Run one view over `subset`.
pub fn evaluate(kind: ViewKind, subset: &Subset<'_>) -> ViewOutput {
    if subset.is_empty() {
        return ViewOutput::NoData;
    }
    let data = match kind {
        ViewKind::TopJobs => ViewData::Ranking(top_jobs(subset)),
        ViewKind::SalaryDistribution => {
            ViewData::Histogram(salary_histogram(subset, HISTOGRAM_BINS))
        }
        ViewKind::SalaryBySeniority => ViewData::Distributions(salary_by_seniority(subset)),
        ViewKind::SeniorityScatter => ViewData::Scatter(seniority_scatter(subset)),
        ViewKind::YearlyEvolution => {
            let points = yearly_evolution(subset);
            if points.len() < 2 {
                return ViewOutput::InsufficientData("Only one year of data in the current selection.");
            }
            ViewData::Yearly(points)
        }
        ViewKind::CompanySize => ViewData::Counts(company_size_counts(subset)),
        ViewKind::TopCountries => ViewData::Ranking(top_countries(subset)),
        ViewKind::JobSeniorityHeatmap => {
            ViewData::Heatmap(job_seniority_heatmap(subset, HEATMAP_JOBS))
        }
        ViewKind::RemoteProportion => ViewData::Counts(remote_proportion(subset)),
        ViewKind::RemoteSalary => ViewData::Centers(remote_salary(subset)),
    };
    ViewOutput::Ready(data)
}

// ---------------------------------------------------------------------------
// Grouping helpers
// ---------------------------------------------------------------------------

/// Salaries grouped by `key`, groups in ascending key order.
fn group_salaries<'a, K: Ord>(
    subset: &Subset<'a>,
    key: impl Fn(&'a Record) -> K,
) -> BTreeMap<K, Vec<f64>> {
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for rec in subset.records() {
        groups.entry(key(rec)).or_default().push(rec.salary_usd);
    }
    groups
}

/// Occurrence counts, most frequent first; ties keep first-seen order.
fn value_counts<K: Eq + Hash + Clone>(keys: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut position: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match position.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    // stable sort: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn group_means<K: ToString>(groups: BTreeMap<K, Vec<f64>>) -> Vec<GroupMean> {
    groups
        .into_iter()
        .map(|(key, salaries)| GroupMean {
            key: key.to_string(),
            mean: stats::mean(&salaries).unwrap_or(0.0),
            count: salaries.len(),
        })
        .collect()
}

/// Keep the `n` highest means, then order them ascending for display.
/// `rows` must arrive in key order; ties stay in key order both times.
fn top_by_mean(mut rows: Vec<GroupMean>, n: usize) -> Vec<GroupMean> {
    rows.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    rows.truncate(n);
    rows.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    rows
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Job titles with the highest mean salary, ascending by mean.
pub fn top_jobs(subset: &Subset<'_>) -> Vec<GroupMean> {
    let groups = group_salaries(subset, |r| r.job_title.as_str());
    top_by_mean(group_means(groups), TOP_N)
}

/// Bucket salaries into `bins` equal-width bins spanning the subset's range.
/// A zero-width range collapses into a single bin.
pub fn salary_histogram(subset: &Subset<'_>, bins: usize) -> Histogram {
    let salaries = subset.salaries();
    if salaries.is_empty() || bins == 0 {
        return Histogram {
            min: 0.0,
            bin_width: 0.0,
            counts: Vec::new(),
        };
    }
    let min = salaries.iter().copied().fold(f64::INFINITY, f64::min);
    let max = salaries.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return Histogram {
            min,
            bin_width: 0.0,
            counts: vec![salaries.len()],
        };
    }

    let bin_width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for s in salaries {
        let idx = (((s - min) / bin_width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Histogram {
        min,
        bin_width,
        counts,
    }
}

/// Box-plot statistics for each seniority level, levels ascending.
pub fn salary_by_seniority(subset: &Subset<'_>) -> Vec<SeniorityDistribution> {
    group_salaries(subset, |r| r.seniority.as_str())
        .into_iter()
        .filter_map(|(seniority, salaries)| {
            Some(SeniorityDistribution {
                seniority: seniority.to_string(),
                stats: BoxStats::from_values(&salaries)?,
            })
        })
        .collect()
}

pub fn seniority_scatter(subset: &Subset<'_>) -> Vec<ScatterPoint> {
    subset
        .records()
        .map(|r| ScatterPoint {
            seniority: r.seniority.clone(),
            salary: r.salary_usd,
        })
        .collect()
}

/// Mean and median salary per year, ascending by year.
pub fn yearly_evolution(subset: &Subset<'_>) -> Vec<YearlyPoint> {
    group_salaries(subset, |r| r.year)
        .into_iter()
        .map(|(year, salaries)| YearlyPoint {
            year,
            mean: stats::mean(&salaries).unwrap_or(0.0),
            median: stats::median(&salaries).unwrap_or(0.0),
        })
        .collect()
}

pub fn company_size_counts(subset: &Subset<'_>) -> Vec<CategoryCount> {
    value_counts(subset.records().map(|r| r.company_size.as_str()))
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// Residence countries with the highest mean salary, ascending by mean.
/// Countries with fewer than [`MIN_COUNTRY_RECORDS`] records are dropped
/// before ranking.
pub fn top_countries(subset: &Subset<'_>) -> Vec<GroupMean> {
    let mut rows = group_means(group_salaries(subset, |r| r.residence.as_str()));
    rows.retain(|row| row.count >= MIN_COUNTRY_RECORDS);
    top_by_mean(rows, TOP_N)
}

/// Mean salary matrix for the `n_jobs` most frequent job titles.
pub fn job_seniority_heatmap(subset: &Subset<'_>, n_jobs: usize) -> Heatmap {
    let top: BTreeSet<&str> = value_counts(subset.records().map(|r| r.job_title.as_str()))
        .into_iter()
        .take(n_jobs)
        .map(|(title, _)| title)
        .collect();

    let mut seniorities: BTreeSet<&str> = BTreeSet::new();
    let cell_salaries = group_salaries(subset, |r| (r.job_title.as_str(), r.seniority.as_str()));
    for (job, level) in cell_salaries.keys() {
        if top.contains(job) {
            seniorities.insert(*level);
        }
    }

    let cells = top
        .iter()
        .map(|&job| {
            seniorities
                .iter()
                .map(|&level| {
                    cell_salaries
                        .get(&(job, level))
                        .and_then(|salaries| stats::mean(salaries))
                })
                .collect()
        })
        .collect();

    Heatmap {
        jobs: top.iter().map(|s| s.to_string()).collect(),
        seniorities: seniorities.iter().map(|s| s.to_string()).collect(),
        cells,
    }
}

/// Record count per work type, most frequent first.
pub fn remote_proportion(subset: &Subset<'_>) -> Vec<CategoryCount> {
    value_counts(subset.records().map(|r| &r.remote))
        .into_iter()
        .map(|(kind, count)| CategoryCount {
            label: kind.to_string(),
            count,
        })
        .collect()
}

/// Mean and median salary per work type, in on-site/hybrid/remote order.
pub fn remote_salary(subset: &Subset<'_>) -> Vec<GroupCenter> {
    group_salaries(subset, |r| &r.remote)
        .into_iter()
        .map(|(kind, salaries): (&RemoteKind, Vec<f64>)| GroupCenter {
            label: kind.to_string(),
            mean: stats::mean(&salaries).unwrap_or(0.0),
            median: stats::median(&salaries).unwrap_or(0.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, init_selection};
    use crate::data::model::{CategoryValue, Dataset, Dimension, Record};
    use crate::data::test_support::{mixed_dataset, record, scenario_dataset};
    use std::collections::BTreeSet;

    #[test]
    fn every_view_reports_no_data_on_empty_subset() {
        let ds = mixed_dataset();
        let mut sel = init_selection(&ds);
        sel.insert(Dimension::Seniority, BTreeSet::new());
        let subset = filter(&ds, &sel);
        for kind in ViewKind::ALL {
            assert_eq!(evaluate(kind, &subset), ViewOutput::NoData, "{kind:?}");
        }
    }

    #[test]
    fn top_jobs_keeps_ten_highest_in_ascending_order() {
        let records: Vec<Record> = (0..12)
            .map(|i| record(2023, "mid", &format!("Job {i:02}"), 1_000.0 * (i + 1) as f64, "US"))
            .collect();
        let ds = Dataset::from_records(records);
        let rows = top_jobs(&Subset::all(&ds));
        assert_eq!(rows.len(), TOP_N);
        assert_eq!(rows.first().map(|r| r.key.as_str()), Some("Job 02"));
        assert_eq!(rows.last().map(|r| r.key.as_str()), Some("Job 11"));
        assert!(rows.windows(2).all(|w| w[0].mean <= w[1].mean));
    }

    #[test]
    fn top_jobs_ties_follow_title_order() {
        let ds = Dataset::from_records(vec![
            record(2023, "mid", "Zeta", 50.0, "US"),
            record(2023, "mid", "Alpha", 50.0, "US"),
            record(2023, "mid", "Mid", 10.0, "US"),
        ]);
        let keys: Vec<String> = top_jobs(&Subset::all(&ds)).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn histogram_spans_min_to_max_in_thirty_bins() {
        let ds = mixed_dataset();
        let hist = salary_histogram(&Subset::all(&ds), HISTOGRAM_BINS);
        assert_eq!(hist.counts.len(), 30);
        assert_eq!(hist.total(), ds.len());
        assert_eq!(hist.min, 40_000.0);
        assert_eq!(hist.bin_width, 7_000.0);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[29], 1);
        assert_eq!(hist.bin_range(1), (47_000.0, 54_000.0));
    }

    #[test]
    fn histogram_of_constant_salaries_is_one_bin() {
        let ds = Dataset::from_records(vec![
            record(2023, "mid", "A", 10.0, "US"),
            record(2023, "mid", "B", 10.0, "US"),
        ]);
        let hist = salary_histogram(&Subset::all(&ds), HISTOGRAM_BINS);
        assert_eq!(hist.counts, vec![2]);
        assert_eq!(hist.bin_width, 0.0);
    }

    #[test]
    fn distributions_per_seniority_are_sorted() {
        let ds = mixed_dataset();
        let dists = salary_by_seniority(&Subset::all(&ds));
        let levels: Vec<&str> = dists.iter().map(|d| d.seniority.as_str()).collect();
        assert_eq!(levels, vec!["entry", "executive", "mid", "senior"]);
        let senior = &dists[3].stats;
        assert_eq!((senior.min, senior.median, senior.max), (150_000.0, 170_000.0, 190_000.0));
    }

    #[test]
    fn scatter_keeps_every_record() {
        let ds = mixed_dataset();
        let points = seniority_scatter(&Subset::all(&ds));
        assert_eq!(points.len(), ds.len());
        assert_eq!(points[0], ScatterPoint { seniority: "entry".into(), salary: 40_000.0 });
    }

    #[test]
    fn yearly_evolution_needs_two_years() {
        let ds = scenario_dataset();
        let mut sel = init_selection(&ds);
        sel.insert(Dimension::Year, [CategoryValue::from(2023)].into());
        assert!(matches!(
            evaluate(ViewKind::YearlyEvolution, &filter(&ds, &sel)),
            ViewOutput::InsufficientData(_)
        ));

        let all = init_selection(&ds);
        match evaluate(ViewKind::YearlyEvolution, &filter(&ds, &all)) {
            ViewOutput::Ready(ViewData::Yearly(points)) => {
                assert_eq!(
                    points,
                    vec![
                        YearlyPoint { year: 2022, mean: 50_000.0, median: 50_000.0 },
                        YearlyPoint { year: 2023, mean: 150_000.0, median: 150_000.0 },
                    ]
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn company_sizes_count_most_frequent_first() {
        let ds = mixed_dataset();
        let counts = company_size_counts(&Subset::all(&ds));
        let got: Vec<(&str, usize)> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(got, vec![("M", 3), ("L", 2), ("S", 1)]);
    }

    #[test]
    fn top_countries_skip_single_observation_countries() {
        let ds = mixed_dataset();
        let rows = top_countries(&Subset::all(&ds));
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        // GB has the highest salary but only one record; BR likewise.
        assert_eq!(keys, vec!["US", "CA"]);
        assert_eq!(rows[0].mean, 110_000.0);
        assert_eq!(rows[1].mean, 150_000.0);
        assert!(rows.iter().all(|r| r.count >= MIN_COUNTRY_RECORDS));
    }

    #[test]
    fn heatmap_restricts_to_most_frequent_titles() {
        let ds = mixed_dataset();
        let map = job_seniority_heatmap(&Subset::all(&ds), 2);
        assert_eq!(map.jobs, vec!["Data Analyst", "Data Engineer"]);
        assert_eq!(map.seniorities, vec!["entry", "mid", "senior"]);
        assert_eq!(map.get(0, 0), Some(40_000.0));
        assert_eq!(map.get(0, 2), None);
        assert_eq!(map.get(1, 0), None);
        assert_eq!(map.get(1, 1), Some(110_000.0));
        assert_eq!(map.get(1, 2), Some(150_000.0));
        assert_eq!(map.value_range(), Some((40_000.0, 150_000.0)));
    }

    #[test]
    fn remote_views_use_canonical_labels() {
        let ds = mixed_dataset();
        let subset = Subset::all(&ds);
        let counts: Vec<(String, usize)> = remote_proportion(&subset)
            .into_iter()
            .map(|c| (c.label, c.count))
            .collect();
        assert_eq!(
            counts,
            vec![("on-site".to_string(), 3), ("remote".to_string(), 2), ("hybrid".to_string(), 1)]
        );

        let centers = remote_salary(&subset);
        let labels: Vec<&str> = centers.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["on-site", "hybrid", "remote"]);
        assert_eq!(centers[2].mean, 130_000.0);
        assert_eq!(centers[2].median, 130_000.0);
    }
}
