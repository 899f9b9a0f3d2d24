use std::collections::BTreeMap;

use super::filter::Subset;
use super::stats;

/// Headline figures for the metric cards.
///
/// An empty subset produces the zero summary instead of an error so the
/// dashboard keeps rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalarySummary {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub median: f64,
    pub count: usize,
    /// Most frequent job title; ties go to the lexicographically smallest title.
    pub top_job: String,
}

impl SalarySummary {
    pub fn from_subset(subset: &Subset<'_>) -> Self {
        let salaries = subset.salaries();
        if salaries.is_empty() {
            return SalarySummary::default();
        }

        let max = salaries.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = salaries.iter().copied().fold(f64::INFINITY, f64::min);

        SalarySummary {
            mean: stats::mean(&salaries).unwrap_or(0.0),
            max,
            min,
            median: stats::median(&salaries).unwrap_or(0.0),
            count: salaries.len(),
            top_job: most_frequent_title(subset),
        }
    }
}

fn most_frequent_title(subset: &Subset<'_>) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for rec in subset.records() {
        *counts.entry(rec.job_title.as_str()).or_default() += 1;
    }
    // BTreeMap iterates titles ascending; keep the first one at the highest count.
    let mut best: Option<(&str, usize)> = None;
    for (title, n) in counts {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((title, n));
        }
    }
    best.map(|(t, _)| t.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, init_selection};
    use crate::data::model::{CategoryValue, Dataset, Dimension};
    use crate::data::test_support::{record, scenario_dataset};
    use std::collections::BTreeSet;

    #[test]
    fn empty_subset_reports_zeros() {
        let ds = scenario_dataset();
        let mut sel = init_selection(&ds);
        sel.insert(Dimension::Seniority, BTreeSet::new());
        let summary = SalarySummary::from_subset(&filter(&ds, &sel));
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.max, 0.0);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.median, 0.0);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.top_job, "");
    }

    #[test]
    fn single_record_summary_is_that_record() {
        let ds = Dataset::from_records(vec![record(2024, "mid", "BI Analyst", 73_500.0, "PT")]);
        let summary = SalarySummary::from_subset(&Subset::all(&ds));
        assert_eq!(summary.mean, 73_500.0);
        assert_eq!(summary.max, 73_500.0);
        assert_eq!(summary.min, 73_500.0);
        assert_eq!(summary.median, 73_500.0);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.top_job, "BI Analyst");
    }

    #[test]
    fn scenario_mean_and_median() {
        let ds = scenario_dataset();
        let mut sel = init_selection(&ds);
        sel.insert(Dimension::Year, [CategoryValue::from(2023)].into());
        let summary = SalarySummary::from_subset(&filter(&ds, &sel));
        assert_eq!(summary.count, 2);
        assert_eq!(summary.mean, 150_000.0);
        assert_eq!(summary.median, 150_000.0);
        assert_eq!(summary.max, 200_000.0);
        assert_eq!(summary.min, 100_000.0);
    }

    #[test]
    fn mode_ties_break_alphabetically() {
        let ds = Dataset::from_records(vec![
            record(2023, "mid", "Data Scientist", 1.0, "US"),
            record(2023, "mid", "Analytics Engineer", 2.0, "US"),
            record(2023, "mid", "Data Scientist", 3.0, "US"),
            record(2023, "mid", "Analytics Engineer", 4.0, "US"),
            record(2023, "mid", "Data Engineer", 5.0, "US"),
        ]);
        let summary = SalarySummary::from_subset(&Subset::all(&ds));
        assert_eq!(summary.top_job, "Analytics Engineer");
    }
}
