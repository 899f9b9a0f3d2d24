use std::collections::{BTreeMap, BTreeSet};

use super::model::{CategoryValue, Dataset, Dimension, Record};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state: maps dimension → set of allowed values.
/// A dimension that is absent or maps to an empty set admits no records.
pub type FilterSelection = BTreeMap<Dimension, BTreeSet<CategoryValue>>;

/// Initialise a [`FilterSelection`] with every value selected (show everything).
pub fn init_selection(dataset: &Dataset) -> FilterSelection {
    dataset
        .domains()
        .iter()
        .map(|(dim, vals)| (*dim, vals.clone()))
        .collect()
}

/// Return indices of records that pass every dimension's membership test,
/// in dataset order.
///
/// A record passes a dimension when its value is in the selected set.
/// Dimensions whose selection covers the whole domain are skipped up front.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    let mut active: Vec<(Dimension, &BTreeSet<CategoryValue>)> = Vec::new();
    for dim in Dimension::ALL {
        let selected = match selection.get(&dim) {
            Some(set) if !set.is_empty() => set,
            // Nothing selected for this dimension → hide everything
            _ => return Vec::new(),
        };
        if selected.is_superset(dataset.domain(dim)) {
            continue; // everything selected, no filtering needed
        }
        active.push((dim, selected));
    }

    (0..dataset.len())
        .filter(|&idx| {
            active
                .iter()
                .all(|(dim, selected)| selected.contains(dataset.key(idx, *dim)))
        })
        .collect()
}

/// Apply `selection` to `dataset`.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> Subset<'a> {
    Subset {
        dataset,
        indices: filtered_indices(dataset, selection),
    }
}

// ---------------------------------------------------------------------------
// Subset – the filtered view over a dataset
// ---------------------------------------------------------------------------

/// The records of a dataset that passed a filter, in original order.
#[derive(Debug, Clone)]
pub struct Subset<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> Subset<'a> {
    /// A subset containing every record.
    pub fn all(dataset: &'a Dataset) -> Self {
        Subset {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// Salaries in subset order.
    pub fn salaries(&self) -> Vec<f64> {
        self.records().map(|r| r.salary_usd).collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{mixed_dataset, scenario_dataset};

    fn passes(rec: &Record, selection: &FilterSelection) -> bool {
        Dimension::ALL.iter().all(|dim| {
            selection
                .get(dim)
                .is_some_and(|set| set.contains(&rec.dimension_value(*dim)))
        })
    }

    #[test]
    fn full_selection_returns_whole_dataset() {
        let ds = mixed_dataset();
        let sel = init_selection(&ds);
        let subset = filter(&ds, &sel);
        assert_eq!(subset.indices(), (0..ds.len()).collect::<Vec<_>>().as_slice());
        let records: Vec<&Record> = subset.records().collect();
        let expected: Vec<&Record> = ds.records.iter().collect();
        assert_eq!(records, expected);
    }

    #[test]
    fn empty_set_on_any_dimension_yields_empty_subset() {
        let ds = mixed_dataset();
        for dim in Dimension::ALL {
            let mut sel = init_selection(&ds);
            sel.insert(dim, BTreeSet::new());
            assert!(filter(&ds, &sel).is_empty(), "{dim:?}");
        }
    }

    #[test]
    fn missing_dimension_admits_nothing() {
        let ds = mixed_dataset();
        let mut sel = init_selection(&ds);
        sel.remove(&Dimension::Contract);
        assert!(filtered_indices(&ds, &sel).is_empty());
    }

    #[test]
    fn filter_is_sound_and_complete() {
        let ds = mixed_dataset();
        let mut sel = init_selection(&ds);
        sel.insert(
            Dimension::Year,
            [CategoryValue::from(2022), CategoryValue::from(2023)].into(),
        );
        sel.insert(
            Dimension::Seniority,
            [CategoryValue::from("mid"), CategoryValue::from("senior")].into(),
        );
        sel.insert(Dimension::CompanySize, [CategoryValue::from("M")].into());

        let got = filtered_indices(&ds, &sel);
        let expected: Vec<usize> = ds
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| passes(r, &sel))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(got, expected);
        assert_eq!(got, vec![1, 3, 5]);
    }

    #[test]
    fn values_outside_the_domain_do_not_widen_the_filter() {
        let ds = mixed_dataset();
        let mut sel = init_selection(&ds);
        sel.insert(
            Dimension::Seniority,
            [CategoryValue::from("intern"), CategoryValue::from("entry")].into(),
        );
        assert_eq!(filtered_indices(&ds, &sel), vec![0]);
    }

    #[test]
    fn scenario_year_filter() {
        let ds = scenario_dataset();
        let mut sel = init_selection(&ds);
        sel.insert(Dimension::Year, [CategoryValue::from(2023)].into());
        let subset = filter(&ds, &sel);
        assert_eq!(subset.len(), 2);
        assert_eq!(subset.salaries(), vec![100_000.0, 200_000.0]);
    }
}
