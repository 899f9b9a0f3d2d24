use std::collections::BTreeMap;

use super::filter::{filter, FilterSelection};
use super::metrics::SalarySummary;
use super::model::Dataset;
use super::views::{self, ViewKind, ViewOutput};

/// Compute a single view for `selection` from scratch.
pub fn compute_view(dataset: &Dataset, selection: &FilterSelection, kind: ViewKind) -> ViewOutput {
    views::evaluate(kind, &filter(dataset, selection))
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Indices of the filtered records, in dataset order.
    pub indices: Vec<usize>,
    pub summary: SalarySummary,
    pub views: BTreeMap<ViewKind, ViewOutput>,
}

impl Dashboard {
    pub fn compute(dataset: &Dataset, selection: &FilterSelection) -> Self {
        let subset = filter(dataset, selection);
        let summary = SalarySummary::from_subset(&subset);
        let views = ViewKind::ALL
            .iter()
            .map(|&kind| (kind, views::evaluate(kind, &subset)))
            .collect();
        Dashboard {
            indices: subset.into_indices(),
            summary,
            views,
        }
    }

    pub fn view(&self, kind: ViewKind) -> &ViewOutput {
        self.views.get(&kind).unwrap_or(&ViewOutput::NoData)
    }
}
