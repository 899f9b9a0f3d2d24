use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::filter::{init_selection, FilterSelection};
use crate::data::loader;
use crate::data::model::{CategoryValue, Dataset, Dimension, Record};
use crate::data::pipeline::Dashboard;
use crate::data::views::ViewKind;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// Chart groups shown in the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    RolesExperience,
    Geography,
    WorkType,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::RolesExperience, Tab::Geography, Tab::WorkType];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::RolesExperience => "Roles & Experience",
            Tab::Geography => "Geography",
            Tab::WorkType => "Work Type",
        }
    }

    pub fn views(self) -> &'static [ViewKind] {
        match self {
            Tab::Overview => &[ViewKind::TopJobs, ViewKind::SalaryDistribution],
            Tab::RolesExperience => &[
                ViewKind::SalaryBySeniority,
                ViewKind::SeniorityScatter,
                ViewKind::YearlyEvolution,
                ViewKind::CompanySize,
            ],
            Tab::Geography => &[ViewKind::TopCountries, ViewKind::JobSeniorityHeatmap],
            Tab::WorkType => &[ViewKind::RemoteProportion, ViewKind::RemoteSalary],
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset, never mutated.
    pub dataset: Arc<Dataset>,

    /// Per-dimension filter selections.
    pub selection: FilterSelection,

    /// Summary and view outputs for the current selection.
    pub dashboard: Dashboard,

    /// Colours for seniority levels, shared by the box and scatter plots.
    pub seniority_colors: ColorMap,

    /// Active chart tab.
    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let mut state = Self {
            selection: init_selection(&dataset),
            seniority_colors: ColorMap::new(dataset.domain(Dimension::Seniority)),
            dataset,
            dashboard: Dashboard::default(),
            tab: Tab::default(),
            status_message: None,
        };
        state.refilter();
        state
    }

    /// Ingest a dataset, reset filters to everything selected and recompute.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.selection = init_selection(&dataset);
        self.seniority_colors = ColorMap::new(dataset.domain(Dimension::Seniority));
        self.dataset = dataset;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the dashboard after a filter change.
    pub fn refilter(&mut self) {
        self.dashboard = Dashboard::compute(&self.dataset, &self.selection);
        log::debug!(
            "{} of {} records visible",
            self.dashboard.indices.len(),
            self.dataset.len()
        );
    }

    /// Records passing the current filters, in dataset order.
    pub fn visible_records(&self) -> impl Iterator<Item = &Record> + '_ {
        self.dashboard
            .indices
            .iter()
            .map(move |&i| &self.dataset.records[i])
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &CategoryValue) {
        let selected = self.selection.entry(dim).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select all values of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        self.selection.insert(dim, self.dataset.domain(dim).clone());
        self.refilter();
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.selection.insert(dim, BTreeSet::new());
        self.refilter();
    }

    /// Replace the dataset with a local file. On failure the current dataset
    /// stays and the error is shown in the status line.
    pub fn open_file(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => {
                log::info!("Loaded {} records from {}", dataset.len(), path.display());
                self.set_dataset(Arc::new(dataset));
            }
            Err(e) => {
                let e = anyhow::Error::new(e).context(format!("opening {}", path.display()));
                log::warn!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Write the filtered records to `path` as CSV.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        loader::write_csv(self.visible_records(), BufWriter::new(file))
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
