/// Data layer: records, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  remote CSV / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + rename columns → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, dimension keys, domains
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  selection per dimension → Subset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────────┐
///   │ metrics │  views    │  summary cards, chart-ready tables
///   └────────────────────┘
/// ```
///
/// `pipeline` ties the stages together for one selection.

pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod stats;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;
