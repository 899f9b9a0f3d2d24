use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Field – the semantic columns of a salary record
// ---------------------------------------------------------------------------

/// The eight semantic columns every record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Year,
    Seniority,
    Contract,
    JobTitle,
    SalaryUsd,
    Residence,
    Remote,
    CompanySize,
}

impl Field {
    /// All fields in table order.
    pub const ALL: [Field; 8] = [
        Field::Year,
        Field::Seniority,
        Field::Contract,
        Field::JobTitle,
        Field::SalaryUsd,
        Field::Residence,
        Field::Remote,
        Field::CompanySize,
    ];

    /// Semantic column name used throughout the app and in exports.
    pub fn name(self) -> &'static str {
        match self {
            Field::Year => "year",
            Field::Seniority => "seniority",
            Field::Contract => "contract",
            Field::JobTitle => "job_title",
            Field::SalaryUsd => "salary_usd",
            Field::Residence => "residence",
            Field::Remote => "remote",
            Field::CompanySize => "company_size",
        }
    }

    /// Column name in the raw source dataset.
    pub fn raw_name(self) -> &'static str {
        match self {
            Field::Year => "work_year",
            Field::Seniority => "experience_level",
            Field::Contract => "employment_type",
            Field::JobTitle => "job_title",
            Field::SalaryUsd => "salary_in_usd",
            Field::Residence => "employee_residence",
            Field::Remote => "remote_ratio",
            Field::CompanySize => "company_size",
        }
    }

    /// Column name used by the published (localized) copy of the dataset.
    pub fn localized_name(self) -> &'static str {
        match self {
            Field::Year => "ano",
            Field::Seniority => "senioridade",
            Field::Contract => "contrato",
            Field::JobTitle => "cargo",
            Field::SalaryUsd => "usd",
            Field::Residence => "residencia",
            Field::Remote => "remoto",
            Field::CompanySize => "tamanho_empresa",
        }
    }

    /// Human readable column header.
    pub fn label(self) -> &'static str {
        match self {
            Field::Year => "Year",
            Field::Seniority => "Seniority",
            Field::Contract => "Contract",
            Field::JobTitle => "Job title",
            Field::SalaryUsd => "Salary (USD)",
            Field::Residence => "Residence",
            Field::Remote => "Work type",
            Field::CompanySize => "Company size",
        }
    }
}

// ---------------------------------------------------------------------------
// Dimension – the four filterable fields
// ---------------------------------------------------------------------------

/// A user-filterable categorical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Year,
    Seniority,
    Contract,
    CompanySize,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Year,
        Dimension::Seniority,
        Dimension::Contract,
        Dimension::CompanySize,
    ];

    /// Position of this dimension in [`Dataset`] key rows.
    pub fn index(self) -> usize {
        match self {
            Dimension::Year => 0,
            Dimension::Seniority => 1,
            Dimension::Contract => 2,
            Dimension::CompanySize => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Year => "Year",
            Dimension::Seniority => "Seniority",
            Dimension::Contract => "Contract type",
            Dimension::CompanySize => "Company size",
        }
    }
}

// ---------------------------------------------------------------------------
// CategoryValue – a single filterable cell
// ---------------------------------------------------------------------------

/// A filterable value. Integers sort numerically and text lexicographically,
/// which is the order the filter controls list them in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Integer(i) => write!(f, "{i}"),
            CategoryValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i32> for CategoryValue {
    fn from(v: i32) -> Self {
        CategoryValue::Integer(i64::from(v))
    }
}

impl From<&str> for CategoryValue {
    fn from(v: &str) -> Self {
        CategoryValue::Text(v.to_string())
    }
}

// ---------------------------------------------------------------------------
// RemoteKind – canonical remote-ratio category
// ---------------------------------------------------------------------------

/// Work arrangement, normalized once at load from either the numeric
/// remote-ratio codes (0/50/100) or an already-labelled string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RemoteKind {
    OnSite,
    Hybrid,
    Remote,
    /// Unrecognized code, kept in its raw string form.
    Other(String),
}

impl RemoteKind {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if let Ok(code) = s.parse::<f64>() {
            if code == 0.0 {
                return RemoteKind::OnSite;
            } else if code == 50.0 {
                return RemoteKind::Hybrid;
            } else if code == 100.0 {
                return RemoteKind::Remote;
            }
            return RemoteKind::Other(s.to_string());
        }
        match s.to_lowercase().as_str() {
            "on-site" | "onsite" | "on site" | "presencial" => RemoteKind::OnSite,
            "hybrid" | "híbrido" | "hibrido" => RemoteKind::Hybrid,
            "remote" | "remoto" => RemoteKind::Remote,
            _ => RemoteKind::Other(s.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RemoteKind::OnSite => "on-site",
            RemoteKind::Hybrid => "hybrid",
            RemoteKind::Remote => "remote",
            RemoteKind::Other(raw) => raw,
        }
    }
}

impl fmt::Display for RemoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for RemoteKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// One employment observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub year: i32,
    pub seniority: String,
    pub contract: String,
    pub job_title: String,
    pub salary_usd: f64,
    pub residence: String,
    pub remote: RemoteKind,
    pub company_size: String,
}

impl Record {
    /// The record's value along a filter dimension.
    pub fn dimension_value(&self, dim: Dimension) -> CategoryValue {
        match dim {
            Dimension::Year => CategoryValue::from(self.year),
            Dimension::Seniority => CategoryValue::Text(self.seniority.clone()),
            Dimension::Contract => CategoryValue::Text(self.contract.clone()),
            Dimension::CompanySize => CategoryValue::Text(self.company_size.clone()),
        }
    }

    /// Cell text for the detail table.
    pub fn display(&self, field: Field) -> String {
        match field {
            Field::Year => self.year.to_string(),
            Field::Seniority => self.seniority.clone(),
            Field::Contract => self.contract.clone(),
            Field::JobTitle => self.job_title.clone(),
            Field::SalaryUsd => format!("{:.0}", self.salary_usd),
            Field::Residence => self.residence.clone(),
            Field::Remote => self.remote.to_string(),
            Field::CompanySize => self.company_size.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed dimension keys and domains.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records in source order.
    pub records: Vec<Record>,
    /// Per record, its value for each [`Dimension`] (indexed by `Dimension::index`).
    keys: Vec<[CategoryValue; 4]>,
    /// For each dimension the sorted set of distinct values.
    domains: BTreeMap<Dimension, BTreeSet<CategoryValue>>,
}

impl Dataset {
    /// Build dimension keys and domains from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut domains: BTreeMap<Dimension, BTreeSet<CategoryValue>> = Dimension::ALL
            .iter()
            .map(|&dim| (dim, BTreeSet::new()))
            .collect();

        let keys: Vec<[CategoryValue; 4]> = records
            .iter()
            .map(|rec| Dimension::ALL.map(|dim| rec.dimension_value(dim)))
            .collect();

        for row in &keys {
            for dim in Dimension::ALL {
                domains
                    .entry(dim)
                    .or_default()
                    .insert(row[dim.index()].clone());
            }
        }

        Dataset {
            records,
            keys,
            domains,
        }
    }

    /// Sorted distinct values of a dimension across the full dataset.
    pub fn domain(&self, dim: Dimension) -> &BTreeSet<CategoryValue> {
        // from_records seeds every dimension
        &self.domains[&dim]
    }

    pub fn domains(&self) -> &BTreeMap<Dimension, BTreeSet<CategoryValue>> {
        &self.domains
    }

    /// Dimension key of the record at `idx`.
    pub fn key(&self, idx: usize, dim: Dimension) -> &CategoryValue {
        &self.keys[idx][dim.index()]
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::record;

    #[test]
    fn remote_codes_and_labels_normalize() {
        assert_eq!(RemoteKind::parse("0"), RemoteKind::OnSite);
        assert_eq!(RemoteKind::parse("50"), RemoteKind::Hybrid);
        assert_eq!(RemoteKind::parse("100"), RemoteKind::Remote);
        assert_eq!(RemoteKind::parse("100.0"), RemoteKind::Remote);
        assert_eq!(RemoteKind::parse("Presencial"), RemoteKind::OnSite);
        assert_eq!(RemoteKind::parse("Híbrido"), RemoteKind::Hybrid);
        assert_eq!(RemoteKind::parse(" remote "), RemoteKind::Remote);
        assert_eq!(RemoteKind::parse("25"), RemoteKind::Other("25".into()));
        assert_eq!(RemoteKind::parse("25").label(), "25");
        assert_eq!(RemoteKind::parse("sometimes").to_string(), "sometimes");
    }

    #[test]
    fn domains_are_sorted_and_distinct() {
        let ds = Dataset::from_records(vec![
            record(2024, "senior", "Data Engineer", 120_000.0, "US"),
            record(2022, "entry", "Data Analyst", 60_000.0, "DE"),
            record(2024, "mid", "Data Analyst", 80_000.0, "US"),
        ]);
        let years: Vec<_> = ds.domain(Dimension::Year).iter().cloned().collect();
        assert_eq!(years, vec![CategoryValue::from(2022), CategoryValue::from(2024)]);
        let levels: Vec<String> = ds
            .domain(Dimension::Seniority)
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(levels, vec!["entry", "mid", "senior"]);
    }

    #[test]
    fn empty_dataset_has_empty_domains() {
        let ds = Dataset::from_records(Vec::new());
        assert!(ds.is_empty());
        for dim in Dimension::ALL {
            assert!(ds.domain(dim).is_empty());
        }
    }

    #[test]
    fn integer_categories_sort_numerically() {
        let mut values = vec![CategoryValue::from(2100), CategoryValue::from(999)];
        values.sort();
        assert_eq!(values[0], CategoryValue::from(999));
    }
}
