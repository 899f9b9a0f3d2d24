//! Record fixtures shared by the data-layer unit tests.

use super::model::{Dataset, Record, RemoteKind};

/// A full-time, on-site record at a medium company.
pub fn record(year: i32, seniority: &str, job_title: &str, salary: f64, residence: &str) -> Record {
    Record {
        year,
        seniority: seniority.to_string(),
        contract: "FT".to_string(),
        job_title: job_title.to_string(),
        salary_usd: salary,
        residence: residence.to_string(),
        remote: RemoteKind::OnSite,
        company_size: "M".to_string(),
    }
}

/// The three-record scenario: two 2023 senior US records and one 2022 entry DE record.
pub fn scenario_dataset() -> Dataset {
    Dataset::from_records(vec![
        record(2023, "senior", "Data Scientist", 100_000.0, "US"),
        record(2023, "senior", "Data Engineer", 200_000.0, "US"),
        record(2022, "entry", "Data Analyst", 50_000.0, "DE"),
    ])
}

/// A mixed dataset touching every dimension and remote kind.
pub fn mixed_dataset() -> Dataset {
    Dataset::from_records(vec![
        Record {
            contract: "PT".into(),
            company_size: "S".into(),
            ..record(2021, "entry", "Data Analyst", 40_000.0, "BR")
        },
        Record {
            remote: RemoteKind::Remote,
            ..record(2022, "mid", "Data Analyst", 70_000.0, "US")
        },
        Record {
            remote: RemoteKind::Hybrid,
            company_size: "L".into(),
            ..record(2022, "senior", "Data Engineer", 150_000.0, "US")
        },
        Record {
            remote: RemoteKind::Remote,
            contract: "CT".into(),
            ..record(2023, "senior", "ML Engineer", 190_000.0, "CA")
        },
        Record {
            company_size: "L".into(),
            ..record(2023, "executive", "Head of Data", 250_000.0, "GB")
        },
        record(2023, "mid", "Data Engineer", 110_000.0, "CA"),
    ])
}
