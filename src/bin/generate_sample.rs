use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 2_000;

/// (code, base salary in USD)
const SENIORITY: [(&str, f64); 4] = [("EN", 65_000.0), ("MI", 95_000.0), ("SE", 145_000.0), ("EX", 195_000.0)];

/// (title, salary multiplier)
const TITLES: [(&str, f64); 10] = [
    ("Data Analyst", 0.70),
    ("Data Scientist", 1.00),
    ("Data Engineer", 1.00),
    ("Machine Learning Engineer", 1.15),
    ("Analytics Engineer", 0.90),
    ("Research Scientist", 1.10),
    ("Data Architect", 1.15),
    ("BI Developer", 0.75),
    ("Applied Scientist", 1.20),
    ("Head of Data", 1.30),
];

/// (ISO code, salary multiplier)
const COUNTRIES: [(&str, f64); 8] = [
    ("US", 1.00),
    ("CA", 0.80),
    ("GB", 0.70),
    ("DE", 0.65),
    ("ES", 0.45),
    ("BR", 0.30),
    ("IN", 0.25),
    ("PT", 0.40),
];

const CONTRACTS: [&str; 4] = ["FT", "FT", "FT", "CT"];
const SIZES: [&str; 3] = ["S", "M", "L"];
const REMOTE_RATIOS: [i64; 3] = [0, 50, 100];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Column-oriented synthetic rows, using the raw column names of the
/// published dataset.
#[derive(Default)]
struct Columns {
    work_year: Vec<i64>,
    experience_level: Vec<&'static str>,
    employment_type: Vec<&'static str>,
    job_title: Vec<&'static str>,
    salary_in_usd: Vec<f64>,
    employee_residence: Vec<&'static str>,
    remote_ratio: Vec<i64>,
    company_size: Vec<&'static str>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();
    for _ in 0..ROWS {
        let year = 2020 + (rng.next_u64() % 6) as i64;
        let &(level, base) = rng.pick(&SENIORITY);
        let &(title, title_mult) = rng.pick(&TITLES);
        let &(country, country_mult) = rng.pick(&COUNTRIES);
        // ~4% yearly drift plus log-normal noise
        let drift = 1.0 + 0.04 * (year - 2020) as f64;
        let noise = rng.gauss(0.0, 0.2).exp();
        let salary = (base * title_mult * country_mult * drift * noise).round().max(5_000.0);

        cols.work_year.push(year);
        cols.experience_level.push(level);
        cols.employment_type.push(*rng.pick(&CONTRACTS));
        cols.job_title.push(title);
        cols.salary_in_usd.push(salary);
        cols.employee_residence.push(country);
        cols.remote_ratio.push(*rng.pick(&REMOTE_RATIOS));
        cols.company_size.push(*rng.pick(&SIZES));
    }
    cols
}

fn write_parquet(cols: &Columns, path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("work_year", DataType::Int64, false),
        Field::new("experience_level", DataType::Utf8, false),
        Field::new("employment_type", DataType::Utf8, false),
        Field::new("job_title", DataType::Utf8, false),
        Field::new("salary_in_usd", DataType::Float64, false),
        Field::new("employee_residence", DataType::Utf8, false),
        Field::new("remote_ratio", DataType::Int64, false),
        Field::new("company_size", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(cols.work_year.clone())),
            Arc::new(StringArray::from(cols.experience_level.clone())),
            Arc::new(StringArray::from(cols.employment_type.clone())),
            Arc::new(StringArray::from(cols.job_title.clone())),
            Arc::new(Float64Array::from(cols.salary_in_usd.clone())),
            Arc::new(StringArray::from(cols.employee_residence.clone())),
            Arc::new(Int64Array::from(cols.remote_ratio.clone())),
            Arc::new(StringArray::from(cols.company_size.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(cols: &Columns, path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "work_year",
        "experience_level",
        "employment_type",
        "job_title",
        "salary_in_usd",
        "employee_residence",
        "remote_ratio",
        "company_size",
    ])?;
    for i in 0..cols.work_year.len() {
        writer.write_record([
            cols.work_year[i].to_string(),
            cols.experience_level[i].to_string(),
            cols.employment_type[i].to_string(),
            cols.job_title[i].to_string(),
            cols.salary_in_usd[i].to_string(),
            cols.employee_residence[i].to_string(),
            cols.remote_ratio[i].to_string(),
            cols.company_size[i].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);

    write_parquet(&cols, "sample_salaries.parquet")?;
    write_csv(&cols, "sample_salaries.csv")?;

    println!("Wrote {ROWS} salary records to sample_salaries.parquet and sample_salaries.csv");
    Ok(())
}
