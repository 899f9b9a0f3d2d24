use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::model::{Dataset, Field, Record, RemoteKind};

/// Published copy of the salary dataset.
pub const DATASET_URL: &str = "https://raw.githubusercontent.com/vqrca/dashboard_salarios_dados/refs/heads/main/dados-imersao-final.csv";

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a dataset could not be loaded. Any of these aborts the load as a whole.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetching {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("reading dataset file")]
    Io(#[from] std::io::Error),
    #[error("parsing CSV")]
    Csv(#[from] csv::Error),
    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),
    #[error("reading Parquet")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("decoding Arrow record batch")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("missing expected columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}: invalid {column} value '{value}'")]
    Malformed {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("JSON dataset must be an array of objects")]
    NotRecordArray,
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

static DEFAULT_DATASET: OnceLock<Arc<Dataset>> = OnceLock::new();

/// Load the published dataset once; later calls return the same instance.
pub fn load_default() -> Result<Arc<Dataset>, LoadError> {
    if let Some(ds) = DEFAULT_DATASET.get() {
        return Ok(Arc::clone(ds));
    }
    let dataset = load_url(DATASET_URL)?;
    log::info!("Loaded {} records from {DATASET_URL}", dataset.len());
    Ok(Arc::clone(DEFAULT_DATASET.get_or_init(|| Arc::new(dataset))))
}

/// Fetch a CSV over HTTP(S) and parse it.
pub fn load_url(url: &str) -> Result<Dataset, LoadError> {
    let fetch_error = |source: reqwest::Error| LoadError::Fetch {
        url: url.to_string(),
        source,
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(fetch_error)?;
    let body = client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(fetch_error)?;
    parse_csv(&body[..])
}

/// Load a dataset from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line
/// * `.json`    – `[{ "work_year": 2023, "salary_in_usd": 85000, ... }, ...]`
/// * `.parquet` – one column per field, any primitive or string type
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => parse_csv(BufReader::new(File::open(path)?)),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Write records as CSV with semantic column names.
pub fn write_csv<'a, W: Write>(
    records: impl IntoIterator<Item = &'a Record>,
    writer: W,
) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for rec in records {
        out.serialize(rec)?;
    }
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Column mapping and row validation
// ---------------------------------------------------------------------------

/// A header names `field` if it equals the raw, semantic or localized name.
fn header_matches(header: &str, field: Field) -> bool {
    let h = header.trim();
    [field.raw_name(), field.name(), field.localized_name()]
        .iter()
        .any(|name| h.eq_ignore_ascii_case(name))
}

/// Position of each [`Field`] (in `Field::ALL` order) among `headers`.
fn resolve_columns<S: AsRef<str>>(headers: &[S]) -> Result<[usize; 8], LoadError> {
    let mut positions = [0usize; 8];
    let mut missing = Vec::new();
    for (slot, field) in Field::ALL.iter().enumerate() {
        match headers.iter().position(|h| header_matches(h.as_ref(), *field)) {
            Some(idx) => positions[slot] = idx,
            None => missing.push(field.raw_name().to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }
    Ok(positions)
}

fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    (f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX)).then_some(f as i32)
}

fn parse_salary(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Build a record from cells in `Field::ALL` order. `row` is 1-based.
fn record_from_cells(cells: [&str; 8], row: usize) -> Result<Record, LoadError> {
    let [year, seniority, contract, job_title, salary, residence, remote, company_size] =
        cells.map(str::trim);
    let malformed = |field: Field, value: &str| LoadError::Malformed {
        row,
        column: field.name(),
        value: value.to_string(),
    };

    Ok(Record {
        year: parse_year(year).ok_or_else(|| malformed(Field::Year, year))?,
        seniority: seniority.to_string(),
        contract: contract.to_string(),
        job_title: job_title.to_string(),
        salary_usd: parse_salary(salary).ok_or_else(|| malformed(Field::SalaryUsd, salary))?,
        residence: residence.to_string(),
        remote: RemoteKind::parse(remote),
        company_size: company_size.to_string(),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV text with a header row. Columns are located through the static
/// rename table; extra columns are ignored.
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let columns = resolve_columns(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let cells = columns.map(|idx| row.get(idx).unwrap_or(""));
        records.push(record_from_cells(cells, row_no + 1)?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "work_year": 2023, "experience_level": "SE", "salary_in_usd": 85000, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let rows = root.as_array().ok_or(LoadError::NotRecordArray)?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or(LoadError::NotRecordArray)?;
        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        let columns = resolve_columns(&keys)?;
        let texts = columns.map(|idx| json_cell_text(obj, keys[idx]));
        let cells = std::array::from_fn(|f| texts[f].as_str());
        records.push(record_from_cells(cells, i + 1)?);
    }

    Ok(Dataset::from_records(records))
}

fn json_cell_text(obj: &Map<String, JsonValue>, key: &str) -> String {
    match obj.get(key) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose columns follow the same naming as the CSV.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let columns = resolve_columns(&names)?;

        for row in 0..batch.num_rows() {
            let row_no = records.len() + 1;
            let mut texts: [String; 8] = Default::default();
            for (slot, &col_idx) in columns.iter().enumerate() {
                let col = batch.column(col_idx);
                texts[slot] = arrow_cell_text(col, row).ok_or_else(|| LoadError::Malformed {
                    row: row_no,
                    column: Field::ALL[slot].name(),
                    value: format!("{:?}", col.data_type()),
                })?;
            }
            let cells = std::array::from_fn(|f| texts[f].as_str());
            records.push(record_from_cells(cells, row_no)?);
        }
    }

    Ok(Dataset::from_records(records))
}

/// Render one Arrow cell as text; `None` for unsupported column types.
fn arrow_cell_text(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return Some(String::new());
    }
    let any = col.as_any();
    let text = match col.data_type() {
        DataType::Utf8 => any.downcast_ref::<StringArray>()?.value(row).to_string(),
        DataType::LargeUtf8 => any.downcast_ref::<LargeStringArray>()?.value(row).to_string(),
        DataType::Int32 => any.downcast_ref::<Int32Array>()?.value(row).to_string(),
        DataType::Int64 => any.downcast_ref::<Int64Array>()?.value(row).to_string(),
        DataType::Float32 => any.downcast_ref::<Float32Array>()?.value(row).to_string(),
        DataType::Float64 => any.downcast_ref::<Float64Array>()?.value(row).to_string(),
        DataType::Boolean => any.downcast_ref::<BooleanArray>()?.value(row).to_string(),
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    use arrow::datatypes::Schema;
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const RAW_CSV: &str = "\
work_year,experience_level,employment_type,job_title,salary,salary_currency,salary_in_usd,employee_residence,remote_ratio,company_location,company_size
2023,SE,FT,Data Scientist,180000,USD,180000,US,100,US,M
2022,EN,PT,Data Analyst,30000,EUR,32000,DE,0,DE,S
2023,MI,FT,ML Engineer,90000,USD,90000,CA,50,CA,L
";

    #[test]
    fn raw_columns_are_renamed() {
        let ds = parse_csv(RAW_CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        let first = &ds.records[0];
        assert_eq!(first.year, 2023);
        assert_eq!(first.seniority, "SE");
        assert_eq!(first.contract, "FT");
        assert_eq!(first.job_title, "Data Scientist");
        assert_eq!(first.salary_usd, 180_000.0);
        assert_eq!(first.residence, "US");
        assert_eq!(first.remote, RemoteKind::Remote);
        assert_eq!(first.company_size, "M");
        assert_eq!(ds.records[1].remote, RemoteKind::OnSite);
        assert_eq!(ds.records[2].remote, RemoteKind::Hybrid);
    }

    #[test]
    fn localized_columns_and_labels_are_accepted() {
        let csv = "\
ano,senioridade,contrato,cargo,usd,residencia,remoto,tamanho_empresa
2024.0,senior,integral,Engenheiro de Dados,150000.5,BR,Híbrido,grande
";
        let ds = parse_csv(csv.as_bytes()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.year, 2024);
        assert_eq!(rec.salary_usd, 150_000.5);
        assert_eq!(rec.remote, RemoteKind::Hybrid);
        assert_eq!(rec.company_size, "grande");
    }

    #[test]
    fn missing_columns_are_reported() {
        let csv = "work_year,job_title,salary_in_usd\n2023,Analyst,1000\n";
        match parse_csv(csv.as_bytes()) {
            Err(LoadError::MissingColumns(cols)) => assert_eq!(
                cols,
                vec![
                    "experience_level",
                    "employment_type",
                    "employee_residence",
                    "remote_ratio",
                    "company_size"
                ]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_values_name_row_and_column() {
        let csv = RAW_CSV.replace("32000", "-5");
        match parse_csv(csv.as_bytes()) {
            Err(LoadError::Malformed { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "salary_usd");
                assert_eq!(value, "-5");
            }
            other => panic!("unexpected {other:?}"),
        }

        let csv = RAW_CSV.replace("2022,", "twenty,");
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(LoadError::Malformed { column: "year", .. })
        ));
    }

    #[test]
    fn export_round_trips_through_csv() {
        let ds = parse_csv(RAW_CSV.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_csv(&ds.records, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with(
            "year,seniority,contract,job_title,salary_usd,residence,remote,company_size"
        ));
        assert!(text.contains(",Data Analyst,32000.0,DE,on-site,S"));
        let again = parse_csv(&buf[..]).unwrap();
        assert_eq!(again.records, ds.records);
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("salaries.csv");
        File::create(&csv_path).unwrap().write_all(RAW_CSV.as_bytes()).unwrap();
        assert_eq!(load_file(&csv_path).unwrap().len(), 3);

        let json_path = dir.path().join("salaries.json");
        let json = r#"[
            {"work_year": 2023, "experience_level": "SE", "employment_type": "FT",
             "job_title": "Data Scientist", "salary_in_usd": 120000,
             "employee_residence": "US", "remote_ratio": 100, "company_size": "L"}
        ]"#;
        File::create(&json_path).unwrap().write_all(json.as_bytes()).unwrap();
        let ds = load_file(&json_path).unwrap();
        assert_eq!(ds.records[0].salary_usd, 120_000.0);
        assert_eq!(ds.records[0].remote, RemoteKind::Remote);

        let txt_path = dir.path().join("salaries.txt");
        File::create(&txt_path).unwrap();
        assert!(matches!(
            load_file(&txt_path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn parquet_columns_of_mixed_types_load() {
        let schema = Arc::new(Schema::new(vec![
            arrow::datatypes::Field::new("work_year", DataType::Int64, false),
            arrow::datatypes::Field::new("experience_level", DataType::Utf8, false),
            arrow::datatypes::Field::new("employment_type", DataType::Utf8, false),
            arrow::datatypes::Field::new("job_title", DataType::Utf8, false),
            arrow::datatypes::Field::new("salary_in_usd", DataType::Float64, false),
            arrow::datatypes::Field::new("employee_residence", DataType::Utf8, false),
            arrow::datatypes::Field::new("remote_ratio", DataType::Int32, false),
            arrow::datatypes::Field::new("company_size", DataType::Utf8, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![2023, 2024])),
            Arc::new(StringArray::from(vec!["SE", "MI"])),
            Arc::new(StringArray::from(vec!["FT", "FT"])),
            Arc::new(StringArray::from(vec!["Data Engineer", "Data Analyst"])),
            Arc::new(Float64Array::from(vec![140_000.0, 75_000.0])),
            Arc::new(StringArray::from(vec!["US", "PT"])),
            Arc::new(Int32Array::from(vec![0, 50])),
            Arc::new(StringArray::from(vec!["L", "S"])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salaries.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].year, 2023);
        assert_eq!(ds.records[0].salary_usd, 140_000.0);
        assert_eq!(ds.records[1].remote, RemoteKind::Hybrid);
        assert_eq!(ds.records[1].residence, "PT");
    }
}
