//! Health dataset loading, numeric coercion, and the derived chronic-disease score

use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use once_cell::sync::OnceCell;
use polars::prelude::*;

/// Fixed location of the published health dataset
pub const HEALTH_DATA_URL: &str =
    "https://raw.githubusercontent.com/Akram-Kanaan/Visuals/main/Health.csv";

// Expected columns, matched exactly after header whitespace is stripped
const COL_REGION: &str = "refArea";
const COL_TOWN: &str = "Town";
const COL_CASES: &str = "Nb of Covid-19 cases";
const COL_PCT: &str = "Percentage of cases out of national total";
const COL_HYPERTENSION: &str = "Existence of chronic diseases - Hypertension";
const COL_CARDIO: &str = "Existence of chronic diseases - Cardiovascular disease";
const COL_DIABETES: &str = "Existence of chronic diseases - Diabetes";

/// One row of the health dataset: a single town's statistics
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Governorate/district the town belongs to
    pub region: String,
    pub town: String,
    /// Number of COVID-19 cases; `None` when the raw cell is not numeric
    pub case_count: Option<f64>,
    /// Percentage of cases out of the national total; same coercion policy
    pub pct_of_national: Option<f64>,
    pub hypertension: f64,
    pub cardiovascular: f64,
    pub diabetes: f64,
}

impl Record {
    /// Composite chronic-disease score, recomputed from the three indicators
    /// on every call so it can never go stale
    pub fn chronic_disease_score(&self) -> f64 {
        self.hypertension + self.cardiovascular + self.diabetes
    }
}

/// The full in-memory dataset, immutable after load
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset directly from records; the loader is the normal entry point
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// All records in original file order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct regions in first-occurrence order
    pub fn distinct_regions(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Distinct towns in first-occurrence order
    pub fn distinct_towns(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.town.as_str()))
    }

    /// Largest known case count, ignoring rows whose count failed coercion.
    /// The UI uses `floor` of this as the upper bound of the case-range control.
    pub fn max_case_count(&self) -> Option<f64> {
        self.records
            .iter()
            .filter_map(|r| r.case_count)
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

/// Load the health dataset from a remote URL or a local file path
///
/// # Arguments
/// * `source` - `http(s)://` URL or a filesystem path to the CSV
///
/// # Returns
/// * `Dataset` with exactly one `Record` per data row of the CSV
pub fn load_health_data(source: &str) -> crate::Result<Dataset> {
    let raw = fetch_raw(source)?;
    parse_dataset(&raw)
}

fn fetch_raw(source: &str) -> crate::Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::blocking::get(source)
            .with_context(|| format!("failed to fetch dataset from {}", source))?
            .error_for_status()
            .with_context(|| format!("dataset request to {} was rejected", source))?;
        response
            .text()
            .with_context(|| format!("failed to read dataset body from {}", source))
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("failed to read dataset file {}", source))
    }
}

/// Parse CSV text into a `Dataset`
///
/// Every data row yields exactly one record: cells of the two count columns
/// that fail numeric parsing become `None` rather than dropping the row.
/// A missing expected column, a null region/town, or a non-numeric
/// chronic-disease indicator fails the whole load.
pub fn parse_dataset(raw: &str) -> crate::Result<Dataset> {
    // Schema inference is disabled so every column arrives as text and the
    // invalid-to-null coercion below is the only policy in effect
    let cursor = Cursor::new(raw.as_bytes().to_vec());
    let mut df = CsvReader::new(cursor)
        .has_header(true)
        .infer_schema(Some(0))
        .finish()
        .context("failed to parse dataset CSV")?;

    let stripped: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.trim().to_string())
        .collect();
    df.set_column_names(&stripped)?;

    let regions = text_cells(&df, COL_REGION)?;
    let towns = text_cells(&df, COL_TOWN)?;
    let cases = numeric_cells(&df, COL_CASES)?;
    let pcts = numeric_cells(&df, COL_PCT)?;
    let hypertension = numeric_cells(&df, COL_HYPERTENSION)?;
    let cardiovascular = numeric_cells(&df, COL_CARDIO)?;
    let diabetes = numeric_cells(&df, COL_DIABETES)?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        records.push(Record {
            region: key_cell(&regions[row], COL_REGION, row)?,
            town: key_cell(&towns[row], COL_TOWN, row)?,
            case_count: cases[row],
            pct_of_national: pcts[row],
            hypertension: indicator_cell(hypertension[row], COL_HYPERTENSION, row)?,
            cardiovascular: indicator_cell(cardiovascular[row], COL_CARDIO, row)?,
            diabetes: indicator_cell(diabetes[row], COL_DIABETES, row)?,
        });
    }

    Ok(Dataset { records })
}

fn column<'a>(df: &'a DataFrame, name: &str) -> crate::Result<&'a Series> {
    df.column(name)
        .with_context(|| format!("expected column {:?} is missing from the dataset", name))
}

fn text_cells(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<String>>> {
    Ok(column(df, name)?
        .utf8()?
        .into_iter()
        .map(|cell| cell.map(str::to_string))
        .collect())
}

fn numeric_cells(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<f64>>> {
    // Non-strict cast: a cell that fails numeric parsing becomes null
    Ok(column(df, name)?
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .collect())
}

fn key_cell(value: &Option<String>, name: &str, row: usize) -> crate::Result<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .with_context(|| format!("data row {}: grouping column {:?} is empty", row + 1, name))
}

// Missing indicators are an upstream data-quality problem, not zeroes
fn indicator_cell(value: Option<f64>, name: &str, row: usize) -> crate::Result<f64> {
    value.with_context(|| format!("data row {}: indicator {:?} is not numeric", row + 1, name))
}

/// Owns the dataset for the lifetime of the process.
///
/// The slot is populated on first access and every later call returns the
/// same shared value without re-fetching. `refresh` drops the cached value
/// and reloads from the source, which is the only way to observe new data.
#[derive(Debug)]
pub struct HealthContext {
    source: String,
    slot: OnceCell<Arc<Dataset>>,
}

impl HealthContext {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            slot: OnceCell::new(),
        }
    }

    /// Context backed by the published dataset location
    pub fn remote() -> Self {
        Self::new(HEALTH_DATA_URL)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The loaded dataset, fetching it on first access only
    pub fn dataset(&self) -> crate::Result<Arc<Dataset>> {
        let dataset = self
            .slot
            .get_or_try_init(|| load_health_data(&self.source).map(Arc::new))?;
        Ok(Arc::clone(dataset))
    }

    /// Drop the cached dataset and load it again from the source
    pub fn refresh(&mut self) -> crate::Result<Arc<Dataset>> {
        self.slot.take();
        self.dataset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "refArea ,Town, Nb of Covid-19 cases,Percentage of cases out of national total,Existence of chronic diseases - Hypertension,Existence of chronic diseases - Cardiovascular disease,Existence of chronic diseases - Diabetes";

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Beirut,Achrafieh,50,10,1,0,1").unwrap();
        writeln!(file, "Beirut,Hamra,150,5,1,0,0").unwrap();
        writeln!(file, "Bekaa,Zahle,30,n/a,0,0,0").unwrap();
        writeln!(file, "Bekaa,Anjar,unknown,2,1,1,1").unwrap();
        file
    }

    #[test]
    fn test_load_preserves_every_row() {
        let file = create_test_csv();
        let dataset = load_health_data(file.path().to_str().unwrap()).unwrap();
        assert_eq!(dataset.len(), 4);
    }

    #[test]
    fn test_header_whitespace_stripped() {
        // "refArea " and " Nb of Covid-19 cases" only match after stripping
        let file = create_test_csv();
        let dataset = load_health_data(file.path().to_str().unwrap()).unwrap();
        assert_eq!(dataset.distinct_regions(), vec!["Beirut", "Bekaa"]);
    }

    #[test]
    fn test_coercion_failure_becomes_null_and_keeps_row() {
        let file = create_test_csv();
        let dataset = load_health_data(file.path().to_str().unwrap()).unwrap();
        let records = dataset.records();

        assert_eq!(records[2].pct_of_national, None);
        assert_eq!(records[2].case_count, Some(30.0));
        assert_eq!(records[3].case_count, None);
        assert_eq!(records[3].town, "Anjar");
    }

    #[test]
    fn test_chronic_disease_score_is_indicator_sum() {
        let file = create_test_csv();
        let dataset = load_health_data(file.path().to_str().unwrap()).unwrap();
        let records = dataset.records();

        assert_eq!(records[0].chronic_disease_score(), 2.0);
        assert_eq!(records[2].chronic_disease_score(), 0.0);
        assert_eq!(records[3].chronic_disease_score(), 3.0);
    }

    #[test]
    fn test_missing_expected_column_fails_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "refArea,Town,Nb of Covid-19 cases").unwrap();
        writeln!(file, "Beirut,Achrafieh,50").unwrap();

        let err = load_health_data(file.path().to_str().unwrap()).unwrap_err();
        assert!(err
            .to_string()
            .contains("Percentage of cases out of national total"));
    }

    #[test]
    fn test_non_numeric_indicator_fails_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Beirut,Achrafieh,50,10,yes,0,1").unwrap();

        let err = load_health_data(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Hypertension"));
    }

    #[test]
    fn test_empty_town_cell_fails_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Beirut,,50,10,1,0,1").unwrap();

        assert!(load_health_data(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_max_case_count_ignores_nulls() {
        let file = create_test_csv();
        let dataset = load_health_data(file.path().to_str().unwrap()).unwrap();
        assert_eq!(dataset.max_case_count(), Some(150.0));
    }

    #[test]
    fn test_context_loads_once() {
        let file = create_test_csv();
        let ctx = HealthContext::new(file.path().to_str().unwrap());

        let first = ctx.dataset().unwrap();
        let second = ctx.dataset().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_refresh_reloads_from_source() {
        let file = create_test_csv();
        let mut ctx = HealthContext::new(file.path().to_str().unwrap());

        let first = ctx.dataset().unwrap();
        let refreshed = ctx.refresh().unwrap();
        assert!(!Arc::ptr_eq(&first, &refreshed));
        assert_eq!(*first, *refreshed);
    }
}
