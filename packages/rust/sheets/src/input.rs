//! Company list readers.

use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{Reader, open_workbook_auto};
use tracing::{info, instrument, warn};
use url::Url;

use dmfinder_shared::{Company, DmfinderError, Result};

use crate::sheet::{SheetRef, SheetsClient};

pub const DOMAIN_COLUMN: &str = "Domain";
pub const COMPANY_NAME_COLUMN: &str = "Company Name";

/// Where the company list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    GoogleSheet(SheetRef),
}

impl InputSource {
    /// Classify a CLI argument: `http(s)` URLs are Google Sheets, anything
    /// else is a local path.
    pub fn parse(source: &str) -> Result<Self> {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                Ok(Self::GoogleSheet(SheetRef::parse(source)?))
            }
            _ => Ok(Self::File(PathBuf::from(source))),
        }
    }
}

/// Read the company list from a file path or a public Google Sheet URL.
#[instrument(skip(sheets))]
pub async fn read_companies(source: &InputSource, sheets: &SheetsClient) -> Result<Vec<Company>> {
    let companies = match source {
        InputSource::GoogleSheet(sheet) => {
            let csv = sheets.export_csv(sheet).await?;
            companies_from_csv(csv.as_bytes())?
        }
        InputSource::File(path) => read_file(path)?,
    };
    info!(count = companies.len(), "companies loaded");
    Ok(companies)
}

fn read_file(path: &Path) -> Result<Vec<Company>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("csv") => {
            let file = std::fs::File::open(path).map_err(|e| DmfinderError::io(path, e))?;
            companies_from_csv(file)
        }
        Some("xlsx" | "xls") => companies_from_workbook(path),
        _ => Err(DmfinderError::validation(format!(
            "unsupported input format: {} (use .xlsx, .xls or .csv)",
            path.display()
        ))),
    }
}

/// Parse companies from CSV with a header row.
pub fn companies_from_csv(reader: impl Read) -> Result<Vec<Company>> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv
        .headers()
        .map_err(|e| DmfinderError::Input(format!("failed to read CSV header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record.map_err(|e| DmfinderError::Input(format!("bad CSV row: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    companies_from_rows(&headers, rows)
}

/// Parse companies from the first worksheet of an Excel workbook.
pub fn companies_from_workbook(path: &Path) -> Result<Vec<Company>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| DmfinderError::Input(format!("failed to open {}: {e}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DmfinderError::validation(format!("{} has no worksheets", path.display())))?
        .map_err(|e| DmfinderError::Input(format!("failed to read worksheet: {e}")))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();

    companies_from_rows(&headers, rows)
}

fn column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Map rows to companies by header name. Values are trimmed; rows missing a
/// domain or a company name are skipped.
fn companies_from_rows(
    headers: &[String],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<Vec<Company>> {
    let (Some(domain_idx), Some(name_idx)) = (
        column(headers, DOMAIN_COLUMN),
        column(headers, COMPANY_NAME_COLUMN),
    ) else {
        return Err(DmfinderError::validation(format!(
            "input must contain '{DOMAIN_COLUMN}' and '{COMPANY_NAME_COLUMN}' columns"
        )));
    };

    let mut companies = Vec::new();
    for (line, row) in rows.into_iter().enumerate() {
        let cell = |idx: usize| row.get(idx).map(|v| v.trim()).unwrap_or_default();
        let (domain, name) = (cell(domain_idx), cell(name_idx));

        match (domain.is_empty(), name.is_empty()) {
            (false, false) => companies.push(Company::new(domain, name)),
            (true, true) => {}
            _ => warn!(row = line + 2, domain, name, "skipping row with a missing field"),
        }
    }
    Ok(companies)
}
