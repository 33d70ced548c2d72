//! Contact CSV writer and output naming.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use dmfinder_shared::{Contact, DmfinderError, Result};

use crate::input::InputSource;
use crate::sheet::SheetsClient;

/// Output file used when none is given and the input is a local file.
pub const DEFAULT_OUTPUT: &str = "output.csv";

/// Reduce a title to a file stem: keep word characters, spaces and
/// hyphens, then turn spaces into underscores.
pub fn sanitize_file_stem(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    kept.trim().replace(' ', "_")
}

/// Output path when the user gave none: the sheet's title for Google
/// Sheets, `output.csv` otherwise.
pub async fn default_output_path(source: &InputSource, sheets: &SheetsClient) -> PathBuf {
    match source {
        InputSource::File(_) => PathBuf::from(DEFAULT_OUTPUT),
        InputSource::GoogleSheet(sheet) => {
            let stem = sanitize_file_stem(&sheets.title(sheet).await);
            if stem.is_empty() {
                PathBuf::from(DEFAULT_OUTPUT)
            } else {
                PathBuf::from(format!("{stem}.csv"))
            }
        }
    }
}

/// Write contacts with a header row in the fixed column order.
///
/// Returns `false` without touching the filesystem when there is nothing to
/// write.
pub fn write_contacts(path: &Path, contacts: &[Contact]) -> Result<bool> {
    if contacts.is_empty() {
        warn!("no contacts found, nothing written");
        return Ok(false);
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for contact in contacts {
        writer.serialize(contact).map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| DmfinderError::io(path, e))?;

    info!(path = %path.display(), rows = contacts.len(), "results saved");
    Ok(true)
}

fn csv_error(path: &Path, e: csv::Error) -> DmfinderError {
    if e.is_io_error() {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => DmfinderError::io(path, io),
            other => DmfinderError::Input(format!("{other:?}")),
        }
    } else {
        DmfinderError::Input(format!("failed to write {}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmfinder_shared::CONTACT_COLUMNS;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("dmfinder-output-{}.csv", uuid::Uuid::now_v7()))
    }

    #[test]
    fn sanitizes_titles() {
        assert_eq!(sanitize_file_stem("Q3 Leads: West/Coast!"), "Q3_Leads_WestCoast");
        assert_eq!(sanitize_file_stem("  spaced-out name "), "spaced-out_name");
        assert_eq!(sanitize_file_stem("???"), "");
    }

    #[tokio::test]
    async fn file_input_defaults_to_output_csv() {
        let sheets = SheetsClient::new().unwrap();
        let source = InputSource::File(PathBuf::from("companies.xlsx"));
        assert_eq!(
            default_output_path(&source, &sheets).await,
            PathBuf::from("output.csv")
        );
    }

    #[test]
    fn writes_header_in_column_order() {
        let path = temp_path();
        let contacts = vec![Contact {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            title: "CEO, Founder".into(),
            domain: "acme.com".into(),
            company_name: "Acme Corp".into(),
            ..Contact::default()
        }];

        assert!(write_contacts(&path, &contacts).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = written.lines();
        assert_eq!(lines.next(), Some(CONTACT_COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("Jane,Doe,\"CEO, Founder\",,,,,acme.com,Acme Corp")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_list_writes_nothing() {
        let path = temp_path();
        assert!(!write_contacts(&path, &[]).unwrap());
        assert!(!path.exists());
    }
}
