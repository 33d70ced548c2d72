//! Tabular input and output: company lists from CSV, Excel or a public
//! Google Sheet, and the contact CSV.

mod input;
mod output;
mod sheet;

pub use input::{
    COMPANY_NAME_COLUMN, DOMAIN_COLUMN, InputSource, companies_from_csv, companies_from_workbook,
    read_companies,
};
pub use output::{DEFAULT_OUTPUT, default_output_path, sanitize_file_stem, write_contacts};
pub use sheet::{SheetRef, SheetsClient};
