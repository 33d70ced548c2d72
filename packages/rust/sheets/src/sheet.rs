//! Public Google Sheets access via the CSV export endpoint.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use dmfinder_shared::{DmfinderError, Result};

const GOOGLE_DOCS: &str = "https://docs.google.com";

/// Fallback title when the sheet's page cannot be read.
const UNTITLED: &str = "output";

const TITLE_SUFFIX: &str = " - Google Sheets";

static SPREADSHEET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("valid regex"));

static GID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#&?]gid=(\d+)").expect("valid regex"));

static HTML_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>([^<]+)</title>").expect("valid regex"));

/// A spreadsheet and one of its tabs, parsed from a share or edit URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub spreadsheet_id: String,
    /// Tab id; `"0"` is the first sheet.
    pub gid: String,
}

impl SheetRef {
    pub fn parse(url: &str) -> Result<Self> {
        let spreadsheet_id = SPREADSHEET_ID
            .captures(url)
            .map(|c| c[1].to_string())
            .ok_or_else(|| DmfinderError::validation(format!("invalid Google Sheets URL: {url}")))?;
        let gid = GID
            .captures(url)
            .map_or_else(|| "0".to_string(), |c| c[1].to_string());

        Ok(Self {
            spreadsheet_id,
            gid,
        })
    }
}

/// Fetches sheet contents and titles. The base URL is overridable for tests.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
}

impl SheetsClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(GOOGLE_DOCS)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("dmfinder/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DmfinderError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn export_url(&self, sheet: &SheetRef) -> String {
        format!(
            "{}/spreadsheets/d/{}/export?format=csv&gid={}",
            self.base_url, sheet.spreadsheet_id, sheet.gid
        )
    }

    fn edit_url(&self, sheet: &SheetRef) -> String {
        format!("{}/spreadsheets/d/{}/edit", self.base_url, sheet.spreadsheet_id)
    }

    /// Download one tab as CSV text.
    #[instrument(skip(self), fields(id = %sheet.spreadsheet_id, gid = %sheet.gid))]
    pub async fn export_csv(&self, sheet: &SheetRef) -> Result<String> {
        let url = self.export_url(sheet);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DmfinderError::Network(format!("failed to fetch sheet: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DmfinderError::Network(format!(
                "sheet export returned {status}; is the sheet shared publicly?"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DmfinderError::Network(format!("failed to read sheet: {e}")))?;
        debug!(bytes = body.len(), "sheet exported");
        Ok(body)
    }

    /// The spreadsheet's title, or `"output"` if it cannot be determined.
    pub async fn title(&self, sheet: &SheetRef) -> String {
        match self.fetch_title(sheet).await {
            Ok(Some(title)) => title,
            Ok(None) => UNTITLED.to_string(),
            Err(e) => {
                warn!(error = %e, "could not read sheet title");
                UNTITLED.to_string()
            }
        }
    }

    async fn fetch_title(&self, sheet: &SheetRef) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.edit_url(sheet))
            .send()
            .await
            .map_err(|e| DmfinderError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let html = response
            .text()
            .await
            .map_err(|e| DmfinderError::Network(e.to_string()))?;

        Ok(HTML_TITLE.captures(&html).and_then(|c| {
            let title = c[1].replace(TITLE_SUFFIX, "");
            let title = title.trim();
            (!title.is_empty()).then(|| title.to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parses_id_and_gid() {
        let sheet =
            SheetRef::parse("https://docs.google.com/spreadsheets/d/1AbC-d_9/edit#gid=123456")
                .unwrap();
        assert_eq!(sheet.spreadsheet_id, "1AbC-d_9");
        assert_eq!(sheet.gid, "123456");
    }

    #[test]
    fn gid_defaults_to_first_sheet() {
        let sheet = SheetRef::parse("https://docs.google.com/spreadsheets/d/abc123/edit").unwrap();
        assert_eq!(sheet.gid, "0");
    }

    #[test]
    fn rejects_url_without_id() {
        let err = SheetRef::parse("https://example.com/not-a-sheet").unwrap_err();
        assert!(matches!(err, DmfinderError::Validation { .. }));
    }

    #[tokio::test]
    async fn exports_csv_for_tab() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/d/abc/export"))
            .and(query_param("format", "csv"))
            .and(query_param("gid", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Domain,Company Name\n"))
            .expect(1)
            .mount(&server)
            .await;

        let client = SheetsClient::with_base_url(server.uri()).unwrap();
        let sheet = SheetRef {
            spreadsheet_id: "abc".into(),
            gid: "7".into(),
        };
        assert_eq!(client.export_csv(&sheet).await.unwrap(), "Domain,Company Name\n");
    }

    #[tokio::test]
    async fn private_sheet_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = SheetsClient::with_base_url(server.uri()).unwrap();
        let sheet = SheetRef::parse("https://docs.google.com/spreadsheets/d/abc/edit").unwrap();
        let err = client.export_csv(&sheet).await.unwrap_err();
        assert!(matches!(err, DmfinderError::Network(_)));
    }

    #[tokio::test]
    async fn title_strips_suffix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/d/abc/edit"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><head><title>Q3 Leads - Google Sheets</title></head></html>",
            ))
            .mount(&server)
            .await;

        let client = SheetsClient::with_base_url(server.uri()).unwrap();
        let sheet = SheetRef::parse("https://docs.google.com/spreadsheets/d/abc/edit").unwrap();
        assert_eq!(client.title(&sheet).await, "Q3 Leads");
    }

    #[tokio::test]
    async fn title_falls_back_to_output() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = SheetsClient::with_base_url(server.uri()).unwrap();
        let sheet = SheetRef::parse("https://docs.google.com/spreadsheets/d/abc/edit").unwrap();
        assert_eq!(client.title(&sheet).await, "output");
    }
}
