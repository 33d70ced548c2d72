//! Per-company pipeline: queries → search → summary → extraction → rows.

use std::time::Instant;

use tracing::{debug, info, instrument};

use dmfinder_extraction::ContactExtractor;
use dmfinder_search::{SearchClient, build_queries, format_results};
use dmfinder_shared::{AppConfig, Company, Contact, Credentials, Result};

use crate::normalize::normalize;

/// The two provider clients plus the summary budget, shared by every company
/// in a run. Cloning shares the clients' connection pools.
#[derive(Clone)]
pub struct CompanyPipeline {
    search: SearchClient,
    extractor: ContactExtractor,
    hits_per_query: usize,
}

impl CompanyPipeline {
    /// Assemble a pipeline from already-built clients.
    pub fn new(search: SearchClient, extractor: ContactExtractor, hits_per_query: usize) -> Self {
        Self {
            search,
            extractor,
            hits_per_query,
        }
    }

    /// Build both clients from config and credentials.
    pub fn from_config(config: &AppConfig, credentials: &Credentials) -> Result<Self> {
        let search = SearchClient::new(
            &config.search,
            credentials.search_api_key.clone(),
            config.scheduler.search_rate_limit,
        )?;
        let extractor = ContactExtractor::new(&config.llm, &credentials.llm_api_key)?;
        Ok(Self::new(search, extractor, config.search.hits_per_query))
    }

    /// Find contacts for one company. Never fails: provider problems
    /// degrade to fewer (or zero) contacts.
    #[instrument(skip_all, fields(domain = %company.domain, company = %company.company_name))]
    pub async fn process_company(&self, company: &Company) -> Vec<Contact> {
        let start = Instant::now();

        let queries = build_queries(company);
        let results = self.search.search_all(&queries).await;
        let hits: usize = results.iter().map(|r| r.hits.len()).sum();

        let summary = format_results(&results, self.hits_per_query);
        debug!(hits, summary_len = summary.len(), "search summary built");

        let extracted = self.extractor.extract(&summary).await;
        let contacts = normalize(extracted, company);

        info!(
            hits,
            contacts = contacts.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "company processed"
        );
        contacts
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::testing::{extractor, llm_server, pipeline_for, search_client, search_server};

    fn acme() -> Company {
        Company::new("acme.com", "Acme Corp")
    }

    #[tokio::test]
    async fn rows_carry_company_provenance() {
        let search = search_server().await;
        let llm = llm_server(
            r#"```json
[
  {"first_name":"Jane","last_name":"Doe","title":"CEO","linkedin_url":"https://www.linkedin.com/in/jane-doe","source_url":"https://acme.com/team","company_phone":"(555) 010-0000"},
  {"first_name":"","last_name":"","title":"Generic Email","generic_email":"info@acme.com","source_url":"https://acme.com/contact"}
]
```"#,
        )
        .await;

        let contacts = pipeline_for(&search, &llm).process_company(&acme()).await;

        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].first_name, "Jane");
        assert_eq!(contacts[0].linkedin_url, "https://www.linkedin.com/in/jane-doe");
        // The model omitted generic_email for the person.
        assert_eq!(contacts[0].generic_email, "");
        assert_eq!(contacts[1].title, "Generic Email");
        assert!(contacts.iter().all(|c| c.domain == "acme.com"));
        assert!(contacts.iter().all(|c| c.company_name == "Acme Corp"));
    }

    #[tokio::test]
    async fn failed_search_still_sends_query_headers() {
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains(
                "**Search Query:** acme.com Acme Corp CEO -zoominfo -dnb",
            ))
            .and(body_string_contains("**Search Query:** acme.com Acme Corp contact email"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "[]" } }]
            })))
            .expect(1)
            .mount(&llm)
            .await;

        // Nothing listens on the discard port, so every search is a
        // transport error.
        let pipeline = CompanyPipeline::new(
            search_client("http://127.0.0.1:9/search".into()),
            extractor(llm.uri()),
            4,
        );

        let contacts = pipeline.process_company(&acme()).await;
        assert!(contacts.is_empty());
    }

    #[tokio::test]
    async fn llm_failure_yields_no_contacts() {
        let search = search_server().await;
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&llm)
            .await;

        let pipeline = CompanyPipeline::new(
            search_client(format!("{}/search", search.uri())),
            extractor(llm.uri()),
            4,
        );
        assert!(pipeline.process_company(&acme()).await.is_empty());
    }
}
