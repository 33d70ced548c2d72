//! Mock providers shared by the pipeline and scheduler tests.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dmfinder_extraction::ContactExtractor;
use dmfinder_search::SearchClient;
use dmfinder_shared::{LlmConfig, Result, SearchConfig};

use crate::pipeline::CompanyPipeline;

/// A search endpoint answering every query with two complete hits.
pub async fn search_server() -> MockServer {
    search_server_with_delay(Duration::ZERO).await
}

/// Like [`search_server`], each answer held back by `delay`.
pub async fn search_server_with_delay(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_delay(delay).set_body_json(serde_json::json!({
            "organic": [
                { "title": "Team - Acme", "link": "https://acme.com/team", "snippet": "Jane Doe, CEO" },
                { "title": "About", "link": "https://acme.com/about", "snippet": "Founded in 1990" }
            ]
        })))
        .mount(&server)
        .await;
    server
}

/// A chat-completions endpoint that always replies with `content`.
pub async fn llm_server(content: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .mount(&server)
        .await;
    server
}

pub fn search_client(endpoint: String) -> SearchClient {
    let config = SearchConfig {
        endpoint,
        timeout_secs: 5,
        ..SearchConfig::default()
    };
    SearchClient::new(&config, "serper-key", 70).unwrap()
}

pub fn extractor(endpoint: String) -> ContactExtractor {
    let config = LlmConfig {
        endpoint,
        timeout_secs: 5,
        ..LlmConfig::default()
    };
    ContactExtractor::new(&config, "or-key").unwrap()
}

pub fn pipeline_at(search_uri: &str, llm_uri: &str) -> CompanyPipeline {
    CompanyPipeline::new(
        search_client(format!("{search_uri}/search")),
        extractor(format!("{llm_uri}/chat/completions")),
        4,
    )
}

pub fn pipeline_for(search: &MockServer, llm: &MockServer) -> CompanyPipeline {
    pipeline_at(&search.uri(), &llm.uri())
}

/// A pipeline factory for the scheduler, pointed at both mocks.
pub fn pipeline_factory(
    search: &MockServer,
    llm: &MockServer,
) -> impl Fn() -> Result<CompanyPipeline> + Send + Sync + 'static {
    let (search_uri, llm_uri) = (search.uri(), llm.uri());
    move || Ok(pipeline_at(&search_uri, &llm_uri))
}
