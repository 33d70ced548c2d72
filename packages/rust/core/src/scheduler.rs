//! Chunked batch execution over a company list.
//!
//! Companies run in fixed-size chunks. Chunks are strictly sequential; every
//! company inside a chunk runs concurrently. Output keeps input order. Each
//! chunk gets freshly built provider clients, so connection pools live for
//! one chunk only.

use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{error, info, instrument};
use uuid::Uuid;

use dmfinder_search::QUERY_ROLES;
use dmfinder_shared::{AppConfig, Company, Contact, Credentials, Result};

use crate::pipeline::CompanyPipeline;

/// Totals for one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub companies: usize,
    pub chunks: usize,
    pub contacts: usize,
    pub elapsed: Duration,
}

/// Progress callbacks for a batch run.
pub trait RunProgress: Send + Sync {
    /// A chunk of `size` companies is about to start (0-based `index`).
    fn chunk_started(&self, index: usize, total_chunks: usize, size: usize);
    /// One company finished with `contacts` rows.
    fn company_done(&self, company: &Company, contacts: usize);
    /// Every company in chunk `index` has finished.
    fn chunk_done(&self, index: usize, total_chunks: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl RunProgress for SilentProgress {
    fn chunk_started(&self, _index: usize, _total_chunks: usize, _size: usize) {}
    fn company_done(&self, _company: &Company, _contacts: usize) {}
    fn chunk_done(&self, _index: usize, _total_chunks: usize) {}
}

type PipelineFactory = Box<dyn Fn() -> Result<CompanyPipeline> + Send + Sync>;

/// Runs the company pipeline over a list of companies within the search
/// rate budget.
pub struct BatchScheduler {
    build_pipeline: PipelineFactory,
    chunk_size: usize,
}

impl BatchScheduler {
    /// `build_pipeline` is called once per chunk; the pipeline it returns is
    /// dropped, closing its connections, when the chunk finishes.
    pub fn new(
        build_pipeline: impl Fn() -> Result<CompanyPipeline> + Send + Sync + 'static,
        chunk_size: usize,
    ) -> Self {
        Self {
            build_pipeline: Box::new(build_pipeline),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Derive the chunk size from config. The clients are built once here so
    /// bad settings fail before any work starts.
    pub fn from_config(config: &AppConfig, credentials: &Credentials) -> Result<Self> {
        CompanyPipeline::from_config(config, credentials)?;

        let chunk_size = config.scheduler.chunk_size(QUERY_ROLES.len());
        let (config, credentials) = (config.clone(), credentials.clone());
        Ok(Self::new(
            move || CompanyPipeline::from_config(&config, &credentials),
            chunk_size,
        ))
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Process every company and return all contacts in company order.
    pub async fn run(&self, companies: &[Company], progress: &dyn RunProgress) -> Vec<Contact> {
        self.run_with_summary(companies, progress).await.0
    }

    /// Like [`run`](Self::run), also returning run totals.
    #[instrument(skip_all, fields(run_id = %Uuid::now_v7(), companies = companies.len(), chunk_size = self.chunk_size))]
    pub async fn run_with_summary(
        &self,
        companies: &[Company],
        progress: &dyn RunProgress,
    ) -> (Vec<Contact>, RunSummary) {
        let start = Instant::now();
        let total_chunks = companies.len().div_ceil(self.chunk_size);
        info!(total_chunks, "starting batch run");

        let mut contacts = Vec::new();
        for (index, chunk) in companies.chunks(self.chunk_size).enumerate() {
            progress.chunk_started(index, total_chunks, chunk.len());

            let pipeline = match (self.build_pipeline)() {
                Ok(pipeline) => pipeline,
                Err(e) => {
                    error!(chunk = index + 1, error = %e, "failed to build clients, skipping chunk");
                    for company in chunk {
                        progress.company_done(company, 0);
                    }
                    progress.chunk_done(index, total_chunks);
                    continue;
                }
            };

            let per_company = join_all(chunk.iter().map(|company| {
                let pipeline = &pipeline;
                async move {
                    let rows = pipeline.process_company(company).await;
                    progress.company_done(company, rows.len());
                    rows
                }
            }))
            .await;
            drop(pipeline);

            let before = contacts.len();
            contacts.extend(per_company.into_iter().flatten());
            info!(
                chunk = index + 1,
                total_chunks,
                contacts = contacts.len() - before,
                "chunk finished"
            );
            progress.chunk_done(index, total_chunks);
        }

        let summary = RunSummary {
            companies: companies.len(),
            chunks: total_chunks,
            contacts: contacts.len(),
            elapsed: start.elapsed(),
        };
        info!(
            contacts = summary.contacts,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "batch run complete"
        );
        (contacts, summary)
    }
}
