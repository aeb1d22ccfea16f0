use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::manifest::{IterationRecord, append_iteration};
use crate::downloader::Downloader;
use crate::error::{LogoError, Result};
use crate::generator::LogoService;
use crate::models::{GenerationOptions, GenerationRequest, GenerationResult};
use crate::templates::PromptEngine;

pub const DEFAULT_CONCURRENCY: usize = 3;

/// A set of requests processed together with shared options.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub requests: Vec<GenerationRequest>,
    pub options: GenerationOptions,
    /// Upper bound on generations in flight. Zero is treated as one.
    pub concurrency: usize,
    /// When set, every successful image is saved here.
    pub output_dir: Option<PathBuf>,
    pub iteration: Option<u32>,
    pub description: Option<String>,
    pub quiet: bool,
}

impl BatchJob {
    pub fn new(requests: Vec<GenerationRequest>) -> Self {
        Self {
            requests,
            options: GenerationOptions::default(),
            concurrency: DEFAULT_CONCURRENCY,
            output_dir: None,
            iteration: None,
            description: None,
            quiet: false,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_iteration(mut self, iteration: u32, description: impl Into<String>) -> Self {
        self.iteration = Some(iteration);
        self.description = Some(description.into());
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[derive(Debug)]
pub struct BatchFailure {
    pub request: GenerationRequest,
    pub error: LogoError,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    pub total: usize,
    pub successful: usize,
    /// Successes served from the cache.
    pub cached: usize,
    pub failed: usize,
    /// Spent on fresh generations; cached results cost nothing.
    pub total_cost: f64,
    pub duration: Duration,
}

#[derive(Debug)]
pub struct BatchOutcome {
    /// Successful results, in input order.
    pub successful: Vec<GenerationResult>,
    /// Failed requests with their errors, in input order.
    pub failed: Vec<BatchFailure>,
    pub stats: BatchStats,
    pub manifest_path: Option<PathBuf>,
}

/// Final prompts for every request, in input order, without calling the API.
pub fn preview(
    engine: &PromptEngine<'_>,
    job: &BatchJob,
) -> Vec<(GenerationRequest, Result<String>)> {
    job.requests
        .iter()
        .map(|request| (request.clone(), engine.preview(request, &job.options)))
        .collect()
}

pub struct BatchRunner<S> {
    service: S,
    downloader: Downloader,
}

impl<S: LogoService> BatchRunner<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            downloader: Downloader::default(),
        }
    }

    pub fn with_downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    async fn process(
        &self,
        job: &BatchJob,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let mut result = self.service.generate(request, &job.options).await?;
        if let Some(output_dir) = &job.output_dir {
            let path = self.downloader.download(&result, output_dir, job.iteration).await?;
            result.local_path = Some(path);
        }
        Ok(result)
    }

    /// Runs every request with at most `job.concurrency` in flight. A failing
    /// item never stops the others.
    pub async fn run(&self, job: &BatchJob) -> BatchOutcome {
        let started = Instant::now();
        let total = job.requests.len();
        let concurrency = job.effective_concurrency();
        if job.quiet {
            debug!("starting batch of {} requests, concurrency {}", total, concurrency);
        } else {
            info!("starting batch of {} requests, concurrency {}", total, concurrency);
        }

        let mut completed: Vec<(usize, Result<GenerationResult>)> =
            stream::iter(job.requests.iter().enumerate())
                .map(|(index, request)| async move {
                    let outcome = self.process(job, request).await;
                    match &outcome {
                        Ok(result) if job.quiet => {
                            debug!("[{}/{}] {} done", index + 1, total, result.metadata.company)
                        }
                        Ok(result) => {
                            info!("[{}/{}] {} done", index + 1, total, result.metadata.company)
                        }
                        Err(err) => warn!(
                            "[{}/{}] {} failed: {}",
                            index + 1,
                            total,
                            request.company,
                            err
                        ),
                    }
                    (index, outcome)
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;
        completed.sort_by_key(|(index, _)| *index);

        let mut successful = Vec::new();
        let mut failed = Vec::new();
        for (index, outcome) in completed {
            match outcome {
                Ok(result) => successful.push(result),
                Err(error) => failed.push(BatchFailure {
                    request: job.requests[index].clone(),
                    error,
                }),
            }
        }

        let stats = BatchStats {
            total,
            successful: successful.len(),
            cached: successful.iter().filter(|result| result.cached).count(),
            failed: failed.len(),
            total_cost: successful
                .iter()
                .filter(|result| !result.cached)
                .map(GenerationResult::cost)
                .sum(),
            duration: started.elapsed(),
        };
        info!(
            "batch finished: {} ok ({} cached), {} failed, ${:.2} in {:.1}s",
            stats.successful,
            stats.cached,
            stats.failed,
            stats.total_cost,
            stats.duration.as_secs_f64()
        );

        let manifest_path = self.record_iteration(job, &successful).await;
        BatchOutcome {
            successful,
            failed,
            stats,
            manifest_path,
        }
    }

    async fn record_iteration(
        &self,
        job: &BatchJob,
        successful: &[GenerationResult],
    ) -> Option<PathBuf> {
        let (Some(output_dir), Some(iteration)) = (&job.output_dir, job.iteration) else {
            return None;
        };
        if successful.is_empty() {
            return None;
        }
        let description = job.description.clone().unwrap_or_default();
        let record = IterationRecord::new(iteration, description, successful);
        match append_iteration(output_dir, &record).await {
            Ok(path) => Some(path),
            Err(err) => {
                warn!("iteration {} not recorded: {}", iteration, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::batch::manifest::load_manifest;
    use crate::generator::new_logo_id;
    use crate::test_support::{sample_result, tiny_png_data_url};

    #[derive(Default)]
    struct StubService {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
        fail_company: Option<&'static str>,
        cached_company: Option<&'static str>,
    }

    #[async_trait]
    impl LogoService for StubService {
        async fn generate(
            &self,
            request: &GenerationRequest,
            _options: &GenerationOptions,
        ) -> Result<GenerationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_company == Some(request.company.as_str()) {
                return Err(LogoError::validation("stub refused"));
            }
            let mut result = sample_result(&request.company);
            result.url = tiny_png_data_url();
            result.metadata.id = new_logo_id();
            result.cached = self.cached_company == Some(request.company.as_str());
            Ok(result)
        }
    }

    fn requests(count: usize) -> Vec<GenerationRequest> {
        (0..count)
            .map(|index| GenerationRequest::new(format!("Company {index}"), "an idea"))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_concurrency() {
        let runner = BatchRunner::new(StubService::default());
        let outcome = runner.run(&BatchJob::new(requests(5)).with_concurrency(2)).await;
        assert_eq!(outcome.stats.successful, 5);
        assert_eq!(runner.service().max_in_flight.load(Ordering::SeqCst), 2);

        let runner = BatchRunner::new(StubService::default());
        let outcome = runner.run(&BatchJob::new(requests(50)).with_concurrency(3)).await;
        assert_eq!(outcome.stats.total, 50);
        assert_eq!(runner.service().calls.load(Ordering::SeqCst), 50);
        assert!(runner.service().max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_concurrency_runs_serially() {
        let runner = BatchRunner::new(StubService::default());
        let outcome = runner.run(&BatchJob::new(requests(3)).with_concurrency(0)).await;
        assert_eq!(outcome.stats.successful, 3);
        assert_eq!(runner.service().max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_isolated() {
        let runner = BatchRunner::new(StubService {
            fail_company: Some("Company 1"),
            ..Default::default()
        });
        let outcome = runner.run(&BatchJob::new(requests(4))).await;

        assert_eq!(outcome.stats.successful, 3);
        assert_eq!(outcome.stats.failed, 1);
        assert_eq!(outcome.failed[0].request.company, "Company 1");
        assert!(matches!(outcome.failed[0].error, LogoError::Validation { .. }));
        assert!((outcome.stats.total_cost - 0.21).abs() < 1e-9);
        let companies: Vec<_> = outcome
            .successful
            .iter()
            .map(|result| result.metadata.company.as_str())
            .collect();
        assert_eq!(companies, ["Company 0", "Company 2", "Company 3"]);
        assert!(outcome.manifest_path.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cached_results_are_counted_but_not_charged() {
        let runner = BatchRunner::new(StubService {
            cached_company: Some("Company 2"),
            ..Default::default()
        });
        let outcome = runner.run(&BatchJob::new(requests(3))).await;

        assert_eq!(outcome.stats.successful, 3);
        assert_eq!(outcome.stats.cached, 1);
        assert!(outcome.successful[2].cached);
        assert!((outcome.stats.total_cost - 0.14).abs() < 1e-9);
    }

    #[tokio::test]
    async fn downloads_and_records_iterations() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let runner = BatchRunner::new(StubService::default());

        let first = BatchJob::new(requests(2))
            .with_output_dir(temp.path())
            .with_iteration(1, "first look");
        let outcome = runner.run(&first).await;
        for result in &outcome.successful {
            let path = result.local_path.as_ref().expect("downloaded");
            assert!(path.starts_with(temp.path().join("iteration-1")));
            assert!(path.exists());
        }

        let second = BatchJob::new(requests(1))
            .with_output_dir(temp.path())
            .with_iteration(2, "refined")
            .quiet(true);
        let outcome = runner.run(&second).await;
        assert_eq!(outcome.manifest_path, Some(temp.path().join("iterations.json")));

        let records = load_manifest(temp.path()).await?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "first look");
        assert_eq!(records[0].count, 2);
        assert_eq!(records[1].iteration, 2);
        assert!(records[1].logos[0].file.as_deref().is_some_and(|file| file.ends_with(".png")));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn no_manifest_without_successes() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let runner = BatchRunner::new(StubService {
            fail_company: Some("Company 0"),
            ..Default::default()
        });
        let job = BatchJob::new(requests(1))
            .with_output_dir(temp.path())
            .with_iteration(1, "doomed");
        let outcome = runner.run(&job).await;
        assert_eq!(outcome.stats.failed, 1);
        assert!(outcome.manifest_path.is_none());
        assert!(!temp.path().join("iterations.json").exists());
        Ok(())
    }

    #[test]
    fn preview_keeps_input_order_and_reports_bad_rows() {
        let mut batch = requests(3);
        batch[1].prompt.clear();
        let previews = preview(&PromptEngine::default(), &BatchJob::new(batch));

        assert_eq!(previews.len(), 3);
        assert_eq!(previews[0].0.company, "Company 0");
        assert!(previews[0].1.as_ref().unwrap().contains("logo of Company 0, an idea"));
        assert!(matches!(previews[1].1, Err(LogoError::Validation { .. })));
        assert!(previews[2].1.as_ref().unwrap().contains("Company 2"));
    }
}
