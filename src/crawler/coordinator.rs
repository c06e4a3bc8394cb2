//! Crawler coordinator - run-level orchestration
//!
//! The [`Crawler`] owns the run state machine. `start` validates that no run
//! is in progress, resets the run and hands the rest to a background task
//! which:
//! - Parses the seed URL
//! - Prepares the output directory and the run log
//! - Spawns the seed tasks (home page, `robots.txt`, `sitemap.xml`)
//! - Waits for the whole task tree to drain and logs the final report

use crate::config::Config;
use crate::crawler::fetcher::{HttpTransport, Transport};
use crate::crawler::retry::RetryPolicy;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::task::{spawn_task, RunContext};
use crate::crawler::tasks::TaskCounter;
use crate::logging::RunLog;
use crate::output::Report;
use crate::registry::{lock_unpoisoned, Registry, Resource};
use crate::state::RunState;
use crate::storage::{
    output_dir_for, prepare_output_dir, resolve_output_root, run_log_path, PathSafeWriter,
};
use crate::url::{parse_seed, root_file};
use crate::MirrorError;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use url::Url;

/// Tracing target of the final full report, so consoles can filter it out
pub const REPORT_TARGET: &str = "site_mirror::report";

/// Well-known files fetched alongside the home page
const SEED_FILES: [&str; 2] = ["/robots.txt", "/sitemap.xml"];

/// Parameters of a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartParams {
    /// Site address as typed by the user
    pub url: String,
    /// Remove and recreate an existing output directory
    pub replace_output_dir: bool,
    /// Retry bound for ordinary failures; the configured value when unset
    pub max_retries: Option<u32>,
}

impl StartParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            replace_output_dir: false,
            max_retries: None,
        }
    }

    pub fn replace_output_dir(mut self, replace: bool) -> Self {
        self.replace_output_dir = replace;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// State of one crawl attempt, replaced wholesale by every `start`
#[derive(Debug, Default)]
struct Run {
    state: RunState,
    seed: Option<Url>,
    max_retries: u32,
    output_dir: Option<PathBuf>,
    started_at: Option<DateTime<Utc>>,
    scan_started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    last_error: Option<Arc<MirrorError>>,
    registry: Option<Arc<Registry>>,
    tasks: TaskCounter,
}

struct Shared {
    config: Config,
    transport: Arc<dyn Transport>,
    run: Mutex<Run>,
    state: watch::Sender<RunState>,
    run_log: RunLog,
}

/// Crawl orchestrator
///
/// Cloning is cheap; all clones drive the same run.
#[derive(Clone)]
pub struct Crawler {
    inner: Arc<Shared>,
}

impl Crawler {
    /// Creates a crawler that fetches through `transport`
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        let (state, _) = watch::channel(RunState::Ready);
        Self {
            inner: Arc::new(Shared {
                config,
                transport,
                run: Mutex::new(Run::default()),
                state,
                run_log: RunLog::new(),
            }),
        }
    }

    /// Creates a crawler with an HTTP transport built from `config`
    pub fn from_config(config: Config) -> Result<Self, MirrorError> {
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Log sink opened for every run; install it in a subscriber to capture it
    pub fn run_log(&self) -> RunLog {
        self.inner.run_log.clone()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Starts a new run in the background
    ///
    /// Fails only if a run is already preparing or scanning. Every other
    /// problem is reported through [`Crawler::current_state`] and
    /// [`Crawler::last_error`]. Must be called from within a Tokio runtime.
    pub fn start(&self, params: StartParams) -> Result<(), MirrorError> {
        {
            let mut run = lock_unpoisoned(&self.inner.run);
            if !run.state.can_start() {
                return Err(MirrorError::AlreadyRunning { state: run.state });
            }

            *run = Run {
                state: RunState::Preparing,
                max_retries: params
                    .max_retries
                    .unwrap_or(self.inner.config.crawler.max_retries),
                started_at: Some(Utc::now()),
                ..Run::default()
            };
            self.inner.state.send_replace(RunState::Preparing);
        }

        let crawler = self.clone();
        tokio::spawn(async move { crawler.execute(params).await });
        Ok(())
    }

    /// Waits until the current run leaves `Preparing`/`Scanning`
    pub async fn wait(&self) -> RunState {
        let mut rx = self.inner.state.subscribe();
        loop {
            let state = *rx.borrow_and_update();
            if !state.is_busy() {
                return state;
            }
            if rx.changed().await.is_err() {
                return self.current_state();
            }
        }
    }

    /// Starts a run and waits for it to finish
    pub async fn run(&self, params: StartParams) -> Result<RunState, MirrorError> {
        self.start(params)?;
        Ok(self.wait().await)
    }

    pub fn current_state(&self) -> RunState {
        lock_unpoisoned(&self.inner.run).state
    }

    /// Error that ended the last run before scanning, if any
    pub fn last_error(&self) -> Option<Arc<MirrorError>> {
        lock_unpoisoned(&self.inner.run).last_error.clone()
    }

    pub fn output_directory(&self) -> Option<PathBuf> {
        lock_unpoisoned(&self.inner.run).output_dir.clone()
    }

    pub fn seed_url(&self) -> Option<Url> {
        lock_unpoisoned(&self.inner.run).seed.clone()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        lock_unpoisoned(&self.inner.run).started_at
    }

    pub fn scan_started_at(&self) -> Option<DateTime<Utc>> {
        lock_unpoisoned(&self.inner.run).scan_started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        lock_unpoisoned(&self.inner.run).finished_at
    }

    /// Number of crawl tasks still running
    pub fn active_tasks(&self) -> usize {
        lock_unpoisoned(&self.inner.run).tasks.active()
    }

    /// All resources of the current run in registration order
    pub fn resources(&self) -> Vec<Arc<Resource>> {
        // Release the run lock before touching the registry
        let registry = lock_unpoisoned(&self.inner.run).registry.clone();
        registry.map(|r| r.snapshot()).unwrap_or_default()
    }

    /// Builds a report of the current run
    ///
    /// With `include_all` unset only resources in an active phase are listed.
    pub fn snapshot_report(&self, include_all: bool) -> Report {
        let (state, max_retries, active_tasks, elapsed, registry) = {
            let run = lock_unpoisoned(&self.inner.run);
            let elapsed = match run.scan_started_at {
                Some(start) => run.finished_at.unwrap_or_else(Utc::now) - start,
                None => chrono::Duration::zero(),
            };
            (
                run.state,
                run.max_retries,
                run.tasks.active(),
                elapsed.to_std().unwrap_or_default(),
                run.registry.clone(),
            )
        };

        let snapshots: Vec<_> = registry
            .map(|r| r.snapshot())
            .unwrap_or_default()
            .iter()
            .map(|resource| resource.snapshot())
            .collect();

        Report::build(
            state,
            &snapshots,
            include_all,
            max_retries,
            active_tasks,
            elapsed,
        )
    }

    async fn execute(&self, params: StartParams) {
        let (seed, output_dir) = match self.prepare(&params).await {
            Ok(prepared) => prepared,
            Err(e) => {
                let state = failure_state(&e);
                tracing::error!("{}", e);
                let mut run = lock_unpoisoned(&self.inner.run);
                run.state = state;
                run.last_error = Some(Arc::new(e));
                run.finished_at = Some(Utc::now());
                self.inner.state.send_replace(state);
                return;
            }
        };

        let config = &self.inner.config.crawler;
        let registry = Arc::new(Registry::new(&seed));
        let tasks = TaskCounter::new();
        let max_retries = {
            let mut run = lock_unpoisoned(&self.inner.run);
            run.registry = Some(Arc::clone(&registry));
            run.tasks = tasks.clone();
            run.state = RunState::Scanning;
            run.scan_started_at = Some(Utc::now());
            self.inner.state.send_replace(RunState::Scanning);
            run.max_retries
        };

        let ctx = Arc::new(RunContext {
            seed: seed.clone(),
            registry,
            scheduler: Scheduler::new(config.max_concurrent_requests as usize),
            tasks: tasks.clone(),
            retry: RetryPolicy::new(max_retries),
            max_url_length: config.max_url_length,
            writer: PathSafeWriter::new(&output_dir),
            transport: Arc::clone(&self.inner.transport),
        });

        tracing::info!("Scanning {} into {}", seed, output_dir.display());
        spawn_task(&ctx, seed.clone());
        for file in SEED_FILES {
            spawn_task(&ctx, root_file(&seed, file));
        }

        tasks.wait_idle().await;

        tracing::info!(target: REPORT_TARGET, "Scan complete\n{}", self.snapshot_report(true));
        self.inner.run_log.close();

        let mut run = lock_unpoisoned(&self.inner.run);
        run.state = RunState::Complete;
        run.finished_at = Some(Utc::now());
        self.inner.state.send_replace(RunState::Complete);
    }

    /// Runs the `Preparing` steps in order
    async fn prepare(&self, params: &StartParams) -> Result<(Url, PathBuf), MirrorError> {
        let seed = parse_seed(&params.url)?;
        lock_unpoisoned(&self.inner.run).seed = Some(seed.clone());

        let root = resolve_output_root(&self.inner.config)?;
        let output_dir = output_dir_for(&root, &seed)?;
        lock_unpoisoned(&self.inner.run).output_dir = Some(output_dir.clone());

        prepare_output_dir(&output_dir, params.replace_output_dir).await?;

        let log_path = run_log_path(&root, &seed);
        self.inner
            .run_log
            .open(&log_path)
            .map_err(|source| MirrorError::RunLog {
                path: log_path.clone(),
                source,
            })?;

        Ok((seed, output_dir))
    }
}

/// Run state a preparation error leaves the run in
fn failure_state(error: &MirrorError) -> RunState {
    match error {
        MirrorError::IncorrectUrl(_) => RunState::IncorrectUrl,
        MirrorError::OutputDirExists { .. } => RunState::OutputDirExist,
        _ => RunState::OutputDirError,
    }
}
