use std::collections::{HashMap, VecDeque};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::catalog::{self, ResourceRef};
use crate::decode;
use crate::error::{MirrorError, Result};
use crate::fetch::Fetcher;
use crate::job::MirrorJob;
use crate::result::{MirrorSummary, PageResult};
use crate::rewrite::{self, RewriteMap};
use crate::storage;

pub type ProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Outcome of one fetch-and-store operation. Storage errors are not an
/// outcome: they abort the whole job through `Err`, so callers cannot
/// mistake "this resource broke" for "the mirror broke".
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Newly downloaded and written to `path`, relative to the root.
    Stored {
        path: String,
        content_type: Option<String>,
    },
    /// A file for this URL already exists, from this run or an earlier
    /// one. Never re-fetched, which is also what bounds cyclic link
    /// graphs.
    AlreadyStored(String),
    /// Retry budget exhausted; nothing was written.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InFlight,
    Stored,
    Failed,
}

/// A stored HTML page waiting for parse-and-rewrite.
struct PageTask {
    url: Url,
    local_path: String,
    content_type: Option<String>,
}

#[derive(Default)]
struct Stats {
    stored: AtomicUsize,
    failed: AtomicUsize,
    reused: AtomicUsize,
    cross_origin: AtomicUsize,
}

struct MirrorCtx {
    job: MirrorJob,
    entries: Vec<&'static ResourceRef>,
    fetcher: Fetcher,
    /// At-most-once-fetch bookkeeping, keyed by local path. `Stored` and
    /// `Failed` are terminal for a URL within the job.
    visited: Mutex<HashMap<String, VisitState>>,
    queue: Mutex<VecDeque<PageTask>>,
    /// Pages queued or in progress; workers exit when this hits zero.
    pending: AtomicUsize,
    fatal: Mutex<Option<MirrorError>>,
    pages: Mutex<Vec<PageResult>>,
    stats: Stats,
    progress: Option<ProgressCallback>,
}

/// The mirror engine: depth-unbounded, same-origin-filtered traversal of
/// the page graph reachable from one seed URL, persisted as a browsable
/// directory tree.
pub struct Mirror {
    job: MirrorJob,
    progress: Option<ProgressCallback>,
}

impl Mirror {
    pub fn new(job: MirrorJob) -> Self {
        Self {
            job,
            progress: None,
        }
    }

    /// Called with each URL as its download begins.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Mirror the whole reachable same-origin subgraph of the seed.
    ///
    /// The seed itself is always re-fetched; everything else is skipped
    /// when its local file already exists, so re-running a job against
    /// the same root re-downloads nothing that previously succeeded.
    pub async fn run(&self) -> Result<MirrorSummary> {
        let seed = self.job.seed().clone();
        if !matches!(seed.scheme(), "http" | "https") {
            return Err(MirrorError::InvalidUrl(seed.to_string()));
        }

        fs::create_dir_all(self.job.root())?;

        let ctx = Arc::new(MirrorCtx {
            entries: catalog::enabled_entries(&self.job),
            fetcher: Fetcher::new(&self.job)?,
            job: self.job.clone(),
            visited: Mutex::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            pending: AtomicUsize::new(0),
            fatal: Mutex::new(None),
            pages: Mutex::new(Vec::new()),
            stats: Stats::default(),
            progress: self.progress.clone(),
        });

        // The seed ignores any pre-existing file; failing to land it
        // fails the job.
        match ctx.fetch_resource(&seed, "html", true).await? {
            FetchOutcome::Stored { path, content_type } => {
                // Same recursion rule as every other resource: only
                // files stored under the HTML extension get parsed.
                if path.ends_with(".html") {
                    ctx.enqueue_page(PageTask {
                        url: seed.clone(),
                        local_path: path,
                        content_type,
                    })
                    .await;
                }
            }
            FetchOutcome::AlreadyStored(_) | FetchOutcome::Failed => {
                return Err(MirrorError::SeedFetch(seed.to_string()));
            }
        }

        let workers = self.job.workers().max(1);
        info!("mirroring {} with {} workers", seed, workers);

        let mut handles = Vec::new();
        for worker_id in 0..workers {
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                ctx.worker(worker_id).await;
            }));
        }
        for joined in futures::future::join_all(handles).await {
            joined?;
        }

        if let Some(err) = ctx.fatal.lock().await.take() {
            return Err(err);
        }

        let pages = ctx.pages.lock().await.clone();
        info!(
            "mirror of {} complete: {} pages under {}",
            seed,
            pages.len(),
            self.job.root().display()
        );

        Ok(MirrorSummary {
            seed: seed.to_string(),
            root: self.job.root().to_path_buf(),
            pages,
            resources_stored: ctx.stats.stored.load(Ordering::Relaxed),
            resources_failed: ctx.stats.failed.load(Ordering::Relaxed),
            resources_reused: ctx.stats.reused.load(Ordering::Relaxed),
            cross_origin_skipped: ctx.stats.cross_origin.load(Ordering::Relaxed),
        })
    }
}

impl MirrorCtx {
    async fn enqueue_page(&self, task: PageTask) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().await.push_back(task);
    }

    /// Worker loop: pull page tasks until nothing is queued or in
    /// flight, or until another worker hit a fatal error.
    async fn worker(self: Arc<Self>, worker_id: usize) {
        debug!("worker {} started", worker_id);
        loop {
            if self.fatal.lock().await.is_some() {
                break;
            }

            let task = self.queue.lock().await.pop_front();
            let Some(task) = task else {
                if self.pending.load(Ordering::SeqCst) == 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
                continue;
            };

            let outcome = self.process_page(task).await;
            self.pending.fetch_sub(1, Ordering::SeqCst);

            if let Err(err) = outcome {
                let mut fatal = self.fatal.lock().await;
                if fatal.is_none() {
                    *fatal = Some(err);
                }
                break;
            }
        }
        debug!("worker {} finished", worker_id);
    }

    /// Fetch one URL into the tree unless it is already there. `force`
    /// bypasses both the visited map and the on-disk check; only the
    /// seed uses it.
    async fn fetch_resource(
        &self,
        url: &Url,
        default_ext: &str,
        force: bool,
    ) -> Result<FetchOutcome> {
        let rel = storage::local_path_for(url, default_ext);

        {
            let mut visited = self.visited.lock().await;
            if !force {
                match visited.get(&rel) {
                    // An in-flight entry belongs to a concurrent fetch of
                    // the same path; its target is deterministic, so the
                    // rewrite is already safe to make.
                    Some(VisitState::InFlight) | Some(VisitState::Stored) => {
                        self.stats.reused.fetch_add(1, Ordering::Relaxed);
                        debug!("already mirrored: {}", url);
                        return Ok(FetchOutcome::AlreadyStored(rel));
                    }
                    Some(VisitState::Failed) => return Ok(FetchOutcome::Failed),
                    None => {}
                }
                if self.job.root().join(&rel).exists() {
                    visited.insert(rel.clone(), VisitState::Stored);
                    self.stats.reused.fetch_add(1, Ordering::Relaxed);
                    debug!("reusing existing file for {}", url);
                    return Ok(FetchOutcome::AlreadyStored(rel));
                }
            }
            visited.insert(rel.clone(), VisitState::InFlight);
        }

        if let Some(callback) = &self.progress {
            callback(url.to_string());
        }
        info!("downloading {}", url);

        match self.fetcher.fetch(url).await {
            Ok(body) => {
                storage::save_bytes(self.job.root(), &rel, &body.bytes)?;
                self.visited.lock().await.insert(rel.clone(), VisitState::Stored);
                self.stats.stored.fetch_add(1, Ordering::Relaxed);
                info!("stored {} -> {}", url, rel);
                Ok(FetchOutcome::Stored {
                    path: rel,
                    content_type: body.content_type,
                })
            }
            Err(err) => {
                warn!("{}", err);
                self.visited.lock().await.insert(rel, VisitState::Failed);
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                Ok(FetchOutcome::Failed)
            }
        }
    }

    /// Parse one stored page, localize its references, and write the
    /// rewritten document back over the fetched bytes. Returns `Err`
    /// only for failures that must abort the job.
    async fn process_page(&self, task: PageTask) -> Result<()> {
        let base = rewrite::canonical_url(&task.url);
        let bytes = fs::read(self.job.root().join(&task.local_path))?;

        let encoding =
            decode::select_encoding(task.content_type.as_deref(), self.job.fallback_charset());
        let html = match decode::decode_page(&bytes, encoding, &task.local_path) {
            Ok(html) => html,
            Err(err) => {
                // This page loses its subtree; sibling branches are
                // unaffected.
                error!("{}", err);
                return Ok(());
            }
        };

        let references = rewrite::scan_references(&html, &base, &self.entries);
        debug!("{}: {} references", task.local_path, references.len());

        let mut rewrites = RewriteMap::new();
        let mut rewritten = 0usize;
        let mut failed = 0usize;

        for reference in references {
            if !rewrite::same_origin(self.job.seed(), &reference.url) {
                debug!("ignoring cross-origin reference: {}", reference.url);
                self.stats.cross_origin.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            let default_ext = self.entries[reference.entry].default_ext;
            match self.fetch_resource(&reference.url, default_ext, false).await? {
                FetchOutcome::Stored { path, content_type } => {
                    if path.ends_with(".html") {
                        self.enqueue_page(PageTask {
                            url: reference.url.clone(),
                            local_path: path.clone(),
                            content_type,
                        })
                        .await;
                    }
                    rewrites.insert(
                        (reference.entry, reference.raw),
                        storage::relative_from(&task.local_path, &path),
                    );
                    rewritten += 1;
                }
                FetchOutcome::AlreadyStored(path) => {
                    rewrites.insert(
                        (reference.entry, reference.raw),
                        storage::relative_from(&task.local_path, &path),
                    );
                    rewritten += 1;
                }
                FetchOutcome::Failed => {
                    failed += 1;
                }
            }
        }

        let output = rewrite::apply_rewrites(&html, &self.entries, &rewrites);
        storage::save_bytes(
            self.job.root(),
            &task.local_path,
            &decode::encode_page(&output, encoding),
        )?;

        info!("mirrored {} -> {}", task.url, task.local_path);
        self.pages.lock().await.push(PageResult {
            url: task.url.to_string(),
            local_path: task.local_path,
            references_rewritten: rewritten,
            references_failed: failed,
        });

        Ok(())
    }
}
