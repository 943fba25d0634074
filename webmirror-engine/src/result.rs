use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One mirrored page: where it came from, where it landed, and how its
/// embedded references fared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub local_path: String,
    pub references_rewritten: usize,
    pub references_failed: usize,
}

/// Totals for one finished mirror job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorSummary {
    pub seed: String,
    pub root: PathBuf,
    pub pages: Vec<PageResult>,
    pub resources_stored: usize,
    pub resources_failed: usize,
    pub resources_reused: usize,
    pub cross_origin_skipped: usize,
}

impl MirrorSummary {
    pub fn pages_mirrored(&self) -> usize {
        self.pages.len()
    }
}
