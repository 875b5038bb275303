//! Scanner seam
//!
//! The assembler never discovers types itself. Whatever produced the
//! candidate set (a static registration list, generated code, a config
//! file) is hidden behind [`ScanResult`].

use crate::ports::registry::CANDIDATES;
use keel_domain::Candidate;
use tracing::debug;

/// A finished scan: the candidate types and their declared tags
pub trait ScanResult: Send + Sync {
    /// All discovered candidates
    fn candidates(&self) -> Vec<Candidate>;
}

/// Explicit candidate list
#[derive(Clone, Debug, Default)]
pub struct ListScan {
    candidates: Vec<Candidate>,
}

impl ListScan {
    /// Scan result over the given candidates
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Add a candidate
    #[must_use]
    pub fn with(mut self, candidate: Candidate) -> Self {
        self.candidates.push(candidate);
        self
    }
}

impl ScanResult for ListScan {
    fn candidates(&self) -> Vec<Candidate> {
        self.candidates.clone()
    }
}

/// Candidates linked into the binary through the `CANDIDATES` slice
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticScan;

impl ScanResult for StaticScan {
    fn candidates(&self) -> Vec<Candidate> {
        let mut entries: Vec<_> = CANDIDATES.iter().collect();
        entries.sort_by_key(|entry| entry.name);
        entries
            .into_iter()
            .map(|entry| {
                debug!(candidate = entry.name, "Linked candidate");
                (entry.factory)()
            })
            .collect()
    }
}
