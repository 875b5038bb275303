//! Candidate Registry
//!
//! Statically linked scanner output. Crates declare the services they want
//! auto-bound by submitting a [`CandidateEntry`]; [`crate::ports::StaticScan`]
//! hands every entry to the assembler.

use keel_domain::Candidate;

/// Registry entry for an auto-bound candidate
pub struct CandidateEntry {
    /// Name used in logs
    pub name: &'static str,
    /// Describes the candidate: declared tags plus constructor or module
    pub factory: fn() -> Candidate,
}

#[linkme::distributed_slice]
pub static CANDIDATES: [CandidateEntry] = [..];

/// Names of all linked candidates, sorted
pub fn list_candidates() -> Vec<&'static str> {
    let mut names: Vec<_> = CANDIDATES.iter().map(|e| e.name).collect();
    names.sort_unstable();
    names
}
