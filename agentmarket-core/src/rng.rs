//! Deterministic seed hierarchy.
//!
//! A master seed generates deterministic sub-seeds for each `(label, index)`
//! pair. Sub-seeds are derived via BLAKE3 hashing, independently of the order
//! in which they are requested, so a parallel sweep produces the same runs
//! regardless of thread count.

/// Label for per-episode seeds handed out by the decision environment.
pub const EPISODE_LABEL: &str = "episode";
/// Label for per-run seeds handed out by simulation sweeps.
pub const RUN_LABEL: &str = "run";

/// Deterministic seed hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for `(label, index)`.
    pub fn sub_seed(&self, label: &str, index: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(label.as_bytes());
        hasher.update(&index.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Seed for the `episode`-th environment reset.
    pub fn episode_seed(&self, episode: u64) -> u64 {
        self.sub_seed(EPISODE_LABEL, episode)
    }

    /// Seed for the `run`-th simulation of a sweep.
    pub fn run_seed(&self, run: u64) -> u64 {
        self.sub_seed(RUN_LABEL, run)
    }
}
