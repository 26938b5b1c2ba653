//! Materials fingerprinting.
//!
//! A fingerprint is a SHA-256 digest of an environment state that ignores
//! collection order but not multiplicity, so two states share a fingerprint
//! exactly when they are materially the same. Fingerprints are used for
//! display and history records; reconciliation decisions go through
//! [`EnvironmentState::same_materials`].

use sha2::{Digest, Sha256};

use super::types::{Chart, EnvironmentState, GitCommit, Image};

/// Hasher for computing materials fingerprints.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialsHasher;

impl MaterialsHasher {
    /// Creates a new materials hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the fingerprint of a state.
    #[must_use]
    pub fn hash_state(&self, state: &EnvironmentState) -> String {
        let mut hasher = Sha256::new();

        match &state.git_commit {
            Some(commit) => {
                hasher.update([1u8]);
                hasher.update(commit_record(commit));
            }
            None => hasher.update([0u8]),
        }

        // Records are sorted so that input order does not leak into the digest
        let mut images: Vec<Vec<u8>> = state.images.iter().map(image_record).collect();
        images.sort_unstable();
        hasher.update((images.len() as u64).to_be_bytes());
        for record in &images {
            hasher.update(record);
        }

        let mut charts: Vec<Vec<u8>> = state.charts.iter().map(chart_record).collect();
        charts.sort_unstable();
        hasher.update((charts.len() as u64).to_be_bytes());
        for record in &charts {
            hasher.update(record);
        }

        hex::encode(hasher.finalize())
    }

    /// Computes the fingerprint of an optional state.
    ///
    /// Absent states have no fingerprint.
    #[must_use]
    pub fn hash_optional(&self, state: Option<&EnvironmentState>) -> Option<String> {
        state.map(|s| self.hash_state(s))
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}

/// Appends a length-prefixed field so that adjacent fields cannot run together.
fn push_field(record: &mut Vec<u8>, field: &str) {
    record.extend_from_slice(&(field.len() as u64).to_be_bytes());
    record.extend_from_slice(field.as_bytes());
}

fn commit_record(commit: &GitCommit) -> Vec<u8> {
    let mut record = Vec::new();
    push_field(&mut record, &commit.repo_url);
    push_field(&mut record, &commit.id);
    record
}

fn image_record(image: &Image) -> Vec<u8> {
    let mut record = Vec::new();
    push_field(&mut record, &image.repo_url);
    push_field(&mut record, &image.tag);
    record
}

fn chart_record(chart: &Chart) -> Vec<u8> {
    let mut record = Vec::new();
    push_field(&mut record, &chart.registry_url);
    push_field(&mut record, &chart.name);
    push_field(&mut record, &chart.version);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> EnvironmentState {
        EnvironmentState::new()
            .with_commit(GitCommit::new("https://github.com/example/app", "abc123"))
            .with_image(Image::new("foo", "1.0.0"))
            .with_image(Image::new("bar", "1.0.0"))
            .with_chart(Chart::new("r1", "c1", "v1"))
            .with_chart(Chart::new("r2", "c2", "v2"))
    }

    #[test]
    fn test_hash_deterministic() {
        let hasher = MaterialsHasher::new();
        let state = sample_state();

        assert_eq!(hasher.hash_state(&state), hasher.hash_state(&state));
        assert_eq!(hasher.hash_state(&state).len(), 64);
    }

    #[test]
    fn test_hash_ignores_order() {
        let hasher = MaterialsHasher::new();
        let state = sample_state();
        let mut reordered = state.clone();
        reordered.images.reverse();
        reordered.charts.reverse();

        assert_eq!(hasher.hash_state(&state), hasher.hash_state(&reordered));
    }

    #[test]
    fn test_hash_counts_duplicates() {
        let hasher = MaterialsHasher::new();
        let one = EnvironmentState::new().with_image(Image::new("x", "1"));
        let two = one.clone().with_image(Image::new("x", "1"));

        assert_ne!(hasher.hash_state(&one), hasher.hash_state(&two));
    }

    #[test]
    fn test_hash_field_boundaries() {
        let hasher = MaterialsHasher::new();
        let lhs = EnvironmentState::new().with_image(Image::new("ab", "c"));
        let rhs = EnvironmentState::new().with_image(Image::new("a", "bc"));

        assert_ne!(hasher.hash_state(&lhs), hasher.hash_state(&rhs));
    }

    #[test]
    fn test_hash_distinguishes_absent_commit() {
        let hasher = MaterialsHasher::new();
        let unpinned = EnvironmentState::new();
        let pinned = EnvironmentState::new().with_commit(GitCommit::new("", ""));

        assert_ne!(hasher.hash_state(&unpinned), hasher.hash_state(&pinned));
        assert!(hasher.hash_optional(None).is_none());
    }

    #[test]
    fn test_short_hash() {
        let short = MaterialsHasher::short_hash("abcdef1234567890abcdef1234567890");
        assert_eq!(short, "abcdef12");
    }
}
