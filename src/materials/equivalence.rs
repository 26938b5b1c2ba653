//! Materials equivalence.
//!
//! Decides whether two environment snapshots carry the same deployable
//! material. Collections are compared as multisets: order is ignored,
//! multiplicity is not.

use std::collections::HashMap;
use std::hash::Hash;

use super::types::{EnvironmentState, GitCommit};

impl GitCommit {
    /// Compares two optional commits.
    ///
    /// Two absent commits are equal. An absent commit never equals a present
    /// one, whatever its content. Present commits are equal when both the
    /// repository URL and the commit ID match exactly.
    #[must_use]
    pub fn equals(lhs: Option<&Self>, rhs: Option<&Self>) -> bool {
        match (lhs, rhs) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => lhs.repo_url == rhs.repo_url && lhs.id == rhs.id,
            _ => false,
        }
    }
}

impl EnvironmentState {
    /// Compares two optional states for materials equivalence.
    ///
    /// Two absent states are the same; an absent state is never the same as
    /// a present one. Present states are the same when their commits are
    /// equal and their images and charts are equal as multisets.
    #[must_use]
    pub fn same_materials(lhs: Option<&Self>, rhs: Option<&Self>) -> bool {
        match (lhs, rhs) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => lhs.has_same_materials(rhs),
            _ => false,
        }
    }

    /// Compares this state with another present state.
    #[must_use]
    pub fn has_same_materials(&self, other: &Self) -> bool {
        GitCommit::equals(self.git_commit.as_ref(), other.git_commit.as_ref())
            && multiset_eq(&self.images, &other.images)
            && multiset_eq(&self.charts, &other.charts)
    }
}

/// Order-insensitive, count-sensitive comparison of two slices.
pub(crate) fn multiset_eq<T: Eq + Hash>(lhs: &[T], rhs: &[T]) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }

    let mut counts: HashMap<&T, usize> = HashMap::with_capacity(lhs.len());
    for item in lhs {
        *counts.entry(item).or_insert(0) += 1;
    }

    // Equal lengths mean no count can be left over once every rhs item
    // has been matched.
    for item in rhs {
        match counts.get_mut(item) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Chart, Image};

    #[test]
    fn test_git_commit_equals() {
        let cases: Vec<(&str, Option<GitCommit>, Option<GitCommit>, bool)> = vec![
            ("lhs and rhs both absent", None, None, true),
            (
                "only lhs is absent",
                None,
                Some(GitCommit::new("", "")),
                false,
            ),
            (
                "only rhs is absent",
                Some(GitCommit::new("", "")),
                None,
                false,
            ),
            (
                "repo urls differ",
                Some(GitCommit::new("foo", "fake-commit-id")),
                Some(GitCommit::new("bar", "fake-commit-id")),
                false,
            ),
            (
                "commit ids differ",
                Some(GitCommit::new("fake-url", "foo")),
                Some(GitCommit::new("fake-url", "bar")),
                false,
            ),
            (
                "perfect match",
                Some(GitCommit::new("fake-url", "fake-commit-id")),
                Some(GitCommit::new("fake-url", "fake-commit-id")),
                true,
            ),
        ];

        for (name, lhs, rhs, expected) in cases {
            assert_eq!(
                GitCommit::equals(lhs.as_ref(), rhs.as_ref()),
                expected,
                "case: {name}"
            );
            // Symmetric in argument order.
            assert_eq!(
                GitCommit::equals(rhs.as_ref(), lhs.as_ref()),
                expected,
                "case (swapped): {name}"
            );
        }
    }

    #[test]
    fn test_git_commit_reflexive() {
        let commit = GitCommit::new("fake-url", "fake-commit-id");
        assert!(GitCommit::equals(Some(&commit), Some(&commit)));
    }

    fn images(pairs: &[(&str, &str)]) -> Vec<Image> {
        pairs.iter().map(|(r, t)| Image::new(*r, *t)).collect()
    }

    #[test]
    fn test_same_materials() {
        let chart = Chart::new("fake-registry", "fake-chart", "fake-version");
        let another_chart = Chart::new(
            "another-fake-registry",
            "another-fake-chart",
            "another-fake-version",
        );

        let cases: Vec<(&str, Option<EnvironmentState>, Option<EnvironmentState>, bool)> = vec![
            ("lhs and rhs both absent", None, None, true),
            (
                "only lhs is absent",
                None,
                Some(EnvironmentState::new()),
                false,
            ),
            (
                "only rhs is absent",
                Some(EnvironmentState::new()),
                None,
                false,
            ),
            (
                "both empty",
                Some(EnvironmentState::new()),
                Some(EnvironmentState::new()),
                true,
            ),
            (
                "git commits differ",
                Some(EnvironmentState::new().with_commit(GitCommit::new("fake-url", "old-commit"))),
                Some(EnvironmentState::new().with_commit(GitCommit::new("fake-url", "new-commit"))),
                false,
            ),
            (
                "only one side is commit pinned",
                Some(EnvironmentState::new()),
                Some(EnvironmentState::new().with_commit(GitCommit::new("fake-url", "abc"))),
                false,
            ),
            (
                "images have different cardinality",
                Some(EnvironmentState::new()),
                Some(EnvironmentState::new().with_image(Image::new("nginx", "1.23.3"))),
                false,
            ),
            (
                "charts have different cardinality",
                Some(EnvironmentState::new()),
                Some(EnvironmentState::new().with_chart(chart.clone())),
                false,
            ),
            (
                "images have same cardinality, but differ",
                Some(EnvironmentState::new().with_image(Image::new("nginx", "1.23.2"))),
                Some(EnvironmentState::new().with_image(Image::new("nginx", "1.23.3"))),
                false,
            ),
            (
                "charts have same cardinality, but differ",
                Some(EnvironmentState::new().with_chart(chart.clone())),
                Some(EnvironmentState::new().with_chart(Chart::new(
                    "fake-registry",
                    "fake-chart",
                    "different-fake-version",
                ))),
                false,
            ),
            (
                "perfect match in a different order",
                Some(EnvironmentState {
                    git_commit: None,
                    images: images(&[("foo", "1.0.0"), ("bar", "1.0.0")]),
                    charts: vec![chart.clone(), another_chart.clone()],
                }),
                Some(EnvironmentState {
                    git_commit: None,
                    images: images(&[("bar", "1.0.0"), ("foo", "1.0.0")]),
                    charts: vec![another_chart, chart],
                }),
                true,
            ),
        ];

        for (name, lhs, rhs, expected) in cases {
            assert_eq!(
                EnvironmentState::same_materials(lhs.as_ref(), rhs.as_ref()),
                expected,
                "case: {name}"
            );
            assert_eq!(
                EnvironmentState::same_materials(rhs.as_ref(), lhs.as_ref()),
                expected,
                "case (swapped): {name}"
            );
        }
    }

    #[test]
    fn test_same_materials_reflexive() {
        let state = EnvironmentState::new()
            .with_commit(GitCommit::new("fake-url", "fake-commit-id"))
            .with_image(Image::new("nginx", "1.23.3"))
            .with_image(Image::new("nginx", "1.23.3"))
            .with_chart(Chart::new("r", "c", "v"));

        assert!(EnvironmentState::same_materials(Some(&state), Some(&state)));
        assert!(state.has_same_materials(&state.clone()));
    }

    #[test]
    fn test_duplicate_counts_matter() {
        let one = EnvironmentState::new().with_image(Image::new("x", "1"));
        let two = one.clone().with_image(Image::new("x", "1"));

        assert!(!one.has_same_materials(&two));
        assert!(!two.has_same_materials(&one));
    }

    #[test]
    fn test_multiset_eq() {
        let a = Image::new("a", "1");
        let b = Image::new("b", "1");

        let aab = vec![a.clone(), a.clone(), b.clone()];
        let aba = vec![a.clone(), b.clone(), a.clone()];
        let abb = vec![a.clone(), b.clone(), b.clone()];
        let ab = vec![a.clone(), b];
        let aaa = vec![a.clone(), a.clone(), a];

        assert!(multiset_eq(&aab, &aba));
        assert!(!multiset_eq(&aab, &abb));
        assert!(!multiset_eq(&abb, &aab));
        assert!(!multiset_eq(&aab, &ab));
        assert!(!multiset_eq(&aab, &aaa));
        assert!(multiset_eq::<Image>(&[], &[]));
    }

    #[test]
    fn test_mixed_multiplicity_states() {
        let a = Chart::new("r", "a", "1");
        let b = Chart::new("r", "b", "1");

        let lhs = EnvironmentState {
            git_commit: None,
            images: vec![],
            charts: vec![a.clone(), a.clone(), b.clone()],
        };
        let rhs = EnvironmentState {
            git_commit: None,
            images: vec![],
            charts: vec![a, b.clone(), b],
        };

        assert!(!lhs.has_same_materials(&rhs));
    }
}
