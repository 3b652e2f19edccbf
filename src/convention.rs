//! Commit-type and scope vocabularies, and the checks a record must pass.

use std::collections::BTreeMap;

use crate::CommitRecord;

/// Known names (commit types or scopes) with a description of each.
///
/// Order is kept so that a prompt can list entries as configured.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        from = "Vec<BTreeMap<String, String>>",
        into = "Vec<BTreeMap<String, String>>"
    )
)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Vocabulary {
    entries: Vec<(String, String)>,
}

impl Vocabulary {
    /// The commit types of the Angular convention.
    pub fn angular() -> Self {
        Self::from_iter([
            ("feat", "adds a new feature"),
            ("fix", "fixes a bug"),
            ("docs", "changes only the documentation"),
            (
                "style",
                "changes the style but not the meaning of the code (such as formatting)",
            ),
            ("perf", "improves performance"),
            ("test", "adds or corrects tests"),
            ("build", "changes the build system or external dependencies"),
            ("chore", "changes outside the code, docs, or tests"),
            ("ci", "changes to the Continuous Integration (CI) system"),
            ("refactor", "changes the code without changing behavior"),
            ("revert", "reverts prior changes"),
        ])
    }

    /// `name` is a known entry. Comparison is exact.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The description of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, description)| description.as_str())
    }

    /// Every `(name, description)` pair, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// There are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, D: Into<String>> FromIterator<(N, D)> for Vocabulary {
    /// Later duplicates of a name are dropped.
    fn from_iter<I: IntoIterator<Item = (N, D)>>(iter: I) -> Self {
        let mut vocabulary = Self::default();
        for (name, description) in iter {
            let name = name.into();
            if !vocabulary.contains(&name) {
                vocabulary.entries.push((name, description.into()));
            }
        }
        vocabulary
    }
}

impl From<Vec<BTreeMap<String, String>>> for Vocabulary {
    fn from(maps: Vec<BTreeMap<String, String>>) -> Self {
        maps.into_iter().flatten().collect()
    }
}

impl From<Vocabulary> for Vec<BTreeMap<String, String>> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary
            .entries
            .into_iter()
            .map(|entry| std::iter::once(entry).collect())
            .collect()
    }
}

/// The default for [`Convention::header_max_length`]: keeps `git log --oneline`
/// within 80 columns after a 7-character hash and a space.
pub const HEADER_MAX_LENGTH: usize = 72;

/// The rules a project's commit messages follow.
///
/// When read from config data, an empty `commit_types` or `scopes` list and a
/// `header_max_length` of zero or less keep the default.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "ConventionFile"))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Convention {
    /// Accepted commit types.
    pub commit_types: Vocabulary,
    /// Accepted scopes. An unscoped commit is always accepted.
    pub scopes: Vocabulary,
    /// The longest header, in code points, considered acceptable.
    pub header_max_length: usize,
    /// Report headers longer than `header_max_length`.
    pub enforce_header_max_length: bool,
}

impl Default for Convention {
    fn default() -> Self {
        Self {
            commit_types: Vocabulary::angular(),
            scopes: Vocabulary::default(),
            header_max_length: HEADER_MAX_LENGTH,
            enforce_header_max_length: false,
        }
    }
}

/// `Convention` as written in a config file, before defaults apply.
#[cfg(feature = "serde")]
#[derive(Default, serde::Deserialize)]
#[serde(default, rename = "Convention")]
struct ConventionFile {
    commit_types: Vocabulary,
    scopes: Vocabulary,
    header_max_length: i64,
    enforce_header_max_length: bool,
}

#[cfg(feature = "serde")]
impl From<ConventionFile> for Convention {
    fn from(file: ConventionFile) -> Self {
        let mut convention = Self::default();
        if !file.commit_types.is_empty() {
            convention.commit_types = file.commit_types;
        }
        if !file.scopes.is_empty() {
            convention.scopes = file.scopes;
        }
        if let Ok(max @ 1..) = usize::try_from(file.header_max_length) {
            convention.header_max_length = max;
        }
        convention.enforce_header_max_length = file.enforce_header_max_length;
        convention
    }
}

/// Something about a record that needs fixing before it can be committed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Problem {
    /// The type is empty.
    MissingType,
    /// The type is not in [`Convention::commit_types`].
    InvalidType,
    /// The scope is not in [`Convention::scopes`].
    InvalidScope,
    /// The description is empty.
    MissingDescription,
    /// The header exceeds [`Convention::header_max_length`].
    HeaderTooLong,
}

impl Convention {
    /// Every problem with `record`, in field order. Empty when the record can be
    /// committed as is.
    pub fn check(&self, record: &CommitRecord) -> Vec<Problem> {
        let mut problems = Vec::new();
        if record.type_().is_empty() {
            problems.push(Problem::MissingType);
        } else if !record.type_valid(&self.commit_types) {
            problems.push(Problem::InvalidType);
        }
        if !record.scope_valid(&self.scopes) {
            problems.push(Problem::InvalidScope);
        }
        if record.description().is_empty() {
            problems.push(Problem::MissingDescription);
        }
        if self.enforce_header_max_length
            && record.header().chars().count() > self.header_max_length
        {
            problems.push(Problem::HeaderTooLong);
        }
        problems
    }
}
