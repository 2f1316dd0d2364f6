use std::cmp::Ordering;

/// Version string as published by a registry or chart index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub original: String,
    pub parsed: Option<semver::Version>,
}

impl Version {
    pub fn parse(version: &str) -> Self {
        let trimmed = version.trim();
        let parsed = semver::Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed)).ok();
        Version {
            original: version.to_string(),
            parsed,
        }
    }

    /// A version is stable when it carries neither a pre-release nor a build-metadata suffix.
    pub fn is_stable(&self) -> bool {
        match &self.parsed {
            Some(v) => v.pre.is_empty() && v.build.is_empty(),
            None => !self.original.trim().is_empty() && !self.original.contains(['-', '+']),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.parsed, &other.parsed) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.original.cmp(&other.original),
        }
    }
}

/// First stable entry in the given order. The list is not re-sorted.
pub fn first_stable<S: AsRef<str>>(versions: &[S]) -> Option<String> {
    versions
        .iter()
        .map(|v| Version::parse(v.as_ref()))
        .find(Version::is_stable)
        .map(|v| v.original)
}

/// Highest stable version of an unordered list.
pub fn newest_stable<S: AsRef<str>>(versions: &[S]) -> Option<String> {
    versions
        .iter()
        .map(|v| Version::parse(v.as_ref()))
        .filter(Version::is_stable)
        .max()
        .map(|v| v.original)
}
