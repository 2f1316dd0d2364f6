use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub name: String,
    pub old_version: String,
    pub new_version: String,
}

/// Why a declaration was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Preceded by the suppression comment.
    Annotation,
    /// Not in the configured allow-list.
    NotSelected,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::Annotation => write!(f, "annotation"),
            IgnoreReason::NotSelected => write!(f, "not selected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ignore {
    pub name: String,
    pub path: String,
    pub reason: IgnoreReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub name: String,
    pub path: String,
    pub message: String,
}

/// Outcomes of one declaration family (e.g. "Provider") across a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub updated: Vec<Update>,
    pub ignored: Vec<Ignore>,
    pub failed: Vec<Failure>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            updated: Vec::new(),
            ignored: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.ignored.is_empty() && self.failed.is_empty()
    }

    pub fn add_update(&mut self, name: String, old_version: String, new_version: String) {
        self.updated.push(Update {
            name,
            old_version,
            new_version,
        });
    }

    pub fn add_ignore(&mut self, name: String, path: String, reason: IgnoreReason) {
        self.ignored.push(Ignore { name, path, reason });
    }

    pub fn add_failure(&mut self, name: String, path: String, message: String) {
        self.failed.push(Failure {
            name,
            path,
            message,
        });
    }

    /// Appends `other`'s entries and drops duplicates.
    pub fn merge(&mut self, other: Report) {
        self.updated.extend(other.updated);
        self.ignored.extend(other.ignored);
        self.failed.extend(other.failed);
        self.dedupe();
    }

    /// Keeps the first entry per (name, new version) for updates and per
    /// (name, path) for ignores and failures.
    pub fn dedupe(&mut self) {
        let mut seen = HashSet::new();
        self.updated
            .retain(|u| seen.insert((u.name.clone(), u.new_version.clone())));

        let mut seen = HashSet::new();
        self.ignored
            .retain(|i| seen.insert((i.name.clone(), i.path.clone())));

        let mut seen = HashSet::new();
        self.failed
            .retain(|f| seen.insert((f.name.clone(), f.path.clone())));
    }

    pub fn to_markdown(&self) -> String {
        let mut report = self.clone();
        report.dedupe();

        if report.is_empty() {
            return format!("# {}\nNo Changes.", report.title);
        }

        let mut lines = vec![format!("# {}", report.title)];
        if !report.updated.is_empty() {
            lines.push("## Updated".to_string());
            lines.push("| Name | Old Version | New Version |".to_string());
            lines.push("| --- | --- | --- |".to_string());
            lines.extend(
                report
                    .updated
                    .iter()
                    .map(|u| row(&[u.name.as_str(), &u.old_version, &u.new_version])),
            );
        }
        if !report.ignored.is_empty() {
            lines.push("## Ignored".to_string());
            lines.push("| Name | Path |".to_string());
            lines.push("| --- | --- |".to_string());
            lines.extend(report.ignored.iter().map(|i| row(&[i.name.as_str(), &i.path])));
        }
        if !report.failed.is_empty() {
            lines.push("## Failed".to_string());
            lines.push("| Name | Path | Message |".to_string());
            lines.push("| --- | --- | --- |".to_string());
            lines.extend(
                report
                    .failed
                    .iter()
                    .map(|f| row(&[f.name.as_str(), &f.path, &f.message])),
            );
        }

        lines.join("\n")
    }
}

fn row(cells: &[&str]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
    format!("| {} |", cells.join(" | "))
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

/// Reports in the order their titles were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSet {
    reports: Vec<Report>,
}

impl ReportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, incoming: Report) {
        match self.reports.iter_mut().find(|r| r.title == incoming.title) {
            Some(existing) => existing.merge(incoming),
            None => {
                let mut report = incoming;
                report.dedupe();
                self.reports.push(report);
            }
        }
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    #[cfg(test)]
    pub fn get(&self, title: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.title == title)
    }

    pub fn to_markdown(&self) -> String {
        self.reports
            .iter()
            .map(Report::to_markdown)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
