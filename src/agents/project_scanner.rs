use crate::error::{Result, TflvError};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const TERRAFORM_EXTENSION: &str = "tf";

/// ProjectScannerAgent finds the Terraform files to process
pub struct ProjectScannerAgent {
    project_path: PathBuf,
}

impl ProjectScannerAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Validates the path and lists every `*.tf` file below it, sorted by path.
    /// A single `.tf` file is accepted as well.
    pub fn scan(&self) -> Result<ProjectInfo> {
        if !self.project_path.exists() {
            return Err(TflvError::PathValidation(format!(
                "{} does not exist",
                self.project_path.display()
            )));
        }

        if self.project_path.is_file() {
            if !is_terraform_file(&self.project_path) {
                return Err(TflvError::PathValidation(format!(
                    "{} is not a .tf file",
                    self.project_path.display()
                )));
            }
            return Ok(ProjectInfo {
                root: self.project_path.clone(),
                files: vec![self.project_path.clone()],
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.project_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden_dir(e))
        {
            let entry = entry?;
            if entry.file_type().is_file() && is_terraform_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();

        debug!(
            "Found {} Terraform files under {}",
            files.len(),
            self.project_path.display()
        );
        Ok(ProjectInfo {
            root: self.project_path.clone(),
            files,
        })
    }
}

fn is_terraform_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TERRAFORM_EXTENSION)
}

/// `.terraform`, `.git` and friends. The root itself is never skipped.
fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|n| n.starts_with('.'))
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}
