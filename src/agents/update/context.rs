use crate::agents::declaration::Declaration;
use crate::agents::rewrite;
use crate::error::{Result, TflvError};
use hcl_edit::structure::Body;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// One Terraform file loaded for update: its format-preserving body and
/// whether any edit has been made since loading.
#[derive(Debug)]
pub struct FileContext {
    path: PathBuf,
    body: Body,
    dirty: bool,
}

impl FileContext {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let body = hcl_edit::parser::parse_body(&content).map_err(|e| TflvError::Syntax {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("Loaded {} ({} top-level items)", path.display(), body.len());

        Ok(Self {
            path: path.to_path_buf(),
            body,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path as shown in reports.
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Edits a copy and keeps it only when the whole edit succeeded, so a
    /// failed declaration never leaves a partial change behind for a later
    /// save.
    pub fn apply_version(&mut self, declaration: &Declaration, version: &str) -> Result<()> {
        let mut edited = self.body.clone();
        rewrite::apply_version(&mut edited, declaration, version)?;
        self.body = edited;
        self.dirty = true;
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces the file atomically with the edited body, keeping its permissions.
    pub fn save(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let permissions = fs::metadata(&self.path)?.permissions();

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(self.body.to_string().as_bytes())?;
        file.flush()?;
        file.as_file().set_permissions(permissions)?;
        file.persist(&self.path)?;

        debug!("Wrote {}", self.path.display());
        Ok(())
    }
}
