//! Registry store: matrix manifests, changelogs, and vertical documents
//!
//! Every operation loads a whole file, mutates it in memory, and writes it
//! back. There is no cross-file transaction: the manifest and the
//! per-project marker are written independently, and concurrent writers
//! against the same matrix race (last writer wins).

use crate::config::StorePaths;
use crate::models::{now_iso, Manifest, ProjectMarker, ProjectRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Marker file written at each registered project's path
pub const MARKER_FILE: &str = ".deep-mind.json";

/// Store-level error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Matrix '{0}' not found")]
    MatrixNotFound(String),

    #[error("Project '{project}' not found in '{matrix}'")]
    ProjectNotFound { matrix: String, project: String },

    #[error("Vertical '{vertical}' not found in '{matrix}'")]
    VerticalNotFound { matrix: String, vertical: String },

    #[error("File for vertical '{0}' not found")]
    VerticalFileMissing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result of `init_matrix`; an existing matrix is a no-op, not an error
#[derive(Debug)]
pub enum InitOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

/// Result of `add_vertical`; a listed vertical is a no-op, not an error
#[derive(Debug)]
pub enum AddVerticalOutcome {
    Added(PathBuf),
    AlreadyListed,
}

/// Coarse content size of a vertical document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerticalStatus {
    /// Count of non-blank, non-heading lines
    Lines(usize),
    Empty,
    NoFile,
}

impl std::fmt::Display for VerticalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerticalStatus::Lines(n) => write!(f, "{} lines", n),
            VerticalStatus::Empty => write!(f, "empty"),
            VerticalStatus::NoFile => write!(f, "no file"),
        }
    }
}

/// Summary row for `list`
#[derive(Debug)]
pub struct MatrixSummary {
    pub name: String,
    pub project_count: usize,
    pub vertical_count: usize,
}

/// Outcome of a successful registration
#[derive(Debug)]
pub struct RegisteredProject {
    pub path: PathBuf,
    pub marker_path: PathBuf,
}

/// The registry store rooted at an explicit directory
pub struct Store {
    pub paths: StorePaths,
}

impl Store {
    pub fn open(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn matrix_exists(&self, matrix: &str) -> bool {
        self.paths.matrix_dir(matrix).exists()
    }

    /// Load a matrix manifest, failing when the matrix is absent
    pub fn load_manifest(&self, matrix: &str) -> Result<Manifest, StoreError> {
        let manifest_file = self.paths.manifest_file(matrix);
        if !manifest_file.exists() {
            return Err(StoreError::MatrixNotFound(matrix.to_string()));
        }
        let content = fs::read_to_string(&manifest_file)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_manifest(&self, matrix: &str, manifest: &Manifest) -> Result<(), StoreError> {
        let manifest_file = self.paths.manifest_file(matrix);
        fs::write(&manifest_file, serde_json::to_string_pretty(manifest)?)?;
        debug!(matrix, path = %manifest_file.display(), "manifest written");
        Ok(())
    }

    /// Create a new matrix directory with an empty manifest and a seeded
    /// changelog. Success-no-op when the directory already exists.
    pub fn init_matrix(&self, name: &str) -> Result<InitOutcome, StoreError> {
        let matrix_dir = self.paths.matrix_dir(name);
        if matrix_dir.exists() {
            return Ok(InitOutcome::AlreadyExists(matrix_dir));
        }

        fs::create_dir_all(&matrix_dir)?;
        self.save_manifest(name, &Manifest::new(name))?;
        self.append_changelog(name, &format!("Matrix '{}' created", name))?;

        Ok(InitOutcome::Created(matrix_dir))
    }

    /// Insert or overwrite a project record, write the marker file at the
    /// project path, and log the change. The marker write is best-effort
    /// relative to the manifest: there is no rollback if it fails.
    pub fn register_project(
        &self,
        matrix: &str,
        project: &str,
        path: Option<PathBuf>,
    ) -> Result<RegisteredProject, StoreError> {
        let mut manifest = self.load_manifest(matrix)?;

        let path = match path {
            Some(p) => p,
            None => std::env::current_dir()?,
        };

        manifest.projects.insert(
            project.to_string(),
            ProjectRecord {
                path: path.display().to_string(),
                registered: now_iso(),
            },
        );
        self.save_manifest(matrix, &manifest)?;

        let marker = ProjectMarker {
            matrix: matrix.to_string(),
            project: project.to_string(),
            registered: now_iso(),
        };
        let marker_path = path.join(MARKER_FILE);
        if let Some(parent) = marker_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&marker_path, serde_json::to_string_pretty(&marker)?)?;
        debug!(matrix, project, path = %marker_path.display(), "marker written");

        self.append_changelog(
            matrix,
            &format!("Project '{}' registered ({})", project, path.display()),
        )?;

        Ok(RegisteredProject { path, marker_path })
    }

    /// Remove a project record and delete its marker file if still present
    pub fn unregister_project(&self, matrix: &str, project: &str) -> Result<(), StoreError> {
        let mut manifest = self.load_manifest(matrix)?;

        let record = manifest
            .projects
            .remove(project)
            .ok_or_else(|| StoreError::ProjectNotFound {
                matrix: matrix.to_string(),
                project: project.to_string(),
            })?;
        self.save_manifest(matrix, &manifest)?;

        let marker_path = Path::new(&record.path).join(MARKER_FILE);
        if marker_path.exists() {
            fs::remove_file(&marker_path)?;
            debug!(matrix, project, path = %marker_path.display(), "marker removed");
        }

        self.append_changelog(matrix, &format!("Project '{}' unregistered", project))?;
        Ok(())
    }

    /// Append a vertical to the list, creating a skeleton document only
    /// when the file is absent. Idempotent for already-listed verticals.
    pub fn add_vertical(
        &self,
        matrix: &str,
        vertical: &str,
    ) -> Result<AddVerticalOutcome, StoreError> {
        let mut manifest = self.load_manifest(matrix)?;

        if manifest.has_vertical(vertical) {
            return Ok(AddVerticalOutcome::AlreadyListed);
        }

        manifest.verticals.push(vertical.to_string());
        self.save_manifest(matrix, &manifest)?;

        let vertical_file = self.paths.vertical_file(matrix, vertical);
        if !vertical_file.exists() {
            fs::write(&vertical_file, format!("# {}\n", skeleton_title(vertical)))?;
        }

        self.append_changelog(matrix, &format!("Vertical '{}' added", vertical))?;
        Ok(AddVerticalOutcome::Added(vertical_file))
    }

    /// Remove a vertical from the list and delete its document if present
    pub fn remove_vertical(&self, matrix: &str, vertical: &str) -> Result<(), StoreError> {
        let mut manifest = self.load_manifest(matrix)?;

        let Some(index) = manifest.verticals.iter().position(|v| v == vertical) else {
            return Err(StoreError::VerticalNotFound {
                matrix: matrix.to_string(),
                vertical: vertical.to_string(),
            });
        };
        manifest.verticals.remove(index);
        self.save_manifest(matrix, &manifest)?;

        let vertical_file = self.paths.vertical_file(matrix, vertical);
        if vertical_file.exists() {
            fs::remove_file(&vertical_file)?;
        }

        self.append_changelog(matrix, &format!("Vertical '{}' removed", vertical))?;
        Ok(())
    }

    /// Coarse content size for a vertical document. Degrades to `NoFile`
    /// when the list names a vertical whose document is missing.
    pub fn vertical_status(&self, matrix: &str, vertical: &str) -> Result<VerticalStatus, StoreError> {
        let vertical_file = self.paths.vertical_file(matrix, vertical);
        if !vertical_file.exists() {
            return Ok(VerticalStatus::NoFile);
        }
        let content = fs::read_to_string(&vertical_file)?;
        let lines = count_content_lines(&content);
        Ok(if lines == 0 {
            VerticalStatus::Empty
        } else {
            VerticalStatus::Lines(lines)
        })
    }

    /// Raw content of a vertical document
    pub fn read_vertical(&self, matrix: &str, vertical: &str) -> Result<String, StoreError> {
        let vertical_file = self.paths.vertical_file(matrix, vertical);
        if !vertical_file.exists() {
            return Err(StoreError::VerticalFileMissing(vertical.to_string()));
        }
        Ok(fs::read_to_string(&vertical_file)?)
    }

    /// Insert a timestamped entry directly after the changelog header, so
    /// entries read most-recent-first. Creates the changelog if missing.
    pub fn append_changelog(&self, matrix: &str, message: &str) -> Result<(), StoreError> {
        let changelog = self.paths.changelog_file(matrix);
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M");
        let entry = format!("\n## {}\n- {}\n", stamp, message);

        let content = if changelog.exists() {
            splice_entry(&fs::read_to_string(&changelog)?, &entry)
        } else {
            format!("# Changelog\n{}", entry)
        };
        fs::write(&changelog, content)?;
        debug!(matrix, message, "changelog entry added");
        Ok(())
    }

    /// All store subdirectories that carry a manifest, sorted by name
    pub fn list_matrices(&self) -> Result<Vec<MatrixSummary>, StoreError> {
        if !self.paths.root.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for dir_entry in fs::read_dir(&self.paths.root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.path().is_dir() {
                continue;
            }
            let name = dir_entry.file_name().to_string_lossy().to_string();
            match self.load_manifest(&name) {
                Ok(manifest) => summaries.push(MatrixSummary {
                    name,
                    project_count: manifest.projects.len(),
                    vertical_count: manifest.verticals.len(),
                }),
                // Skip directories without a readable manifest (best-effort scan)
                Err(err) => debug!(name = %name, %err, "skipping non-matrix directory"),
            }
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }
}

/// Read the project marker from a directory, if any
pub fn read_marker(dir: &Path) -> Result<Option<ProjectMarker>, StoreError> {
    let marker_path = dir.join(MARKER_FILE);
    if !marker_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&marker_path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Splice a new entry directly after the first line of the changelog
fn splice_entry(existing: &str, entry: &str) -> String {
    match existing.split_once('\n') {
        Some((header, rest)) => format!("{}\n{}{}", header, entry, rest),
        None => format!("{}\n{}", existing, entry),
    }
}

/// Count non-blank lines that are not markdown headings
fn count_content_lines(content: &str) -> usize {
    content
        .trim()
        .lines()
        .filter(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .count()
}

/// "release-notes" -> "Release Notes"
fn skeleton_title(vertical: &str) -> String {
    vertical
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_title() {
        assert_eq!(skeleton_title("api-design"), "Api Design");
        assert_eq!(skeleton_title("testing"), "Testing");
        assert_eq!(skeleton_title("CACHING"), "Caching");
    }

    #[test]
    fn test_count_content_lines_skips_headings_and_blanks() {
        let content = "# Title\n\nfirst\n## Section\nsecond\n   \n";
        assert_eq!(count_content_lines(content), 2);
    }

    #[test]
    fn test_count_content_lines_empty_document() {
        assert_eq!(count_content_lines("# Title\n"), 0);
        assert_eq!(count_content_lines(""), 0);
    }

    #[test]
    fn test_splice_entry_after_header() {
        let existing = "# Changelog\n\n## 2024-01-01 10:00\n- old\n";
        let spliced = splice_entry(existing, "\n## 2024-01-02 10:00\n- new\n");
        let new_pos = spliced.find("new").unwrap();
        let old_pos = spliced.find("old").unwrap();
        assert!(spliced.starts_with("# Changelog\n"));
        assert!(new_pos < old_pos);
    }

    #[test]
    fn test_splice_entry_header_only() {
        let spliced = splice_entry("# Changelog", "\n## 2024-01-02 10:00\n- new\n");
        assert!(spliced.starts_with("# Changelog\n"));
        assert!(spliced.contains("- new"));
    }
}
