//! CLI commands for deep-mind
//!
//! Each command resolves the store, performs a single store operation,
//! and prints the result. Errors surface as printed messages and a
//! nonzero exit status.

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::config::{load_config, save_config, Config, StorePaths};
use crate::store::{self, AddVerticalOutcome, InitOutcome, Store, StoreError};

fn open_store() -> Result<Store> {
    Ok(Store::open(StorePaths::new()?))
}

/// Create a new matrix (success-no-op when it already exists)
pub fn init(matrix: &str) -> Result<()> {
    let store = open_store()?;

    match store.init_matrix(matrix)? {
        InitOutcome::AlreadyExists(dir) => {
            println!("Matrix '{}' already exists at {}", matrix, dir.display());
        }
        InitOutcome::Created(dir) => {
            if !store.paths.config_file().exists() {
                save_config(&store.paths, &Config::default())?;
            }
            println!("Matrix '{}' initialized at {}", matrix, dir.display());
        }
    }
    Ok(())
}

/// Register a project under a matrix, writing its marker file
pub fn register(matrix: &str, project: &str, path: Option<PathBuf>) -> Result<()> {
    let store = open_store()?;

    if !store.matrix_exists(matrix) {
        bail!(
            "Matrix '{}' does not exist. Run `deep-mind init {}` first.",
            matrix,
            matrix
        );
    }

    let registered = store.register_project(matrix, project, path)?;
    println!("Project '{}' registered under '{}'", project, matrix);
    println!("Config written to: {}", registered.marker_path.display());
    Ok(())
}

/// Remove a project from a matrix and delete its marker file
pub fn unregister(matrix: &str, project: &str) -> Result<()> {
    let store = open_store()?;
    store.unregister_project(matrix, project)?;
    println!("Project '{}' removed from '{}'", project, matrix);
    Ok(())
}

/// Add a vertical to a matrix (idempotent)
pub fn add_vertical(matrix: &str, vertical: &str) -> Result<()> {
    let store = open_store()?;

    match store.add_vertical(matrix, vertical)? {
        AddVerticalOutcome::AlreadyListed => {
            println!("Vertical '{}' already exists in '{}'.", vertical, matrix);
        }
        AddVerticalOutcome::Added(file) => {
            println!("Vertical '{}' added to '{}'", vertical, matrix);
            println!("File: {}", file.display());
        }
    }
    Ok(())
}

/// Remove a vertical and its document
pub fn remove_vertical(matrix: &str, vertical: &str) -> Result<()> {
    let store = open_store()?;
    store.remove_vertical(matrix, vertical)?;
    println!("Vertical '{}' removed from '{}'", vertical, matrix);
    Ok(())
}

/// List verticals with a coarse content size indicator
pub fn list_verticals(matrix: &str) -> Result<()> {
    let store = open_store()?;
    let manifest = store.load_manifest(matrix)?;

    if manifest.verticals.is_empty() {
        println!("No verticals in '{}'.", matrix);
        return Ok(());
    }

    for vertical in &manifest.verticals {
        let status = store.vertical_status(matrix, vertical)?;
        println!("  {}: {}", vertical, status);
    }
    Ok(())
}

/// List all matrices with project and vertical counts
pub fn list() -> Result<()> {
    let store = open_store()?;
    let matrices = store.list_matrices()?;

    if matrices.is_empty() {
        println!("No matrices found.");
        return Ok(());
    }

    for summary in matrices {
        println!(
            "  {} ({} projects, {} verticals)",
            summary.name, summary.project_count, summary.vertical_count
        );
    }
    Ok(())
}

/// List projects registered under a matrix
pub fn projects(matrix: &str) -> Result<()> {
    let store = open_store()?;
    let manifest = store.load_manifest(matrix)?;

    if manifest.projects.is_empty() {
        println!("No projects in '{}'.", matrix);
        return Ok(());
    }

    for (name, record) in &manifest.projects {
        println!("  {}: {}", name, record.path);
    }
    Ok(())
}

/// Show matrix status; without an argument, resolve the matrix from the
/// current directory's marker, then the configured default, else list all
pub fn status(matrix: Option<&str>) -> Result<()> {
    let store = open_store()?;

    let matrix = match matrix {
        Some(m) => m.to_string(),
        None => {
            let cwd = std::env::current_dir()?;
            match store::read_marker(&cwd)? {
                Some(marker) => marker.matrix,
                None => match load_config(&store.paths)?.default_matrix {
                    Some(default) => default,
                    None => return list(),
                },
            }
        }
    };

    let manifest = store.load_manifest(&matrix)?;

    println!("Matrix: {}", manifest.name);
    println!(
        "Created: {}",
        manifest.created.get(..10).unwrap_or(&manifest.created)
    );

    println!();
    println!("Projects ({}):", manifest.projects.len());
    for (name, record) in &manifest.projects {
        println!("  - {}: {}", name, record.path);
    }

    println!();
    println!("Verticals ({}):", manifest.verticals.len());
    for vertical in &manifest.verticals {
        let status = store.vertical_status(&matrix, vertical)?;
        println!("  - {}: {}", vertical, status);
    }
    if manifest.verticals.is_empty() {
        println!("  (none)");
    }

    Ok(())
}

/// Print brain content: one vertical, or all of them in list order
pub fn read(matrix: &str, vertical: Option<&str>) -> Result<()> {
    let store = open_store()?;
    let manifest = store.load_manifest(matrix)?;

    match vertical {
        Some(vertical) => {
            if !manifest.has_vertical(vertical) {
                bail!(
                    "Vertical '{}' not registered in '{}'. Available: {}",
                    vertical,
                    matrix,
                    manifest.verticals.join(", ")
                );
            }
            println!("{}", store.read_vertical(matrix, vertical)?);
        }
        None => {
            if manifest.verticals.is_empty() {
                println!("No verticals in '{}'.", matrix);
                return Ok(());
            }
            for vertical in &manifest.verticals {
                match store.read_vertical(matrix, vertical) {
                    Ok(content) => {
                        println!("{}", content);
                        println!();
                    }
                    Err(StoreError::VerticalFileMissing(_)) => {}
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }
    Ok(())
}

/// Append a changelog entry without touching the manifest
pub fn log(matrix: &str, message: &str) -> Result<()> {
    let store = open_store()?;

    if !store.matrix_exists(matrix) {
        bail!("Matrix '{}' does not exist.", matrix);
    }

    store.append_changelog(matrix, message)?;
    println!("Logged.");
    Ok(())
}

/// Print the marker found in the current working directory, if any
pub fn detect() -> Result<()> {
    let cwd = std::env::current_dir()?;

    match store::read_marker(&cwd)? {
        Some(marker) => println!("{}", serde_json::to_string_pretty(&marker)?),
        None => println!("No {} found in current directory.", store::MARKER_FILE),
    }
    Ok(())
}

/// Print the brain directory path for a matrix
pub fn path(matrix: &str) -> Result<()> {
    let store = open_store()?;
    println!("{}", store.paths.matrix_dir(matrix).display());
    Ok(())
}
