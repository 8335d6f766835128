// Integration tests for the registry store
// Covers matrix init, project registration, and vertical management

use anyhow::Result;
use deep_mind::config::{load_config, save_config, Config, StorePaths};
use deep_mind::store::{
    read_marker, AddVerticalOutcome, InitOutcome, Store, StoreError, VerticalStatus,
};
use std::fs;
use tempfile::TempDir;

/// Setup a store rooted in a temporary directory
fn setup() -> Result<(TempDir, Store)> {
    let temp_dir = TempDir::new()?;
    let store = Store::open(StorePaths::with_root(temp_dir.path().join("deep-mind")));
    Ok((temp_dir, store))
}

#[test]
fn test_init_creates_empty_manifest() -> Result<()> {
    let (_temp, store) = setup()?;

    let outcome = store.init_matrix("proj1")?;
    assert!(matches!(outcome, InitOutcome::Created(_)));

    let manifest = store.load_manifest("proj1")?;
    assert_eq!(manifest.name, "proj1");
    assert!(manifest.projects.is_empty());
    assert!(manifest.verticals.is_empty());
    assert!(!manifest.created.is_empty());

    let changelog = fs::read_to_string(store.paths.changelog_file("proj1"))?;
    assert!(changelog.starts_with("# Changelog\n"));
    assert!(changelog.contains("Matrix 'proj1' created"));

    Ok(())
}

#[test]
fn test_init_existing_matrix_is_noop() -> Result<()> {
    let (_temp, store) = setup()?;

    store.init_matrix("proj1")?;
    store.add_vertical("proj1", "notes")?;

    let outcome = store.init_matrix("proj1")?;
    assert!(matches!(outcome, InitOutcome::AlreadyExists(_)));

    // The existing manifest is untouched
    let manifest = store.load_manifest("proj1")?;
    assert_eq!(manifest.verticals, vec!["notes"]);

    Ok(())
}

#[test]
fn test_register_writes_manifest_and_marker() -> Result<()> {
    let (temp, store) = setup()?;
    store.init_matrix("proj1")?;

    let project_dir = temp.path().join("svc-a");
    let registered = store.register_project("proj1", "svcA", Some(project_dir.clone()))?;

    let manifest = store.load_manifest("proj1")?;
    let record = manifest.projects.get("svcA").expect("project registered");
    assert_eq!(record.path, project_dir.display().to_string());
    assert!(!record.registered.is_empty());

    assert!(registered.marker_path.exists());
    let marker = read_marker(&project_dir)?.expect("marker present");
    assert_eq!(marker.matrix, "proj1");
    assert_eq!(marker.project, "svcA");

    Ok(())
}

#[test]
fn test_register_last_write_wins() -> Result<()> {
    let (temp, store) = setup()?;
    store.init_matrix("proj1")?;

    let first = temp.path().join("first");
    let second = temp.path().join("second");
    store.register_project("proj1", "svcA", Some(first))?;
    store.register_project("proj1", "svcA", Some(second.clone()))?;

    let manifest = store.load_manifest("proj1")?;
    assert_eq!(manifest.projects.len(), 1);
    assert_eq!(
        manifest.projects["svcA"].path,
        second.display().to_string()
    );

    Ok(())
}

#[test]
fn test_register_unknown_matrix_fails() -> Result<()> {
    let (temp, store) = setup()?;

    let result = store.register_project("nope", "svcA", Some(temp.path().to_path_buf()));
    assert!(matches!(result, Err(StoreError::MatrixNotFound(_))));

    Ok(())
}

#[test]
fn test_unregister_removes_entry_and_marker() -> Result<()> {
    let (temp, store) = setup()?;
    store.init_matrix("proj1")?;

    let project_dir = temp.path().join("svc-a");
    let registered = store.register_project("proj1", "svcA", Some(project_dir))?;
    assert!(registered.marker_path.exists());

    store.unregister_project("proj1", "svcA")?;

    let manifest = store.load_manifest("proj1")?;
    assert!(manifest.projects.is_empty());
    assert!(!registered.marker_path.exists());

    Ok(())
}

#[test]
fn test_unregister_missing_project_fails() -> Result<()> {
    let (_temp, store) = setup()?;
    store.init_matrix("proj1")?;

    let result = store.unregister_project("proj1", "ghost");
    assert!(matches!(
        result,
        Err(StoreError::ProjectNotFound { .. })
    ));

    Ok(())
}

#[test]
fn test_unregister_tolerates_missing_marker() -> Result<()> {
    let (temp, store) = setup()?;
    store.init_matrix("proj1")?;

    let project_dir = temp.path().join("svc-a");
    let registered = store.register_project("proj1", "svcA", Some(project_dir))?;
    fs::remove_file(&registered.marker_path)?;

    store.unregister_project("proj1", "svcA")?;
    assert!(store.load_manifest("proj1")?.projects.is_empty());

    Ok(())
}

#[test]
fn test_add_vertical_is_idempotent() -> Result<()> {
    let (_temp, store) = setup()?;
    store.init_matrix("proj1")?;

    let outcome = store.add_vertical("proj1", "api-design")?;
    assert!(matches!(outcome, AddVerticalOutcome::Added(_)));

    let vertical_file = store.paths.vertical_file("proj1", "api-design");
    assert_eq!(fs::read_to_string(&vertical_file)?, "# Api Design\n");

    // Accumulate some content, then add again
    fs::write(&vertical_file, "# Api Design\n\nnotes here\n")?;
    let outcome = store.add_vertical("proj1", "api-design")?;
    assert!(matches!(outcome, AddVerticalOutcome::AlreadyListed));

    let manifest = store.load_manifest("proj1")?;
    assert_eq!(manifest.verticals, vec!["api-design"]);
    assert_eq!(
        fs::read_to_string(&vertical_file)?,
        "# Api Design\n\nnotes here\n"
    );

    Ok(())
}

#[test]
fn test_add_vertical_keeps_existing_file() -> Result<()> {
    let (_temp, store) = setup()?;
    store.init_matrix("proj1")?;

    let vertical_file = store.paths.vertical_file("proj1", "notes");
    fs::write(&vertical_file, "# Notes\n\nalready written\n")?;

    store.add_vertical("proj1", "notes")?;
    assert_eq!(
        fs::read_to_string(&vertical_file)?,
        "# Notes\n\nalready written\n"
    );

    Ok(())
}

#[test]
fn test_remove_vertical_deletes_file() -> Result<()> {
    let (_temp, store) = setup()?;
    store.init_matrix("proj1")?;
    store.add_vertical("proj1", "notes")?;

    store.remove_vertical("proj1", "notes")?;

    let manifest = store.load_manifest("proj1")?;
    assert!(manifest.verticals.is_empty());
    assert!(!store.paths.vertical_file("proj1", "notes").exists());

    Ok(())
}

#[test]
fn test_remove_unlisted_vertical_fails() -> Result<()> {
    let (_temp, store) = setup()?;
    store.init_matrix("proj1")?;

    let result = store.remove_vertical("proj1", "ghost");
    assert!(matches!(
        result,
        Err(StoreError::VerticalNotFound { .. })
    ));

    Ok(())
}

#[test]
fn test_vertical_status_indicator() -> Result<()> {
    let (_temp, store) = setup()?;
    store.init_matrix("proj1")?;
    store.add_vertical("proj1", "notes")?;

    // Skeleton document is heading-only
    assert_eq!(
        store.vertical_status("proj1", "notes")?,
        VerticalStatus::Empty
    );

    let vertical_file = store.paths.vertical_file("proj1", "notes");
    fs::write(&vertical_file, "# Notes\n\nfirst\nsecond\n## Section\n")?;
    assert_eq!(
        store.vertical_status("proj1", "notes")?,
        VerticalStatus::Lines(2)
    );

    fs::remove_file(&vertical_file)?;
    assert_eq!(
        store.vertical_status("proj1", "notes")?,
        VerticalStatus::NoFile
    );

    Ok(())
}

#[test]
fn test_read_vertical_missing_file() -> Result<()> {
    let (_temp, store) = setup()?;
    store.init_matrix("proj1")?;
    store.add_vertical("proj1", "notes")?;
    fs::remove_file(store.paths.vertical_file("proj1", "notes"))?;

    let result = store.read_vertical("proj1", "notes");
    assert!(matches!(result, Err(StoreError::VerticalFileMissing(_))));

    Ok(())
}

#[test]
fn test_list_matrices_counts_and_sorting() -> Result<()> {
    let (_temp, store) = setup()?;
    store.init_matrix("beta")?;
    store.init_matrix("alpha")?;
    store.add_vertical("alpha", "notes")?;

    // Stray entries in the root are ignored
    fs::create_dir_all(store.paths.root.join("not-a-matrix"))?;
    fs::write(store.paths.root.join("config.toml"), "")?;

    let matrices = store.list_matrices()?;
    let names: Vec<_> = matrices.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert_eq!(matrices[0].vertical_count, 1);
    assert_eq!(matrices[0].project_count, 0);

    Ok(())
}

#[test]
fn test_list_matrices_empty_store() -> Result<()> {
    let (_temp, store) = setup()?;
    assert!(store.list_matrices()?.is_empty());
    Ok(())
}

#[test]
fn test_detect_without_marker() -> Result<()> {
    let temp_dir = TempDir::new()?;
    assert!(read_marker(temp_dir.path())?.is_none());
    Ok(())
}

#[test]
fn test_config_round_trip() -> Result<()> {
    let (_temp, store) = setup()?;

    // Missing file falls back to defaults
    let config = load_config(&store.paths)?;
    assert!(config.default_matrix.is_none());

    let config = Config {
        default_matrix: Some("proj1".to_string()),
    };
    save_config(&store.paths, &config)?;

    let loaded = load_config(&store.paths)?;
    assert_eq!(loaded.default_matrix.as_deref(), Some("proj1"));

    Ok(())
}
