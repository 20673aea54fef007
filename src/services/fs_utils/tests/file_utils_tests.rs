use super::file_utils::*;
use crate::services::report::MemoryReport;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_prepare_directory_creates_missing() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("fresh").join("nested");
    let mut report = MemoryReport::new();

    prepare_directory(&target, &mut report).unwrap();

    assert!(target.is_dir());
    assert_eq!(report.lines().len(), 1);
    assert!(report.lines()[0].starts_with("(+) Prepared directory"));
}

#[test]
fn test_prepare_directory_clears_existing() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("StudentSubmissions");
    fs::create_dir_all(target.join("old").join("deep")).unwrap();
    fs::write(target.join("stale.txt"), "x").unwrap();
    let mut report = MemoryReport::new();

    prepare_directory(&target, &mut report).unwrap();

    assert!(target.is_dir());
    assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
}

#[test]
fn test_prepare_directory_replaces_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("Doe, Jane");
    fs::write(&target, "not a dir").unwrap();
    let mut report = MemoryReport::new();

    prepare_directory(&target, &mut report).unwrap();
    assert!(target.is_dir());
}

#[test]
fn test_move_entry_file_and_dir() {
    let dir = TempDir::new().unwrap();
    let src_file = dir.path().join("a.txt");
    fs::write(&src_file, "a").unwrap();
    let src_dir = dir.path().join("folder");
    fs::create_dir(&src_dir).unwrap();
    fs::write(src_dir.join("inner.txt"), "b").unwrap();

    let dest = dir.path().join("dest");
    fs::create_dir(&dest).unwrap();

    move_entry(&src_file, &dest.join("a.txt")).unwrap();
    move_entry(&src_dir, &dest.join("folder")).unwrap();

    assert!(!src_file.exists());
    assert!(!src_dir.exists());
    assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "a");
    assert!(dest.join("folder").join("inner.txt").exists());
}

#[test]
fn test_move_entry_missing_source() {
    let dir = TempDir::new().unwrap();
    let result = move_entry(&dir.path().join("ghost"), &dir.path().join("dest"));
    assert!(result.is_err());
}

#[test]
fn test_sorted_entries_orders_by_name() {
    let dir = TempDir::new().unwrap();
    for name in ["c.txt", "a.txt", "b"] {
        fs::write(dir.path().join(name), "").unwrap();
    }

    let names: Vec<String> = sorted_entries(dir.path())
        .unwrap()
        .iter()
        .map(|p| file_name_of(p))
        .collect();
    assert_eq!(names, vec!["a.txt", "b", "c.txt"]);
}

#[test]
fn test_extension_of_lowercases() {
    assert_eq!(
        extension_of(std::path::Path::new("Main.JAVA")),
        Some("java".to_string())
    );
    assert_eq!(extension_of(std::path::Path::new(".gitignore")), None);
}
