use super::*;
use crate::services::collision::CollisionResolver;
use crate::services::report::MemoryReport;
use crate::test_utils::{create_test_zip, init_test_logger, list_files};
use tempfile::TempDir;

fn student_dir(root: &Path, identity: &str) -> PathBuf {
    let dir = root.join(identity);
    fs::create_dir(&dir).unwrap();
    dir
}

#[test]
fn test_classify() {
    let config = SorterConfig::default();
    let archive = Path::new("1-1 - Doe, Jane - 2024-12-07 21:15:00 - Project.zip");
    let source = Path::new("1-1 - Doe, Jane - 2024-12-07 21:15:00 - Main.java");

    assert!(matches!(
        classify(archive, &config),
        Ok(SubmissionKind::Archive(_))
    ));
    match classify(source, &config).unwrap() {
        SubmissionKind::SingleFile(name) => assert_eq!(name.original_name, "Main.java"),
        other => panic!("Expected SingleFile, got {other:?}"),
    }
    assert!(matches!(
        classify(Path::new("1-1 - Doe, Jane - t - app.exe"), &config),
        Err(PipelineError::UnsupportedSubmissionType(_))
    ));
    assert!(matches!(
        classify(Path::new("Main.java"), &config),
        Err(PipelineError::UnsupportedSubmissionType(_))
    ));
    assert!(matches!(
        classify(Path::new("Makefile"), &config),
        Err(PipelineError::UnsupportedSubmissionType(_))
    ));
}

#[test]
fn test_unpack_expands_archive_and_removes_it() {
    init_test_logger();
    let root = TempDir::new().unwrap();
    let jane = student_dir(root.path(), "Doe, Jane");
    create_test_zip(
        &jane,
        "1-1 - Doe, Jane - 2024-12-07 21:15:00 - Project.zip",
        &[("src/Main.java", b"class Main {}"), ("README.md", b"# hi")],
    );

    let config = SorterConfig::default();
    let mut resolver = CollisionResolver::new();
    let mut extractor = ArchiveExtractor::new(&config, &mut resolver);
    let mut report = MemoryReport::new();

    let summary = unpack_student_dirs(&[jane.clone()], &mut extractor, &mut report).unwrap();

    assert_eq!(summary.expanded, vec![jane.join("2024-12-07 21:15:00 #0")]);
    assert_eq!(
        list_files(&jane),
        vec![
            "2024-12-07 21:15:00 #0/README.md",
            "2024-12-07 21:15:00 #0/src/Main.java",
        ]
    );
    assert!(report.failures().is_empty());
}

#[test]
fn test_unpack_colliding_archives_get_sequential_keys() {
    let root = TempDir::new().unwrap();
    let jane = student_dir(root.path(), "Doe, Jane");
    create_test_zip(
        &jane,
        "1-1 - Doe, Jane - 2024-12-07 21:15:00 - B.zip",
        &[("b.txt", b"b")],
    );
    create_test_zip(
        &jane,
        "1-1 - Doe, Jane - 2024-12-07 21:15:00 - A.zip",
        &[("a.txt", b"a")],
    );

    let config = SorterConfig::default();
    let mut resolver = CollisionResolver::new();
    let mut extractor = ArchiveExtractor::new(&config, &mut resolver);
    let mut report = MemoryReport::new();

    unpack_student_dirs(&[jane.clone()], &mut extractor, &mut report).unwrap();

    // Lexicographic order of the archive names decides the suffix
    assert_eq!(
        list_files(&jane),
        vec!["2024-12-07 21:15:00 #0/a.txt", "2024-12-07 21:15:00 #1/b.txt"]
    );
}

#[test]
fn test_unpack_flattens_single_files() {
    let root = TempDir::new().unwrap();
    let tom = student_dir(root.path(), "Lee, Tom");
    fs::write(
        tom.join("2-2 - Lee, Tom - 2024-12-08 10:02:00 - Main.java"),
        "class Main {}",
    )
    .unwrap();
    fs::write(
        tom.join("2-2 - Lee, Tom - 2024-12-08 10:02:00 - Notes - final.md"),
        "# notes",
    )
    .unwrap();

    let config = SorterConfig::default();
    let mut resolver = CollisionResolver::new();
    let mut extractor = ArchiveExtractor::new(&config, &mut resolver);
    let mut report = MemoryReport::new();

    let summary = unpack_student_dirs(&[tom.clone()], &mut extractor, &mut report).unwrap();

    assert_eq!(summary.flattened.len(), 2);
    assert_eq!(list_files(&tom), vec!["Main.java", "Notes - final.md"]);
}

#[test]
fn test_unpack_flatten_name_taken_keeps_prefixed_file() {
    let root = TempDir::new().unwrap();
    let tom = student_dir(root.path(), "Lee, Tom");
    let early = "2-2 - Lee, Tom - 2024-12-08 10:02:00 - Main.java";
    let late = "2-2 - Lee, Tom - 2024-12-09 08:00:00 - Main.java";
    fs::write(tom.join(early), "v1").unwrap();
    fs::write(tom.join(late), "v2").unwrap();

    let config = SorterConfig::default();
    let mut resolver = CollisionResolver::new();
    let mut extractor = ArchiveExtractor::new(&config, &mut resolver);
    let mut report = MemoryReport::new();

    let summary = unpack_student_dirs(&[tom.clone()], &mut extractor, &mut report).unwrap();

    assert_eq!(summary.flattened, vec![tom.join("Main.java")]);
    assert_eq!(summary.skipped, vec![tom.join(late)]);
    assert_eq!(fs::read_to_string(tom.join("Main.java")).unwrap(), "v1");
    assert!(tom.join(late).exists());
    assert_eq!(report.notices().len(), 1);
}

#[test]
fn test_unpack_leaves_invalid_submissions() {
    let root = TempDir::new().unwrap();
    let jane = student_dir(root.path(), "Doe, Jane");
    let exe = jane.join("1-1 - Doe, Jane - 2024-12-07 21:15:00 - game.exe");
    fs::write(&exe, "MZ").unwrap();

    let config = SorterConfig::default();
    let mut resolver = CollisionResolver::new();
    let mut extractor = ArchiveExtractor::new(&config, &mut resolver);
    let mut report = MemoryReport::new();

    let summary = unpack_student_dirs(&[jane.clone()], &mut extractor, &mut report).unwrap();

    assert_eq!(summary.invalid, vec![exe.clone()]);
    assert!(exe.exists());
    assert_eq!(report.notices().len(), 1);
    assert!(report.notices()[0].message.ends_with("is not a valid submission"));
}

#[test]
fn test_unpack_corrupt_archive_is_fatal() {
    let root = TempDir::new().unwrap();
    let jane = student_dir(root.path(), "Doe, Jane");
    fs::write(
        jane.join("1-1 - Doe, Jane - 2024-12-07 21:15:00 - Project.zip"),
        "garbage",
    )
    .unwrap();

    let config = SorterConfig::default();
    let mut resolver = CollisionResolver::new();
    let mut extractor = ArchiveExtractor::new(&config, &mut resolver);
    let mut report = MemoryReport::new();

    let result = unpack_student_dirs(&[jane], &mut extractor, &mut report);
    assert!(matches!(result, Err(PipelineError::CorruptArchive { .. })));
    assert!(!report.failures().is_empty());
}

#[test]
fn test_unpack_skips_archive_with_unreadable_date() {
    let root = TempDir::new().unwrap();
    let jane = student_dir(root.path(), "Doe, Jane");
    let archive = create_test_zip(
        &jane,
        "1-1 - Doe, Jane - sometime last week - Project.zip",
        &[("Main.java", b"class Main {}")],
    );

    let config = SorterConfig::default();
    let mut resolver = CollisionResolver::new();
    let mut extractor = ArchiveExtractor::new(&config, &mut resolver);
    let mut report = MemoryReport::new();

    let summary = unpack_student_dirs(&[jane.clone()], &mut extractor, &mut report).unwrap();

    assert!(summary.expanded.is_empty());
    assert_eq!(summary.skipped, vec![archive.clone()]);
    assert!(archive.exists());
    assert!(report.failures().is_empty());
    assert_eq!(report.notices().len(), 1);
    assert!(report.notices()[0].message.starts_with("Skipped"));
    // Nothing was extracted next to the archive
    assert_eq!(fs::read_dir(&jane).unwrap().count(), 1);
}

#[test]
fn test_expand_missing_archive_is_recorded_and_skipped() {
    let root = TempDir::new().unwrap();
    let jane = student_dir(root.path(), "Doe, Jane");
    let gone = jane.join("1-1 - Doe, Jane - 2024-12-07 21:15:00 - Project.zip");

    let config = SorterConfig::default();
    let mut resolver = CollisionResolver::new();
    let mut extractor = ArchiveExtractor::new(&config, &mut resolver);
    let mut report = MemoryReport::new();
    let mut summary = UnpackSummary::default();

    expand_archive(&gone, &jane, &mut extractor, &mut report, &mut summary).unwrap();

    assert_eq!(summary.skipped, vec![gone]);
    assert!(summary.expanded.is_empty());
    assert_eq!(report.failures().len(), 1);
    assert!(report.failures()[0]
        .message
        .starts_with("Could not find zip file"));
    assert_eq!(fs::read_dir(&jane).unwrap().count(), 0);
}
