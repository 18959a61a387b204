use std::fs;
use std::path::PathBuf;

use stagetree_ops::{CapturingReporter, EntryKind, FileOps, FsErrorKind, TreeMirror};
use stagetree_scan::TreeWalker;
use tempfile::TempDir;

const NO_IGNORE: &[&str] = &[];

/// `/a/x.txt`, `/a/b/y.txt`.
fn create_source(root: &std::path::Path) -> PathBuf {
    let src = root.join("a");
    fs::create_dir_all(src.join("b")).unwrap();
    fs::write(src.join("x.txt"), "hello").unwrap();
    fs::write(src.join("b/y.txt"), "world").unwrap();
    src
}

#[test]
fn test_copy_tree_scenario() {
    let temp = TempDir::new().unwrap();
    let src = create_source(temp.path());
    let out = temp.path().join("out");

    TreeMirror::new().copy_tree(&src, &out, &["skip"]).unwrap();

    assert_eq!(fs::read_to_string(out.join("x.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(out.join("b/y.txt")).unwrap(), "world");
    assert_eq!(
        TreeWalker::new().list_directories_recursive(&out),
        vec![out.join("b")]
    );
}

#[test]
fn test_copy_tree_preserves_relative_listing() {
    let temp = TempDir::new().unwrap();
    let src = create_source(temp.path());
    fs::create_dir_all(src.join("b/c/d")).unwrap();
    fs::write(src.join("b/c/d/deep.bin"), [0u8, 159, 146, 150]).unwrap();
    fs::create_dir(src.join("empty")).unwrap();
    let out = temp.path().join("out");

    TreeMirror::new().copy_tree(&src, &out, NO_IGNORE).unwrap();

    let walker = TreeWalker::new();
    assert_eq!(walker.list_files_relative(&src), walker.list_files_relative(&out));
    assert_eq!(
        walker.list_directories_relative(&src),
        walker.list_directories_relative(&out)
    );
    assert_eq!(
        fs::read(out.join("b/c/d/deep.bin")).unwrap(),
        vec![0u8, 159, 146, 150]
    );
}

#[test]
fn test_ignored_descendants_are_absent() {
    let temp = TempDir::new().unwrap();
    let src = create_source(temp.path());
    fs::create_dir_all(src.join("b/skip_this/inner")).unwrap();
    fs::write(src.join("b/skip_this/inner/z.txt"), "z").unwrap();
    fs::write(src.join("b/file_to_skip.txt"), "z").unwrap();
    let out = temp.path().join("out");

    let summary = TreeMirror::new().copy_tree(&src, &out, &["skip"]).unwrap();

    assert_eq!(summary.skipped, 2);
    assert!(!out.join("b/skip_this").exists());
    assert!(!out.join("b/file_to_skip.txt").exists());
    assert!(out.join("b/y.txt").exists());
}

#[test]
fn test_ignore_is_substring_not_segment() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(src.join("library")).unwrap();
    fs::write(src.join("library/l.txt"), "l").unwrap();
    let out = temp.path().join("out");

    TreeMirror::new().copy_tree(&src, &out, &["lib"]).unwrap();
    assert!(!out.join("library").exists());
}

#[test]
fn test_child_failure_aborts_whole_copy() {
    let temp = TempDir::new().unwrap();
    let src = create_source(temp.path());
    let out = temp.path().join("out");
    fs::create_dir_all(out.join("b")).unwrap();
    fs::write(out.join("b/y.txt"), "already here").unwrap();

    let reporter = CapturingReporter::new();
    let err = TreeMirror::with_reporter(reporter.clone())
        .copy_tree(&src, &out, NO_IGNORE)
        .unwrap_err();

    assert_eq!(err.kind(), FsErrorKind::AlreadyExists);
    assert_eq!(err.path(), &out.join("b/y.txt"));
    assert_eq!(fs::read_to_string(out.join("b/y.txt")).unwrap(), "already here");

    let messages = reporter.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Failed to copy directory"));
    assert!(messages[0].contains("y.txt"));
}

#[test]
fn test_copy_file_of_directory_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let src = create_source(temp.path());
    let dst = temp.path().join("copy");

    let err = FileOps::with_reporter(CapturingReporter::new())
        .copy_file(&src, &dst)
        .unwrap_err();
    assert_eq!(err.kind(), FsErrorKind::TypeMismatch);
    assert!(!dst.exists());
}

#[test]
fn test_delete_tree_after_copy() {
    let temp = TempDir::new().unwrap();
    let src = create_source(temp.path());
    let out = temp.path().join("out");
    let mirror = TreeMirror::new();

    mirror.copy_tree(&src, &out, NO_IGNORE).unwrap();
    mirror.delete_tree(&out).unwrap();
    assert!(!out.exists());
    mirror.delete_tree(&out).unwrap();
    assert!(src.join("b/y.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_links_are_copied_as_links() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let src = create_source(temp.path());
    symlink("x.txt", src.join("x_link")).unwrap();
    symlink("b", src.join("b_link")).unwrap();
    symlink("..", src.join("b/loop")).unwrap();
    symlink("gone.txt", src.join("dangling")).unwrap();
    let out = temp.path().join("out");

    let summary = TreeMirror::new().copy_tree(&src, &out, NO_IGNORE).unwrap();
    assert_eq!(summary.links, 4);
    assert_eq!(summary.files, 2);

    for (name, target) in [
        ("x_link", "x.txt"),
        ("b_link", "b"),
        ("b/loop", ".."),
        ("dangling", "gone.txt"),
    ] {
        let copied = out.join(name);
        assert_eq!(EntryKind::of(&copied).unwrap(), Some(EntryKind::Symlink));
        assert_eq!(fs::read_link(&copied).unwrap(), PathBuf::from(target));
    }
}

#[test]
fn test_single_entry_round_trip() {
    let temp = TempDir::new().unwrap();
    let ops = FileOps::new();
    let dir = temp.path().join("stage/nested");

    ops.create_directory(&dir).unwrap();
    ops.write_file(dir.join("a.txt"), "payload").unwrap();
    ops.rename_file(dir.join("a.txt"), dir.join("b.txt")).unwrap();
    assert_eq!(ops.read_file_to_string(dir.join("b.txt")).unwrap(), "payload");
    ops.delete_file(dir.join("b.txt")).unwrap();
    ops.delete_directory(temp.path().join("stage")).unwrap();
    assert!(!temp.path().join("stage").exists());
}
