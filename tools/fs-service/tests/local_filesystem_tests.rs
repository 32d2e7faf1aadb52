use fs_service::{FileService, FileServiceConfig, FileSystem, FileSystemError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

fn local_service() -> FileService {
    FileService::new(&FileServiceConfig::default())
}

fn create_test_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_write_then_read() {
    let temp = TempDir::new().unwrap();
    let service = local_service();

    let dir = service.write(b"123", "upload.txt", temp.path()).unwrap();

    assert_eq!(dir, temp.path());
    assert_eq!(service.read(&temp.path().join("upload.txt")).unwrap(), b"123");
}

#[test]
fn test_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    create_test_file(&temp.path().join("upload.txt"), b"old content");

    service.write(b"new", "upload.txt", temp.path()).unwrap();

    assert_eq!(fs::read(temp.path().join("upload.txt")).unwrap(), b"new");
}

#[test]
fn test_write_into_missing_dir_fails() {
    let temp = TempDir::new().unwrap();
    let service = local_service();

    let result = service.write(b"123", "upload.txt", &temp.path().join("missing"));

    assert!(matches!(result, Err(FileSystemError::Io(_))));
}

#[test]
fn test_exists() {
    let file = NamedTempFile::new().unwrap();
    let service = local_service();
    let missing = PathBuf::from(format!("{}TEST", file.path().display()));

    assert!(service.exists(file.path()));
    assert!(!service.exists(&missing));
}

#[test]
fn test_delete() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let path = temp.path().join("doomed.txt");
    create_test_file(&path, b"bye");

    service.delete(&path).unwrap();

    assert!(!service.exists(&path));
    assert!(matches!(service.delete(&path), Err(FileSystemError::NotFound(_))));
}

#[test]
fn test_is_dir() {
    let file = NamedTempFile::new().unwrap();
    let service = local_service();

    assert!(!service.is_dir(file.path()));
    assert!(service.is_dir(file.path().parent().unwrap()));
}

#[test]
fn test_extension() {
    let service = local_service();

    assert_eq!(service.extension(Path::new("/a/b/file.php")).as_deref(), Some("php"));
    assert_eq!(service.extension(Path::new("/a/b/README")), None);
}

#[test]
fn test_mime() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let text = temp.path().join("notes.txt");
    let image = temp.path().join("pixel.bin");
    create_test_file(&text, b"plain old text\n");
    create_test_file(&image, &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D]);

    assert_eq!(service.mime(&text).as_deref(), Some("text/plain"));
    assert_eq!(service.mime(&image).as_deref(), Some("image/png"));
    assert_eq!(service.mime(&temp.path().join("missing")), None);
}

#[test]
fn test_mk_dir() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let path = temp.path().join("one").join("two");

    assert!(service.mk_dir(&path).unwrap());
    assert!(path.is_dir());
    assert!(!service.mk_dir(&path).unwrap());
}

#[test]
fn test_relative_path() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let test_dir = temp.path().join("testDir/");
    fs::create_dir_all(&test_dir).unwrap();

    let with_base = service.relative_path(&test_dir, "upload.txt", Some(temp.path()));
    let without_base = service.relative_path(&test_dir, "upload.txt", None);

    assert_eq!(with_base, "testDir/");
    assert_eq!(without_base, "testDir/");
}

#[test]
fn test_copy_missing_source_is_noop() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let dst = temp.path().join("copy.txt");

    assert!(!service.copy_path(&temp.path().join("missing.txt"), &dst).unwrap());
    assert!(!dst.exists());
}

#[test]
fn test_copy_file_to_file() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let src = temp.path().join("source.txt");
    let dst = temp.path().join("nested").join("copy.txt");
    create_test_file(&src, b"payload");

    assert!(service.copy_path(&src, &dst).unwrap());
    assert!(service.exists(&dst));
    assert_eq!(fs::read(&dst).unwrap(), b"payload");
}

#[test]
fn test_copy_file_onto_directory_is_refused() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let src = temp.path().join("source.txt");
    let dst = temp.path().join("target");
    create_test_file(&src, b"payload");
    fs::create_dir_all(&dst).unwrap();

    assert!(!service.copy_path(&src, &dst).unwrap());
    assert!(fs::read_dir(&dst).unwrap().next().is_none());
}

#[test]
fn test_copy_directory_into_directory() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let src = temp.path().join("testDir");
    let dst = temp.path().join("testDir2");
    create_test_file(&src.join("a.txt"), b"a");
    create_test_file(&src.join("sub").join("b.txt"), b"b");
    fs::create_dir_all(src.join("empty")).unwrap();
    fs::create_dir_all(&dst).unwrap();

    assert!(service.copy_path(&src, &dst).unwrap());

    assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"a");
    assert_eq!(fs::read(dst.join("sub").join("b.txt")).unwrap(), b"b");
    assert!(dst.join("empty").is_dir());
    assert!(src.join("a.txt").exists());
}

#[test]
fn test_copy_directory_to_file_path_is_refused() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let src = temp.path().join("testDir");
    let dst_dir = temp.path().join("testDir2");
    create_test_file(&src.join("a.txt"), b"a");
    fs::create_dir_all(&dst_dir).unwrap();

    // Destination that does not exist yet
    let new_file = dst_dir.join("test1234");
    assert!(!service.copy_path(&src, &new_file).unwrap());
    assert!(!new_file.exists());

    // Destination that is an existing file
    let existing = dst_dir.join("existing.txt");
    create_test_file(&existing, b"keep me");
    assert!(!service.copy_path(&src, &existing).unwrap());
    assert_eq!(fs::read(&existing).unwrap(), b"keep me");
}

#[test]
fn test_copy_directory_into_itself_is_refused() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let child = temp.path().join("child");
    create_test_file(&temp.path().join("a.txt"), b"a");
    fs::create_dir_all(&child).unwrap();

    assert!(!service.copy_path(temp.path(), &child).unwrap());
    assert!(!child.join("a.txt").exists());
}

#[test]
fn test_dir_lists_all_files_sorted() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let root = fs::canonicalize(temp.path()).unwrap();
    create_test_file(&root.join("zeta.txt"), b"z");
    create_test_file(&root.join("alpha").join("beta.txt"), b"b");
    create_test_file(&root.join("alpha").join("deep").join("gamma.txt"), b"g");
    fs::create_dir_all(root.join("empty")).unwrap();

    let files = service.dir(temp.path(), &[]).unwrap();

    assert_eq!(
        files,
        vec![
            root.join("alpha").join("beta.txt"),
            root.join("alpha").join("deep").join("gamma.txt"),
            root.join("zeta.txt"),
        ]
    );
}

#[test]
fn test_dir_sorts_by_path_string() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let root = fs::canonicalize(temp.path()).unwrap();
    create_test_file(&root.join("foo.rs"), b"");
    create_test_file(&root.join("foo").join("bar.rs"), b"");

    let files = service.dir(&root, &[]).unwrap();

    assert_eq!(files, vec![root.join("foo.rs"), root.join("foo").join("bar.rs")]);
}

#[test]
fn test_dir_skips_restricted_directories() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let root = fs::canonicalize(temp.path()).unwrap();
    create_test_file(&root.join("src").join("lib.rs"), b"");
    create_test_file(&root.join("target").join("debug").join("build.log"), b"");
    create_test_file(&root.join("target").join("cache.bin"), b"");

    let files = service.dir(&root, &[root.join("target")]).unwrap();

    assert_eq!(files, vec![root.join("src").join("lib.rs")]);
}

#[test]
fn test_dir_restrict_needs_exact_path() {
    let temp = TempDir::new().unwrap();
    let service = local_service();
    let root = fs::canonicalize(temp.path()).unwrap();
    create_test_file(&root.join("target").join("cache.bin"), b"");

    // A trailing-component prefix is not a match
    let files = service.dir(&root, &[root.join("targ")]).unwrap();

    assert_eq!(files, vec![root.join("target").join("cache.bin")]);
}

#[test]
fn test_dir_missing_root_fails() {
    let temp = TempDir::new().unwrap();
    let service = local_service();

    let result = service.dir(&temp.path().join("missing"), &[]);

    assert!(matches!(result, Err(FileSystemError::NotFound(_))));
}
