use std::fs;

use archive_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("articles").join("css");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_bytes() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("img_0.png", [1u8, 2, 3]).unwrap();
    assert_eq!(first.file_name().unwrap(), "img_0.png");
    assert_eq!(fs::read(&first).unwrap(), vec![1, 2, 3]);

    let second = writer.write("img_0.png", [9u8]).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), vec![9]);

    // Only the target remains; the temp file was renamed away.
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("index.html", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("index.html").exists());
}

#[test]
fn file_in_place_of_output_dir_is_reported_with_its_path() {
    let temp = TempDir::new().unwrap();
    let occupied = temp.path().join("articles");
    fs::write(&occupied, "x").unwrap();

    let err = ensure_output_dir(&occupied).unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
    let message = err.to_string();
    assert!(message.contains("not a directory"), "{message}");
    assert!(message.contains(&occupied.display().to_string()), "{message}");
}
