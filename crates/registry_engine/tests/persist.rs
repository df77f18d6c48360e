use std::fs;

use registry_engine::{ensure_output_dir, save_xml_download, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("result.xml", b"<a/>").unwrap();
    assert_eq!(first.file_name().unwrap(), "result.xml");
    assert_eq!(fs::read(&first).unwrap(), b"<a/>");

    let second = writer.write("result.xml", b"<b/>").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"<b/>");
}

#[test]
fn output_path_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("result.xml", b"<a/>");
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
    assert!(!file_path.with_file_name("result.xml").exists());
}

#[test]
fn traversal_file_names_are_rejected() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    assert!(matches!(
        writer.write("../escape.xml", b"x"),
        Err(PersistError::InvalidFileName(_))
    ));
}

#[test]
fn download_uses_server_name_when_offered() {
    let temp = TempDir::new().unwrap();
    let saved = save_xml_download(temp.path(), Some("listing.xml"), "ts", b"<OAI-PMH/>").unwrap();
    assert_eq!(saved.file_name().unwrap(), "listing.xml");
    assert_eq!(fs::read(&saved).unwrap(), b"<OAI-PMH/>");
}

#[test]
fn download_falls_back_to_timestamped_name() {
    let temp = TempDir::new().unwrap();
    let saved = save_xml_download(temp.path(), None, "2024-05-01 12:00", b"<x/>").unwrap();
    assert_eq!(
        saved.file_name().unwrap(),
        "OAI_PMH_BUILD_REQ_2024-05-01_12_00_.xml"
    );
}
