use std::fs;

use lunaris_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_and_is_atomic() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("a.vcf.results.tsv", "chrom\tpos\n").unwrap();
    assert_eq!(first.file_name().unwrap(), "a.vcf.results.tsv");
    assert_eq!(fs::read_to_string(&first).unwrap(), "chrom\tpos\n");

    // Replace existing
    let second = writer
        .write_bytes("a.vcf.results.tsv", b"chrom\tpos\nchr1\t1\n")
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "chrom\tpos\nchr1\t1\n");
}

#[test]
fn chunked_write_lands_as_one_file_on_commit() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let mut write = writer.begin("job-1.results.tsv").unwrap();
    write.append(b"chrom\tpos\n").unwrap();
    write.append(b"chr1\t1\n").unwrap();
    write.append(b"chr2\t2\n").unwrap();
    let target = write.commit().unwrap();

    assert_eq!(target.file_name().unwrap(), "job-1.results.tsv");
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "chrom\tpos\nchr1\t1\nchr2\t2\n"
    );
}

#[test]
fn abandoned_write_leaves_no_target_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let mut write = writer.begin("job-1.results.tsv").unwrap();
    write.append(b"partial data").unwrap();
    drop(write);

    assert!(!temp.path().join("job-1.results.tsv").exists());
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("a.vcf.results.tsv", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("a.vcf.results.tsv").exists());
}
