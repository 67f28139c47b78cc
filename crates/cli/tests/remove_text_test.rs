//! Tests for the remove-all-text CLI tool:
//! - argument count handling
//! - successful edit
//! - encrypted and malformed input

use std::path::Path;
use std::process::Command;

use lopdf::{Document, Object, Stream, dictionary};

// ============================================================================
// Helper functions
// ============================================================================

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_remove-all-text")
}

/// Run the tool and return (exit_code, stdout, stderr).
fn run(args: &[&Path]) -> (i32, String, String) {
    let output = Command::new(bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run remove-all-text");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

/// One page drawing `content`, optionally with an `/Encrypt` trailer entry.
fn write_pdf(path: &Path, content: &[u8], encrypted: bool) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Object::Stream(Stream::new(
        lopdf::Dictionary::new(),
        content.to_vec(),
    )));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    if encrypted {
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1i64,
            "R" => 2i64,
            "O" => Object::string_literal(vec![0u8; 32]),
            "U" => Object::string_literal(vec![0u8; 32]),
            "P" => -4i64,
        });
        doc.trailer.set("Encrypt", encrypt_id);
    }
    doc.save(path).expect("failed to save test PDF");
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_wrong_argument_count_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");

    let (code, _, stderr) = run(&[&input]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");

    let (code, _, _) = run(&[]);
    assert_ne!(code, 0);
}

#[test]
fn test_removes_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    write_pdf(&input, b"BT /F1 12 Tf (Hello) Tj ET 0 0 m 10 10 l S", false);

    let (code, _, stderr) = run(&[&input, &output]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let doc = Document::load(&output).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let content = doc.get_page_content(page_id).unwrap();
    assert_eq!(content, b"BT\n/F1 12 Tf\nET\n0 0 m\n10 10 l\nS\n".to_vec());
}

#[test]
fn test_encrypted_input_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    write_pdf(&input, b"BT (secret) Tj ET", true);

    let (code, _, stderr) = run(&[&input, &output]);
    assert_eq!(code, 1);
    assert!(
        stderr.contains("Error: Encrypted documents are not supported."),
        "stderr: {stderr}"
    );
    assert!(!output.exists());
}

#[test]
fn test_malformed_content_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    write_pdf(&input, b"BT Tj ET", false);

    let (code, _, stderr) = run(&[&input, &output]);
    assert_eq!(code, 1);
    assert!(stderr.contains("page 1"), "stderr: {stderr}");
    assert!(!output.exists());
}

#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.pdf");
    let output = dir.path().join("out.pdf");

    let (code, _, stderr) = run(&[&input, &output]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("Error: "), "stderr: {stderr}");
}
