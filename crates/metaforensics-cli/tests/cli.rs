use assert_cmd::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const TAMPERED_PDF: &str = r#"{
    "filename": "invoice.pdf",
    "file_extension": ".pdf",
    "fs_created": "2024-06-10T08:00:00",
    "fs_modified": "2024-06-01T08:00:00",
    "pdf_author": "",
    "pdf_title": "",
    "pdf_creationdate": "D:20240101000000+00'00'",
    "docx_error": "File is not a zip file"
}"#;

const CLEAN_DOCX: &str = r#"{
    "file_extension": ".docx",
    "fs_created": "2024-03-01T10:00:00",
    "fs_modified": "2024-03-02T10:00:00",
    "docx_author": "Jane Smith",
    "docx_title": "Lease agreement",
    "docx_created": "2024-03-01T10:01:00",
    "docx_modified": "2024-03-02T10:00:30"
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = cargo_bin_cmd!("metaforensics").args(args).output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn analyze_prints_file_envelope() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "record.json", TAMPERED_PDF);

    let json = run_json(&[
        "analyze",
        path.to_str().unwrap(),
        "--now",
        "2024-06-15T09:00:00",
    ]);

    assert_eq!(json["filename"], "invoice.pdf");
    assert_eq!(json["file_type"], ".pdf");
    assert_eq!(json["forensic_flags"]["risk_score"], 9);
    assert_eq!(json["forensic_flags"]["summary"]["status"], "suspicious");
    assert_eq!(
        json["cross_check"]["fs_created_vs_doc_created"]["document"],
        "D:20240101000000+00'00'"
    );
    assert_eq!(json["errors"]["docx_error"], "File is not a zip file");
    assert!(json["document_metadata"].get("docx_error").is_none());
    assert_eq!(json["document_metadata"]["pdf_author"], "");
}

#[test]
fn analyze_text_output_without_color() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "clean.docx.json", CLEAN_DOCX);

    cargo_bin_cmd!("metaforensics")
        .env("NO_COLOR", "1")
        .args([
            "analyze",
            path.to_str().unwrap(),
            "--format",
            "text",
            "--now",
            "2024-06-15T09:00:00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("CLEAN"))
        .stdout(predicate::str::contains("Found 0 potential issues with risk score 0"))
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn analyze_with_policy_file() {
    let dir = TempDir::new().unwrap();
    let record = write(
        &dir,
        "record.json",
        r#"{
            "file_extension": ".pdf",
            "pdf_author": "Jane",
            "fs_created": "2024-01-01T00:00:00",
            "pdf_creationdate": "D:20240101001000"
        }"#,
    );
    let policy = write(&dir, "policy.yaml", "document_tolerance_secs: 900\n");

    let strict = run_json(&["analyze", record.to_str().unwrap(), "--now", "2024-06-01"]);
    assert_eq!(strict["forensic_flags"]["total_flags"], 1);

    let relaxed = run_json(&[
        "analyze",
        record.to_str().unwrap(),
        "--now",
        "2024-06-01",
        "--policy",
        policy.to_str().unwrap(),
    ]);
    assert_eq!(relaxed["forensic_flags"]["total_flags"], 0);
}

#[test]
fn analyze_rejects_invalid_policy() {
    let dir = TempDir::new().unwrap();
    let record = write(&dir, "record.json", CLEAN_DOCX);
    let policy = write(&dir, "policy.yaml", "tolerance: 5\n");

    cargo_bin_cmd!("metaforensics")
        .args([
            "analyze",
            record.to_str().unwrap(),
            "--policy",
            policy.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to load policy"));
}

#[test]
fn analyze_errors_on_missing_input() {
    cargo_bin_cmd!("metaforensics")
        .args(["analyze", "does-not-exist.json"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn analyze_errors_on_non_object_record() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "list.json", "[1, 2, 3]");

    cargo_bin_cmd!("metaforensics")
        .args(["analyze", path.to_str().unwrap()])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn batch_reports_unreadable_files_as_errors() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.json", CLEAN_DOCX);
    let bad = write(&dir, "bad.json", "{ not json");

    let json = run_json(&[
        "batch",
        good.to_str().unwrap(),
        bad.to_str().unwrap(),
        "--now",
        "2024-06-15T09:00:00",
    ]);

    assert_eq!(json["total_files"], 2);
    assert_eq!(json["successful"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["results"][0]["filename"], "good.json");
    assert!(json["errors"][0]["filename"]
        .as_str()
        .unwrap()
        .ends_with("bad.json"));
}

#[test]
fn normalize_date_prints_normalized_value() {
    cargo_bin_cmd!("metaforensics")
        .args(["normalize-date", "D:20230615120000+00'00'"])
        .assert()
        .success()
        .stdout("2023-06-15T12:00:00\n");

    cargo_bin_cmd!("metaforensics")
        .args(["normalize-date", "D:2023"])
        .assert()
        .success()
        .stdout("unparseable\n");
}

#[test]
fn compare_dates_reports_backdating() {
    let json = run_json(&[
        "compare-dates",
        "2024-01-01T00:10:00",
        "2024-01-01T00:00:00",
    ]);

    assert_eq!(json["status"], "anomaly");
    assert_eq!(json["difference_seconds"], 600.0);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("possible backdating"));
}

#[test]
fn compare_dates_respects_tolerance() {
    let json = run_json(&[
        "compare-dates",
        "2024-01-01T00:10:00",
        "2024-01-01T00:00:00",
        "--tolerance",
        "600",
    ]);

    assert_eq!(json["status"], "consistent");
}

#[test]
fn compare_dates_incomplete_on_garbage() {
    let json = run_json(&["compare-dates", "yesterday", "2024-01-01"]);
    assert_eq!(json["status"], "incomplete");
}
