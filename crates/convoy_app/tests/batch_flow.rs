use std::io::Write;
use std::path::PathBuf;

use convoy_app::driver::Driver;
use convoy_core::{BatchOptions, FileStatus, Tool};
use convoy_engine::{EngineConfig, UploadSettings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn driver_for(server: &MockServer, tool: Tool) -> Driver {
    let config = EngineConfig {
        upload: UploadSettings {
            api_base: url::Url::parse(&server.uri()).unwrap(),
            ..UploadSettings::default()
        },
        ..EngineConfig::default()
    };
    Driver::new(tool, config)
}

fn write_pdf(dir: &tempfile::TempDir, name: &str, len: usize) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&vec![0u8; len]).unwrap();
    path
}

#[tokio::test(flavor = "multi_thread")]
async fn one_pdf_converts_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "filename": "out.docx",
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "report.pdf", 2 * 1024 * 1024);

    let mut driver = driver_for(&server, Tool::PdfToWord);
    driver.add_files(&[pdf]).unwrap();
    let view = driver.run_batch(BatchOptions::Convert {
        target_format: "docx".into(),
    });

    assert_eq!(view.rows.len(), 1);
    let row = &view.rows[0];
    assert_eq!(row.status, FileStatus::Completed);
    assert_eq!(row.progress, 100);
    assert_eq!(
        row.download_url.as_deref(),
        Some(format!("{}/download/out.docx", server.uri()).as_str())
    );
    assert!(row.error.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn service_failure_lands_in_the_error_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": "disk full",
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "report.pdf", 1024);

    let mut driver = driver_for(&server, Tool::PdfToWord);
    driver.add_files(&[pdf]).unwrap();
    let view = driver.run_batch(BatchOptions::Convert {
        target_format: "docx".into(),
    });

    let row = &view.rows[0];
    assert_eq!(row.status, FileStatus::Error);
    assert_eq!(row.error.as_deref(), Some("disk full"));
    assert!(row.download_url.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn mixed_batch_processes_every_file() {
    let server = MockServer::start().await;
    // First call succeeds, second fails, third succeeds again.
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": "unreadable pdf",
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "filename": "ok.docx",
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let first = write_pdf(&dir, "first.pdf", 512);
    let second = write_pdf(&dir, "second.pdf", 512);
    let third = write_pdf(&dir, "third.pdf", 512);

    let mut driver = driver_for(&server, Tool::PdfToWord);
    driver.add_files(&[first, second, third]).unwrap();
    let view = driver.run_batch(BatchOptions::Convert {
        target_format: "docx".into(),
    });

    // The failing first response hits whichever file uploads first; the
    // batch still drives every file to a terminal state.
    let errors = view.rows.iter().filter(|row| row.error.is_some()).count();
    let completed = view
        .rows
        .iter()
        .filter(|row| row.status == FileStatus::Completed)
        .count();
    assert_eq!(errors, 1);
    assert_eq!(completed, 2);
    assert!(!view.batch_running);
}

#[tokio::test(flavor = "multi_thread")]
async fn completed_results_are_saved_to_disk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "filename": "out.docx",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/out.docx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"converted".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "report.pdf", 1024);
    let output = tempfile::tempdir().unwrap();

    let mut driver = driver_for(&server, Tool::PdfToWord);
    driver.add_files(&[pdf]).unwrap();
    driver.run_batch(BatchOptions::Convert {
        target_format: "docx".into(),
    });
    let saved = driver.download_completed(output.path()).unwrap();

    assert_eq!(saved, vec![output.path().join("out.docx")]);
    assert_eq!(std::fs::read(&saved[0]).unwrap(), b"converted");
}

#[tokio::test(flavor = "multi_thread")]
async fn compression_job_polls_to_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "filename": "report.pdf",
            "compression_id": "j-42",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/j-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "completed",
            "download_url": "compressed_j-42.pdf",
            "method": "compressed",
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "report.pdf", 4096);

    let mut driver = driver_for(&server, Tool::PdfCompress);
    driver.add_files(&[pdf]).unwrap();
    let view = driver.run_batch(BatchOptions::Compress {
        level: convoy_core::CompressionLevel::High,
    });

    let row = &view.rows[0];
    assert_eq!(row.status, FileStatus::Completed);
    assert_eq!(row.job_id.as_deref(), Some("j-42"));
    assert_eq!(
        row.download_url.as_deref(),
        Some(format!("{}/download/compressed_j-42.pdf", server.uri()).as_str())
    );
}
