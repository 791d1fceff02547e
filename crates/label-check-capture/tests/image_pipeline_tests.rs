//! Integration tests for the image capture pipeline.

use std::io::Write;

use label_check_capture::{ImageCapture, LabelFile, PreviewState};

fn png(bytes: &[u8]) -> LabelFile {
    LabelFile::from_bytes("label.png", "image/png", bytes.to_vec())
}

#[tokio::test]
async fn image_pipeline_tests_rejects_non_image_without_touching_state() {
    let mut capture = ImageCapture::new();
    assert!(capture.accept_and_preview(Some(png(b"png"))).await);
    let before_file = capture.file().cloned();
    let before_preview = capture.preview().cloned();
    let before_sequence = capture.sequence();

    let pdf = LabelFile::from_bytes("label.pdf", "application/pdf", b"%PDF".to_vec());
    assert!(capture.accept(Some(pdf)).is_none());
    assert!(capture.accept(None).is_none());

    assert_eq!(capture.file().cloned(), before_file);
    assert_eq!(capture.preview().cloned(), before_preview);
    assert_eq!(capture.sequence(), before_sequence);
}

#[tokio::test]
async fn image_pipeline_tests_clear_discards_file_and_preview() {
    let mut capture = ImageCapture::new();
    assert!(capture.accept_and_preview(Some(png(b"png"))).await);
    assert!(capture.preview_uri().is_some());

    capture.clear();

    assert!(!capture.has_file());
    assert!(capture.preview_uri().is_none());
    assert!(capture.export_encoded().await.is_none());
}

#[tokio::test]
async fn image_pipeline_tests_preview_is_loading_until_applied() {
    let mut capture = ImageCapture::new();
    let request = capture.accept(Some(png(b"x"))).expect("image accepted");
    assert_eq!(capture.preview(), Some(&PreviewState::Loading));
    assert!(capture.preview_uri().is_none());

    let ready = request.load().await;
    assert!(capture.apply_preview(ready));
    assert_eq!(capture.preview_uri(), Some("data:image/png;base64,eA=="));
}

#[tokio::test]
async fn image_pipeline_tests_read_failure_leaves_pipeline_usable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("gone.png");

    let mut capture = ImageCapture::new();
    assert!(capture.accept_and_preview(Some(LabelFile::from_path(&missing))).await);
    assert!(capture.has_file());
    assert_eq!(capture.preview(), Some(&PreviewState::Unavailable));
    assert!(capture.export_encoded().await.is_none());

    capture.clear();
    assert!(capture.accept_and_preview(Some(png(b"ok"))).await);
    assert!(capture.preview_uri().is_some());
}

#[tokio::test]
async fn image_pipeline_tests_export_reads_file_freshly() {
    let mut file = tempfile::Builder::new()
        .suffix(".jpg")
        .tempfile()
        .expect("temp file");
    file.write_all(b"first").expect("write");
    file.flush().expect("flush");

    let mut capture = ImageCapture::new();
    assert!(capture.accept_and_preview(Some(LabelFile::from_path(file.path()))).await);
    assert_eq!(capture.preview_uri(), Some("data:image/jpeg;base64,Zmlyc3Q="));

    std::fs::write(file.path(), b"second").expect("rewrite");
    let exported = capture.export_encoded().await;
    assert_eq!(exported.as_deref(), Some("data:image/jpeg;base64,c2Vjb25k"));
    assert_eq!(capture.preview_uri(), Some("data:image/jpeg;base64,Zmlyc3Q="));
}
