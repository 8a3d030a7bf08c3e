//! Tests for `GET /files/{file_name}`.

use super::*;

#[tokio::test]
async fn serves_a_materialized_file_with_length_and_disposition() {
    let test = build_app(|_| {}).await;
    std::fs::write(test.dir.path().join("report.pdf"), b"%PDF-1.7 data").unwrap();

    let response = get(&test.app, "/files/report.pdf").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/octet-stream"
    );
    assert_eq!(response.headers()["content-length"], "13");
    assert!(
        response.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("report.pdf")
    );
    assert_eq!(body_bytes(response).await, b"%PDF-1.7 data");
}

#[tokio::test]
async fn unknown_file_is_404_with_detail_body() {
    let test = build_app(|_| {}).await;

    let response = get(&test.app, "/files/never-materialized.bin").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"detail": "File not found"}));
}

#[tokio::test]
async fn traversal_names_are_rejected_as_not_found() {
    let test = build_app(|_| {}).await;

    // Percent-encoded separator decodes to "../outside.txt" in the path
    // parameter; files outside the download directory must stay unreachable.
    let response = get(&test.app, "/files/..%2Foutside.txt").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directories_are_not_servable() {
    let test = build_app(|_| {}).await;
    std::fs::create_dir(test.dir.path().join("subdir")).unwrap();

    let response = get(&test.app, "/files/subdir").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
