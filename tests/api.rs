use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use prodboard::config::AppConfig;
use prodboard::serve::{router, AppState};
use tower::ServiceExt;

fn test_router() -> axum::Router {
    router(AppState {
        client: reqwest::Client::new(),
        config: AppConfig::default(),
    })
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn multipart_request(file_name: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
    const BOUNDARY: &str = "prodboard-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"spreadsheet\"; \
             filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/process-data")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let resp = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["ok"], true);
}

#[tokio::test]
async fn csv_upload_yields_extracted_bundle() {
    let csv = "header row\nAvailability,Daily,98,97\nStraight Pass,5,0,3\nDowntime,Daily,0,12\n";
    let resp = test_router()
        .oneshot(multipart_request("metrics.csv", "text/csv", csv.as_bytes()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["source"], "upload");

    let availability = v["data"]["availability"]["daily"].as_array().unwrap();
    assert_eq!(availability.len(), 31);
    assert_eq!(availability[2], 98.0);
    assert_eq!(availability[3], 97.0);

    // Quantity in column 1 flags that day at 100.
    let pct = v["data"]["straightpass"]["percentage"].as_array().unwrap();
    assert_eq!(pct[1], 100.0);
    assert_eq!(pct[2], 0.0);
}

#[tokio::test]
async fn unsupported_upload_falls_back_to_sparse_default() {
    let resp = test_router()
        .oneshot(multipart_request("metrics.pdf", "application/pdf", b"%PDF"))
        .await
        .unwrap();
    // Wrong file type is the client's mistake, not a server failure.
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = json_body(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["source"], "default");
    assert!(v["error"].as_str().unwrap().contains("unsupported"));

    // Sparse fallback: day 1 populated, the rest zero.
    let daily = v["data"]["productivity"]["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 31);
    assert_eq!(daily[0], 112.5);
    assert_eq!(daily[1], 0.0);
}

#[tokio::test]
async fn upload_without_spreadsheet_field_is_an_error() {
    const BOUNDARY: &str = "prodboard-test-boundary";
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let resp = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/process-data")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = json_body(resp).await;
    assert_eq!(v["success"], false);
}

#[tokio::test]
async fn corrupt_workbook_upload_is_a_server_error() {
    let resp = test_router()
        .oneshot(multipart_request(
            "metrics.xlsx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            b"not a zip archive",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let v = json_body(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["source"], "default");
}
