pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/status", get(routes::status))
        .route("/api/scan", post(routes::scan))
        .route("/api/report", post(routes::report))
        .route("/api/directory", get(routes::directory))
        .route("/api/drugs", get(routes::list_drugs))
        .route("/api/dosage", post(routes::dosage))
        .route("/api/assets/animation", get(routes::animation))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::imaging::sample_png;
    use crate::application::{
        directory::embedded_contacts,
        knowledge::KnowledgeStore,
        ports::AnimationPort,
        services::{testing::scanner, AssetService, CalculatorService, DirectoryService},
    };
    use crate::domain::detection::{det, Detection};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "tuklas-test-boundary";

    struct NoAnimation;

    #[async_trait]
    impl AnimationPort for NoAnimation {
        async fn fetch(&self) -> Option<serde_json::Value> {
            None
        }
    }

    async fn app(detections: Vec<Detection>, model_present: bool) -> Router {
        let knowledge = Arc::new(KnowledgeStore::embedded().unwrap());
        let state = HttpState {
            scanner: Arc::new(scanner(detections, model_present).await),
            directory: Arc::new(DirectoryService::new(Arc::new(embedded_contacts().unwrap()))),
            calculator: Arc::new(CalculatorService::new(knowledge)),
            assets: Arc::new(AssetService::new(Arc::new(NoAnimation))),
        };
        router(state, 1024 * 1024)
    }

    fn multipart(uri: &str, image: Option<&[u8]>, threshold: Option<&str>) -> Request<Body> {
        let mut body = Vec::new();
        if let Some(image) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"pig.png\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(image);
            body.extend_from_slice(b"\r\n");
        }
        if let Some(t) = threshold {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"threshold\"\r\n\r\n{t}\r\n").as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn status_reports_disabled_scanner() {
        let resp = app(vec![], false)
            .await
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["scanner"]["state"], "disabled");
        assert!(body["scanner"]["reason"].as_str().unwrap().contains("models/missing.onnx"));
        assert_eq!(body["default_page"], "scanner");
        assert_eq!(body["pages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn scan_with_missing_model_is_503_but_directory_works() {
        let app = app(vec![], false).await;
        let resp = app.clone().oneshot(multipart("/api/scan", Some(&sample_png(8, 8)), None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = app
            .oneshot(Request::get("/api/directory?q=tanay").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["found"], true);
        assert_eq!(body["contacts"][0]["municipality"], "Tanay");
    }

    #[tokio::test]
    async fn scan_returns_advisory_and_preview() {
        let mut d = det("Sarcoptic Mange", 0.8);
        d.x2 = 6.0;
        d.y2 = 6.0;
        let resp = app(vec![d], true)
            .await
            .oneshot(multipart("/api/scan", Some(&sample_png(16, 16)), Some("0.5")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["summary"]["count"], 1);
        assert_eq!(body["advisory"]["kind"], "protocol");
        assert_eq!(body["advisory"]["record"]["severity"], "Moderate");
        assert!(body["narrative"].as_str().unwrap().contains("80.0"));
        assert!(body["annotated_image"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn scan_without_image_field_is_400() {
        let resp = app(vec![], true).await.oneshot(multipart("/api/scan", None, Some("0.4"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_threshold_is_400() {
        let resp = app(vec![], true)
            .await
            .oneshot(multipart("/api/scan", Some(&sample_png(8, 8)), Some("loud")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn report_is_a_pdf_attachment() {
        let resp = app(vec![], true)
            .await
            .oneshot(multipart("/api/report", Some(&sample_png(8, 8)), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
        let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.contains("TUKLAS_Report_") && disposition.ends_with(".pdf\""));
    }

    #[tokio::test]
    async fn directory_without_match_is_explicit() {
        let resp = app(vec![], true)
            .await
            .oneshot(Request::get("/api/directory?q=cebu").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(resp).await;
        assert_eq!(body["found"], false);
        assert_eq!(body["contacts"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn dosage_endpoint_quotes_volume() {
        let req = Request::post("/api/dosage")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"weight_kg": 100.0, "drug_name": "Penicillin G Procaine"}"#))
            .unwrap();
        let resp = app(vec![], true).await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["volume_ml"], 10.0);
        assert_eq!(body["administer"], "Administer: 10.00 mL");
    }

    #[tokio::test]
    async fn unknown_drug_is_404() {
        let req = Request::post("/api/dosage")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"weight_kg": 50.0, "drug_name": "Aspirin"}"#))
            .unwrap();
        let resp = app(vec![], true).await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn animation_falls_back() {
        let resp = app(vec![], true)
            .await
            .oneshot(Request::get("/api/assets/animation").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(resp).await["fallback"], true);
    }
}
