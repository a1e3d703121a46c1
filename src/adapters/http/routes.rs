use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::adapters::http::state::HttpState;
use crate::adapters::imaging;
use crate::application::dto::{
    DirectoryQuery, DirectoryResponse, DosageRequest, DosageResponse, DrugsResponse, PageInfo, ScanResponse,
    StatusResponse,
};
use crate::domain::{errors::DomainError, page::Page, report::CaseMeta};

fn error_response(e: DomainError) -> Response {
    let status = match &e {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::UnreadableImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

/// Campos del formulario de escaneo: `image` (obligatorio) y `threshold`.
async fn read_scan_form(mut multipart: Multipart) -> Result<(Vec<u8>, Option<f32>), Response> {
    let mut image = None;
    let mut threshold = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err((e.status(), Json(json!({ "error": e.body_text() }))).into_response()),
        };
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| (e.status(), Json(json!({ "error": e.body_text() }))).into_response())?;
                image = Some(bytes.to_vec());
            }
            Some("threshold") => {
                let text = field.text().await.unwrap_or_default();
                let value = text.trim().parse::<f32>().map_err(|_| {
                    error_response(DomainError::InvalidInput(format!("threshold is not a number: {text}")))
                })?;
                threshold = Some(value);
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| error_response(DomainError::InvalidInput("missing 'image' field".into())))?;
    Ok((image, threshold))
}

pub async fn status(State(st): State<HttpState>) -> impl IntoResponse {
    Json(StatusResponse {
        scanner: st.scanner.status().clone(),
        pages: Page::ALL.into_iter().map(PageInfo::from).collect(),
        default_page: Page::default(),
        default_threshold: st.scanner.default_threshold(),
    })
}

pub async fn scan(State(st): State<HttpState>, multipart: Multipart) -> Response {
    let (image, threshold) = match read_scan_form(multipart).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };

    let outcome = match st.scanner.scan(&image, threshold).await {
        Ok(outcome) => outcome,
        Err(e) => return error_response(e),
    };

    // La vista previa es accesoria: si falla, la respuesta sale sin ella.
    let detections = outcome.detections.clone();
    let annotated = tokio::task::spawn_blocking(move || imaging::annotate_to_data_uri(&image, &detections))
        .await
        .ok()
        .and_then(|r| r.map_err(|e| warn!("Preview not generated: {}", e)).ok());

    Json(ScanResponse::new(outcome, annotated)).into_response()
}

pub async fn report(State(st): State<HttpState>, multipart: Multipart) -> Response {
    let (image, threshold) = match read_scan_form(multipart).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };

    let case = CaseMeta::generate();
    let file_name = case.file_name();
    match st.scanner.report(image, threshold, case).await {
        Ok((_, pdf)) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
            ],
            pdf,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn directory(State(st): State<HttpState>, Query(query): Query<DirectoryQuery>) -> impl IntoResponse {
    let result = st.directory.search(&query.q);
    Json(DirectoryResponse::new(query.q, result))
}

pub async fn list_drugs(State(st): State<HttpState>) -> impl IntoResponse {
    Json(DrugsResponse { drugs: st.calculator.drugs() })
}

pub async fn dosage(State(st): State<HttpState>, Json(req): Json<DosageRequest>) -> Response {
    match st.calculator.quote(req.weight_kg, &req.drug_name) {
        Ok(quote) => Json(DosageResponse::from(quote)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn animation(State(st): State<HttpState>) -> impl IntoResponse {
    match st.assets.animation().await {
        Some(lottie) => Json(json!({ "fallback": false, "animation": lottie })),
        None => Json(json!({ "fallback": true })),
    }
}
