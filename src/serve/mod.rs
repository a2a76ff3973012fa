// src/serve/mod.rs
use anyhow::{anyhow, Context, Result};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use calamine::{Data, Reader, Xls, Xlsx};
use chrono::Utc;
use serde::Serialize;
use std::io::Cursor;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::{
    config::AppConfig,
    extract::{self, defaults, KpiBundle},
    fetch,
    table::{self, Table},
};

#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub config: AppConfig,
}

/// JSON envelope around a KPI bundle.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: KpiBundle,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ApiResponse {
    fn ok(data: KpiBundle, source: &str) -> Self {
        Self {
            success: true,
            data,
            source: source.to_string(),
            error: None,
            timestamp: None,
        }
    }

    /// Failure envelope: sparse default data plus the error message, so the
    /// dashboard always has something to draw.
    fn fallback(err: anyhow::Error) -> Self {
        Self {
            success: false,
            data: defaults::SPARSE_DEFAULT.clone(),
            source: "default".to_string(),
            error: Some(err.to_string()),
            timestamp: None,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/data", get(api_data))
        .route("/api/refresh", get(api_refresh))
        .route("/api/process-data", post(api_process_data))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

pub async fn run(config: AppConfig) -> Result<()> {
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let state = AppState {
        client: reqwest::Client::new(),
        config,
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// Fetch, parse and extract in one go. Extraction itself is total; only the
/// transport can fail here.
async fn load_sheet_bundle(state: &AppState) -> Result<KpiBundle> {
    let raw = fetch::fetch_sheet_csv(&state.client, &state.config.sheet).await?;
    let parsed = table::parse_table(&raw);
    Ok(extract::extract_kpi_bundle(Some(&parsed)))
}

async fn api_data(State(state): State<AppState>) -> Json<ApiResponse> {
    match load_sheet_bundle(&state).await {
        Ok(bundle) => Json(ApiResponse::ok(bundle, "sheet")),
        Err(err) => {
            error!(%err, "sheet fetch failed");
            Json(ApiResponse::fallback(err))
        }
    }
}

async fn api_refresh(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse>) {
    match load_sheet_bundle(&state).await {
        Ok(bundle) => {
            let mut resp = ApiResponse::ok(bundle, "sheet");
            resp.timestamp = Some(Utc::now().to_rfc3339());
            (StatusCode::OK, Json(resp))
        }
        Err(err) => {
            error!(%err, "sheet refresh failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::fallback(err)))
        }
    }
}

/// Why an upload could not produce a table.
#[derive(Debug)]
pub enum UploadError {
    /// The request itself is unusable: no spreadsheet field, broken
    /// multipart body, or a file type we do not accept. Answered with 400.
    Rejected(anyhow::Error),
    /// The file was accepted but could not be decoded. Answered with 500.
    Failed(anyhow::Error),
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_inner(self) -> anyhow::Error {
        match self {
            Self::Rejected(err) | Self::Failed(err) => err,
        }
    }
}

async fn api_process_data(mut multipart: Multipart) -> (StatusCode, Json<ApiResponse>) {
    match decode_upload(&mut multipart).await {
        Ok(tbl) => {
            let bundle = extract::extract_kpi_bundle(Some(&tbl));
            (StatusCode::OK, Json(ApiResponse::ok(bundle, "upload")))
        }
        Err(err) => {
            let status = err.status();
            let err = err.into_inner();
            error!(%err, "upload processing failed");
            (status, Json(ApiResponse::fallback(err)))
        }
    }
}

async fn decode_upload(multipart: &mut Multipart) -> Result<Table, UploadError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return Err(UploadError::Rejected(err.into())),
        };
        if field.name() != Some("spreadsheet") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| UploadError::Failed(err.into()))?;
        info!(file = %file_name, bytes = bytes.len(), "decoding upload");
        return decode_file(&file_name, &bytes);
    }
    Err(UploadError::Rejected(anyhow!(
        "no spreadsheet field in upload"
    )))
}

/// Decode an uploaded spreadsheet into a table, dispatching on extension.
pub fn decode_file(file_name: &str, bytes: &[u8]) -> Result<Table, UploadError> {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(table::parse_table(&String::from_utf8_lossy(bytes))),
        "xlsx" => {
            let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
                .context("opening xlsx workbook")
                .map_err(UploadError::Failed)?;
            first_sheet_table(&mut workbook).map_err(UploadError::Failed)
        }
        "xls" => {
            let mut workbook = Xls::new(Cursor::new(bytes.to_vec()))
                .context("opening xls workbook")
                .map_err(UploadError::Failed)?;
            first_sheet_table(&mut workbook).map_err(UploadError::Failed)
        }
        other => Err(UploadError::Rejected(anyhow!(
            "unsupported file type: {other:?}"
        ))),
    }
}

/// Stringify the first worksheet into the same row/cell grid the CSV path
/// produces, so the extractor does not care where the table came from.
fn first_sheet_table<RS, R>(workbook: &mut R) -> Result<Table>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::error::Error + Send + Sync + 'static,
{
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook has no sheets"))?;
    let range = workbook
        .worksheet_range(&name)
        .with_context(|| format!("reading worksheet {name:?}"))?;
    Ok(range_to_table(&range))
}

/// Stringify a decoded worksheet into the same grid the CSV path produces.
fn range_to_table(range: &calamine::Range<Data>) -> Table {
    let rows = range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect();
    Table { rows }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
