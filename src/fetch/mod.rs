// src/fetch/mod.rs
use anyhow::Result;
use reqwest::Client;
use tracing::info;
use url::Url;

use crate::config::SheetConfig;

const EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d";

/// Public CSV export URL for the configured sheet tab.
pub fn export_url(sheet: &SheetConfig) -> Result<Url> {
    let base = format!("{}/{}/export", EXPORT_BASE, sheet.spreadsheet_id);
    let url = Url::parse_with_params(&base, &[("format", "csv"), ("gid", sheet.gid.as_str())])?;
    Ok(url)
}

/// Download the published CSV export.
///
/// One shot, no retry: callers substitute the sparse default bundle on any
/// failure, so a transient error just means one degraded response.
pub async fn fetch_sheet_csv(client: &Client, sheet: &SheetConfig) -> Result<String> {
    let url = export_url(sheet)?;
    let resp = client.get(url.as_str()).send().await?.error_for_status()?;
    let body = resp.text().await?;
    info!(bytes = body.len(), "fetched sheet export");
    Ok(body)
}
