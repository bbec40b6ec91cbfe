//! Loading the raw metrics document from a local file or over HTTP.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use reqwest::header::{CACHE_CONTROL, HeaderValue};
use serde_json::Value;

use crate::parser::parse_document;

/// GETs `url`, bypassing caches, and fails on a non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let mut req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);
    req.headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads and parses the document at `source`, a path or an `http(s)` URL.
#[tracing::instrument(skip(client))]
pub async fn load_document<C: HttpClient>(client: &C, source: &str) -> Result<Value> {
    let bytes = if source.starts_with("http") {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("failed to fetch {source}"))?
    } else {
        std::fs::read(source).with_context(|| format!("failed to read {source}"))?
    };
    tracing::debug!(bytes = bytes.len(), "Document loaded");

    parse_document(&bytes).with_context(|| format!("{source} is not a valid JSON document"))
}
