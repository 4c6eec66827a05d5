//! HAR 1.2 parsing — turns archive entries into `Request` records.
//!
//! Only the fields the pipeline consumes are modeled; `postData` is kept
//! as a raw JSON value and interpreted later, per request method.

use super::request::{Header, HttpMethod, QueryPair, Request};
use serde::Deserialize;
use std::path::Path;
use url::Url;

#[derive(Debug, Deserialize)]
struct HarFile {
    log: HarLog,
}

#[derive(Debug, Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HarEntry {
    started_date_time: String,
    request: HarRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HarRequest {
    method: String,
    url: String,
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    query_string: Vec<QueryPair>,
    #[serde(default)]
    post_data: Option<serde_json::Value>,
}

/// Parse a HAR file from disk.
pub fn parse_har_file(path: &Path) -> Result<Vec<Request>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_har(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Parse HAR JSON from a string.
pub fn parse_har(json: &str) -> Result<Vec<Request>, String> {
    let har: HarFile =
        serde_json::from_str(json).map_err(|e| format!("HAR parse error: {}", e))?;

    let mut requests = Vec::with_capacity(har.log.entries.len());
    for (index, entry) in har.log.entries.into_iter().enumerate() {
        let request = convert_entry(entry).map_err(|e| format!("entry {}: {}", index, e))?;
        requests.push(request);
    }
    tracing::debug!(count = requests.len(), "parsed HAR entries");
    Ok(requests)
}

fn convert_entry(entry: HarEntry) -> Result<Request, String> {
    let timestamp = chrono::DateTime::parse_from_rfc3339(&entry.started_date_time)
        .map_err(|e| {
            format!(
                "invalid startedDateTime {:?}: {}",
                entry.started_date_time, e
            )
        })?;
    let method: HttpMethod = entry.request.method.parse()?;
    let url = Url::parse(&entry.request.url)
        .map_err(|e| format!("invalid url {:?}: {}", entry.request.url, e))?;

    Ok(Request {
        timestamp,
        method,
        url,
        headers: entry.request.headers,
        post_data: entry.request.post_data,
        query: entry.request.query_string,
    })
}
