//! Captured-request records — the input vocabulary of the pipeline.

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use url::Url;

/// HTTP verbs a capture may carry. Closed set: anything else is rejected
/// when the archive is parsed. Only GET/OPTIONS/DELETE and POST/PUT have
/// call-building rules; the rest fail later with `UnsupportedMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Connect => "CONNECT",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "CONNECT" => Ok(Self::Connect),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            "PATCH" => Ok(Self::Patch),
            other => Err(format!("unknown HTTP method: {:?}", other)),
        }
    }
}

/// One request header, as the archive spells it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// One query-string pair, as the archive spells it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryPair {
    pub name: String,
    pub value: String,
}

/// One captured HTTP request. Immutable once captured; shared between
/// tasks and deferred bindings via `Rc`.
#[derive(Debug, Clone)]
pub struct Request {
    pub timestamp: DateTime<FixedOffset>,
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<Header>,
    /// Raw postData descriptor, kept loosely typed: the archive format is
    /// violated often enough that interpretation is deferred to the
    /// payload interpreter.
    pub post_data: Option<serde_json::Value>,
    pub query: Vec<QueryPair>,
}

static NON_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("literal pattern"));

impl Request {
    /// The origin host consulted by the blacklist.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    /// Headers as an insertion-ordered map; a repeated name keeps its
    /// first position with the last value.
    pub fn header_map(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::with_capacity(self.headers.len());
        for header in &self.headers {
            map.insert(header.name.clone(), header.value.clone());
        }
        map
    }

    /// A stable Python-identifier name for the task generated from this
    /// request, derived from the verb and the full URL.
    pub fn task_name(&self) -> String {
        let raw = format!(
            "{}_{}",
            self.method.as_str().to_ascii_lowercase(),
            self.url.as_str()
        );
        NON_IDENT.replace_all(&raw, "_").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request(method: HttpMethod, url: &str) -> Request {
        Request {
            timestamp: DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap(),
            method,
            url: Url::parse(url).unwrap(),
            headers: vec![
                Header {
                    name: "Accept".to_string(),
                    value: "*/*".to_string(),
                },
                Header {
                    name: "Accept".to_string(),
                    value: "text/html".to_string(),
                },
            ],
            post_data: None,
            query: vec![],
        }
    }

    #[test]
    fn test_method_roundtrip() {
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }

    #[test]
    fn test_method_rejects_unknown() {
        let err = "BREW".parse::<HttpMethod>().unwrap_err();
        assert!(err.contains("BREW"));
    }

    #[test]
    fn test_method_rejects_lowercase() {
        assert!("get".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_task_name_is_identifier() {
        let r = make_request(HttpMethod::Get, "https://example.com/a/b?x=1");
        let name = r.task_name();
        assert_eq!(name, "get_https___example_com_a_b_x_1");
        assert!(name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_header_map_last_value_wins() {
        let r = make_request(HttpMethod::Get, "https://example.com/");
        let map = r.header_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map["Accept"], "text/html");
    }

    #[test]
    fn test_host() {
        let r = make_request(HttpMethod::Get, "https://sub.example.com:8443/x");
        assert_eq!(r.host(), "sub.example.com");
    }
}
