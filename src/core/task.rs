//! Task models — the legacy record and its replacement, plus the deferred
//! binding that lets both serialize through the same call builder while
//! the old representation is phased out.

use super::call::{build_call, request_to_expr, CallParts};
use super::error::Error;
use super::request::{HttpMethod, QueryPair, Request};
use crate::python::{self, Expression, ExpressionView, FunctionCall, Literal, Statement};
use indexmap::IndexMap;
use serde_json::Value;
use std::rc::Rc;

/// Display label of the deferred request binding.
const REQUEST_FIELD_LABEL: &str = "this task's request field";

/// Variable the generated call's result is bound to.
const RESPONSE_VAR: &str = "response";

/// All parameters of the client call a legacy task will perform.
///
/// The `url` field holds Python source text: either a quoted string
/// literal or an `f'…'` template written by URL-rewriting callers.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub post_data: Option<Value>,
    pub query: Vec<QueryPair>,
}

impl PreparedRequest {
    /// Capture a request's full call parameters, quoting the URL as
    /// source text.
    pub fn from_request(request: &Request) -> Self {
        Self {
            method: request.method,
            url: python::quote_str(request.url.as_str()),
            headers: request.header_map(),
            post_data: request.post_data.clone(),
            query: request.query.clone(),
        }
    }

    /// Build the call expression, decoding the URL source-text marker:
    /// a leading `f` keeps the text as a template, plain quoting yields
    /// a string literal. Everything else funnels through the same
    /// builder as the fresh-capture path.
    pub fn to_expr(&self) -> Result<FunctionCall, Error> {
        build_call(CallParts {
            method: self.method,
            url: decode_url_source(&self.url),
            headers: self.headers.clone(),
            post_data: self.post_data.as_ref(),
            query: &self.query,
        })
    }
}

fn decode_url_source(text: &str) -> Expression {
    if let Some(rest) = text.strip_prefix('f') {
        if let Some(body) = strip_quotes(rest) {
            return Expression::FString(body.to_string());
        }
    }
    if let Some(body) = strip_quotes(text) {
        return Expression::Literal(Literal::Str(body.to_string()));
    }
    // Unquoted text: treat as a literal URL.
    Expression::Literal(Literal::Str(text.to_string()))
}

fn strip_quotes(text: &str) -> Option<&str> {
    text.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| text.strip_prefix('"').and_then(|t| t.strip_suffix('"')))
}

/// One scripted step in the OLD representation. The call is derived from
/// the originating capture unless an override has been materialized, in
/// which case the override wins entirely.
#[derive(Debug, Clone)]
pub struct LegacyTask {
    pub name: String,
    pub request: Rc<Request>,
    pub prepared: Option<Rc<PreparedRequest>>,
    pub preprocessing: Vec<String>,
    pub postprocessing: Vec<String>,
    pub global_code_blocks: IndexMap<String, Vec<String>>,
}

impl LegacyTask {
    /// One task per kept request, ordered by ascending capture timestamp.
    pub fn from_requests<F>(requests: Vec<Request>, on_blacklist: F) -> Vec<Self>
    where
        F: Fn(&str) -> bool,
    {
        ordered_requests(requests, on_blacklist)
            .into_iter()
            .map(|request| Self {
                name: request.task_name(),
                request: Rc::new(request),
                prepared: None,
                preprocessing: Vec::new(),
                postprocessing: Vec::new(),
                global_code_blocks: IndexMap::new(),
            })
            .collect()
    }

    /// Merge extra headers into the override (new values win on name
    /// conflicts), returning a new task. The receiver is unchanged.
    pub fn inject_headers(&self, extra: &IndexMap<String, String>) -> Self {
        let mut prepared = self.materialized();
        for (name, value) in extra {
            prepared.headers.insert(name.clone(), value.clone());
        }
        Self {
            prepared: Some(Rc::new(prepared)),
            ..self.clone()
        }
    }

    /// Replace the override's URL source text, returning a new task.
    pub fn replace_url(&self, url: impl Into<String>) -> Self {
        let mut prepared = self.materialized();
        prepared.url = url.into();
        Self {
            prepared: Some(Rc::new(prepared)),
            ..self.clone()
        }
    }

    /// The existing override, or one freshly built from the capture.
    /// Built at most once per lineage: later mutations start from the
    /// override the previous mutation produced.
    fn materialized(&self) -> PreparedRequest {
        match &self.prepared {
            Some(prepared) => (**prepared).clone(),
            None => PreparedRequest::from_request(&self.request),
        }
    }
}

/// One scripted step in the NEW representation: the request call lives in
/// the statement sequence instead of a dedicated request field.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: String,
    pub request: Rc<Request>,
    pub statements: Vec<Statement>,
    pub global_code_blocks: IndexMap<String, Vec<String>>,
}

impl Task {
    /// One task per kept request, ordered by ascending capture timestamp.
    ///
    /// The statement lists stay empty until the direct path is wired into
    /// the call builder; rendering such a task fails with
    /// [`Error::EmptyTask`] rather than producing a step that silently
    /// does nothing.
    pub fn from_requests<F>(requests: Vec<Request>, on_blacklist: F) -> Vec<Self>
    where
        F: Fn(&str) -> bool,
    {
        ordered_requests(requests, on_blacklist)
            .into_iter()
            .map(|request| Self {
                name: request.task_name(),
                request: Rc::new(request),
                statements: Vec::new(),
                global_code_blocks: IndexMap::new(),
            })
            .collect()
    }

    /// Convert a legacy task, deferring "which request gets serialized"
    /// to render time: the override captured here if one exists, the
    /// original capture otherwise. Pre- and post-processing fragments
    /// wrap the binding as opaque blocks, in their original order.
    pub fn from_legacy(legacy: &LegacyTask) -> Self {
        let view = match &legacy.prepared {
            Some(prepared) => ExpressionView::new(
                REQUEST_FIELD_LABEL,
                Rc::clone(prepared),
                |prepared: &PreparedRequest| prepared.to_expr().map(Expression::from),
            ),
            None => ExpressionView::new(
                REQUEST_FIELD_LABEL,
                Rc::clone(&legacy.request),
                |request: &Request| request_to_expr(request).map(Expression::from),
            ),
        };

        let mut statements =
            Vec::with_capacity(legacy.preprocessing.len() + legacy.postprocessing.len() + 1);
        statements.extend(
            legacy
                .preprocessing
                .iter()
                .cloned()
                .map(Statement::OpaqueBlock),
        );
        statements.push(Statement::Assignment {
            target: RESPONSE_VAR.to_string(),
            value: Expression::View(view),
        });
        statements.extend(
            legacy
                .postprocessing
                .iter()
                .cloned()
                .map(Statement::OpaqueBlock),
        );

        Self {
            name: legacy.name.clone(),
            request: Rc::clone(&legacy.request),
            statements,
            global_code_blocks: legacy.global_code_blocks.clone(),
        }
    }
}

/// Drop blacklisted hosts, then stable-sort by ascending capture
/// timestamp (ties keep their original enumeration order).
fn ordered_requests<F>(requests: Vec<Request>, on_blacklist: F) -> Vec<Request>
where
    F: Fn(&str) -> bool,
{
    let mut kept: Vec<Request> = requests
        .into_iter()
        .filter(|request| !on_blacklist(request.host()))
        .collect();
    kept.sort_by_key(|request| request.timestamp);
    kept
}
