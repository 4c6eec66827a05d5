//! Call-expression building — one normalized request in, one client call out.
//!
//! Both the fresh-capture path and the prepared-override path funnel into
//! the same builder, so method dispatch and payload handling exist exactly
//! once.

use super::error::Error;
use super::postdata::PayloadArgs;
use super::request::{HttpMethod, QueryPair, Request};
use crate::python::{Expression, FunctionCall, Literal};
use indexmap::IndexMap;
use serde_json::Value;

/// Timeout constant baked into every generated call, in seconds.
pub const CLIENT_TIMEOUT: i64 = 30;

/// One request, normalized to exactly what call-building needs.
pub struct CallParts<'a> {
    pub method: HttpMethod,
    pub url: Expression,
    pub headers: IndexMap<String, String>,
    pub post_data: Option<&'a Value>,
    pub query: &'a [QueryPair],
}

/// Build the client call for one normalized request.
///
/// Base keyword-arguments are always present, in fixed order: `url`,
/// `name` (defaults to the url expression), `headers`, `timeout`,
/// `allow_redirects`. Payload-dependent keys follow for POST/PUT; PUT
/// additionally appends the query pairs to `params`.
pub fn build_call(parts: CallParts) -> Result<FunctionCall, Error> {
    let mut args: IndexMap<&'static str, Expression> = IndexMap::new();
    args.insert("url", parts.url.clone());
    args.insert("name", parts.url);
    args.insert("headers", headers_literal(&parts.headers).into());
    args.insert("timeout", Literal::Int(CLIENT_TIMEOUT).into());
    args.insert("allow_redirects", Literal::Bool(false).into());

    match parts.method {
        HttpMethod::Get | HttpMethod::Options | HttpMethod::Delete => {}
        HttpMethod::Post => merge_payload(&mut args, parts.post_data)?,
        HttpMethod::Put => {
            merge_payload(&mut args, parts.post_data)?;
            append_query_params(&mut args, parts.query);
        }
        method => return Err(Error::UnsupportedMethod(method)),
    }

    Ok(FunctionCall {
        name: format!(
            "self.client.{}",
            parts.method.as_str().to_ascii_lowercase()
        ),
        named_args: args,
    })
}

/// Build the call expression for a freshly captured request.
pub fn request_to_expr(request: &Request) -> Result<FunctionCall, Error> {
    build_call(CallParts {
        method: request.method,
        url: Literal::Str(request.url.as_str().to_string()).into(),
        headers: request.header_map(),
        post_data: request.post_data.as_ref(),
        query: &request.query,
    })
}

fn headers_literal(headers: &IndexMap<String, String>) -> Literal {
    Literal::Dict(
        headers
            .iter()
            .map(|(name, value)| (name.clone(), Literal::Str(value.clone())))
            .collect(),
    )
}

fn merge_payload(
    args: &mut IndexMap<&'static str, Expression>,
    post_data: Option<&Value>,
) -> Result<(), Error> {
    // A payload-bearing method with no descriptor at all fails the same
    // way an empty descriptor does.
    let empty = Value::Object(serde_json::Map::new());
    let payload = PayloadArgs::from_post_data(post_data.unwrap_or(&empty))?;
    for (key, literal) in payload.into_kwargs() {
        args.insert(key, literal.into());
    }
    Ok(())
}

/// Append one (name, value) byte pair per query pair to `params`,
/// creating an empty list first if the payload produced none.
fn append_query_params(args: &mut IndexMap<&'static str, Expression>, query: &[QueryPair]) {
    let params = args
        .entry("params")
        .or_insert_with(|| Literal::List(Vec::new()).into());
    if let Expression::Literal(Literal::List(pairs)) = params {
        pairs.extend(query.iter().map(|q| {
            Literal::Tuple(vec![
                Literal::Bytes(q.name.clone().into_bytes()),
                Literal::Bytes(q.value.clone().into_bytes()),
            ])
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;
    use url::Url;

    fn make_request(method: HttpMethod) -> Request {
        Request {
            timestamp: DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap(),
            method,
            url: Url::parse("https://example.com/items").unwrap(),
            headers: vec![super::super::request::Header {
                name: "Accept".to_string(),
                value: "*/*".to_string(),
            }],
            post_data: None,
            query: vec![],
        }
    }

    fn arg_keys(call: &FunctionCall) -> Vec<&'static str> {
        call.named_args.keys().copied().collect()
    }

    #[test]
    fn test_get_base_args_only() {
        let call = request_to_expr(&make_request(HttpMethod::Get)).unwrap();
        assert_eq!(call.name, "self.client.get");
        assert_eq!(
            arg_keys(&call),
            vec!["url", "name", "headers", "timeout", "allow_redirects"]
        );
    }

    #[test]
    fn test_no_payload_keys_for_get_even_with_descriptor() {
        let mut r = make_request(HttpMethod::Get);
        r.post_data = Some(json!({"mimeType": "text/plain", "text": "ignored"}));
        let call = request_to_expr(&r).unwrap();
        assert!(!call.named_args.contains_key("data"));
        assert!(!call.named_args.contains_key("params"));
        assert!(!call.named_args.contains_key("json"));
    }

    #[test]
    fn test_options_and_delete_build() {
        for method in [HttpMethod::Options, HttpMethod::Delete] {
            let call = request_to_expr(&make_request(method)).unwrap();
            assert_eq!(call.named_args.len(), 5);
        }
    }

    #[test]
    fn test_name_defaults_to_url() {
        let call = request_to_expr(&make_request(HttpMethod::Get)).unwrap();
        let url = call.named_args["url"].render().unwrap();
        let name = call.named_args["name"].render().unwrap();
        assert_eq!(url, name);
        assert_eq!(url, "'https://example.com/items'");
    }

    #[test]
    fn test_fixed_constants() {
        let call = request_to_expr(&make_request(HttpMethod::Get)).unwrap();
        assert_eq!(call.named_args["timeout"].render().unwrap(), "30");
        assert_eq!(
            call.named_args["allow_redirects"].render().unwrap(),
            "False"
        );
    }

    #[test]
    fn test_post_merges_json_payload() {
        let mut r = make_request(HttpMethod::Post);
        r.post_data = Some(json!({"mimeType": "application/json", "text": "{\"a\":1}"}));
        let call = request_to_expr(&r).unwrap();
        assert_eq!(call.named_args["json"].render().unwrap(), "{'a': 1}");
        assert!(!call.named_args.contains_key("data"));
    }

    #[test]
    fn test_post_without_descriptor_is_invalid() {
        let err = request_to_expr(&make_request(HttpMethod::Post)).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload { .. }));
    }

    #[test]
    fn test_put_appends_query_to_payload_params() {
        let mut r = make_request(HttpMethod::Put);
        r.post_data = Some(json!({
            "mimeType": "application/x-www-form-urlencoded",
            "params": [{"name": "a", "value": "1"}]
        }));
        r.query = vec![QueryPair {
            name: "page".to_string(),
            value: "2".to_string(),
        }];
        let call = request_to_expr(&r).unwrap();
        assert_eq!(
            call.named_args["params"].render().unwrap(),
            "[(b'a', b'1'), (b'page', b'2')]"
        );
    }

    #[test]
    fn test_put_query_only_initializes_params() {
        let mut r = make_request(HttpMethod::Put);
        r.post_data = Some(json!({"mimeType": "text/plain", "text": "body"}));
        r.query = vec![QueryPair {
            name: "page".to_string(),
            value: "2".to_string(),
        }];
        let call = request_to_expr(&r).unwrap();
        assert_eq!(
            call.named_args["params"].render().unwrap(),
            "[(b'page', b'2')]"
        );
        assert_eq!(call.named_args["data"].render().unwrap(), "b'body'");
    }

    #[test]
    fn test_put_no_query_no_params_key_unless_payload_has_one() {
        let mut r = make_request(HttpMethod::Put);
        r.post_data = Some(json!({"mimeType": "text/plain", "text": "body"}));
        let call = request_to_expr(&r).unwrap();
        // setdefault still materializes an empty list for PUT
        assert_eq!(call.named_args["params"].render().unwrap(), "[]");
    }

    #[test]
    fn test_patch_is_unsupported() {
        let err = request_to_expr(&make_request(HttpMethod::Patch)).unwrap_err();
        match err {
            Error::UnsupportedMethod(method) => assert_eq!(method, HttpMethod::Patch),
            other => panic!("expected UnsupportedMethod, got: {}", other),
        }
        assert!(
            Error::UnsupportedMethod(HttpMethod::Patch)
                .to_string()
                .contains("PATCH")
        );
    }

    #[test]
    fn test_head_is_unsupported() {
        let err = request_to_expr(&make_request(HttpMethod::Head)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMethod(HttpMethod::Head)));
    }

    #[test]
    fn test_headers_render_in_capture_order() {
        let mut r = make_request(HttpMethod::Get);
        r.headers = vec![
            super::super::request::Header {
                name: "X-B".to_string(),
                value: "2".to_string(),
            },
            super::super::request::Header {
                name: "X-A".to_string(),
                value: "1".to_string(),
            },
        ];
        let call = request_to_expr(&r).unwrap();
        assert_eq!(
            call.named_args["headers"].render().unwrap(),
            "{'X-B': '2', 'X-A': '1'}"
        );
    }
}
