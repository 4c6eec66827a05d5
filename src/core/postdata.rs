//! postData interpretation — decides which client keyword-arguments a
//! captured request body turns into.

use super::error::{Error, PayloadDefect};
use crate::python::Literal;
use serde_json::Value;

pub const JSON_MIME_TYPE: &str = "application/json";

/// Keyword-arguments derived from a postData descriptor.
///
/// `data` and `json` never coexist. `params` may accompany either:
/// the archive format declares "text" and "params" mutually exclusive,
/// but captures routinely carry both for form-encoded bodies, so both
/// are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadArgs {
    pub data: Option<Literal>,
    pub params: Option<Literal>,
    pub json: Option<Literal>,
}

impl PayloadArgs {
    /// Interpret a raw postData descriptor.
    ///
    /// Every structural defect is wrapped as [`Error::InvalidPayload`]
    /// carrying the offending descriptor and the originating cause.
    pub fn from_post_data(post_data: &Value) -> Result<Self, Error> {
        interpret(post_data).map_err(|defect| Error::InvalidPayload {
            descriptor: post_data.clone(),
            defect,
        })
    }

    /// The non-absent fields, in fixed (data, params, json) order.
    pub fn into_kwargs(self) -> Vec<(&'static str, Literal)> {
        let mut kwargs = Vec::with_capacity(3);
        if let Some(data) = self.data {
            kwargs.push(("data", data));
        }
        if let Some(params) = self.params {
            kwargs.push(("params", params));
        }
        if let Some(json) = self.json {
            kwargs.push(("json", json));
        }
        kwargs
    }
}

fn interpret(post_data: &Value) -> Result<PayloadArgs, PayloadDefect> {
    let obj = post_data.as_object().ok_or(PayloadDefect::NotAnObject)?;
    let mime = obj.get("mimeType").ok_or(PayloadDefect::MissingMimeType)?;

    if !obj.contains_key("text") && !obj.contains_key("params") {
        return Err(PayloadDefect::MissingBody);
    }

    let mut payload = PayloadArgs::default();

    // An explicit JSON null counts as present for the body check above
    // but as absent here, matching how real captures blur the two.
    let text = obj.get("text").filter(|v| !v.is_null());

    if mime.as_str() == Some(JSON_MIME_TYPE) {
        let text = text.ok_or(PayloadDefect::MissingJsonText)?;
        let text = text.as_str().ok_or(PayloadDefect::TextNotAString)?;
        let decoded: Value =
            serde_json::from_str(text).map_err(PayloadDefect::UnreadableJson)?;
        payload.json = Some(Literal::Json(decoded));
    } else if let Some(text) = text {
        // Probably application/x-www-form-urlencoded.
        let text = text.as_str().ok_or(PayloadDefect::TextNotAString)?;
        payload.data = Some(Literal::Bytes(text.as_bytes().to_vec()));
    }

    if let Some(params) = obj.get("params").filter(|v| !v.is_null()) {
        payload.params = Some(params_literal(params)?);
    }

    Ok(payload)
}

fn params_literal(params: &Value) -> Result<Literal, PayloadDefect> {
    let entries = params.as_array().ok_or(PayloadDefect::ParamsNotAList)?;
    let mut pairs = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        pairs.push(Literal::Tuple(vec![
            param_field(entry, index, "name")?,
            param_field(entry, index, "value")?,
        ]));
    }
    Ok(Literal::List(pairs))
}

fn param_field(entry: &Value, index: usize, key: &'static str) -> Result<Literal, PayloadDefect> {
    let value = entry
        .get(key)
        .ok_or(PayloadDefect::ParamMissingKey { index, key })?;
    let value = value
        .as_str()
        .ok_or(PayloadDefect::ParamNotAString { index, key })?;
    Ok(Literal::Bytes(value.as_bytes().to_vec()))
}
