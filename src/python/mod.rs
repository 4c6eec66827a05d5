//! Python expression/statement tree and source rendering.
//!
//! The transformation core builds these nodes instead of emitting text
//! directly; rendering happens once, at the very end, so deferred bindings
//! can keep reading from live task objects until then.

use crate::core::error::Error;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// A Python expression node.
#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Literal),
    /// An f-string template; the content is raw Python source text.
    FString(String),
    Call(FunctionCall),
    /// A deferred binding, resolved at render time.
    View(ExpressionView),
}

impl Expression {
    /// Render to Python source. Deferred bindings are resolved here,
    /// exactly once per render; their failures propagate.
    pub fn render(&self) -> Result<String, Error> {
        match self {
            Self::Literal(literal) => Ok(literal.render()),
            Self::FString(content) => Ok(format!("f'{}'", content)),
            Self::Call(call) => call.render(),
            Self::View(view) => view.resolve()?.render(),
        }
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<FunctionCall> for Expression {
    fn from(call: FunctionCall) -> Self {
        Self::Call(call)
    }
}

/// A Python literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Bool(bool),
    /// UTF-8 byte string, rendered as `b'…'`.
    Bytes(Vec<u8>),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    /// Insertion-ordered dict with string keys.
    Dict(IndexMap<String, Literal>),
    /// A decoded JSON document, rendered with Python spellings
    /// (`None`/`True`/`False`).
    Json(serde_json::Value),
}

impl Literal {
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => quote_str(s),
            Self::Int(i) => i.to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Bytes(bytes) => quote_bytes(bytes),
            Self::List(items) => format!("[{}]", join_rendered(items)),
            Self::Tuple(items) => match items.len() {
                1 => format!("({},)", items[0].render()),
                _ => format!("({})", join_rendered(items)),
            },
            Self::Dict(entries) => {
                let body: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", quote_str(key), value.render()))
                    .collect();
                format!("{{{}}}", body.join(", "))
            }
            Self::Json(value) => render_json(value),
        }
    }
}

fn join_rendered(items: &[Literal]) -> String {
    items.iter().map(Literal::render).collect::<Vec<_>>().join(", ")
}

/// Quote a string as a single-quoted Python literal.
pub fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn quote_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            other => {
                use fmt::Write;
                let _ = write!(out, "\\x{:02x}", other);
            }
        }
    }
    out.push('\'');
    out
}

fn render_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "None".to_string(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => quote_str(s),
        serde_json::Value::Array(items) => {
            let body: Vec<String> = items.iter().map(render_json).collect();
            format!("[{}]", body.join(", "))
        }
        serde_json::Value::Object(entries) => {
            let body: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", quote_str(key), render_json(value)))
                .collect();
            format!("{{{}}}", body.join(", "))
        }
    }
}

/// A call with keyword arguments only, rendered in insertion order.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub name: String,
    pub named_args: IndexMap<&'static str, Expression>,
}

impl FunctionCall {
    pub fn render(&self) -> Result<String, Error> {
        let mut args = Vec::with_capacity(self.named_args.len());
        for (key, value) in &self.named_args {
            args.push(format!("{}={}", key, value.render()?));
        }
        Ok(format!("{}({})", self.name, args.join(", ")))
    }
}

/// A deferred binding: reads a shared object at render time and converts
/// whatever it finds there into an expression.
#[derive(Clone)]
pub struct ExpressionView {
    label: &'static str,
    resolve: Rc<dyn Fn() -> Result<Expression, Error>>,
}

impl ExpressionView {
    /// `target` is held as a shared reference, never copied; `convert`
    /// runs against it when the view is resolved.
    pub fn new<T: 'static>(
        label: &'static str,
        target: Rc<T>,
        convert: fn(&T) -> Result<Expression, Error>,
    ) -> Self {
        Self {
            label,
            resolve: Rc::new(move || convert(&target)),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn resolve(&self) -> Result<Expression, Error> {
        (self.resolve)()
    }
}

impl fmt::Debug for ExpressionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionView")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A Python statement node.
#[derive(Debug, Clone)]
pub enum Statement {
    /// `target = value`
    Assignment { target: String, value: Expression },
    /// An uninterpreted code fragment carried through verbatim, re-indented
    /// to the statement's position.
    OpaqueBlock(String),
}

impl Statement {
    pub fn render(&self, indent: usize) -> Result<String, Error> {
        let pad = " ".repeat(indent);
        match self {
            Self::Assignment { target, value } => {
                Ok(format!("{}{} = {}", pad, target, value.render()?))
            }
            Self::OpaqueBlock(code) => Ok(reindent(code, &pad)),
        }
    }
}

/// Strip a fragment's common leading whitespace and re-indent every
/// non-blank line with `pad`.
fn reindent(block: &str, pad: &str) -> String {
    let lines: Vec<&str> = block.lines().collect();
    let margin = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                let rest = line.get(margin..).unwrap_or_else(|| line.trim_start());
                format!("{}{}", pad, rest)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
