use crate::core::error::RegistryError;
use serde::Serialize;
use serde_json::Value;

/// Response envelope shared by the JSON and XML output formats.
///
/// `msg` carries the human summary, `error` flags failures and `records`
/// counts the entries in `data` when the command returns a collection.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub msg: String,
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    pub data: Value,
}

impl Envelope {
    pub fn ok(msg: impl Into<String>, data: Value) -> Self {
        Self {
            msg: msg.into(),
            error: false,
            records: None,
            data,
        }
    }

    pub fn with_records(msg: impl Into<String>, records: usize, data: Value) -> Self {
        Self {
            msg: msg.into(),
            error: false,
            records: Some(records),
            data,
        }
    }

    /// Failure envelope. `data` names the offending inputs when the
    /// error knows them.
    pub fn failure(err: &RegistryError) -> Self {
        let data = match err {
            RegistryError::InvalidCnpj(raw) => Value::from(vec![raw.clone()]),
            RegistryError::MissingFunds(messages) => Value::from(messages.clone()),
            RegistryError::DuplicateRecord { detail, .. } => Value::from(vec![detail.clone()]),
            _ => Value::Null,
        };

        Self {
            msg: err.to_string(),
            error: true,
            records: None,
            data,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the envelope under a `<response>` root. Arrays become
    /// repeated `<item>` children.
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<response>\n");
        render_xml(&mut out, "msg", &Value::String(self.msg.clone()), 1);
        render_xml(&mut out, "error", &Value::Bool(self.error), 1);
        if let Some(records) = self.records {
            render_xml(&mut out, "records", &Value::from(records), 1);
        }
        render_xml(&mut out, "data", &self.data, 1);
        out.push_str("</response>");
        out
    }
}

fn render_xml(out: &mut String, tag: &str, value: &Value, depth: usize) {
    let indent = "\t".repeat(depth);
    match value {
        Value::Null => out.push_str(&format!("{indent}<{tag}/>\n")),
        Value::String(text) => {
            out.push_str(&format!("{indent}<{tag}>{}</{tag}>\n", xml_escape(text)));
        }
        Value::Array(items) => {
            out.push_str(&format!("{indent}<{tag}>\n"));
            for item in items {
                render_xml(out, "item", item, depth + 1);
            }
            out.push_str(&format!("{indent}</{tag}>\n"));
        }
        Value::Object(fields) => {
            out.push_str(&format!("{indent}<{tag}>\n"));
            for (name, field) in fields {
                render_xml(out, name, field, depth + 1);
            }
            out.push_str(&format!("{indent}</{tag}>\n"));
        }
        other => out.push_str(&format!("{indent}<{tag}>{other}</{tag}>\n")),
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
