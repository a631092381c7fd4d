//! SOAP 1.1 envelope building and response parsing for the forms service.
//!
//! Requests are small hand-built envelopes; responses are converted to a
//! generic JSON-like value tree. The service returns a bare `<item>` element
//! when a result set has exactly one entry, so [`one_or_many`] normalizes
//! result payloads to a list at the accessor boundary.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};
use thiserror::Error;

const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SERVICE_NS: &str = "http://ws.dm.ecm.technology.totvs.com/";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while parsing a SOAP response document.
#[derive(Debug, Error)]
pub enum SoapError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML document")]
    Malformed,
}

pub type SoapResult<T> = std::result::Result<T, SoapError>;

// =============================================================================
// Envelope Building
// =============================================================================

/// A request parameter value: either text or nested elements.
///
/// Nested elements may repeat a name, which is how the service models lists
/// (`<Attachments><item>...</item><item>...</item></Attachments>`).
#[derive(Debug, Clone)]
pub enum XmlValue {
    Text(String),
    Children(Vec<(String, XmlValue)>),
}

impl XmlValue {
    pub fn text(value: impl ToString) -> XmlValue {
        XmlValue::Text(value.to_string())
    }

    pub fn children(children: Vec<(String, XmlValue)>) -> XmlValue {
        XmlValue::Children(children)
    }
}

/// Convenience constructor for a text parameter.
pub fn field(name: &str, value: impl ToString) -> (String, XmlValue) {
    (name.to_string(), XmlValue::text(value))
}

/// Convenience constructor for a nested parameter.
pub fn node(name: &str, children: Vec<(String, XmlValue)>) -> (String, XmlValue) {
    (name.to_string(), XmlValue::children(children))
}

fn write_element(out: &mut String, name: &str, value: &XmlValue) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    match value {
        XmlValue::Text(text) => out.push_str(&escape(text.as_str())),
        XmlValue::Children(children) => {
            for (child_name, child) in children {
                write_element(out, child_name, child);
            }
        }
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Build a SOAP 1.1 request envelope for one service operation.
pub fn envelope(operation: &str, params: &[(String, XmlValue)]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
    out.push_str(&format!(
        "<soapenv:Envelope xmlns:soapenv=\"{}\" xmlns:ws=\"{}\">",
        SOAP_ENVELOPE_NS, SERVICE_NS
    ));
    out.push_str("<soapenv:Header/><soapenv:Body>");
    out.push_str(&format!("<ws:{}>", operation));
    for (name, value) in params {
        write_element(&mut out, name, value);
    }
    out.push_str(&format!("</ws:{}>", operation));
    out.push_str("</soapenv:Body></soapenv:Envelope>");
    out
}

// =============================================================================
// Response Parsing
// =============================================================================

/// Insert a child value, promoting repeated names to an array.
fn insert_value(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        None => {
            map.insert(key, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

/// Strip a namespace prefix from an element name.
fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.to_string(),
    }
}

/// Parse an XML document into a JSON-like value tree.
///
/// Element children become object entries; repeated sibling names become
/// arrays; leaf elements become strings. Namespace prefixes are stripped.
pub fn xml_to_value(xml: &str) -> SoapResult<Value> {
    let mut reader = Reader::from_str(xml);

    // (element name, children, accumulated text) per open element,
    // with a synthetic root frame at the bottom.
    let mut stack: Vec<(String, Map<String, Value>, String)> =
        vec![(String::new(), Map::new(), String::new())];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                stack.push((local_name(e.name().as_ref()), Map::new(), String::new()));
            }
            Event::Empty(e) => {
                let name = local_name(e.name().as_ref());
                let top = stack.last_mut().ok_or(SoapError::Malformed)?;
                insert_value(&mut top.1, name, Value::Null);
            }
            Event::Text(t) => {
                let top = stack.last_mut().ok_or(SoapError::Malformed)?;
                top.2.push_str(&t.unescape()?);
            }
            Event::CData(t) => {
                let top = stack.last_mut().ok_or(SoapError::Malformed)?;
                top.2.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Event::End(_) => {
                let (name, children, text) = stack.pop().ok_or(SoapError::Malformed)?;
                let value = if children.is_empty() {
                    Value::String(text.trim().to_string())
                } else {
                    Value::Object(children)
                };
                let parent = stack.last_mut().ok_or(SoapError::Malformed)?;
                insert_value(&mut parent.1, name, value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match stack.pop() {
        Some((_, root, _)) if stack.is_empty() => Ok(Value::Object(root)),
        _ => Err(SoapError::Malformed),
    }
}

/// Depth-first search for the first value stored under `key`.
pub fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|child| find_key(child, key))
        }
        Value::Array(items) => items.iter().find_map(|child| find_key(child, key)),
        _ => None,
    }
}

/// Normalize the service's single-item-or-list payloads.
///
/// A list is returned unchanged, a bare item becomes a one-element list,
/// and an absent result becomes an empty list.
pub fn one_or_many(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Locate a result field in a parsed response and normalize it to a list.
pub fn result_items(response: &Value, result_key: &str, item_key: &str) -> Vec<Value> {
    let result = match find_key(response, result_key) {
        Some(value) => value,
        None => return Vec::new(),
    };
    let items = find_key(result, item_key).cloned().unwrap_or(Value::Null);
    one_or_many(items)
}

// =============================================================================
// Tests
// =============================================================================
