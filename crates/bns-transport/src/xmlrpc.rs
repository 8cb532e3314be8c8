//! Minimal XML-RPC envelope codec.
//!
//! Requests carry positional JSON parameters encoded as XML-RPC values. The
//! indexing server always answers with a single string parameter holding
//! JSON text, so decoding only has to find that string or a fault.

use serde_json::{Number, Value};
use std::fmt::Write;

use crate::error::RpcError;

/// Encode a `<methodCall>` document.
pub fn encode_call(method: &str, params: &[Value]) -> Result<String, RpcError> {
    let mut out = String::with_capacity(256);
    out.push_str("<?xml version='1.0'?>\n<methodCall>\n<methodName>");
    escape_into(method, &mut out);
    out.push_str("</methodName>\n<params>\n");
    for param in params {
        out.push_str("<param>\n<value>");
        encode_value(param, &mut out)?;
        out.push_str("</value>\n</param>\n");
    }
    out.push_str("</params>\n</methodCall>\n");
    Ok(out)
}

fn encode_value(value: &Value, out: &mut String) -> Result<(), RpcError> {
    match value {
        Value::Null => out.push_str("<nil/>"),
        Value::Bool(true) => out.push_str("<boolean>1</boolean>"),
        Value::Bool(false) => out.push_str("<boolean>0</boolean>"),
        Value::Number(n) => encode_number(n, out)?,
        Value::String(s) => {
            out.push_str("<string>");
            escape_into(s, out);
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                out.push_str("<value>");
                encode_value(item, out)?;
                out.push_str("</value>");
            }
            out.push_str("</data></array>");
        }
        Value::Object(map) => {
            out.push_str("<struct>");
            for (key, item) in map {
                out.push_str("<member><name>");
                escape_into(key, out);
                out.push_str("</name><value>");
                encode_value(item, out)?;
                out.push_str("</value></member>");
            }
            out.push_str("</struct>");
        }
    }
    Ok(())
}

/// XML-RPC `<int>` is 32-bit; wider integers cannot be sent.
fn encode_number(n: &Number, out: &mut String) -> Result<(), RpcError> {
    let too_wide = || RpcError::InvalidArgument(format!("integer {} does not fit an XML-RPC int", n));
    match (n.as_i64(), n.as_u64(), n.as_f64()) {
        (Some(i), _, _) => {
            let i = i32::try_from(i).map_err(|_| too_wide())?;
            let _ = write!(out, "<int>{}</int>", i);
        }
        (None, Some(_), _) => return Err(too_wide()),
        (None, None, Some(f)) => {
            let _ = write!(out, "<double>{:?}</double>", f);
        }
        (None, None, None) => return Err(too_wide()),
    }
    Ok(())
}

pub fn escape_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(s, &mut out);
    out
}

/// Resolve the predefined entities and numeric character references.
pub fn unescape(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let end = tail
            .find(';')
            .ok_or_else(|| "unterminated entity".to_string())?;
        let entity = &tail[1..end];
        match entity {
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "amp" => out.push('&'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            _ => {
                let code = if let Some(hex) = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                let c = code
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("unknown entity '&{};'", entity))?;
                out.push(c);
            }
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Decode a `<methodResponse>`.
///
/// Returns the first parameter when it is a string, `None` when the
/// response has no parameter or a non-string one, and a transport error
/// for a fault or a body that is not a method response at all.
pub fn decode_response(xml: &str) -> Result<Option<String>, RpcError> {
    if !xml.contains("<methodResponse>") {
        return Err(RpcError::Transport("Server replied a non-XML-RPC body".to_string()));
    }
    if let Some(fault) = section(xml, "<fault>", "</fault>") {
        let message = fault_string(fault).unwrap_or_else(|| "unknown fault".to_string());
        return Err(RpcError::Transport(format!("RPC fault: {}", message)));
    }
    let Some(params) = section(xml, "<params>", "</params>") else {
        return Ok(None);
    };
    let Some(value) = section(params, "<value>", "</value>") else {
        return Ok(None);
    };
    decode_string(value)
}

fn section<'a>(xml: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = xml.find(open)? + open.len();
    let end = xml[start..].find(close)? + start;
    Some(&xml[start..end])
}

fn decode_string(inner: &str) -> Result<Option<String>, RpcError> {
    let trimmed = inner.trim();
    let text = if let Some(body) = trimmed.strip_prefix("<string>") {
        body.strip_suffix("</string>")
            .ok_or_else(|| RpcError::Transport("Malformed XML-RPC string value".to_string()))?
    } else if trimmed == "<string/>" {
        ""
    } else if trimmed.starts_with('<') && !trimmed.starts_with(CDATA_OPEN) {
        return Ok(None);
    } else {
        // Untyped values are strings, whitespace included.
        inner
    };
    decode_text(text)
        .map(Some)
        .map_err(|e| RpcError::Transport(format!("Malformed XML-RPC response: {}", e)))
}

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Character data with entities resolved and CDATA sections taken verbatim.
fn decode_text(text: &str) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find(CDATA_OPEN) {
        out.push_str(&unescape(&rest[..open])?);
        let body = &rest[open + CDATA_OPEN.len()..];
        let close = body
            .find(CDATA_CLOSE)
            .ok_or_else(|| "unterminated CDATA section".to_string())?;
        out.push_str(&body[..close]);
        rest = &body[close + CDATA_CLOSE.len()..];
    }
    out.push_str(&unescape(rest)?);
    Ok(out)
}

fn fault_string(fault: &str) -> Option<String> {
    let at = fault.find("<name>faultString</name>")?;
    let value = section(&fault[at..], "<value>", "</value>")?;
    decode_string(value).ok().flatten()
}
