//! Helpers shared by the METS and ALTO readers.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use quick_xml::events::BytesStart;

use crate::error::Result;

/// Decode XML bytes to a string.
///
/// 1. UTF-8 (a BOM is handled by encoding_rs)
/// 2. The encoding named in the `<?xml encoding="..."?>` declaration
/// 3. Windows-1252, which is a superset of ISO-8859-1 and never fails
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_xml(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(name) = xml_declared_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Read the encoding name from an XML declaration, if present.
///
/// Only the first 100 bytes are inspected.
pub fn xml_declared_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let decl = &prefix[xml_start..];
    let decl_end = decl.windows(2).position(|w| w == b"?>").unwrap_or(decl.len());
    let decl = &decl[..decl_end];

    let enc_pos = decl
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &decl[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value_end = after_enc[1..].iter().position(|&b| b == quote)? + 1;

    std::str::from_utf8(&after_enc[1..value_end]).ok()
}

/// Extract local name from a namespaced XML name (`mets:div` -> `div`).
pub fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Look up an attribute by local name and return its unescaped value.
///
/// Namespace prefixes are ignored, so `href` matches `xlink:href`.
pub fn attr(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if local_name(attr.key.as_ref()) == name {
            let raw = String::from_utf8_lossy(&attr.value);
            let value = quick_xml::escape::unescape(&raw)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Percent-decode an href so that `page%201.xml` and `page 1.xml` compare
/// equal. Invalid UTF-8 sequences leave the href untouched.
pub fn normalize_href(href: &str) -> String {
    let trimmed = href.trim();
    match percent_decode_str(trimmed).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => trimmed.to_string(),
    }
}
