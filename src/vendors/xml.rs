//! XML helpers shared by the vendor adapters
//!
//! Both vendor APIs speak XML, and both have shipped several schema
//! variants over the years: the same payload arrives with bare element
//! names (`<ParcelNumber>`) or namespace-prefixed ones
//! (`<ns1:ParcelNumber>`). The extractor here walks the document with a
//! streaming parser and matches on local names case-insensitively, so
//! every observed variant is accepted without a regex grid.

use quick_xml::Reader;
use quick_xml::events::Event;

/// Escape the five XML-special characters (`& < > " '`) in a text value.
pub fn escape(value: &str) -> String {
    quick_xml::escape::escape(value).into_owned()
}

/// Extract the text content of the first non-empty element whose local
/// name matches any of `names` (case-insensitive, namespace prefixes
/// ignored). Returns `None` when no such element exists or the document
/// is malformed.
pub fn element_text(xml: &str, names: &[&str]) -> Option<String> {
    let mut reader = Reader::from_str(xml);

    let mut capturing = false;
    let mut captured = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                if names.iter().any(|name| name.eq_ignore_ascii_case(&local)) {
                    capturing = true;
                    captured.clear();
                }
            }
            Ok(Event::Text(text)) if capturing => {
                if let Ok(chunk) = text.unescape() {
                    captured.push_str(&chunk);
                }
            }
            Ok(Event::CData(cdata)) if capturing => {
                captured.push_str(&String::from_utf8_lossy(&cdata.into_inner()));
            }
            Ok(Event::End(end)) if capturing => {
                let local = String::from_utf8_lossy(end.local_name().as_ref()).into_owned();
                if names.iter().any(|name| name.eq_ignore_ascii_case(&local)) {
                    let value = captured.trim().to_string();
                    if !value.is_empty() {
                        return Some(value);
                    }
                    capturing = false;
                }
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
    }
}

/// Shorthand for boolean-flag elements like `<sikeres>true</sikeres>`.
pub fn element_is_true(xml: &str, names: &[&str]) -> bool {
    element_text(xml, names)
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
