use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::constants::receipt::{FIELD_NOT_AVAILABLE, MARKER_MESSAGE_ID, MARKER_STATUS_INFO};
use crate::errors::CourierError;
use crate::receipt::ReceiptRecord;
use crate::types::{ElementText, TagName};

/// A receipt document reduced to the immediate children of its single
/// root element, in document order.
#[derive(Clone, Debug)]
pub struct ParsedReceipt {
    /// `(qualified tag name, concatenated descendant text)` per child.
    pub elements: Vec<(TagName, ElementText)>,
}

/// Parse a receipt document from disk.
///
/// A document that is still being written by the delivery agent fails
/// here (truncated markup, missing root) and is retried on a later
/// cycle once the writer has finished.
pub fn parse_receipt(path: &Path) -> Result<ParsedReceipt, CourierError> {
    let xml = fs::read_to_string(path)?;
    parse_receipt_xml(&xml).map_err(|reason| CourierError::MalformedReceipt {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parse receipt markup into its root children.
pub fn parse_receipt_xml(xml: &str) -> Result<ParsedReceipt, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut elements: Vec<(TagName, ElementText)> = Vec::new();
    // Root child currently open, accumulating descendant text.
    let mut current: Option<(TagName, ElementText)> = None;
    let mut depth = 0usize;
    let mut root_seen = false;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                if depth == 1 {
                    if root_seen {
                        return Err("more than one root element".to_string());
                    }
                    root_seen = true;
                } else if depth == 2 {
                    let name = String::from_utf8_lossy(e.name().into_inner()).to_string();
                    current = Some((name, String::new()));
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 {
                    if root_seen {
                        return Err("more than one root element".to_string());
                    }
                    root_seen = true;
                } else if depth == 1 {
                    let name = String::from_utf8_lossy(e.name().into_inner()).to_string();
                    elements.push((name, String::new()));
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return Err("unbalanced end tag".to_string());
                }
                if depth == 2 {
                    if let Some(element) = current.take() {
                        elements.push(element);
                    }
                }
                depth -= 1;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {e}")),
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err("document truncated".to_string());
    }
    if !root_seen {
        return Err("no root element".to_string());
    }
    Ok(ParsedReceipt { elements })
}

/// Extract the delivery-status record from a parsed receipt.
///
/// Marker tags are matched by substring so variant formats from other
/// recipient systems (namespaced prefixes such as `sdx:messageId`)
/// still extract. An absent marker yields the `"Not available"`
/// sentinel for that field; trimming the message id fails when the
/// recipient suffix marker is missing.
pub fn extract(parsed: &ParsedReceipt) -> Result<ReceiptRecord, CourierError> {
    let mut message_id: &str = FIELD_NOT_AVAILABLE;
    let mut status_info: &str = FIELD_NOT_AVAILABLE;
    for (tag, text) in &parsed.elements {
        if tag.contains(MARKER_MESSAGE_ID) {
            message_id = text;
        }
        if tag.contains(MARKER_STATUS_INFO) {
            status_info = text;
        }
    }
    ReceiptRecord::new(message_id, status_info)
}
