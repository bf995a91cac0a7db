//! Parser for the trailing XML footer

use crate::error::{FormatError, Result};
use crate::types::footer::Element;
use crate::utils::file_utils::read_to_end_at;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::{Read, Seek};
use tracing::debug;

/// Seek to `offset` and parse everything after it as the XML footer.
///
/// The bytes are parsed in memory; no scratch file is written.
pub fn read_footer<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Element> {
    let bytes = read_to_end_at(reader, offset)?;
    debug!(offset, len = bytes.len(), "read XML footer");
    parse_footer(&bytes, offset)
}

/// Parse footer bytes into an [`Element`] tree.
///
/// The returned node is the synthetic document node; its single child is the
/// root element (`SpeFormat` in a well-formed file). Element and attribute
/// names are stored without namespace prefixes.
pub fn parse_footer(bytes: &[u8], offset: u64) -> Result<Element> {
    let text = std::str::from_utf8(bytes).map_err(|e| invalid(offset, e))?;
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    // Open elements, innermost last. The bottom entry is the document node.
    let mut stack = vec![Element::document()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(element_from_start(e, offset)?),
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e, offset)?;
                attach(&mut stack, element, offset)?;
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(invalid(offset, "closing tag without an open element"));
                }
                if let Some(element) = stack.pop() {
                    attach(&mut stack, element, offset)?;
                }
            }
            Ok(Event::Text(t)) => {
                let content = t.unescape().map_err(|e| invalid(offset, e))?;
                append_text(&mut stack, &content);
            }
            Ok(Event::CData(c)) => {
                let raw = c.into_inner();
                let content = std::str::from_utf8(&raw).map_err(|e| invalid(offset, e))?;
                append_text(&mut stack, content);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(invalid(
                    offset,
                    format!("{e} (at footer byte {})", reader.buffer_position()),
                ));
            }
        }
    }

    if stack.len() != 1 {
        let open = stack.last().map(|e| e.name.clone()).unwrap_or_default();
        return Err(invalid(offset, format!("unclosed element <{open}>")));
    }
    let document = stack.pop().unwrap_or_default();
    if document.children.is_empty() {
        return Err(invalid(offset, "no root element"));
    }
    Ok(document)
}

fn invalid(offset: u64, reason: impl ToString) -> FormatError {
    FormatError::InvalidFooterXml {
        offset,
        reason: reason.to_string(),
    }
}

fn element_from_start(start: &BytesStart, offset: u64) -> Result<Element> {
    let name = std::str::from_utf8(start.local_name().as_ref())
        .map_err(|e| invalid(offset, e))?
        .to_string();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| invalid(offset, e))?;
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .map_err(|e| invalid(offset, e))?
            .to_string();
        let value = attr.unescape_value().map_err(|e| invalid(offset, e))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], element: Element, offset: u64) -> Result<()> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| invalid(offset, "element outside the document"))?;
    parent.children.push(element);
    Ok(())
}

fn append_text(stack: &mut [Element], content: &str) {
    if content.is_empty() {
        return;
    }
    if let Some(current) = stack.last_mut() {
        current.text.get_or_insert_with(String::new).push_str(content);
    }
}
