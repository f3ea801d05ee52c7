//! XML codec for [`SettingsTree`].
//!
//! Both directions go through quick-xml events; output is indented by four
//! spaces. Leaf text is kept verbatim, while the whitespace around child
//! elements is dropped.
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::storage::error::{StorageResult, StorageSystemError};
use crate::storage::format::ParseFailure;
use crate::storage::tree::{Element, SettingsTree};

/// Parse XML markup into an element tree
pub fn parse(data: &str) -> Result<SettingsTree, ParseFailure> {
    let mut reader = Reader::from_str(data);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event_start = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(start_element(e, data, event_start)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = start_element(e, data, event_start)?;
                attach(&mut stack, &mut root, element, data, event_start)?;
            }
            Ok(Event::End(_)) => {
                let mut element = match stack.pop() {
                    Some(element) => element,
                    None => {
                        return Err(ParseFailure::at_offset(data, event_start, "unexpected closing tag"));
                    }
                };
                if !element.children.is_empty() {
                    element.text = element.text.trim().to_string();
                }
                attach(&mut stack, &mut root, element, data, event_start)?;
            }
            Ok(Event::Text(ref e)) => {
                // References arrive as separate events, so text holds no escapes
                let raw = String::from_utf8_lossy(e);
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&raw),
                    None if raw.trim().is_empty() => {}
                    None => {
                        return Err(ParseFailure::at_offset(data, event_start, "text outside of the root element"));
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                let resolved = match resolve_reference(e) {
                    Some(resolved) => resolved,
                    None => {
                        return Err(ParseFailure::at_offset(
                            data,
                            event_start,
                            format!("unknown entity '&{};'", String::from_utf8_lossy(e)),
                        ));
                    }
                };
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions and doctypes carry no data
            Ok(_) => {}
            Err(e) => {
                return Err(ParseFailure::at_offset(data, reader.error_position() as usize, e.to_string()));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseFailure::at_offset(
            data,
            data.len(),
            format!("element '{}' is never closed", open.name),
        ));
    }

    Ok(SettingsTree { root })
}

fn start_element(e: &BytesStart<'_>, data: &str, offset: usize) -> Result<Element, ParseFailure> {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseFailure::at_offset(data, offset, err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ParseFailure::at_offset(data, offset, err.to_string()))?;
        element.attributes.insert(key, value.into_owned());
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    data: &str,
    offset: usize,
) -> Result<(), ParseFailure> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ParseFailure::at_offset(data, offset, "document has more than one root element")),
    }
}

/// Resolve a general reference (name without `&` and `;`) to the text it stands for
fn resolve_reference(reference: &BytesRef<'_>) -> Option<String> {
    match reference.resolve_char_ref() {
        Ok(Some(ch)) => Some(ch.to_string()),
        Ok(None) => {
            let name = reference.decode().ok()?;
            resolve_predefined_entity(&name).map(str::to_string)
        }
        Err(_) => None,
    }
}

/// Render an element tree as XML markup
pub fn write(tree: &SettingsTree) -> StorageResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(|e| StorageSystemError::serialization("xml", e))?;
    if let Some(root) = tree.root() {
        write_element(&mut writer, root).map_err(|e| StorageSystemError::serialization("xml", e))?;
    }

    let mut out = String::from_utf8(writer.into_inner()).map_err(|e| StorageSystemError::serialization("xml", e))?;
    out.push('\n');
    Ok(out)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> std::io::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    if !element.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&element.text)))?;
        if !element.children.is_empty() {
            writer.write_indent()?;
        }
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
}
