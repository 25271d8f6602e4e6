//! Tree representation of a fetched feed
//!
//! The document is built with `quick-xml` and lives only for the duration of
//! a single refresh. Whitespace-only text is dropped, attributes keep their
//! source order and repeated siblings stay in document order.

use crate::{FeedCacheError, Result};
use quick_xml::encoding::{decode, detect_encoding};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Maximum element nesting accepted before the document is rejected
pub const MAX_DEPTH: usize = 256;

/// A single element of the parsed feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    /// Qualified element name, including any namespace prefix
    pub name: String,
    /// Attributes in source order
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
    /// Trimmed character data directly inside this element
    pub text: String,
}

impl XmlNode {
    fn push_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }
}

/// Parsed feed document
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    root: XmlNode,
}

impl RawDocument {
    /// Parse an XML body into a tree
    ///
    /// Mismatched or unclosed tags, unknown entities, a missing root element,
    /// several root elements or text outside the root are parse errors.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            let position = reader.buffer_position();
            let event = reader.read_event().map_err(|e| {
                FeedCacheError::parse(format!("malformed XML at byte {}: {}", position, e))
            })?;

            match event {
                Event::Start(start) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(FeedCacheError::parse(format!(
                            "element nesting exceeds {} levels",
                            MAX_DEPTH
                        )));
                    }
                    stack.push(node_from_start(&reader, &start)?);
                }
                Event::Empty(start) => {
                    let node = node_from_start(&reader, &start)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::End(end) => {
                    let node = stack.pop().ok_or_else(|| {
                        FeedCacheError::parse(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(end.name().as_ref())
                        ))
                    })?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(text) => {
                    let text = text.unescape_with(resolve_entity).map_err(|e| {
                        FeedCacheError::parse(format!("invalid text at byte {}: {}", position, e))
                    })?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(data) => {
                    let bytes = data.into_inner();
                    push_text(&mut stack, &String::from_utf8_lossy(&bytes))?;
                }
                Event::Eof => break,
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(FeedCacheError::parse(format!(
                "unexpected end of document inside <{}>",
                open.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| FeedCacheError::parse("document has no root element"))
    }

    /// The document element
    pub fn root(&self) -> &XmlNode {
        &self.root
    }
}

/// Decode raw feed bytes into text
///
/// A byte order mark takes precedence, then the encoding named in the XML
/// declaration. Bodies with neither are read as UTF-8.
pub fn decode_feed(bytes: &[u8]) -> Result<String> {
    let declared = || {
        let mut reader = Reader::from_reader(bytes);
        match reader.read_event() {
            Ok(Event::Decl(decl)) => decl.encoder(),
            _ => None,
        }
    };

    let (encoding, bom) = match detect_encoding(bytes) {
        Some((encoding, bom)) if bom > 0 || encoding.name() != "UTF-8" => (Some(encoding), bom),
        _ => (declared(), 0),
    };

    match encoding {
        Some(encoding) if encoding.name() != "UTF-8" || bom > 0 => decode(&bytes[bom..], encoding)
            .map(|text| text.into_owned())
            .map_err(|_| {
                FeedCacheError::parse(format!("feed body is not valid {}", encoding.name()))
            }),
        _ => String::from_utf8(bytes.to_vec())
            .map_err(|e| FeedCacheError::parse(format!("feed body is not valid UTF-8: {}", e))),
    }
}

fn node_from_start(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlNode> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| {
            FeedCacheError::parse(format!("invalid attribute on <{}>: {}", name, e))
        })?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .decode_and_unescape_value_with(reader, resolve_entity)
            .map_err(|e| {
                FeedCacheError::parse(format!("invalid attribute value on <{}>: {}", name, e))
            })?;
        attributes.push((key, value.trim().to_string()));
    }

    Ok(XmlNode {
        name,
        attributes,
        ..Default::default()
    })
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }

    if root.is_some() {
        return Err(FeedCacheError::parse(format!(
            "multiple root elements: found <{}> after the document element",
            node.name
        )));
    }

    *root = Some(node);
    Ok(())
}

fn push_text(stack: &mut [XmlNode], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(node) => {
            node.push_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(FeedCacheError::parse("text outside the document element")),
    }
}

/// HTML entities commonly found in vendor catalogues
fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        "euro" => Some("€"),
        "pound" => Some("£"),
        "copy" => Some("©"),
        "reg" => Some("®"),
        "trade" => Some("™"),
        "ndash" => Some("–"),
        "mdash" => Some("—"),
        "hellip" => Some("…"),
        _ => None,
    }
}
