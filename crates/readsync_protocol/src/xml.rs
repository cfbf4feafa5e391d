//! Minimal XML element tree over `quick-xml`.
//!
//! Service responses are small, so they are read into a tree and queried
//! with slash-separated child paths (`authors/author`).

use crate::error::{ProtocolError, ProtocolResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> ProtocolResult<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ProtocolError::malformed(format!("bad attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| ProtocolError::malformed(format!("bad attribute value: {e}")))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follows `path` taking the first matching child at each step.
    pub fn find(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .try_fold(self, |element, segment| element.child(segment))
    }

    /// Text of the element at `path`, or `None` if absent or blank.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path)
            .map(|element| element.text.trim())
            .filter(|text| !text.is_empty())
    }
}

/// Parses a complete document and returns its root element.
pub(crate) fn parse_document(bytes: &[u8]) -> ProtocolResult<Element> {
    let source = std::str::from_utf8(bytes)
        .map_err(|e| ProtocolError::malformed(format!("response is not UTF-8: {e}")))?;

    let mut reader = Reader::from_str(source);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(Element::from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ProtocolError::malformed("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| ProtocolError::malformed(format!("bad text node: {e}")))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                let data = data.into_inner();
                let text = std::str::from_utf8(&data)
                    .map_err(|e| ProtocolError::malformed(format!("bad CDATA: {e}")))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ProtocolError::malformed(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    if !stack.is_empty() {
        return Err(ProtocolError::malformed("document ended inside an element"));
    }
    root.ok_or_else(|| ProtocolError::malformed("empty document"))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> ProtocolResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ProtocolError::malformed("more than one root element"));
    }
    *root = Some(element);
    Ok(())
}
