//! Minimal XML writing and reading on top of `quick-xml`.
//!
//! `XmlWriter` emits nested elements through closures so every opened tag is
//! closed by construction. `parse` reads a response into an `Element` tree
//! keyed by local names; namespace declarations are dropped, which lets the
//! parsers look up `price-quote` rather than `{ns}price-quote`.

use std::borrow::Cow;
use std::collections::BTreeMap;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::ApiError;

pub(crate) struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    pub fn new(pretty: bool) -> Result<Self, ApiError> {
        let writer = if pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        let mut this = Self { writer };
        this.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(this)
    }

    /// Root element carrying the default namespace.
    pub fn root<F>(&mut self, name: &str, namespace: &str, body: F) -> Result<(), ApiError>
    where
        F: FnOnce(&mut Self) -> Result<(), ApiError>,
    {
        let mut start = BytesStart::new(name);
        start.push_attribute(("xmlns", namespace));
        self.write(Event::Start(start))?;
        body(self)?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn element<F>(&mut self, name: &str, body: F) -> Result<(), ApiError>
    where
        F: FnOnce(&mut Self) -> Result<(), ApiError>,
    {
        self.write(Event::Start(BytesStart::new(name)))?;
        body(self)?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// `<name>text</name>`
    pub fn text(&mut self, name: &str, text: impl AsRef<str>) -> Result<(), ApiError> {
        self.write(Event::Start(BytesStart::new(name)))?;
        self.write(Event::Text(BytesText::new(text.as_ref())))?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn opt_text(&mut self, name: &str, text: Option<&str>) -> Result<(), ApiError> {
        match text {
            Some(text) => self.text(name, text),
            None => Ok(()),
        }
    }

    pub fn flag(&mut self, name: &str, value: bool) -> Result<(), ApiError> {
        self.text(name, if value { "true" } else { "false" })
    }

    pub fn finish(self) -> Result<String, ApiError> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| ApiError::SerializationError(e.to_string()))
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), ApiError> {
        self.writer
            .write_event(event)
            .map_err(|e| ApiError::SerializationError(e.to_string()))
    }
}

/// A parsed XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Descend through child names, taking the first match at each level.
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        names.iter().try_fold(self, |el, name| el.child(name))
    }

    /// Trimmed text of a child; `None` when the child is absent or empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim()).filter(|t| !t.is_empty())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parse a document into its root element.
pub fn parse(xml: &str) -> Result<Element, ApiError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event().map_err(ApiError::malformed)? {
            Event::Start(start) => stack.push(open(&start)?),
            Event::Empty(start) => {
                let el = open(&start)?;
                attach(&mut stack, &mut root, el);
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| ApiError::malformed("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, el);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&text.unescape().map_err(ApiError::malformed)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ApiError::malformed("document ended inside an element"));
    }
    root.ok_or_else(|| ApiError::malformed("document has no root element"))
}

fn open(start: &BytesStart<'_>) -> Result<Element, ApiError> {
    let name = lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(ApiError::malformed)?;
        let raw = lossy(attr.key.as_ref());
        if raw == "xmlns" || raw.starts_with("xmlns:") {
            continue;
        }
        let key = lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(ApiError::malformed)?.into_owned();
        attributes.insert(key, value);
    }
    Ok(Element {
        name,
        attributes,
        ..Element::default()
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None => {
            if root.is_none() {
                *root = Some(el);
            }
        }
    }
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_nests_and_escapes() {
        let mut w = XmlWriter::new(false).unwrap();
        w.root("shipment", "urn:test", |w| {
            w.text("group-id", "a&b")?;
            w.element("parcel", |w| w.flag("unpackaged", false))
        })
        .unwrap();
        let xml = w.finish().unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <shipment xmlns=\"urn:test\"><group-id>a&amp;b</group-id>\
             <parcel><unpackaged>false</unpackaged></parcel></shipment>"
        );
    }

    #[test]
    fn opt_text_skips_none() {
        let mut w = XmlWriter::new(false).unwrap();
        w.root("r", "urn:x", |w| w.opt_text("name", None)).unwrap();
        assert!(w.finish().unwrap().ends_with("<r xmlns=\"urn:x\"></r>"));
    }

    #[test]
    fn parse_drops_default_namespace() {
        let root = parse(
            r#"<?xml version="1.0"?>
            <shipment-info xmlns="http://www.canadapost.ca/ws/shipment-v7">
              <shipment-id>123</shipment-id>
              <links><link rel="self" href="https://x/1" media-type="application/xml"/></links>
            </shipment-info>"#,
        )
        .unwrap();
        assert_eq!(root.name, "shipment-info");
        assert!(root.attributes.is_empty());
        assert_eq!(root.child_text("shipment-id"), Some("123"));
        let link = root.path(&["links", "link"]).unwrap();
        assert_eq!(link.attribute("rel"), Some("self"));
        assert_eq!(link.attribute("media-type"), Some("application/xml"));
    }

    #[test]
    fn parse_strips_prefixes_and_unescapes() {
        let root = parse(r#"<p:a xmlns:p="urn:p"><p:b>x &amp; y</p:b></p:a>"#).unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.child_text("b"), Some("x & y"));
    }

    #[test]
    fn parse_rejects_empty_and_truncated_documents() {
        assert!(matches!(parse(""), Err(ApiError::DeserializationError(_))));
        assert!(parse("<a><b></b>").is_err());
    }

    #[test]
    fn child_text_treats_blank_as_absent() {
        let root = parse("<a><b>  </b><c>1</c></a>").unwrap();
        assert_eq!(root.child_text("b"), None);
        assert_eq!(root.child_text("c"), Some("1"));
        assert_eq!(root.child_text("d"), None);
    }
}
