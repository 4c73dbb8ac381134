use quick_xml::events::{BytesStart, Event};
use quick_xml::{Decoder, Reader};
use std::path::{Path, PathBuf};

/// How strictly the reader treats well-formedness problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Reject mismatched or unmatched end tags, unclosed elements, bad
    /// attributes and content outside the root element
    Strict,
    /// Tolerate mismatched and stray end tags
    Lenient,
}

/// Errors raised while loading an XML document
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("Malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("Document is not valid {encoding}")]
    Encoding { encoding: String },

    #[error("Failed to read '{0}': {1}")]
    Read(PathBuf, std::io::Error),
}

/// A single element, flattened out of the tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name with any namespace prefix removed
    pub name: String,
    /// Text that precedes the element's first child (not trimmed)
    pub text: String,
}

/// Parsed document as a document-order list of elements
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
}

/// Read a file and decode it to text
pub fn read_xml(path: &Path) -> Result<String, XmlError> {
    let bytes = std::fs::read(path).map_err(|e| XmlError::Read(path.to_path_buf(), e))?;
    decode_xml(&bytes)
}

/// Decode raw XML bytes using the encoding named by a byte order mark or the
/// XML declaration, defaulting to UTF-8
///
/// A leading byte order mark survives as `U+FEFF`, which `Document::parse`
/// skips.
pub fn decode_xml(bytes: &[u8]) -> Result<String, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    // The first event settles the encoding; parse errors surface later
    let _ = reader.read_event();
    let decoder = reader.decoder();
    decoder
        .decode(bytes)
        .map(|text| text.into_owned())
        .map_err(|_| XmlError::Encoding {
            encoding: decoder.encoding().name().to_string(),
        })
}

/// Reject malformed, duplicated or badly escaped attributes
fn check_attributes(start: &BytesStart, decoder: Decoder, position: u64) -> Result<(), XmlError> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed {
            position,
            message: e.to_string(),
        })?;
        if attr.value.contains(&b'<') {
            return Err(XmlError::Malformed {
                position,
                message: "'<' is not allowed in attribute values".to_string(),
            });
        }
        attr.decode_and_unescape_value(decoder)
            .map_err(|e| XmlError::Malformed {
                position,
                message: e.to_string(),
            })?;
    }
    Ok(())
}

struct Open {
    index: usize,
    collecting: bool,
}

impl Document {
    /// Parse XML text into a flat element list
    ///
    /// Elements are recorded in pre-order, so iterating the list visits
    /// them in the same order a recursive tree walk would.
    pub fn parse(xml: &str, mode: ParseMode) -> Result<Self, XmlError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        {
            let config = reader.config_mut();
            config.check_end_names = mode == ParseMode::Strict;
            config.allow_unmatched_ends = mode == ParseMode::Lenient;
        }

        let mut elements: Vec<Element> = Vec::new();
        let mut stack: Vec<Open> = Vec::new();
        let mut root_closed = false;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|e| XmlError::Malformed {
                position,
                message: e.to_string(),
            })?;

            if mode == ParseMode::Strict {
                if let Event::Start(start) | Event::Empty(start) = &event {
                    check_attributes(start, reader.decoder(), position)?;
                }
            }

            match event {
                Event::Start(start) | Event::Empty(start)
                    if matches!(mode, ParseMode::Strict) && stack.is_empty() && root_closed =>
                {
                    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    return Err(XmlError::Malformed {
                        position,
                        message: format!("element <{}> found after the root element", name),
                    });
                }
                Event::Start(start) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.collecting = false;
                    }
                    elements.push(Element {
                        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
                        text: String::new(),
                    });
                    stack.push(Open {
                        index: elements.len() - 1,
                        collecting: true,
                    });
                }
                Event::Empty(start) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.collecting = false;
                    }
                    elements.push(Element {
                        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
                        text: String::new(),
                    });
                    if stack.is_empty() {
                        root_closed = true;
                    }
                }
                Event::End(_) => {
                    stack.pop();
                    if stack.is_empty() {
                        root_closed = true;
                    }
                }
                Event::Text(text) => {
                    let decoded = match text.unescape() {
                        Ok(s) => s.into_owned(),
                        Err(e) if mode == ParseMode::Strict => {
                            return Err(XmlError::Malformed {
                                position,
                                message: e.to_string(),
                            });
                        }
                        Err(_) => String::from_utf8_lossy(&text).into_owned(),
                    };
                    match stack.last() {
                        Some(open) if open.collecting => elements[open.index].text.push_str(&decoded),
                        Some(_) => {}
                        None => {
                            if mode == ParseMode::Strict && !decoded.trim().is_empty() {
                                return Err(XmlError::Malformed {
                                    position,
                                    message: "text found outside the root element".to_string(),
                                });
                            }
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(open) = stack.last() {
                        if open.collecting {
                            elements[open.index]
                                .text
                                .push_str(&String::from_utf8_lossy(&data));
                        }
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes carry no content
                _ => {}
            }
        }

        if mode == ParseMode::Strict {
            if let Some(open) = stack.last() {
                return Err(XmlError::Malformed {
                    position: reader.buffer_position() as u64,
                    message: format!("unclosed element <{}>", elements[open.index].name),
                });
            }
            if elements.is_empty() {
                return Err(XmlError::Malformed {
                    position: 0,
                    message: "no element found".to_string(),
                });
            }
        }

        Ok(Self { elements })
    }

    /// Read and parse a file
    pub fn from_file(path: &Path, mode: ParseMode) -> Result<Self, XmlError> {
        Self::parse(&read_xml(path)?, mode)
    }

    /// All elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Elements whose local name equals `name`
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flattens_in_document_order() {
        let xml = r#"<Root><Question>1. First</Question><Group><Question>2. Second</Question></Group></Root>"#;
        let doc = Document::parse(xml, ParseMode::Strict).unwrap();

        let names: Vec<&str> = doc.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "Question", "Group", "Question"]);
    }

    #[test]
    fn test_local_name_drops_namespace_prefix() {
        let xml = r#"<aid:Root xmlns:aid="http://ns.adobe.com/AdobeInDesign/4.0/"><aid:Answer>1. (a)</aid:Answer></aid:Root>"#;
        let doc = Document::parse(xml, ParseMode::Strict).unwrap();

        let answers: Vec<_> = doc.elements_named("Answer").collect();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].text, "1. (a)");
    }

    #[test]
    fn test_text_stops_at_first_child() {
        let xml = "<Root><Question>3. Lead <b>bold</b> tail</Question></Root>";
        let doc = Document::parse(xml, ParseMode::Strict).unwrap();

        let q = doc.elements_named("Question").next().unwrap();
        assert_eq!(q.text, "3. Lead ");
    }

    #[test]
    fn test_entities_and_cdata_are_decoded() {
        let xml = "<Root><Question>4. A &amp; B</Question><Answer><![CDATA[5. (c)]]></Answer></Root>";
        let doc = Document::parse(xml, ParseMode::Strict).unwrap();

        assert_eq!(doc.elements_named("Question").next().unwrap().text, "4. A & B");
        assert_eq!(doc.elements_named("Answer").next().unwrap().text, "5. (c)");
    }

    #[test]
    fn test_empty_element_has_empty_text() {
        let doc = Document::parse("<Root><Question/></Root>", ParseMode::Strict).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.elements_named("Question").next().unwrap().text, "");
    }

    #[test]
    fn test_strict_rejects_mismatched_end_tag() {
        let err = Document::parse("<Root><Question>1.</Answer></Root>", ParseMode::Strict).unwrap_err();
        assert!(matches!(err, XmlError::Malformed { .. }));
    }

    #[test]
    fn test_strict_rejects_unclosed_element() {
        let result = Document::parse("<Root><Question>1. x</Question>", ParseMode::Strict);
        assert!(result.is_err());
    }

    #[test]
    fn test_strict_rejects_empty_document() {
        assert!(Document::parse("", ParseMode::Strict).is_err());
        assert!(Document::parse("<?xml version=\"1.0\"?>", ParseMode::Strict).is_err());
    }

    #[test]
    fn test_strict_rejects_second_root() {
        let err = Document::parse("<A/><B/>", ParseMode::Strict).unwrap_err();
        assert!(err.to_string().contains("after the root element"));
    }

    #[test]
    fn test_strict_rejects_bad_attributes() {
        for xml in [
            "<Root><Question id>1. x</Question></Root>",
            "<Root><Question a=b>1. x</Question></Root>",
            r#"<Root><Question a="1" a="2">1. x</Question></Root>"#,
            r#"<Root><Question a="x<y">1. x</Question></Root>"#,
            r#"<Root><Question a="&bogus;"/></Root>"#,
        ] {
            let err = Document::parse(xml, ParseMode::Strict).unwrap_err();
            assert!(matches!(err, XmlError::Malformed { .. }), "{}", xml);
        }
    }

    #[test]
    fn test_well_formed_attributes_pass() {
        let xml = r#"<Root xmlns:aid="urn:x"><Question aid:pstyle='Q' n="1 &amp; 2">1. x</Question></Root>"#;
        let doc = Document::parse(xml, ParseMode::Strict).unwrap();
        assert_eq!(doc.elements_named("Question").count(), 1);
    }

    #[test]
    fn test_lenient_ignores_bad_attributes() {
        let doc = Document::parse("<Root><Question id>1. x</Question></Root>", ParseMode::Lenient).unwrap();
        assert_eq!(doc.elements_named("Question").next().unwrap().text, "1. x");
    }

    #[test]
    fn test_lenient_tolerates_stray_end_tag() {
        let doc = Document::parse("<Root><Question>1. x</Question></Stray></Root>", ParseMode::Lenient).unwrap();
        assert_eq!(doc.elements_named("Question").count(), 1);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let doc = Document::parse("\u{feff}<Root/>", ParseMode::Strict).unwrap();
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_decode_latin1_declaration() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><Root><Question>1. Caf\xe9</Question></Root>";
        let text = decode_xml(bytes).unwrap();
        let doc = Document::parse(&text, ParseMode::Strict).unwrap();
        assert_eq!(doc.elements_named("Question").next().unwrap().text, "1. Caf\u{e9}");
    }

    #[test]
    fn test_decode_utf16_with_bom() {
        let source = "\u{feff}<?xml version=\"1.0\" encoding=\"UTF-16\"?><Root><Question>2. \u{3b1}</Question></Root>";
        let bytes: Vec<u8> = source.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let text = decode_xml(&bytes).unwrap();
        let doc = Document::parse(&text, ParseMode::Strict).unwrap();
        assert_eq!(doc.elements_named("Question").next().unwrap().text, "2. \u{3b1}");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode_xml(b"<Root><Question>1. caf\xe9</Question></Root>").unwrap_err();
        assert_eq!(err.to_string(), "Document is not valid UTF-8");
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = Document::from_file(Path::new("/nonexistent/export.xml"), ParseMode::Strict).unwrap_err();
        assert!(matches!(err, XmlError::Read(..)));
    }
}
